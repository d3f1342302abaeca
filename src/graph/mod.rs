//! Classification graph: is-a edges between identifiers.
//!
//! Directly asserted edges live in a `petgraph` [`DiGraphMap`](petgraph::graphmap::DiGraphMap);
//! the transitively-closed edge set is kept alongside it in two ordered
//! indexes (by child and by parent) for the matcher.

pub mod classification;

pub use classification::ClassificationGraph;
