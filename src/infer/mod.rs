//! Forward-chaining inference.
//!
//! - [`rules`]: rule definitions and load-time validation
//! - [`matcher`]: pattern unification and conjunctive joins
//! - [`fixpoint`]: the round loop that drives a knowledge base to stability

pub mod fixpoint;
pub mod matcher;
pub mod rules;

pub use fixpoint::{Derivation, FixpointConfig, FixpointDriver, FixpointReport};
pub use rules::{Rule, RuleId, RuleSet};
