// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # ink-reason
//!
//! A deterministic, negation-free forward-chaining reasoning engine. It holds
//! ground facts, is-a classifications and rules, derives everything that
//! follows until nothing new appears (a fixpoint), and answers ground queries
//! with `⊤` (proven) or `?` (unknown). There is no definitive false.
//!
//! ## Architecture
//!
//! - **Symbols** (`symbol`, `registry`): interned identifiers and verbs in two namespaces
//! - **Stores** (`store`, `graph`, `lexicon`): facts indexed by verb, a transitively
//!   closed classification graph, propositions, declared verbs
//! - **Inference** (`infer`): rule validation, matching, and the fixpoint driver
//! - **Knowledge base** (`kb`): owns every store, admits statements, answers queries
//! - **Surface syntax** (`syntax`): the `以愛為動` / `若…則…` / `問…乎` statement language
//!
//! ## Library usage
//!
//! ```no_run
//! use ink_reason::config::EngineConfig;
//! use ink_reason::engine::Engine;
//!
//! let mut engine = Engine::new(EngineConfig::default());
//! let program = engine
//!     .parse("demo.ink", "以愛為動\n以敬為動\n孔子愛顏回\n若其甲愛其乙則其乙敬其甲\n問顏回敬孔子乎\n")
//!     .unwrap();
//! let outcome = engine.execute_program(program.into_statements()).unwrap();
//! assert!(outcome.answers[0].result.as_ref().unwrap().is_proven());
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod graph;
pub mod infer;
pub mod kb;
pub mod lexicon;
pub mod pattern;
pub mod provenance;
pub mod query;
pub mod registry;
pub mod store;
pub mod symbol;
pub mod syntax;
