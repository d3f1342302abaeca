//! Rich diagnostic error types for the ink engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source spans so users know exactly what
//! went wrong and how to fix it.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::symbol::SymbolKind;

/// Top-level error type for the ink engine.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum InkError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Symbol(#[from] SymbolError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Fixpoint(#[from] FixpointError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Symbol errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum SymbolError {
    #[error("symbol allocator exhausted while interning a {kind}")]
    #[diagnostic(
        code(ink::symbol::exhausted),
        help(
            "The symbol ID space is exhausted (2^64 - 1 allocations). \
             Check for a loop that interns generated labels."
        )
    )]
    AllocatorExhausted { kind: SymbolKind },
}

// ---------------------------------------------------------------------------
// Load errors
// ---------------------------------------------------------------------------

/// A statement was rejected at load time. The knowledge base is unchanged.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum LoadError {
    #[error("undeclared verb \"{verb}\" in {pattern}")]
    #[diagnostic(
        code(ink::load::undeclared_verb),
        help(
            "Declare the verb before using it in a fact or rule, \
             e.g. `以{verb}為動`."
        )
    )]
    UndeclaredVerb { verb: String, pattern: String },

    #[error("variable {variable} in the conclusion of rule '{rule}' is not bound by any premise")]
    #[diagnostic(
        code(ink::load::unbound_conclusion_variable),
        help(
            "Every variable in a conclusion must appear in at least one premise, \
             otherwise the rule could invent new entities. Add a premise that \
             mentions {variable} or replace it with a concrete identifier."
        )
    )]
    UnboundConclusionVariable { variable: String, rule: String },

    #[error("malformed {shape} pattern: {message}")]
    #[diagnostic(
        code(ink::load::malformed_pattern),
        help(
            "Facts take a subject, a verb and an object; classifications take a \
             child and a parent; propositions take exactly one concrete tag. \
             Rules need at least one premise."
        )
    )]
    MalformedPattern { shape: String, message: String },

    #[error("query {pattern} cannot be loaded as knowledge")]
    #[diagnostic(
        code(ink::load::unexpected_query),
        help("Queries are answered, not loaded. Use `Engine::answer` or `Engine::execute_program`.")
    )]
    UnexpectedQuery { pattern: String },
}

// ---------------------------------------------------------------------------
// Query errors
// ---------------------------------------------------------------------------

/// A query was rejected. Loaded state and other queries are unaffected.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum QueryError {
    #[error("query {pattern} contains variable {variable}")]
    #[diagnostic(
        code(ink::query::variable_in_query),
        help(
            "Queries must be ground: replace {variable} with a concrete identifier, \
             or use `KnowledgeBase::solutions` to enumerate bindings."
        )
    )]
    VariableInQuery { pattern: String, variable: String },

    #[error("knowledge base has unconverged changes")]
    #[diagnostic(
        code(ink::query::not_converged),
        help("Run the fixpoint driver after loading statements and before answering queries.")
    )]
    NotConverged,
}

// ---------------------------------------------------------------------------
// Fixpoint errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Error, Diagnostic)]
pub enum FixpointError {
    #[error("fixpoint not reached within the round budget of {rounds}")]
    #[diagnostic(
        code(ink::fixpoint::round_budget),
        help(
            "The caller-imposed `max_rounds` budget ran out before the knowledge base \
             stopped changing. Raise `fixpoint.max_rounds` or remove it; the engine \
             always terminates without a budget."
        )
    )]
    RoundBudgetExhausted { rounds: usize },
}

// ---------------------------------------------------------------------------
// Syntax errors
// ---------------------------------------------------------------------------

/// Errors from the surface-syntax front end. Each carries the program source
/// and a span so the report points at the offending characters.
#[derive(Debug, Error, Diagnostic)]
pub enum SyntaxError {
    #[error("invalid character '{found}' at line {line}, column {column}")]
    #[diagnostic(
        code(ink::syntax::invalid_char),
        help(
            "Identifiers may contain letters, digits, '_' and CJK ideographs. \
             Use '＃' to start a comment."
        )
    )]
    InvalidCharacter {
        found: char,
        line: usize,
        column: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("not part of the language")]
        span: SourceSpan,
    },

    #[error("unexpected {found} at line {line}, column {column}; expected {expected}")]
    #[diagnostic(code(ink::syntax::unexpected_token))]
    UnexpectedToken {
        found: String,
        expected: String,
        line: usize,
        column: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("no declared verb in clause \"{clause}\" at line {line}")]
    #[diagnostic(
        code(ink::syntax::no_verb),
        help("Declare the verb first with `以V為動`, or separate subject, verb and object with spaces.")
    )]
    NoVerb {
        clause: String,
        line: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("which word is the verb?")]
        span: SourceSpan,
    },

    #[error("more than one declared verb in clause \"{clause}\" at line {line}")]
    #[diagnostic(
        code(ink::syntax::ambiguous_verb),
        help("Separate subject, verb and object with spaces so the verb is unambiguous.")
    )]
    AmbiguousVerb {
        clause: String,
        line: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("ambiguous clause")]
        span: SourceSpan,
    },

    #[error("clause \"{clause}\" at line {line} needs a {missing} around its verb")]
    #[diagnostic(code(ink::syntax::incomplete_clause))]
    IncompleteClause {
        clause: String,
        missing: String,
        line: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("incomplete")]
        span: SourceSpan,
    },

    #[error("variable in asserted statement at line {line}")]
    #[diagnostic(
        code(ink::syntax::variable_in_assertion),
        help("Variables (words starting with 其) may only appear inside rules and queries.")
    )]
    VariableInAssertion {
        line: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("variable")]
        span: SourceSpan,
    },

    #[error("invalid pattern at line {line}")]
    #[diagnostic(code(ink::syntax::invalid_pattern))]
    InvalidPattern {
        line: usize,
        #[source]
        #[diagnostic_source]
        cause: LoadError,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Symbol(#[from] SymbolError),
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    #[diagnostic(
        code(ink::config::read),
        help("Check that the file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    #[diagnostic(
        code(ink::config::parse),
        help(
            "The config file must be TOML with optional keys `log_filter` and a \
             `[fixpoint]` table (`max_rounds`, `parallel`, `record_provenance`)."
        )
    )]
    Parse { path: String, message: String },
}

/// Result of interning a label.
pub type SymbolResult<T> = std::result::Result<T, SymbolError>;

/// Convenience alias for functions returning ink results.
pub type InkResult<T> = std::result::Result<T, InkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_converts_to_ink_error() {
        let err = LoadError::UndeclaredVerb {
            verb: "loves".into(),
            pattern: "Confucius loves YanHui".into(),
        };
        let ink: InkError = err.into();
        assert!(matches!(ink, InkError::Load(LoadError::UndeclaredVerb { .. })));
    }

    #[test]
    fn error_display_names_the_offender() {
        let err = LoadError::UnboundConclusionVariable {
            variable: "?Z".into(),
            rule: "rule-1".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("?Z"));
        assert!(msg.contains("rule-1"));
    }

    #[test]
    fn diagnostic_codes_are_namespaced() {
        let err = QueryError::VariableInQuery {
            pattern: "?X loves YanHui".into(),
            variable: "?X".into(),
        };
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("ink::query::variable_in_query"));
    }

    #[test]
    fn fixpoint_error_reports_budget() {
        let err = FixpointError::RoundBudgetExhausted { rounds: 3 };
        assert!(err.to_string().contains('3'));
    }
}
