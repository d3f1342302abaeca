//! Surface syntax: the classical-Chinese-styled statement language.
//!
//! | Form | Statement |
//! |---|---|
//! | `以V為動` | declare verb V |
//! | `曰P` | assert proposition P |
//! | `X者Y也` | X is classified as Y |
//! | `S V O` / `SVO` | fact |
//! | `若E且E…則E` | rule |
//! | `問E乎` | query |
//!
//! Parsing interns every label into the caller's [`SymbolTable`], so the
//! resulting statements can be loaded straight into a knowledge base that
//! shares the table.

pub mod lexer;
pub mod parser;

use crate::error::SyntaxError;
use crate::kb::Statement;
use crate::registry::SymbolTable;

use lexer::Span;
use parser::Parser;

/// A statement with its source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStatement {
    pub statement: Statement,
    /// 1-based line of the statement's first token.
    pub line: usize,
    pub span: Span,
}

/// A parsed program.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub name: String,
    pub statements: Vec<ParsedStatement>,
}

impl Program {
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParsedStatement> {
        self.statements.iter()
    }

    /// Line of the statement at `index`, if any.
    pub fn line_of(&self, index: usize) -> Option<usize> {
        self.statements.get(index).map(|s| s.line)
    }

    /// Drop positions, keeping program order.
    pub fn into_statements(self) -> Vec<Statement> {
        self.statements.into_iter().map(|s| s.statement).collect()
    }
}

/// Parse `source`, reporting errors against the name `<input>`.
pub fn parse_program(source: &str, symbols: &SymbolTable) -> Result<Program, SyntaxError> {
    parse_named("<input>", source, symbols)
}

/// Parse `source`, reporting errors against `name` (usually a file path).
pub fn parse_named(name: &str, source: &str, symbols: &SymbolTable) -> Result<Program, SyntaxError> {
    let tokens = lexer::tokenize(name, source)?;
    let program = Parser::new(name, source, tokens, symbols).parse_program()?;
    tracing::debug!(name, statements = program.len(), "parsed program");
    Ok(program)
}
