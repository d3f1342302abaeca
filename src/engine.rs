//! Engine facade: top-level API for the ink reasoner.
//!
//! The `Engine` owns one [`KnowledgeBase`] and the configured
//! [`FixpointDriver`], and provides the public interface for loading
//! statements, running to a fixpoint and answering queries.

use crate::config::EngineConfig;
use crate::error::{FixpointError, InkResult, LoadError, QueryError, SyntaxError};
use crate::infer::{FixpointDriver, FixpointReport};
use crate::kb::{KnowledgeBase, LoadOutcome, Statement};
use crate::pattern::{Bindings, Pattern};
use crate::query::Answer;
use crate::registry::SymbolTable;
use crate::syntax::{self, Program};

/// A statement that failed to load.
#[derive(Debug)]
pub struct Rejected {
    /// Position in the submitted statement list.
    pub index: usize,
    pub statement: Statement,
    pub error: LoadError,
}

/// The answer to one query statement of a program.
#[derive(Debug)]
pub struct QueryOutcome {
    /// Position in the submitted statement list.
    pub index: usize,
    pub pattern: Pattern,
    pub result: Result<Answer, QueryError>,
}

/// Everything [`Engine::execute_program`] produced.
#[derive(Debug)]
pub struct ProgramOutcome {
    /// One entry per query statement, in program order.
    pub answers: Vec<QueryOutcome>,
    pub rejected: Vec<Rejected>,
    pub report: FixpointReport,
}

/// The ink reasoning engine.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    driver: FixpointDriver,
    kb: KnowledgeBase,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    /// Create an engine with an empty knowledge base.
    pub fn new(config: EngineConfig) -> Self {
        tracing::debug!(
            max_rounds = ?config.fixpoint.max_rounds,
            parallel = config.fixpoint.parallel,
            "initializing ink engine"
        );
        Self {
            driver: FixpointDriver::new(config.fixpoint.clone()),
            config,
            kb: KnowledgeBase::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn kb(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn symbols(&self) -> &SymbolTable {
        self.kb.symbols()
    }

    /// Parse surface syntax, interning labels into this engine's symbol table.
    pub fn parse(&self, name: &str, source: &str) -> Result<Program, SyntaxError> {
        syntax::parse_named(name, source, self.kb.symbols())
    }

    /// Load one statement.
    pub fn load(&mut self, statement: Statement) -> Result<LoadOutcome, LoadError> {
        self.kb.load(statement)
    }

    /// Drive the knowledge base to its fixpoint.
    pub fn run(&mut self) -> Result<FixpointReport, FixpointError> {
        self.driver.run(&mut self.kb)
    }

    /// Answer a ground query, converging first if anything was loaded since
    /// the last run.
    pub fn answer(&mut self, pattern: &Pattern) -> InkResult<Answer> {
        self.converge()?;
        Ok(self.kb.answer(pattern)?)
    }

    /// Every substitution satisfying `pattern` in the converged state.
    pub fn solutions(&mut self, pattern: &Pattern) -> InkResult<Vec<Bindings>> {
        self.converge()?;
        Ok(self.kb.solutions(pattern)?)
    }

    fn converge(&mut self) -> Result<(), FixpointError> {
        if !self.kb.is_converged() {
            self.run()?;
        }
        Ok(())
    }

    /// Load every non-query statement, run to fixpoint once, then answer
    /// every query in program order.
    ///
    /// A rejected statement is recorded and skipped; the rest of the program
    /// still loads. Queries therefore see the whole program's consequences,
    /// wherever they appear in it.
    pub fn execute_program(
        &mut self,
        statements: Vec<Statement>,
    ) -> Result<ProgramOutcome, FixpointError> {
        let mut queries = Vec::new();
        let mut rejected = Vec::new();

        for (index, statement) in statements.into_iter().enumerate() {
            if let Statement::Query(pattern) = statement {
                queries.push((index, pattern));
                continue;
            }
            if let Err(error) = self.kb.load(statement.clone()) {
                tracing::warn!(
                    index,
                    statement = %statement.render(self.kb.symbols()),
                    "statement rejected: {error}"
                );
                rejected.push(Rejected {
                    index,
                    statement,
                    error,
                });
            }
        }

        let report = self.run()?;

        let answers = queries
            .into_iter()
            .map(|(index, pattern)| {
                let result = self.kb.answer(&pattern);
                QueryOutcome {
                    index,
                    pattern,
                    result,
                }
            })
            .collect();

        Ok(ProgramOutcome {
            answers,
            rejected,
            report,
        })
    }
}
