//! Recursive descent parser: tokens → core [`Statement`]s.
//!
//! The grammar has no verb keyword of its own. A clause is split into subject,
//! verb and object by finding a verb declared earlier in the same program, so
//! the parser carries the set of declared verb labels as it goes. Spaces are
//! optional: `孔子愛顏回` and `孔子 愛 顏回` parse alike once `愛` is declared.
//!
//! The parser is hand-rolled for full control over error messages and the
//! small fixed grammar.

use std::collections::BTreeSet;

use miette::NamedSource;

use crate::error::SyntaxError;
use crate::infer::Rule;
use crate::kb::Statement;
use crate::pattern::{ClassificationEdge, GroundFact, Pattern, PatternShape, Slot};
use crate::registry::SymbolTable;
use crate::symbol::Identifier;

use super::lexer::{Keyword, Span, Token, TokenKind, VARIABLE_PREFIX};
use super::{ParsedStatement, Program};

// ---------------------------------------------------------------------------
// Surface clauses
// ---------------------------------------------------------------------------

/// A name in a clause, possibly assembled from several tokens.
#[derive(Debug, Clone)]
struct Term {
    text: String,
    variable: bool,
    span: Span,
}

impl Term {
    fn from_token(token: &Token) -> Self {
        Self {
            text: token.text.clone(),
            variable: token.kind == TokenKind::Variable,
            span: token.span,
        }
    }

    fn joined(tokens: &[Token]) -> Option<Self> {
        let first = tokens.first()?;
        let span = tokens.iter().fold(first.span, |acc, t| acc.join(t.span));
        Some(Self {
            text: tokens.iter().map(|t| t.text.as_str()).collect(),
            variable: tokens.iter().any(|t| t.kind == TokenKind::Variable),
            span,
        })
    }

    /// A slice of a single identifier token, e.g. the subject of `孔子愛顏回`.
    fn slice(token: &Token, start: usize, end: usize) -> Self {
        let text = &token.text[start..end];
        Self {
            text: text.to_string(),
            variable: text.starts_with(VARIABLE_PREFIX),
            span: Span::new(token.span.start + start, token.span.start + end),
        }
    }
}

#[derive(Debug, Clone)]
enum Clause {
    Proposition(Term),
    Fact {
        subject: Term,
        verb: Term,
        object: Term,
    },
    Classification {
        child: Term,
        parent: Term,
    },
}

impl Clause {
    fn span(&self) -> Span {
        match self {
            Clause::Proposition(term) => term.span,
            Clause::Fact {
                subject, object, ..
            } => subject.span.join(object.span),
            Clause::Classification { child, parent } => child.span.join(parent.span),
        }
    }

    fn first_variable(&self) -> Option<&Term> {
        let terms: Vec<&Term> = match self {
            Clause::Proposition(term) => vec![term],
            Clause::Fact {
                subject, object, ..
            } => vec![subject, object],
            Clause::Classification { child, parent } => vec![child, parent],
        };
        terms.into_iter().find(|t| t.variable)
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

pub struct Parser<'a> {
    name: &'a str,
    source: &'a str,
    tokens: Vec<Token>,
    position: usize,
    /// Verb labels declared so far in this program.
    verbs: BTreeSet<String>,
    symbols: &'a SymbolTable,
}

impl<'a> Parser<'a> {
    pub fn new(name: &'a str, source: &'a str, tokens: Vec<Token>, symbols: &'a SymbolTable) -> Self {
        Self {
            name,
            source,
            tokens,
            position: 0,
            verbs: BTreeSet::new(),
            symbols,
        }
    }

    /// Parse every statement up to end of input.
    pub fn parse_program(mut self) -> Result<Program, SyntaxError> {
        let mut statements = Vec::new();
        while let Some(parsed) = self.parse_statement()? {
            statements.push(parsed);
        }
        Ok(Program {
            name: self.name.to_string(),
            statements,
        })
    }

    // -- token cursor -------------------------------------------------------

    /// The stream ends with `Eof`, and the cursor never moves past it.
    fn peek(&self) -> &Token {
        let index = self.position.min(self.tokens.len().saturating_sub(1));
        &self.tokens[index]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.position += 1;
        }
        token
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<Token, SyntaxError> {
        if self.peek().is_keyword(keyword) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(format!("'{}'", keyword.glyph())))
        }
    }

    fn expect_word(&mut self, expected: &str) -> Result<Token, SyntaxError> {
        if self.peek().is_word() {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected.to_string()))
        }
    }

    // -- diagnostics --------------------------------------------------------

    fn src(&self) -> NamedSource<String> {
        NamedSource::new(self.name, self.source.to_string())
    }

    fn unexpected(&self, expected: String) -> SyntaxError {
        let token = self.peek();
        SyntaxError::UnexpectedToken {
            found: token.describe(),
            expected,
            line: token.line,
            column: token.column,
            src: self.src(),
            span: token.span.into(),
        }
    }

    fn clause_text(words: &[Token]) -> String {
        words
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    // -- statements ---------------------------------------------------------

    fn parse_statement(&mut self) -> Result<Option<ParsedStatement>, SyntaxError> {
        while matches!(self.peek().kind, TokenKind::Indent | TokenKind::Newline) {
            self.advance();
        }

        let start = self.peek().clone();
        let statement = match start.kind {
            TokenKind::Eof => return Ok(None),
            TokenKind::Keyword(Keyword::Take) => self.parse_verb_declaration()?,
            TokenKind::Keyword(Keyword::Say) => {
                let tag = self.parse_say()?;
                if tag.variable {
                    return Err(self.variable_in_assertion(&tag, start.line));
                }
                Statement::Proposition(self.identifier(&tag.text)?)
            }
            TokenKind::Keyword(Keyword::If) => self.parse_rule()?,
            TokenKind::Keyword(Keyword::Ask) => self.parse_query()?,
            TokenKind::Identifier | TokenKind::Variable => {
                let first = self.advance();
                let clause = if self.peek().is_keyword(Keyword::Topic) {
                    self.parse_classification(first)?
                } else {
                    self.parse_fact_clause(first)?
                };
                self.assertion(clause, start.line)?
            }
            _ => return Err(self.unexpected("a statement".into())),
        };

        let end = self.tokens[self.position.saturating_sub(1)].span;
        Ok(Some(ParsedStatement {
            statement,
            line: start.line,
            span: start.span.join(end),
        }))
    }

    /// `以V為動`
    fn parse_verb_declaration(&mut self) -> Result<Statement, SyntaxError> {
        self.expect_keyword(Keyword::Take)?;
        let verb = self.expect_word("a verb")?;
        self.expect_keyword(Keyword::As)?;
        self.expect_keyword(Keyword::Verb)?;
        self.verbs.insert(verb.text.clone());
        Ok(Statement::DeclareVerb(self.symbols.verb(&verb.text)?))
    }

    /// `曰P`
    fn parse_say(&mut self) -> Result<Term, SyntaxError> {
        self.expect_keyword(Keyword::Say)?;
        let tag = self.expect_word("a proposition")?;
        Ok(Term::from_token(&tag))
    }

    /// `若E且E…則E`
    fn parse_rule(&mut self) -> Result<Statement, SyntaxError> {
        self.expect_keyword(Keyword::If)?;
        let mut premises = vec![self.parse_expression()?];
        while self.peek().is_keyword(Keyword::And) {
            self.advance();
            premises.push(self.parse_expression()?);
        }
        self.expect_keyword(Keyword::Then)?;
        let conclusion = self.parse_expression()?;
        Ok(Statement::Rule(Rule::new(premises, conclusion)))
    }

    /// `問E乎`
    fn parse_query(&mut self) -> Result<Statement, SyntaxError> {
        self.expect_keyword(Keyword::Ask)?;
        let pattern = self.parse_expression()?;
        self.expect_keyword(Keyword::QueryEnd)?;
        Ok(Statement::Query(pattern))
    }

    // -- expressions --------------------------------------------------------

    /// A premise, conclusion or query body.
    fn parse_expression(&mut self) -> Result<Pattern, SyntaxError> {
        let line = self.peek().line;
        if self.peek().is_keyword(Keyword::Say) {
            let tag = self.parse_say()?;
            return self.pattern(Clause::Proposition(tag), line);
        }

        let first = self.expect_word("a proposition, fact or classification")?;
        let next = self.peek();
        if next.is_keyword(Keyword::Topic) {
            let clause = self.parse_classification(first)?;
            return self.pattern(clause, line);
        }

        let contains_verb = self.verbs.iter().any(|v| first.text.contains(v.as_str()));
        let closes = next.ends_line()
            || next.is_keyword(Keyword::QueryEnd)
            || next.is_keyword(Keyword::Then)
            || next.is_keyword(Keyword::And);
        if !contains_verb && closes {
            return self.pattern(Clause::Proposition(Term::from_token(&first)), line);
        }

        let clause = self.parse_fact_clause(first)?;
        self.pattern(clause, line)
    }

    /// `X者Y也`. Keywords between `者` and `也` are part of the parent's name,
    /// so `犬者動物也` classifies 犬 as 動物.
    fn parse_classification(&mut self, first: Token) -> Result<Clause, SyntaxError> {
        self.expect_keyword(Keyword::Topic)?;
        let mut parts = Vec::new();
        loop {
            let part_of_name = match self.peek().kind {
                TokenKind::Identifier | TokenKind::Variable => true,
                TokenKind::Keyword(k) => k != Keyword::Copula,
                _ => false,
            };
            if !part_of_name {
                break;
            }
            parts.push(self.advance());
        }
        let parent = match Term::joined(&parts) {
            Some(term) => term,
            None => return Err(self.unexpected("a parent class".into())),
        };
        self.expect_keyword(Keyword::Copula)?;
        Ok(Clause::Classification {
            child: Term::from_token(&first),
            parent,
        })
    }

    /// Subject, verb and object, split at a declared verb.
    fn parse_fact_clause(&mut self, first: Token) -> Result<Clause, SyntaxError> {
        let mut words = vec![first];
        loop {
            match self.peek().kind {
                TokenKind::Identifier | TokenKind::Variable => words.push(self.advance()),
                TokenKind::Indent => {
                    self.advance();
                }
                _ => break,
            }
        }

        if let [only] = words.as_slice() {
            return self.split_single(only);
        }

        let line = words[0].line;
        let span = words
            .iter()
            .fold(words[0].span, |acc, t| acc.join(t.span));
        let declared: Vec<usize> = words
            .iter()
            .enumerate()
            .filter(|(_, t)| self.verbs.contains(&t.text))
            .map(|(i, _)| i)
            .collect();

        let verb_at = match declared.as_slice() {
            [i] => *i,
            // `S V O` with an undeclared V: keep the shape so the knowledge
            // base can reject it by name.
            [] if words.len() == 3 => 1,
            [] => {
                return Err(SyntaxError::NoVerb {
                    clause: Self::clause_text(&words),
                    line,
                    src: self.src(),
                    span: span.into(),
                });
            }
            _ => {
                return Err(SyntaxError::AmbiguousVerb {
                    clause: Self::clause_text(&words),
                    line,
                    src: self.src(),
                    span: span.into(),
                });
            }
        };

        let subject = Term::joined(&words[..verb_at]);
        let object = Term::joined(&words[verb_at + 1..]);
        match (subject, object) {
            (Some(subject), Some(object)) => Ok(Clause::Fact {
                subject,
                verb: Term::from_token(&words[verb_at]),
                object,
            }),
            (None, _) => Err(self.incomplete(&words, "subject", span)),
            (_, None) => Err(self.incomplete(&words, "object", span)),
        }
    }

    /// Split `孔子愛顏回` around the one declared verb it contains.
    fn split_single(&self, token: &Token) -> Result<Clause, SyntaxError> {
        let text = token.text.as_str();
        let mut found = self
            .verbs
            .iter()
            .filter_map(|verb| text.find(verb.as_str()).map(|at| (at, verb.len())));

        let (at, len) = match (found.next(), found.next()) {
            (Some(hit), None) => hit,
            (None, _) => {
                return Err(SyntaxError::NoVerb {
                    clause: text.to_string(),
                    line: token.line,
                    src: self.src(),
                    span: token.span.into(),
                });
            }
            (Some(_), Some(_)) => {
                return Err(SyntaxError::AmbiguousVerb {
                    clause: text.to_string(),
                    line: token.line,
                    src: self.src(),
                    span: token.span.into(),
                });
            }
        };

        let words = std::slice::from_ref(token);
        if at == 0 {
            return Err(self.incomplete(words, "subject", token.span));
        }
        if at + len >= text.len() {
            return Err(self.incomplete(words, "object", token.span));
        }
        Ok(Clause::Fact {
            subject: Term::slice(token, 0, at),
            verb: Term::slice(token, at, at + len),
            object: Term::slice(token, at + len, text.len()),
        })
    }

    fn incomplete(&self, words: &[Token], missing: &str, span: Span) -> SyntaxError {
        SyntaxError::IncompleteClause {
            clause: Self::clause_text(words),
            missing: missing.to_string(),
            line: words.first().map_or(0, |t| t.line),
            src: self.src(),
            span: span.into(),
        }
    }

    // -- lowering -----------------------------------------------------------

    fn identifier(&self, label: &str) -> Result<Identifier, SyntaxError> {
        Ok(self.symbols.identifier(label)?)
    }

    fn slot(&self, term: &Term) -> Result<Slot, SyntaxError> {
        if term.variable {
            Ok(Slot::var(&term.text))
        } else {
            Ok(Slot::Bound(self.identifier(&term.text)?))
        }
    }

    /// Lower a clause inside a rule or query.
    fn pattern(&self, clause: Clause, line: usize) -> Result<Pattern, SyntaxError> {
        let (shape, verb, slots) = match &clause {
            Clause::Proposition(tag) => (PatternShape::Proposition, None, vec![self.slot(tag)?]),
            Clause::Fact {
                subject,
                verb,
                object,
            } => (
                PatternShape::Fact,
                Some(self.symbols.verb(&verb.text)?),
                vec![self.slot(subject)?, self.slot(object)?],
            ),
            Clause::Classification { child, parent } => (
                PatternShape::Classification,
                None,
                vec![self.slot(child)?, self.slot(parent)?],
            ),
        };
        Pattern::from_slots(shape, verb, slots).map_err(|cause| SyntaxError::InvalidPattern {
            line,
            cause,
            src: self.src(),
            span: clause.span().into(),
        })
    }

    /// Lower a top-level fact or classification, which must be ground.
    fn assertion(&self, clause: Clause, line: usize) -> Result<Statement, SyntaxError> {
        if let Some(variable) = clause.first_variable() {
            return Err(self.variable_in_assertion(variable, line));
        }
        match clause {
            Clause::Fact {
                subject,
                verb,
                object,
            } => Ok(Statement::Fact(GroundFact::new(
                self.identifier(&subject.text)?,
                self.symbols.verb(&verb.text)?,
                self.identifier(&object.text)?,
            ))),
            Clause::Classification { child, parent } => {
                Ok(Statement::Classification(ClassificationEdge::new(
                    self.identifier(&child.text)?,
                    self.identifier(&parent.text)?,
                )))
            }
            Clause::Proposition(tag) => Ok(Statement::Proposition(self.identifier(&tag.text)?)),
        }
    }

    fn variable_in_assertion(&self, term: &Term, line: usize) -> SyntaxError {
        SyntaxError::VariableInAssertion {
            line,
            src: self.src(),
            span: term.span.into(),
        }
    }
}
