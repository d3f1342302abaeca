//! Lexer: source text to a flat token stream with spans.
//!
//! Keywords are single characters and split identifiers wherever they occur,
//! so `犬者動物也` lexes as `犬` `者` `動` `物` `也`. The parser decides when a
//! keyword is really part of a name.

use miette::NamedSource;

use crate::error::SyntaxError;

/// Byte-level source span for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both.
    pub fn join(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    pub fn len(self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        (span.start, span.len()).into()
    }
}

/// The eleven reserved characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    /// `曰`: introduces a proposition.
    Say,
    /// `問`: opens a query.
    Ask,
    /// `乎`: closes a query.
    QueryEnd,
    /// `若`: opens a rule.
    If,
    /// `則`: separates premises from the conclusion.
    Then,
    /// `且`: joins premises.
    And,
    /// `者`: follows the child of a classification.
    Topic,
    /// `也`: closes a classification.
    Copula,
    /// `以`: opens a verb declaration.
    Take,
    /// `為`
    As,
    /// `動`
    Verb,
}

impl Keyword {
    pub fn from_char(c: char) -> Option<Self> {
        Some(match c {
            '曰' => Keyword::Say,
            '問' => Keyword::Ask,
            '乎' => Keyword::QueryEnd,
            '若' => Keyword::If,
            '則' => Keyword::Then,
            '且' => Keyword::And,
            '者' => Keyword::Topic,
            '也' => Keyword::Copula,
            '以' => Keyword::Take,
            '為' => Keyword::As,
            '動' => Keyword::Verb,
            _ => return None,
        })
    }

    pub fn glyph(self) -> char {
        match self {
            Keyword::Say => '曰',
            Keyword::Ask => '問',
            Keyword::QueryEnd => '乎',
            Keyword::If => '若',
            Keyword::Then => '則',
            Keyword::And => '且',
            Keyword::Topic => '者',
            Keyword::Copula => '也',
            Keyword::Take => '以',
            Keyword::As => '為',
            Keyword::Verb => '動',
        }
    }
}

/// Prefix that marks an identifier as a variable.
pub const VARIABLE_PREFIX: char = '其';

/// Comment marker (full-width number sign); runs to end of line.
pub const COMMENT: char = '＃';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword(Keyword),
    Identifier,
    Variable,
    /// A tab.
    Indent,
    Newline,
    Eof,
}

/// A single lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
    /// 1-based.
    pub line: usize,
    /// 1-based, counted in characters.
    pub column: usize,
}

impl Token {
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }

    /// Identifier or variable.
    pub fn is_word(&self) -> bool {
        matches!(self.kind, TokenKind::Identifier | TokenKind::Variable)
    }

    /// Newline or end of input.
    pub fn ends_line(&self) -> bool {
        matches!(self.kind, TokenKind::Newline | TokenKind::Eof)
    }

    /// Human-readable description for diagnostics.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Keyword(k) => format!("keyword '{}'", k.glyph()),
            TokenKind::Identifier => format!("identifier '{}'", self.text),
            TokenKind::Variable => format!("variable '{}'", self.text),
            TokenKind::Indent => "tab".into(),
            TokenKind::Newline => "end of line".into(),
            TokenKind::Eof => "end of input".into(),
        }
    }
}

/// Letters, digits, `_` and CJK ideographs.
pub fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric()
        || c == '_'
        || ('\u{3400}'..='\u{4DBF}').contains(&c)
        || ('\u{4E00}'..='\u{9FFF}').contains(&c)
}

/// Tokenize `source`. The stream always ends with one [`TokenKind::Eof`].
pub fn tokenize(name: &str, source: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();
    let mut line = 1;
    let mut column = 1;

    while let Some(&(start, c)) = chars.peek() {
        let single = |kind: TokenKind, line: usize, column: usize| Token {
            kind,
            text: c.to_string(),
            span: Span::new(start, start + c.len_utf8()),
            line,
            column,
        };

        match c {
            '\t' => {
                tokens.push(single(TokenKind::Indent, line, column));
                chars.next();
                column += 1;
            }
            '\n' => {
                tokens.push(single(TokenKind::Newline, line, column));
                chars.next();
                line += 1;
                column = 1;
            }
            ' ' | '\r' => {
                chars.next();
                column += 1;
            }
            COMMENT => {
                while let Some(&(_, c)) = chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    chars.next();
                    column += 1;
                }
            }
            _ => {
                if let Some(keyword) = Keyword::from_char(c) {
                    tokens.push(single(TokenKind::Keyword(keyword), line, column));
                    chars.next();
                    column += 1;
                } else if is_identifier_char(c) {
                    let start_column = column;
                    let mut end = start;
                    while let Some(&(i, c)) = chars.peek() {
                        if Keyword::from_char(c).is_some() || !is_identifier_char(c) {
                            break;
                        }
                        end = i + c.len_utf8();
                        chars.next();
                        column += 1;
                    }
                    let text = &source[start..end];
                    let kind = if text.starts_with(VARIABLE_PREFIX) {
                        TokenKind::Variable
                    } else {
                        TokenKind::Identifier
                    };
                    tokens.push(Token {
                        kind,
                        text: text.to_string(),
                        span: Span::new(start, end),
                        line,
                        column: start_column,
                    });
                } else {
                    return Err(SyntaxError::InvalidCharacter {
                        found: c,
                        line,
                        column,
                        src: NamedSource::new(name, source.to_string()),
                        span: Span::new(start, start + c.len_utf8()).into(),
                    });
                }
            }
        }
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        text: String::new(),
        span: Span::new(source.len(), source.len()),
        line,
        column,
    });
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize("test", source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn empty_source_is_just_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn keywords_split_identifiers() {
        let tokens = tokenize("test", "犬者動物也").unwrap();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["犬", "者", "動", "物", "也", ""]);
        assert!(tokens[1].is_keyword(Keyword::Topic));
        assert!(tokens[2].is_keyword(Keyword::Verb));
    }

    #[test]
    fn verb_declaration() {
        assert_eq!(
            kinds("以愛為動"),
            vec![
                TokenKind::Keyword(Keyword::Take),
                TokenKind::Identifier,
                TokenKind::Keyword(Keyword::As),
                TokenKind::Keyword(Keyword::Verb),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn variables_start_with_qi() {
        let tokens = tokenize("test", "其人 愛 孔子").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Variable);
        assert_eq!(tokens[0].text, "其人");
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
    }

    #[test]
    fn comments_run_to_end_of_line() {
        assert_eq!(
            kinds("曰雨 ＃ it rains\n曰風"),
            vec![
                TokenKind::Keyword(Keyword::Say),
                TokenKind::Identifier,
                TokenKind::Newline,
                TokenKind::Keyword(Keyword::Say),
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn tabs_and_newlines_are_tokens_spaces_are_not() {
        assert_eq!(
            kinds("\ta b\r\n"),
            vec![
                TokenKind::Indent,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn positions_are_tracked() {
        let tokens = tokenize("test", "曰雨\n 孔子").unwrap();
        let kongzi = &tokens[3];
        assert_eq!(kongzi.text, "孔子");
        assert_eq!((kongzi.line, kongzi.column), (2, 2));
        assert_eq!(&"曰雨\n 孔子"[kongzi.span.start..kongzi.span.end], "孔子");
    }

    #[test]
    fn ascii_identifiers_with_digits_and_underscores() {
        let tokens = tokenize("test", "node_1 likes node_2").unwrap();
        assert_eq!(tokens[0].text, "node_1");
        assert_eq!(tokens.len(), 4);
    }

    #[test]
    fn invalid_character_is_reported_with_position() {
        let err = tokenize("test", "曰雨\n孔子!").unwrap_err();
        match err {
            SyntaxError::InvalidCharacter {
                found,
                line,
                column,
                ..
            } => {
                assert_eq!(found, '!');
                assert_eq!((line, column), (2, 3));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
