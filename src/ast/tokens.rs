use std::fmt;

use serde::Serialize;

/// Lexical category of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    /// End of input
    Eof,

    /// Reserved word, always stored uppercased
    ///
    /// # Examples
    /// ```text
    /// SELECT
    /// find      -> FIND
    /// Order     -> ORDER
    /// ```
    Keyword,

    /// Entity or field name
    ///
    /// Starts with a letter or underscore, followed by letters, digits, or
    /// underscores. Case is preserved.
    ///
    /// # Examples
    /// ```text
    /// products
    /// unit_price
    /// _internal
    /// ```
    Identifier,

    /// String literal in single or double quotes (quotes stripped)
    ///
    /// # Examples
    /// ```text
    /// "pending"
    /// 'Blue Mug'
    /// ```
    String,

    /// Integer or decimal number
    ///
    /// The decimal point is absorbed greedily, so `12.` is a single number.
    ///
    /// # Examples
    /// ```text
    /// 100
    /// 19.99
    /// 12.
    /// ```
    Number,

    /// Comparison or arithmetic operator
    ///
    /// # Examples
    /// ```text
    /// =  !=  ==  <  <=  >  >=  +  -
    /// ```
    Operator,

    /// Comma separating assignments
    Comma,

    /// Dot in qualified field names (`order.total`)
    Dot,

    /// Left parenthesis
    LeftParen,

    /// Right parenthesis
    RightParen,

    /// `*` in `SELECT *`
    Asterisk,

    /// Lexical error; the text holds the offending character or
    /// `unterminated string`
    Error,
}

impl TokenKind {
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Eof => "EOF",
            TokenKind::Keyword => "KEYWORD",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::String => "STRING",
            TokenKind::Number => "NUMBER",
            TokenKind::Operator => "OPERATOR",
            TokenKind::Comma => "COMMA",
            TokenKind::Dot => "DOT",
            TokenKind::LeftParen => "LEFT_PAREN",
            TokenKind::RightParen => "RIGHT_PAREN",
            TokenKind::Asterisk => "ASTERISK",
            TokenKind::Error => "ERROR",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A lexical token with its 1-based source position.
///
/// Tokens are immutable once the lexer hands them out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    #[serde(rename = "type")]
    pub kind: TokenKind,
    #[serde(rename = "value")]
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Token {
            kind,
            text: text.into(),
            line,
            column,
        }
    }

    /// True for a keyword token spelling `word` (already uppercase).
    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == word
    }

    /// True for the tokens that end a scan (EOF or Error).
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, TokenKind::Eof | TokenKind::Error)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "end of input"),
            TokenKind::String => write!(f, "string \"{}\"", self.text),
            kind => write!(f, "{} '{}'", kind.name().to_lowercase(), self.text),
        }
    }
}
