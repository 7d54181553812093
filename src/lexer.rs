use thiserror::Error;
use tracing::trace;

use crate::ast::{Token, TokenKind};

/// Reserved words, matched case-insensitively.
pub const KEYWORDS: &[&str] = &[
    "SELECT", "FROM", "WHERE", "AND", "OR", "ORDER", "BY", "LIMIT", "GROUP", "ASC", "DESC",
    "FIND", "UPDATE", "SET", "ANALYZE", "IN", "LIKE", "NULL", "TRUE", "FALSE", "CONCURRENT",
];

const TWO_CHAR_OPERATORS: &[&str] = &["<=", ">=", "!=", "=="];

/// Position in the query text (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// A scan that ended on an Error token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unterminated string starting at line {}, column {}", .0.line, .0.column)]
    UnterminatedString(Position),

    #[error("unexpected character '{found}' at line {}, column {}", .at.line, .at.column)]
    UnexpectedChar { found: String, at: Position },
}

impl LexError {
    /// Interpret an Error token produced by [`Lexer::next_token`].
    pub fn from_token(token: &Token) -> Self {
        let at = Position {
            line: token.line,
            column: token.column,
        };
        if token.text == UNTERMINATED_STRING {
            LexError::UnterminatedString(at)
        } else {
            LexError::UnexpectedChar {
                found: token.text.clone(),
                at,
            }
        }
    }
}

const UNTERMINATED_STRING: &str = "unterminated string";

/// Character classes seen from the DFA start state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Letter,
    Digit,
    Quote(char),
    Single(TokenKind),
    OperatorStart,
    Other,
}

fn classify(ch: char) -> CharClass {
    match ch {
        c if c.is_alphabetic() || c == '_' => CharClass::Letter,
        c if c.is_ascii_digit() => CharClass::Digit,
        '"' | '\'' => CharClass::Quote(ch),
        '(' => CharClass::Single(TokenKind::LeftParen),
        ')' => CharClass::Single(TokenKind::RightParen),
        ',' => CharClass::Single(TokenKind::Comma),
        '.' => CharClass::Single(TokenKind::Dot),
        '*' => CharClass::Single(TokenKind::Asterisk),
        '=' | '!' | '<' | '>' | '+' | '-' => CharClass::OperatorStart,
        _ => CharClass::Other,
    }
}

/// Single-pass tokenizer for StoreQL.
///
/// Each call to [`next_token`](Lexer::next_token) starts in the DFA start
/// state, classifies the current character, and runs the matching scanning
/// state to the end of the token. The scan ends at end of input or at the
/// first Error token; after that every call returns EOF.
///
/// # Examples
///
/// ```
/// use storeql::{Lexer, TokenKind};
///
/// let tokens = Lexer::new("FIND products").tokenize();
/// let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
/// assert_eq!(kinds, vec![TokenKind::Keyword, TokenKind::Identifier, TokenKind::Eof]);
/// ```
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    finished: bool,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            finished: false,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            self.position += 1;
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn slice(&self, start: usize) -> String {
        self.input[start..self.position].iter().collect()
    }

    fn read_word(&mut self, line: usize, column: usize) -> Token {
        let start = self.position;
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let word = self.slice(start);
        let upper = word.to_uppercase();
        if KEYWORDS.contains(&upper.as_str()) {
            Token::new(TokenKind::Keyword, upper, line, column)
        } else {
            Token::new(TokenKind::Identifier, word, line, column)
        }
    }

    fn read_number(&mut self, line: usize, column: usize) -> Token {
        let start = self.position;
        while self.current_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        // The dot is taken even when no digit follows it.
        if self.current_char() == Some('.') {
            self.advance();
            while self.current_char().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        Token::new(TokenKind::Number, self.slice(start), line, column)
    }

    fn read_string(&mut self, quote: char, line: usize, column: usize) -> Token {
        self.advance(); // opening quote
        let start = self.position;

        while let Some(ch) = self.current_char() {
            if ch == quote {
                let text = self.slice(start);
                self.advance();
                return Token::new(TokenKind::String, text, line, column);
            }
            self.advance();
        }

        Token::new(TokenKind::Error, UNTERMINATED_STRING, line, column)
    }

    fn read_operator(&mut self, line: usize, column: usize) -> Token {
        let start = self.position;
        self.advance();

        if let (Some(first), Some(second)) = (self.input.get(start).copied(), self.current_char()) {
            let pair: String = [first, second].iter().collect();
            if TWO_CHAR_OPERATORS.contains(&pair.as_str()) {
                self.advance();
                return Token::new(TokenKind::Operator, pair, line, column);
            }
        }

        Token::new(TokenKind::Operator, self.slice(start), line, column)
    }

    pub fn next_token(&mut self) -> Token {
        if self.finished {
            return Token::new(TokenKind::Eof, "", self.line, self.column);
        }

        self.skip_whitespace();
        let (line, column) = (self.line, self.column);

        let token = match self.current_char() {
            None => Token::new(TokenKind::Eof, "", line, column),
            Some(ch) => match classify(ch) {
                CharClass::Letter => self.read_word(line, column),
                CharClass::Digit => self.read_number(line, column),
                CharClass::Quote(quote) => self.read_string(quote, line, column),
                CharClass::Single(kind) => {
                    self.advance();
                    Token::new(kind, ch.to_string(), line, column)
                }
                CharClass::OperatorStart => self.read_operator(line, column),
                CharClass::Other => {
                    self.advance();
                    Token::new(TokenKind::Error, ch.to_string(), line, column)
                }
            },
        };

        if token.is_terminal() {
            self.finished = true;
        }
        trace!(kind = %token.kind, text = %token.text, line, column, "token");
        token
    }

    /// Scan the whole input. The last token is always EOF or Error.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.is_terminal();
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    /// Like [`tokenize`](Lexer::tokenize) but turns a trailing Error token
    /// into a [`LexError`].
    pub fn tokenize_strict(self) -> Result<Vec<Token>, LexError> {
        let tokens = self.tokenize();
        match tokens.last() {
            Some(token) if token.kind == TokenKind::Error => Err(LexError::from_token(token)),
            _ => Ok(tokens),
        }
    }
}

#[test]
fn test_keywords_are_case_insensitive() {
    let mut lexer = Lexer::new("find Products select");
    assert_eq!(lexer.next_token(), Token::new(TokenKind::Keyword, "FIND", 1, 1));
    assert_eq!(lexer.next_token(), Token::new(TokenKind::Identifier, "Products", 1, 6));
    assert_eq!(lexer.next_token(), Token::new(TokenKind::Keyword, "SELECT", 1, 15));
    assert_eq!(lexer.next_token().kind, TokenKind::Eof);
}

#[test]
fn test_finished_lexer_keeps_returning_eof() {
    let mut lexer = Lexer::new("# FIND");
    assert_eq!(lexer.next_token().kind, TokenKind::Error);
    assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    assert_eq!(lexer.next_token().kind, TokenKind::Eof);
}
