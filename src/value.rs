use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// A literal value carried in AST metadata.
///
/// Values come from the right-hand side of `SET` assignments and from
/// numeric clause arguments such as `LIMIT 10`.
///
/// # Number Precision
///
/// Numbers are held as [`Decimal`] so that literals like `19.99` keep their
/// exact written value instead of drifting through binary floating point.
///
/// # Examples
///
/// ```
/// use storeql::Value;
///
/// let price = Value::parse_number("19.99").unwrap();
/// assert_eq!(price.to_string(), "19.99");
///
/// // The lexer absorbs a trailing dot, so "12." is still a number.
/// assert_eq!(Value::parse_number("12.").unwrap().as_u64(), Some(12));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `NULL`
    Null,

    /// `TRUE` / `FALSE`
    Boolean(bool),

    /// Integer or decimal literal
    Number(Decimal),

    /// Quoted string literal
    String(String),
}

impl Value {
    /// Parse the text of a Number token.
    ///
    /// Returns `None` when the literal does not fit in a `Decimal`.
    pub fn parse_number(text: &str) -> Option<Value> {
        let trimmed = text.strip_suffix('.').unwrap_or(text);
        Decimal::from_str(trimmed).ok().map(Value::Number)
    }

    /// Get as a non-negative whole number
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Number(n) if n.fract().is_zero() => n.to_u64(),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "\"{}\"", s),
        }
    }
}
