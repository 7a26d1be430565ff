use monkey_core::TokenType;
use thiserror::Error;

use crate::value::{Type, Value};

/// Diagnostics accumulated by the parser. The parser keeps going after one of
/// these, so callers get the whole list at once.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("expected next token to be {expected}, got {actual} instead.")]
    UnexpectedToken {
        expected: TokenType,
        actual: TokenType,
    },

    #[error("no prefix parse function for {ty} found")]
    NoPrefixParseFn { ty: TokenType },

    #[error("could not parse {literal:?} as integer")]
    BadIntegerLiteral { literal: String },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch {
        left: Type,
        operator: String,
        right: Type,
    },

    #[error("unknown operator: {operator}{right}")]
    UnknownPrefixOperator { operator: String, right: Type },

    #[error("unknown operator: {left} {operator} {right}")]
    UnknownInfixOperator {
        left: Type,
        operator: String,
        right: Type,
    },

    #[error("identifier not found: {0}")]
    IdentifierNotFound(String),

    #[error("not a function: {0}")]
    NotAFunction(Type),

    #[error("index operator not supported: {0}")]
    IndexNotSupported(Type),

    #[error("unusable as hash key: {0}")]
    UnusableHashKey(Type),

    #[error("wrong number of arguments. got={got}, want={want}")]
    WrongArgumentCount { got: usize, want: usize },

    #[error("argument to `{name}` not supported, got {got}")]
    UnsupportedArgument { name: &'static str, got: Type },
}

/// Why an evaluation stopped early. Both cases ride the `Err` side of the
/// evaluator's `Result` so `?` propagates them through nested blocks
/// untouched; a function call or the program top level is what absorbs a
/// `Return`, and only `eval` itself turns a `Fail` into an `Error` value.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Unwind {
    Return(Value),
    Fail(RuntimeError),
}

impl From<RuntimeError> for Unwind {
    fn from(err: RuntimeError) -> Self {
        Unwind::Fail(err)
    }
}
