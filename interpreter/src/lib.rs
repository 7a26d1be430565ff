pub mod ast;
pub mod env;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod value;

mod builtins;

pub use crate::builtins::Builtin;

use std::cell::RefCell;
use std::rc::Rc;

pub use monkey_core::{Lexer, Token, TokenType};

use crate::ast::Program;
use crate::env::Environment;
use crate::error::ParseError;
use crate::parser::Parser;

/// Token stream over a source string, ending with the `Eof` token.
pub fn tokenize(source: &str) -> Lexer<'_> {
    Lexer::new(source)
}

/// Parses a source string, handing back either the program or everything the
/// parser complained about.
pub fn parse(source: &str) -> Result<Program, Vec<ParseError>> {
    let mut parser = Parser::new(Lexer::new(source));
    let program = parser.parse_program();

    if parser.errors().is_empty() {
        Ok(program)
    } else {
        Err(parser.into_errors())
    }
}

/// A fresh top-level environment, shaped for sharing with closures and
/// successive `eval` calls.
pub fn new_environment() -> Rc<RefCell<Environment>> {
    Rc::new(RefCell::new(Environment::new()))
}
