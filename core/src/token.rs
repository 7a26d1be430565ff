use std::fmt::{Display, Formatter};

use phf::{phf_map, Map};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenType {
    Illegal,
    Eof,

    Ident,
    Int,
    String,

    Assign,
    Plus,
    Minus,
    Asterisk,
    Slash,
    Bang,
    Less,
    Greater,
    EqualEqual,
    BangEqual,

    Comma,
    Semicolon,
    Colon,

    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,

    Function,
    Let,
    If,
    Else,
    Return,
    True,
    False,
}

static KEYWORDS: Map<&'static str, TokenType> = phf_map! {
    "fn" => TokenType::Function,
    "let" => TokenType::Let,
    "if" => TokenType::If,
    "else" => TokenType::Else,
    "return" => TokenType::Return,
    "true" => TokenType::True,
    "false" => TokenType::False,
};

/// Classifies an identifier literal as a keyword or a plain `Ident`.
pub fn lookup_ident(literal: &str) -> TokenType {
    KEYWORDS.get(literal).copied().unwrap_or(TokenType::Ident)
}

impl Display for TokenType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // Parser diagnostics interpolate these: word-like kinds print as their
        // upper-case names, operators and delimiters as their glyphs.
        let s = match self {
            TokenType::Illegal => "ILLEGAL",
            TokenType::Eof => "EOF",
            TokenType::Ident => "IDENT",
            TokenType::Int => "INT",
            TokenType::String => "STRING",
            TokenType::Assign => "=",
            TokenType::Plus => "+",
            TokenType::Minus => "-",
            TokenType::Asterisk => "*",
            TokenType::Slash => "/",
            TokenType::Bang => "!",
            TokenType::Less => "<",
            TokenType::Greater => ">",
            TokenType::EqualEqual => "==",
            TokenType::BangEqual => "!=",
            TokenType::Comma => ",",
            TokenType::Semicolon => ";",
            TokenType::Colon => ":",
            TokenType::LeftParen => "(",
            TokenType::RightParen => ")",
            TokenType::LeftBrace => "{",
            TokenType::RightBrace => "}",
            TokenType::LeftBracket => "[",
            TokenType::RightBracket => "]",
            TokenType::Function => "FUNCTION",
            TokenType::Let => "LET",
            TokenType::If => "IF",
            TokenType::Else => "ELSE",
            TokenType::Return => "RETURN",
            TokenType::True => "TRUE",
            TokenType::False => "FALSE",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub ty: TokenType,
    pub literal: String,
}

impl Token {
    pub fn new(ty: TokenType, literal: impl Into<String>) -> Self {
        Token {
            ty,
            literal: literal.into(),
        }
    }
}
