use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    // Special
    Illegal,
    Eof,
    Newline,

    // Identifiers and literals
    Ident,
    Int,
    Float,
    String,

    // Arithmetic Operators
    Plus,
    Minus,
    Asterisk,
    Slash,

    // Comparison Operators
    Lt,
    Gt,
    Lte,
    Gte,
    Eq,
    NotEq,

    // Logical operators
    Bang,

    // Assignment
    Assign,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Dot,
    Semicolon,

    // Keywords
    Struct,
    True,
    False,
    Nothing,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenType::Illegal => "ILLEGAL",
            TokenType::Eof => "EOF",
            TokenType::Newline => "NEWLINE",

            TokenType::Ident => "IDENT",
            TokenType::Int => "INT",
            TokenType::Float => "FLOAT",
            TokenType::String => "STRING",

            TokenType::Plus => "+",
            TokenType::Minus => "-",
            TokenType::Asterisk => "*",
            TokenType::Slash => "/",

            TokenType::Lt => "<",
            TokenType::Gt => ">",
            TokenType::Lte => "<=",
            TokenType::Gte => ">=",
            TokenType::Eq => "==",
            TokenType::NotEq => "!=",

            TokenType::Bang => "!",
            TokenType::Assign => "=",

            TokenType::LParen => "(",
            TokenType::RParen => ")",
            TokenType::LBracket => "[",
            TokenType::RBracket => "]",
            TokenType::LBrace => "{",
            TokenType::RBrace => "}",
            TokenType::Comma => ",",
            TokenType::Dot => ".",
            TokenType::Semicolon => ";",

            TokenType::Struct => "struct",
            TokenType::True => "true",
            TokenType::False => "false",
            TokenType::Nothing => "nothing",
        };
        write!(f, "{}", s)
    }
}

pub fn lookup_ident(ident: &str) -> TokenType {
    match ident {
        "struct" => TokenType::Struct,
        "true" => TokenType::True,
        "false" => TokenType::False,
        "nothing" => TokenType::Nothing,
        _ => TokenType::Ident,
    }
}
