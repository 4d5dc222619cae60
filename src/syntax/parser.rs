use std::{fmt, rc::Rc};

use crate::syntax::{
    ast::{Expr, InfixOp, PrefixOp, Program, Statement, Stmt},
    lexer::Lexer,
    token::{Position, Token},
    token_type::TokenType,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Equals,      // ==, !=
    LessGreater, // <, >, <=, >=
    Sum,         // +, -
    Product,     // *, /
    Prefix,      // -x, !x
    Call,        // f(x), a[i], a.b
}

/// Deepest expression tree the parser builds. Evaluation and drop both
/// recurse over the tree, so this bounds their native stack use too.
pub const MAX_NESTING: usize = 200;

fn token_precedence(token_type: TokenType) -> Precedence {
    match token_type {
        TokenType::Eq | TokenType::NotEq => Precedence::Equals,
        TokenType::Lt | TokenType::Gt | TokenType::Lte | TokenType::Gte => {
            Precedence::LessGreater
        }
        TokenType::Plus | TokenType::Minus => Precedence::Sum,
        TokenType::Asterisk | TokenType::Slash => Precedence::Product,
        TokenType::LParen | TokenType::LBracket | TokenType::Dot => Precedence::Call,
        _ => Precedence::Lowest,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub position: Position,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.position, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Parses a complete source snippet.
pub fn parse(source: &str) -> Result<Program, ParseError> {
    Parser::new(Lexer::new(source)).parse_program()
}

pub struct Parser {
    lexer: Lexer,
    current_token: Token,
    peek_token: Token,
    depth: usize,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Self {
        let mut parser = Parser {
            lexer,
            current_token: Token::new(TokenType::Eof, "", 0, 0),
            peek_token: Token::new(TokenType::Eof, "", 0, 0),
            depth: 0,
        };
        parser.next_token();
        parser.next_token();
        parser
    }

    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::new();

        loop {
            self.skip_separators();
            if self.current_token.token_type == TokenType::Eof {
                break;
            }

            let position = self.current_token.position;
            let stmt = self.parse_statement()?;
            program.statements.push(Statement { stmt, position });

            self.next_token();
            if !matches!(
                self.current_token.token_type,
                TokenType::Semicolon | TokenType::Newline | TokenType::Eof
            ) {
                return Err(self.unexpected(&self.current_token, "end of statement"));
            }
        }

        Ok(program)
    }

    fn next_token(&mut self) {
        self.current_token = std::mem::replace(&mut self.peek_token, self.lexer.next_token());
    }

    fn skip_separators(&mut self) {
        while matches!(
            self.current_token.token_type,
            TokenType::Semicolon | TokenType::Newline
        ) {
            self.next_token();
        }
    }

    fn is_peek_token(&self, token_type: TokenType) -> bool {
        self.peek_token.token_type == token_type
    }

    fn expect_peek(&mut self, token_type: TokenType) -> Result<(), ParseError> {
        if self.is_peek_token(token_type) {
            self.next_token();
            Ok(())
        } else {
            Err(self.unexpected(&self.peek_token, &format!("`{}`", token_type)))
        }
    }

    fn unexpected(&self, found: &Token, expected: &str) -> ParseError {
        let message = if found.token_type == TokenType::Illegal {
            found.literal.clone()
        } else {
            format!("expected {}, found {}", expected, found)
        };
        ParseError {
            message,
            position: found.position,
        }
    }

    fn error_at(&self, token: &Token, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            position: token.position,
        }
    }

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        if self.current_token.token_type == TokenType::Struct {
            return self.parse_struct_statement();
        }

        let target_token = self.current_token.clone();
        let expression = self.parse_expression(Precedence::Lowest)?;
        if !self.is_peek_token(TokenType::Assign) {
            return Ok(Stmt::Expr(expression));
        }

        self.next_token();
        self.next_token();
        match expression {
            Expr::Ident(name) => Ok(Stmt::Assign {
                name,
                value: self.parse_expression(Precedence::Lowest)?,
            }),
            Expr::Call { callee, args } => {
                let Expr::Ident(name) = *callee else {
                    return Err(self.error_at(&target_token, "invalid function name"));
                };
                let mut params: Vec<Rc<str>> = Vec::with_capacity(args.len());
                for arg in args {
                    match arg {
                        Expr::Ident(param) if !params.contains(&param) => params.push(param),
                        Expr::Ident(param) => {
                            return Err(self.error_at(
                                &target_token,
                                format!("duplicate parameter `{}` in `{}`", param, name),
                            ));
                        }
                        _ => {
                            return Err(self.error_at(
                                &target_token,
                                format!("parameters of `{}` must be plain names", name),
                            ));
                        }
                    }
                }
                let body = self.parse_expression(Precedence::Lowest)?;
                Ok(Stmt::Function {
                    name,
                    params: params.into(),
                    body: Rc::new(body),
                })
            }
            _ => Err(self.error_at(&target_token, "invalid assignment target")),
        }
    }

    fn parse_struct_statement(&mut self) -> Result<Stmt, ParseError> {
        self.expect_peek(TokenType::Ident)?;
        let name: Rc<str> = self.current_token.literal.as_str().into();
        self.expect_peek(TokenType::LBrace)?;

        let mut fields: Vec<Rc<str>> = Vec::new();
        while !self.is_peek_token(TokenType::RBrace) {
            self.expect_peek(TokenType::Ident)?;
            let field: Rc<str> = self.current_token.literal.as_str().into();
            if fields.contains(&field) {
                return Err(self.error_at(
                    &self.current_token,
                    format!("duplicate field `{}` in struct `{}`", field, name),
                ));
            }
            fields.push(field);
            if !self.is_peek_token(TokenType::Comma) {
                break;
            }
            self.next_token();
        }
        self.expect_peek(TokenType::RBrace)?;

        Ok(Stmt::Struct { name, fields })
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Result<Expr, ParseError> {
        let start = self.current_token.clone();
        if self.depth >= MAX_NESTING {
            return Err(self.error_at(&start, "expression nested too deeply"));
        }
        self.depth += 1;
        let result = self.parse_operators(precedence, &start);
        self.depth -= 1;
        result
    }

    fn parse_operators(&mut self, precedence: Precedence, start: &Token) -> Result<Expr, ParseError> {
        let mut left = self.parse_prefix()?;

        while precedence < token_precedence(self.peek_token.token_type) {
            self.next_token();
            left = self.parse_infix(left)?;
            // Operator chains grow the tree on the left without recursing here.
            if left.height() > MAX_NESTING {
                return Err(self.error_at(start, "expression nested too deeply"));
            }
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        let token = self.current_token.clone();
        match token.token_type {
            TokenType::Int => token
                .literal
                .parse::<i64>()
                .map(Expr::Int)
                .map_err(|_| self.error_at(&token, "integer literal out of range")),
            TokenType::Float => token
                .literal
                .parse::<f64>()
                .map(Expr::Float)
                .map_err(|_| self.error_at(&token, "malformed float literal")),
            TokenType::String => Ok(Expr::Str(token.literal.as_str().into())),
            TokenType::True => Ok(Expr::Bool(true)),
            TokenType::False => Ok(Expr::Bool(false)),
            TokenType::Nothing => Ok(Expr::Nothing),
            TokenType::Ident => Ok(Expr::Ident(token.literal.as_str().into())),
            TokenType::Minus | TokenType::Bang => {
                let op = if token.token_type == TokenType::Minus {
                    PrefixOp::Neg
                } else {
                    PrefixOp::Not
                };
                self.next_token();
                let operand = self.parse_expression(Precedence::Prefix)?;
                Ok(Expr::Prefix {
                    op,
                    operand: Box::new(operand),
                })
            }
            TokenType::LParen => self.parse_grouped_or_tuple(),
            TokenType::LBracket => Ok(Expr::Array(
                self.parse_expression_list(TokenType::RBracket)?,
            )),
            _ => Err(self.unexpected(&token, "an expression")),
        }
    }

    fn parse_grouped_or_tuple(&mut self) -> Result<Expr, ParseError> {
        if self.is_peek_token(TokenType::RParen) {
            self.next_token();
            return Ok(Expr::Tuple(Vec::new()));
        }

        self.next_token();
        let first = self.parse_expression(Precedence::Lowest)?;
        if !self.is_peek_token(TokenType::Comma) {
            self.expect_peek(TokenType::RParen)?;
            return Ok(first);
        }

        let mut elements = vec![first];
        while self.is_peek_token(TokenType::Comma) {
            self.next_token();
            if self.is_peek_token(TokenType::RParen) {
                break;
            }
            self.next_token();
            elements.push(self.parse_expression(Precedence::Lowest)?);
        }
        self.expect_peek(TokenType::RParen)?;
        Ok(Expr::Tuple(elements))
    }

    fn parse_expression_list(&mut self, end: TokenType) -> Result<Vec<Expr>, ParseError> {
        let mut list = Vec::new();
        if self.is_peek_token(end) {
            self.next_token();
            return Ok(list);
        }

        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);
        while self.is_peek_token(TokenType::Comma) {
            self.next_token();
            if self.is_peek_token(end) {
                break;
            }
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }
        self.expect_peek(end)?;
        Ok(list)
    }

    fn parse_infix(&mut self, left: Expr) -> Result<Expr, ParseError> {
        let token_type = self.current_token.token_type;
        let op = match token_type {
            TokenType::LParen => {
                let args = self.parse_expression_list(TokenType::RParen)?;
                return Ok(Expr::Call {
                    callee: Box::new(left),
                    args,
                });
            }
            TokenType::LBracket => {
                self.next_token();
                let index = self.parse_expression(Precedence::Lowest)?;
                self.expect_peek(TokenType::RBracket)?;
                return Ok(Expr::Index {
                    target: Box::new(left),
                    index: Box::new(index),
                });
            }
            TokenType::Dot => {
                self.expect_peek(TokenType::Ident)?;
                return Ok(Expr::Field {
                    target: Box::new(left),
                    name: self.current_token.literal.as_str().into(),
                });
            }
            TokenType::Plus => InfixOp::Add,
            TokenType::Minus => InfixOp::Sub,
            TokenType::Asterisk => InfixOp::Mul,
            TokenType::Slash => InfixOp::Div,
            TokenType::Eq => InfixOp::Eq,
            TokenType::NotEq => InfixOp::NotEq,
            TokenType::Lt => InfixOp::Lt,
            TokenType::Gt => InfixOp::Gt,
            TokenType::Lte => InfixOp::Lte,
            TokenType::Gte => InfixOp::Gte,
            _ => return Err(self.unexpected(&self.current_token, "an operator")),
        };

        let precedence = token_precedence(token_type);
        self.next_token();
        // An operator at the end of a line continues the expression.
        while self.current_token.token_type == TokenType::Newline {
            self.next_token();
        }
        let right = self.parse_expression(precedence)?;
        Ok(Expr::Infix {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }
}
