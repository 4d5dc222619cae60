use crate::syntax::token::Token;
use crate::syntax::token_type::{TokenType, lookup_ident};

/// The Flux lexer.
///
/// Newlines are statement separators only at the top nesting level; inside
/// `()`, `[]` and `{}` they are skipped like other whitespace.
#[derive(Debug, Clone)]
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    nesting: usize,
}

impl Lexer {
    pub fn new(input: impl AsRef<str>) -> Self {
        Self {
            input: input.as_ref().chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            nesting: 0,
        }
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Token {
        self.skip_ignorable();

        let line = self.line;
        let col = self.column;

        let Some(ch) = self.current_char() else {
            return Token::new(TokenType::Eof, "", line, col);
        };

        let token = match ch {
            '\n' => Token::new(TokenType::Newline, "\n", line, col),
            // Two-character operators
            '=' if self.peek_char() == Some('=') => {
                self.read_char();
                Token::new(TokenType::Eq, "==", line, col)
            }
            '!' if self.peek_char() == Some('=') => {
                self.read_char();
                Token::new(TokenType::NotEq, "!=", line, col)
            }
            '<' if self.peek_char() == Some('=') => {
                self.read_char();
                Token::new(TokenType::Lte, "<=", line, col)
            }
            '>' if self.peek_char() == Some('=') => {
                self.read_char();
                Token::new(TokenType::Gte, ">=", line, col)
            }
            // Single-character operators and delimiters
            '=' => Token::new(TokenType::Assign, "=", line, col),
            '!' => Token::new(TokenType::Bang, "!", line, col),
            '+' => Token::new(TokenType::Plus, "+", line, col),
            '-' => Token::new(TokenType::Minus, "-", line, col),
            '*' => Token::new(TokenType::Asterisk, "*", line, col),
            '/' => Token::new(TokenType::Slash, "/", line, col),
            '<' => Token::new(TokenType::Lt, "<", line, col),
            '>' => Token::new(TokenType::Gt, ">", line, col),
            ',' => Token::new(TokenType::Comma, ",", line, col),
            '.' => Token::new(TokenType::Dot, ".", line, col),
            ';' => Token::new(TokenType::Semicolon, ";", line, col),
            '(' | '[' | '{' => {
                self.nesting += 1;
                let token_type = match ch {
                    '(' => TokenType::LParen,
                    '[' => TokenType::LBracket,
                    _ => TokenType::LBrace,
                };
                Token::new(token_type, ch.to_string(), line, col)
            }
            ')' | ']' | '}' => {
                self.nesting = self.nesting.saturating_sub(1);
                let token_type = match ch {
                    ')' => TokenType::RParen,
                    ']' => TokenType::RBracket,
                    _ => TokenType::RBrace,
                };
                Token::new(token_type, ch.to_string(), line, col)
            }
            '"' => return self.read_string(line, col),
            c if c.is_ascii_digit() => return self.read_number(line, col),
            c if is_ident_start(c) => {
                let ident = self.read_identifier();
                return Token::new(lookup_ident(&ident), ident, line, col);
            }
            other => Token::new(
                TokenType::Illegal,
                format!("unexpected character `{}`", other),
                line,
                col,
            ),
        };

        self.read_char();
        token
    }

    /// Collects every token up to and including `Eof`.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.token_type == TokenType::Eof;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn read_char(&mut self) {
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

    fn skip_ignorable(&mut self) {
        while let Some(ch) = self.current_char() {
            match ch {
                '\n' if self.nesting > 0 => self.read_char(),
                '\n' => return,
                '#' => {
                    while !matches!(self.current_char(), None | Some('\n')) {
                        self.read_char();
                    }
                }
                c if c.is_whitespace() => self.read_char(),
                _ => return,
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut ident = String::new();
        while let Some(ch) = self.current_char() {
            if !is_ident_continue(ch) {
                break;
            }
            ident.push(ch);
            self.read_char();
        }
        ident
    }

    fn read_number(&mut self, line: usize, col: usize) -> Token {
        let mut literal = String::new();
        let mut is_float = false;

        self.read_digits(&mut literal);

        if self.current_char() == Some('.') && self.peek_char().is_some_and(|c| c.is_ascii_digit())
        {
            is_float = true;
            literal.push('.');
            self.read_char();
            self.read_digits(&mut literal);
        }

        if matches!(self.current_char(), Some('e' | 'E')) {
            let sign = self.peek_char();
            let digit_after_sign = self.input.get(self.position + 2).copied();
            let has_exponent = match sign {
                Some('+' | '-') => digit_after_sign.is_some_and(|c| c.is_ascii_digit()),
                Some(c) => c.is_ascii_digit(),
                None => false,
            };
            if has_exponent {
                is_float = true;
                literal.push('e');
                self.read_char();
                if let Some(c @ ('+' | '-')) = self.current_char() {
                    literal.push(c);
                    self.read_char();
                }
                self.read_digits(&mut literal);
            }
        }

        let token_type = if is_float {
            TokenType::Float
        } else {
            TokenType::Int
        };
        Token::new(token_type, literal, line, col)
    }

    fn read_digits(&mut self, out: &mut String) {
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                out.push(ch);
            } else if ch != '_' {
                break;
            }
            self.read_char();
        }
    }

    fn read_string(&mut self, line: usize, col: usize) -> Token {
        // Skip opening quote
        self.read_char();
        let mut value = String::new();

        loop {
            match self.current_char() {
                None => {
                    return Token::new(
                        TokenType::Illegal,
                        "unterminated string literal",
                        line,
                        col,
                    );
                }
                Some('"') => {
                    self.read_char();
                    return Token::new(TokenType::String, value, line, col);
                }
                Some('\\') => {
                    self.read_char();
                    let escaped = match self.current_char() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('0') => '\0',
                        Some('"') => '"',
                        Some('\\') => '\\',
                        Some(other) => {
                            return Token::new(
                                TokenType::Illegal,
                                format!("unknown escape sequence `\\{}`", other),
                                line,
                                col,
                            );
                        }
                        None => continue,
                    };
                    value.push(escaped);
                    self.read_char();
                }
                Some(ch) => {
                    value.push(ch);
                    self.read_char();
                }
            }
        }
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}
