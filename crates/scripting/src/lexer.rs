//! Parameter tokenizer
//!
//! The line reader only splits a line into its keyword and parameter text.
//! Statements run the parameter text through this lexer when they parse
//! their own arguments.

use crate::error::{Result, ScriptError};
use std::iter::Peekable;
use std::str::Chars;

/// Parameter token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Integer(i64),
    Decimal(f64),
    Text(String),
    Identifier(String),
    True,
    False,

    // Arithmetic
    Plus,           // +
    Minus,          // -
    Star,           // *
    Slash,          // /
    Percent,        // %

    // Comparison
    Equal,          // ==
    NotEqual,       // !=
    Less,           // <
    Greater,        // >
    LessEqual,      // <=
    GreaterEqual,   // >=
    In,             // in

    // Logical
    And,            // && / and
    Or,             // || / or
    Not,            // ! / not

    // Punctuation
    Assign,         // =
    DotDot,         // ..
    Comma,          // ,
    Colon,          // :

    EOF,
}

/// Parameter lexer
pub struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
    line: usize,
    ch: Option<char>,
}

impl<'a> Lexer<'a> {
    /// Create a lexer for the parameter text of source line `line`
    pub fn new(input: &'a str, line: usize) -> Self {
        let mut chars = input.chars().peekable();
        let ch = chars.next();
        Self { input: chars, line, ch }
    }

    /// Tokenize the whole input, excluding the trailing `EOF`
    pub fn tokenize(input: &'a str, line: usize) -> Result<Vec<Token>> {
        let mut lexer = Self::new(input, line);
        let mut tokens = Vec::new();
        loop {
            match lexer.next_token()? {
                Token::EOF => return Ok(tokens),
                token => tokens.push(token),
            }
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();

        let Some(ch) = self.ch else {
            return Ok(Token::EOF);
        };

        match ch {
            '0'..='9' => self.read_number(),
            '"' => self.read_string(),
            c if c.is_alphabetic() || c == '_' => Ok(self.read_identifier()),

            '+' => self.single(Token::Plus),
            '-' => self.single(Token::Minus),
            '*' => self.single(Token::Star),
            '/' => self.single(Token::Slash),
            '%' => self.single(Token::Percent),
            ',' => self.single(Token::Comma),
            ':' => self.single(Token::Colon),

            '=' => Ok(self.with_equals(Token::Equal, Token::Assign)),
            '!' => Ok(self.with_equals(Token::NotEqual, Token::Not)),
            '<' => Ok(self.with_equals(Token::LessEqual, Token::Less)),
            '>' => Ok(self.with_equals(Token::GreaterEqual, Token::Greater)),

            '&' => self.doubled('&', Token::And),
            '|' => self.doubled('|', Token::Or),
            '.' => self.doubled('.', Token::DotDot),

            _ => Err(self.error(format!("Unexpected character: {}", ch))),
        }
    }

    fn single(&mut self, token: Token) -> Result<Token> {
        self.advance();
        Ok(token)
    }

    /// `x=` becomes `with`, a lone `x` becomes `without`
    fn with_equals(&mut self, with: Token, without: Token) -> Token {
        self.advance();
        if self.ch == Some('=') {
            self.advance();
            with
        } else {
            without
        }
    }

    fn doubled(&mut self, expected: char, token: Token) -> Result<Token> {
        self.advance();
        if self.ch == Some(expected) {
            self.advance();
            Ok(token)
        } else {
            Err(self.error(format!("Expected `{}{}`", expected, expected)))
        }
    }

    /// Read an integer or decimal literal
    fn read_number(&mut self) -> Result<Token> {
        let mut num_str = String::new();
        let mut is_decimal = false;

        while let Some(ch) = self.ch {
            if ch.is_ascii_digit() {
                num_str.push(ch);
                self.advance();
            } else if ch == '.' && !is_decimal && self.peek_is_digit() {
                // `1..5` must stay a range, so a dot only counts when a digit follows
                is_decimal = true;
                num_str.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if is_decimal {
            num_str
                .parse()
                .map(Token::Decimal)
                .map_err(|_| self.error(format!("Invalid number: {}", num_str)))
        } else {
            num_str
                .parse()
                .map(Token::Integer)
                .map_err(|_| self.error(format!("Invalid number: {}", num_str)))
        }
    }

    /// Read an identifier or word operator
    fn read_identifier(&mut self) -> Token {
        let mut ident = String::new();

        while let Some(ch) = self.ch {
            if ch.is_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match ident.as_str() {
            "true" => Token::True,
            "false" => Token::False,
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            "in" => Token::In,
            _ => Token::Identifier(ident),
        }
    }

    /// Read a string literal
    fn read_string(&mut self) -> Result<Token> {
        self.advance(); // Skip opening quote

        let mut s = String::new();

        while let Some(ch) = self.ch {
            if ch == '"' {
                self.advance();
                return Ok(Token::Text(s));
            } else if ch == '\\' {
                self.advance();
                if let Some(escaped) = self.ch {
                    match escaped {
                        'n' => s.push('\n'),
                        't' => s.push('\t'),
                        _ => s.push(escaped),
                    }
                }
                self.advance();
            } else {
                s.push(ch);
                self.advance();
            }
        }

        Err(ScriptError::malformed(self.line, "Unterminated string"))
    }

    fn peek_is_digit(&mut self) -> bool {
        matches!(self.input.peek(), Some(c) if c.is_ascii_digit())
    }

    fn advance(&mut self) {
        self.ch = self.input.next();
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.ch, Some(ch) if ch.is_whitespace()) {
            self.advance();
        }
    }

    fn error(&self, message: String) -> ScriptError {
        ScriptError::structure(self.line, message)
    }
}
