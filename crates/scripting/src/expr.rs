//! Expressions
//!
//! Statements accept a few fixed expression shapes instead of general infix
//! expressions:
//!
//! - term: literal, variable or range `lo..hi`
//! - expression: `term` or `term op term`
//! - comparison: `[not] expression [cmp expression]`
//! - condition: comparisons joined by only `and` or only `or`
//!
//! Each shape has a single reading, so there is no precedence to resolve.

use crate::context::ExecutionContext;
use crate::error::{Result, ScriptError};
use crate::lexer::{Lexer, Token};
use crate::value::{mismatch, ArithOp, CmpOp, Value};
use std::ops::RangeInclusive;

/// Single operand
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Literal(Value),
    Variable(String),
    /// Range with literal or variable bounds
    Range(Box<Term>, Box<Term>),
}

/// Value expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Term(Term),
    Binary { left: Term, op: ArithOp, right: Term },
}

/// One comparison of a condition
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub negated: bool,
    pub left: Expr,
    pub right: Option<(CmpOp, Expr)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

/// Boolean condition of `if`/`while`
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub comparisons: Vec<Comparison>,
    pub connective: Connective,
}

/// Cursor over the tokens of one parameter string
pub(crate) struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
    line: usize,
}

impl TokenStream {
    pub(crate) fn new(text: &str, line: usize) -> Result<Self> {
        Ok(Self {
            tokens: Lexer::tokenize(text, line)?,
            pos: 0,
            line,
        })
    }

    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    pub(crate) fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Consume the next token if it equals `token`
    pub(crate) fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(crate) fn identifier(&mut self, what: &str) -> Result<String> {
        match self.next() {
            Some(Token::Identifier(name)) => Ok(name),
            other => Err(self.error(format!("Expected {}, found {}", what, describe(other.as_ref())))),
        }
    }

    pub(crate) fn expect(&mut self, token: Token, message: &str) -> Result<()> {
        if self.eat(&token) {
            Ok(())
        } else {
            Err(self.error(message.to_string()))
        }
    }

    pub(crate) fn expect_end(&self) -> Result<()> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(self.error(format!("Unexpected {}", describe(Some(token))))),
        }
    }

    pub(crate) fn error(&self, message: String) -> ScriptError {
        ScriptError::structure(self.line, message)
    }
}

fn describe(token: Option<&Token>) -> String {
    match token {
        None => "end of line".into(),
        Some(Token::Identifier(name)) => format!("`{}`", name),
        Some(token) => format!("{:?}", token),
    }
}

impl Term {
    pub(crate) fn parse(tokens: &mut TokenStream) -> Result<Self> {
        let term = Self::parse_operand(tokens)?;
        if tokens.eat(&Token::DotDot) {
            let hi = Self::parse_operand(tokens)?;
            return Ok(Term::Range(Box::new(term), Box::new(hi)));
        }
        Ok(term)
    }

    fn parse_operand(tokens: &mut TokenStream) -> Result<Self> {
        match tokens.next() {
            Some(Token::Integer(n)) => Ok(Term::Literal(Value::Integer(n))),
            Some(Token::Decimal(n)) => Ok(Term::Literal(Value::Decimal(n))),
            Some(Token::Text(s)) => Ok(Term::Literal(Value::Text(s))),
            Some(Token::True) => Ok(Term::Literal(Value::Bool(true))),
            Some(Token::False) => Ok(Term::Literal(Value::Bool(false))),
            Some(Token::Identifier(name)) => Ok(Term::Variable(name)),
            Some(Token::Minus) => match tokens.next() {
                Some(Token::Integer(n)) => Ok(Term::Literal(Value::Integer(-n))),
                Some(Token::Decimal(n)) => Ok(Term::Literal(Value::Decimal(-n))),
                other => Err(tokens.error(format!(
                    "Expected a number after `-`, found {}",
                    describe(other.as_ref())
                ))),
            },
            other => Err(tokens.error(format!("Expected a value, found {}", describe(other.as_ref())))),
        }
    }

    pub fn evaluate(&self, ctx: &ExecutionContext<'_>) -> Result<Value> {
        match self {
            Term::Literal(value) => Ok(value.clone()),
            Term::Variable(name) => ctx.resolve(name).cloned(),
            Term::Range(lo, hi) => {
                let lo = lo.evaluate(ctx)?;
                let hi = hi.evaluate(ctx)?;
                Ok(Value::Range(lo.as_integer()?, hi.as_integer()?))
            }
        }
    }
}

impl Expr {
    /// Parse a whole parameter string as one expression
    pub fn parse(text: &str, line: usize) -> Result<Self> {
        let mut tokens = TokenStream::new(text, line)?;
        let expr = Self::parse_tokens(&mut tokens)?;
        tokens.expect_end()?;
        Ok(expr)
    }

    pub(crate) fn parse_tokens(tokens: &mut TokenStream) -> Result<Self> {
        let left = Term::parse(tokens)?;
        let op = match tokens.peek() {
            Some(Token::Plus) => ArithOp::Add,
            Some(Token::Minus) => ArithOp::Sub,
            Some(Token::Star) => ArithOp::Mul,
            Some(Token::Slash) => ArithOp::Div,
            Some(Token::Percent) => ArithOp::Mod,
            _ => return Ok(Expr::Term(left)),
        };
        tokens.next();
        let right = Term::parse(tokens)?;
        Ok(Expr::Binary { left, op, right })
    }

    /// Parse a comma separated list of expressions; empty text is an empty list
    pub(crate) fn parse_list(tokens: &mut TokenStream) -> Result<Vec<Self>> {
        let mut exprs = Vec::new();
        if tokens.is_empty() {
            return Ok(exprs);
        }
        loop {
            exprs.push(Self::parse_tokens(tokens)?);
            if !tokens.eat(&Token::Comma) {
                break;
            }
        }
        Ok(exprs)
    }

    pub fn evaluate(&self, ctx: &ExecutionContext<'_>) -> Result<Value> {
        match self {
            Expr::Term(term) => term.evaluate(ctx),
            Expr::Binary { left, op, right } => {
                let left = left.evaluate(ctx)?;
                let right = right.evaluate(ctx)?;
                left.arithmetic(*op, &right)
            }
        }
    }
}

impl Comparison {
    fn parse(tokens: &mut TokenStream) -> Result<Self> {
        let negated = tokens.eat(&Token::Not);
        let left = Expr::parse_tokens(tokens)?;
        let op = match tokens.peek() {
            Some(Token::Equal) => CmpOp::Equal,
            Some(Token::NotEqual) => CmpOp::NotEqual,
            Some(Token::Less) => CmpOp::Less,
            Some(Token::Greater) => CmpOp::Greater,
            Some(Token::LessEqual) => CmpOp::LessEqual,
            Some(Token::GreaterEqual) => CmpOp::GreaterEqual,
            Some(Token::In) => CmpOp::In,
            Some(Token::Assign) => {
                return Err(tokens.error("Use `==` to compare values".into()));
            }
            _ => {
                return Ok(Self {
                    negated,
                    left,
                    right: None,
                })
            }
        };
        tokens.next();
        let right = Expr::parse_tokens(tokens)?;
        Ok(Self {
            negated,
            left,
            right: Some((op, right)),
        })
    }

    fn evaluate(&self, ctx: &ExecutionContext<'_>) -> Result<bool> {
        let left = self.left.evaluate(ctx)?;
        let result = match &self.right {
            None => left.is_truthy(),
            Some((op, right)) => left.compare(*op, &right.evaluate(ctx)?)?,
        };
        Ok(result != self.negated)
    }
}

impl Condition {
    pub fn parse(text: &str, line: usize) -> Result<Self> {
        let mut tokens = TokenStream::new(text, line)?;
        if tokens.is_empty() {
            return Err(tokens.error("Missing condition".into()));
        }

        let mut comparisons = vec![Comparison::parse(&mut tokens)?];
        let mut connective = None;

        while let Some(next) = tokens.peek() {
            let found = match next {
                Token::And => Connective::And,
                Token::Or => Connective::Or,
                _ => break,
            };
            if connective.is_some_and(|c| c != found) {
                return Err(tokens.error("Cannot mix `and` with `or` in one condition".into()));
            }
            connective = Some(found);
            tokens.next();
            comparisons.push(Comparison::parse(&mut tokens)?);
        }

        tokens.expect_end()?;
        Ok(Self {
            comparisons,
            connective: connective.unwrap_or(Connective::And),
        })
    }

    pub fn evaluate(&self, ctx: &ExecutionContext<'_>) -> Result<bool> {
        for comparison in &self.comparisons {
            let holds = comparison.evaluate(ctx)?;
            match self.connective {
                Connective::And if !holds => return Ok(false),
                Connective::Or if holds => return Ok(true),
                _ => {}
            }
        }
        Ok(self.connective == Connective::And)
    }
}

/// What a `for-each` loop walks over
#[derive(Debug, Clone, PartialEq)]
pub enum IterSource {
    /// Expression that must evaluate to a range
    Range(Expr),
    /// Explicit comma separated items
    List(Vec<Expr>),
}

impl IterSource {
    pub(crate) fn parse(tokens: &mut TokenStream) -> Result<Self> {
        let mut items = Expr::parse_list(tokens)?;
        match items.len() {
            0 => Err(tokens.error("Missing loop source".into())),
            1 => Ok(IterSource::Range(items.remove(0))),
            _ => Ok(IterSource::List(items)),
        }
    }

    /// Evaluate the source once into the items to visit.
    ///
    /// Ranges are walked lazily, so a loop that breaks early never touches
    /// the rest of the range.
    pub fn items(&self, ctx: &ExecutionContext<'_>) -> Result<Items> {
        match self {
            IterSource::Range(expr) => match expr.evaluate(ctx)? {
                Value::Range(lo, hi) => Ok(Items::Range(lo..=hi)),
                other => Err(mismatch("range", &other)),
            },
            IterSource::List(exprs) => {
                let values = exprs
                    .iter()
                    .map(|expr| expr.evaluate(ctx))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Items::List(values.into_iter()))
            }
        }
    }
}

/// Items of an evaluated loop source
#[derive(Debug, Clone)]
pub enum Items {
    Range(RangeInclusive<i64>),
    List(std::vec::IntoIter<Value>),
}

impl Iterator for Items {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        match self {
            Items::Range(range) => range.next().map(Value::Integer),
            Items::List(values) => values.next(),
        }
    }
}
