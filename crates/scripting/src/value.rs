//! Runtime values
//!
//! Scripts only deal with a handful of scalar kinds. Everything a statement
//! evaluates, stores or hands to a native call is one of these.

use crate::error::{Result, ScriptError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Script runtime value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum Value {
    Integer(i64),
    Decimal(f64),
    Text(String),
    /// Inclusive integer range `lo..hi`
    Range(i64, i64),
    Bool(bool),
}

/// Arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    In,
}

impl Value {
    /// Name of the value kind, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Decimal(_) => "decimal",
            Value::Text(_) => "string",
            Value::Range(..) => "range",
            Value::Bool(_) => "boolean",
        }
    }

    /// Check if value is truthy (for conditionals)
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Integer(n) => *n != 0,
            Value::Decimal(n) => *n != 0.0,
            Value::Text(s) => !s.is_empty(),
            Value::Range(lo, hi) => lo <= hi,
        }
    }

    pub fn as_integer(&self) -> Result<i64> {
        match self {
            Value::Integer(n) => Ok(*n),
            other => Err(mismatch("integer", other)),
        }
    }

    /// Numeric value, integers widened to `f64`
    pub fn as_decimal(&self) -> Result<f64> {
        match self {
            Value::Integer(n) => Ok(*n as f64),
            Value::Decimal(n) => Ok(*n),
            other => Err(mismatch("number", other)),
        }
    }

    pub fn as_text(&self) -> Result<&str> {
        match self {
            Value::Text(s) => Ok(s),
            other => Err(mismatch("string", other)),
        }
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(mismatch("boolean", other)),
        }
    }

    pub fn as_range(&self) -> Result<(i64, i64)> {
        match self {
            Value::Range(lo, hi) => Ok((*lo, *hi)),
            other => Err(mismatch("range", other)),
        }
    }

    /// Apply an arithmetic operator.
    ///
    /// Integers stay integers (checked), any decimal operand promotes the
    /// result to decimal, and `+` with a string operand concatenates.
    pub fn arithmetic(&self, op: ArithOp, rhs: &Value) -> Result<Value> {
        match (self, rhs) {
            (Value::Text(_), _) | (_, Value::Text(_)) if op == ArithOp::Add => {
                Ok(Value::Text(format!("{}{}", self, rhs)))
            }
            (Value::Integer(a), Value::Integer(b)) => integer_op(*a, op, *b).map(Value::Integer),
            (Value::Integer(_) | Value::Decimal(_), Value::Integer(_) | Value::Decimal(_)) => {
                decimal_op(self.as_decimal()?, op, rhs.as_decimal()?).map(Value::Decimal)
            }
            (Value::Integer(_) | Value::Decimal(_), other) => Err(mismatch("number", other)),
            (other, _) => Err(mismatch("number", other)),
        }
    }

    /// Apply a comparison operator
    pub fn compare(&self, op: CmpOp, rhs: &Value) -> Result<bool> {
        match op {
            CmpOp::Equal => Ok(self.loose_eq(rhs)),
            CmpOp::NotEqual => Ok(!self.loose_eq(rhs)),
            CmpOp::In => {
                let needle = self.as_integer()?;
                let (lo, hi) = rhs.as_range()?;
                Ok(lo <= needle && needle <= hi)
            }
            CmpOp::Less => Ok(self.ordering(rhs)? == Ordering::Less),
            CmpOp::Greater => Ok(self.ordering(rhs)? == Ordering::Greater),
            CmpOp::LessEqual => Ok(self.ordering(rhs)? != Ordering::Greater),
            CmpOp::GreaterEqual => Ok(self.ordering(rhs)? != Ordering::Less),
        }
    }

    fn loose_eq(&self, rhs: &Value) -> bool {
        match (self, rhs) {
            (Value::Integer(a), Value::Decimal(b)) | (Value::Decimal(b), Value::Integer(a)) => {
                (*a as f64) == *b
            }
            _ => self == rhs,
        }
    }

    fn ordering(&self, rhs: &Value) -> Result<Ordering> {
        match (self, rhs) {
            (Value::Integer(a), Value::Integer(b)) => Ok(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Ok(a.cmp(b)),
            (Value::Integer(_) | Value::Decimal(_), Value::Integer(_) | Value::Decimal(_)) => self
                .as_decimal()?
                .partial_cmp(&rhs.as_decimal()?)
                .ok_or_else(|| ScriptError::Arithmetic("cannot order NaN".into())),
            (Value::Text(_), other) => Err(mismatch("string", other)),
            (Value::Integer(_) | Value::Decimal(_), other) => Err(mismatch("number", other)),
            (other, _) => Err(mismatch("number or string", other)),
        }
    }
}

fn integer_op(a: i64, op: ArithOp, b: i64) -> Result<i64> {
    let result = match op {
        ArithOp::Add => a.checked_add(b),
        ArithOp::Sub => a.checked_sub(b),
        ArithOp::Mul => a.checked_mul(b),
        ArithOp::Div | ArithOp::Mod if b == 0 => {
            return Err(ScriptError::Arithmetic("division by zero".into()))
        }
        ArithOp::Div => a.checked_div(b),
        ArithOp::Mod => a.checked_rem(b),
    };

    result.ok_or_else(|| ScriptError::Arithmetic(format!("integer overflow in {} {} {}", a, op, b)))
}

fn decimal_op(a: f64, op: ArithOp, b: f64) -> Result<f64> {
    match op {
        ArithOp::Add => Ok(a + b),
        ArithOp::Sub => Ok(a - b),
        ArithOp::Mul => Ok(a * b),
        ArithOp::Div | ArithOp::Mod if b == 0.0 => {
            Err(ScriptError::Arithmetic("division by zero".into()))
        }
        ArithOp::Div => Ok(a / b),
        ArithOp::Mod => Ok(a % b),
    }
}

pub(crate) fn mismatch(expected: &'static str, found: &Value) -> ScriptError {
    ScriptError::TypeMismatch {
        expected,
        found: found.kind(),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Decimal(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
            Value::Range(lo, hi) => write!(f, "{}..{}", lo, hi),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let symbol = match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Mod => "%",
        };
        f.write_str(symbol)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Decimal(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(Value::Integer(3).is_truthy());
        assert!(!Value::Integer(0).is_truthy());
        assert!(!Value::Text(String::new()).is_truthy());
        assert!(Value::Range(1, 1).is_truthy());
        assert!(!Value::Range(3, 1).is_truthy());
        assert!(!Value::Bool(false).is_truthy());
    }

    #[test]
    fn test_integer_arithmetic() {
        let seven = Value::Integer(7);
        assert_eq!(seven.arithmetic(ArithOp::Div, &Value::Integer(2)).unwrap(), Value::Integer(3));
        assert_eq!(seven.arithmetic(ArithOp::Mod, &Value::Integer(4)).unwrap(), Value::Integer(3));
        assert!(matches!(
            seven.arithmetic(ArithOp::Div, &Value::Integer(0)),
            Err(ScriptError::Arithmetic(_))
        ));
        assert!(matches!(
            Value::Integer(i64::MAX).arithmetic(ArithOp::Add, &Value::Integer(1)),
            Err(ScriptError::Arithmetic(_))
        ));
    }

    #[test]
    fn test_mixed_arithmetic_promotes() {
        let result = Value::Integer(1).arithmetic(ArithOp::Add, &Value::Decimal(0.5)).unwrap();
        assert_eq!(result, Value::Decimal(1.5));
        assert!(matches!(
            Value::Decimal(1.0).arithmetic(ArithOp::Div, &Value::Integer(0)),
            Err(ScriptError::Arithmetic(_))
        ));
    }

    #[test]
    fn test_string_concatenation() {
        let greeting = Value::from("Level ").arithmetic(ArithOp::Add, &Value::Integer(5)).unwrap();
        assert_eq!(greeting, Value::from("Level 5"));
        assert!(matches!(
            Value::from("a").arithmetic(ArithOp::Mul, &Value::Integer(2)),
            Err(ScriptError::TypeMismatch { expected: "number", found: "string" })
        ));
    }

    #[test]
    fn test_comparisons() {
        assert!(Value::Integer(2).compare(CmpOp::Less, &Value::Decimal(2.5)).unwrap());
        assert!(Value::Integer(2).compare(CmpOp::Equal, &Value::Decimal(2.0)).unwrap());
        assert!(Value::from("abc").compare(CmpOp::Less, &Value::from("abd")).unwrap());
        assert!(Value::from("1").compare(CmpOp::NotEqual, &Value::Integer(1)).unwrap());
        assert!(Value::Integer(5).compare(CmpOp::In, &Value::Range(1, 10)).unwrap());
        assert!(!Value::Integer(11).compare(CmpOp::In, &Value::Range(1, 10)).unwrap());
        assert!(matches!(
            Value::from("a").compare(CmpOp::Greater, &Value::Integer(1)),
            Err(ScriptError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_json_tagging() {
        let json = serde_json::to_string(&Value::Range(2, 4)).unwrap();
        assert_eq!(json, r#"{"t":"Range","v":[2,4]}"#);
        let back: Value = serde_json::from_str(r#"{"t":"Text","v":"hi"}"#).unwrap();
        assert_eq!(back, Value::from("hi"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Range(1, 3).to_string(), "1..3");
        assert_eq!(Value::Decimal(0.25).to_string(), "0.25");
        assert_eq!(Value::Bool(true).to_string(), "true");
    }
}
