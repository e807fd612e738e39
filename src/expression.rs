//! Evaluation of filter expressions.
//!
//! An expression is converted to postfix by [`crate::parser`] and run on a
//! single operand stack. Comparisons and logical operators produce `1.0` for
//! true and `0.0` for false, so arithmetic and boolean composition share one
//! stack. An expression is true when exactly one operand is left and it is
//! `1.0`.
//!
//! Operands are numbers or text. When both operands of a binary operator are
//! numbers the numeric table applies; otherwise comparison and `~` operators
//! compare the text of both operands, and any other operator fails with
//! [`ExprError::UnsupportedOperand`].

use std::fmt;

use regex::Regex;
use thiserror::Error;

use crate::{
    ast::{Operator, Postfix},
    parser::to_postfix,
};

/// Errors raised while tokenizing, parsing or evaluating an expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    /// Unexpected token, unbalanced parentheses, missing operands or an
    /// invalid `~` pattern
    #[error("Malformed expression: {0}")]
    MalformedExpression(String),

    /// Operator applied to operand types it has no meaning for
    #[error("Unsupported operand type for operator {operator}: operand {left} and {right}")]
    UnsupportedOperand {
        operator: Operator,
        left: String,
        right: String,
    },
}

/// A value on the evaluation stack.
#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Number(f64),
    Text(String),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Number(n) => write!(f, "{}", n),
            Operand::Text(s) => f.write_str(s),
        }
    }
}

fn truth(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

/// Stateless evaluator of boolean filter expressions.
///
/// # Examples
///
/// ```
/// use jsonq::BoolEvaluator;
///
/// let evaluator = BoolEvaluator::new();
/// assert!(evaluator.evaluate("(3 + 4) * 2 == 14").unwrap());
/// assert!(evaluator.evaluate("'abc' ~ 'a.c'").unwrap());
/// assert!(!evaluator.evaluate("!true").unwrap());
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct BoolEvaluator;

impl BoolEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Parses and evaluates `expression`.
    pub fn evaluate(&self, expression: &str) -> Result<bool, ExprError> {
        let postfix = to_postfix(expression)?;
        self.evaluate_postfix(&postfix)
    }

    /// Runs an expression already in postfix order.
    pub fn evaluate_postfix(&self, postfix: &[Postfix]) -> Result<bool, ExprError> {
        let mut stack: Vec<Operand> = Vec::new();

        for item in postfix {
            match item {
                Postfix::Number(n) => stack.push(Operand::Number(*n)),
                Postfix::String(s) => stack.push(Operand::Text(s.clone())),
                Postfix::Identifier(word) => stack.push(match word.as_str() {
                    "true" => Operand::Number(1.0),
                    "false" => Operand::Number(0.0),
                    _ => Operand::Text(word.clone()),
                }),
                Postfix::Operator(op) => {
                    let result = self.operate(*op, &mut stack)?;
                    stack.push(Operand::Number(result));
                }
            }
        }

        match stack.as_slice() {
            [Operand::Number(n)] => Ok(*n == 1.0),
            [Operand::Text(_)] => Ok(false),
            [] => Err(ExprError::MalformedExpression(
                "expression produced no value".to_string(),
            )),
            rest => Err(ExprError::MalformedExpression(format!(
                "expression left {} operands on the stack",
                rest.len()
            ))),
        }
    }

    fn operate(&self, op: Operator, stack: &mut Vec<Operand>) -> Result<f64, ExprError> {
        let missing = || ExprError::MalformedExpression(format!("missing operand for '{}'", op));

        let b = stack.pop().ok_or_else(missing)?;
        if op.is_unary() {
            return match b {
                Operand::Number(n) => Ok(truth(n == 0.0)),
                Operand::Text(text) => Err(ExprError::UnsupportedOperand {
                    operator: op,
                    left: text,
                    right: String::new(),
                }),
            };
        }
        let a = stack.pop().ok_or_else(missing)?;

        if let (Operand::Number(x), Operand::Number(y)) = (&a, &b)
            && let Some(result) = apply_numeric(op, *x, *y)
        {
            return Ok(result);
        }
        if op.accepts_text() && !matches!((&a, &b), (Operand::Number(_), Operand::Number(_))) {
            return apply_text(op, &a.to_string(), &b.to_string());
        }

        Err(ExprError::UnsupportedOperand {
            operator: op,
            left: a.to_string(),
            right: b.to_string(),
        })
    }
}

/// Numeric operator table. `None` when the operator has no numeric meaning.
fn apply_numeric(op: Operator, a: f64, b: f64) -> Option<f64> {
    let result = match op {
        Operator::Add => a + b,
        Operator::Subtract => a - b,
        Operator::Multiply => a * b,
        Operator::Divide => a / b,
        Operator::Power => a.powf(b),
        Operator::GreaterThan => truth(a > b),
        Operator::LessThan => truth(a < b),
        Operator::Equal => truth(a == b),
        Operator::NotEqual => truth(a != b),
        Operator::GreaterEqual => truth(a >= b),
        Operator::LessEqual => truth(a <= b),
        Operator::And => truth(a != 0.0 && b != 0.0),
        Operator::Or => truth(a != 0.0 || b != 0.0),
        Operator::Matches | Operator::Not => return None,
    };
    Some(result)
}

/// Text operator table: lexicographic ordering, equality and regex full match.
fn apply_text(op: Operator, a: &str, b: &str) -> Result<f64, ExprError> {
    let result = match op {
        Operator::Equal => truth(a == b),
        Operator::NotEqual => truth(a != b),
        Operator::GreaterThan => truth(a > b),
        Operator::LessThan => truth(a < b),
        Operator::GreaterEqual => truth(a >= b),
        Operator::LessEqual => truth(a <= b),
        Operator::Matches => {
            let re = Regex::new(&format!("^(?:{})$", b)).map_err(|e| {
                ExprError::MalformedExpression(format!("invalid pattern '{}': {}", b, e))
            })?;
            truth(re.is_match(a))
        }
        _ => {
            return Err(ExprError::UnsupportedOperand {
                operator: op,
                left: a.to_string(),
                right: b.to_string(),
            });
        }
    };
    Ok(result)
}
