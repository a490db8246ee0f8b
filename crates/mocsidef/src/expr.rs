//! Restricted arithmetic expression engine.
//!
//! Expressions are sequences of terms separated by one of `+ - * / %`.
//! There is no operator precedence and no grouping: operators apply
//! strictly in the order they are written, so `a+b*c` evaluates as
//! `(a+b)*c`. This is a language rule, not a parser shortcut — to apply
//! operators in a different order, declare intermediate variables.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A parsed arithmetic expression.
///
/// Trees are immutable, built once at parse time, and exclusively owned
/// by the variable that contains them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpressionTree {
    /// A numeric literal.
    Constant(f64),
    /// A reference to an earlier-declared variable, by name.
    Variable(String),
    /// An arithmetic combination of two subtrees.
    Binary {
        /// The operator applied to the two operands.
        op: BinaryOp,
        /// Left operand (everything parsed so far).
        left: Box<ExpressionTree>,
        /// Right operand (the term following the operator).
        right: Box<ExpressionTree>,
    },
}

/// Arithmetic operators usable between expression terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    /// Addition (`+`).
    Sum,
    /// Subtraction (`-`).
    Difference,
    /// Multiplication (`*`).
    Product,
    /// Division (`/`).
    Quotient,
    /// Remainder (`%`).
    Modulo,
}

impl BinaryOp {
    /// Maps an operator character to its operator, if it is one.
    const fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Sum),
            '-' => Some(Self::Difference),
            '*' => Some(Self::Product),
            '/' => Some(Self::Quotient),
            '%' => Some(Self::Modulo),
            _ => None,
        }
    }

    /// Applies the operator to two values.
    ///
    /// Division and remainder follow IEEE-754: a zero divisor yields an
    /// infinity or NaN rather than an error.
    fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            Self::Sum => left + right,
            Self::Difference => left - right,
            Self::Product => left * right,
            Self::Quotient => left / right,
            Self::Modulo => left % right,
        }
    }
}

impl ExpressionTree {
    /// Combines two subtrees under an operator.
    fn binary(op: BinaryOp, left: Self, right: Self) -> Self {
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Evaluates the tree against a per-trial value mapping.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownVariable`] if the mapping lacks a
    /// referenced name. Parse-time validation should make this
    /// unreachable, but mappings are rebuilt per trial so the check is
    /// repeated here.
    pub fn evaluate(&self, values: &HashMap<String, f64>) -> Result<f64> {
        match self {
            Self::Constant(value) => Ok(*value),
            Self::Variable(name) => values
                .get(name)
                .copied()
                .ok_or_else(|| Error::UnknownVariable(name.clone())),
            Self::Binary { op, left, right } => {
                let left = left.evaluate(values)?;
                let right = right.evaluate(values)?;
                Ok(op.apply(left, right))
            }
        }
    }
}

/// Parses an expression string against the set of already-declared names.
///
/// The tree is built by folding left to right: the first term becomes the
/// initial node, and each following `(operator, term)` pair wraps the
/// accumulated node and the new term in a fresh binary node.
///
/// # Errors
///
/// Returns [`Error::UndefinedVariable`] for an alphabetic term not in
/// `declared`, and [`Error::InvalidTerm`] for anything that is neither an
/// alphabetic name nor a numeric literal.
pub fn parse(input: &str, declared: &[String]) -> Result<ExpressionTree> {
    let mut accumulated: Option<(ExpressionTree, BinaryOp)> = None;
    let mut term = String::new();

    for c in input.chars() {
        if let Some(op) = BinaryOp::from_char(c) {
            let node = parse_term(&term, declared)?;
            let combined = match accumulated.take() {
                None => node,
                Some((left, pending)) => ExpressionTree::binary(pending, left, node),
            };
            accumulated = Some((combined, op));
            term.clear();
        } else {
            term.push(c);
        }
    }

    let last = parse_term(&term, declared)?;
    Ok(match accumulated {
        None => last,
        Some((left, pending)) => ExpressionTree::binary(pending, left, last),
    })
}

/// Parses a single term: an alphabetic variable name or a numeric literal.
fn parse_term(term: &str, declared: &[String]) -> Result<ExpressionTree> {
    if !term.is_empty() && term.chars().all(|c| c.is_ascii_alphabetic()) {
        if declared.iter().any(|name| name == term) {
            Ok(ExpressionTree::Variable(term.to_string()))
        } else {
            Err(Error::UndefinedVariable(term.to_string()))
        }
    } else if is_numeric_literal(term) {
        term.parse::<f64>()
            .map(ExpressionTree::Constant)
            .map_err(|_| Error::InvalidTerm(term.to_string()))
    } else {
        Err(Error::InvalidTerm(term.to_string()))
    }
}

/// Checks the `-?[0-9]+(.[0-9]+)?` literal shape.
fn is_numeric_literal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits, None),
    };
    let all_digits = |part: &str| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit());
    all_digits(whole) && fraction.map_or(true, all_digits)
}
