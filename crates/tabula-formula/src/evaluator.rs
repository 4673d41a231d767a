//! Formula evaluator
//!
//! Evaluates formula ASTs against a cell resolver.

use crate::ast::{BinaryOperator, Expr, UnaryOperator};
use tabula_core::{CellError, Position};

/// Result of evaluating a formula: a number or an error value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormulaValue {
    Number(f64),
    Error(CellError),
}

impl FormulaValue {
    /// Get the number, if this is one
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FormulaValue::Number(n) => Some(*n),
            FormulaValue::Error(_) => None,
        }
    }

    /// Get the error, if this is one
    pub fn get_error(&self) -> Option<CellError> {
        match self {
            FormulaValue::Number(_) => None,
            FormulaValue::Error(e) => Some(*e),
        }
    }
}

/// The narrow interface through which a formula reads other cells
///
/// The sheet engine implements this and passes itself to [`evaluate`].
/// The resolution contract:
/// - an empty or unset cell resolves to `Number(0.0)`
/// - a text cell resolves to its numeric value when the whole trimmed
///   text parses as a number, otherwise to `Error(Value)`
/// - a formula cell resolves to its evaluated value; errors propagate
///
/// Only valid positions reach the resolver; out-of-bounds references are
/// handled by the evaluator itself.
pub trait CellResolver {
    fn resolve(&self, pos: Position) -> FormulaValue;
}

/// A resolver over an empty sheet: every reference reads as zero
///
/// Useful for evaluating reference-free formulas and in tests.
pub struct EmptyResolver;

impl CellResolver for EmptyResolver {
    fn resolve(&self, _pos: Position) -> FormulaValue {
        FormulaValue::Number(0.0)
    }
}

/// Evaluate a formula expression
///
/// Errors are values, not `Err`: a division by zero yields
/// `FormulaValue::Error(CellError::Div0)` and propagates through any
/// enclosing arithmetic.
pub fn evaluate(expr: &Expr, resolver: &dyn CellResolver) -> FormulaValue {
    match expr {
        // An overflowing literal parses to infinity; it is an
        // arithmetic error, not a number
        Expr::Number(n) => {
            if n.is_finite() {
                FormulaValue::Number(*n)
            } else {
                FormulaValue::Error(CellError::Arithm)
            }
        }

        Expr::Reference(Some(pos)) => resolver.resolve(*pos),
        Expr::Reference(None) => FormulaValue::Error(CellError::Ref),

        Expr::UnaryOp { op, operand } => {
            let value = match evaluate(operand, resolver) {
                FormulaValue::Number(n) => n,
                err => return err,
            };
            let result = match op {
                UnaryOperator::Negate => -value,
                UnaryOperator::Plus => value,
            };
            if result.is_finite() {
                FormulaValue::Number(result)
            } else {
                FormulaValue::Error(CellError::Arithm)
            }
        }

        Expr::BinaryOp { op, left, right } => {
            let l = match evaluate(left, resolver) {
                FormulaValue::Number(n) => n,
                err => return err,
            };
            let r = match evaluate(right, resolver) {
                FormulaValue::Number(n) => n,
                err => return err,
            };

            let result = match op {
                BinaryOperator::Add => l + r,
                BinaryOperator::Subtract => l - r,
                BinaryOperator::Multiply => l * r,
                BinaryOperator::Divide => {
                    if r == 0.0 {
                        return FormulaValue::Error(CellError::Div0);
                    }
                    l / r
                }
            };

            if result.is_finite() {
                FormulaValue::Number(result)
            } else {
                FormulaValue::Error(CellError::Arithm)
            }
        }
    }
}
