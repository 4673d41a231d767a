//! Formula Abstract Syntax Tree types

use std::fmt;
use tabula_core::Position;

/// Formula expression AST
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal
    Number(f64),
    /// Cell reference. `None` marks a reference that is syntactically a
    /// cell but lies outside the sheet bounds; it prints as `#REF!` and
    /// evaluates to the `#REF!` error.
    Reference(Option<Position>),
    /// Unary operation
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expr>,
    },
    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOperator {
    fn symbol(&self) -> char {
        match self {
            BinaryOperator::Add => '+',
            BinaryOperator::Subtract => '-',
            BinaryOperator::Multiply => '*',
            BinaryOperator::Divide => '/',
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    Plus,
}

impl UnaryOperator {
    fn symbol(&self) -> char {
        match self {
            UnaryOperator::Negate => '-',
            UnaryOperator::Plus => '+',
        }
    }
}

// Printing precedence levels, atoms highest.
const PREC_ADDITIVE: u8 = 1;
const PREC_MULTIPLICATIVE: u8 = 2;
const PREC_UNARY: u8 = 3;
const PREC_ATOM: u8 = 4;

impl Expr {
    fn precedence(&self) -> u8 {
        match self {
            Expr::Number(_) | Expr::Reference(_) => PREC_ATOM,
            Expr::UnaryOp { .. } => PREC_UNARY,
            Expr::BinaryOp { op, .. } => match op {
                BinaryOperator::Add | BinaryOperator::Subtract => PREC_ADDITIVE,
                BinaryOperator::Multiply | BinaryOperator::Divide => PREC_MULTIPLICATIVE,
            },
        }
    }

    /// All valid positions referenced by this expression, deduplicated
    /// and in ascending row-major order. Out-of-bounds references
    /// contribute nothing.
    pub fn referenced_positions(&self) -> Vec<Position> {
        let mut refs = Vec::new();
        self.collect_references(&mut refs);
        refs.sort();
        refs.dedup();
        refs
    }

    fn collect_references(&self, refs: &mut Vec<Position>) {
        match self {
            Expr::Reference(Some(pos)) => refs.push(*pos),
            Expr::Reference(None) | Expr::Number(_) => {}
            Expr::UnaryOp { operand, .. } => operand.collect_references(refs),
            Expr::BinaryOp { left, right, .. } => {
                left.collect_references(refs);
                right.collect_references(refs);
            }
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, needs_parens: bool) -> fmt::Result {
        if needs_parens {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

/// Canonical expression printing: unnecessary parentheses removed, binary
/// operators left-associative, operand order preserved.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Reference(Some(pos)) => write!(f, "{}", pos),
            Expr::Reference(None) => write!(f, "#REF!"),
            Expr::UnaryOp { op, operand } => {
                write!(f, "{}", op.symbol())?;
                operand.fmt_operand(f, operand.precedence() < PREC_UNARY)
            }
            Expr::BinaryOp { op, left, right } => {
                let prec = self.precedence();
                left.fmt_operand(f, left.precedence() < prec)?;
                write!(f, "{}", op.symbol())?;
                // The right operand of `-` or `/` keeps parentheses at
                // equal precedence: 1-(2-3) is not 1-2-3.
                let right_parens = right.precedence() < prec
                    || (right.precedence() == prec
                        && matches!(op, BinaryOperator::Subtract | BinaryOperator::Divide));
                right.fmt_operand(f, right_parens)
            }
        }
    }
}
