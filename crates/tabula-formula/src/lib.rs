//! # tabula-formula
//!
//! Formula parser and evaluator for the tabula spreadsheet engine.
//!
//! This crate provides:
//! - Formula parsing (text → AST)
//! - Canonical expression printing (unnecessary parentheses removed)
//! - Reference extraction (sorted, deduplicated)
//! - Formula evaluation against a cell resolver
//!
//! The surface language is arithmetic over numbers and A1 cell
//! references: `+`, `-`, `*`, `/`, unary sign, and parentheses.
//!
//! ## Example
//!
//! ```rust
//! use tabula_formula::{parse_formula, evaluate, FormulaValue};
//! use tabula_formula::evaluator::EmptyResolver;
//!
//! let ast = parse_formula("=(1+2)*3").unwrap();
//! assert_eq!(ast.to_string(), "(1+2)*3");
//! assert_eq!(evaluate(&ast, &EmptyResolver), FormulaValue::Number(9.0));
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod parser;

pub use ast::{BinaryOperator, Expr, UnaryOperator};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, CellResolver, FormulaValue};
pub use parser::parse_formula;
