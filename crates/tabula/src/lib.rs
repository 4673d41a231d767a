//! # tabula
//!
//! A programmable in-memory spreadsheet engine.
//!
//! Cells hold literal text or arithmetic formulas over other cells.
//! The engine keeps evaluated values consistent with their inputs
//! through a bidirectional dependency graph, rejects circular
//! dependencies before committing a change, and renders the grid as
//! tab-separated text.
//!
//! ## Example
//!
//! ```rust
//! use tabula::prelude::*;
//!
//! let mut sheet = Sheet::new();
//!
//! sheet.set("A1", "2").unwrap();
//! sheet.set("A2", "=A1*21").unwrap();
//! assert_eq!(sheet.value("A2").unwrap(), Value::Number(42.0));
//!
//! // Changing an input invalidates everything that reads it
//! sheet.set("A1", "3").unwrap();
//! assert_eq!(sheet.value("A2").unwrap(), Value::Number(63.0));
//!
//! // Cycles are rejected before anything changes
//! assert!(sheet.set("A1", "=A2").is_err());
//! ```

pub mod cell;
pub mod graph;
pub mod prelude;
pub mod sheet;

pub use cell::{Cell, CellContent};
pub use graph::DependencyGraph;
pub use sheet::Sheet;

// Re-export core types
pub use tabula_core::{
    CellError, Error, Position, Result, Value, ESCAPE_SIGN, FORMULA_SIGN, MAX_COLS, MAX_ROWS,
};

// Re-export formula types
pub use tabula_formula::{
    evaluate, parse_formula, CellResolver, Expr, FormulaError, FormulaResult, FormulaValue,
};
