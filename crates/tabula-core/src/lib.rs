//! # tabula-core
//!
//! Core data structures for the tabula spreadsheet engine.
//!
//! This crate provides the fundamental types used throughout tabula:
//! - [`Position`] - Cell coordinates with A1-style text encoding
//! - [`Value`] - What a cell evaluates to (text, number, or error)
//! - [`CellError`] - Evaluation errors delivered as values (`#DIV/0!`, `#REF!`, ...)
//! - [`Error`] - Structural errors (invalid addresses, circular dependencies, ...)
//!
//! ## Example
//!
//! ```rust
//! use tabula_core::Position;
//!
//! let pos = Position::parse("AB27").unwrap();
//! assert_eq!(pos.row, 26);
//! assert_eq!(pos.col, 27);
//! assert_eq!(pos.to_a1_string(), "AB27");
//! ```

pub mod error;
pub mod position;
pub mod value;

// Re-exports for convenience
pub use error::{Error, Result};
pub use position::Position;
pub use value::{CellError, Value};

/// Maximum number of rows in a sheet
pub const MAX_ROWS: u32 = 16_384;

/// Maximum number of columns in a sheet
pub const MAX_COLS: u16 = 16_384;

/// First character of a cell text that marks a formula
pub const FORMULA_SIGN: char = '=';

/// First character of a cell text that forces literal text
pub const ESCAPE_SIGN: char = '\'';
