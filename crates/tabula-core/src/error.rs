//! Error types for tabula-core

use crate::position::Position;
use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Structural errors
///
/// These abort an operation before it changes any state. Evaluation
/// failures (`#DIV/0!` and friends) are not errors in this sense; they
/// travel as [`crate::CellError`] values.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Row index out of bounds
    #[error("Row index {0} out of bounds (max: {1})")]
    RowOutOfBounds(u32, u32),

    /// Column index out of bounds
    #[error("Column index {0} out of bounds (max: {1})")]
    ColumnOutOfBounds(u32, u16),

    /// Formula parse error
    #[error("Formula parse error: {0}")]
    FormulaParse(String),

    /// Circular dependency detected
    #[error("Circular dependency involving cell {0}")]
    CircularDependency(Position),
}

impl Error {
    /// True for the bounds variants (as opposed to malformed text)
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(
            self,
            Error::RowOutOfBounds(..) | Error::ColumnOutOfBounds(..)
        )
    }
}
