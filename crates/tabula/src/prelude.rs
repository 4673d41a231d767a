//! Convenience re-exports for the common surface
//!
//! ```rust
//! use tabula::prelude::*;
//! ```

pub use crate::cell::{Cell, CellContent};
pub use crate::sheet::Sheet;
pub use tabula_core::{CellError, Error, Position, Result, Value};
