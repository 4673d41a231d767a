//! The sheet: cell storage, the set/clear protocol, and rendering
//!
//! Cells live in sparse row-keyed storage. Every mutation goes through a
//! two-phase protocol: build and verify a candidate first, swap second. A
//! failed verification leaves no trace.

use std::collections::BTreeMap;
use std::io;

use tabula_core::{CellError, Error, Position, Result, Value, MAX_COLS, MAX_ROWS};
use tabula_formula::{evaluate, CellResolver, FormulaValue};

use crate::cell::{Cell, CellContent};
use crate::graph::DependencyGraph;

/// A two-dimensional grid of cells with dependency tracking
///
/// Values are computed on demand and cached; changing a cell invalidates
/// the caches of everything that transitively reads it (push
/// invalidation, pull recompute).
#[derive(Debug, Default)]
pub struct Sheet {
    /// Row index → column map (sparse, only touched slots stored)
    rows: BTreeMap<u32, BTreeMap<u16, Cell>>,
    graph: DependencyGraph,
}

impl Sheet {
    /// Create a new empty sheet
    pub fn new() -> Self {
        Self::default()
    }

    // === Cell modification ===

    /// Set a cell by address string (e.g., "A1")
    pub fn set(&mut self, address: &str, text: &str) -> Result<()> {
        let pos = Position::parse(address)?;
        self.set_cell(pos, text)
    }

    /// Set a cell's content from raw text
    ///
    /// Empty text clears the cell. A leading `'` forces literal text; `=`
    /// followed by a non-space body is parsed as a formula. The commit is
    /// atomic: on a parse failure or a circular dependency the cell
    /// content, the dependency edges and every cache are left exactly as
    /// they were.
    pub fn set_cell(&mut self, pos: Position, text: &str) -> Result<()> {
        Self::validate_position(pos)?;

        if text.is_empty() {
            return self.clear_cell(pos);
        }

        // The target slot exists from here on even if the set fails
        // below: a failed set leaves an empty cell, not a missing one.
        self.ensure_cell(pos);

        let candidate =
            CellContent::from_input(text).map_err(|e| Error::FormulaParse(e.to_string()))?;

        let refs: Vec<Position> = match &candidate {
            CellContent::Formula { refs, .. } => refs.clone(),
            _ => Vec::new(),
        };

        // Referenced cells may be created ahead of the cycle check: an
        // empty cell introduces no edges.
        for &referenced in &refs {
            self.ensure_cell(referenced);
        }

        if self.graph.would_create_cycle(pos, &refs) {
            log::trace!("set {} rejected: circular dependency", pos);
            return Err(Error::CircularDependency(pos));
        }

        // Commit: rewrite this cell's outgoing edges, install the
        // content, invalidate everything that reads it.
        self.graph.set_precedents(pos, &refs);
        if let Some(cell) = self.cell_mut(pos) {
            cell.set_content(candidate);
        }
        self.invalidate_from(pos);

        log::debug!("set {} ({} reference(s))", pos, refs.len());
        Ok(())
    }

    /// Clear a cell by address string
    pub fn clear(&mut self, address: &str) -> Result<()> {
        let pos = Position::parse(address)?;
        self.clear_cell(pos)
    }

    /// Reset a cell to empty
    ///
    /// Dependents are invalidated first; they keep their edges into this
    /// position and will read it as empty from now on. The storage slot
    /// itself is released only when nothing depends on it.
    pub fn clear_cell(&mut self, pos: Position) -> Result<()> {
        Self::validate_position(pos)?;

        if self.cell_at(pos).is_none() {
            return Ok(());
        }

        self.invalidate_from(pos);
        self.graph.clear_precedents(pos);

        if self.graph.is_referenced(pos) {
            if let Some(cell) = self.cell_mut(pos) {
                cell.set_content(CellContent::Empty);
            }
        } else {
            self.remove_slot(pos);
        }

        log::debug!("clear {}", pos);
        Ok(())
    }

    // === Cell access ===

    /// Get a cell by address string
    ///
    /// `Ok(None)` means the slot was never written to (or was released by
    /// a clear).
    pub fn cell(&self, address: &str) -> Result<Option<&Cell>> {
        let pos = Position::parse(address)?;
        Ok(self.cell_at(pos))
    }

    /// Get a cell by position
    pub fn cell_at(&self, pos: Position) -> Option<&Cell> {
        self.rows.get(&pos.row).and_then(|row| row.get(&pos.col))
    }

    /// Get a cell's evaluated value by address string
    pub fn value(&mut self, address: &str) -> Result<Value> {
        let pos = Position::parse(address)?;
        Ok(self.value_at(pos))
    }

    /// Get a cell's evaluated value by position
    ///
    /// Lazy and cached: formulas are recomputed only when stale, reading
    /// their precedents' settled values. Empty and unset cells yield the
    /// empty text value; evaluation failures come back as
    /// [`Value::Error`], never as `Err`.
    pub fn value_at(&mut self, pos: Position) -> Value {
        self.ensure_evaluated(pos);
        match self.cell_at(pos) {
            None => Value::default(),
            Some(cell) => cell
                .cached_value()
                .cloned()
                .unwrap_or_else(|| cell.display_value()),
        }
    }

    /// Check if any formula reads the given position
    pub fn is_referenced(&self, pos: Position) -> bool {
        self.graph.is_referenced(pos)
    }

    /// Get the number of stored cells
    pub fn cell_count(&self) -> usize {
        self.rows.values().map(|row| row.len()).sum()
    }

    /// Check if no cell is stored
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over all stored cells in row-major order
    pub fn iter_cells(&self) -> impl Iterator<Item = (Position, &Cell)> {
        self.rows.iter().flat_map(|(&row, cols)| {
            cols.iter()
                .map(move |(&col, cell)| (Position::new(row, col), cell))
        })
    }

    // === Rendering ===

    /// The smallest rectangle anchored at A1 containing every cell with
    /// non-empty stored text; `(0, 0)` when there is none
    pub fn printable_size(&self) -> (u32, u16) {
        let mut row_count = 0u32;
        let mut col_count = 0u16;

        for (pos, cell) in self.iter_cells() {
            if !cell.text().is_empty() {
                row_count = row_count.max(pos.row + 1);
                col_count = col_count.max(pos.col + 1);
            }
        }

        (row_count, col_count)
    }

    /// Write the evaluated grid: columns separated by a tab, rows
    /// terminated by a newline, empty cells as empty fields
    ///
    /// A sheet with no printable cells writes nothing (not even a
    /// newline).
    pub fn print_values<W: io::Write>(&mut self, out: &mut W) -> io::Result<()> {
        let (row_count, col_count) = self.printable_size();

        for row in 0..row_count {
            for col in 0..col_count {
                if col > 0 {
                    out.write_all(b"\t")?;
                }
                let pos = Position::new(row, col);
                let printable = self
                    .cell_at(pos)
                    .map_or(false, |cell| !cell.text().is_empty());
                if printable {
                    write!(out, "{}", self.value_at(pos))?;
                }
            }
            out.write_all(b"\n")?;
        }

        Ok(())
    }

    /// Write the raw grid: the stored text of each cell in the printable
    /// rectangle, tab-separated
    pub fn print_texts<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        let (row_count, col_count) = self.printable_size();

        for row in 0..row_count {
            for col in 0..col_count {
                if col > 0 {
                    out.write_all(b"\t")?;
                }
                if let Some(cell) = self.cell_at(Position::new(row, col)) {
                    out.write_all(cell.text().as_bytes())?;
                }
            }
            out.write_all(b"\n")?;
        }

        Ok(())
    }

    // === Internal ===

    fn validate_position(pos: Position) -> Result<()> {
        if pos.row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(pos.row, MAX_ROWS - 1));
        }
        if pos.col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(pos.col as u32, MAX_COLS - 1));
        }
        Ok(())
    }

    fn cell_mut(&mut self, pos: Position) -> Option<&mut Cell> {
        self.rows.get_mut(&pos.row).and_then(|row| row.get_mut(&pos.col))
    }

    fn ensure_cell(&mut self, pos: Position) {
        self.rows
            .entry(pos.row)
            .or_default()
            .entry(pos.col)
            .or_insert_with(Cell::empty);
    }

    fn remove_slot(&mut self, pos: Position) {
        if let Some(row) = self.rows.get_mut(&pos.row) {
            row.remove(&pos.col);
            if row.is_empty() {
                self.rows.remove(&pos.row);
            }
        }
    }

    /// Mark a cell and everything that transitively reads it as stale
    ///
    /// The origin is always invalidated; the walk over dependents stops
    /// at cells that are already stale, whose dependents are stale too.
    /// Terminates because the committed graph is acyclic.
    fn invalidate_from(&mut self, origin: Position) {
        if let Some(cell) = self.cell_mut(origin) {
            cell.invalidate();
        }

        let mut stack: Vec<Position> = self.graph.get_dependents(origin).collect();
        while let Some(pos) = stack.pop() {
            match self.cell_mut(pos) {
                Some(cell) if cell.dirty() => continue,
                Some(cell) => cell.invalidate(),
                None => continue,
            }
            stack.extend(self.graph.get_dependents(pos));
        }
    }

    /// Settle a cell's cached value, evaluating stale precedents first
    ///
    /// Depth-first over the committed (acyclic) graph, so recursion depth
    /// is bounded by the longest dependency chain.
    fn ensure_evaluated(&mut self, pos: Position) {
        let formula = match self.cell_at(pos) {
            None => return,
            Some(cell) if !cell.dirty() => return,
            Some(cell) => match cell.content() {
                CellContent::Formula { ast, refs, .. } => Some((ast.clone(), refs.clone())),
                _ => None,
            },
        };

        match formula {
            Some((ast, refs)) => {
                for child in refs {
                    self.ensure_evaluated(child);
                }
                let value = match evaluate(&ast, &*self) {
                    FormulaValue::Number(n) => Value::Number(n),
                    FormulaValue::Error(e) => Value::Error(e),
                };
                if let Some(cell) = self.cell_mut(pos) {
                    cell.settle(value);
                }
            }
            None => {
                // Text and empty cells have nothing to compute; settling
                // them keeps the fresh set closed under precedents.
                let value = self
                    .cell_at(pos)
                    .map(|cell| cell.display_value())
                    .unwrap_or_default();
                if let Some(cell) = self.cell_mut(pos) {
                    cell.settle(value);
                }
            }
        }
    }
}

/// The sheet is the formula engine's reference resolver: every referenced
/// cell reads as a number or an error value.
impl CellResolver for Sheet {
    fn resolve(&self, pos: Position) -> FormulaValue {
        match self.cell_at(pos) {
            None => FormulaValue::Number(0.0),
            Some(cell) => match cell.content() {
                CellContent::Empty => FormulaValue::Number(0.0),
                CellContent::Text(_) => {
                    match cell.visible_text().trim().parse::<f64>() {
                        Ok(n) if n.is_finite() => FormulaValue::Number(n),
                        _ => FormulaValue::Error(CellError::Value),
                    }
                }
                CellContent::Formula { .. } => match cell.cached_value() {
                    Some(Value::Number(n)) => FormulaValue::Number(*n),
                    Some(Value::Error(e)) => FormulaValue::Error(*e),
                    // Precedents are settled before evaluation starts;
                    // an unsettled formula reads as zero.
                    _ => FormulaValue::Number(0.0),
                },
            },
        }
    }
}
