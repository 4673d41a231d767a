//! Dependency tracking between formula cells
//!
//! Tracks which cells a formula reads (precedents) and which cells read
//! a given cell (dependents), enabling cache invalidation and cycle
//! rejection before a formula is committed.

use std::collections::{HashMap, HashSet};
use tabula_core::Position;

/// Bidirectional dependency graph over cell positions
///
/// Invariants:
/// - If A is a precedent of B then B is a dependent of A, and vice versa.
/// - Empty adjacency sets are removed, never stored.
/// - [`DependencyGraph::set_precedents`] is the only mutator; it rewrites
///   a single cell's outgoing edges and leaves its incoming edges alone.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Cell → cells it depends on (its formula's children)
    precedents: HashMap<Position, HashSet<Position>>,
    /// Cell → cells that depend on it (its parents)
    dependents: HashMap<Position, HashSet<Position>>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the precedent set of a cell
    ///
    /// Removes the cell from all of its old precedents' dependent sets,
    /// then records the new edges. Pass an empty slice to detach the cell
    /// from everything it reads; cells depending on it are untouched.
    pub fn set_precedents(&mut self, cell: Position, new_precedents: &[Position]) {
        if let Some(old) = self.precedents.remove(&cell) {
            for precedent in old {
                if let Some(deps) = self.dependents.get_mut(&precedent) {
                    deps.remove(&cell);
                    if deps.is_empty() {
                        self.dependents.remove(&precedent);
                    }
                }
            }
        }

        if new_precedents.is_empty() {
            return;
        }

        let set: HashSet<Position> = new_precedents.iter().copied().collect();
        for precedent in &set {
            self.dependents.entry(*precedent).or_default().insert(cell);
        }
        self.precedents.insert(cell, set);
    }

    /// Remove all outgoing edges of a cell
    pub fn clear_precedents(&mut self, cell: Position) {
        self.set_precedents(cell, &[]);
    }

    /// Get the cells the given cell depends on
    pub fn get_precedents(&self, cell: Position) -> impl Iterator<Item = Position> + '_ {
        self.precedents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Get the cells that depend on the given cell
    pub fn get_dependents(&self, cell: Position) -> impl Iterator<Item = Position> + '_ {
        self.dependents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Check if any cell depends on the given cell
    pub fn is_referenced(&self, cell: Position) -> bool {
        self.dependents.contains_key(&cell)
    }

    /// Check whether rewiring `cell` to read `new_precedents` would close
    /// a cycle
    ///
    /// Runs on the prospective graph without mutating anything: depth-first
    /// along existing precedent edges from each prospective precedent,
    /// substituting `new_precedents` for the cell's current children. True
    /// iff `cell` is reachable (a self-reference included).
    pub fn would_create_cycle(&self, cell: Position, new_precedents: &[Position]) -> bool {
        let mut visited: HashSet<Position> = HashSet::new();
        let mut stack: Vec<Position> = new_precedents.to_vec();

        while let Some(current) = stack.pop() {
            if current == cell {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            stack.extend(self.get_precedents(current));
        }

        false
    }

    /// Check all invariants. Panics if any are violated.
    #[cfg(test)]
    pub fn assert_consistent(&self) {
        for (cell, precedents) in &self.precedents {
            assert!(!precedents.is_empty(), "empty precedent set stored for {}", cell);
            for precedent in precedents {
                assert!(
                    self.dependents
                        .get(precedent)
                        .map_or(false, |set| set.contains(cell)),
                    "missing dependent edge: {} should list {}",
                    precedent,
                    cell
                );
            }
        }

        for (cell, dependents) in &self.dependents {
            assert!(!dependents.is_empty(), "empty dependent set stored for {}", cell);
            for dependent in dependents {
                assert!(
                    self.precedents
                        .get(dependent)
                        .map_or(false, |set| set.contains(cell)),
                    "missing precedent edge: {} should list {}",
                    dependent,
                    cell
                );
            }
        }
    }
}
