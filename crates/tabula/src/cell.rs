//! Cell content and cached evaluation state

use tabula_core::{Position, Value, ESCAPE_SIGN, FORMULA_SIGN};
use tabula_formula::{parse_formula, Expr, FormulaResult};

/// The content stored in a cell
#[derive(Debug, Clone)]
pub enum CellContent {
    /// Nothing; evaluates to the empty text value
    Empty,
    /// Literal text, stored raw (a leading escape sign is retained)
    Text(String),
    /// A parsed formula
    Formula {
        /// Canonical cell text: `=` followed by the canonical expression
        text: String,
        /// The parsed expression
        ast: Expr,
        /// Valid positions the formula references, sorted and deduplicated
        refs: Vec<Position>,
    },
}

impl CellContent {
    /// Classify raw input into a content variant
    ///
    /// - empty input → `Empty`
    /// - a leading `'` forces literal text (the escape sign is stored)
    /// - `=` followed by at least one non-space character → `Formula`;
    ///   a parse failure is returned and the caller leaves the cell as is
    /// - anything else → `Text`
    pub fn from_input(input: &str) -> FormulaResult<Self> {
        if input.is_empty() {
            return Ok(CellContent::Empty);
        }

        if is_formula_text(input) {
            let ast = parse_formula(input)?;
            let refs = ast.referenced_positions();
            let text = format!("{}{}", FORMULA_SIGN, ast);
            return Ok(CellContent::Formula { text, ast, refs });
        }

        Ok(CellContent::Text(input.to_string()))
    }
}

/// True when the text is a formula: `=` plus at least one non-space
fn is_formula_text(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next() == Some(FORMULA_SIGN) && chars.any(|c| c != ' ')
}

/// A cell: one content variant plus the cached last value
///
/// `dirty` is true when the cache no longer reflects the cell's content
/// or the current values of the cells it transitively references.
#[derive(Debug, Clone)]
pub struct Cell {
    content: CellContent,
    cached: Option<Value>,
    dirty: bool,
}

impl Cell {
    pub(crate) fn new(content: CellContent) -> Self {
        Self {
            content,
            cached: None,
            dirty: true,
        }
    }

    /// Create an empty cell
    pub fn empty() -> Self {
        Self::new(CellContent::Empty)
    }

    /// Get the content variant
    pub fn content(&self) -> &CellContent {
        &self.content
    }

    /// The raw stored text: literal text verbatim (escape sign included),
    /// the canonical `=`-form for formulas, empty for empty cells
    pub fn text(&self) -> &str {
        match &self.content {
            CellContent::Empty => "",
            CellContent::Text(raw) => raw,
            CellContent::Formula { text, .. } => text,
        }
    }

    /// The visible form of literal text: one leading escape sign stripped
    pub fn visible_text(&self) -> &str {
        match &self.content {
            CellContent::Text(raw) => raw.strip_prefix(ESCAPE_SIGN).unwrap_or(raw),
            _ => "",
        }
    }

    /// Positions this cell's formula references (empty for non-formulas),
    /// deduplicated and in ascending row-major order
    pub fn referenced_cells(&self) -> &[Position] {
        match &self.content {
            CellContent::Formula { refs, .. } => refs,
            _ => &[],
        }
    }

    /// Check if the cell holds a formula
    pub fn is_formula(&self) -> bool {
        matches!(self.content, CellContent::Formula { .. })
    }

    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self.content, CellContent::Empty)
    }

    /// The cached value from the last evaluation, if still valid
    pub fn cached_value(&self) -> Option<&Value> {
        if self.dirty {
            None
        } else {
            self.cached.as_ref()
        }
    }

    /// The value this cell displays without consulting other cells:
    /// visible text for literal text, empty text for empty cells, and
    /// the cached result for formulas
    pub(crate) fn display_value(&self) -> Value {
        match &self.content {
            CellContent::Empty => Value::default(),
            CellContent::Text(_) => Value::Text(self.visible_text().to_string()),
            CellContent::Formula { .. } => self.cached.clone().unwrap_or_default(),
        }
    }

    pub(crate) fn dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn set_content(&mut self, content: CellContent) {
        self.content = content;
    }

    /// Drop the cache and mark stale
    pub(crate) fn invalidate(&mut self) {
        self.dirty = true;
        self.cached = None;
    }

    /// Store an evaluation result and mark fresh
    pub(crate) fn settle(&mut self, value: Value) {
        self.cached = Some(value);
        self.dirty = false;
    }
}
