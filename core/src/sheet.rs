// ssheet-core/src/sheet.rs
// Ties cell storage, the dependency graph, and cache invalidation together
// behind a small write/read surface.

use std::fmt;
use std::io::{self, Write as IoWrite};

use hashbrown::HashMap;
use log::{debug, trace};

use crate::cell::{numeric_value_of_text, CellBody};
use crate::error::{EngineError, Result};
use crate::position::Position;
use crate::value::{CellValue, FormulaError};

/// A sparse, growable grid of cells plus the dependency edges between
/// formula cells. The only mutator is [`Sheet::set`]; everything else is
/// derived from it.
#[derive(Debug, Default)]
pub struct Sheet {
    cells: HashMap<Position, CellBody>,
    deps: crate::dependency::DependencyGraph,
}

/// A read handle into one cell, borrowed from the sheet it came from.
pub struct CellRef<'a> {
    sheet: &'a Sheet,
    pos: Position,
    body: Option<&'a CellBody>,
}

impl<'a> CellRef<'a> {
    pub fn position(&self) -> Position {
        self.pos
    }

    pub fn text(&self) -> String {
        self.body.map(CellBody::text).unwrap_or_default()
    }

    pub fn value(&self) -> CellValue {
        match self.body {
            Some(body) => body.value(self.sheet),
            None => CellValue::Text(String::new()),
        }
    }

    pub fn referenced(&self) -> Vec<Position> {
        self.body.map(CellBody::referenced).unwrap_or_default()
    }

    pub fn dependents(&self) -> Vec<Position> {
        self.sheet.deps.dependents(self.pos)
    }
}

impl Sheet {
    pub fn new() -> Self {
        Sheet { cells: HashMap::new(), deps: crate::dependency::DependencyGraph::new() }
    }

    /// Write `text` into `pos`. On any failure (invalid position,
    /// malformed formula syntax, or a formula that would close a
    /// dependency cycle), the sheet is left byte-for-byte as it was before
    /// the call — candidate parsing and the cycle check both happen before
    /// any mutation.
    pub fn set(&mut self, pos: Position, text: &str) -> Result<()> {
        if !pos.is_valid() {
            return Err(EngineError::InvalidPosition(pos));
        }
        trace!("parsing candidate body for {pos}: {text:?}");
        let body = CellBody::parse(text).map_err(|_| EngineError::FormulaSyntax(text.to_string()))?;
        let new_refs = body.referenced();

        if self.deps.would_cycle(pos, &new_refs) {
            debug!("rejecting write to {pos}: would create a circular dependency");
            return Err(EngineError::CircularDependency(pos));
        }

        for &r in &new_refs {
            self.cells.entry(r).or_insert(CellBody::Empty);
            self.deps.ensure_node(r);
        }
        self.deps.rewire(pos, &new_refs);
        self.cells.insert(pos, body);
        self.invalidate_from(pos);
        debug!("wrote {pos}, invalidated its dependents' caches");
        Ok(())
    }

    /// Reset `pos` to empty. Implemented as `set(pos, "")`: the slot stays
    /// materialised (as an `Empty` body) rather than being removed from
    /// storage, which is behaviorally indistinguishable to callers and
    /// keeps the write path singular.
    pub fn clear(&mut self, pos: Position) -> Result<()> {
        self.set(pos, "")
    }

    pub fn get(&self, pos: Position) -> CellRef<'_> {
        CellRef { sheet: self, pos, body: self.cells.get(&pos) }
    }

    /// The smallest bounding box (exclusive end) containing every
    /// non-empty cell. `(0, 0)` if the sheet is empty.
    pub fn printable_size(&self) -> (u32, u32) {
        let mut max_row = 0u32;
        let mut max_col = 0u32;
        for (pos, body) in &self.cells {
            if matches!(body, CellBody::Empty) {
                continue;
            }
            max_row = max_row.max(pos.row + 1);
            max_col = max_col.max(pos.col + 1);
        }
        (max_row, max_col)
    }

    /// Print the sheet's displayed values as a tab-separated grid, one row
    /// per line, over `printable_size()`'s bounding box.
    pub fn print_values<W: IoWrite>(&self, w: &mut W) -> io::Result<()> {
        self.print_grid(w, |body, sheet| body.value(sheet).to_string())
    }

    /// Print the sheet's raw cell text (e.g. `=A1+1` rather than its
    /// evaluated value) as a tab-separated grid.
    pub fn print_texts<W: IoWrite>(&self, w: &mut W) -> io::Result<()> {
        self.print_grid(w, |body, _| body.text())
    }

    fn print_grid<W: IoWrite>(&self, w: &mut W, render: impl Fn(&CellBody, &Sheet) -> String) -> io::Result<()> {
        let (rows, cols) = self.printable_size();
        for row in 0..rows {
            for col in 0..cols {
                if col > 0 {
                    write!(w, "\t")?;
                }
                let pos = Position::new(row, col);
                let rendered = match self.cells.get(&pos) {
                    Some(body) => render(body, self),
                    None => String::new(),
                };
                write!(w, "{rendered}")?;
            }
            writeln!(w)?;
        }
        Ok(())
    }

    /// Numeric coercion of a cell's displayed value, for a formula that
    /// reads `pos`: absent or empty is `0.0`, a number passes through, text
    /// is parsed strictly (leading whitespace tolerated, anything else
    /// trailing is a `Value` error), and an existing error propagates.
    pub(crate) fn lookup_number(&self, pos: Position) -> std::result::Result<f64, FormulaError> {
        match self.cells.get(&pos) {
            None => Ok(0.0),
            Some(CellBody::Empty) => Ok(0.0),
            Some(CellBody::Text(s)) => numeric_value_of_text(s),
            Some(body @ CellBody::Formula { .. }) => match body.value(self) {
                CellValue::Number(n) => Ok(n),
                CellValue::Error(e) => Err(e),
                CellValue::Text(_) => unreachable!("a formula body never yields CellValue::Text"),
            },
        }
    }

    /// Unconditionally clear the direct dependents' caches, then recurse
    /// only into dependents whose cache was actually populated (and thus
    /// needed clearing) — a dependent with no cache already has a clean
    /// downstream (invariant: a cache-less formula cell never leaves a
    /// stale value behind it).
    fn invalidate_from(&self, pos: Position) {
        for dependent in self.deps.dependents(pos) {
            let Some(body) = self.cells.get(&dependent) else { continue };
            let was_cached = body.has_cache();
            body.invalidate();
            if was_cached {
                self.invalidate_from(dependent);
            }
        }
    }
}

impl fmt::Debug for CellRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellRef").field("pos", &self.pos).field("text", &self.text()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn p(row: u32, col: u32) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn literal_text_echoes_back() {
        let mut sheet = Sheet::new();
        sheet.set(p(0, 0), "hello").unwrap();
        assert_eq!(sheet.get(p(0, 0)).value(), CellValue::Text("hello".into()));
    }

    #[test]
    fn escape_sign_hides_a_leading_equals_from_formula_parsing() {
        let mut sheet = Sheet::new();
        sheet.set(p(0, 0), "'=1+1").unwrap();
        assert_eq!(sheet.get(p(0, 0)).text(), "'=1+1");
        assert_eq!(sheet.get(p(0, 0)).value(), CellValue::Text("=1+1".into()));
    }

    #[test]
    fn formula_chain_evaluates_through_references() {
        let mut sheet = Sheet::new();
        sheet.set(p(0, 0), "2").unwrap();
        sheet.set(p(1, 0), "=A1*3").unwrap();
        sheet.set(p(2, 0), "=A2+1").unwrap();
        assert_eq!(sheet.get(p(2, 0)).value(), CellValue::Number(7.0));
    }

    #[test]
    fn writing_a_cycle_is_rejected_and_leaves_state_untouched() {
        let mut sheet = Sheet::new();
        sheet.set(p(0, 0), "=B1").unwrap();
        let before = sheet.get(p(1, 0)).text();
        let err = sheet.set(p(1, 0), "=A1").unwrap_err();
        assert_eq!(err, EngineError::CircularDependency(p(1, 0)));
        assert_eq!(sheet.get(p(1, 0)).text(), before);
    }

    #[test]
    fn self_reference_is_rejected() {
        let mut sheet = Sheet::new();
        let err = sheet.set(p(0, 0), "=A1").unwrap_err();
        assert_eq!(err, EngineError::CircularDependency(p(0, 0)));
    }

    #[test]
    fn text_cell_coerces_to_number_for_formulas() {
        let mut sheet = Sheet::new();
        sheet.set(p(0, 0), "42").unwrap();
        sheet.set(p(1, 0), "=A1+1").unwrap();
        assert_eq!(sheet.get(p(1, 0)).value(), CellValue::Number(43.0));
    }

    #[test]
    fn non_numeric_text_cell_is_a_value_error_for_formulas() {
        let mut sheet = Sheet::new();
        sheet.set(p(0, 0), "hello").unwrap();
        sheet.set(p(1, 0), "=A1+1").unwrap();
        assert_eq!(sheet.get(p(1, 0)).value(), CellValue::Error(FormulaError::Value));
    }

    #[test]
    fn division_by_zero_is_an_arithmetic_error() {
        let mut sheet = Sheet::new();
        sheet.set(p(0, 0), "=1/0").unwrap();
        assert_eq!(sheet.get(p(0, 0)).value(), CellValue::Error(FormulaError::Arithmetic));
    }

    #[test]
    fn overflowing_text_literal_referenced_by_a_formula_is_an_arithmetic_error() {
        let mut sheet = Sheet::new();
        sheet.set(p(0, 0), "1e400").unwrap();
        sheet.set(p(1, 0), "=A1").unwrap();
        assert_eq!(sheet.get(p(1, 0)).value(), CellValue::Error(FormulaError::Value));
    }

    #[test]
    fn huge_numeric_literal_in_a_formula_overflows_to_an_arithmetic_error() {
        let mut sheet = Sheet::new();
        let huge = "9".repeat(400);
        sheet.set(p(0, 0), &format!("={huge}")).unwrap();
        assert_eq!(sheet.get(p(0, 0)).value(), CellValue::Error(FormulaError::Arithmetic));
    }

    #[test]
    fn referencing_a_never_written_cell_materialises_it_as_empty() {
        let mut sheet = Sheet::new();
        sheet.set(p(0, 0), "=B5+1").unwrap();
        assert_eq!(sheet.get(p(0, 0)).value(), CellValue::Number(1.0));
        assert_eq!(sheet.get(p(4, 1)).text(), "");
    }

    #[test]
    fn editing_an_upstream_cell_invalidates_downstream_caches() {
        let mut sheet = Sheet::new();
        sheet.set(p(0, 0), "2").unwrap();
        sheet.set(p(1, 0), "=A1*10").unwrap();
        assert_eq!(sheet.get(p(1, 0)).value(), CellValue::Number(20.0));
        sheet.set(p(0, 0), "5").unwrap();
        assert_eq!(sheet.get(p(1, 0)).value(), CellValue::Number(50.0));
    }

    #[test]
    fn printable_size_tracks_the_furthest_non_empty_cell() {
        let mut sheet = Sheet::new();
        assert_eq!(sheet.printable_size(), (0, 0));
        sheet.set(p(2, 3), "x").unwrap();
        assert_eq!(sheet.printable_size(), (3, 4));
        sheet.clear(p(2, 3)).unwrap();
        assert_eq!(sheet.printable_size(), (0, 0));
    }

    #[test]
    fn print_values_renders_a_tab_separated_grid() {
        let mut sheet = Sheet::new();
        sheet.set(p(0, 0), "1").unwrap();
        sheet.set(p(0, 1), "2").unwrap();
        sheet.set(p(1, 0), "=A1+B1").unwrap();
        let mut out = Vec::new();
        sheet.print_values(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1\t2\n3\t\n");
    }
}
