// ssheet-core/src/cell.rs
// What's stored at one addressable position: nothing, literal text, or a
// formula plus its memoized value.

use std::cell::RefCell;

use crate::error::EngineError;
use crate::formula::Formula;
use crate::position::Position;
use crate::sheet::Sheet;
use crate::value::{CellValue, FormulaError};

/// A literal cell body starting with this character has the sign stripped
/// for display/value purposes; it exists purely to let a literal begin
/// with `=` without being read as a formula.
const ESCAPE_SIGN: char = '\'';

#[derive(Debug)]
pub enum CellBody {
    Empty,
    Text(String),
    Formula { formula: Formula, cache: RefCell<Option<CellValue>> },
}

impl CellBody {
    /// Parse raw user-entered text into a cell body. A leading `=` followed
    /// by at least one more character introduces a formula; a bare `=` (no
    /// operand at all) is just text, same as any other literal, as is an
    /// empty string (which becomes `Empty` rather than `Text("")`).
    pub fn parse(text: &str) -> Result<CellBody, EngineError> {
        if text.is_empty() {
            return Ok(CellBody::Empty);
        }
        if text.len() > 1 {
            if let Some(source) = text.strip_prefix('=') {
                let formula = Formula::parse(source)?;
                return Ok(CellBody::Formula { formula, cache: RefCell::new(None) });
            }
        }
        Ok(CellBody::Text(text.to_string()))
    }

    /// The literal text a user would see back in the edit box: unparsed,
    /// with a leading formula re-printed as `=...` and a leading escape
    /// sign kept as-is (it's part of the stored text, not the display).
    pub fn text(&self) -> String {
        match self {
            CellBody::Empty => String::new(),
            CellBody::Text(s) => s.clone(),
            CellBody::Formula { formula, .. } => format!("={}", formula.print()),
        }
    }

    /// The displayed value: literal text (escape sign stripped) or the
    /// formula's cached/evaluated result.
    pub fn value(&self, sheet: &Sheet) -> CellValue {
        match self {
            CellBody::Empty => CellValue::Text(String::new()),
            CellBody::Text(s) => CellValue::Text(display_text(s)),
            CellBody::Formula { formula, cache } => {
                if let Some(cached) = cache.borrow().as_ref() {
                    return cached.clone();
                }
                let result = formula.execute(&mut |pos| sheet.lookup_number(pos));
                let value = match result {
                    Ok(n) if n.is_finite() => CellValue::Number(n),
                    Ok(_) => CellValue::Error(FormulaError::Arithmetic),
                    Err(e) => CellValue::Error(e),
                };
                *cache.borrow_mut() = Some(value.clone());
                value
            }
        }
    }

    /// Positions this cell's formula reads; empty for non-formula bodies.
    pub fn referenced(&self) -> Vec<Position> {
        match self {
            CellBody::Formula { formula, .. } => formula.referenced_cells(),
            _ => Vec::new(),
        }
    }

    pub fn has_cache(&self) -> bool {
        match self {
            CellBody::Formula { cache, .. } => cache.borrow().is_some(),
            _ => false,
        }
    }

    pub fn invalidate(&self) {
        if let CellBody::Formula { cache, .. } = self {
            *cache.borrow_mut() = None;
        }
    }
}

/// As a number, for a formula reading a text cell: same parse this would
/// hit via `lookup_number`, but exposed here too since `display_text` and
/// numeric coercion use the same leading-escape-sign rule.
fn display_text(s: &str) -> String {
    match s.strip_prefix(ESCAPE_SIGN) {
        Some(rest) => rest.to_string(),
        None => s.to_string(),
    }
}

/// A formula reading a text cell parses its *displayed* text as a number;
/// used by `Sheet::lookup_number`.
pub fn numeric_value_of_text(s: &str) -> Result<f64, FormulaError> {
    let text = display_text(s);
    let n = text.trim_start().parse::<f64>().map_err(|_| FormulaError::Value)?;
    if n.is_finite() {
        Ok(n)
    } else {
        Err(FormulaError::Value)
    }
}
