//! The result of reading a cell, and the three arithmetic error kinds.

use std::fmt;

/// An evaluation-time failure produced inside a formula. This is *data* —
/// it is a valid [`CellValue`], not a failure of the call that returned it.
/// Equality and the discriminant are by kind only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormulaError {
    /// A formula reads a position that is not addressable.
    Ref,
    /// Non-numeric text was used where a number is required.
    Value,
    /// Division by zero, or any other arithmetic failure (including a
    /// non-finite result).
    Arithmetic,
}

impl FormulaError {
    pub fn kind(&self) -> Self {
        *self
    }

    /// Canonical textual form, e.g. for printing a sheet's values.
    pub fn as_str(&self) -> &'static str {
        match self {
            FormulaError::Ref => "#REF!",
            FormulaError::Value => "#VALUE!",
            FormulaError::Arithmetic => "#ARITHM!",
        }
    }
}

impl fmt::Display for FormulaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of reading a cell: exactly one of text, a finite number, or
/// an evaluation error.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Error(FormulaError),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Error(e) => write!(f, "{e}"),
        }
    }
}
