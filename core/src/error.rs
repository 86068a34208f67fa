// ssheet-core/src/error.rs
//
// Failures of the public write/read path. Distinct from
// [`crate::value::FormulaError`], which is cached *data* produced by a
// successful evaluation, not a failure of the API call that produced it.
use thiserror::Error;

use crate::position::Position;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid cell position: {0:?}")]
    InvalidPosition(Position),

    #[error("formula is syntactically incorrect: {0}")]
    FormulaSyntax(String),

    #[error("circular dependency detected at {0}")]
    CircularDependency(Position),
}

pub type Result<T> = std::result::Result<T, EngineError>;
