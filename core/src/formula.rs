// ssheet-core/src/formula.rs
// The parsed, evaluable form of a formula cell's body.

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::EngineError;
use crate::position::Position;
use crate::value::FormulaError;

#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    ast: Expr,
}

impl Formula {
    /// Parse the text following a formula's leading `=`.
    pub fn parse(source: &str) -> Result<Formula, EngineError> {
        let ast = crate::parser::parse(source).map_err(EngineError::FormulaSyntax)?;
        Ok(Formula { ast })
    }

    /// Canonical re-rendering of the expression, without the leading `=`.
    pub fn print(&self) -> String {
        self.ast.print()
    }

    /// Deduplicated, sorted, *valid* positions this formula reads — the
    /// set the dependency engine wires edges against.
    pub fn referenced_cells(&self) -> Vec<Position> {
        let mut raw = Vec::new();
        self.ast.collect_references(&mut raw);
        raw.retain(Position::is_valid);
        raw.sort();
        raw.dedup();
        raw
    }

    /// Evaluate against a cell value lookup. `lookup` is called once per
    /// referenced cell actually visited during evaluation (short-circuiting
    /// on the first error, per ordinary left-to-right evaluation order).
    pub fn execute(&self, lookup: &mut dyn FnMut(Position) -> Result<f64, FormulaError>) -> Result<f64, FormulaError> {
        eval(&self.ast, lookup)
    }
}

fn eval(expr: &Expr, lookup: &mut dyn FnMut(Position) -> Result<f64, FormulaError>) -> Result<f64, FormulaError> {
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Reference(pos) => {
            if !pos.is_valid() {
                return Err(FormulaError::Ref);
            }
            lookup(*pos)
        }
        Expr::Unary(op, inner) => {
            let v = eval(inner, lookup)?;
            Ok(match op {
                UnaryOp::Plus => v,
                UnaryOp::Minus => -v,
            })
        }
        Expr::Binary(op, l, r) => {
            let lv = eval(l, lookup)?;
            let rv = eval(r, lookup)?;
            let result = match op {
                BinaryOp::Add => lv + rv,
                BinaryOp::Sub => lv - rv,
                BinaryOp::Mul => lv * rv,
                BinaryOp::Div => lv / rv,
            };
            if result.is_finite() {
                Ok(result)
            } else {
                Err(FormulaError::Arithmetic)
            }
        }
    }
}
