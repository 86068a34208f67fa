// ssheet-core/src/parser.rs
// Formula parsing: pest tokenizes, this module folds the parse tree into
// our AST (crate::ast::Expr).

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::position::Position;

#[derive(Parser)]
#[grammar = "grammar/formula.pest"]
struct FormulaGrammar;

/// Parse the text following a formula's leading `=` into an AST.
///
/// Errors carry pest's own diagnostic text (line/column and expected-token
/// info); the caller wraps it as a `formula-syntax` condition.
pub fn parse(source: &str) -> Result<Expr, String> {
    let mut pairs = FormulaGrammar::parse(Rule::formula, source).map_err(|e| e.to_string())?;
    let formula_pair = pairs.next().expect("Rule::formula always produces exactly one pair");
    let expr_pair = formula_pair
        .into_inner()
        .next()
        .expect("formula = { SOI ~ expr ~ EOI } always yields an expr before EOI");
    Ok(build_expr(expr_pair))
}

fn build_expr(pair: Pair<Rule>) -> Expr {
    debug_assert_eq!(pair.as_rule(), Rule::expr);
    let mut inner = pair.into_inner();
    let first = inner.next().expect("expr always starts with a term");
    let mut node = build_term(first);
    while let Some(op_pair) = inner.next() {
        let op = match op_pair.as_str() {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            other => unreachable!("add_op matched unexpected text {other:?}"),
        };
        let rhs_pair = inner.next().expect("add_op is always followed by a term");
        let rhs = build_term(rhs_pair);
        node = Expr::Binary(op, Box::new(node), Box::new(rhs));
    }
    node
}

fn build_term(pair: Pair<Rule>) -> Expr {
    debug_assert_eq!(pair.as_rule(), Rule::term);
    let mut inner = pair.into_inner();
    let first = inner.next().expect("term always starts with a signed operand");
    let mut node = build_signed(first);
    while let Some(op_pair) = inner.next() {
        let op = match op_pair.as_str() {
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            other => unreachable!("mul_op matched unexpected text {other:?}"),
        };
        let rhs_pair = inner.next().expect("mul_op is always followed by a signed operand");
        let rhs = build_signed(rhs_pair);
        node = Expr::Binary(op, Box::new(node), Box::new(rhs));
    }
    node
}

fn build_signed(pair: Pair<Rule>) -> Expr {
    debug_assert_eq!(pair.as_rule(), Rule::signed);
    let mut unary_ops = Vec::new();
    let mut operand = None;
    for child in pair.into_inner() {
        match child.as_rule() {
            Rule::unary_op => unary_ops.push(child.as_str() == "-"),
            Rule::number => operand = Some(build_number(child)),
            Rule::reference => operand = Some(build_reference(child)),
            Rule::expr => operand = Some(build_expr(child)),
            other => unreachable!("unexpected child of signed: {other:?}"),
        }
    }
    let mut node = operand.expect("signed always wraps exactly one primary operand");
    for is_negative in unary_ops.into_iter().rev() {
        let op = if is_negative { UnaryOp::Minus } else { UnaryOp::Plus };
        node = Expr::Unary(op, Box::new(node));
    }
    node
}

fn build_number(pair: Pair<Rule>) -> Expr {
    let text = pair.as_str();
    Expr::Number(text.parse().unwrap_or_else(|e| {
        unreachable!("grammar guarantees a parseable float literal ({text:?}): {e}")
    }))
}

fn build_reference(pair: Pair<Rule>) -> Expr {
    // A syntactically well-formed reference that decodes outside the
    // addressable range (e.g. too many digits) becomes Position::NONE,
    // which is simply never valid — the core filters it out of the
    // dependency graph and `execute` signals Ref if it's actually read.
    let pos = Position::parse(pair.as_str()).unwrap_or(Position::NONE);
    Expr::Reference(pos)
}
