//! Sandboxed arithmetic formulas for step arrays
//!
//! A formula sees three bound variables (`x`, `i`, `len`) and a fixed table
//! of math functions and constants. Nothing else is reachable.

mod ast;
mod lexer;
mod parser;
mod tokens;

use lalrpop_util::lalrpop_mod;
use thiserror::Error;

use ast::{BinOp, Expr, Func, Var};

lalrpop_mod!(grammar, "/formula/grammar.rs");

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    #[error("invalid token at offset {offset}")]
    InvalidToken { offset: usize },
    #[error("unexpected token at offset {offset}")]
    UnexpectedToken { offset: usize },
    #[error("unexpected end of formula")]
    UnexpectedEnd,
    #[error("unknown name `{name}` at offset {offset}")]
    UnknownName { name: String, offset: usize },
    #[error("`{name}` takes {expected} argument(s), got {found}")]
    Arity { name: String, expected: usize, found: usize },
    #[error("formula nests deeper than {} levels", ast::MAX_DEPTH)]
    TooDeep,
}

/// Values bound to a formula's free variables
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vars {
    /// Raw value being transformed (pin size or pitch)
    pub x: f64,
    /// Index within its local list
    pub i: f64,
    /// Length of the basis dimension
    pub len: f64,
}

impl Vars {
    pub fn new(x: f64, i: f64, len: f64) -> Self {
        Self { x, i, len }
    }
}

/// A compiled formula
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source: String,
    expr: Expr,
}

impl Formula {
    pub fn parse(source: &str) -> Result<Self, FormulaError> {
        Ok(Self {
            source: source.to_string(),
            expr: parser::parse(source)?,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate, folding non-finite results to 0
    pub fn eval(&self, vars: Vars) -> f64 {
        let value = eval(&self.expr, &vars);
        if value.is_finite() { value } else { 0.0 }
    }
}

/// Recursion is bounded by the parser's nesting limit
fn eval(expr: &Expr, vars: &Vars) -> f64 {
    match expr {
        Expr::Number(n) => *n,
        Expr::Var(Var::X) => vars.x,
        Expr::Var(Var::I) => vars.i,
        Expr::Var(Var::Len) => vars.len,
        Expr::Neg(inner) => -eval(inner, vars),
        Expr::Binary(op, lhs, rhs) => {
            let (a, b) = (eval(lhs, vars), eval(rhs, vars));
            match op {
                BinOp::Add => a + b,
                BinOp::Sub => a - b,
                BinOp::Mul => a * b,
                BinOp::Div => a / b,
                BinOp::Rem => a % b,
                BinOp::Pow => a.powf(b),
            }
        }
        Expr::Call(func, args) => {
            let args: Vec<f64> = args.iter().map(|a| eval(a, vars)).collect();
            call(*func, &args)
        }
    }
}

fn call(func: Func, args: &[f64]) -> f64 {
    // Arity is checked at parse time for fixed-arity functions
    let a = args.first().copied().unwrap_or(f64::NAN);
    let b = args.get(1).copied().unwrap_or(f64::NAN);
    match func {
        Func::Abs => a.abs(),
        Func::Acos => a.acos(),
        Func::Acosh => a.acosh(),
        Func::Asin => a.asin(),
        Func::Asinh => a.asinh(),
        Func::Atan => a.atan(),
        Func::Atanh => a.atanh(),
        Func::Atan2 => a.atan2(b),
        Func::Cbrt => a.cbrt(),
        Func::Ceil => a.ceil(),
        Func::Cos => a.cos(),
        Func::Cosh => a.cosh(),
        Func::Exp => a.exp(),
        Func::Expm1 => a.exp_m1(),
        Func::Floor => a.floor(),
        Func::Fround => a as f32 as f64,
        Func::Hypot => args.iter().map(|v| v * v).sum::<f64>().sqrt(),
        Func::Log => a.ln(),
        Func::Log1p => a.ln_1p(),
        Func::Log2 => a.log2(),
        Func::Log10 => a.log10(),
        Func::Max => args.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        Func::Min => args.iter().copied().fold(f64::INFINITY, f64::min),
        Func::Pow => a.powf(b),
        // Halves round up, as on a number line
        Func::Round => (a + 0.5).floor(),
        Func::Sign => {
            if a > 0.0 {
                1.0
            } else if a < 0.0 {
                -1.0
            } else {
                a
            }
        }
        Func::Sin => a.sin(),
        Func::Sinh => a.sinh(),
        Func::Sqrt => a.sqrt(),
        Func::Tan => a.tan(),
        Func::Tanh => a.tanh(),
        Func::Trunc => a.trunc(),
    }
}
