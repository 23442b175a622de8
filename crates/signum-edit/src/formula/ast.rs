//! Formula syntax tree and the constructors the grammar reduces through
//!
//! Every constructor tracks nesting depth. A tree deeper than [`MAX_DEPTH`]
//! is rejected with [`FormulaError::TooDeep`], which keeps evaluation and
//! drop recursion bounded.

use lalrpop_util::ParseError;

use super::FormulaError;

/// Deepest nesting a formula may reach, counting parentheses
pub(crate) const MAX_DEPTH: usize = 64;

/// Result of a fallible grammar action
pub(crate) type Reduced<T> = Result<Node, ParseError<usize, T, FormulaError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Var {
    X,
    I,
    Len,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Func {
    Abs,
    Acos,
    Acosh,
    Asin,
    Asinh,
    Atan,
    Atanh,
    Atan2,
    Cbrt,
    Ceil,
    Cos,
    Cosh,
    Exp,
    Expm1,
    Floor,
    Fround,
    Hypot,
    Log,
    Log1p,
    Log2,
    Log10,
    Max,
    Min,
    Pow,
    Round,
    Sign,
    Sin,
    Sinh,
    Sqrt,
    Tan,
    Tanh,
    Trunc,
}

const FUNCTIONS: &[(&str, Func)] = &[
    ("abs", Func::Abs),
    ("acos", Func::Acos),
    ("acosh", Func::Acosh),
    ("asin", Func::Asin),
    ("asinh", Func::Asinh),
    ("atan", Func::Atan),
    ("atanh", Func::Atanh),
    ("atan2", Func::Atan2),
    ("cbrt", Func::Cbrt),
    ("ceil", Func::Ceil),
    ("cos", Func::Cos),
    ("cosh", Func::Cosh),
    ("exp", Func::Exp),
    ("expm1", Func::Expm1),
    ("floor", Func::Floor),
    ("fround", Func::Fround),
    ("hypot", Func::Hypot),
    ("log", Func::Log),
    ("log1p", Func::Log1p),
    ("log2", Func::Log2),
    ("log10", Func::Log10),
    ("max", Func::Max),
    ("min", Func::Min),
    ("pow", Func::Pow),
    ("round", Func::Round),
    ("sign", Func::Sign),
    ("sin", Func::Sin),
    ("sinh", Func::Sinh),
    ("sqrt", Func::Sqrt),
    ("tan", Func::Tan),
    ("tanh", Func::Tanh),
    ("trunc", Func::Trunc),
];

const CONSTANTS: &[(&str, f64)] = &[
    ("pi", std::f64::consts::PI),
    ("e", std::f64::consts::E),
    ("ln2", std::f64::consts::LN_2),
    ("ln10", std::f64::consts::LN_10),
    ("log2e", std::f64::consts::LOG2_E),
    ("log10e", std::f64::consts::LOG10_E),
    ("sqrt2", std::f64::consts::SQRT_2),
    ("sqrt1_2", std::f64::consts::FRAC_1_SQRT_2),
];

impl Func {
    /// Exact argument count, `None` for variadic functions
    fn arity(self) -> Option<usize> {
        match self {
            Self::Max | Self::Min | Self::Hypot => None,
            Self::Atan2 | Self::Pow => Some(2),
            _ => Some(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Number(f64),
    Var(Var),
    Neg(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Call(Func, Vec<Expr>),
}

/// An expression together with how deeply it nests
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Node {
    pub(crate) expr: Expr,
    depth: usize,
}

impl Node {
    fn checked<T>(expr: Expr, depth: usize) -> Reduced<T> {
        if depth > MAX_DEPTH {
            return Err(ParseError::User { error: FormulaError::TooDeep });
        }
        Ok(Self { expr, depth })
    }

    /// One more level of grouping around the same expression
    pub(crate) fn nested<T>(self) -> Reduced<T> {
        Self::checked(self.expr, self.depth + 1)
    }
}

pub(crate) fn number(n: f64) -> Node {
    Node { expr: Expr::Number(n), depth: 1 }
}

pub(crate) fn negate<T>(inner: Node) -> Reduced<T> {
    Node::checked(Expr::Neg(Box::new(inner.expr)), inner.depth + 1)
}

pub(crate) fn binary<T>(op: BinOp, lhs: Node, rhs: Node) -> Reduced<T> {
    let depth = lhs.depth.max(rhs.depth) + 1;
    Node::checked(Expr::Binary(op, Box::new(lhs.expr), Box::new(rhs.expr)), depth)
}

/// Resolve a bare name to a variable or constant, case-insensitively
pub(crate) fn name<T>(name: &str, offset: usize) -> Reduced<T> {
    let lower = name.to_ascii_lowercase();
    let expr = match lower.as_str() {
        "x" => Expr::Var(Var::X),
        "i" => Expr::Var(Var::I),
        "len" => Expr::Var(Var::Len),
        _ => CONSTANTS
            .iter()
            .find(|(n, _)| *n == lower)
            .map(|(_, v)| Expr::Number(*v))
            .ok_or_else(|| ParseError::User {
                error: FormulaError::UnknownName { name: name.to_string(), offset },
            })?,
    };
    Ok(Node { expr, depth: 1 })
}

pub(crate) fn call<T>(name: &str, offset: usize, args: Vec<Node>) -> Reduced<T> {
    let lower = name.to_ascii_lowercase();
    let func = FUNCTIONS
        .iter()
        .find(|(n, _)| *n == lower)
        .map(|(_, f)| *f)
        .ok_or_else(|| ParseError::User {
            error: FormulaError::UnknownName { name: name.to_string(), offset },
        })?;

    if let Some(expected) = func.arity() {
        if args.len() != expected {
            return Err(ParseError::User {
                error: FormulaError::Arity { name: lower, expected, found: args.len() },
            });
        }
    }

    let depth = args.iter().map(|a| a.depth).max().unwrap_or(0) + 1;
    Node::checked(Expr::Call(func, args.into_iter().map(|a| a.expr).collect()), depth)
}
