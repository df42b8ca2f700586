//! Typed expression trees for equation text
//!
//! Equations are parsed into [`Expr`] trees with unresolved variable names,
//! then lowered to slot-indexed [`Node`] trees against a
//! [`BindingLayout`](crate::compiler::BindingLayout) before any evaluation
//! takes place. Name resolution errors therefore surface at compile time,
//! not when a solver first calls the generated function.

use crate::compiler::errors::CompileError;
use crate::compiler::timing::BindingLayout;

/// Binary operators of the equation language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// Unary operators of the equation language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
}

/// Built-in functions callable from equation text
///
/// `exp`, `log`, `sqrt` and `abs` are elementwise; `min` and `max` are
/// elementwise over two operands; `sum` and `mean` reduce an array value
/// to a scalar (used for aggregation over distributions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Exp,
    Log,
    Sqrt,
    Abs,
    Min,
    Max,
    Sum,
    Mean,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "exp" => Some(Self::Exp),
            "log" => Some(Self::Log),
            "sqrt" => Some(Self::Sqrt),
            "abs" => Some(Self::Abs),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            "sum" => Some(Self::Sum),
            "mean" => Some(Self::Mean),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Exp => "exp",
            Self::Log => "log",
            Self::Sqrt => "sqrt",
            Self::Abs => "abs",
            Self::Min => "min",
            Self::Max => "max",
            Self::Sum => "sum",
            Self::Mean => "mean",
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Self::Min | Self::Max => 2,
            _ => 1,
        }
    }
}

/// A parsed expression with unresolved variable names
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(f64),
    Var(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Call(Builtin, Vec<Expr>),
}

impl Expr {
    /// Whether the expression references `name` as a whole identifier.
    ///
    /// Token-exact: `c` never matches inside `cons` or `cSS`.
    pub fn references(&self, name: &str) -> bool {
        match self {
            Expr::Num(_) => false,
            Expr::Var(v) => v == name,
            Expr::Unary(_, e) => e.references(name),
            Expr::Binary(_, l, r) => l.references(name) || r.references(name),
            Expr::Call(_, args) => args.iter().any(|a| a.references(name)),
        }
    }

    /// Lower the expression to a slot-indexed [`Node`] against `layout`.
    pub fn resolve(&self, layout: &BindingLayout, context: &str) -> Result<Node, CompileError> {
        Ok(match self {
            Expr::Num(v) => Node::Num(*v),
            Expr::Var(name) => {
                let slot = layout.slot(name).ok_or_else(|| {
                    CompileError::undefined_symbol(name.clone(), context.to_string())
                })?;
                Node::Slot(slot)
            }
            Expr::Unary(op, e) => Node::Unary(*op, Box::new(e.resolve(layout, context)?)),
            Expr::Binary(op, l, r) => Node::Binary(
                *op,
                Box::new(l.resolve(layout, context)?),
                Box::new(r.resolve(layout, context)?),
            ),
            Expr::Call(f, args) => Node::Call(
                *f,
                args.iter()
                    .map(|a| a.resolve(layout, context))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
        })
    }
}

/// A slot-resolved expression, ready for evaluation over an environment
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Num(f64),
    Slot(usize),
    Unary(UnaryOp, Box<Node>),
    Binary(BinaryOp, Box<Node>, Box<Node>),
    Call(Builtin, Vec<Node>),
}

/// A slot-resolved assignment statement
#[derive(Debug, Clone, PartialEq)]
pub struct Assign {
    pub target: usize,
    pub expr: Node,
}
