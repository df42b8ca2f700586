//! Tree-walking evaluator over named bindings
//!
//! Values are scalars or 1-D arrays; scalars broadcast against arrays so the
//! same compiled function evaluates a single equation system or a batched
//! (stacked) one without change. Float edge cases follow IEEE semantics and
//! are caught later by the validator's smoke test.

use ndarray::Array1;
use thiserror::Error;

use crate::compiler::expr::ast::{BinaryOp, Builtin, Node, UnaryOp};

/// A runtime value bound to a symbol
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(f64),
    Array(Array1<f64>),
}

impl Value {
    /// Number of elements (scalars count as one).
    pub fn len(&self) -> usize {
        match self {
            Value::Scalar(_) => 1,
            Value::Array(a) => a.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Value::Scalar(v) => Some(*v),
            Value::Array(a) if a.len() == 1 => Some(a[0]),
            Value::Array(_) => None,
        }
    }

    /// Element at `i`, broadcasting scalars.
    pub fn get(&self, i: usize) -> f64 {
        match self {
            Value::Scalar(v) => *v,
            Value::Array(a) => a[i],
        }
    }

    pub fn any_nan(&self) -> bool {
        match self {
            Value::Scalar(v) => v.is_nan(),
            Value::Array(a) => a.iter().any(|v| v.is_nan()),
        }
    }

    pub fn any_infinite(&self) -> bool {
        match self {
            Value::Scalar(v) => v.is_infinite(),
            Value::Array(a) => a.iter().any(|v| v.is_infinite()),
        }
    }
}

/// Runtime errors from evaluating a compiled function
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Two array operands of different lengths met in an elementwise operation
    #[error("Array operands have mismatched lengths: {left} and {right}")]
    LengthMismatch { left: usize, right: usize },

    /// A scalar was required but an array was produced
    #[error("Expected a scalar value in {context}, found an array of length {len}")]
    ExpectedScalar { len: usize, context: String },

    /// A positional input vector had the wrong length for this model
    #[error("Input `{name}` must have length {expected}, found {found}")]
    BadInputLength {
        name: String,
        expected: usize,
        found: usize,
    },
}

/// Evaluate a resolved expression over an environment of slot values.
pub fn eval(node: &Node, env: &[Value]) -> Result<Value, EvalError> {
    match node {
        Node::Num(v) => Ok(Value::Scalar(*v)),
        Node::Slot(i) => Ok(env[*i].clone()),
        Node::Unary(UnaryOp::Neg, e) => Ok(map1(&eval(e, env)?, |v| -v)),
        Node::Binary(op, l, r) => {
            let lhs = eval(l, env)?;
            let rhs = eval(r, env)?;
            let f = match op {
                BinaryOp::Add => |a: f64, b: f64| a + b,
                BinaryOp::Sub => |a: f64, b: f64| a - b,
                BinaryOp::Mul => |a: f64, b: f64| a * b,
                BinaryOp::Div => |a: f64, b: f64| a / b,
                BinaryOp::Pow => f64::powf,
            };
            map2(&lhs, &rhs, f)
        }
        Node::Call(builtin, args) => {
            let values = args
                .iter()
                .map(|a| eval(a, env))
                .collect::<Result<Vec<_>, _>>()?;
            apply(*builtin, &values)
        }
    }
}

fn apply(builtin: Builtin, args: &[Value]) -> Result<Value, EvalError> {
    match builtin {
        Builtin::Exp => Ok(map1(&args[0], f64::exp)),
        Builtin::Log => Ok(map1(&args[0], f64::ln)),
        Builtin::Sqrt => Ok(map1(&args[0], f64::sqrt)),
        Builtin::Abs => Ok(map1(&args[0], f64::abs)),
        Builtin::Min => map2(&args[0], &args[1], f64::min),
        Builtin::Max => map2(&args[0], &args[1], f64::max),
        Builtin::Sum => Ok(match &args[0] {
            Value::Scalar(v) => Value::Scalar(*v),
            Value::Array(a) => Value::Scalar(a.sum()),
        }),
        Builtin::Mean => Ok(match &args[0] {
            Value::Scalar(v) => Value::Scalar(*v),
            Value::Array(a) => Value::Scalar(a.sum() / a.len() as f64),
        }),
    }
}

fn map1(value: &Value, f: impl Fn(f64) -> f64) -> Value {
    match value {
        Value::Scalar(v) => Value::Scalar(f(*v)),
        Value::Array(a) => Value::Array(a.mapv(f)),
    }
}

fn map2(lhs: &Value, rhs: &Value, f: impl Fn(f64, f64) -> f64) -> Result<Value, EvalError> {
    Ok(match (lhs, rhs) {
        (Value::Scalar(a), Value::Scalar(b)) => Value::Scalar(f(*a, *b)),
        (Value::Array(a), Value::Scalar(b)) => Value::Array(a.mapv(|v| f(v, *b))),
        (Value::Scalar(a), Value::Array(b)) => Value::Array(b.mapv(|v| f(*a, v))),
        (Value::Array(a), Value::Array(b)) => {
            if a.len() != b.len() {
                return Err(EvalError::LengthMismatch {
                    left: a.len(),
                    right: b.len(),
                });
            }
            Value::Array(
                a.iter()
                    .zip(b.iter())
                    .map(|(x, y)| f(*x, *y))
                    .collect::<Array1<f64>>(),
            )
        }
    })
}
