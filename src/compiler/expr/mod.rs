//! Expression intermediate representation
//!
//! Equation text is tokenized, parsed into an [`Expr`] tree, resolved into a
//! slot-indexed [`Node`] tree against a binding layout, and evaluated by a
//! tree walker over [`Value`] environments. This replaces textual code
//! assembly with explicit IR passes.

mod ast;
mod eval;
mod lexer;
mod parser;

pub use ast::{Assign, BinaryOp, Builtin, Expr, Node, UnaryOp};
pub use eval::{eval, EvalError, Value};
pub use parser::{parse_equation, parse_expression, parse_statement, ParsedEquation};
