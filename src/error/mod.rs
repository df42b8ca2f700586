use thiserror::Error;

use crate::compiler::errors::CompileError;
use crate::compiler::expr::EvalError;

#[derive(Error, Debug)]
pub enum EconsolError {
    #[error("Error compiling the model: {0}")]
    CompileError(#[from] CompileError),
    #[error("Error evaluating a compiled function: {0}")]
    EvalError(#[from] EvalError),
}
