//! econsol - model compilation for heterogeneous-agent macroeconomic models
//!
//! A declarative model specification (variables, timed equations, shocks,
//! parameters, and optional decision-rule and distribution blocks) is
//! validated and compiled into live functions: the equation system as
//! residuals, a backward-induction step, a steady-state pre-function, and
//! bound forward-propagation callables. External solvers consume these
//! functions; this crate owns everything between the specification text and
//! the first solver call.
//!
//! ```
//! use econsol::{compile, ExecutionContext, ModelSpec};
//! use ndarray::array;
//!
//! let spec = ModelSpec::from_str(r#"{
//!     "variables": ["y"],
//!     "parameters": { "rho": 0.8 },
//!     "shocks": ["e_y"],
//!     "equations": ["y = rho * yLag + e_y"],
//!     "init": { "y": 0.0 }
//! }"#).unwrap();
//! let model = compile(spec, ExecutionContext::new()).unwrap();
//!
//! let residuals = &model.functions().residuals;
//! let out = residuals.call(
//!     array![1.0].view(),
//!     array![0.8].view(),
//!     array![0.64].view(),
//!     array![0.0].view(),
//!     array![0.0].view(),
//!     model.parameter_values().view(),
//! ).unwrap();
//! assert_eq!(out[0], 0.0);
//! ```

pub mod compiler;
pub mod context;
pub mod error;
pub mod model;

pub use compiler::{
    compile, compile_str, compile_with, BackwardFn, BindingLayout, CompileError, CompiledModel,
    EvalError, ForwardBinding, ForwardFn, ForwardIteration, ForwardSteadyStateFn,
    GeneratedFunctions, ResidualFn, SteadyStateFn, Validator, Value,
};
pub use context::ExecutionContext;
pub use error::EconsolError;
pub use model::{DecisionsBlock, DimensionSpec, ModelSpec, ScriptSpec, SteadyStateBlock};

pub mod prelude {
    pub use crate::compiler::{
        compile, compile_str, compile_with, CompileError, CompiledModel, ForwardIteration,
        Validator, Value,
    };
    pub use crate::context::ExecutionContext;
    pub use crate::error::EconsolError;
    pub use crate::model::ModelSpec;
}
