//! Model Compilation
//!
//! This module turns a declarative [`ModelSpec`](crate::model::ModelSpec)
//! into live, callable functions. Compilation runs in four stages:
//!
//! 1. **Validation** — duplicate/determinacy checks produce the canonical
//!    variable ordering; a coverage check confirms every variable appears
//!    at time t in some equation.
//! 2. **Timing normalization** — the canonical ordering is expanded into
//!    the shared slot layout binding `vLag`/`v`/`vPrime`/`vSS`, parameters
//!    and shocks.
//! 3. **Code generation** — equation text is lowered to slot-resolved
//!    expression trees wrapped in the residual, backward and steady-state
//!    functions; models with a distribution block additionally bind the
//!    external forward-iteration routine to their grids and transition
//!    matrix.
//! 4. **Smoke test** — the compiled functions run once at the initial
//!    guess; NaN or infinite residuals abort compilation.
//!
//! # Quick Start
//!
//! ```
//! use econsol::{compile, ExecutionContext, ModelSpec};
//!
//! let spec = ModelSpec::from_str(r#"{
//!     "variables": ["c", "k"],
//!     "parameters": { "alpha": 0.3, "beta": 0.98, "delta": 0.1 },
//!     "equations": [
//!         "c**(-1) = beta * cPrime**(-1) * (alpha * kPrime**(alpha - 1) + 1 - delta)",
//!         "k = (1 - delta) * kLag + kLag**alpha - c"
//!     ],
//!     "init": { "c": 1.0, "k": 3.0 }
//! }"#).unwrap();
//!
//! let model = compile(spec, ExecutionContext::new()).unwrap();
//! assert_eq!(model.variables(), ["c", "k"]);
//! ```

pub mod codegen;
pub mod errors;
pub mod expr;
pub mod forward;
pub mod timing;
pub mod validation;

pub use codegen::{BackwardFn, FunctionGenerator, ResidualFn, SteadyStateFn};
pub use errors::CompileError;
pub use expr::{eval, EvalError, Value};
pub use forward::{
    bind_forward_functions, ForwardBinding, ForwardFn, ForwardIteration, ForwardSteadyStateFn,
};
pub use timing::{BindingLayout, CoreRanges, LAG_SUFFIX, PRIME_SUFFIX, STEADY_STATE_SUFFIX};
pub use validation::Validator;

use ndarray::Array1;

use crate::context::ExecutionContext;
use crate::model::ModelSpec;

/// The callables generated for one model
///
/// `backward`, `forward` and `forward_stationary` are only present for
/// models with decisions and distributions blocks respectively.
#[derive(Debug, Clone)]
pub struct GeneratedFunctions {
    pub residuals: ResidualFn,
    pub pre_steady_state: SteadyStateFn,
    pub backward: Option<BackwardFn>,
    pub forward: Option<ForwardFn>,
    pub forward_stationary: Option<ForwardSteadyStateFn>,
}

/// A fully compiled model
///
/// Owns the specification, the execution context and the generated
/// functions. Compiled artifacts are never patched in place; recompile from
/// a fresh context after changing the specification.
#[derive(Debug, Clone)]
pub struct CompiledModel {
    spec: ModelSpec,
    context: ExecutionContext,
    variables: Vec<String>,
    parameters: Vec<String>,
    parameter_values: Array1<f64>,
    shocks: Vec<String>,
    functions: GeneratedFunctions,
    warnings: Vec<String>,
}

impl CompiledModel {
    pub fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    /// Canonical variable names; positions in the flat state vectors.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub fn parameter_values(&self) -> &Array1<f64> {
        &self.parameter_values
    }

    pub fn shocks(&self) -> &[String] {
        &self.shocks
    }

    pub fn functions(&self) -> &GeneratedFunctions {
        &self.functions
    }

    /// Non-fatal findings from validation (duplicate variable names).
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn n_variables(&self) -> usize {
        self.variables.len()
    }

    /// The initial guess vector, in `init` declaration order.
    pub fn initial_guess(&self) -> Array1<f64> {
        self.spec.initial_guess()
    }
}

/// Compile a model with the default validator.
pub fn compile(
    spec: ModelSpec,
    context: ExecutionContext,
) -> Result<CompiledModel, CompileError> {
    compile_with(spec, context, &Validator::new())
}

/// Compile a model specification given as a JSON string.
pub fn compile_str(json: &str, context: ExecutionContext) -> Result<CompiledModel, CompileError> {
    compile(ModelSpec::from_str(json)?, context)
}

/// Compile a model with an explicit validator.
pub fn compile_with(
    spec: ModelSpec,
    context: ExecutionContext,
    validator: &Validator,
) -> Result<CompiledModel, CompileError> {
    let (variables, warnings) =
        validator.canonical_variables(&spec.variables, spec.equations.len())?;
    validator.check_coverage(&variables, &spec.equations)?;

    let generator = FunctionGenerator::new(&spec, &variables)?;
    let residuals = generator.make_residuals()?;
    let pre_steady_state = generator.make_pre_steady_state()?;
    let backward = generator.make_backward()?;

    let (forward, forward_stationary) = match bind_forward_functions(&spec, &context)? {
        Some((forward, stationary)) => (Some(forward), Some(stationary)),
        None => (None, None),
    };

    let functions = GeneratedFunctions {
        residuals,
        pre_steady_state,
        backward,
        forward,
        forward_stationary,
    };
    validator.smoke_test(&spec, &functions)?;

    let parameters = spec.parameter_names();
    let parameter_values = spec.parameter_values();
    let shocks = spec.shocks.clone();
    Ok(CompiledModel {
        spec,
        context,
        variables,
        parameters,
        parameter_values,
        shocks,
        functions,
        warnings,
    })
}
