//! Forward-propagation binding
//!
//! Models with an agent-distribution block need two extra callables: one that
//! advances the distribution a single period given the decision outputs, and
//! one that computes the stationary distribution implied by fixed decision
//! outputs. The numerical routine itself lives outside this crate behind the
//! [`ForwardIteration`] trait; this module only classifies the declared state
//! dimensions, resolves their grids and transition matrix from the execution
//! context, and partially applies those bindings so callers see plain
//! functions of (decision outputs, distribution).

use std::sync::Arc;

use ndarray::{Array1, Array2, ArrayD};

use crate::compiler::errors::CompileError;
use crate::compiler::expr::Value;
use crate::context::ExecutionContext;
use crate::model::ModelSpec;

/// External forward-iteration routine over agent distributions
///
/// Implementors receive the model-specific bindings on every call and are
/// expected to be pure in the numerical sense: no interior mutability that
/// would make repeated calls diverge.
pub trait ForwardIteration: Send + Sync {
    /// Advance `distribution` one period using the current decision outputs.
    fn step(
        &self,
        binding: &ForwardBinding,
        decision_outputs: &[Value],
        distribution: &ArrayD<f64>,
    ) -> ArrayD<f64>;

    /// Stationary distribution implied by fixed decision outputs.
    fn stationary(&self, binding: &ForwardBinding, decision_outputs: &[Value]) -> ArrayD<f64>;
}

/// Model-specific objects a [`ForwardIteration`] routine is bound to
///
/// `grids` and `indices` run over the endogenous dimensions in declaration
/// order; `indices[i]` is the position of dimension `i`'s policy within the
/// decision outputs.
#[derive(Debug, Clone)]
pub struct ForwardBinding {
    pub grids: Vec<Array1<f64>>,
    pub transition: Array2<f64>,
    pub indices: Vec<usize>,
}

/// One-period distribution update, bound to a specific model
#[derive(Clone)]
pub struct ForwardFn {
    routine: Arc<dyn ForwardIteration>,
    binding: Arc<ForwardBinding>,
}

impl ForwardFn {
    pub fn call(&self, decision_outputs: &[Value], distribution: &ArrayD<f64>) -> ArrayD<f64> {
        self.routine
            .step(&self.binding, decision_outputs, distribution)
    }

    pub fn binding(&self) -> &ForwardBinding {
        &self.binding
    }
}

impl std::fmt::Debug for ForwardFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForwardFn")
            .field("binding", &self.binding)
            .finish_non_exhaustive()
    }
}

/// Stationary-distribution solve, bound to a specific model
#[derive(Clone)]
pub struct ForwardSteadyStateFn {
    routine: Arc<dyn ForwardIteration>,
    binding: Arc<ForwardBinding>,
}

impl ForwardSteadyStateFn {
    pub fn call(&self, decision_outputs: &[Value]) -> ArrayD<f64> {
        self.routine.stationary(&self.binding, decision_outputs)
    }

    pub fn binding(&self) -> &ForwardBinding {
        &self.binding
    }
}

impl std::fmt::Debug for ForwardSteadyStateFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForwardSteadyStateFn")
            .field("binding", &self.binding)
            .finish_non_exhaustive()
    }
}

/// Bind the forward-iteration routine to the model's distribution block.
///
/// Returns `None` for models without a distribution block. Dimension shapes
/// are checked before any context lookup: at most one distribution, at most
/// one exogenous and at most two endogenous dimensions, every type tag
/// recognized, at least one exogenous dimension.
pub fn bind_forward_functions(
    spec: &ModelSpec,
    context: &ExecutionContext,
) -> Result<Option<(ForwardFn, ForwardSteadyStateFn)>, CompileError> {
    let Some(distributions) = spec.distributions.as_ref().filter(|d| !d.is_empty()) else {
        return Ok(None);
    };
    if distributions.len() > 1 {
        return Err(CompileError::MultipleDistributions(distributions.len()));
    }
    let decisions = spec
        .decisions
        .as_ref()
        .ok_or_else(|| CompileError::missing_field("decisions", "models with a distributions block"))?;
    let routine = context
        .forward_routine()
        .ok_or_else(|| CompileError::MissingContextObject {
            name: "forward iteration routine".to_string(),
        })?;

    // single iteration today; the loop shape anticipates lifting the
    // one-distribution restriction
    let mut bound = None;
    for dimensions in distributions.values() {
        let exogenous: Vec<&String> = dimensions
            .iter()
            .filter(|(_, d)| d.is_exogenous())
            .map(|(name, _)| name)
            .collect();
        let endogenous: Vec<&String> = dimensions
            .iter()
            .filter(|(_, d)| d.is_endogenous())
            .map(|(name, _)| name)
            .collect();

        if exogenous.len() > 1 {
            return Err(CompileError::ExogenousDimensions(exogenous.len()));
        }
        if endogenous.len() > 2 {
            return Err(CompileError::EndogenousDimensions(endogenous.len()));
        }
        if let Some((_, unknown)) = dimensions.iter().find(|(_, d)| !d.is_known()) {
            return Err(CompileError::UnknownStateType(unknown.kind.clone()));
        }
        let exogenous = exogenous
            .first()
            .ok_or(CompileError::ExogenousDimensions(0))?;

        let transition_name = dimensions[exogenous.as_str()]
            .transition_name
            .as_deref()
            .ok_or_else(|| {
                CompileError::missing_field("transition_name", format!("dimension `{exogenous}`"))
            })?;
        let transition = context
            .transition(transition_name)
            .ok_or_else(|| CompileError::MissingContextObject {
                name: transition_name.to_string(),
            })?
            .clone();

        let mut grids = Vec::with_capacity(endogenous.len());
        let mut indices = Vec::with_capacity(endogenous.len());
        for name in &endogenous {
            let grid_name = dimensions[name.as_str()].grid_name.as_deref().ok_or_else(|| {
                CompileError::missing_field("grid_name", format!("dimension `{name}`"))
            })?;
            let grid = context
                .grid(grid_name)
                .ok_or_else(|| CompileError::MissingContextObject {
                    name: grid_name.to_string(),
                })?;
            let index = decisions
                .outputs
                .iter()
                .position(|o| o == *name)
                .ok_or_else(|| CompileError::NotInDecisionOutputs {
                    name: (*name).clone(),
                })?;
            grids.push(grid.clone());
            indices.push(index);
        }

        let binding = Arc::new(ForwardBinding {
            grids,
            transition,
            indices,
        });
        bound = Some((
            ForwardFn {
                routine: routine.clone(),
                binding: binding.clone(),
            },
            ForwardSteadyStateFn { routine, binding },
        ));
        break;
    }

    Ok(bound)
}
