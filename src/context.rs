//! Execution context shared by compiled functions
//!
//! The context is the binding environment in which generated functions
//! resolve named objects: grid arrays, transition matrices and the external
//! forward-iteration routine. It is pre-populated by the caller, consumed by
//! [`compile`](crate::compile) and owned by the resulting
//! [`CompiledModel`](crate::CompiledModel). Recompilation starts from a fresh
//! context rather than patching one in place, since compiled functions bind
//! context entries at compile time.

use std::collections::HashMap;
use std::sync::Arc;

use ndarray::{Array1, Array2};

use crate::compiler::ForwardIteration;

/// Named grids, transition matrices and the forward-iteration routine
#[derive(Default, Clone)]
pub struct ExecutionContext {
    grids: HashMap<String, Array1<f64>>,
    transitions: HashMap<String, Array2<f64>>,
    forward_routine: Option<Arc<dyn ForwardIteration>>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a grid array under `name`.
    pub fn insert_grid(&mut self, name: impl Into<String>, grid: Array1<f64>) {
        self.grids.insert(name.into(), grid);
    }

    /// Register a transition matrix under `name`.
    pub fn insert_transition(&mut self, name: impl Into<String>, transition: Array2<f64>) {
        self.transitions.insert(name.into(), transition);
    }

    pub fn grid(&self, name: &str) -> Option<&Array1<f64>> {
        self.grids.get(name)
    }

    pub fn transition(&self, name: &str) -> Option<&Array2<f64>> {
        self.transitions.get(name)
    }

    /// Install the external forward-iteration routine.
    pub fn set_forward_routine(&mut self, routine: Arc<dyn ForwardIteration>) {
        self.forward_routine = Some(routine);
    }

    pub fn forward_routine(&self) -> Option<Arc<dyn ForwardIteration>> {
        self.forward_routine.clone()
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("grids", &self.grids.keys().collect::<Vec<_>>())
            .field("transitions", &self.transitions.keys().collect::<Vec<_>>())
            .field("forward_routine", &self.forward_routine.is_some())
            .finish()
    }
}
