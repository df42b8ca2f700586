//! Timing normalization: period-qualified symbols and the shared slot layout
//!
//! Every generated function binds the four flat state vectors (`XLag`, `X`,
//! `XPrime`, `XSS`) plus parameters and shocks through the same slot layout,
//! so a given name always denotes the same timing tag everywhere. The layout
//! is pure bookkeeping; no validation beyond collision detection happens
//! here, and ordering is preserved exactly (ordering is the only thing that
//! binds a flat vector position to a name).

use std::ops::Range;

use indexmap::IndexMap;

use crate::compiler::errors::CompileError;

/// Suffix denoting the previous period
pub const LAG_SUFFIX: &str = "Lag";
/// Suffix denoting the next period
pub const PRIME_SUFFIX: &str = "Prime";
/// Suffix denoting the steady state
pub const STEADY_STATE_SUFFIX: &str = "SS";

/// Slot positions of the common prologue groups within an environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreRanges {
    pub lag: Range<usize>,
    pub current: Range<usize>,
    pub prime: Range<usize>,
    pub steady_state: Range<usize>,
    pub parameters: Range<usize>,
    pub shocks: Range<usize>,
}

/// Mapping from period-qualified symbol names to environment slots
///
/// Built once per model in group-major order (`vLag` for every variable,
/// then bare `v`, then `vPrime`, then `vSS`, then parameters, then shocks)
/// and cloned/extended by each generation routine.
#[derive(Debug, Clone)]
pub struct BindingLayout {
    slots: IndexMap<String, usize>,
    n_vars: usize,
    n_pars: usize,
    n_shocks: usize,
}

impl BindingLayout {
    /// An empty layout with no core groups (used by the steady-state function).
    pub fn empty() -> Self {
        Self {
            slots: IndexMap::new(),
            n_vars: 0,
            n_pars: 0,
            n_shocks: 0,
        }
    }

    /// Build the common prologue layout shared by every generated function.
    pub fn new(
        variables: &[String],
        parameters: &[String],
        shocks: &[String],
    ) -> Result<Self, CompileError> {
        let mut layout = Self::empty();
        for suffix in [LAG_SUFFIX, "", PRIME_SUFFIX, STEADY_STATE_SUFFIX] {
            for v in variables {
                layout.insert(&format!("{v}{suffix}"))?;
            }
        }
        for p in parameters {
            layout.insert(p)?;
        }
        for s in shocks {
            layout.insert(s)?;
        }
        layout.n_vars = variables.len();
        layout.n_pars = parameters.len();
        layout.n_shocks = shocks.len();
        Ok(layout)
    }

    /// Register a fresh binding, failing on collision.
    pub fn insert(&mut self, name: &str) -> Result<usize, CompileError> {
        if self.slots.contains_key(name) {
            return Err(CompileError::SymbolCollision {
                name: name.to_string(),
            });
        }
        let slot = self.slots.len();
        self.slots.insert(name.to_string(), slot);
        Ok(slot)
    }

    /// Slot for an assignment target: reuses an existing binding or creates one.
    pub fn assign(&mut self, name: &str) -> usize {
        if let Some(&slot) = self.slots.get(name) {
            return slot;
        }
        let slot = self.slots.len();
        self.slots.insert(name.to_string(), slot);
        slot
    }

    pub fn slot(&self, name: &str) -> Option<usize> {
        self.slots.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot ranges of the prologue groups, in group-major order.
    pub fn core_ranges(&self) -> CoreRanges {
        let n = self.n_vars;
        let pars_start = 4 * n;
        let shocks_start = pars_start + self.n_pars;
        CoreRanges {
            lag: 0..n,
            current: n..2 * n,
            prime: 2 * n..3 * n,
            steady_state: 3 * n..4 * n,
            parameters: pars_start..shocks_start,
            shocks: shocks_start..shocks_start + self.n_shocks,
        }
    }
}
