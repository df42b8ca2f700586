//! Model specification
//!
//! A [`ModelSpec`] is the declarative description of a heterogeneous-agent
//! macroeconomic model: variable names, algebraic equations with timing
//! conventions (`Lag`, plain, `Prime`, `SS`), shock processes, parameters,
//! and optional decision-rule and agent-distribution blocks. It is authored
//! externally (typically deserialized from a model file) and passed to
//! [`compile`](crate::compile) once; compiled artifacts are rebuilt wholesale
//! whenever the specification changes.

mod types;

pub use types::{
    DecisionsBlock, DimensionSpec, ExpressionOrNumber, ScriptSpec, SteadyStateBlock,
    ENDOGENOUS_KINDS, EXOGENOUS_KINDS,
};

use indexmap::IndexMap;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::compiler::errors::CompileError;

/// A declarative model specification
///
/// # Example
///
/// ```
/// use econsol::ModelSpec;
///
/// let spec = ModelSpec::from_str(r#"{
///     "variables": ["c", "n"],
///     "parameters": { "chi": 0.5, "eta": 2.0 },
///     "shocks": ["e_z"],
///     "equations": [
///         "c = cSS + e_z",
///         "n = chi * c**eta"
///     ],
///     "init": { "c": 1.0, "n": 0.5 }
/// }"#).unwrap();
/// assert_eq!(spec.variables.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelSpec {
    /// Human-readable model name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Endogenous variable names, in declaration order
    pub variables: Vec<String>,

    /// Parameter names and values, in declaration order
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, f64>,

    /// Shock names, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shocks: Vec<String>,

    /// Main equations in residual or `lhs = rhs` form
    pub equations: Vec<String>,

    /// Auxiliary definitions executed ahead of the residual equations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aux_equations: Option<ScriptSpec>,

    /// Steady-state targets and free-form steady-state equations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steady_state: Option<SteadyStateBlock>,

    /// Initial guesses; ordering defines the guess-vector unpacking
    pub init: IndexMap<String, f64>,

    /// Decision-rule (backward induction) block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decisions: Option<DecisionsBlock>,

    /// Agent-distribution blocks: distribution name → dimension name → spec
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distributions: Option<IndexMap<String, IndexMap<String, DimensionSpec>>>,
}

impl ModelSpec {
    /// Parse a JSON string into a model specification.
    pub fn from_str(json: &str) -> Result<Self, CompileError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse from a JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, CompileError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String, CompileError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parameter names in declaration order.
    pub fn parameter_names(&self) -> Vec<String> {
        self.parameters.keys().cloned().collect()
    }

    /// Parameter values in declaration order.
    pub fn parameter_values(&self) -> Array1<f64> {
        self.parameters.values().copied().collect()
    }

    /// Initial-guess vector, in `init` declaration order.
    pub fn initial_guess(&self) -> Array1<f64> {
        self.init.values().copied().collect()
    }

    /// Names bound by the initial-guess vector, in order.
    pub fn init_names(&self) -> Vec<String> {
        self.init.keys().cloned().collect()
    }

    /// Auxiliary equation lines (empty when the block is absent).
    pub fn aux_lines(&self) -> Vec<String> {
        self.aux_equations
            .as_ref()
            .map(|s| s.lines())
            .unwrap_or_default()
    }

    pub fn has_decisions(&self) -> bool {
        self.decisions.is_some()
    }

    pub fn has_distributions(&self) -> bool {
        self.distributions
            .as_ref()
            .is_some_and(|d| !d.is_empty())
    }
}
