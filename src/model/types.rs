//! Block definitions for model specifications

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::compiler::errors::CompileError;
use crate::compiler::expr::{parse_expression, Expr};

// ═══════════════════════════════════════════════════════════════════════════════
// Script Blocks
// ═══════════════════════════════════════════════════════════════════════════════

/// Statement lines given either as one newline-separated block or as a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptSpec {
    /// Single string holding all lines
    Block(String),
    /// One statement per entry
    Lines(Vec<String>),
}

impl ScriptSpec {
    /// The individual statement lines, trimmed, blank lines dropped.
    pub fn lines(&self) -> Vec<String> {
        let raw: Vec<String> = match self {
            Self::Block(s) => s.lines().map(str::to_string).collect(),
            Self::Lines(v) => v.clone(),
        };
        raw.into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lines().is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Expression Values
// ═══════════════════════════════════════════════════════════════════════════════

/// Either an expression string or a numeric value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExpressionOrNumber {
    /// A numeric constant
    Number(f64),
    /// An equation-language expression
    Expression(String),
}

impl ExpressionOrNumber {
    /// Parse into an expression tree.
    pub fn parse(&self, context: &str) -> Result<Expr, CompileError> {
        match self {
            Self::Number(v) => Ok(Expr::Num(*v)),
            Self::Expression(s) => parse_expression(s, context),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Steady State
// ═══════════════════════════════════════════════════════════════════════════════

/// Steady-state equation block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SteadyStateBlock {
    /// Steady-state targets, evaluated before the free-form equations
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub fixed_values: IndexMap<String, ExpressionOrNumber>,

    /// Free-form assignments, executed in source order after the targets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equations: Option<ScriptSpec>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Decisions
// ═══════════════════════════════════════════════════════════════════════════════

/// Decision-rule (backward induction) block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionsBlock {
    /// Next-period value-function names; each must carry the `Prime` suffix
    pub inputs: Vec<String>,

    /// Decision outputs, in declaration order
    pub outputs: Vec<String>,

    /// Assignment statements executed in source order
    pub calls: ScriptSpec,

    /// Initial guess per value-function input, used by the validation smoke test
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_vf: Option<Vec<f64>>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Distributions
// ═══════════════════════════════════════════════════════════════════════════════

/// State-type tags classified as exogenous
pub const EXOGENOUS_KINDS: &[&str] = &["exogenous_custom", "exogenous_rouwenhorst"];
/// State-type tags classified as endogenous
pub const ENDOGENOUS_KINDS: &[&str] = &["endogenous_custom", "endogenous_log"];

/// One state dimension of a distribution block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionSpec {
    /// State-type tag; unrecognized tags are rejected by the forward binder
    #[serde(rename = "type")]
    pub kind: String,

    /// Name of the grid array in the execution context (endogenous dimensions)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_name: Option<String>,

    /// Name of the transition matrix in the execution context (exogenous dimensions)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_name: Option<String>,
}

impl DimensionSpec {
    pub fn is_exogenous(&self) -> bool {
        EXOGENOUS_KINDS.contains(&self.kind.as_str())
    }

    pub fn is_endogenous(&self) -> bool {
        ENDOGENOUS_KINDS.contains(&self.kind.as_str())
    }

    pub fn is_known(&self) -> bool {
        self.is_exogenous() || self.is_endogenous()
    }
}
