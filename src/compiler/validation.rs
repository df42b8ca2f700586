//! Validation of model specifications and compiled functions
//!
//! Three independent checks run during compilation:
//! - coverage: every canonical variable must appear bare (time t) in at
//!   least one main equation;
//! - duplicates and determinacy: the deduplicated variable list must match
//!   the equation count, with duplicates reported;
//! - a live smoke test: the compiled functions are exercised once at the
//!   initial guess, and non-finite residuals abort compilation with NaN and
//!   infinity reported as distinct conditions.

use ndarray::Array1;

use crate::compiler::errors::CompileError;
use crate::compiler::expr::{parse_equation, ParsedEquation, Value};
use crate::compiler::GeneratedFunctions;
use crate::model::ModelSpec;

/// Structural and numerical checks over a model
///
/// The default validator downgrades duplicate variable names to warnings
/// (first occurrence wins); a strict validator treats them as fatal.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    strict: bool,
}

impl Validator {
    pub fn new() -> Self {
        Self { strict: false }
    }

    /// A validator that rejects duplicate variable names outright.
    pub fn strict() -> Self {
        Self { strict: true }
    }

    /// Canonical variable ordering plus duplicate warnings.
    ///
    /// Deduplicates (first occurrence wins), sorts case-insensitively, and
    /// checks determinacy against the equation count. The canonical ordering
    /// is what ties flat vector positions to names everywhere downstream.
    pub fn canonical_variables(
        &self,
        variables: &[String],
        n_equations: usize,
    ) -> Result<(Vec<String>, Vec<String>), CompileError> {
        let mut duplicates = Vec::new();
        let mut canonical: Vec<String> = Vec::with_capacity(variables.len());
        for v in variables {
            if canonical.contains(v) {
                duplicates.push(v.clone());
            } else {
                canonical.push(v.clone());
            }
        }
        canonical.sort_by_key(|v| v.to_lowercase());

        if canonical.len() != n_equations {
            return Err(CompileError::DeterminacyMismatch {
                variables: canonical.len(),
                equations: n_equations,
                duplicates,
            });
        }

        let mut warnings = Vec::new();
        if !duplicates.is_empty() {
            if self.strict {
                return Err(CompileError::DuplicateVariable {
                    name: duplicates.swap_remove(0),
                });
            }
            warnings.push(format!(
                "variables list contains duplicate(s): {}",
                duplicates.join(", ")
            ));
        }
        Ok((canonical, warnings))
    }

    /// Every canonical variable must appear bare in some main equation.
    ///
    /// Matching is token-exact on the parsed equations, so `c` is not
    /// found inside `cSS` or inside an unrelated identifier like `cons`.
    pub fn check_coverage(
        &self,
        variables: &[String],
        equations: &[String],
    ) -> Result<(), CompileError> {
        let parsed: Vec<ParsedEquation> = equations
            .iter()
            .map(|e| parse_equation(e, &format!("equation `{e}`")))
            .collect::<Result<_, _>>()?;

        for v in variables {
            if !parsed.iter().any(|p| p.references(v)) {
                return Err(CompileError::UndefinedVariable { name: v.clone() });
            }
        }
        Ok(())
    }

    /// Run the compiled functions once at the initial guess.
    ///
    /// The guess is mapped through the steady-state function; models with a
    /// decisions block additionally run one backward step from `init_vf` and
    /// a stationary-distribution solve, threading both into the residual
    /// evaluation. NaN entries are reported before infinite ones.
    pub fn smoke_test(
        &self,
        spec: &ModelSpec,
        functions: &GeneratedFunctions,
    ) -> Result<(), CompileError> {
        let (x0, p0) = functions
            .pre_steady_state
            .call(spec.initial_guess().view())?;
        let shocks = Array1::zeros(spec.shocks.len());

        let (distributions, decision_outputs) = match &functions.backward {
            Some(backward) => {
                let decisions = spec.decisions.as_ref().ok_or_else(|| {
                    CompileError::missing_field("decisions", "the compiled backward function")
                })?;
                let init_vf: Vec<Value> = decisions
                    .init_vf
                    .as_ref()
                    .ok_or_else(|| {
                        CompileError::missing_field("init_vf", "the decisions block")
                    })?
                    .iter()
                    .map(|&v| Value::Scalar(v))
                    .collect();

                let (_, outputs) = backward.call(
                    x0.view(),
                    x0.view(),
                    x0.view(),
                    x0.view(),
                    &init_vf,
                    shocks.view(),
                    p0.view(),
                )?;

                let distributions = match &functions.forward_stationary {
                    Some(stationary) => {
                        let dist = stationary.call(&outputs);
                        vec![Value::Array(dist.iter().copied().collect())]
                    }
                    None => Vec::new(),
                };
                (distributions, outputs)
            }
            None => (Vec::new(), Vec::new()),
        };

        let residuals = functions.residuals.call_with(
            x0.view(),
            x0.view(),
            x0.view(),
            x0.view(),
            shocks.view(),
            p0.view(),
            &distributions,
            &decision_outputs,
        )?;

        if residuals.iter().any(|v| v.is_nan()) {
            return Err(CompileError::InitialValuesNaN);
        }
        if residuals.iter().any(|v| v.is_infinite()) {
            return Err(CompileError::InitialValuesNotFinite);
        }
        Ok(())
    }
}
