//! Generation of compiled model functions
//!
//! Equation text is lowered once, at compile time, into slot-resolved
//! expression trees; the structs here own those trees plus the slot
//! bookkeeping needed to bind the flat input vectors on every call. All
//! name-resolution failures (unknown symbols, bad assignment targets,
//! missing timing suffixes) surface here, before a solver ever runs.
//!
//! Three functions are generated per model:
//! - [`ResidualFn`]: the equation system as residuals of the four state
//!   vectors, shocks and parameters, optionally fed distribution values and
//!   decision outputs.
//! - [`BackwardFn`]: one backward-induction step over the declared decision
//!   rules.
//! - [`SteadyStateFn`]: maps a raw initial-guess vector to the full
//!   (variables, parameters) pair via the steady-state targets and equations.

use ndarray::{Array1, ArrayView1, ArrayView2};
use std::ops::Range;

use crate::compiler::errors::CompileError;
use crate::compiler::expr::{
    eval, parse_equation, parse_statement, Assign, EvalError, Node, Value,
};
use crate::compiler::timing::{BindingLayout, CoreRanges, PRIME_SUFFIX};
use crate::model::ModelSpec;

// ═══════════════════════════════════════════════════════════════════════════════
// Generator
// ═══════════════════════════════════════════════════════════════════════════════

/// Lowers a model specification into its compiled functions
///
/// Construction builds the common prologue layout (lag/current/prime/steady
/// state of every canonical variable, then parameters, then shocks); each
/// `make_*` call clones and extends it with the bindings specific to that
/// function.
pub struct FunctionGenerator<'a> {
    spec: &'a ModelSpec,
    variables: &'a [String],
    layout: BindingLayout,
}

impl<'a> FunctionGenerator<'a> {
    /// `variables` is the canonical (deduplicated, sorted) variable list.
    pub fn new(spec: &'a ModelSpec, variables: &'a [String]) -> Result<Self, CompileError> {
        let layout = BindingLayout::new(variables, &spec.parameter_names(), &spec.shocks)?;
        Ok(Self {
            spec,
            variables,
            layout,
        })
    }

    /// Lower the main equation system.
    pub fn make_residuals(&self) -> Result<ResidualFn, CompileError> {
        let mut layout = self.layout.clone();

        let mut distribution_slots = Vec::new();
        if let Some(distributions) = &self.spec.distributions {
            for name in distributions.keys() {
                distribution_slots.push(layout.insert(name)?);
            }
        }
        let mut decision_slots = Vec::new();
        if let Some(decisions) = &self.spec.decisions {
            for name in &decisions.outputs {
                decision_slots.push(layout.insert(name)?);
            }
        }

        let mut assigns = Vec::new();
        for line in self.spec.aux_lines() {
            let context = format!("aux equation `{line}`");
            let (target, expr) = parse_statement(&line, &context)?;
            let node = expr.resolve(&layout, &context)?;
            assigns.push(Assign {
                target: layout.assign(&target),
                expr: node,
            });
        }

        let mut residuals = Vec::with_capacity(self.spec.equations.len());
        for eqn in &self.spec.equations {
            let context = format!("equation `{eqn}`");
            let parsed = parse_equation(eqn, &context)?;
            residuals.push(parsed.residual().resolve(&layout, &context)?);
        }

        Ok(ResidualFn {
            core: self.layout.core_ranges(),
            env_len: layout.len(),
            distribution_slots,
            decision_slots,
            assigns,
            residuals,
        })
    }

    /// Lower the decisions block, if any.
    pub fn make_backward(&self) -> Result<Option<BackwardFn>, CompileError> {
        let Some(decisions) = &self.spec.decisions else {
            return Ok(None);
        };

        let mut layout = self.layout.clone();
        let mut input_slots = Vec::with_capacity(decisions.inputs.len());
        for input in &decisions.inputs {
            if !input.ends_with(PRIME_SUFFIX) || input.len() == PRIME_SUFFIX.len() {
                return Err(CompileError::InvalidDecisionInput {
                    name: input.clone(),
                });
            }
            input_slots.push(layout.insert(input)?);
        }

        let mut assigns = Vec::new();
        for line in decisions.calls.lines() {
            let context = format!("decision rule `{line}`");
            let (target, expr) = parse_statement(&line, &context)?;
            let node = expr.resolve(&layout, &context)?;
            assigns.push(Assign {
                target: layout.assign(&target),
                expr: node,
            });
        }

        // each input's updated value is read back from the stripped name
        let mut updated_slots = Vec::with_capacity(decisions.inputs.len());
        for input in &decisions.inputs {
            let stripped = &input[..input.len() - PRIME_SUFFIX.len()];
            updated_slots.push(layout.slot(stripped).ok_or_else(|| {
                CompileError::undefined_symbol(stripped, "the decision rules")
            })?);
        }
        let mut output_slots = Vec::with_capacity(decisions.outputs.len());
        for output in &decisions.outputs {
            output_slots.push(layout.slot(output).ok_or_else(|| {
                CompileError::undefined_symbol(output.clone(), "the decision rules")
            })?);
        }

        Ok(Some(BackwardFn {
            core: self.layout.core_ranges(),
            env_len: layout.len(),
            input_slots,
            assigns,
            updated_slots,
            output_slots,
        }))
    }

    /// Lower the steady-state pre-function.
    pub fn make_pre_steady_state(&self) -> Result<SteadyStateFn, CompileError> {
        let mut layout = BindingLayout::empty();

        let mut parameter_defaults = Vec::with_capacity(self.spec.parameters.len());
        for (name, value) in &self.spec.parameters {
            parameter_defaults.push((layout.assign(name), *value));
        }
        // guesses may override parameter bindings, hence assign, not insert
        let mut init_slots = Vec::with_capacity(self.spec.init.len());
        for name in self.spec.init.keys() {
            init_slots.push(layout.assign(name));
        }

        let mut assigns = Vec::new();
        if let Some(steady_state) = &self.spec.steady_state {
            for (name, value) in &steady_state.fixed_values {
                let context = format!("steady-state target `{name}`");
                let node = value.parse(&context)?.resolve(&layout, &context)?;
                assigns.push(Assign {
                    target: layout.assign(name),
                    expr: node,
                });
            }
            if let Some(script) = &steady_state.equations {
                for line in script.lines() {
                    let context = format!("steady-state equation `{line}`");
                    let (target, expr) = parse_statement(&line, &context)?;
                    let node = expr.resolve(&layout, &context)?;
                    assigns.push(Assign {
                        target: layout.assign(&target),
                        expr: node,
                    });
                }
            }
        }

        let mut variables = Vec::with_capacity(self.variables.len());
        for name in self.variables {
            let slot = layout.slot(name).ok_or_else(|| {
                CompileError::undefined_symbol(name.clone(), "the steady state")
            })?;
            variables.push((name.clone(), slot));
        }
        let mut parameters = Vec::with_capacity(self.spec.parameters.len());
        for name in self.spec.parameters.keys() {
            // always bound, the defaults above put every parameter in scope
            if let Some(slot) = layout.slot(name) {
                parameters.push((name.clone(), slot));
            }
        }

        Ok(SteadyStateFn {
            env_len: layout.len(),
            parameter_defaults,
            init_slots,
            assigns,
            variables,
            parameters,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Residual Function
// ═══════════════════════════════════════════════════════════════════════════════

/// The compiled equation system
///
/// Residual `i` corresponds to `equations[i]`; a zero vector means the four
/// state vectors sit at a fixed point of the system.
#[derive(Debug, Clone)]
pub struct ResidualFn {
    core: CoreRanges,
    env_len: usize,
    distribution_slots: Vec<usize>,
    decision_slots: Vec<usize>,
    assigns: Vec<Assign>,
    residuals: Vec<Node>,
}

impl ResidualFn {
    pub fn n_equations(&self) -> usize {
        self.residuals.len()
    }

    /// Evaluate the residuals for a representative-agent model.
    #[allow(clippy::too_many_arguments)]
    pub fn call(
        &self,
        x_lag: ArrayView1<f64>,
        x: ArrayView1<f64>,
        x_prime: ArrayView1<f64>,
        x_ss: ArrayView1<f64>,
        shocks: ArrayView1<f64>,
        pars: ArrayView1<f64>,
    ) -> Result<Array1<f64>, EvalError> {
        self.call_with(x_lag, x, x_prime, x_ss, shocks, pars, &[], &[])
    }

    /// Evaluate the residuals with distribution values and decision outputs.
    #[allow(clippy::too_many_arguments)]
    pub fn call_with(
        &self,
        x_lag: ArrayView1<f64>,
        x: ArrayView1<f64>,
        x_prime: ArrayView1<f64>,
        x_ss: ArrayView1<f64>,
        shocks: ArrayView1<f64>,
        pars: ArrayView1<f64>,
        distributions: &[Value],
        decision_outputs: &[Value],
    ) -> Result<Array1<f64>, EvalError> {
        let mut env = fresh_env(self.env_len);
        bind_scalars(&mut env, &self.core.lag, x_lag, "XLag")?;
        bind_scalars(&mut env, &self.core.current, x, "X")?;
        bind_scalars(&mut env, &self.core.prime, x_prime, "XPrime")?;
        bind_scalars(&mut env, &self.core.steady_state, x_ss, "XSS")?;
        bind_scalars(&mut env, &self.core.parameters, pars, "pars")?;
        bind_scalars(&mut env, &self.core.shocks, shocks, "shocks")?;
        bind_values(&mut env, &self.distribution_slots, distributions, "distributions")?;
        bind_values(&mut env, &self.decision_slots, decision_outputs, "decisions_outputs")?;
        self.finish(env)
    }

    /// Evaluate the residuals over a whole stacked trajectory at once.
    ///
    /// Each state matrix has shape `(n_vars, batch)`; the output stacks the
    /// per-period residual vectors back to back in batch-major order, the
    /// layout nonlinear transition-path solvers expect.
    #[allow(clippy::too_many_arguments)]
    pub fn call_batched(
        &self,
        x_lag: ArrayView2<f64>,
        x: ArrayView2<f64>,
        x_prime: ArrayView2<f64>,
        x_ss: ArrayView1<f64>,
        shocks: ArrayView1<f64>,
        pars: ArrayView1<f64>,
        distributions: &[Value],
        decision_outputs: &[Value],
    ) -> Result<Array1<f64>, EvalError> {
        let mut env = fresh_env(self.env_len);
        bind_rows(&mut env, &self.core.lag, x_lag, "XLag")?;
        bind_rows(&mut env, &self.core.current, x, "X")?;
        bind_rows(&mut env, &self.core.prime, x_prime, "XPrime")?;
        bind_scalars(&mut env, &self.core.steady_state, x_ss, "XSS")?;
        bind_scalars(&mut env, &self.core.parameters, pars, "pars")?;
        bind_scalars(&mut env, &self.core.shocks, shocks, "shocks")?;
        bind_values(&mut env, &self.distribution_slots, distributions, "distributions")?;
        bind_values(&mut env, &self.decision_slots, decision_outputs, "decisions_outputs")?;
        self.finish(env)
    }

    fn finish(&self, mut env: Vec<Value>) -> Result<Array1<f64>, EvalError> {
        for assign in &self.assigns {
            env[assign.target] = eval(&assign.expr, &env)?;
        }

        let mut values = Vec::with_capacity(self.residuals.len());
        let mut batch = 1;
        for node in &self.residuals {
            let value = eval(node, &env)?;
            if value.len() > 1 {
                if batch > 1 && value.len() != batch {
                    return Err(EvalError::LengthMismatch {
                        left: batch,
                        right: value.len(),
                    });
                }
                batch = value.len();
            }
            values.push(value);
        }

        let n = values.len();
        let mut out = Array1::zeros(n * batch);
        for (i, value) in values.iter().enumerate() {
            for j in 0..batch {
                out[j * n + i] = value.get(if value.len() > 1 { j } else { 0 });
            }
        }
        Ok(out)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Backward Function
// ═══════════════════════════════════════════════════════════════════════════════

/// One backward-induction step over the decision rules
///
/// Returns the updated value functions (one per declared input, read from the
/// names with the `Prime` suffix stripped) and the decision outputs, both in
/// declaration order.
#[derive(Debug, Clone)]
pub struct BackwardFn {
    core: CoreRanges,
    env_len: usize,
    input_slots: Vec<usize>,
    assigns: Vec<Assign>,
    updated_slots: Vec<usize>,
    output_slots: Vec<usize>,
}

impl BackwardFn {
    pub fn n_inputs(&self) -> usize {
        self.input_slots.len()
    }

    pub fn n_outputs(&self) -> usize {
        self.output_slots.len()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn call(
        &self,
        x_lag: ArrayView1<f64>,
        x: ArrayView1<f64>,
        x_prime: ArrayView1<f64>,
        x_ss: ArrayView1<f64>,
        vf_prime: &[Value],
        shocks: ArrayView1<f64>,
        pars: ArrayView1<f64>,
    ) -> Result<(Vec<Value>, Vec<Value>), EvalError> {
        let mut env = fresh_env(self.env_len);
        bind_scalars(&mut env, &self.core.lag, x_lag, "XLag")?;
        bind_scalars(&mut env, &self.core.current, x, "X")?;
        bind_scalars(&mut env, &self.core.prime, x_prime, "XPrime")?;
        bind_scalars(&mut env, &self.core.steady_state, x_ss, "XSS")?;
        bind_scalars(&mut env, &self.core.parameters, pars, "pars")?;
        bind_scalars(&mut env, &self.core.shocks, shocks, "shocks")?;
        if vf_prime.len() != self.input_slots.len() {
            return Err(EvalError::BadInputLength {
                name: "VFPrime".to_string(),
                expected: self.input_slots.len(),
                found: vf_prime.len(),
            });
        }
        for (&slot, value) in self.input_slots.iter().zip(vf_prime) {
            env[slot] = value.clone();
        }

        for assign in &self.assigns {
            env[assign.target] = eval(&assign.expr, &env)?;
        }

        let updated = self.updated_slots.iter().map(|&s| env[s].clone()).collect();
        let outputs = self.output_slots.iter().map(|&s| env[s].clone()).collect();
        Ok((updated, outputs))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Steady-State Function
// ═══════════════════════════════════════════════════════════════════════════════

/// Maps a raw initial-guess vector to full variable and parameter vectors
///
/// Declared parameter values are bound first, then the guess vector is
/// unpacked per `init` ordering (a guess may override a parameter), then the
/// steady-state targets and equations run in source order.
#[derive(Debug, Clone)]
pub struct SteadyStateFn {
    env_len: usize,
    parameter_defaults: Vec<(usize, f64)>,
    init_slots: Vec<usize>,
    assigns: Vec<Assign>,
    variables: Vec<(String, usize)>,
    parameters: Vec<(String, usize)>,
}

impl SteadyStateFn {
    pub fn n_init(&self) -> usize {
        self.init_slots.len()
    }

    /// Returns (variables in canonical order, parameters in declaration order).
    pub fn call(&self, init: ArrayView1<f64>) -> Result<(Array1<f64>, Array1<f64>), EvalError> {
        if init.len() != self.init_slots.len() {
            return Err(EvalError::BadInputLength {
                name: "init".to_string(),
                expected: self.init_slots.len(),
                found: init.len(),
            });
        }

        let mut env = fresh_env(self.env_len);
        for &(slot, value) in &self.parameter_defaults {
            env[slot] = Value::Scalar(value);
        }
        for (&slot, &value) in self.init_slots.iter().zip(init) {
            env[slot] = Value::Scalar(value);
        }
        for assign in &self.assigns {
            env[assign.target] = eval(&assign.expr, &env)?;
        }

        let variables = self.readout(&env, &self.variables)?;
        let parameters = self.readout(&env, &self.parameters)?;
        Ok((variables, parameters))
    }

    fn readout(
        &self,
        env: &[Value],
        slots: &[(String, usize)],
    ) -> Result<Array1<f64>, EvalError> {
        slots
            .iter()
            .map(|(name, slot)| {
                env[*slot].as_scalar().ok_or_else(|| EvalError::ExpectedScalar {
                    len: env[*slot].len(),
                    context: format!("the steady-state value of `{name}`"),
                })
            })
            .collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Environment Helpers
// ═══════════════════════════════════════════════════════════════════════════════

fn fresh_env(len: usize) -> Vec<Value> {
    vec![Value::Scalar(f64::NAN); len]
}

fn bind_scalars(
    env: &mut [Value],
    range: &Range<usize>,
    values: ArrayView1<f64>,
    name: &str,
) -> Result<(), EvalError> {
    if values.len() != range.len() {
        return Err(EvalError::BadInputLength {
            name: name.to_string(),
            expected: range.len(),
            found: values.len(),
        });
    }
    for (slot, &value) in range.clone().zip(values) {
        env[slot] = Value::Scalar(value);
    }
    Ok(())
}

fn bind_rows(
    env: &mut [Value],
    range: &Range<usize>,
    values: ArrayView2<f64>,
    name: &str,
) -> Result<(), EvalError> {
    if values.nrows() != range.len() {
        return Err(EvalError::BadInputLength {
            name: name.to_string(),
            expected: range.len(),
            found: values.nrows(),
        });
    }
    for (slot, row) in range.clone().zip(values.rows()) {
        env[slot] = Value::Array(row.to_owned());
    }
    Ok(())
}

/// Unbound slots keep their NaN placeholder when no values are supplied.
fn bind_values(
    env: &mut [Value],
    slots: &[usize],
    values: &[Value],
    name: &str,
) -> Result<(), EvalError> {
    if values.is_empty() {
        return Ok(());
    }
    if values.len() != slots.len() {
        return Err(EvalError::BadInputLength {
            name: name.to_string(),
            expected: slots.len(),
            found: values.len(),
        });
    }
    for (&slot, value) in slots.iter().zip(values) {
        env[slot] = value.clone();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array2};

    fn rbc_spec() -> ModelSpec {
        ModelSpec::from_str(
            r#"{
            "variables": ["c", "k"],
            "parameters": { "alpha": 0.3, "beta": 0.98, "delta": 0.1 },
            "shocks": ["e_z"],
            "equations": [
                "c**(-1) = beta * cPrime**(-1) * (alpha * kPrime**(alpha - 1) + 1 - delta)",
                "k = (1 - delta) * kLag + kLag**alpha * exp(e_z) - c"
            ],
            "init": { "c": 1.0, "k": 3.0 }
        }"#,
        )
        .unwrap()
    }

    fn canonical(spec: &ModelSpec) -> Vec<String> {
        spec.variables.clone()
    }

    #[test]
    fn test_residuals_zero_at_fixed_point() {
        // pick alpha/beta/delta-consistent steady state
        let spec = rbc_spec();
        let vars = canonical(&spec);
        let generator = FunctionGenerator::new(&spec, &vars).unwrap();
        let residuals = generator.make_residuals().unwrap();

        let alpha: f64 = 0.3;
        let beta: f64 = 0.98;
        let delta: f64 = 0.1;
        let k = (alpha / (1.0 / beta - 1.0 + delta)).powf(1.0 / (1.0 - alpha));
        let c = k.powf(alpha) - delta * k;
        let x = array![c, k];

        let out = residuals
            .call(
                x.view(),
                x.view(),
                x.view(),
                x.view(),
                array![0.0].view(),
                spec.parameter_values().view(),
            )
            .unwrap();
        assert_eq!(out.len(), 2);
        for r in out.iter() {
            assert_relative_eq!(*r, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_aux_equations_feed_residuals() {
        let spec = ModelSpec::from_str(
            r#"{
            "variables": ["y"],
            "parameters": { "rho": 0.5 },
            "equations": ["y = z"],
            "aux_equations": ["z = rho * yLag"],
            "init": { "y": 1.0 }
        }"#,
        )
        .unwrap();
        let vars = canonical(&spec);
        let generator = FunctionGenerator::new(&spec, &vars).unwrap();
        let residuals = generator.make_residuals().unwrap();

        let out = residuals
            .call(
                array![2.0].view(),
                array![1.0].view(),
                array![1.0].view(),
                array![1.0].view(),
                array![].view(),
                array![0.5].view(),
            )
            .unwrap();
        assert_relative_eq!(out[0], 1.0 - 0.5 * 2.0);
    }

    #[test]
    fn test_unknown_symbol_fails_at_compile_time() {
        let spec = ModelSpec::from_str(
            r#"{
            "variables": ["y"],
            "equations": ["y = ySS + typo_name"],
            "init": { "y": 1.0 }
        }"#,
        )
        .unwrap();
        let vars = canonical(&spec);
        let generator = FunctionGenerator::new(&spec, &vars).unwrap();
        let err = generator.make_residuals().unwrap_err();
        assert!(
            matches!(err, CompileError::UndefinedSymbol { name, .. } if name == "typo_name")
        );
    }

    #[test]
    fn test_batched_output_is_batch_major() {
        let spec = ModelSpec::from_str(
            r#"{
            "variables": ["a", "b"],
            "equations": ["a - aLag", "b - bLag"],
            "init": { "a": 0.0, "b": 0.0 }
        }"#,
        )
        .unwrap();
        let vars = canonical(&spec);
        let generator = FunctionGenerator::new(&spec, &vars).unwrap();
        let residuals = generator.make_residuals().unwrap();

        // periods j=0,1,2 with a = j+1, b = 10(j+1); lags all zero
        let x = Array2::from_shape_vec((2, 3), vec![1.0, 2.0, 3.0, 10.0, 20.0, 30.0]).unwrap();
        let lag = Array2::zeros((2, 3));
        let out = residuals
            .call_batched(
                lag.view(),
                x.view(),
                x.view(),
                array![0.0, 0.0].view(),
                array![].view(),
                array![].view(),
                &[],
                &[],
            )
            .unwrap();
        assert_eq!(
            out.to_vec(),
            vec![1.0, 10.0, 2.0, 20.0, 3.0, 30.0]
        );
    }

    #[test]
    fn test_backward_step_returns_updated_and_outputs() {
        let spec = ModelSpec::from_str(
            r#"{
            "variables": ["w"],
            "parameters": { "beta": 0.9 },
            "equations": ["w = wSS"],
            "init": { "w": 1.0 },
            "decisions": {
                "inputs": ["vfPrime"],
                "outputs": ["a"],
                "calls": [
                    "vf = w + beta * vfPrime",
                    "a = max(vf, 0)"
                ]
            }
        }"#,
        )
        .unwrap();
        let vars = canonical(&spec);
        let generator = FunctionGenerator::new(&spec, &vars).unwrap();
        let backward = generator.make_backward().unwrap().unwrap();

        let x = array![2.0];
        let (updated, outputs) = backward
            .call(
                x.view(),
                x.view(),
                x.view(),
                x.view(),
                &[Value::Array(array![1.0, -10.0])],
                array![].view(),
                array![0.9].view(),
            )
            .unwrap();
        assert_eq!(updated, vec![Value::Array(array![2.9, -7.0])]);
        assert_eq!(outputs, vec![Value::Array(array![2.9, 0.0])]);
    }

    #[test]
    fn test_decision_input_requires_prime_suffix() {
        let spec = ModelSpec::from_str(
            r#"{
            "variables": ["w"],
            "equations": ["w = wSS"],
            "init": { "w": 1.0 },
            "decisions": {
                "inputs": ["vf"],
                "outputs": ["a"],
                "calls": ["a = vf"]
            }
        }"#,
        )
        .unwrap();
        let vars = canonical(&spec);
        let generator = FunctionGenerator::new(&spec, &vars).unwrap();
        let err = generator.make_backward().unwrap_err();
        assert!(matches!(err, CompileError::InvalidDecisionInput { name } if name == "vf"));
    }

    #[test]
    fn test_pre_steady_state_applies_targets_and_equations() {
        let spec = ModelSpec::from_str(
            r#"{
            "variables": ["c", "k", "y"],
            "parameters": { "alpha": 0.3, "delta": 0.1 },
            "equations": [
                "y = kLag**alpha",
                "c = y - delta * k",
                "k = kLag"
            ],
            "steady_state": {
                "fixed_values": { "k": 4.0, "y": "k**alpha" },
                "equations": ["c = y - delta * k"]
            },
            "init": { "c": 1.0, "k": 1.0, "y": 1.0 }
        }"#,
        )
        .unwrap();
        let vars = canonical(&spec);
        let generator = FunctionGenerator::new(&spec, &vars).unwrap();
        let pre = generator.make_pre_steady_state().unwrap();

        let (variables, parameters) = pre.call(array![0.5, 0.5, 0.5].view()).unwrap();
        let k: f64 = 4.0;
        let y = k.powf(0.3);
        assert_relative_eq!(variables[1], k);
        assert_relative_eq!(variables[2], y);
        assert_relative_eq!(variables[0], y - 0.1 * k);
        assert_eq!(parameters.to_vec(), vec![0.3, 0.1]);
    }

    #[test]
    fn test_pre_steady_state_guess_overrides_parameter() {
        let spec = ModelSpec::from_str(
            r#"{
            "variables": ["x"],
            "parameters": { "beta": 0.9 },
            "equations": ["x = beta * xSS"],
            "init": { "x": 1.0, "beta": 0.5 },
            "steady_state": { "fixed_values": {} }
        }"#,
        )
        .unwrap();
        let vars = canonical(&spec);
        let generator = FunctionGenerator::new(&spec, &vars).unwrap();
        let pre = generator.make_pre_steady_state().unwrap();

        let (_, parameters) = pre.call(array![1.0, 0.42].view()).unwrap();
        assert_relative_eq!(parameters[0], 0.42);
    }

    #[test]
    fn test_pre_steady_state_unbound_variable() {
        let spec = ModelSpec::from_str(
            r#"{
            "variables": ["x", "ghost"],
            "equations": ["x = xSS", "ghost = ghostSS"],
            "init": { "x": 1.0 }
        }"#,
        )
        .unwrap();
        let vars = canonical(&spec);
        let generator = FunctionGenerator::new(&spec, &vars).unwrap();
        let err = generator.make_pre_steady_state().unwrap_err();
        assert!(matches!(err, CompileError::UndefinedSymbol { name, .. } if name == "ghost"));
    }
}
