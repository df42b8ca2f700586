//! Integration tests for the model compilation pipeline
//!
//! These tests exercise the complete path from specification text to live
//! compiled functions, including the heterogeneous-agent extensions.

use std::sync::Arc;

use econsol::{
    compile, compile_str, compile_with, CompileError, ExecutionContext, ForwardBinding,
    ForwardIteration, ModelSpec, Validator, Value,
};
use ndarray::{array, Array1, ArrayD, IxDyn};

// ═══════════════════════════════════════════════════════════════════════════════
// Representative-Agent Models
// ═══════════════════════════════════════════════════════════════════════════════

mod representative_agent {
    use super::*;
    use approx::assert_relative_eq;

    fn rbc_json() -> &'static str {
        r#"{
            "name": "rbc",
            "variables": ["c", "k", "y"],
            "parameters": { "alpha": 0.3, "beta": 0.98, "delta": 0.1 },
            "shocks": ["e_z"],
            "equations": [
                "c**(-1) = beta * cPrime**(-1) * (alpha * yPrime / kPrime + 1 - delta)",
                "y = kLag**alpha * exp(e_z)",
                "k = (1 - delta) * kLag + y - c"
            ],
            "steady_state": {
                "fixed_values": { "k": "(alpha / (1 / beta - 1 + delta))**(1 / (1 - alpha))" },
                "equations": [
                    "y = k**alpha",
                    "c = y - delta * k"
                ]
            },
            "init": { "c": 1.0, "k": 3.0, "y": 1.0 }
        }"#
    }

    #[test]
    fn test_compile_full_pipeline() {
        let model = compile_str(rbc_json(), ExecutionContext::new()).expect("Should compile");

        assert_eq!(model.variables(), ["c", "k", "y"]);
        assert_eq!(model.parameters(), ["alpha", "beta", "delta"]);
        assert_eq!(model.shocks(), ["e_z"]);
        assert!(model.warnings().is_empty());
        assert!(model.functions().backward.is_none());
        assert!(model.functions().forward.is_none());
    }

    #[test]
    fn test_residuals_vanish_at_steady_state() {
        let model = compile_str(rbc_json(), ExecutionContext::new()).unwrap();
        let functions = model.functions();

        let (x, p) = functions
            .pre_steady_state
            .call(model.initial_guess().view())
            .unwrap();
        let out = functions
            .residuals
            .call(
                x.view(),
                x.view(),
                x.view(),
                x.view(),
                array![0.0].view(),
                p.view(),
            )
            .unwrap();

        assert_eq!(out.len(), 3);
        for r in out.iter() {
            assert_relative_eq!(*r, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_batched_residuals_flatten_batch_major() {
        let model = compile_str(rbc_json(), ExecutionContext::new()).unwrap();
        let functions = model.functions();

        let (x, p) = functions
            .pre_steady_state
            .call(model.initial_guess().view())
            .unwrap();
        let batch = 4;
        let stacked = ndarray::Array2::from_shape_fn((3, batch), |(i, _)| x[i]);

        let out = functions
            .residuals
            .call_batched(
                stacked.view(),
                stacked.view(),
                stacked.view(),
                x.view(),
                array![0.0].view(),
                p.view(),
                &[],
                &[],
            )
            .unwrap();

        assert_eq!(out.len(), 3 * batch);
        for r in out.iter() {
            assert_relative_eq!(*r, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_caret_power_is_accepted() {
        let model = compile_str(
            r#"{
                "variables": ["x"],
                "equations": ["x = xSS^2"],
                "init": { "x": 1.0 }
            }"#,
            ExecutionContext::new(),
        )
        .unwrap();
        let out = model
            .functions()
            .residuals
            .call(
                array![3.0].view(),
                array![9.0].view(),
                array![3.0].view(),
                array![3.0].view(),
                array![].view(),
                array![].view(),
            )
            .unwrap();
        assert_relative_eq!(out[0], 0.0);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Validation Failures
// ═══════════════════════════════════════════════════════════════════════════════

mod validation {
    use super::*;

    #[test]
    fn test_determinacy_mismatch() {
        let err = compile_str(
            r#"{
                "variables": ["x", "z"],
                "equations": ["x = xSS + z"],
                "init": { "x": 1.0, "z": 0.0 }
            }"#,
            ExecutionContext::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CompileError::DeterminacyMismatch {
                variables: 2,
                equations: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_variable_missing_at_time_t() {
        let err = compile_str(
            r#"{
                "variables": ["x"],
                "equations": ["xLag = xSS"],
                "init": { "x": 1.0 }
            }"#,
            ExecutionContext::new(),
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::UndefinedVariable { name } if name == "x"));
    }

    #[test]
    fn test_duplicate_variables_warn_by_default() {
        let model = compile_str(
            r#"{
                "variables": ["x", "x"],
                "equations": ["x = xSS"],
                "init": { "x": 1.0 }
            }"#,
            ExecutionContext::new(),
        )
        .unwrap();
        assert_eq!(model.variables(), ["x"]);
        assert_eq!(model.warnings().len(), 1);
    }

    #[test]
    fn test_duplicate_variables_fatal_when_strict() {
        let spec = ModelSpec::from_str(
            r#"{
                "variables": ["x", "x"],
                "equations": ["x = xSS"],
                "init": { "x": 1.0 }
            }"#,
        )
        .unwrap();
        let err =
            compile_with(spec, ExecutionContext::new(), &Validator::strict()).unwrap_err();
        assert!(matches!(err, CompileError::DuplicateVariable { name } if name == "x"));
    }

    #[test]
    fn test_nan_initial_values() {
        // 0/0 at the initial guess must be reported as NaN, not as infinity
        let err = compile_str(
            r#"{
                "variables": ["x"],
                "equations": ["x = xSS + (x - xSS) / (x - xSS)"],
                "init": { "x": 1.0 }
            }"#,
            ExecutionContext::new(),
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::InitialValuesNaN));
    }

    #[test]
    fn test_infinite_initial_values() {
        // a clean 1/0 must be reported as the distinct "not finite" condition
        let err = compile_str(
            r#"{
                "variables": ["x"],
                "equations": ["x = xSS + 1 / (x - xSS)"],
                "init": { "x": 1.0 }
            }"#,
            ExecutionContext::new(),
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::InitialValuesNotFinite));
    }

    #[test]
    fn test_more_than_one_equals_sign() {
        let err = compile_str(
            r#"{
                "variables": ["x"],
                "equations": ["x = xSS = xLag"],
                "init": { "x": 1.0 }
            }"#,
            ExecutionContext::new(),
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::InvalidExpression { .. }));
    }

    #[test]
    fn test_unknown_symbol_in_equation() {
        let err = compile_str(
            r#"{
                "variables": ["x"],
                "equations": ["x = xSS + not_declared"],
                "init": { "x": 1.0 }
            }"#,
            ExecutionContext::new(),
        )
        .unwrap_err();
        assert!(
            matches!(err, CompileError::UndefinedSymbol { name, .. } if name == "not_declared")
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Heterogeneous-Agent Models
// ═══════════════════════════════════════════════════════════════════════════════

mod heterogeneous_agent {
    use super::*;

    /// Stand-in for the numerical forward-iteration routine.
    struct UniformStationary;

    impl ForwardIteration for UniformStationary {
        fn step(
            &self,
            binding: &ForwardBinding,
            _decision_outputs: &[Value],
            distribution: &ArrayD<f64>,
        ) -> ArrayD<f64> {
            distribution * binding.transition[[0, 0]]
        }

        fn stationary(
            &self,
            binding: &ForwardBinding,
            _decision_outputs: &[Value],
        ) -> ArrayD<f64> {
            let shape = [binding.transition.nrows(), binding.grids[0].len()];
            let n = shape[0] * shape[1];
            ArrayD::from_elem(IxDyn(&shape), 1.0 / n as f64)
        }
    }

    fn het_json() -> &'static str {
        r#"{
            "variables": ["b", "w"],
            "parameters": { "beta": 0.9 },
            "equations": [
                "b = sum(dist)",
                "w = wSS"
            ],
            "init": { "b": 1.0, "w": 2.0 },
            "decisions": {
                "inputs": ["vfPrime"],
                "outputs": ["a"],
                "calls": [
                    "vf = w + beta * vfPrime",
                    "a = vf"
                ],
                "init_vf": [1.0]
            },
            "distributions": {
                "dist": {
                    "e": { "type": "exogenous_rouwenhorst", "transition_name": "P" },
                    "a": { "type": "endogenous_log", "grid_name": "a_grid" }
                }
            }
        }"#
    }

    fn het_context() -> ExecutionContext {
        let mut context = ExecutionContext::new();
        context.insert_transition("P", array![[0.9, 0.1], [0.2, 0.8]]);
        context.insert_grid("a_grid", array![0.0, 1.0, 2.0]);
        context.set_forward_routine(Arc::new(UniformStationary));
        context
    }

    #[test]
    fn test_compile_with_decisions_and_distribution() {
        let model = compile_str(het_json(), het_context()).expect("Should compile");

        let functions = model.functions();
        assert!(functions.backward.is_some());
        assert!(functions.forward.is_some());
        assert!(functions.forward_stationary.is_some());
    }

    #[test]
    fn test_backward_and_forward_round() {
        let model = compile_str(het_json(), het_context()).unwrap();
        let functions = model.functions();

        let (x, p) = functions
            .pre_steady_state
            .call(model.initial_guess().view())
            .unwrap();
        let backward = functions.backward.as_ref().unwrap();
        let (updated, outputs) = backward
            .call(
                x.view(),
                x.view(),
                x.view(),
                x.view(),
                &[Value::Scalar(1.0)],
                Array1::zeros(0).view(),
                p.view(),
            )
            .unwrap();

        // vf = w + beta * vfPrime = 2.0 + 0.9
        assert_eq!(updated, vec![Value::Scalar(2.9)]);
        assert_eq!(outputs, vec![Value::Scalar(2.9)]);

        let stationary = functions.forward_stationary.as_ref().unwrap();
        let dist = stationary.call(&outputs);
        assert_eq!(dist.shape(), &[2, 3]);

        let forward = functions.forward.as_ref().unwrap();
        let next = forward.call(&outputs, &dist);
        assert_eq!(next.shape(), &[2, 3]);
    }

    #[test]
    fn test_missing_forward_routine() {
        let mut context = ExecutionContext::new();
        context.insert_transition("P", array![[1.0]]);
        context.insert_grid("a_grid", array![0.0]);

        let err = compile_str(het_json(), context).unwrap_err();
        assert!(
            matches!(err, CompileError::MissingContextObject { name } if name.contains("routine"))
        );
    }

    #[test]
    fn test_distribution_shape_rejected_before_grid_lookup() {
        // both dimensions exogenous; the empty context must not matter
        let json = r#"{
            "variables": ["b"],
            "equations": ["b = bSS"],
            "init": { "b": 1.0 },
            "decisions": {
                "inputs": ["vfPrime"],
                "outputs": ["a"],
                "calls": ["vf = vfPrime", "a = vf"],
                "init_vf": [1.0]
            },
            "distributions": {
                "dist": {
                    "e": { "type": "exogenous_rouwenhorst", "transition_name": "P" },
                    "z": { "type": "exogenous_rouwenhorst", "transition_name": "Q" }
                }
            }
        }"#;
        let mut context = ExecutionContext::new();
        context.set_forward_routine(Arc::new(UniformStationary));

        let err = compile_str(json, context).unwrap_err();
        assert!(matches!(err, CompileError::ExogenousDimensions(2)));
    }

    #[test]
    fn test_init_vf_required_for_smoke_test() {
        let spec = {
            let mut spec = ModelSpec::from_str(het_json()).unwrap();
            spec.decisions.as_mut().unwrap().init_vf = None;
            spec
        };
        let err = compile(spec, het_context()).unwrap_err();
        assert!(matches!(err, CompileError::MissingField { field, .. } if field == "init_vf"));
    }
}
