use criterion::{criterion_group, criterion_main, Criterion};
use econsol::{compile_str, CompiledModel, ExecutionContext};
use ndarray::{array, Array2};
use std::hint::black_box;

fn rbc_model() -> CompiledModel {
    compile_str(
        r#"{
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
        }"#,
        ExecutionContext::new(),
    )
    .unwrap()
}

fn residual_single(model: &CompiledModel, n: usize) {
    let functions = model.functions();
    let (x, p) = functions
        .pre_steady_state
        .call(model.initial_guess().view())
        .unwrap();
    let shocks = array![0.0];
    for _ in 0..n {
        let out = functions
            .residuals
            .call(
                x.view(),
                x.view(),
                x.view(),
                x.view(),
                shocks.view(),
                p.view(),
            )
            .unwrap();
        black_box(out);
    }
}

fn residual_batched(model: &CompiledModel, batch: usize) {
    let functions = model.functions();
    let (x, p) = functions
        .pre_steady_state
        .call(model.initial_guess().view())
        .unwrap();
    let stacked = Array2::from_shape_fn((3, batch), |(i, _)| x[i]);
    let shocks = array![0.0];
    let out = functions
        .residuals
        .call_batched(
            stacked.view(),
            stacked.view(),
            stacked.view(),
            x.view(),
            shocks.view(),
            p.view(),
            &[],
            &[],
        )
        .unwrap();
    black_box(out);
}

fn criterion_benchmark(c: &mut Criterion) {
    let model = rbc_model();

    c.bench_function("compile rbc", |b| {
        b.iter(|| black_box(rbc_model()))
    });
    c.bench_function("residuals 100", |b| {
        b.iter(|| residual_single(black_box(&model), 100))
    });
    c.bench_function("residuals batched 200", |b| {
        b.iter(|| residual_batched(black_box(&model), 200))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
