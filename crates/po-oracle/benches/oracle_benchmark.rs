use criterion::{Criterion, criterion_group, criterion_main};
use po_core::Integrator;
use po_oracle::{
    CoinFlip, ExpectationOracle, GaussKronrod, RegressionUniformPriors, Scenario,
    StochasticVolatility, SvPoint,
};
use std::hint::black_box;

fn bench_quadrature(c: &mut Criterion) {
    let q = GaussKronrod::default();

    c.bench_function("gk15_gaussian_real_line", |b| {
        b.iter(|| {
            black_box(
                q.integrate(&|x: f64| Ok((-0.5 * x * x).exp()), f64::NEG_INFINITY, f64::INFINITY)
                    .unwrap(),
            )
        })
    });
}

fn bench_expectation(c: &mut Criterion) {
    let oracle = ExpectationOracle::default();
    let coin = CoinFlip::default();
    let regression = RegressionUniformPriors::fuzzy();

    c.bench_function("posterior_mean_coin_flip", |b| {
        b.iter(|| black_box(coin.posterior_mean(&oracle).unwrap()))
    });

    c.bench_function("posterior_mean_regression_2d", |b| {
        b.iter(|| black_box(regression.posterior_mean(&oracle).unwrap()))
    });
}

fn bench_sv_gradient(c: &mut Criterion) {
    let n = 500;
    let y: Vec<f64> = (0..n).map(|i| ((i as f64) * 0.37).sin() * 0.8).collect();
    let h_std: Vec<f64> = (0..n).map(|i| ((i as f64) * 0.11).cos()).collect();
    let model = StochasticVolatility::new(y).unwrap();
    let point = SvPoint::from_constrained(0.95, 0.25, -1.02, h_std).unwrap();

    c.bench_function("sv_full_gradient_500", |b| {
        b.iter(|| black_box(model.full_gradient(&point).unwrap()))
    });
}

criterion_group!(benches, bench_quadrature, bench_expectation, bench_sv_gradient);
criterion_main!(benches);
