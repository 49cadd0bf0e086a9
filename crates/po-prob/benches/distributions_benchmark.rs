use criterion::{Criterion, criterion_group, criterion_main};
use po_prob::{broadcast, transforms::Bijector, transforms::Link};
use std::hint::black_box;

fn bench_broadcast_density(c: &mut Criterion) {
    let xs: Vec<f64> = (0..10_000).map(|i| (i as f64) * 0.001 - 5.0).collect();
    let mus: Vec<f64> = xs.iter().map(|x| 0.5 * x).collect();
    let sds: Vec<f64> = (0..10_000).map(|i| 1.0 + (i % 7) as f64 * 0.25).collect();

    c.bench_function("broadcast_vss_10k", |b| {
        b.iter(|| black_box(broadcast::evaluate_log_density(&xs, 0.0, 1.3).unwrap()))
    });

    c.bench_function("broadcast_vvv_10k", |b| {
        b.iter(|| black_box(broadcast::evaluate_log_density(&xs, &mus, &sds).unwrap()))
    });
}

fn bench_links(c: &mut Criterion) {
    let zs: Vec<f64> = (0..10_000).map(|i| (i as f64) * 0.001 - 5.0).collect();
    let logit = Link::Logit { lower: -1.0, upper: 1.0 };

    c.bench_function("logit_link_jacobian_10k", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for &z in &zs {
                acc += logit.jacobian(z) + logit.grad_log_abs_det_jacobian(z);
            }
            black_box(acc)
        })
    });
}

criterion_group!(benches, bench_broadcast_density, bench_links);
criterion_main!(benches);
