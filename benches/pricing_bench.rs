use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use openlattice::core::PricingEngine;
use openlattice::engines::analytic::BlackScholesEngine;
use openlattice::engines::monte_carlo::MonteCarloPricingEngine;
use openlattice::engines::tree::BinomialTreeEngine;
use openlattice::instruments::VanillaOption;
use openlattice::market::Market;
use std::hint::black_box;

fn benchmark_market() -> Market {
    Market::builder()
        .spot(100.0)
        .rate(0.05)
        .flat_vol(0.20)
        .build()
        .expect("benchmark market should be valid")
}

fn bench_black_scholes_european(c: &mut Criterion) {
    let market = benchmark_market();
    let option = VanillaOption::european_call(100.0, 1.0);
    let engine = BlackScholesEngine::new();

    c.bench_function("black_scholes_european_call", |b| {
        b.iter(|| {
            let px = engine
                .price(black_box(&option), black_box(&market))
                .expect("pricing should succeed")
                .price;
            black_box(px)
        })
    });
}

fn bench_binomial_american_steps(c: &mut Criterion) {
    let market = benchmark_market();
    let option = VanillaOption::american_put(100.0, 1.0);
    let mut group = c.benchmark_group("binomial_american_put");

    for steps in [100usize, 500, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(steps), &steps, |b, &steps| {
            let engine = BinomialTreeEngine::new(steps);
            b.iter(|| {
                let px = engine
                    .price(black_box(&option), black_box(&market))
                    .expect("pricing should succeed")
                    .price;
                black_box(px)
            })
        });
    }
    group.finish();
}

fn bench_monte_carlo_european(c: &mut Criterion) {
    let market = benchmark_market();
    let option = VanillaOption::european_call(100.0, 1.0);
    let engine = MonteCarloPricingEngine::new(10_000, 42);

    c.bench_function("monte_carlo_european_call_10k", |b| {
        b.iter(|| {
            let px = engine
                .price(black_box(&option), black_box(&market))
                .expect("pricing should succeed")
                .price;
            black_box(px)
        })
    });
}

criterion_group!(
    benches,
    bench_black_scholes_european,
    bench_binomial_american_steps,
    bench_monte_carlo_european
);
criterion_main!(benches);
