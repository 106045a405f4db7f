use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId, Throughput};
use mmsim::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn bench_full_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_run");

    for steps in [100i64, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*steps as u64));

        group.bench_with_input(
            BenchmarkId::new("comparison", steps),
            steps,
            |b, &steps| {
                b.iter_batched(
                    || {
                        let mut config = SimConfig::comparison();
                        config.market.sim_duration = steps;
                        Simulator::from_config(&config).unwrap()
                    },
                    |mut sim| {
                        sim.run().unwrap();
                        black_box(sim.reports())
                    },
                    criterion::BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

fn bench_order_flow(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_flow");

    for lambda in [1.0, 5.0, 50.0].iter() {
        group.bench_with_input(
            BenchmarkId::new("generate", lambda),
            lambda,
            |b, &lambda| {
                let generator = OrderFlowGenerator::new(lambda).unwrap();
                let mut rng = StdRng::seed_from_u64(42);
                b.iter(|| black_box(generator.generate(&mut rng)));
            },
        );
    }

    group.finish();
}

fn bench_performance_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("performance_metrics");

    for len in [1_000usize, 100_000].iter() {
        let series: Vec<f64> = (0..*len)
            .map(|i| (i as f64 * 0.01).sin() * 10.0 + i as f64 * 0.001)
            .collect();
        group.throughput(Throughput::Elements(*len as u64));

        group.bench_with_input(BenchmarkId::new("report", len), &series, |b, series| {
            let ledger = Ledger::new();
            b.iter(|| black_box(PerformanceReport::compute(series, &ledger, 100.0)));
        });

        group.bench_with_input(BenchmarkId::new("rolling_volatility", len), len, |b, &len| {
            let mut config = SimConfig::default();
            config.market.sim_duration = len as i64;
            config.market.lambda = 0.0;
            let mut sim = Simulator::from_config(&config).unwrap();
            sim.run().unwrap();
            let path = sim.price_path().clone();
            b.iter(|| black_box(path.rolling_volatility(20)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_full_run,
    bench_order_flow,
    bench_performance_metrics
);
criterion_main!(benches);
