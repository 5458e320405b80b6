use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray_rand::rand::SeedableRng;
use rand_isaac::Isaac64Rng;
use strata_datasets::generate;
use strata_preprocessing::scale;
use strata_reduction::reduce;
use strata_selection::{CandidateExplorer, Strategy, StrategyParams};

fn sweep_bench(c: &mut Criterion) {
    let mut rng = Isaac64Rng::seed_from_u64(40);
    let matrix = generate::expression_groups(25, 4, 60, 5., &mut rng).unwrap();
    let scaled = scale(&matrix).unwrap();
    let (reduced, _) = reduce(&*scaled, 3).unwrap();

    let params = StrategyParams::default()
        .with_resample_count(50)
        .with_consensus_seed(Some(40));

    let mut benchmark = c.benchmark_group("candidate_sweep");
    benchmark.sample_size(10);
    for &strategy in Strategy::ALL.iter() {
        let explorer = CandidateExplorer::with_params(strategy, params.clone());
        benchmark.bench_function(BenchmarkId::new("explore", strategy), |bencher| {
            bencher.iter(|| explorer.explore(black_box(&reduced), black_box(8)).unwrap());
        });
    }

    benchmark.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default();
    targets = sweep_bench
}
criterion_main!(benches);
