use std::time::Duration;

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use patterngraph::{
    DerivationEngine, DerivationRule,
    bench_utils::{DatasetShape, generate_chain, generate_typed_graph},
};

const GRAPH_SEED: u64 = 0xD3E1;
const SAMPLE_SIZE: usize = 10;
const WARM_UP: Duration = Duration::from_millis(300);
const MEASURE: Duration = Duration::from_secs(1);

fn bench_scale() -> usize {
    #[cfg(feature = "bench-ci")]
    {
        500
    }
    #[cfg(not(feature = "bench-ci"))]
    {
        5_000
    }
}

fn bench_random_graph(c: &mut Criterion) {
    let vertices = bench_scale();
    let base = generate_typed_graph(
        DatasetShape {
            vertices,
            edges: vertices * 2,
            vertex_types: 4,
            edge_types: 3,
        },
        GRAPH_SEED,
    )
    .materialize()
    .expect("materialize dataset");
    let rules = vec![
        DerivationRule::new("()[e0]>()[e1]>()", "(1)[reach](3)").expect("rule"),
        DerivationRule::new("(t0)[e2]>()<[e2](t1)", "(1)[peer](3)").expect("rule"),
    ];

    let mut group = c.benchmark_group("derive_random");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP);
    group.measurement_time(MEASURE);
    for generations in [1u32, 2] {
        group.bench_with_input(
            BenchmarkId::from_parameter(generations),
            &generations,
            |b, &generations| {
                b.iter_batched(
                    || base.clone(),
                    |mut graph| {
                        DerivationEngine::new(&mut graph, &rules)
                            .derive_edges(generations)
                            .expect("derive")
                    },
                    BatchSize::LargeInput,
                );
            },
        );
    }
    group.finish();
}

fn bench_chain_closure(c: &mut Criterion) {
    let base = generate_chain(64).materialize().expect("materialize chain");
    let rules = vec![DerivationRule::new("()[link]>()[link]>()", "(1)[link](3)").expect("rule")];
    let mut group = c.benchmark_group("derive_chain");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP);
    group.measurement_time(MEASURE);
    group.bench_function("closure_4_generations", |b| {
        b.iter_batched(
            || base.clone(),
            |mut graph| {
                DerivationEngine::new(&mut graph, &rules)
                    .derive_edges(4)
                    .expect("derive")
            },
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_random_graph, bench_chain_closure);
criterion_main!(benches);
