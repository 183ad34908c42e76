// Performance benchmarks for knowledge loading, channel search and full diagnosis
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use motiondx_core::{
    Channel, DiagnosisEngine, EngineConfig, KnowledgeBase, QueryVector, RawEmbedding,
    RawKnowledgeRecord, RecordId,
};
use rand::prelude::*;
use std::sync::Arc;

const DIM: usize = 256;

fn generate_random_vector(rng: &mut StdRng, dim: usize) -> Vec<f32> {
    (0..dim).map(|_| rng.random_range(-1.0f32..1.0f32)).collect()
}

fn generate_records(count: usize, dim: usize) -> Vec<RawKnowledgeRecord> {
    let mut rng = StdRng::seed_from_u64(7);
    (0..count)
        .map(|i| RawKnowledgeRecord {
            id: RecordId::from(format!("pattern-{}", i)),
            channel_name: Channel::ALL[i % Channel::COUNT].as_str().to_string(),
            diagnosis_text: format!("condition number {}", i),
            severity: ["normal", "warning", "critical"][i % 3].to_string(),
            condition_type: format!("condition_{}", i),
            pattern_embedding: RawEmbedding::from(generate_random_vector(&mut rng, dim)),
            pattern_stats: serde_json::Value::Null,
        })
        .collect()
}

fn engine(count: usize) -> DiagnosisEngine {
    let records = generate_records(count, DIM);
    let config = EngineConfig {
        dimension: DIM,
        ..EngineConfig::default()
    };
    DiagnosisEngine::new(config, KnowledgeBase::load(DIM, &records).unwrap()).unwrap()
}

fn all_channel_queries(rng: &mut StdRng) -> Vec<QueryVector> {
    Channel::ALL
        .iter()
        .map(|&channel| QueryVector::new(channel, generate_random_vector(rng, DIM)))
        .collect()
}

fn benchmark_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");

    for size in [100, 1000, 10000].iter() {
        let records = generate_records(*size, DIM);
        group.bench_with_input(BenchmarkId::new("knowledge_base", size), size, |b, _| {
            b.iter(|| black_box(KnowledgeBase::load(DIM, &records).unwrap()));
        });
    }

    group.finish();
}

fn benchmark_channel_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("channel_search");

    for size in [1000, 10000, 60000].iter() {
        let engine = engine(*size);
        let base = engine.snapshot();
        let mut rng = StdRng::seed_from_u64(11);
        let query = QueryVector::new(Channel::GyrX, generate_random_vector(&mut rng, DIM));

        group.bench_with_input(BenchmarkId::new("top5", size), size, |b, _| {
            b.iter(|| {
                let found = base.matcher().find_matches(black_box(&query), 5, 10.0).unwrap();
                black_box(found);
            });
        });
    }

    group.finish();
}

fn benchmark_diagnose(c: &mut Criterion) {
    let mut group = c.benchmark_group("diagnose");

    let engine = engine(10000);
    let mut rng = StdRng::seed_from_u64(13);
    let queries = all_channel_queries(&mut rng);

    group.bench_function("six_channels", |b| {
        b.iter(|| black_box(engine.diagnose(black_box(&queries)).unwrap()));
    });

    group.finish();
}

fn benchmark_concurrent_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_reads");

    let engine = Arc::new(engine(1000));
    let mut rng = StdRng::seed_from_u64(17);
    let queries = Arc::new(all_channel_queries(&mut rng));

    group.bench_function("diagnose_x10", |b| {
        b.iter(|| {
            use std::thread;
            let handles: Vec<_> = (0..10)
                .map(|_| {
                    let engine = engine.clone();
                    let queries = queries.clone();
                    thread::spawn(move || engine.diagnose(&queries))
                })
                .collect();

            for handle in handles {
                black_box(handle.join().unwrap().unwrap());
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_load,
    benchmark_channel_search,
    benchmark_diagnose,
    benchmark_concurrent_reads
);
criterion_main!(benches);
