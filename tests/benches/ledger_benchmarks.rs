//! # Discovery-Ledger Benchmarks
//!
//! | Path | What is measured |
//! |------|------------------|
//! | dl-01 Computation | one unit per work type across difficulties |
//! | dl-03 Signature | canonical digest of a computed unit |
//! | dl-04 Consensus | three votes taking a unit to APPROVED |
//! | shared-types Hashing | Merkle root over growing batches |
//! | dl-06 Assembly | nonce search at several difficulty bits |

use std::time::Duration;

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use dl_01_computation::{ComputationEngine, ComputeRequest};
use dl_04_consensus::ConsensusApi;
use node_runtime::{NodeConfig, NodeContainer};
use shared_types::{
    merkle_root, work_leaf_hash, Block, WorkId, WorkParams, WorkStatus, WorkType, WorkUnit,
    ZERO_HASH,
};

fn computed_unit(engine: &ComputationEngine, id: u64) -> WorkUnit {
    let output = engine
        .compute(&ComputeRequest::derived(WorkType::PrimePattern, 10, Some(id)))
        .unwrap();
    WorkUnit {
        id: WorkId(id),
        work_type: output.work_type,
        difficulty: output.difficulty,
        params: output.params,
        seed: output.seed,
        result: output.result,
        verification: output.verification,
        computational_cost: output.cost.computational_cost,
        energy_efficiency: output.cost.energy_efficiency,
        energy_consumed: output.cost.energy_consumed,
        precision: output.precision,
        scientific_value: 2000.0,
        worker_id: String::new(),
        signature: None,
        timestamp: Utc::now(),
        status: WorkStatus::Pending,
    }
}

fn bench_computation(c: &mut Criterion) {
    let mut group = c.benchmark_group("dl-01-computation");
    group.measurement_time(Duration::from_secs(10));
    let engine = ComputationEngine::default();

    for work_type in WorkType::ALL {
        for difficulty in [1u32, 50, 200] {
            group.bench_with_input(
                BenchmarkId::new(work_type.as_str(), difficulty),
                &difficulty,
                |b, &difficulty| {
                    b.iter(|| {
                        black_box(
                            engine
                                .compute(&ComputeRequest::derived(work_type, difficulty, Some(7)))
                                .unwrap(),
                        )
                    })
                },
            );
        }
    }
    group.finish();
}

fn bench_signature(c: &mut Criterion) {
    let mut group = c.benchmark_group("dl-03-work-signature");
    let unit = computed_unit(&ComputationEngine::default(), 1);

    group.bench_function("sign", |b| {
        b.iter(|| black_box(dl_03_work_signature::sign(&unit, "worker-1").unwrap()))
    });

    let mut signed = unit.clone();
    dl_03_work_signature::seal(&mut signed, "worker-1").unwrap();
    let signature = signed.signature.clone().unwrap();
    group.bench_function("verify", |b| {
        b.iter(|| black_box(dl_03_work_signature::verify(&signed, &signature).unwrap()))
    });
    group.finish();
}

fn bench_consensus(c: &mut Criterion) {
    let mut group = c.benchmark_group("dl-04-consensus");
    let runtime = tokio::runtime::Runtime::new().unwrap();

    let mut config = NodeConfig::default();
    config.computation.entropy_seed = Some(1);
    let node = NodeContainer::new(config).unwrap();

    group.bench_function("votes_to_approval", |b| {
        b.iter_batched(
            || {
                runtime
                    .block_on(node.pipeline.mine(
                        WorkType::PrimePattern,
                        WorkParams::derived(WorkType::PrimePattern),
                        1,
                        "worker-1",
                    ))
                    .unwrap()
            },
            |unit| {
                runtime.block_on(async {
                    for validator in ["cern:a", "mit:b", "eth:c"] {
                        black_box(
                            node.consensus
                                .submit_vote(unit.id, validator, 100, true)
                                .await
                                .unwrap(),
                        );
                    }
                })
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_merkle_root(c: &mut Criterion) {
    let mut group = c.benchmark_group("shared-types-hashing");

    for size in [1usize, 16, 256, 4096] {
        let leaves: Vec<_> = (0..size as u64)
            .map(|i| work_leaf_hash(WorkId(i), &format!("{i:064x}")))
            .collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("merkle_root", size), &leaves, |b, leaves| {
            b.iter(|| black_box(merkle_root(leaves)))
        });
    }
    group.finish();
}

fn bench_nonce_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("dl-06-block-assembly");
    group.measurement_time(Duration::from_secs(10));

    let template = Block {
        index: 0,
        previous_hash: ZERO_HASH,
        merkle_root: [7u8; 32],
        difficulty: 0,
        nonce: 0,
        block_hash: ZERO_HASH,
        miner_id: "miner-1".to_string(),
        total_scientific_value: 2500.0,
        energy_consumed: 0.5,
        knowledge_created: 1,
        work_ids: vec![WorkId(1)],
        timestamp: Utc::now(),
    };

    for bits in [4u32, 8, 12] {
        group.bench_with_input(BenchmarkId::new("search_nonce", bits), &bits, |b, &bits| {
            b.iter(|| black_box(dl_06_block_assembly::search_nonce(&template, bits, 1 << 24)))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_computation,
    bench_signature,
    bench_consensus,
    bench_merkle_root,
    bench_nonce_search
);
criterion_main!(benches);
