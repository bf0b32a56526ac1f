use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rxnfp::{EncoderConfig, MolecularGraph, SmilesGraph, demo_reactions, encode_single};

fn single_bench(c: &mut Criterion) {
    let cfg = EncoderConfig::default();
    let reaction = "OC(=O)c1ccccc1O.CC(=O)OC(C)=O>>CC(=O)Oc1ccccc1C(=O)O.CC(=O)O";

    c.bench_function("encode_single_aspirin", |b| {
        b.iter(|| {
            let fp = encode_single(black_box(reaction), &cfg).expect("bench encode");
            black_box(fp);
        });
    });
}

fn parse_bench(c: &mut Criterion) {
    let graph = SmilesGraph::new();
    c.bench_function("parse_smiles_aspirin", |b| {
        b.iter(|| {
            let mol = graph.parse(black_box("CC(=O)Oc1ccccc1C(=O)O"));
            black_box(mol);
        });
    });
}

fn batch_bench(c: &mut Criterion) {
    let reactions: Vec<&str> = demo_reactions()
        .into_iter()
        .cycle()
        .take(256)
        .collect();

    let mut group = c.benchmark_group("encode_batch_256");
    for parallel in [false, true] {
        let cfg = EncoderConfig::default().with_parallel(parallel);
        let encoder = rxnfp::DifferentialEncoder::new(cfg).expect("valid bench config");
        group.bench_with_input(
            BenchmarkId::from_parameter(if parallel { "parallel" } else { "sequential" }),
            &reactions,
            |b, reactions| {
                b.iter(|| {
                    let batch = encoder.encode_batch(black_box(reactions)).expect("bench batch");
                    black_box(batch);
                });
            },
        );
    }
    group.finish();
}

criterion_group!(encode_benches, single_bench, parse_bench, batch_bench);
criterion_main!(encode_benches);
