//! Performance benchmarks for partitioning and rating

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fragstats::rating::{SkillRatingEngine, TrueSkillModel, WengLinModel, WengLinParams};
use fragstats::teams::{PartitionOptimizer, SelectionPolicy};
use fragstats::types::{Player, Round, WeightedEntry};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

fn roster(size: usize) -> Vec<WeightedEntry> {
    (0..size)
        .map(|i| {
            let id = format!("player{}", i);
            WeightedEntry::new(Player::new(id.clone(), id), 800.0 + (i * 37 % 500) as f64)
        })
        .collect()
}

fn history(players: usize, rounds: usize) -> Vec<Round> {
    (0..rounds)
        .map(|r| {
            let offset = r % players;
            let ids: Vec<String> = (0..players)
                .map(|i| format!("player{}", (i + offset) % players))
                .collect();
            let (winners, losers) = ids.split_at(players / 2);
            Round::new(r as u64, winners.to_vec(), losers.to_vec())
        })
        .collect()
}

fn bench_partitioning(c: &mut Criterion) {
    let optimizer = PartitionOptimizer::default();
    let mut group = c.benchmark_group("partition_optimizer");

    for size in [6, 10, 14] {
        let entries = roster(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &entries, |b, entries| {
            b.iter(|| optimizer.optimize(black_box(entries)))
        });
    }

    group.finish();
}

fn bench_team_request(c: &mut Criterion) {
    let optimizer = PartitionOptimizer::default();
    let policy = SelectionPolicy::default();
    let entries = roster(10);
    let mut rng = StdRng::seed_from_u64(7);

    c.bench_function("optimize_and_select_10", |b| {
        b.iter(|| {
            let partitions = optimizer.optimize(black_box(&entries));
            policy.select(&partitions, entries.len(), &mut rng)
        })
    });
}

fn bench_ranking(c: &mut Criterion) {
    let rounds = history(10, 1000);
    let trueskill = SkillRatingEngine::new(Arc::new(TrueSkillModel::default()), 3.0).unwrap();
    let weng_lin = SkillRatingEngine::new(
        Arc::new(WengLinModel::new(WengLinParams::default()).unwrap()),
        3.0,
    )
    .unwrap();

    c.bench_function("rank_1000_rounds_trueskill", |b| {
        b.iter(|| trueskill.rank(black_box(&rounds)))
    });

    c.bench_function("rank_1000_rounds_weng_lin", |b| {
        b.iter(|| weng_lin.rank(black_box(&rounds)))
    });
}

criterion_group!(benches, bench_partitioning, bench_team_request, bench_ranking);
criterion_main!(benches);
