//! Benchmarks for move generation and both search engines.

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use rust_azul::core::GameState;
use rust_azul::mcts::{HeuristicRollout, MCTSConfig, MCTSSearch};
use rust_azul::rules::{legal_actions, FastRules, MoveGenerator};
use rust_azul::search::{AlphaBetaSearch, SearchConfig};

const BUDGET: Duration = Duration::from_secs(600);

fn bench_move_generation(c: &mut Criterion) {
    let state = GameState::new(2, 42).unwrap();
    let agent = state.current();
    let generator = MoveGenerator::new();
    let mut buffer = Vec::new();

    let mut group = c.benchmark_group("movegen");
    group.bench_function("canonical", |b| b.iter(|| legal_actions(black_box(&state), agent)));
    group.bench_function("fast", |b| {
        b.iter(|| {
            generator.generate_into(black_box(&state), agent, &mut buffer);
            buffer.len()
        })
    });
    group.bench_function("count", |b| b.iter(|| generator.count(black_box(&state), agent)));
    group.finish();
}

fn bench_alphabeta(c: &mut Criterion) {
    let state = GameState::new(2, 42).unwrap();
    let agent = state.current();

    let mut group = c.benchmark_group("alphabeta");
    group.sample_size(10);
    for depth in [1, 2, 3] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            let mut search = AlphaBetaSearch::new(FastRules::new(), SearchConfig::default());
            b.iter(|| search.search(black_box(&state), agent, depth, BUDGET))
        });
    }
    group.finish();
}

fn bench_mcts(c: &mut Criterion) {
    let state = GameState::new(2, 42).unwrap();
    let agent = state.current();

    let mut group = c.benchmark_group("mcts");
    group.sample_size(10);
    for rollouts in [50, 200] {
        group.bench_with_input(BenchmarkId::new("random", rollouts), &rollouts, |b, &rollouts| {
            let mut search = MCTSSearch::new(FastRules::new(), MCTSConfig::default());
            b.iter(|| search.search(black_box(&state), agent, rollouts, BUDGET))
        });
        group.bench_with_input(BenchmarkId::new("heuristic", rollouts), &rollouts, |b, &rollouts| {
            let mut search =
                MCTSSearch::new(FastRules::new(), MCTSConfig::default()).with_rollout(HeuristicRollout::default());
            b.iter(|| search.search(black_box(&state), agent, rollouts, BUDGET))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_move_generation, bench_alphabeta, bench_mcts);
criterion_main!(benches);
