//! Search benchmarks for performance profiling.
//!
//! Run with: `cargo bench -p mcts`
//!
//! Covers the full search at varying simulation counts, the hot tree
//! operations, and move-index construction/resolution.

use chess_core::{GameState, MoveIndex};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use games_chess::ChessPosition;
use mcts::{MctsConfig, MctsSearch, MctsTree, UniformEvaluator};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn bench_search_simulations(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_search_simulations");
    let index = MoveIndex::new();
    let evaluator = UniformEvaluator::new(index.len());

    for sims in [50, 100, 200, 400] {
        group.throughput(Throughput::Elements(sims as u64));
        group.bench_with_input(BenchmarkId::new("startpos", sims), &sims, |b, &sims| {
            let config = MctsConfig::for_evaluation().with_simulations(sims);

            b.iter(|| {
                let mut rng = ChaCha20Rng::seed_from_u64(42);
                let mut search = MctsSearch::new(
                    ChessPosition::startpos(),
                    &evaluator,
                    &index,
                    config.clone(),
                );
                black_box(search.run(&mut rng).unwrap())
            });
        });
    }

    group.finish();
}

fn bench_tree_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_tree_ops");

    // Child selection over a fully expanded root.
    group.bench_function("select_child", |b| {
        let mut tree = MctsTree::new(ChessPosition::startpos());
        let root_state = ChessPosition::startpos();
        let moves = root_state.legal_moves();

        for (i, &mv) in moves.iter().enumerate() {
            let child_id = tree.add_child(
                tree.root(),
                i as u16,
                1.0 / moves.len() as f32,
                root_state.apply(mv),
            );
            let child = tree.get_mut(child_id);
            child.visit_count = (i as u32 + 1) * 10;
            child.value_sum = (i as f32 - 10.0) * 0.01 * child.visit_count as f32;
        }
        tree.get_mut(tree.root()).visit_count = 2100;

        b.iter(|| black_box(tree.select_child(tree.root(), 1.0)));
    });

    // Backpropagation along a five-ply path.
    group.bench_function("backpropagate_depth_5", |b| {
        let mut tree = MctsTree::new(ChessPosition::startpos());
        let mut state = ChessPosition::startpos();
        let mut parent = tree.root();

        for ply in 0..5u16 {
            let mv = state.legal_moves()[0];
            state = state.apply(mv);
            parent = tree.add_child(parent, ply, 0.5, state.clone());
        }
        let leaf = parent;

        b.iter(|| tree.backpropagate(black_box(leaf), 0.25, false));
    });

    // Policy extraction over the full action space.
    group.bench_function("visit_distribution", |b| {
        let index = MoveIndex::new();
        let mut tree = MctsTree::new(ChessPosition::startpos());
        let root_state = ChessPosition::startpos();

        for mv in root_state.legal_moves() {
            let slot = index.resolve(&root_state, mv).unwrap() as u16;
            let child_id = tree.add_child(tree.root(), slot, 0.05, root_state.apply(mv));
            tree.get_mut(child_id).visit_count = slot as u32 % 50 + 1;
        }

        b.iter(|| black_box(tree.visit_distribution(index.len())));
    });

    group.finish();
}

fn bench_move_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("move_index");

    group.bench_function("build", |b| {
        b.iter(|| black_box(MoveIndex::new().len()));
    });

    group.bench_function("resolve_startpos_moves", |b| {
        let index = MoveIndex::new();
        let position = ChessPosition::startpos();
        let moves = position.legal_moves();

        b.iter(|| {
            for &mv in &moves {
                black_box(index.resolve(&position, mv));
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_search_simulations,
    bench_tree_operations,
    bench_move_index,
);

criterion_main!(benches);
