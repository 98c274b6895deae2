//! Monte Carlo Tree Search guided by a learned policy/value evaluator.
//!
//! The search builds a tree rooted at the current position and runs a fixed
//! number of simulations, each consisting of four phases:
//!
//! 1. **Selection**: descend from the root by selection score until a node
//!    with no children or a terminal node
//! 2. **Expansion**: add one child per resolvable legal move, with priors
//!    taken from the evaluator's policy head masked to those moves
//! 3. **Evaluation**: one evaluator call per non-terminal leaf supplies both
//!    the child priors and the value to back up; terminal leaves use the
//!    game outcome instead and never touch the evaluator
//! 4. **Backpropagation**: add the leaf value to every node on the visited
//!    path and bump its visit count
//!
//! The result is the root's visit-count distribution over the fixed action
//! space, aligned slot-for-slot with the evaluator's policy output via the
//! shared [`MoveIndex`](chess_core::MoveIndex).
//!
//! # Usage
//!
//! ```rust
//! use chess_core::MoveIndex;
//! use games_chess::ChessPosition;
//! use mcts::{run_mcts, MctsConfig, UniformEvaluator};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let index = MoveIndex::new();
//! let evaluator = UniformEvaluator::new(index.len());
//! let config = MctsConfig::for_testing();
//!
//! let mut rng = ChaCha20Rng::seed_from_u64(42);
//! let result = run_mcts(
//!     ChessPosition::startpos(),
//!     &evaluator,
//!     &index,
//!     config,
//!     &mut rng,
//! )
//! .unwrap();
//!
//! assert!((result.policy.iter().sum::<f32>() - 1.0).abs() < 1e-4);
//! ```
//!
//! A search call owns its tree exclusively and discards it on return; the
//! move index is the only shared resource, and it is immutable after
//! construction.

pub mod config;
pub mod evaluator;
pub mod node;
pub mod search;
pub mod tree;

// Re-export main types
pub use config::MctsConfig;
pub use evaluator::{Evaluation, Evaluator, EvaluatorError, UniformEvaluator};
pub use node::{MctsNode, NodeId};
pub use search::{run_mcts, MctsSearch, SearchError, SearchResult};
pub use tree::{MctsTree, TreeStats};

/// Probability mass below this threshold is treated as zero when deciding
/// whether to renormalize a distribution.
pub(crate) const MASS_EPSILON: f32 = 1e-6;

/// Hand-scripted game states for node/tree unit tests.
#[cfg(test)]
pub(crate) mod test_state {
    use chess_core::{Color, GameState, GameStatus, Move};

    #[derive(Debug, Clone)]
    pub struct ScriptedState {
        pub status: GameStatus,
    }

    impl ScriptedState {
        pub fn ongoing() -> Self {
            ScriptedState {
                status: GameStatus::Ongoing,
            }
        }

        pub fn mated() -> Self {
            ScriptedState {
                status: GameStatus::Checkmate,
            }
        }

        pub fn drawn() -> Self {
            ScriptedState {
                status: GameStatus::Draw,
            }
        }
    }

    impl GameState for ScriptedState {
        fn side_to_move(&self) -> Color {
            Color::White
        }

        fn legal_moves(&self) -> Vec<Move> {
            Vec::new()
        }

        fn is_castling(&self, _mv: Move) -> bool {
            false
        }

        fn apply(&self, _mv: Move) -> Self {
            self.clone()
        }

        fn status(&self) -> GameStatus {
            self.status
        }
    }
}
