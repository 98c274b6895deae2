//! Evaluator contract for position evaluation.
//!
//! The evaluator supplies raw move weights over the full action space plus a
//! scalar value estimate. In AlphaZero this is a neural network; for testing
//! a uniform evaluator stands in.

use chess_core::GameState;
use thiserror::Error;

/// Errors that can occur during evaluation.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("model error: {0}")]
    ModelError(String),
}

/// Result of evaluating one position.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Raw move weights over the full action space, aligned with the move
    /// index. Non-negative; the search masks and renormalizes over the
    /// resolvable legal moves itself.
    pub policy: Vec<f32>,

    /// Value estimate for the side to move, in [-1.0, 1.0].
    pub value: f32,
}

/// Position evaluator driving the search.
///
/// Implementations must be deterministic for fixed parameters, with no
/// internal randomness and no side effects. The search performs exactly one
/// blocking `evaluate` call per non-terminal simulation.
pub trait Evaluator<S: GameState>: Send + Sync {
    fn evaluate(&self, state: &S) -> Result<Evaluation, EvaluatorError>;
}

/// Uniform weights over every action slot and a neutral value.
///
/// The search's masking step turns this into a uniform prior over the legal
/// moves, which makes it a convenient stand-in when testing without a model.
#[derive(Debug, Clone)]
pub struct UniformEvaluator {
    num_actions: usize,
}

impl UniformEvaluator {
    pub fn new(num_actions: usize) -> Self {
        Self { num_actions }
    }
}

impl<S: GameState> Evaluator<S> for UniformEvaluator {
    fn evaluate(&self, _state: &S) -> Result<Evaluation, EvaluatorError> {
        Ok(Evaluation {
            policy: vec![1.0 / self.num_actions as f32; self.num_actions],
            value: 0.0,
        })
    }
}
