//! The search loop.
//!
//! Runs a fixed number of simulations, each one a full
//! select -> expand/evaluate -> backpropagate pass:
//! 1. Selection: descend by selection score to a leaf, recording the path
//! 2. Expansion + evaluation: one evaluator call per non-terminal leaf; the
//!    policy head becomes the child priors, the value head is backed up
//! 3. Terminal leaf: the game outcome is backed up instead, with no
//!    evaluator call
//! 4. Backpropagation: bump visits and add the leaf value along the path
//!
//! The loop is strictly sequential; nothing is batched and nothing is
//! cancelled. The only shared resource is the immutable move index.

use chess_core::{GameState, Move, MoveIndex};
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::{debug, trace};

use crate::config::MctsConfig;
use crate::evaluator::{Evaluation, Evaluator, EvaluatorError};
use crate::node::NodeId;
use crate::tree::MctsTree;
use crate::MASS_EPSILON;

/// Errors surfaced by a search call.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("evaluator error: {0}")]
    Evaluator(#[from] EvaluatorError),

    #[error("evaluator returned a policy of length {got}, expected {expected}")]
    PolicyLength { got: usize, expected: usize },

    #[error("evaluator returned a non-finite policy weight or value")]
    NonFiniteEvaluation,
}

/// Outcome of one search call.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Visit-count distribution over the full action space. Sums to 1
    /// unless the root was terminal, in which case it is all zeros.
    pub policy: Vec<f32>,

    /// Mean value accumulated at the root.
    pub root_value: f32,

    /// Simulations performed.
    pub simulations: u32,
}

/// One search over a tree rooted at a position snapshot.
///
/// The tree is exclusively owned and discarded with the search; callers
/// keep the move index and evaluator across calls.
pub struct MctsSearch<'a, S: GameState, E: Evaluator<S>> {
    tree: MctsTree<S>,
    evaluator: &'a E,
    index: &'a MoveIndex,
    config: MctsConfig,
    num_actions: usize,
}

impl<'a, S: GameState, E: Evaluator<S>> MctsSearch<'a, S, E> {
    /// Build a fresh tree around `root_state`. The root gets prior 1.0 and
    /// its terminal flag straight from the game-state oracle.
    pub fn new(root_state: S, evaluator: &'a E, index: &'a MoveIndex, config: MctsConfig) -> Self {
        let num_actions = index.len();
        Self {
            tree: MctsTree::new(root_state),
            evaluator,
            index,
            config,
            num_actions,
        }
    }

    /// Run the configured number of simulations and extract the root's
    /// visit distribution.
    pub fn run(&mut self, rng: &mut ChaCha20Rng) -> Result<SearchResult, SearchError> {
        for _ in 0..self.config.simulations {
            self.simulate(rng)?;
        }

        let stats = self.tree.stats();
        debug!(
            nodes = stats.total_nodes,
            root_visits = stats.root_visits,
            root_value = stats.root_value,
            max_depth = stats.max_depth,
            "search complete"
        );

        Ok(SearchResult {
            policy: self.tree.visit_distribution(self.num_actions),
            root_value: self.tree.get(self.tree.root()).mean_value(),
            simulations: self.config.simulations,
        })
    }

    /// One full select -> expand/evaluate -> backpropagate pass.
    fn simulate(&mut self, rng: &mut ChaCha20Rng) -> Result<(), SearchError> {
        let (leaf_id, path) = self.select();
        let leaf = self.tree.get(leaf_id);

        let value = if leaf.is_terminal {
            // Terminal leaves never touch the evaluator.
            leaf.terminal_value
        } else {
            self.expand(leaf_id, rng)?
        };

        self.tree
            .backpropagate(leaf_id, value, self.config.flip_value_sign);

        trace!(leaf = leaf_id.0, depth = path.len() - 1, value, "simulation complete");
        Ok(())
    }

    /// Descend from the root by selection score until reaching a node with
    /// no children or a terminal node. Returns the leaf and the visited
    /// path, root through leaf inclusive.
    fn select(&self) -> (NodeId, Vec<NodeId>) {
        let mut current = self.tree.root();
        let mut path = vec![current];

        loop {
            let node = self.tree.get(current);
            if node.is_leaf() {
                break;
            }
            match self.tree.select_child(current, self.config.c_puct) {
                Some(child) => {
                    path.push(child);
                    current = child;
                }
                None => break,
            }
        }

        (current, path)
    }

    /// Expand a non-terminal leaf: one evaluator call, then one child per
    /// resolvable legal move. Returns the evaluator's value estimate for
    /// backpropagation.
    fn expand(&mut self, node_id: NodeId, rng: &mut ChaCha20Rng) -> Result<f32, SearchError> {
        let state = self.tree.get(node_id).state.clone();

        let evaluation = self.evaluator.evaluate(&state)?;
        validate_evaluation(&evaluation, self.num_actions)?;

        // Legal moves outside the action vocabulary (under-promotions) are
        // dropped from the tree entirely.
        let resolvable: Vec<(u16, Move)> = state
            .legal_moves()
            .into_iter()
            .filter_map(|mv| {
                self.index
                    .resolve(&state, mv)
                    .map(|slot| (slot as u16, mv))
            })
            .collect();

        if resolvable.is_empty() {
            // A non-terminal position with no resolvable moves should not
            // occur under correct rules; demote it to a drawn terminal leaf
            // instead of failing.
            let node = self.tree.get_mut(node_id);
            node.is_terminal = true;
            node.terminal_value = 0.0;
            return Ok(0.0);
        }

        let actions: Vec<u16> = resolvable.iter().map(|&(slot, _)| slot).collect();
        let mut priors = masked_priors(&evaluation.policy, &actions);

        if node_id == self.tree.root() && self.config.dirichlet_alpha > 0.0 {
            let noise = dirichlet_noise(priors.len(), self.config.dirichlet_alpha, rng);
            priors = blend_noise(&priors, &noise, self.config.dirichlet_epsilon);
        }

        for (&(action, mv), &prior) in resolvable.iter().zip(priors.iter()) {
            let next = state.apply(mv);
            self.tree.add_child(node_id, action, prior, next);
        }

        Ok(evaluation.value)
    }

    /// The search tree, for inspection.
    pub fn tree(&self) -> &MctsTree<S> {
        &self.tree
    }
}

/// Restrict a full-width policy to the given action slots, returning a fresh
/// normalized prior vector aligned with `actions`. Falls back to a uniform
/// distribution when the masked mass is effectively zero.
fn masked_priors(policy: &[f32], actions: &[u16]) -> Vec<f32> {
    let weights: Vec<f32> = actions.iter().map(|&a| policy[a as usize]).collect();
    let mass: f32 = weights.iter().sum();

    if mass > MASS_EPSILON {
        weights.iter().map(|w| w / mass).collect()
    } else {
        vec![1.0 / actions.len() as f32; actions.len()]
    }
}

/// Mix exploration noise into a prior vector as
/// `(1 - epsilon) * prior + epsilon * noise`, renormalized. Returns a fresh
/// vector; inputs are untouched.
fn blend_noise(priors: &[f32], noise: &[f32], epsilon: f32) -> Vec<f32> {
    let blended: Vec<f32> = priors
        .iter()
        .zip(noise)
        .map(|(p, n)| (1.0 - epsilon) * p + epsilon * n)
        .collect();

    let mass: f32 = blended.iter().sum();
    if mass > MASS_EPSILON {
        blended.iter().map(|w| w / mass).collect()
    } else {
        blended
    }
}

/// Dirichlet(alpha) sample of length `n`, built from normalized Gamma
/// variates.
fn dirichlet_noise(n: usize, alpha: f32, rng: &mut ChaCha20Rng) -> Vec<f32> {
    use rand_distr::{Distribution, Gamma};

    let gamma = Gamma::new(alpha as f64, 1.0).unwrap();
    let mut samples: Vec<f32> = (0..n).map(|_| gamma.sample(rng) as f32).collect();

    let sum: f32 = samples.iter().sum();
    if sum > 0.0 {
        for sample in &mut samples {
            *sample /= sum;
        }
    }
    samples
}

/// A malformed evaluation indicates a broken collaborator, not a condition
/// the search can recover from.
fn validate_evaluation(evaluation: &Evaluation, num_actions: usize) -> Result<(), SearchError> {
    if evaluation.policy.len() != num_actions {
        return Err(SearchError::PolicyLength {
            got: evaluation.policy.len(),
            expected: num_actions,
        });
    }
    if !evaluation.value.is_finite() || evaluation.policy.iter().any(|w| !w.is_finite()) {
        return Err(SearchError::NonFiniteEvaluation);
    }
    Ok(())
}

/// Convenience function to run a single search.
pub fn run_mcts<S: GameState, E: Evaluator<S>>(
    root_state: S,
    evaluator: &E,
    index: &MoveIndex,
    config: MctsConfig,
    rng: &mut ChaCha20Rng,
) -> Result<SearchResult, SearchError> {
    MctsSearch::new(root_state, evaluator, index, config).run(rng)
}
