//! Search configuration parameters.

/// Configuration for one Monte Carlo Tree Search call.
#[derive(Debug, Clone)]
pub struct MctsConfig {
    /// Number of simulations per search call. This is a fixed upper bound
    /// decided before the call; there is no convergence-based early exit.
    pub simulations: u32,

    /// Exploration constant in the selection score.
    /// Higher values favor the prior over accumulated value.
    pub c_puct: f32,

    /// Dirichlet concentration for root exploration noise.
    /// Set to 0.0 to disable noise (evaluation/inference).
    pub dirichlet_alpha: f32,

    /// Fraction of the root prior replaced by noise.
    pub dirichlet_epsilon: f32,

    /// Negate the leaf value at every ply while backpropagating.
    ///
    /// Off by default: the reference behavior adds the same leaf value,
    /// unchanged, to every node on the path, even though the evaluator
    /// scores positions for the side to move. Turn this on for the
    /// conventional alternating-perspective update.
    pub flip_value_sign: bool,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            simulations: 400,
            c_puct: 1.0,
            dirichlet_alpha: 0.3,
            dirichlet_epsilon: 0.25,
            flip_value_sign: false,
        }
    }
}

impl MctsConfig {
    /// Config for self-play (with exploration noise).
    pub fn for_training() -> Self {
        Self::default()
    }

    /// Config for evaluation/inference: no root noise.
    pub fn for_evaluation() -> Self {
        Self {
            dirichlet_alpha: 0.0,
            dirichlet_epsilon: 0.0,
            ..Self::default()
        }
    }

    /// Fast config for tests.
    pub fn for_testing() -> Self {
        Self {
            simulations: 50,
            ..Self::default()
        }
    }

    /// Builder pattern: set number of simulations.
    pub fn with_simulations(mut self, n: u32) -> Self {
        self.simulations = n;
        self
    }

    /// Builder pattern: set the exploration constant.
    pub fn with_c_puct(mut self, c: f32) -> Self {
        self.c_puct = c;
        self
    }

    /// Builder pattern: set the backpropagation sign convention.
    pub fn with_flip_value_sign(mut self, flip: bool) -> Self {
        self.flip_value_sign = flip;
        self
    }
}
