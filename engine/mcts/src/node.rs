//! Search tree node.
//!
//! Each node holds a position snapshot reached by one action from its
//! parent, plus the visit statistics the selection score reads.

use chess_core::{GameState, GameStatus};

/// Index into the node arena. Newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

/// A node in the search tree.
#[derive(Debug, Clone)]
pub struct MctsNode<S> {
    /// Parent handle (NONE for the root). Non-owning back-reference, used
    /// only to walk upward; children are owned through the arena.
    pub parent: NodeId,

    /// Action index taken from the parent to reach this node.
    pub action: u16,

    /// Position snapshot at this node.
    pub state: S,

    /// Number of times this node has been visited.
    pub visit_count: u32,

    /// Sum of values backpropagated through this node.
    pub value_sum: f32,

    /// Prior assigned by the parent's expansion step. 1.0 for the root.
    pub prior: f32,

    /// Whether the position is terminal, fixed at construction.
    pub is_terminal: bool,

    /// Leaf value when terminal: -1.0 for a mate against the side to move,
    /// 0.0 for any other termination.
    pub terminal_value: f32,

    /// (action index, child id) pairs, ascending by action index.
    /// Empty until the node is expanded.
    pub children: Vec<(u16, NodeId)>,
}

impl<S: GameState> MctsNode<S> {
    /// Create a root node with prior 1.0 and no parent.
    pub fn new_root(state: S) -> Self {
        let (is_terminal, terminal_value) = terminal_facts(&state);
        Self {
            parent: NodeId::NONE,
            action: 0,
            state,
            visit_count: 0,
            value_sum: 0.0,
            prior: 1.0,
            is_terminal,
            terminal_value,
            children: Vec::new(),
        }
    }

    /// Create a child node holding the post-move position.
    pub fn new_child(parent: NodeId, action: u16, prior: f32, state: S) -> Self {
        let (is_terminal, terminal_value) = terminal_facts(&state);
        Self {
            parent,
            action,
            state,
            visit_count: 0,
            value_sum: 0.0,
            prior,
            is_terminal,
            terminal_value,
            children: Vec::new(),
        }
    }
}

impl<S> MctsNode<S> {
    /// Mean accumulated value, 0.0 when unvisited.
    #[inline]
    pub fn mean_value(&self) -> f32 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.value_sum / self.visit_count as f32
        }
    }

    /// Selection score:
    /// `Q + c_puct * prior * sqrt(parent_visits) / (1 + visits)`.
    ///
    /// Takes the pre-computed sqrt of the parent's visit count so a scan
    /// over siblings pays for it once.
    #[inline]
    pub fn puct_score(&self, parent_visits_sqrt: f32, c_puct: f32) -> f32 {
        let exploration =
            c_puct * self.prior * parent_visits_sqrt / (1.0 + self.visit_count as f32);
        self.mean_value() + exploration
    }

    /// Whether this node has children.
    #[inline]
    pub fn is_expanded(&self) -> bool {
        !self.children.is_empty()
    }

    /// Whether a selection descent stops here.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.is_terminal || !self.is_expanded()
    }
}

/// Terminal flag and leaf value for a freshly snapshotted position.
fn terminal_facts<S: GameState>(state: &S) -> (bool, f32) {
    match state.status() {
        GameStatus::Ongoing => (false, 0.0),
        GameStatus::Checkmate => (true, -1.0),
        GameStatus::Draw => (true, 0.0),
    }
}
