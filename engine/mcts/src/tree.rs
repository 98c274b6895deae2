//! Arena-backed search tree.
//!
//! Nodes live in a contiguous `Vec` and refer to each other through
//! `NodeId` handles: children are owned through the arena, the parent link
//! is a plain back-reference, and dropping the tree tears everything down
//! in one pass. A tree exists only for the duration of one search call.

use chess_core::GameState;

use crate::node::{MctsNode, NodeId};
use crate::MASS_EPSILON;

/// Search tree with arena-based node storage.
#[derive(Debug)]
pub struct MctsTree<S> {
    /// Arena storing all nodes.
    nodes: Vec<MctsNode<S>>,

    /// Root node index (always 0 after initialization).
    root: NodeId,
}

impl<S: GameState> MctsTree<S> {
    /// Create a tree rooted at the given position.
    pub fn new(root_state: S) -> Self {
        Self {
            nodes: vec![MctsNode::new_root(root_state)],
            root: NodeId(0),
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &MctsNode<S> {
        &self.nodes[id.0 as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode<S> {
        &mut self.nodes[id.0 as usize]
    }

    /// Total number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn allocate(&mut self, node: MctsNode<S>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Best child of `node_id` by selection score.
    ///
    /// Scans children in ascending action-index order and keeps the first
    /// strict maximum, so ties resolve to the lowest action index rather
    /// than at random. Returns `None` for a childless node.
    pub fn select_child(&self, node_id: NodeId, c_puct: f32) -> Option<NodeId> {
        let node = self.get(node_id);
        let parent_visits_sqrt = (node.visit_count as f32).sqrt();

        let mut best = None;
        let mut best_score = f32::NEG_INFINITY;
        for &(_, child_id) in &node.children {
            let score = self.get(child_id).puct_score(parent_visits_sqrt, c_puct);
            if score > best_score {
                best_score = score;
                best = Some(child_id);
            }
        }
        best
    }

    /// Attach a child holding the post-move position, keeping the parent's
    /// child list sorted by action index. Returns the child's id; an
    /// already-occupied action slot keeps its existing child.
    pub fn add_child(&mut self, parent_id: NodeId, action: u16, prior: f32, state: S) -> NodeId {
        match self
            .get(parent_id)
            .children
            .binary_search_by_key(&action, |&(a, _)| a)
        {
            Ok(pos) => self.get(parent_id).children[pos].1,
            Err(pos) => {
                let child_id = self.allocate(MctsNode::new_child(parent_id, action, prior, state));
                self.get_mut(parent_id).children.insert(pos, (action, child_id));
                child_id
            }
        }
    }

    /// Add `value` to every node from `leaf_id` up to the root, bumping
    /// visit counts. With `flip_value_sign` the value is negated at each
    /// step up (alternating-perspective convention); without it the same
    /// value lands on every level.
    pub fn backpropagate(&mut self, leaf_id: NodeId, value: f32, flip_value_sign: bool) {
        let mut current = leaf_id;
        let mut backed_up = value;

        while current.is_some() {
            let node = self.get_mut(current);
            node.visit_count += 1;
            node.value_sum += backed_up;

            if flip_value_sign {
                backed_up = -backed_up;
            }
            current = node.parent;
        }
    }

    /// Most visited root action, with its visit count.
    pub fn best_action(&self) -> Option<(u16, u32)> {
        let root = self.get(self.root);
        root.children
            .iter()
            .map(|&(action, id)| (action, self.get(id).visit_count))
            .max_by_key(|&(_, visits)| visits)
    }

    /// Root visit counts over the action space, normalized to a probability
    /// distribution. All-zero when the root has no children (terminal root).
    pub fn visit_distribution(&self, num_actions: usize) -> Vec<f32> {
        let root = self.get(self.root);
        let mut distribution = vec![0.0; num_actions];

        for &(action, id) in &root.children {
            distribution[action as usize] = self.get(id).visit_count as f32;
        }

        let total: f32 = distribution.iter().sum();
        if total > MASS_EPSILON {
            for slot in &mut distribution {
                *slot /= total;
            }
        }
        distribution
    }

    /// Summary statistics for logging and debugging.
    pub fn stats(&self) -> TreeStats {
        let root = self.get(self.root);
        TreeStats {
            total_nodes: self.nodes.len(),
            root_visits: root.visit_count,
            root_value: root.mean_value(),
            max_depth: self.compute_max_depth(self.root, 0),
        }
    }

    fn compute_max_depth(&self, node_id: NodeId, current_depth: u32) -> u32 {
        let node = self.get(node_id);
        node.children
            .iter()
            .map(|&(_, id)| self.compute_max_depth(id, current_depth + 1))
            .max()
            .unwrap_or(current_depth)
    }
}

/// Statistics about a search tree.
#[derive(Debug, Clone)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub root_visits: u32,
    pub root_value: f32,
    pub max_depth: u32,
}
