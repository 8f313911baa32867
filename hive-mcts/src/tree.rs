//! MCTS Tree structure and node management
//!
//! Uses arena allocation for efficient tree operations. Nodes hold no board
//! state: the search replays `incoming_move`s from the root onto the one
//! live board.
//!
//! ## Architecture
//! - Level 2: Tree operations (expand, backpropagate, retain_subtree)
//! - Level 3: UCT calculation, node accessors
//! - Level 4: Statistics, utilities

use std::collections::VecDeque;

use hive_core::{Color, Move};

// ============================================================================
// TYPES
// ============================================================================

/// Node identifier (index into arena)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

/// Statistics for a tree node
#[derive(Clone, Debug, Default)]
pub struct NodeStats {
    /// Number of times this node was visited
    pub visits: u32,
    /// Total wins, always from the root color's perspective
    pub wins: f32,
}

impl NodeStats {
    /// Win rate for the root color
    pub fn win_rate(&self) -> f32 {
        if self.visits == 0 {
            0.5 // Prior for unexplored nodes
        } else {
            self.wins / self.visits as f32
        }
    }
}

/// A node in the MCTS tree
#[derive(Clone, Debug)]
pub struct MctsNode {
    /// Parent node (None for root)
    pub parent: Option<NodeId>,
    /// Move that led to this node. None for the root and for a pass.
    pub incoming_move: Option<Move>,
    /// Side to move at this node
    pub to_move: Color,
    pub children: Vec<NodeId>,
    /// Children have been generated
    pub expanded: bool,
    pub stats: NodeStats,
}

impl MctsNode {
    pub fn new(parent: Option<NodeId>, incoming_move: Option<Move>, to_move: Color) -> Self {
        Self {
            parent,
            incoming_move,
            to_move,
            children: Vec::new(),
            expanded: false,
            stats: NodeStats::default(),
        }
    }
}

// ============================================================================
// MCTS TREE (Level 2 - Tree Operations)
// ============================================================================

/// MCTS search tree with arena allocation
#[derive(Clone, Debug)]
pub struct MctsTree {
    nodes: Vec<MctsNode>,
    /// Color whose wins the statistics count
    root_color: Color,
}

impl MctsTree {
    /// Fresh tree for `root_color` to move
    pub fn new(root_color: Color) -> Self {
        Self {
            nodes: vec![MctsNode::new(None, None, root_color)],
            root_color,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn root_color(&self) -> Color {
        self.root_color
    }

    pub fn get(&self, id: NodeId) -> &MctsNode {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ========================================================================
    // Level 2: Tree Operations
    // ========================================================================

    /// Give `node_id` one child per move, in the order given. With no
    /// moves the side passes and a single move-less child is created.
    pub fn expand(&mut self, node_id: NodeId, moves: Vec<Move>) {
        let node = self.get(node_id);
        assert!(!node.expanded, "node {:?} expanded twice", node_id);
        let next = node.to_move.opponent();

        let incoming: Vec<Option<Move>> = if moves.is_empty() {
            vec![None]
        } else {
            moves.into_iter().map(Some).collect()
        };

        let mut children = Vec::with_capacity(incoming.len());
        for mv in incoming {
            let child_id = NodeId(self.nodes.len());
            self.nodes.push(MctsNode::new(Some(node_id), mv, next));
            children.push(child_id);
        }

        let node = self.get_mut(node_id);
        node.children = children;
        node.expanded = true;
    }

    /// Record one simulation outcome on `leaf_id` and every ancestor
    pub fn backpropagate(&mut self, leaf_id: NodeId, win: bool) {
        let reward = if win { 1.0 } else { 0.0 };
        let mut current = Some(leaf_id);

        while let Some(node_id) = current {
            let node = self.get_mut(node_id);
            node.stats.visits += 1;
            node.stats.wins += reward;
            current = node.parent;
        }
    }

    /// Child of `node_id` reached by `mv` (`None` finds the pass child)
    pub fn find_child(&self, node_id: NodeId, mv: Option<Move>) -> Option<NodeId> {
        self.get(node_id)
            .children
            .iter()
            .copied()
            .find(|&c| self.get(c).incoming_move == mv)
    }

    /// New tree holding only the subtree under `new_root`, which becomes
    /// the root. Everything else is dropped.
    pub fn retain_subtree(&self, new_root: NodeId) -> MctsTree {
        let mut nodes = Vec::new();
        let mut queue: VecDeque<(NodeId, Option<NodeId>)> = VecDeque::from([(new_root, None)]);

        while let Some((old_id, parent)) = queue.pop_front() {
            let old = self.get(old_id);
            let new_id = NodeId(nodes.len());
            let mut node = old.clone();
            node.parent = parent;
            node.children = Vec::with_capacity(old.children.len());
            if parent.is_none() {
                node.incoming_move = None;
            }
            nodes.push(node);

            if let Some(NodeId(p)) = parent {
                nodes[p].children.push(new_id);
            }
            for &child in &old.children {
                queue.push_back((child, Some(new_id)));
            }
        }

        MctsTree { nodes, root_color: self.root_color }
    }

    // ========================================================================
    // Level 3: Selection Helpers
    // ========================================================================

    /// Child with the highest UCT value; the first one wins ties
    pub fn select_child(&self, node_id: NodeId, exploration: f32) -> Option<NodeId> {
        let node = self.get(node_id);
        let parent_visits = node.stats.visits;
        let mut best: Option<(NodeId, f32)> = None;

        for &child in &node.children {
            let value = self.uct(child, node.to_move, parent_visits, exploration);
            if best.map_or(true, |(_, v)| value > v) {
                best = Some((child, value));
            }
        }

        best.map(|(id, _)| id)
    }

    /// UCT value of a child as seen by `chooser`, the side moving at its
    /// parent
    ///
    /// UCT = win_rate + C * sqrt(ln(parent_visits) / visits)
    fn uct(&self, node_id: NodeId, chooser: Color, parent_visits: u32, exploration: f32) -> f32 {
        let stats = &self.get(node_id).stats;
        if stats.visits == 0 {
            return f32::INFINITY; // Prioritize unexplored nodes
        }

        let exploitation = if chooser == self.root_color {
            stats.win_rate()
        } else {
            1.0 - stats.win_rate()
        };
        let exploration_term = exploration * ((parent_visits.max(1) as f32).ln() / stats.visits as f32).sqrt();

        exploitation + exploration_term
    }

    // ========================================================================
    // Level 3: Best Move Selection
    // ========================================================================

    /// Most visited root child, ties broken by win rate then child order
    pub fn best_child(&self) -> Option<NodeId> {
        let mut best: Option<NodeId> = None;
        for &child in &self.get(self.root()).children {
            let better = match best {
                None => true,
                Some(b) => {
                    let (cs, bs) = (&self.get(child).stats, &self.get(b).stats);
                    cs.visits > bs.visits || (cs.visits == bs.visits && cs.win_rate() > bs.win_rate())
                }
            };
            if better {
                best = Some(child);
            }
        }
        best
    }

    /// Root moves with visit counts and win rates (for analysis)
    pub fn move_statistics(&self) -> Vec<(Option<Move>, u32, f32)> {
        self.get(self.root())
            .children
            .iter()
            .map(|&id| {
                let node = self.get(id);
                (node.incoming_move, node.stats.visits, node.stats.win_rate())
            })
            .collect()
    }

    /// Total simulations run (root visits)
    pub fn total_simulations(&self) -> u32 {
        self.get(self.root()).stats.visits
    }
}

// ============================================================================
// TESTS
// ============================================================================
