//! Hive MCTS - Monte Carlo Tree Search player
//!
//! This crate provides a UCT player that searches on the live board:
//! - Tree policy (UCT, perspective-aware)
//! - Random rollouts with a heuristic cutoff
//! - Backpropagation and tree reuse between turns

pub mod rollout;
pub mod search;
pub mod tree;

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Context;
use hive_core::{Board, Color, Engine, Heuristics, Move};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use rollout::{Rollout, RolloutPolicy, RolloutResult};
pub use search::{run_search, MoveStatistics, SearchStats};
pub use tree::{MctsNode, MctsTree, NodeId, NodeStats};

/// MCTS configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MctsConfig {
    /// Used when the caller does not pass its own budget
    pub time_budget_ms: u64,
    pub exploration: f32,
    /// Plies per random playout before the heuristic decides
    pub rollout_depth: u32,
    /// Iterations between clock checks
    pub iterations_per_check: u32,
    pub policy: RolloutPolicy,
    /// Keep the chosen line for the next turn
    pub reuse_tree: bool,
    pub seed: u64,
    pub heuristics: Heuristics,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            time_budget_ms: 5_000,
            exploration: 1.41, // sqrt(2)
            rollout_depth: 24,
            iterations_per_check: 16,
            policy: RolloutPolicy::Balanced,
            reuse_tree: true,
            seed: 42,
            heuristics: Heuristics::default(),
        }
    }
}

impl MctsConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading mcts config {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("parsing mcts config {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("writing mcts config {}", path.display()))?;
        Ok(())
    }
}

/// Subtree kept from the previous turn
struct Retained {
    tree: MctsTree,
    /// Hash of the position at the kept root (after our own move)
    hash: u64,
}

/// MCTS player
pub struct MctsPlayer {
    config: MctsConfig,
    rng: ChaCha8Rng,
    retained: Option<Retained>,
}

impl MctsPlayer {
    pub fn new(config: MctsConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self { config, rng, retained: None }
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Search and return the root child to play, plus the searched tree
    pub fn search(&mut self, board: &mut Board, color: Color, budget: Duration) -> (MctsTree, Option<NodeId>) {
        let deadline = Instant::now() + budget;
        let mut tree = self
            .reuse(board, color)
            .unwrap_or_else(|| MctsTree::new(color));
        let reused = tree.total_simulations();

        let stats = run_search(&mut tree, board, &self.config, deadline, &mut self.rng);
        let best = tree.best_child();
        if let Some(id) = best {
            let node = tree.get(id);
            info!(
                "mcts: {} visits {} win rate {:.3} ({} iterations, {} reused, {} nodes)",
                node.incoming_move.map_or_else(|| "pass".to_string(), |m| m.to_string()),
                node.stats.visits,
                node.stats.win_rate(),
                stats.iterations,
                reused,
                stats.tree_size
            );
        }
        (tree, best)
    }

    /// Drop any kept subtree (e.g. when a new game starts)
    pub fn reset(&mut self) {
        self.retained = None;
    }

    /// Find the kept subtree's child matching the opponent's reply.
    ///
    /// Each candidate reply is checked by undoing it, comparing the
    /// position hash with the kept root, and applying it again.
    fn reuse(&mut self, board: &mut Board, color: Color) -> Option<MctsTree> {
        let Retained { tree, hash } = self.retained.take()?;
        if tree.root_color() != color || !tree.get(tree.root()).expanded {
            return None;
        }

        let root = tree.root();
        if board.position_hash() == hash {
            return tree.find_child(root, None).map(|c| tree.retain_subtree(c));
        }

        for &child in &tree.get(root).children {
            let Some(mv) = tree.get(child).incoming_move else {
                continue;
            };
            if !is_last_move(board, mv) {
                continue;
            }
            board.undo(mv);
            let matched = board.position_hash() == hash;
            board.apply(mv);
            if matched {
                debug!("mcts: reusing subtree after {}", mv);
                return Some(tree.retain_subtree(child));
            }
        }
        None
    }
}

/// Whether `mv` could be the move that produced the current board, so
/// that undoing it is safe
fn is_last_move(board: &Board, mv: Move) -> bool {
    let (to, to_layer) = mv.destination();
    let landed = board.top(to).is_some_and(|c| c.layer == to_layer && c.occupant == Some(mv.piece()));
    match mv {
        Move::Place { .. } => landed,
        Move::Relocate { from, from_layer, .. } => {
            landed
                && from.is_valid()
                && board.cell(from, from_layer).is_empty()
                && (from_layer == 0 || board.is_occupied(from))
        }
    }
}

impl Engine for MctsPlayer {
    fn name(&self) -> &str {
        "mcts"
    }

    fn choose_move(&mut self, board: &mut Board, color: Color, budget: Duration) -> Option<Move> {
        let (tree, best) = self.search(board, color, budget);
        let best = best?;
        let mv = tree.get(best).incoming_move;

        if self.config.reuse_tree {
            let hash = match mv {
                Some(mv) => {
                    board.apply(mv);
                    let hash = board.position_hash();
                    board.undo(mv);
                    hash
                }
                None => board.position_hash(),
            };
            self.retained = Some(Retained { tree: tree.retain_subtree(best), hash });
        }
        mv
    }
}
