//! MCTS Search Loop
//!
//! Implements the core MCTS algorithm on the live board:
//! 1. Selection - Use UCT to descend, applying each edge's move
//! 2. Expansion - Create one child per legal move
//! 3. Simulation - Random playout judged for the root color
//! 4. Backpropagation - Update statistics, then undo the path
//!
//! ## Architecture
//! - Level 2: Search loop coordination
//! - Level 3: Individual MCTS phases

use std::time::{Duration, Instant};

use hive_core::{generate_moves, Board, Move};
use rand::prelude::*;
use tracing::debug;

use crate::rollout::Rollout;
use crate::tree::{MctsTree, NodeId};
use crate::MctsConfig;

// ============================================================================
// SEARCH RESULT
// ============================================================================

/// Statistics for a single move at root
#[derive(Clone, Debug)]
pub struct MoveStatistics {
    /// `None` for a pass
    pub mv: Option<Move>,
    pub visits: u32,
    pub win_rate: f32,
}

/// Summary of one search call
#[derive(Clone, Debug)]
pub struct SearchStats {
    pub iterations: u32,
    pub tree_size: usize,
    pub elapsed: Duration,
    pub move_stats: Vec<MoveStatistics>,
}

impl SearchStats {
    /// Root moves sorted by visits
    pub fn moves_by_visits(&self) -> Vec<(Option<Move>, u32)> {
        let mut moves: Vec<_> = self.move_stats.iter().map(|s| (s.mv, s.visits)).collect();
        moves.sort_by(|a, b| b.1.cmp(&a.1));
        moves
    }
}

// ============================================================================
// SEARCH LOOP (Level 2 - Main Coordination)
// ============================================================================

/// Run UCT iterations on `tree` until `deadline`. The clock is checked
/// after every batch of `iterations_per_check`, so at least one batch
/// always runs. `board` must hold the root position and is left unchanged.
pub fn run_search<R: Rng>(
    tree: &mut MctsTree,
    board: &mut Board,
    config: &MctsConfig,
    deadline: Instant,
    rng: &mut R,
) -> SearchStats {
    let start = Instant::now();
    let rollout = Rollout {
        max_depth: config.rollout_depth,
        policy: config.policy,
        heuristics: &config.heuristics,
    };
    let batch = config.iterations_per_check.max(1);
    let mut iterations = 0;

    loop {
        for _ in 0..batch {
            run_single_iteration(tree, board, config.exploration, &rollout, rng);
        }
        iterations += batch;
        if Instant::now() >= deadline {
            break;
        }
    }

    let stats = SearchStats {
        iterations,
        tree_size: tree.len(),
        elapsed: start.elapsed(),
        move_stats: collect_move_statistics(tree),
    };
    debug!(
        "mcts: {} iterations, {} nodes, root visits {} in {:?}",
        stats.iterations,
        stats.tree_size,
        tree.total_simulations(),
        stats.elapsed
    );
    stats
}

// ============================================================================
// ITERATION (Level 3 - MCTS Phases)
// ============================================================================

/// One complete MCTS cycle. Every move applied on the way down is undone
/// in reverse order before returning.
fn run_single_iteration<R: Rng>(
    tree: &mut MctsTree,
    board: &mut Board,
    exploration: f32,
    rollout: &Rollout<'_>,
    rng: &mut R,
) {
    let mut path: Vec<Move> = Vec::new();
    let mut node = tree.root();

    // Phase 1: Selection
    while tree.get(node).expanded && !board.result().is_over() {
        let Some(child) = tree.select_child(node, exploration) else {
            break;
        };
        descend(tree, board, child, &mut path);
        node = child;
    }

    // Phase 2: Expansion
    if !tree.get(node).expanded && !board.result().is_over() {
        let mut moves = generate_moves(board, tree.get(node).to_move);
        moves.shuffle(rng);
        tree.expand(node, moves);

        let first = tree.get(node).children[0];
        descend(tree, board, first, &mut path);
        node = first;
    }

    // Phase 3: Simulation
    let outcome = rollout.simulate(board, tree.get(node).to_move, tree.root_color(), rng);

    // Phase 4: Backpropagation
    tree.backpropagate(node, outcome.win);

    for mv in path.into_iter().rev() {
        board.undo(mv);
    }
}

fn descend(tree: &MctsTree, board: &mut Board, child: NodeId, path: &mut Vec<Move>) {
    if let Some(mv) = tree.get(child).incoming_move {
        board.apply(mv);
        path.push(mv);
    }
}

fn collect_move_statistics(tree: &MctsTree) -> Vec<MoveStatistics> {
    tree.move_statistics()
        .into_iter()
        .map(|(mv, visits, win_rate)| MoveStatistics { mv, visits, win_rate })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use hive_core::{Color, Game, Hex, Piece, PieceKind};
    use rand_chacha::ChaCha8Rng;

    fn config() -> MctsConfig {
        MctsConfig { iterations_per_check: 8, rollout_depth: 12, ..MctsConfig::default() }
    }

    #[test]
    fn test_search_restores_board() {
        let mut board = Game::with_opening(true).board().clone();
        let before = board.clone();
        let mut tree = MctsTree::new(Color::White);
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let stats = run_search(&mut tree, &mut board, &config(), Instant::now(), &mut rng);
        assert_eq!(board, before);
        assert_eq!(stats.iterations, 8);
        assert_eq!(tree.total_simulations(), 8);
        assert!(tree.get(tree.root()).expanded);
    }

    #[test]
    fn test_root_visits_equal_child_visits() {
        let mut board = Game::with_opening(true).board().clone();
        let mut tree = MctsTree::new(Color::White);
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        let stats = run_search(&mut tree, &mut board, &config(), Instant::now(), &mut rng);
        let child_visits: u32 = stats.move_stats.iter().map(|s| s.visits).sum();
        assert_eq!(child_visits, tree.total_simulations());
        let sorted = stats.moves_by_visits();
        assert!(sorted.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn test_immediate_win_has_perfect_record() {
        // Black queen with five white neighbors; the white ant can slide
        // into the last gap
        let mut board = Board::new();
        let bq = Hex::new(10, 10);
        board.spawn(bq, Piece::new(Color::Black, PieceKind::Queen), 0);
        let ring = bq.neighbors();
        let kinds = [PieceKind::Queen, PieceKind::Spider, PieceKind::Spider, PieceKind::Grasshopper, PieceKind::Grasshopper];
        for (&hex, kind) in ring[..5].iter().zip(kinds) {
            board.spawn(hex, Piece::new(Color::White, kind), 0);
        }
        let ant_at = ring[4].neighbor(3);
        board.spawn(ant_at, Piece::new(Color::White, PieceKind::Ant), 0);
        let winning = Move::Relocate {
            piece: Piece::new(Color::White, PieceKind::Ant),
            from: ant_at,
            from_layer: 0,
            to: ring[5],
            to_layer: 0,
        };

        let mut tree = MctsTree::new(Color::White);
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let deadline = Instant::now() + Duration::from_millis(200);
        run_search(&mut tree, &mut board, &config(), deadline, &mut rng);

        let child = tree.find_child(tree.root(), Some(winning)).expect("winning slide is generated");
        let stats = &tree.get(child).stats;
        assert!(stats.visits > 0);
        assert_eq!(stats.win_rate(), 1.0);
        assert!(!tree.get(child).expanded);
    }
}
