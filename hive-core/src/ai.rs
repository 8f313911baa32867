//! Time-bounded minimax player
//!
//! Iterative deepening over alpha-beta minimax, scored from the engine's
//! own perspective. Each iteration gets a fresh transposition table keyed
//! by position, depth, and side to move, and only stores exact results.

use std::time::{Duration, Instant};

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use crate::board::Board;
use crate::config::SearchConfig;
use crate::eval::{evaluate, is_decisive, terminal_score, Heuristics};
use crate::game::Engine;
use crate::moves::{generate_moves, Move, ScoredMove};
use crate::pieces::Color;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Search window bound, above any reachable score
const INFINITY: i64 = i64::MAX / 4;

// ============================================================================
// MINIMAX AI
// ============================================================================

/// Summary of one `search` call
#[derive(Clone, Debug, PartialEq)]
pub struct SearchReport {
    pub best: Option<Move>,
    pub score: i64,
    /// Deepest fully completed iteration (0 if none completed)
    pub depth_reached: u32,
    pub nodes: u64,
    pub tt_hits: u64,
    pub elapsed: Duration,
}

/// Minimax player
pub struct MinimaxAI {
    pub config: SearchConfig,
    rng: ChaCha8Rng,
}

impl MinimaxAI {
    pub fn new(config: SearchConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self { config, rng }
    }

    /// Search for `color` until `budget` runs out or `max_depth` completes.
    /// `board` is left unchanged.
    pub fn search(&mut self, board: &mut Board, color: Color, budget: Duration) -> SearchReport {
        let start = Instant::now();
        let mut session = SearchSession {
            ai_color: color,
            deadline: start + budget,
            heuristics: &self.config.heuristics,
            table: FxHashMap::default(),
            rng: &mut self.rng,
            nodes: 0,
            tt_hits: 0,
        };

        let mut root = session.ordered_moves(board, color);
        let mut report = SearchReport {
            best: root.first().map(|p| p.mv),
            score: 0,
            depth_reached: 0,
            nodes: 0,
            tt_hits: 0,
            elapsed: Duration::ZERO,
        };

        if root.len() > 1 {
            for max_depth in 1..=self.config.max_depth.max(1) {
                session.table.clear();
                let Some(line) = session.minimax(board, &mut root, color, 0, max_depth, -INFINITY, INFINITY) else {
                    debug!("depth {} abandoned at deadline", max_depth);
                    break;
                };

                report.best = line.best;
                report.score = line.score;
                report.depth_reached = max_depth;
                debug!(
                    "depth {}: {} score {} ({} nodes)",
                    max_depth,
                    line.best.map_or_else(|| "-".to_string(), |m| m.to_string()),
                    line.score,
                    session.nodes
                );

                // Best-first for the next iteration; ties keep shuffled order
                root.sort_by(|a, b| b.score.cmp(&a.score));
                if is_decisive(line.score) {
                    break;
                }
            }
        }

        report.nodes = session.nodes;
        report.tt_hits = session.tt_hits;
        report.elapsed = start.elapsed();
        info!(
            "minimax: depth {} score {} nodes {} tt_hits {} in {:?}",
            report.depth_reached, report.score, report.nodes, report.tt_hits, report.elapsed
        );
        report
    }
}

impl Engine for MinimaxAI {
    fn name(&self) -> &str {
        "minimax"
    }

    fn choose_move(&mut self, board: &mut Board, color: Color, budget: Duration) -> Option<Move> {
        self.search(board, color, budget).best
    }
}

// ============================================================================
// SEARCH
// ============================================================================

/// Value of a searched node
#[derive(Clone, Copy, Debug)]
struct Line {
    best: Option<Move>,
    score: i64,
}

/// State shared by every node of one `search` call
struct SearchSession<'a> {
    ai_color: Color,
    deadline: Instant,
    heuristics: &'a Heuristics,
    table: FxHashMap<u64, Line>,
    rng: &'a mut ChaCha8Rng,
    nodes: u64,
    tt_hits: u64,
}

impl SearchSession<'_> {
    /// Legal moves for `color` in random order
    fn ordered_moves(&mut self, board: &mut Board, color: Color) -> Vec<ScoredMove> {
        let mut moves: Vec<ScoredMove> = generate_moves(board, color).into_iter().map(ScoredMove::new).collect();
        moves.shuffle(&mut *self.rng);
        moves
    }

    fn leaf_score(&self, board: &Board, ply: u32) -> i64 {
        terminal_score(board.result(), self.ai_color, ply).unwrap_or_else(|| evaluate(board, self.ai_color, self.heuristics))
    }

    /// Alpha-beta over `moves` for `color` at `depth`. Every applied move
    /// is undone before returning. `None` means the deadline passed and
    /// the node's value is unknown.
    #[allow(clippy::too_many_arguments)]
    fn minimax(
        &mut self,
        board: &mut Board,
        moves: &mut [ScoredMove],
        color: Color,
        depth: u32,
        max_depth: u32,
        mut alpha: i64,
        mut beta: i64,
    ) -> Option<Line> {
        debug_assert!(depth <= max_depth, "search depth {} past limit {}", depth, max_depth);
        if Instant::now() >= self.deadline {
            return None;
        }
        self.nodes += 1;

        let key = board.hash_at_depth(depth * 2 + color.index() as u32);
        if let Some(&line) = self.table.get(&key) {
            self.tt_hits += 1;
            return Some(line);
        }
        if let Some(score) = terminal_score(board.result(), self.ai_color, depth) {
            return Some(Line { best: None, score });
        }

        if moves.is_empty() {
            // Pass
            let score = if depth == max_depth {
                self.leaf_score(board, depth)
            } else {
                let mut replies = self.ordered_moves(board, color.opponent());
                if replies.is_empty() {
                    self.leaf_score(board, depth)
                } else {
                    self.minimax(board, &mut replies, color.opponent(), depth + 1, max_depth, alpha, beta)?
                        .score
                }
            };
            return Some(Line { best: None, score });
        }

        let maximizing = color == self.ai_color;
        let (alpha_in, beta_in) = (alpha, beta);
        let mut best = Line { best: None, score: if maximizing { -INFINITY } else { INFINITY } };

        for play in moves.iter_mut() {
            board.apply(play.mv);
            let outcome = if depth == max_depth {
                Some(self.leaf_score(board, depth + 1))
            } else {
                let mut replies = self.ordered_moves(board, color.opponent());
                self.minimax(board, &mut replies, color.opponent(), depth + 1, max_depth, alpha, beta)
                    .map(|line| line.score)
            };
            board.undo(play.mv);
            let score = outcome?;
            play.score = score;

            let improves = if maximizing { score > best.score } else { score < best.score };
            if improves || best.best.is_none() {
                best = Line { best: Some(play.mv), score };
            }
            if maximizing {
                alpha = alpha.max(best.score);
            } else {
                beta = beta.min(best.score);
            }
            if beta <= alpha {
                return Some(best);
            }
        }

        if best.score > alpha_in && best.score < beta_in {
            self.table.insert(key, best);
        }
        Some(best)
    }
}
