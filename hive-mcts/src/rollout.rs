//! Rollout (simulation) for MCTS
//!
//! A rollout plays random legal moves on the live board, judges the
//! outcome for one color, then undoes every move in reverse order.
//!
//! ## Architecture
//! - Level 2: Bounded playout
//! - Level 3: Random move selection

use hive_core::{evaluate, generate_moves, generate_placements, generate_relocations, Board, Color, GameResult, Heuristics, Move};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

// ============================================================================
// POLICY
// ============================================================================

/// How a rollout picks its moves
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RolloutPolicy {
    /// Coin flip between placing and relocating, then uniform within the group
    Balanced,
    /// Uniform over every legal move
    Uniform,
}

// ============================================================================
// ROLLOUT RESULT
// ============================================================================

/// Result of a rollout simulation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RolloutResult {
    /// Whether the perspective color came out ahead
    pub win: bool,
    /// Finished game, or `Ongoing` when the depth cap was hit
    pub result: GameResult,
    /// Number of moves played
    pub moves_played: u32,
}

// ============================================================================
// ROLLOUT (Level 2 - Bounded Playout)
// ============================================================================

/// Rollout settings shared by every simulation of one search
pub struct Rollout<'a> {
    pub max_depth: u32,
    pub policy: RolloutPolicy,
    pub heuristics: &'a Heuristics,
}

impl Rollout<'_> {
    /// Play from the current position with `to_move` to move, judging the
    /// result for `perspective`. An unfinished game is judged by the sign
    /// of the heuristic. The board is restored before returning.
    pub fn simulate<R: Rng>(&self, board: &mut Board, to_move: Color, perspective: Color, rng: &mut R) -> RolloutResult {
        let mut played: Vec<Move> = Vec::with_capacity(self.max_depth as usize);
        let mut color = to_move;
        let mut passes = 0;

        for _ in 0..self.max_depth {
            if board.result().is_over() || passes >= 2 {
                break;
            }
            match select_move(board, color, self.policy, rng) {
                Some(mv) => {
                    board.apply(mv);
                    played.push(mv);
                    passes = 0;
                }
                None => passes += 1,
            }
            color = color.opponent();
        }

        let result = board.result();
        let win = match result {
            GameResult::Ongoing => evaluate(board, perspective, self.heuristics) > 0,
            finished => finished.winner() == Some(perspective),
        };

        let moves_played = played.len() as u32;
        for mv in played.into_iter().rev() {
            board.undo(mv);
        }

        RolloutResult { win, result, moves_played }
    }
}

// ============================================================================
// MOVE SELECTION (Level 3)
// ============================================================================

/// Random legal move for `color`, or `None` if it must pass
pub fn select_move<R: Rng>(board: &mut Board, color: Color, policy: RolloutPolicy, rng: &mut R) -> Option<Move> {
    match policy {
        RolloutPolicy::Uniform => generate_moves(board, color).choose(rng).copied(),
        RolloutPolicy::Balanced => {
            let placements = generate_placements(board, color);
            let relocations = generate_relocations(board, color);
            let group = match (placements.is_empty(), relocations.is_empty()) {
                (true, true) => return None,
                (false, true) => placements,
                (true, false) => relocations,
                (false, false) => {
                    if rng.gen_bool(0.5) {
                        placements
                    } else {
                        relocations
                    }
                }
            };
            group.choose(rng).copied()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hive_core::{Game, Hex, Piece, PieceKind};
    use rand_chacha::ChaCha8Rng;

    fn midgame() -> Board {
        let mut board = Game::with_opening(true).board().clone();
        board.apply(Move::Place { piece: Piece::new(Color::White, PieceKind::Queen), to: Hex::new(15, 16) });
        board.apply(Move::Place { piece: Piece::new(Color::Black, PieceKind::Queen), to: Hex::new(15, 13) });
        board
    }

    #[test]
    fn test_rollout_restores_board() {
        let mut board = midgame();
        let before = board.clone();
        let heuristics = Heuristics::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for policy in [RolloutPolicy::Balanced, RolloutPolicy::Uniform] {
            let rollout = Rollout { max_depth: 30, policy, heuristics: &heuristics };
            for _ in 0..20 {
                let outcome = rollout.simulate(&mut board, Color::White, Color::White, &mut rng);
                assert!(outcome.moves_played <= 30);
                assert_eq!(board, before);
            }
        }
    }

    #[test]
    fn test_finished_game_is_judged_without_moves() {
        let mut board = Board::new();
        let queen = Hex::new(10, 10);
        board.spawn(queen, Piece::new(Color::Black, PieceKind::Queen), 0);
        let kinds = [PieceKind::Ant, PieceKind::Ant, PieceKind::Ant, PieceKind::Spider, PieceKind::Spider, PieceKind::Beetle];
        for (n, kind) in queen.neighbors().into_iter().zip(kinds) {
            board.spawn(n, Piece::new(Color::White, kind), 0);
        }

        let heuristics = Heuristics::default();
        let rollout = Rollout { max_depth: 10, policy: RolloutPolicy::Uniform, heuristics: &heuristics };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let outcome = rollout.simulate(&mut board, Color::Black, Color::White, &mut rng);
        assert!(outcome.win);
        assert_eq!(outcome.moves_played, 0);
        assert_eq!(outcome.result, GameResult::WhiteWins);
    }

    #[test]
    fn test_select_move_is_legal() {
        let mut board = midgame();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let legal = generate_moves(&mut board, Color::White);
        for policy in [RolloutPolicy::Balanced, RolloutPolicy::Uniform] {
            for _ in 0..10 {
                let mv = select_move(&mut board, Color::White, policy, &mut rng).unwrap();
                assert!(legal.contains(&mv));
            }
        }
    }

    #[test]
    fn test_balanced_reaches_both_groups() {
        let mut board = midgame();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        assert!(!generate_relocations(&mut board, Color::White).is_empty());

        let picks: Vec<Move> = (0..64)
            .filter_map(|_| select_move(&mut board, Color::White, RolloutPolicy::Balanced, &mut rng))
            .collect();
        assert!(picks.iter().any(|m| m.is_placement()));
        assert!(picks.iter().any(|m| !m.is_placement()));
    }
}
