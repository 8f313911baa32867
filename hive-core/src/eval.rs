//! Position evaluation

use serde::{Deserialize, Serialize};

use crate::board::{Board, GameResult};
use crate::pieces::{Color, PieceKind, KIND_COUNT};

/// Score of a won position (effectively infinite, far above any heuristic)
pub const WIN_SCORE: i64 = 1 << 40;

/// Heuristic weights for position evaluation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Heuristics {
    /// Penalty per occupied neighbor of a side's own queen
    pub queen_weight: i64,
    /// Multiplier on summed material
    pub material_weight: i64,
    /// Value of each kind on the board (indexed by `PieceKind as usize`)
    pub piece_values: [i64; KIND_COUNT],
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            queen_weight: 100_000,
            material_weight: 1,
            piece_values: std::array::from_fn(|k| PieceKind::ALL[k].spec().value),
        }
    }
}

/// One side's standing: material on the board minus queen crowding
pub fn side_score(board: &Board, color: Color, heuristics: &Heuristics) -> i64 {
    let mut score = 0;
    if let Some(crowd) = board.queen_surrounding(color) {
        score -= heuristics.queen_weight * (crowd as i64 - 1);
    }

    let material: i64 = PieceKind::ALL
        .iter()
        .map(|&k| heuristics.piece_values[k.index()] * board.positions(color, k).len() as i64)
        .sum();

    score + heuristics.material_weight * material
}

/// Heuristic score from `perspective`'s point of view
pub fn evaluate(board: &Board, perspective: Color, heuristics: &Heuristics) -> i64 {
    side_score(board, perspective, heuristics) - side_score(board, perspective.opponent(), heuristics)
}

/// Score of a finished game from `perspective`, preferring faster wins
/// and slower losses. `None` while the game is still going.
pub fn terminal_score(result: GameResult, perspective: Color, ply: u32) -> Option<i64> {
    let win = WIN_SCORE - ply as i64;
    match result {
        GameResult::Ongoing => None,
        GameResult::Draw => Some(0),
        r if r.winner() == Some(perspective) => Some(win),
        _ => Some(-win),
    }
}

/// Whether a score can only have come from a finished game
pub fn is_decisive(score: i64) -> bool {
    score.abs() > WIN_SCORE / 2
}
