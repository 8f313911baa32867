//! Move representation, apply/undo, and full move generation

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::hex::Hex;
use crate::pieces::{Color, Piece, PieceKind};
use crate::rules::{valid_moves, valid_spawns};

/// A single ply
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    /// Bring a piece in from the reserve (always ground layer)
    Place { piece: Piece, to: Hex },
    /// Move a piece already on the board
    Relocate {
        piece: Piece,
        from: Hex,
        from_layer: u8,
        to: Hex,
        to_layer: u8,
    },
}

impl Move {
    pub fn piece(&self) -> Piece {
        match *self {
            Move::Place { piece, .. } | Move::Relocate { piece, .. } => piece,
        }
    }

    pub fn color(&self) -> Color {
        self.piece().color
    }

    /// Landing column and layer
    pub fn destination(&self) -> (Hex, u8) {
        match *self {
            Move::Place { to, .. } => (to, 0),
            Move::Relocate { to, to_layer, .. } => (to, to_layer),
        }
    }

    pub fn is_placement(&self) -> bool {
        matches!(self, Move::Place { .. })
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Move::Place { piece, to } => write!(f, "{}@{}", piece, to),
            Move::Relocate { piece, from, from_layer, to, to_layer } => {
                write!(f, "{} {}/{}->{}/{}", piece, from, from_layer, to, to_layer)
            }
        }
    }
}

/// A move annotated with the score search gave it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoredMove {
    pub mv: Move,
    pub score: i64,
}

impl ScoredMove {
    pub fn new(mv: Move) -> Self {
        Self { mv, score: 0 }
    }
}

impl Board {
    /// Play a move produced by the generators. No legality checks.
    pub fn apply(&mut self, mv: Move) {
        match mv {
            Move::Place { piece, to } => self.spawn(to, piece, 0),
            Move::Relocate { piece, from, from_layer, to, to_layer } => {
                self.destroy(from, from_layer);
                self.spawn(to, piece, to_layer);
            }
        }
    }

    /// Exact inverse of [`Board::apply`]
    pub fn undo(&mut self, mv: Move) {
        match mv {
            Move::Place { to, .. } => {
                self.destroy(to, 0);
            }
            Move::Relocate { piece, from, from_layer, to, to_layer } => {
                self.destroy(to, to_layer);
                self.spawn(from, piece, from_layer);
            }
        }
    }
}

// ============================================================================
// GENERATION
// ============================================================================

/// Every placement available to `color`, honouring the queen deadline
pub fn generate_placements(board: &Board, color: Color) -> Vec<Move> {
    if board.total_pieces_left(color) == 0 {
        return Vec::new();
    }
    let queen_due = !board.queen_placed(color) && board.placed_count(color) >= 3;
    let kinds: Vec<PieceKind> = PieceKind::ALL
        .into_iter()
        .filter(|&k| board.pieces_left(color, k) > 0)
        .filter(|&k| !queen_due || k == PieceKind::Queen)
        .collect();
    if kinds.is_empty() {
        return Vec::new();
    }

    let spawns = valid_spawns(board, color);
    let mut moves = Vec::with_capacity(kinds.len() * spawns.len());
    for kind in kinds {
        for cell in &spawns {
            moves.push(Move::Place { piece: Piece::new(color, kind), to: cell.hex });
        }
    }
    moves
}

/// Every relocation available to `color`
pub fn generate_relocations(board: &mut Board, color: Color) -> Vec<Move> {
    if !board.queen_placed(color) {
        return Vec::new();
    }
    let sources: Vec<_> = board.cells_of(color).copied().collect();

    let mut moves = Vec::new();
    for source in sources {
        let Some(piece) = source.occupant else { continue };
        for dest in valid_moves(board, source) {
            moves.push(Move::Relocate {
                piece,
                from: source.hex,
                from_layer: source.layer,
                to: dest.hex,
                to_layer: dest.layer,
            });
        }
    }
    moves
}

/// Placements followed by relocations. Empty means `color` must pass.
pub fn generate_moves(board: &mut Board, color: Color) -> Vec<Move> {
    let mut moves = generate_placements(board, color);
    moves.extend(generate_relocations(board, color));
    moves
}

/// Leaf count of the legal move tree, stopping at finished games.
/// A side with no moves passes.
pub fn perft(board: &mut Board, color: Color, depth: u32) -> u64 {
    if depth == 0 || board.result().is_over() {
        return 1;
    }
    let moves = generate_moves(board, color);
    if moves.is_empty() {
        return perft(board, color.opponent(), depth - 1);
    }

    let mut total = 0;
    for mv in moves {
        board.apply(mv);
        total += perft(board, color.opponent(), depth - 1);
        board.undo(mv);
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::opening_hex;

    fn opened() -> Board {
        let mut board = Board::new();
        board.apply(Move::Place {
            piece: Piece::new(Color::Black, PieceKind::Spider),
            to: opening_hex(Color::Black),
        });
        board.apply(Move::Place {
            piece: Piece::new(Color::White, PieceKind::Ant),
            to: opening_hex(Color::White),
        });
        board
    }

    #[test]
    fn test_first_placements() {
        let mut board = Board::new();
        let moves = generate_moves(&mut board, Color::Black);
        assert_eq!(moves.len(), PieceKind::ALL.len());
        assert!(moves.iter().all(|m| m.destination() == (opening_hex(Color::Black), 0)));
    }

    #[test]
    fn test_no_relocations_without_queen() {
        let mut board = opened();
        assert!(generate_relocations(&mut board, Color::Black).is_empty());
        assert!(!generate_placements(&board, Color::Black).is_empty());
    }

    #[test]
    fn test_queen_deadline() {
        let mut board = opened();
        let black = [(15, 13), (14, 13)];
        for (x, y) in black {
            board.apply(Move::Place { piece: Piece::new(Color::Black, PieceKind::Ant), to: Hex::new(x, y) });
        }
        assert_eq!(board.placed_count(Color::Black), 3);

        let moves = generate_placements(&board, Color::Black);
        assert!(!moves.is_empty());
        assert!(moves.iter().all(|m| m.piece().kind == PieceKind::Queen));
    }

    #[test]
    fn test_apply_undo_roundtrip() {
        let mut board = opened();
        board.apply(Move::Place { piece: Piece::new(Color::Black, PieceKind::Queen), to: Hex::new(15, 13) });
        board.apply(Move::Place { piece: Piece::new(Color::White, PieceKind::Queen), to: Hex::new(15, 16) });
        let before = board.clone();

        for color in Color::ALL {
            for mv in generate_moves(&mut board, color) {
                board.apply(mv);
                board.undo(mv);
                assert_eq!(board, before, "{} did not round-trip", mv);
            }
        }
    }

    #[test]
    fn test_perft_small_depths() {
        let mut board = Board::new();
        assert_eq!(perft(&mut board, Color::Black, 0), 1);
        assert_eq!(perft(&mut board, Color::Black, 1), 5);
        // White's only cell is its opening cell
        assert_eq!(perft(&mut board, Color::Black, 2), 25);
        assert!(board.is_empty());
    }

    #[test]
    fn test_display() {
        let place = Move::Place { piece: Piece::new(Color::White, PieceKind::Queen), to: Hex::new(15, 16) };
        assert_eq!(place.to_string(), "wQ@15,16");
        let relocate = Move::Relocate {
            piece: Piece::new(Color::Black, PieceKind::Beetle),
            from: Hex::new(3, 4),
            from_layer: 0,
            to: Hex::new(3, 5),
            to_layer: 1,
        };
        assert_eq!(relocate.to_string(), "bB 3,4/0->3,5/1");
    }
}
