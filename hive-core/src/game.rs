//! Game facade: turn order, validated human input, and engine turns

use std::time::Duration;

use tracing::{debug, info, trace};

use crate::board::{Board, GameResult};
use crate::error::MoveError;
use crate::hex::{opening_hex, Cell, Hex};
use crate::moves::{generate_moves, Move};
use crate::pieces::{Color, Piece, PieceKind};
use crate::rules::{valid_moves, valid_spawns};

/// Anything that can pick a move for one side
pub trait Engine {
    fn name(&self) -> &str;

    /// Pick a move for `color` within roughly `budget`, leaving `board`
    /// exactly as it was. `None` means the side has no legal move.
    fn choose_move(&mut self, board: &mut Board, color: Color, budget: Duration) -> Option<Move>;
}

/// Where a human move starts from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    /// Place a piece of this kind from the reserve
    Reserve(PieceKind),
    /// Move the top piece of this column
    Board(Hex),
}

/// A game in progress
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    to_move: Color,
    ply: u32,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Empty board, White to move
    pub fn new() -> Self {
        Self { board: Board::new(), to_move: Color::White, ply: 0 }
    }

    /// Standard opening: a black spider and a white ant on the opening
    /// cells, then the chosen side moves
    pub fn with_opening(white_first: bool) -> Self {
        let mut board = Board::new();
        board.spawn(opening_hex(Color::Black), Piece::new(Color::Black, PieceKind::Spider), 0);
        board.spawn(opening_hex(Color::White), Piece::new(Color::White, PieceKind::Ant), 0);
        let to_move = if white_first { Color::White } else { Color::Black };
        Self { board, to_move, ply: 0 }
    }

    /// Resume from an arbitrary position
    pub fn from_board(board: Board, to_move: Color) -> Self {
        Self { board, to_move, ply: 0 }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn to_move(&self) -> Color {
        self.to_move
    }

    pub fn ply(&self) -> u32 {
        self.ply
    }

    pub fn result(&self) -> GameResult {
        self.board.result()
    }

    pub fn current_winner(&self) -> Option<Color> {
        self.board.winner()
    }

    /// Every legal move for the side to move
    pub fn legal_moves(&mut self) -> Vec<Move> {
        generate_moves(&mut self.board, self.to_move)
    }

    /// Legal landing cells for a source, for the side to move
    pub fn legal_destinations(&mut self, source: Source) -> Vec<Cell> {
        let color = self.to_move;
        match source {
            Source::Reserve(kind) => {
                let queen_due = !self.board.queen_placed(color) && self.board.placed_count(color) >= 3;
                if self.board.pieces_left(color, kind) == 0 || (queen_due && kind != PieceKind::Queen) {
                    return Vec::new();
                }
                valid_spawns(&self.board, color)
            }
            Source::Board(hex) => match self.board.top(hex) {
                Some(cell) if cell.color() == Some(color) => valid_moves(&mut self.board, cell),
                _ => Vec::new(),
            },
        }
    }

    /// Validate and play a move for the side to move
    pub fn try_move(&mut self, source: Source, to: Hex) -> Result<Move, MoveError> {
        let color = self.to_move;
        let mv = match source {
            Source::Reserve(kind) => {
                self.board.put_piece(to, color, kind, false)?;
                Move::Place { piece: Piece::new(color, kind), to }
            }
            Source::Board(from) => {
                let cell = self
                    .board
                    .top(from)
                    .ok_or(MoveError::EmptySource { hex: from, layer: 0 })?;
                let piece = cell.occupant.ok_or(MoveError::EmptySource { hex: from, layer: cell.layer })?;
                if piece.color != color {
                    return Err(MoveError::NotOwnPiece { color, hex: from });
                }
                let to_layer = if self.board.is_occupied(to) { 1 } else { 0 };
                self.board.move_piece(cell, to, to_layer, false)?;
                Move::Relocate { piece, from, from_layer: cell.layer, to, to_layer }
            }
        };
        self.advance();
        Ok(mv)
    }

    /// Like [`Game::try_move`], reporting only success. The reason for a
    /// refusal is logged.
    pub fn apply_human_move(&mut self, source: Source, to: Hex) -> bool {
        match self.try_move(source, to) {
            Ok(mv) => {
                info!("{} plays {}", mv.color(), mv);
                true
            }
            Err(e) => {
                trace!("rejected move to {}: {}", to, e);
                false
            }
        }
    }

    /// Hand the turn over without moving (only sensible with no legal move)
    pub fn pass(&mut self) {
        debug!("{} passes", self.to_move);
        self.advance();
    }

    /// Let an engine move for the side to move. The move is already on
    /// the board when it is returned. Passes when the engine finds nothing.
    pub fn compute_ai_move(&mut self, engine: &mut dyn Engine, budget: Duration) -> Option<Move> {
        if self.result().is_over() {
            return None;
        }
        let color = self.to_move;
        match engine.choose_move(&mut self.board, color, budget) {
            Some(mv) => {
                self.board.apply(mv);
                info!("{} ({}) plays {}", color, engine.name(), mv);
                self.advance();
                Some(mv)
            }
            None => {
                self.pass();
                None
            }
        }
    }

    fn advance(&mut self) {
        self.to_move = self.to_move.opponent();
        self.ply += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Plays the first legal move it is offered
    struct FirstMove;

    impl Engine for FirstMove {
        fn name(&self) -> &str {
            "first"
        }

        fn choose_move(&mut self, board: &mut Board, color: Color, _budget: Duration) -> Option<Move> {
            generate_moves(board, color).into_iter().next()
        }
    }

    #[test]
    fn test_opening_position() {
        let game = Game::with_opening(true);
        let board = game.board();
        assert_eq!(board.top(Hex::new(15, 14)).and_then(|c| c.occupant), Some(Piece::new(Color::Black, PieceKind::Spider)));
        assert_eq!(board.top(Hex::new(15, 15)).and_then(|c| c.occupant), Some(Piece::new(Color::White, PieceKind::Ant)));
        assert_eq!(game.current_winner(), None);
        assert_eq!(game.to_move(), Color::White);
    }

    #[test]
    fn test_human_placement_and_turns() {
        let mut game = Game::new();
        assert!(!game.apply_human_move(Source::Reserve(PieceKind::Queen), Hex::new(3, 3)));
        assert_eq!(game.to_move(), Color::White);

        assert!(game.apply_human_move(Source::Reserve(PieceKind::Queen), opening_hex(Color::White)));
        assert_eq!(game.to_move(), Color::Black);
        assert_eq!(game.ply(), 1);
    }

    #[test]
    fn test_cannot_move_enemy_piece() {
        let mut game = Game::with_opening(true);
        let err = game.try_move(Source::Board(Hex::new(15, 14)), Hex::new(16, 14));
        assert_eq!(err, Err(MoveError::NotOwnPiece { color: Color::White, hex: Hex::new(15, 14) }));
        assert!(game.legal_destinations(Source::Board(Hex::new(15, 14))).is_empty());
    }

    #[test]
    fn test_legal_destinations_idempotent() {
        let mut game = Game::with_opening(true);
        game.apply_human_move(Source::Reserve(PieceKind::Queen), Hex::new(15, 16));
        game.apply_human_move(Source::Reserve(PieceKind::Queen), Hex::new(15, 13));

        let before = game.board().clone();
        let first = game.legal_destinations(Source::Board(Hex::new(15, 16)));
        let second = game.legal_destinations(Source::Board(Hex::new(15, 16)));
        assert_eq!(first, second);
        assert_eq!(game.board(), &before);
    }

    #[test]
    fn test_engine_move_is_applied() {
        let mut game = Game::with_opening(true);
        let before = game.board().total_pieces_left(Color::White);
        let mv = game.compute_ai_move(&mut FirstMove, Duration::from_millis(10));
        assert!(mv.is_some());
        assert_eq!(game.board().total_pieces_left(Color::White), before - 1);
        assert_eq!(game.to_move(), Color::Black);
    }
}
