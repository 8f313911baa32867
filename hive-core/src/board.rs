//! Two-layer Hive board with per-color bookkeeping
//!
//! The board is created once per game and mutated in place, both by real
//! moves and by every search probe. `spawn` and `destroy` are the only
//! primitives that touch the grid; everything else is built on them.

use crate::error::MoveError;
use crate::hex::{cell_index, Cell, Hex, CELL_COUNT, LAYERS, SIDE};
use crate::pieces::{Color, Piece, PieceKind, KIND_COUNT, PIECES_PER_COLOR};
use crate::rules;
use serde::{Deserialize, Serialize};

/// Multiplier of the rolling position hash
const HASH_BASE: u64 = 1_000_003;

/// Game outcome as seen from the current position
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Ongoing,
    BlackWins,
    WhiteWins,
    /// Both queens surrounded on the same ply
    Draw,
}

impl GameResult {
    pub fn is_over(self) -> bool {
        self != GameResult::Ongoing
    }

    pub fn winner(self) -> Option<Color> {
        match self {
            GameResult::BlackWins => Some(Color::Black),
            GameResult::WhiteWins => Some(Color::White),
            GameResult::Ongoing | GameResult::Draw => None,
        }
    }
}

/// The grid plus reserves and the piece-position index
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    /// Indexed by `cell_index(hex, layer)`
    cells: Vec<Cell>,
    pieces_left: [[u8; KIND_COUNT]; 2],
    total_pieces_left: [u8; 2],
    queen_placed: [bool; 2],
    /// Placed cells per (color, kind), sorted by `Cell::id`
    positions: [[Vec<Cell>; KIND_COUNT]; 2],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Empty board, full reserves
    pub fn new() -> Self {
        let mut cells = Vec::with_capacity(CELL_COUNT);
        for layer in 0..LAYERS {
            for x in 0..SIDE {
                for y in 0..SIDE {
                    cells.push(Cell::empty(Hex::new(x, y), layer));
                }
            }
        }
        debug_assert!(cells.iter().enumerate().all(|(i, c)| c.id() == i));

        let reserve: [u8; KIND_COUNT] = std::array::from_fn(|k| PieceKind::ALL[k].initial_count());

        Self {
            cells,
            pieces_left: [reserve; 2],
            total_pieces_left: [PIECES_PER_COLOR; 2],
            queen_placed: [false; 2],
            positions: std::array::from_fn(|_| std::array::from_fn(|_| Vec::new())),
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    /// Cell at (hex, layer). Off-board locations read as empty.
    pub fn cell(&self, hex: Hex, layer: u8) -> Cell {
        if hex.is_valid() && layer < LAYERS {
            self.cells[cell_index(hex, layer)]
        } else {
            Cell::empty(hex, layer)
        }
    }

    /// Whether the ground cell of this column holds a piece
    pub fn is_occupied(&self, hex: Hex) -> bool {
        !self.cell(hex, 0).is_empty()
    }

    /// Highest occupied cell of a column
    pub fn top(&self, hex: Hex) -> Option<Cell> {
        (0..LAYERS)
            .rev()
            .map(|layer| self.cell(hex, layer))
            .find(|c| !c.is_empty())
    }

    /// A ground piece is locked when something sits on top of it
    pub fn is_locked(&self, cell: &Cell) -> bool {
        cell.layer == 0 && !self.cell(cell.hex, 1).is_empty()
    }

    pub fn pieces_left(&self, color: Color, kind: PieceKind) -> u8 {
        self.pieces_left[color.index()][kind.index()]
    }

    pub fn total_pieces_left(&self, color: Color) -> u8 {
        self.total_pieces_left[color.index()]
    }

    /// Pieces of this color currently on the board
    pub fn placed_count(&self, color: Color) -> u8 {
        PIECES_PER_COLOR - self.total_pieces_left(color)
    }

    pub fn queen_placed(&self, color: Color) -> bool {
        self.queen_placed[color.index()]
    }

    pub fn positions(&self, color: Color, kind: PieceKind) -> &[Cell] {
        &self.positions[color.index()][kind.index()]
    }

    pub fn queen(&self, color: Color) -> Option<Cell> {
        self.positions(color, PieceKind::Queen).first().copied()
    }

    /// Every occupied cell, both layers
    pub fn occupied_cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.positions.iter().flatten().flatten()
    }

    /// Every occupied cell of one color
    pub fn cells_of(&self, color: Color) -> impl Iterator<Item = &Cell> + '_ {
        self.positions[color.index()].iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        Color::ALL.iter().all(|&c| self.placed_count(c) == 0)
    }

    /// Occupied neighbor columns of a hex
    pub fn surrounding_count(&self, hex: Hex) -> usize {
        hex.valid_neighbors().filter(|&n| self.is_occupied(n)).count()
    }

    /// Occupied neighbors of a color's queen, if placed
    pub fn queen_surrounding(&self, color: Color) -> Option<usize> {
        self.queen(color).map(|q| self.surrounding_count(q.hex))
    }

    // ========================================================================
    // PRIMITIVES
    // ========================================================================

    /// Write a piece from the reserve onto an empty cell.
    ///
    /// Does not check *where* the piece goes; callers validate first.
    /// Panics on out-of-range coordinates, an occupied target, a floating
    /// layer-1 piece, or an exhausted reserve.
    pub fn spawn(&mut self, hex: Hex, piece: Piece, layer: u8) {
        assert!(hex.is_valid() && layer < LAYERS, "spawn outside board: {} layer {}", hex, layer);
        let idx = cell_index(hex, layer);
        assert!(self.cells[idx].is_empty(), "spawn on occupied cell {} layer {}", hex, layer);
        if layer > 0 {
            assert!(
                !self.cell(hex, layer - 1).is_empty(),
                "spawn of {} at {} layer {} has nothing underneath",
                piece,
                hex,
                layer
            );
        }

        let (c, k) = (piece.color.index(), piece.kind.index());
        assert!(self.pieces_left[c][k] > 0, "{} has no reserve left", piece);

        let cell = Cell::occupied(hex, layer, piece);
        self.cells[idx] = cell;
        if piece.kind == PieceKind::Queen {
            self.queen_placed[c] = true;
        }
        self.pieces_left[c][k] -= 1;
        self.total_pieces_left[c] -= 1;

        let list = &mut self.positions[c][k];
        let at = list.binary_search_by_key(&cell.id(), Cell::id).unwrap_or_else(|i| i);
        list.insert(at, cell);
    }

    /// Inverse of `spawn`: return the piece at (hex, layer) to its reserve.
    ///
    /// Panics if the cell is empty or pinned under another piece.
    pub fn destroy(&mut self, hex: Hex, layer: u8) -> Piece {
        assert!(hex.is_valid() && layer < LAYERS, "destroy outside board: {} layer {}", hex, layer);
        let idx = cell_index(hex, layer);
        let cell = self.cells[idx];
        let Some(piece) = cell.occupant else {
            panic!("destroy on empty cell {} layer {}", hex, layer);
        };
        assert!(!self.is_locked(&cell), "destroy of pinned piece at {}", hex);

        let (c, k) = (piece.color.index(), piece.kind.index());
        self.cells[idx] = Cell::empty(hex, layer);
        if piece.kind == PieceKind::Queen {
            self.queen_placed[c] = false;
        }
        self.pieces_left[c][k] += 1;
        self.total_pieces_left[c] += 1;

        let list = &mut self.positions[c][k];
        let at = list
            .binary_search_by_key(&cell.id(), Cell::id)
            .unwrap_or_else(|_| panic!("position index lost track of {} at {}", piece, hex));
        list.remove(at);

        piece
    }

    // ========================================================================
    // VALIDATED MUTATION
    // ========================================================================

    /// Place a piece from the reserve, enforcing the placement rules.
    ///
    /// With `validated = true` the legal-placement search is skipped; the
    /// reserve and queen rules are still checked.
    pub fn put_piece(&mut self, hex: Hex, color: Color, kind: PieceKind, validated: bool) -> Result<(), MoveError> {
        if self.pieces_left(color, kind) == 0 {
            return Err(MoveError::NoneLeft { color, kind });
        }
        if !hex.is_valid() {
            return Err(MoveError::OutOfBounds(hex));
        }
        if kind != PieceKind::Queen && !self.queen_placed(color) && self.placed_count(color) >= 3 {
            return Err(MoveError::QueenRequired(color));
        }
        if !validated && !rules::valid_spawns(self, color).iter().any(|c| c.hex == hex) {
            return Err(MoveError::IllegalPlacement { color, hex });
        }

        self.spawn(hex, Piece::new(color, kind), 0);
        Ok(())
    }

    /// Relocate the piece found at `source` to (to, layer).
    ///
    /// The piece is destroyed before it is re-spawned so the position index
    /// stays correct when it moves next to its own old cell.
    pub fn move_piece(&mut self, source: Cell, to: Hex, layer: u8, validated: bool) -> Result<(), MoveError> {
        if !to.is_valid() || layer >= LAYERS {
            return Err(MoveError::OutOfBounds(to));
        }
        if !source.hex.is_valid() || source.layer >= LAYERS {
            return Err(MoveError::OutOfBounds(source.hex));
        }
        let source = self.cell(source.hex, source.layer);
        let Some(piece) = source.occupant else {
            return Err(MoveError::EmptySource { hex: source.hex, layer: source.layer });
        };
        if self.is_locked(&source) {
            return Err(MoveError::Locked(source.hex));
        }
        if !self.cell(to, layer).is_empty() {
            return Err(MoveError::Occupied { hex: to, layer });
        }
        if !validated {
            let legal = rules::valid_moves(self, source);
            if !legal.iter().any(|c| c.hex == to && c.layer == layer) {
                return Err(MoveError::IllegalDestination { from: source.hex, to });
            }
        }

        self.destroy(source.hex, source.layer);
        self.spawn(to, piece, layer);
        Ok(())
    }

    // ========================================================================
    // OUTCOME
    // ========================================================================

    /// A color loses once its placed queen has all six neighbors occupied
    pub fn result(&self) -> GameResult {
        let lost = |color: Color| self.queen_surrounding(color) == Some(6);
        match (lost(Color::Black), lost(Color::White)) {
            (true, true) => GameResult::Draw,
            (true, false) => GameResult::WhiteWins,
            (false, true) => GameResult::BlackWins,
            (false, false) => GameResult::Ongoing,
        }
    }

    pub fn winner(&self) -> Option<Color> {
        self.result().winner()
    }

    // ========================================================================
    // HASHING
    // ========================================================================

    /// Rolling polynomial hash over occupied cells in canonical order
    pub fn position_hash(&self) -> u64 {
        let mut h: u64 = 0;
        for cell in self.occupied_cells() {
            let piece = cell.occupant.map_or(0, |p| p.color.index() * KIND_COUNT + p.kind.index());
            let code = (cell.id() * 2 * KIND_COUNT + piece + 1) as u64;
            h = h.wrapping_mul(HASH_BASE).wrapping_add(code);
        }
        finalize(h)
    }

    /// Position hash with the ply depth folded in
    pub fn hash_at_depth(&self, depth: u32) -> u64 {
        finalize(
            self.position_hash()
                .wrapping_mul(HASH_BASE)
                .wrapping_add(depth as u64 + 1),
        )
    }
}

/// splitmix64 finalizer
fn finalize(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Board")
            .field("occupied", &self.occupied_cells().collect::<Vec<_>>())
            .field("pieces_left", &self.pieces_left)
            .field("queen_placed", &self.queen_placed)
            .finish()
    }
}

/// Text rendering of the occupied bounding box. Uppercase is White,
/// lowercase Black; a `^` suffix marks a stack.
impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut cells = self.occupied_cells().peekable();
        if cells.peek().is_none() {
            return writeln!(f, "(empty board)");
        }
        let (mut min_x, mut max_x, mut min_y, mut max_y) = (SIDE, 0, SIDE, 0);
        for c in cells {
            min_x = min_x.min(c.hex.x);
            max_x = max_x.max(c.hex.x);
            min_y = min_y.min(c.hex.y);
            max_y = max_y.max(c.hex.y);
        }

        write!(f, "    ")?;
        for x in min_x..=max_x {
            write!(f, "{:>3}", x)?;
        }
        writeln!(f)?;
        for y in min_y..=max_y {
            write!(f, "{:>3} ", y)?;
            for x in min_x..=max_x {
                let hex = Hex::new(x, y);
                match self.top(hex).and_then(|c| c.occupant.map(|p| (c.layer, p))) {
                    Some((0, p)) => write!(f, "  {}", p.code())?,
                    Some((_, p)) => write!(f, " {}^", p.code())?,
                    None => write!(f, "  .")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn piece(color: Color, kind: PieceKind) -> Piece {
        Piece::new(color, kind)
    }

    #[test]
    fn test_new_board_reserves() {
        let board = Board::new();
        assert!(board.is_empty());
        assert_eq!(board.total_pieces_left(Color::Black), 11);
        assert_eq!(board.pieces_left(Color::White, PieceKind::Ant), 3);
        assert_eq!(board.pieces_left(Color::White, PieceKind::Queen), 1);
        assert!(!board.queen_placed(Color::White));
        assert_eq!(board.result(), GameResult::Ongoing);
    }

    #[test]
    fn test_spawn_updates_bookkeeping() {
        let mut board = Board::new();
        board.spawn(Hex::new(10, 10), piece(Color::White, PieceKind::Queen), 0);

        assert!(board.queen_placed(Color::White));
        assert_eq!(board.pieces_left(Color::White, PieceKind::Queen), 0);
        assert_eq!(board.total_pieces_left(Color::White), 10);
        assert_eq!(board.positions(Color::White, PieceKind::Queen).len(), 1);
        assert_eq!(board.queen(Color::White).map(|c| c.hex), Some(Hex::new(10, 10)));
    }

    #[test]
    fn test_spawn_destroy_roundtrip() {
        let mut board = Board::new();
        board.spawn(Hex::new(10, 10), piece(Color::Black, PieceKind::Ant), 0);
        let before = board.clone();

        board.spawn(Hex::new(10, 11), piece(Color::Black, PieceKind::Ant), 0);
        board.spawn(Hex::new(10, 11), piece(Color::White, PieceKind::Beetle), 1);
        board.destroy(Hex::new(10, 11), 1);
        board.destroy(Hex::new(10, 11), 0);

        assert_eq!(board, before);
    }

    #[test]
    fn test_positions_sorted_after_relocation() {
        let mut board = Board::new();
        let ant = piece(Color::Black, PieceKind::Ant);
        board.spawn(Hex::new(12, 12), ant, 0);
        board.spawn(Hex::new(3, 3), ant, 0);
        let ids: Vec<usize> = board.positions(Color::Black, PieceKind::Ant).iter().map(Cell::id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }

    #[test]
    #[should_panic(expected = "destroy on empty cell")]
    fn test_destroy_empty_panics() {
        let mut board = Board::new();
        board.destroy(Hex::new(5, 5), 0);
    }

    #[test]
    #[should_panic(expected = "spawn outside board")]
    fn test_spawn_out_of_range_panics() {
        let mut board = Board::new();
        board.spawn(Hex::new(SIDE, 0), piece(Color::Black, PieceKind::Ant), 0);
    }

    #[test]
    #[should_panic(expected = "nothing underneath")]
    fn test_floating_beetle_panics() {
        let mut board = Board::new();
        board.spawn(Hex::new(5, 5), piece(Color::Black, PieceKind::Beetle), 1);
    }

    #[test]
    fn test_locked_iff_covered() {
        let mut board = Board::new();
        let hex = Hex::new(10, 10);
        board.spawn(hex, piece(Color::Black, PieceKind::Ant), 0);
        assert!(!board.is_locked(&board.cell(hex, 0)));

        board.spawn(hex, piece(Color::White, PieceKind::Beetle), 1);
        assert!(board.is_locked(&board.cell(hex, 0)));
        assert!(!board.is_locked(&board.cell(hex, 1)));
        assert_eq!(board.top(hex).map(|c| c.layer), Some(1));
    }

    #[test]
    fn test_winner_when_queen_surrounded() {
        let mut board = Board::new();
        let center = Hex::new(10, 10);
        board.spawn(center, piece(Color::Black, PieceKind::Queen), 0);
        let fillers = [
            PieceKind::Ant,
            PieceKind::Ant,
            PieceKind::Ant,
            PieceKind::Grasshopper,
            PieceKind::Grasshopper,
            PieceKind::Spider,
        ];
        for (n, kind) in center.neighbors().into_iter().zip(fillers) {
            assert_eq!(board.winner(), None);
            board.spawn(n, piece(Color::White, kind), 0);
        }
        assert_eq!(board.queen_surrounding(Color::Black), Some(6));
        assert_eq!(board.winner(), Some(Color::White));
        assert_eq!(board.result(), GameResult::WhiteWins);
    }

    #[test]
    fn test_double_encirclement_is_draw() {
        let mut board = Board::new();
        // Two queens side by side, both ringed by the remaining pieces
        let bq = Hex::new(10, 10);
        let wq = bq.neighbor(3);
        board.spawn(bq, piece(Color::Black, PieceKind::Queen), 0);
        board.spawn(wq, piece(Color::White, PieceKind::Queen), 0);

        let mut ring: Vec<Hex> = bq.neighbors().into_iter().chain(wq.neighbors()).collect();
        ring.sort();
        ring.dedup();
        ring.retain(|&h| h != bq && h != wq);

        let mut reserve = Vec::new();
        for color in Color::ALL {
            for kind in [PieceKind::Ant, PieceKind::Grasshopper, PieceKind::Beetle, PieceKind::Spider] {
                for _ in 0..kind.initial_count() {
                    reserve.push(piece(color, kind));
                }
            }
        }
        for (hex, p) in ring.into_iter().zip(reserve) {
            board.spawn(hex, p, 0);
        }
        assert_eq!(board.result(), GameResult::Draw);
        assert_eq!(board.winner(), None);
    }

    #[test]
    fn test_hash_tracks_position() {
        let mut board = Board::new();
        let empty = board.position_hash();
        board.spawn(Hex::new(10, 10), piece(Color::Black, PieceKind::Ant), 0);
        let one = board.position_hash();
        assert_ne!(empty, one);

        board.destroy(Hex::new(10, 10), 0);
        assert_eq!(board.position_hash(), empty);

        board.spawn(Hex::new(10, 10), piece(Color::White, PieceKind::Ant), 0);
        assert_ne!(board.position_hash(), one);
        assert_ne!(board.hash_at_depth(1), board.hash_at_depth(2));
    }

    #[test]
    fn test_display_marks_stacks() {
        let mut board = Board::new();
        board.spawn(Hex::new(10, 10), piece(Color::Black, PieceKind::Ant), 0);
        board.spawn(Hex::new(10, 10), piece(Color::White, PieceKind::Beetle), 1);
        let text = board.to_string();
        assert!(text.contains("B^"));
    }
}
