//! Placement and movement legality
//!
//! Move generation works by lifting the moving piece off the board,
//! checking the one-hive rule on what is left, asking the kind's
//! [`Mobility`] for destinations, and putting the piece back.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::board::Board;
use crate::hex::{opening_hex, Cell, Hex};
use crate::movement::mobility;
use crate::pieces::Color;

// ============================================================================
// NEIGHBOURHOOD
// ============================================================================

/// Cells around `hex`. With `all_layers` the top occupied cell of each
/// column is returned instead of the ground cell.
pub fn get_neighbours(board: &Board, hex: Hex, all_layers: bool) -> Vec<Cell> {
    hex.valid_neighbors()
        .map(|n| match board.top(n) {
            Some(top) if all_layers => top,
            _ => board.cell(n, 0),
        })
        .collect()
}

/// Whether any neighbor column is occupied
pub fn has_neighbour(board: &Board, hex: Hex) -> bool {
    hex.valid_neighbors().any(|n| board.is_occupied(n))
}

/// Whether any neighbor column is topped by a piece of `color`
pub fn has_neighbour_with_color(board: &Board, hex: Hex, color: Color) -> bool {
    hex.valid_neighbors()
        .any(|n| board.top(n).and_then(|c| c.color()) == Some(color))
}

/// Sliding gate: a piece can slide from `from` into adjacent `to` on
/// `layer` only if at least one of the two cells flanking that edge is
/// free. Off-board flanks count as blocked.
pub fn is_accessible(board: &Board, from: Hex, to: Hex, layer: u8) -> bool {
    let Some(d) = from.direction_to(to) else {
        return false;
    };
    let free = |h: Hex| h.is_valid() && board.cell(h, layer).is_empty();
    free(from.neighbor((d + 5) % 6)) || free(from.neighbor((d + 1) % 6))
}

/// Empty ground cell reachable by one flat slide that still touches the hive
pub(crate) fn can_slide(board: &Board, from: Hex, to: Hex) -> bool {
    !board.is_occupied(to) && is_accessible(board, from, to, 0) && has_neighbour(board, to)
}

// ============================================================================
// ONE HIVE
// ============================================================================

/// Number of connected groups among ground-layer pieces
pub fn count_components(board: &Board) -> usize {
    let mut seen: FxHashSet<Hex> = FxHashSet::default();
    let mut components = 0;

    for start in board.occupied_cells().filter(|c| c.layer == 0).map(|c| c.hex) {
        if !seen.insert(start) {
            continue;
        }
        components += 1;

        let mut queue = VecDeque::from([start]);
        while let Some(hex) = queue.pop_front() {
            for n in hex.valid_neighbors() {
                if board.is_occupied(n) && seen.insert(n) {
                    queue.push_back(n);
                }
            }
        }
    }

    components
}

// ============================================================================
// PLACEMENT
// ============================================================================

/// Empty ground cells where `color` may place a new piece: touching the
/// hive and touching no enemy-topped column.
///
/// A color with nothing on the board yet must use its opening cell.
pub fn valid_spawns(board: &Board, color: Color) -> Vec<Cell> {
    if board.cells_of(color).next().is_none() {
        let opening = opening_hex(color);
        if !board.is_occupied(opening) {
            return vec![Cell::empty(opening, 0)];
        }
        return perimeter(board);
    }

    let mut spawns = Vec::new();
    walk_perimeter(board, |hex| {
        if !has_neighbour_with_color(board, hex, color.opponent()) {
            spawns.push(Cell::empty(hex, 0));
        }
    });
    spawns
}

/// Every empty ground cell touching the hive
fn perimeter(board: &Board) -> Vec<Cell> {
    let mut cells = Vec::new();
    walk_perimeter(board, |hex| cells.push(Cell::empty(hex, 0)));
    cells
}

/// Breadth-first walk through the hive, visiting each empty neighbor once
fn walk_perimeter(board: &Board, mut visit: impl FnMut(Hex)) {
    let Some(start) = board.occupied_cells().find(|c| c.layer == 0).map(|c| c.hex) else {
        return;
    };

    let mut seen: FxHashSet<Hex> = FxHashSet::default();
    seen.insert(start);
    let mut queue = VecDeque::from([start]);

    while let Some(hex) = queue.pop_front() {
        for n in hex.valid_neighbors() {
            if !seen.insert(n) {
                continue;
            }
            if board.is_occupied(n) {
                queue.push_back(n);
            } else {
                visit(n);
            }
        }
    }
}

// ============================================================================
// MOVEMENT
// ============================================================================

/// Legal destinations for the piece at `source`.
///
/// Empty when the piece is pinned, its color has no queen on the board, or
/// lifting it would split the hive. The board is restored before returning.
pub fn valid_moves(board: &mut Board, source: Cell) -> Vec<Cell> {
    let source = board.cell(source.hex, source.layer);
    let Some(piece) = source.occupant else {
        panic!("valid_moves on empty cell {} layer {}", source.hex, source.layer);
    };
    if board.is_locked(&source) || !board.queen_placed(piece.color) {
        return Vec::new();
    }

    board.destroy(source.hex, source.layer);
    let destinations = if count_components(board) <= 1 {
        mobility(piece.kind).destinations(board, source)
    } else {
        Vec::new()
    };
    board.spawn(source.hex, piece, source.layer);

    destinations
}
