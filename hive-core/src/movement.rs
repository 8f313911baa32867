//! Per-kind movement generators
//!
//! Each generator sees the board with the moving piece already lifted off,
//! and returns destination cells (empty, with the layer the piece lands on).

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::board::Board;
use crate::hex::{Cell, Hex};
use crate::pieces::PieceKind;
use crate::rules::{can_slide, has_neighbour, is_accessible};

/// Slides a spider must make, no more and no fewer
pub const SPIDER_STEPS: u8 = 3;

/// Movement capability of one piece kind
pub trait Mobility: Sync {
    /// Destinations for a piece that stood at `origin`
    fn destinations(&self, board: &Board, origin: Cell) -> Vec<Cell>;
}

/// Generator for a kind
pub fn mobility(kind: PieceKind) -> &'static dyn Mobility {
    match kind {
        PieceKind::Ant => &AntMoves,
        PieceKind::Queen => &QueenMoves,
        PieceKind::Beetle => &BeetleMoves,
        PieceKind::Grasshopper => &GrasshopperMoves,
        PieceKind::Spider => &SpiderMoves,
    }
}

/// Any number of slides around the hive
pub struct AntMoves;

impl Mobility for AntMoves {
    fn destinations(&self, board: &Board, origin: Cell) -> Vec<Cell> {
        let mut seen: FxHashSet<Hex> = FxHashSet::default();
        seen.insert(origin.hex);
        let mut queue = VecDeque::from([origin.hex]);
        let mut out = Vec::new();

        while let Some(hex) = queue.pop_front() {
            for n in hex.valid_neighbors() {
                if !seen.contains(&n) && can_slide(board, hex, n) {
                    seen.insert(n);
                    out.push(Cell::empty(n, 0));
                    queue.push_back(n);
                }
            }
        }
        out
    }
}

/// One slide
pub struct QueenMoves;

impl Mobility for QueenMoves {
    fn destinations(&self, board: &Board, origin: Cell) -> Vec<Cell> {
        origin
            .hex
            .valid_neighbors()
            .filter(|&n| can_slide(board, origin.hex, n))
            .map(|n| Cell::empty(n, 0))
            .collect()
    }
}

/// One step, climbing onto or off the hive
pub struct BeetleMoves;

impl Mobility for BeetleMoves {
    fn destinations(&self, board: &Board, origin: Cell) -> Vec<Cell> {
        let mut out = Vec::new();
        for n in origin.hex.valid_neighbors() {
            if board.is_occupied(n) {
                // Climbing onto a column ignores the sliding gate
                if board.cell(n, 1).is_empty() {
                    out.push(Cell::empty(n, 1));
                }
            } else if has_neighbour(board, n) {
                // Stepping down from the top layer ignores it too
                if origin.layer > 0 || is_accessible(board, origin.hex, n, 0) {
                    out.push(Cell::empty(n, 0));
                }
            }
        }
        out
    }
}

/// Straight jumps over at least one piece
pub struct GrasshopperMoves;

impl Mobility for GrasshopperMoves {
    fn destinations(&self, board: &Board, origin: Cell) -> Vec<Cell> {
        let mut out = Vec::new();
        for d in 0..6 {
            let mut p = origin.hex.neighbor(d);
            if !board.is_occupied(p) {
                continue;
            }
            while board.is_occupied(p) {
                p = p.neighbor(d);
            }
            if p.is_valid() {
                out.push(Cell::empty(p, 0));
            }
        }
        out
    }
}

/// Exactly [`SPIDER_STEPS`] slides
pub struct SpiderMoves;

impl Mobility for SpiderMoves {
    fn destinations(&self, board: &Board, origin: Cell) -> Vec<Cell> {
        let mut dist: FxHashMap<Hex, u8> = FxHashMap::default();
        dist.insert(origin.hex, 0);
        let mut queue = VecDeque::from([(origin.hex, 0u8)]);
        let mut out = Vec::new();

        while let Some((hex, d)) = queue.pop_front() {
            for n in hex.valid_neighbors() {
                if dist.contains_key(&n) || !can_slide(board, hex, n) {
                    continue;
                }
                dist.insert(n, d + 1);
                if d + 1 == SPIDER_STEPS {
                    out.push(Cell::empty(n, 0));
                } else {
                    queue.push_back((n, d + 1));
                }
            }
        }
        out
    }
}
