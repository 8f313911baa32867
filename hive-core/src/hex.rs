//! Hex grid geometry with offset coordinates
//!
//! Columns alternate between two neighbour tables depending on the parity
//! of `x`. Both tables list directions in the same angular order, so
//! directions `d - 1` and `d + 1` (mod 6) always flank direction `d`.

use serde::{Deserialize, Serialize};

use crate::pieces::{Color, Piece, PieceKind};

/// Grid side length. Large enough that a real game never reaches the edge.
pub const SIDE: i8 = 30;

/// Number of stacking layers (ground + one beetle on top)
pub const LAYERS: u8 = 2;

/// Total number of addressable cells
pub const CELL_COUNT: usize = SIDE as usize * SIDE as usize * LAYERS as usize;

/// Direction offsets (dx, dy) for even and odd columns.
/// Index: 0=N, 1=NE, 2=SE, 3=S, 4=SW, 5=NW
pub const DIRECTIONS: [[(i8, i8); 6]; 2] = [
    // Even x
    [(0, -1), (1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0)],
    // Odd x
    [(0, -1), (1, -1), (1, 0), (0, 1), (-1, 0), (-1, -1)],
];

/// One column of the grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hex {
    pub x: i8,
    pub y: i8,
}

impl Hex {
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    /// Check if this hex is on the board
    pub fn is_valid(&self) -> bool {
        (0..SIDE).contains(&self.x) && (0..SIDE).contains(&self.y)
    }

    /// Get neighbor in direction (0-5). May lie off the board.
    pub fn neighbor(&self, direction: usize) -> Hex {
        let (dx, dy) = DIRECTIONS[(self.x & 1) as usize][direction % 6];
        Hex::new(self.x.wrapping_add(dx), self.y.wrapping_add(dy))
    }

    /// All six neighbors in direction order, on-board or not
    pub fn neighbors(&self) -> [Hex; 6] {
        std::array::from_fn(|d| self.neighbor(d))
    }

    /// On-board neighbors only
    pub fn valid_neighbors(&self) -> impl Iterator<Item = Hex> {
        self.neighbors().into_iter().filter(Hex::is_valid)
    }

    /// Direction index leading from `self` to an adjacent `other`
    pub fn direction_to(&self, other: Hex) -> Option<usize> {
        (0..6).find(|&d| self.neighbor(d) == other)
    }

    pub fn is_adjacent(&self, other: Hex) -> bool {
        self.direction_to(other).is_some()
    }
}

impl std::fmt::Display for Hex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Fixed cell each color must use for its very first placement
pub fn opening_hex(color: Color) -> Hex {
    match color {
        Color::Black => Hex::new(SIDE / 2, SIDE / 2 - 1),
        Color::White => Hex::new(SIDE / 2, SIDE / 2),
    }
}

/// One grid cell: a column, a layer, and whatever occupies it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub hex: Hex,
    pub layer: u8,
    pub occupant: Option<Piece>,
}

impl Cell {
    pub const fn empty(hex: Hex, layer: u8) -> Self {
        Self { hex, layer, occupant: None }
    }

    pub const fn occupied(hex: Hex, layer: u8, piece: Piece) -> Self {
        Self { hex, layer, occupant: Some(piece) }
    }

    pub fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }

    pub fn color(&self) -> Option<Color> {
        self.occupant.map(|p| p.color)
    }

    pub fn kind(&self) -> Option<PieceKind> {
        self.occupant.map(|p| p.kind)
    }

    /// Compact integer identifier of the location (ignores the occupant)
    pub fn id(&self) -> usize {
        cell_index(self.hex, self.layer)
    }
}

/// Flat index of (hex, layer) into the board arrays
pub fn cell_index(hex: Hex, layer: u8) -> usize {
    debug_assert!(hex.is_valid() && layer < LAYERS);
    (layer as usize * SIDE as usize + hex.x as usize) * SIDE as usize + hex.y as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_validity() {
        assert!(Hex::new(0, 0).is_valid());
        assert!(Hex::new(29, 29).is_valid());
        assert!(!Hex::new(30, 0).is_valid());
        assert!(!Hex::new(0, -1).is_valid());
    }

    #[test]
    fn test_neighbors_are_symmetric() {
        for &hex in &[Hex::new(4, 7), Hex::new(5, 7), Hex::new(15, 15), Hex::new(16, 3)] {
            for n in hex.neighbors() {
                assert!(n.is_adjacent(hex), "{} should see {} as neighbor", n, hex);
            }
        }
    }

    #[test]
    fn test_opposite_directions() {
        let hex = Hex::new(10, 10);
        for d in 0..6 {
            let n = hex.neighbor(d);
            assert_eq!(n.neighbor(d + 3), hex);
        }
    }

    #[test]
    fn test_flanking_directions_are_mutual_neighbors() {
        for &hex in &[Hex::new(8, 8), Hex::new(9, 8)] {
            for d in 0..6 {
                let left = hex.neighbor((d + 5) % 6);
                let right = hex.neighbor((d + 1) % 6);
                let target = hex.neighbor(d);
                assert!(left.is_adjacent(target));
                assert!(right.is_adjacent(target));
            }
        }
    }

    #[test]
    fn test_openings_adjacent() {
        let black = opening_hex(Color::Black);
        let white = opening_hex(Color::White);
        assert_eq!(black, Hex::new(15, 14));
        assert_eq!(white, Hex::new(15, 15));
        assert!(black.is_adjacent(white));
    }

    #[test]
    fn test_cell_ids_unique() {
        let a = Cell::empty(Hex::new(3, 4), 0).id();
        let b = Cell::empty(Hex::new(4, 3), 0).id();
        let c = Cell::empty(Hex::new(3, 4), 1).id();
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert!(c < CELL_COUNT);
    }
}
