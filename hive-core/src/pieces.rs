//! Piece kinds, colors, and the per-kind reserve table

use serde::{Deserialize, Serialize};

/// Player color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    Black = 0,
    White = 1,
}

impl Color {
    pub const ALL: [Color; 2] = [Color::Black, Color::White];

    pub fn opponent(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::Black => write!(f, "black"),
            Color::White => write!(f, "white"),
        }
    }
}

/// Insect kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceKind {
    Ant = 0,
    Queen = 1,
    Beetle = 2,
    Grasshopper = 3,
    Spider = 4,
}

/// Number of distinct kinds
pub const KIND_COUNT: usize = 5;

/// Pieces each color starts with
pub const PIECES_PER_COLOR: u8 = 11;

/// Static description of a kind
#[derive(Clone, Debug)]
pub struct KindSpec {
    pub kind: PieceKind,
    pub code: char,
    pub name: &'static str,
    /// Copies in each color's reserve at game start
    pub count: u8,
    /// Default material value used by the heuristic
    pub value: i64,
}

impl KindSpec {
    const fn new(kind: PieceKind, code: char, name: &'static str, count: u8, value: i64) -> Self {
        Self { kind, code, name, count, value }
    }
}

/// All kinds, indexed by `PieceKind as usize`
pub static KIND_SPECS: [KindSpec; KIND_COUNT] = [
    KindSpec::new(PieceKind::Ant, 'A', "Ant", 3, 6),
    KindSpec::new(PieceKind::Queen, 'Q', "Queen", 1, 10),
    KindSpec::new(PieceKind::Beetle, 'B', "Beetle", 2, 4),
    KindSpec::new(PieceKind::Grasshopper, 'G', "Grasshopper", 3, 2),
    KindSpec::new(PieceKind::Spider, 'S', "Spider", 2, 2),
];

impl PieceKind {
    pub const ALL: [PieceKind; KIND_COUNT] = [
        PieceKind::Ant,
        PieceKind::Queen,
        PieceKind::Beetle,
        PieceKind::Grasshopper,
        PieceKind::Spider,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn spec(self) -> &'static KindSpec {
        &KIND_SPECS[self.index()]
    }

    pub fn initial_count(self) -> u8 {
        self.spec().count
    }

    /// Look up a kind from its one-letter code (case-insensitive)
    pub fn from_code(code: char) -> Option<PieceKind> {
        let upper = code.to_ascii_uppercase();
        KIND_SPECS.iter().find(|s| s.code == upper).map(|s| s.kind)
    }
}

impl std::fmt::Display for PieceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.spec().name)
    }
}

/// A concrete piece: kind plus owner
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Self { color, kind }
    }

    /// Display code: uppercase for White, lowercase for Black
    pub fn code(&self) -> char {
        let code = self.kind.spec().code;
        match self.color {
            Color::White => code,
            Color::Black => code.to_ascii_lowercase(),
        }
    }
}

impl std::fmt::Display for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.color {
            Color::Black => 'b',
            Color::White => 'w',
        };
        write!(f, "{}{}", prefix, self.kind.spec().code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_totals() {
        let total: u8 = PieceKind::ALL.iter().map(|k| k.initial_count()).sum();
        assert_eq!(total, PIECES_PER_COLOR);
    }

    #[test]
    fn test_spec_table_ordered() {
        for kind in PieceKind::ALL {
            assert_eq!(kind.spec().kind, kind);
        }
    }

    #[test]
    fn test_code_lookup() {
        assert_eq!(PieceKind::from_code('q'), Some(PieceKind::Queen));
        assert_eq!(PieceKind::from_code('G'), Some(PieceKind::Grasshopper));
        assert_eq!(PieceKind::from_code('x'), None);
        assert_eq!(Piece::new(Color::Black, PieceKind::Ant).code(), 'a');
        assert_eq!(Piece::new(Color::White, PieceKind::Ant).code(), 'A');
    }

    #[test]
    fn test_queen_most_valuable() {
        let queen = PieceKind::Queen.spec().value;
        assert!(PieceKind::ALL.iter().all(|k| k.spec().value <= queen));
    }
}
