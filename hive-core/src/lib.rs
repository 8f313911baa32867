//! Hive Core - Game engine and AI
//!
//! This crate provides the core game logic for Hive:
//! - Board geometry (offset hex grid with a beetle layer)
//! - Piece kinds and per-kind movement rules
//! - Placement/movement legality and move generation
//! - Position evaluation
//! - Time-bounded minimax AI

pub mod hex;
pub mod pieces;
pub mod error;
pub mod board;
pub mod rules;
pub mod movement;
pub mod moves;
pub mod eval;
pub mod config;
pub mod ai;
pub mod game;

// Re-exports for convenient access
pub use hex::{opening_hex, Cell, Hex, DIRECTIONS, LAYERS, SIDE};
pub use pieces::{Color, Piece, PieceKind, KIND_SPECS, PIECES_PER_COLOR};
pub use error::MoveError;
pub use board::{Board, GameResult};
pub use rules::{count_components, get_neighbours, has_neighbour, has_neighbour_with_color, is_accessible, valid_moves, valid_spawns};
pub use movement::{mobility, Mobility};
pub use moves::{generate_moves, generate_placements, generate_relocations, perft, Move, ScoredMove};
pub use eval::{evaluate, side_score, terminal_score, Heuristics, WIN_SCORE};
pub use config::SearchConfig;
pub use ai::{MinimaxAI, SearchReport};
pub use game::{Engine, Game, Source};
