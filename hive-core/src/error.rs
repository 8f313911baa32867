//! Rejection reasons for placement and relocation attempts

use crate::hex::Hex;
use crate::pieces::{Color, PieceKind};

/// Why a `put_piece` / `move_piece` call was refused.
///
/// The board is left untouched whenever one of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("{color} has no {kind} left in reserve")]
    NoneLeft { color: Color, kind: PieceKind },

    #[error("{0} is outside the board")]
    OutOfBounds(Hex),

    #[error("{0} must place its queen by its fourth placement")]
    QueenRequired(Color),

    #[error("{color} cannot place at {hex}")]
    IllegalPlacement { color: Color, hex: Hex },

    #[error("destination {hex} layer {layer} is occupied")]
    Occupied { hex: Hex, layer: u8 },

    #[error("piece at {0} is pinned under a beetle")]
    Locked(Hex),

    #[error("no piece at {hex} layer {layer}")]
    EmptySource { hex: Hex, layer: u8 },

    #[error("piece at {hex} does not belong to {color}")]
    NotOwnPiece { color: Color, hex: Hex },

    #[error("{to} is not a legal destination from {from}")]
    IllegalDestination { from: Hex, to: Hex },
}
