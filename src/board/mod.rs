//! Chess board representation and move generation.
//!
//! Uses a 0x88 board for compact off-board testing and static attack/ray
//! tables for move generation. Supports full chess rules including
//! castling, en passant, promotions, and Zobrist-hash-based repetition.
//!
//! # Example
//! ```
//! use chessbook::board::Position;
//!
//! let pos = Position::new();
//! let moves = pos.generate_legal_moves();
//! println!("Starting position has {} legal moves", moves.len());
//! ```

mod attack_tables;
pub mod error;
mod fen;
mod make_unmake;
mod movegen;
pub mod position;
pub mod prelude;
mod san;
#[cfg(test)]
mod tests;
mod types;

pub use error::{FenError, MoveError, MoveParseError, SanError, SquareError};
pub use fen::validate_fen;
pub use position::Position;
pub use types::{
    CastlingRights, Color, InternalMove, MoveFlags, MoveList, MoveListIntoIter, Piece, Square,
};

pub(crate) use make_unmake::{make_move, unmake_move};
pub(crate) use types::{
    castle_bit, file_to_index, rank_to_index, ALL_CASTLING_RIGHTS, CASTLE_BLACK_K, CASTLE_BLACK_Q,
    CASTLE_WHITE_K, CASTLE_WHITE_Q, EMPTY_MOVE, MAX_MOVES, MAX_PLY, PROMOTION_PIECES,
};
