//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and functions.
//!
//! # Example
//! ```
//! use chessbook::board::prelude::*;
//! ```

pub use super::{
    CastlingRights, Color, FenError, InternalMove, MoveError, MoveFlags, MoveList, MoveParseError,
    Piece, Position, SanError, Square, SquareError,
};
