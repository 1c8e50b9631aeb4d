// Crate root - export modules
pub mod board;
pub mod error;
pub mod game;
pub mod pgn;

pub use board::Position;
pub use error::{HeaderError, PgnError, SuffixError};
pub use game::{Game, HistoryEntry};
pub use pgn::{Cursor, CursorConfig, GameIndex, GameRecord, Headers as RawHeaders};
