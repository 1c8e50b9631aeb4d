//! Two-phase PGN reading: an O(N) byte-offset Indexer plus a lazy, caching
//! Cursor, with an optional worker pool for parallel parsing.

mod cursor;
pub mod grammar;
pub mod header_scanner;
mod indexer;
mod worker_pool;

pub use cursor::{Cursor, CursorConfig};
pub use indexer::{index_games, GameIndex};
pub use worker_pool::WorkerPool;

use crate::error::PgnError;
use crate::game::Game;
use grammar::ParsedGame;

/// Headers as scanned by the Indexer/Header Scanner: plain ordered string
/// pairs, distinct from `game::Headers`, which distinguishes the Seven Tag
/// Roster fields from supplemental tags once a `Game` is constructed.
pub type Headers = Vec<(String, String)>;

/// A fully parsed game together with the game index it came from, as
/// handed back by a `Cursor` or the worker pool.
#[derive(Clone, Debug)]
pub struct GameRecord {
    pub index: usize,
    pub game: Game,
}

/// Replay a parsed move tree's main line into a fresh `Game`, applying any
/// `SetUp`/`FEN` header pair first and attaching each node's comment and
/// NAG to the FEN reached after that move.
pub(crate) fn build_game(parsed: &ParsedGame, strict: bool) -> Result<Game, PgnError> {
    let fen = parsed.headers.iter().find(|(k, _)| k == "FEN").map(|(_, v)| v.clone());

    let mut game = match fen {
        Some(fen) => Game::from_fen(&fen).map_err(|e| PgnError::Grammar {
            offset: 0,
            message: format!("invalid FEN header: {e}"),
        })?,
        None => Game::new(),
    };

    for (name, value) in &parsed.headers {
        let _ = game.set_header(name, value);
    }
    let _ = game.set_header("Result", &parsed.result);

    for (ply, node) in parsed.main_line.iter().enumerate() {
        game.make_move_san(&node.san, strict).map_err(|_| PgnError::Semantic {
            san: node.san.clone(),
            ply,
        })?;
        let fen_after = game.history().last().expect("move was just made").fen_after.clone();
        if let Some(comment) = &node.comment {
            game.set_comment(&fen_after, comment);
        }
        if let Some(nag) = node.suffix {
            let _ = game.set_suffix_annotation(&fen_after, &format!("${nag}"));
        }
    }

    Ok(game)
}

/// Parse one game's PGN text end to end: grammar, then replay into a
/// `Game`. On a grammar failure that looks like a header-quoting issue,
/// retries with the fallback strategy from §4.8: reparse only the
/// movetext under a synthetic `[Event "_"]` header, then graft in the
/// headers already scanned by the Indexer.
pub(crate) fn parse_game(pgn: &str, scanned_headers: &[(String, String)], strict: bool) -> Result<Game, PgnError> {
    match grammar::parse(pgn, strict) {
        Ok(parsed) => build_game(&parsed, strict),
        Err(first_err) if looks_like_header_quoting_issue(&first_err) => {
            let movetext = movetext_region(pgn);
            let synthetic = format!("[Event \"_\"]\n\n{movetext}");
            let mut parsed = grammar::parse(&synthetic, strict)?;
            parsed.headers = scanned_headers.to_vec();
            build_game(&parsed, strict)
        }
        Err(e) => Err(e),
    }
}

fn looks_like_header_quoting_issue(err: &PgnError) -> bool {
    matches!(err, PgnError::Grammar { message, .. } if message.contains("'[' found"))
}

fn movetext_region(pgn: &str) -> &str {
    let (_, offset) = header_scanner::scan_header_block(pgn);
    &pgn[offset..]
}
