//! `Game`: a `Position` plus PGN-level state — move history, the Seven Tag
//! Roster and supplemental headers, per-position comments, and NAG suffix
//! annotations. Mirrors how the engine crate's `Board` owns its own undo
//! information directly rather than through a separate history object: a
//! `Game` owns its `Position` and an append-only `Vec<HistoryEntry>`.

use std::collections::HashMap;

use crate::board::position::PositionDelta;
use crate::board::{self, FenError, InternalMove, Position, SanError};
use crate::error::{HeaderError, SuffixError};

const SEVEN_TAG_ROSTER: [&str; 7] = ["Event", "Site", "Date", "Round", "White", "Black", "Result"];

/// One applied ply: the move, its SAN at the time it was played, and the FEN
/// immediately before and after — comments and suffix annotations are keyed
/// by `fen_after` so they survive `undo`/replay rather than tracking a
/// history index.
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    pub mv: InternalMove,
    pub san: String,
    pub fen_before: String,
    pub fen_after: String,
    delta: PositionDelta,
}

/// The Seven Tag Roster plus an ordered list of supplemental tag pairs.
#[derive(Clone, Debug)]
pub struct Headers {
    event: String,
    site: String,
    date: String,
    round: String,
    white: String,
    black: String,
    result: String,
    supplemental: Vec<(String, String)>,
}

impl Default for Headers {
    fn default() -> Self {
        Headers {
            event: "?".to_string(),
            site: "?".to_string(),
            date: "????.??.??".to_string(),
            round: "?".to_string(),
            white: "?".to_string(),
            black: "?".to_string(),
            result: "*".to_string(),
            supplemental: Vec::new(),
        }
    }
}

impl Headers {
    fn field_mut(&mut self, name: &str) -> Option<&mut String> {
        match name {
            "Event" => Some(&mut self.event),
            "Site" => Some(&mut self.site),
            "Date" => Some(&mut self.date),
            "Round" => Some(&mut self.round),
            "White" => Some(&mut self.white),
            "Black" => Some(&mut self.black),
            "Result" => Some(&mut self.result),
            _ => None,
        }
    }

    fn default_for(name: &str) -> &'static str {
        match name {
            "Event" | "Round" | "White" | "Black" | "Site" => "?",
            "Date" => "????.??.??",
            "Result" => "*",
            _ => "",
        }
    }

    /// Set a header value. Seven Tag Roster keys overwrite their field;
    /// any other key is upserted into the supplemental list, preserving
    /// first-seen insertion order. Rejects tag names outside PGN's
    /// `[A-Za-z0-9_]+` tag-name grammar.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(HeaderError::InvalidTagName { tag: name.to_string() });
        }
        if let Some(field) = self.field_mut(name) {
            *field = value.to_string();
            return Ok(());
        }
        if let Some(entry) = self.supplemental.iter_mut().find(|(k, _)| k == name) {
            entry.1 = value.to_string();
        } else {
            self.supplemental.push((name.to_string(), value.to_string()));
        }
        Ok(())
    }

    /// Remove a header. Seven Tag Roster keys are restored to their default
    /// rather than deleted (a PGN always carries all seven). Returns whether
    /// the key previously held a non-default / any value.
    pub fn remove(&mut self, name: &str) -> bool {
        if SEVEN_TAG_ROSTER.contains(&name) {
            let default = Headers::default_for(name);
            let field = self.field_mut(name).expect("roster key has a field");
            let changed = field != default;
            *field = default.to_string();
            return changed;
        }
        let before = self.supplemental.len();
        self.supplemental.retain(|(k, _)| k != name);
        self.supplemental.len() != before
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        match name {
            "Event" => Some(&self.event),
            "Site" => Some(&self.site),
            "Date" => Some(&self.date),
            "Round" => Some(&self.round),
            "White" => Some(&self.white),
            "Black" => Some(&self.black),
            "Result" => Some(&self.result),
            other => self
                .supplemental
                .iter()
                .find(|(k, _)| k == other)
                .map(|(_, v)| v.as_str()),
        }
    }

    /// All headers in canonical PGN emission order: the Seven Tag Roster
    /// first, then supplemental tags in insertion order.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut out = vec![
            ("Event".to_string(), self.event.clone()),
            ("Site".to_string(), self.site.clone()),
            ("Date".to_string(), self.date.clone()),
            ("Round".to_string(), self.round.clone()),
            ("White".to_string(), self.white.clone()),
            ("Black".to_string(), self.black.clone()),
            ("Result".to_string(), self.result.clone()),
        ];
        out.extend(self.supplemental.iter().cloned());
        out
    }
}

/// Canonical NAG glyphs, in the order `$1`..`$6`.
const NAG_GLYPHS: [(&str, u8); 6] = [
    ("!", 1),
    ("?", 2),
    ("!!", 3),
    ("??", 4),
    ("!?", 5),
    ("?!", 6),
];

fn parse_suffix(token: &str) -> Result<u8, SuffixError> {
    if let Some(rest) = token.strip_prefix('$') {
        let value: i64 = rest
            .parse()
            .map_err(|_| SuffixError::UnrecognizedSuffix { token: token.to_string() })?;
        if !(0..=255).contains(&value) {
            return Err(SuffixError::NagOutOfRange { value });
        }
        return Ok(value as u8);
    }
    NAG_GLYPHS
        .iter()
        .find(|(glyph, _)| *glyph == token)
        .map(|(_, nag)| *nag)
        .ok_or_else(|| SuffixError::UnrecognizedSuffix { token: token.to_string() })
}

fn render_suffix(nag: u8) -> String {
    NAG_GLYPHS
        .iter()
        .find(|(_, n)| *n == nag)
        .map_or_else(|| format!("${nag}"), |(glyph, _)| (*glyph).to_string())
}

/// A chess game: a position plus PGN-level bookkeeping built on top of it.
///
/// `!Sync` by convention, matching `Position`: a `Game` has no internal
/// locking and sharing it across threads without external synchronization
/// is a misuse this crate does not protect against.
#[derive(Clone, Debug)]
pub struct Game {
    position: Position,
    start_fen: String,
    start_side_to_move: board::Color,
    start_move_number: u32,
    history: Vec<HistoryEntry>,
    headers: Headers,
    comments: HashMap<String, String>,
    suffixes: HashMap<String, u8>,
}

impl Game {
    /// A new game from the standard starting position.
    #[must_use]
    pub fn new() -> Self {
        let position = Position::new();
        let start_fen = position.fen(false);
        let start_side_to_move = position.side_to_move();
        let start_move_number = position.fullmove_number();
        Game {
            position,
            start_fen,
            start_side_to_move,
            start_move_number,
            history: Vec::new(),
            headers: Headers::default(),
            comments: HashMap::new(),
            suffixes: HashMap::new(),
        }
    }

    /// A game starting from an arbitrary FEN. Sets the `SetUp`/`FEN`
    /// supplemental headers unconditionally, per the PGN convention that a
    /// non-standard starting position is recorded that way.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let position = Position::from_fen(fen)?;
        let start_fen = position.fen(true);
        let start_side_to_move = position.side_to_move();
        let start_move_number = position.fullmove_number();
        let mut headers = Headers::default();
        headers.set("SetUp", "1").expect("literal tag name is valid");
        headers.set("FEN", &start_fen).expect("literal tag name is valid");
        Ok(Game {
            position,
            start_fen,
            start_side_to_move,
            start_move_number,
            history: Vec::new(),
            headers,
            comments: HashMap::new(),
            suffixes: HashMap::new(),
        })
    }

    /// Replace the position with one loaded from `fen`, clearing history,
    /// comments, and suffix annotations, and unconditionally setting the
    /// `SetUp`/`FEN` headers to reflect the new start — matching the engine
    /// crate's convention that a FEN load always re-asserts full board
    /// state rather than merging with whatever was there before.
    pub fn load(&mut self, fen: &str, skip_validation: bool) -> Result<(), FenError> {
        let position = Position::load(fen, skip_validation)?;
        self.start_fen = position.fen(true);
        self.start_side_to_move = position.side_to_move();
        self.start_move_number = position.fullmove_number();
        self.position = position;
        self.history.clear();
        self.comments.clear();
        self.suffixes.clear();
        self.headers.set("SetUp", "1").expect("literal tag name is valid");
        self.headers
            .set("FEN", &self.start_fen.clone())
            .expect("literal tag name is valid");
        Ok(())
    }

    /// Return to the standard starting position, clearing history,
    /// comments, suffix annotations, and the `SetUp`/`FEN` headers.
    pub fn reset(&mut self) {
        self.position = Position::new();
        self.start_fen = self.position.fen(false);
        self.start_side_to_move = self.position.side_to_move();
        self.start_move_number = self.position.fullmove_number();
        self.history.clear();
        self.comments.clear();
        self.suffixes.clear();
        self.headers.remove("SetUp");
        self.headers.remove("FEN");
    }

    #[must_use]
    pub fn position(&self) -> &Position {
        &self.position
    }

    #[must_use]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Apply an already-legal move, recording a history entry keyed by the
    /// FEN reached. Callers that have a SAN string should prefer
    /// `make_move_san`, which also validates legality.
    pub fn make_move(&mut self, mv: InternalMove) -> InternalMove {
        let fen_before = self.position.fen(false);
        let san = self.position.move_to_san(mv);
        let delta = board::make_move(&mut self.position, mv);
        let fen_after = self.position.fen(false);
        self.history.push(HistoryEntry {
            mv,
            san,
            fen_before,
            fen_after,
            delta,
        });
        mv
    }

    /// Parse `san` against the current position's legal moves and play it.
    /// `strict` disables the permissive SAN fallback (see `Position::parse_san`).
    pub fn make_move_san(&mut self, san: &str, strict: bool) -> Result<InternalMove, SanError> {
        let mv = self.position.parse_san(san, strict)?;
        Ok(self.make_move(mv))
    }

    /// Undo the last move, if any, restoring the position it was played
    /// from.
    pub fn undo(&mut self) -> Option<InternalMove> {
        let entry = self.history.pop()?;
        board::unmake_move(&mut self.position, entry.mv, entry.delta);
        Some(entry.mv)
    }

    pub fn set_header(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        self.headers.set(name, value)
    }

    pub fn remove_header(&mut self, name: &str) -> bool {
        self.headers.remove(name)
    }

    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    #[must_use]
    pub fn headers(&self) -> Vec<(String, String)> {
        self.headers.entries()
    }

    pub fn set_comment(&mut self, fen: &str, comment: &str) {
        self.comments.insert(fen.to_string(), comment.to_string());
    }

    #[must_use]
    pub fn get_comment(&self, fen: &str) -> Option<&str> {
        self.comments.get(fen).map(String::as_str)
    }

    pub fn remove_comment(&mut self, fen: &str) -> bool {
        self.comments.remove(fen).is_some()
    }

    pub fn set_suffix_annotation(&mut self, fen: &str, token: &str) -> Result<(), SuffixError> {
        let nag = parse_suffix(token)?;
        self.suffixes.insert(fen.to_string(), nag);
        Ok(())
    }

    #[must_use]
    pub fn get_suffix_annotation(&self, fen: &str) -> Option<String> {
        self.suffixes.get(fen).copied().map(render_suffix)
    }

    pub fn remove_suffix_annotation(&mut self, fen: &str) -> bool {
        self.suffixes.remove(fen).is_some()
    }

    /// Drop every comment and suffix annotation whose key FEN is no longer
    /// reachable from the start position along the current history —
    /// the only correct policy after `undo` has orphaned entries from an
    /// abandoned branch.
    pub fn prune_comments(&mut self) {
        let mut reachable: std::collections::HashSet<&str> = std::collections::HashSet::new();
        reachable.insert(self.start_fen.as_str());
        for entry in &self.history {
            reachable.insert(entry.fen_after.as_str());
        }
        self.comments.retain(|k, _| reachable.contains(k.as_str()));
        self.suffixes.retain(|k, _| reachable.contains(k.as_str()));
    }

    /// Render the full game as PGN text.
    ///
    /// `max_width`, if nonzero, wraps movetext tokens so no line exceeds
    /// that width; a token is never split mid-token, so a `{...}` comment
    /// is always kept whole on one side of a wrap.
    #[must_use]
    pub fn pgn(&self, newline: &str, max_width: usize) -> String {
        let mut out = String::new();
        for (name, value) in self.headers.entries() {
            out.push_str(&format!("[{name} \"{}\"]{newline}", escape_header_value(&value)));
        }

        let tokens = self.movetext_tokens();
        if tokens.is_empty() {
            return out;
        }

        out.push_str(newline);
        out.push_str(&wrap_tokens(&tokens, max_width, newline));
        out
    }

    fn movetext_tokens(&self) -> Vec<String> {
        let mut tokens = Vec::new();
        let black_starts = self.start_side_to_move == board::Color::Black;
        let mut move_number = self.start_move_number;

        for (i, entry) in self.history.iter().enumerate() {
            let is_white_move = if black_starts { i % 2 == 1 } else { i % 2 == 0 };
            if is_white_move {
                tokens.push(format!("{move_number}."));
            } else if i == 0 && black_starts {
                tokens.push(format!("{move_number}..."));
            }

            let mut token = entry.san.clone();
            if let Some(nag) = self.suffixes.get(&entry.fen_after) {
                token.push_str(&render_suffix(*nag));
            }
            tokens.push(token);

            if let Some(comment) = self.comments.get(&entry.fen_after) {
                tokens.push(format!("{{{comment}}}"));
            }

            if !is_white_move {
                move_number += 1;
            }
        }

        tokens.push(self.headers.result.clone());
        tokens
    }
}

impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}

fn escape_header_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn wrap_tokens(tokens: &[String], max_width: usize, newline: &str) -> String {
    if max_width == 0 {
        return tokens.join(" ") + newline;
    }

    let mut out = String::new();
    let mut line_len = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        let sep_len = if i == 0 { 0 } else { 1 };
        if i > 0 && line_len + sep_len + token.len() > max_width {
            while out.ends_with(' ') {
                out.pop();
            }
            out.push_str(newline);
            line_len = 0;
        } else if i > 0 {
            out.push(' ');
            line_len += 1;
        }
        out.push_str(token);
        line_len += token.len();
    }
    out.push_str(newline);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_game_has_default_headers() {
        let game = Game::new();
        assert_eq!(game.get_header("Event"), Some("?"));
        assert_eq!(game.get_header("Result"), Some("*"));
    }

    #[test]
    fn make_move_records_history() {
        let mut game = Game::new();
        game.make_move_san("e4", false).unwrap();
        assert_eq!(game.history().len(), 1);
        assert_eq!(game.history()[0].san, "e4");
    }

    #[test]
    fn undo_restores_previous_position() {
        let mut game = Game::new();
        let before = game.position().fen(false);
        game.make_move_san("e4", false).unwrap();
        game.undo();
        assert_eq!(game.position().fen(false), before);
        assert!(game.history().is_empty());
    }

    #[test]
    fn fools_mate_reaches_checkmate_and_pgn_contains_moves() {
        let mut game = Game::new();
        for san in ["f3", "e6", "g4", "Qh4"] {
            game.make_move_san(san, false).unwrap();
        }
        assert!(game.position().is_checkmate());
        let pgn = game.pgn("\n", 0);
        assert!(pgn.contains("1. f3 e6 2. g4 Qh4#"));
    }

    #[test]
    fn comment_survives_and_orphan_is_pruned_after_undo() {
        let mut game = Game::new();
        game.make_move_san("e4", false).unwrap();
        let fen_after = game.history()[0].fen_after.clone();
        game.set_comment(&fen_after, "best by test");
        game.undo();
        game.prune_comments();
        assert!(game.get_comment(&fen_after).is_none());
    }

    #[test]
    fn remove_header_restores_seven_tag_default() {
        let mut game = Game::new();
        game.set_header("Event", "Candidates").unwrap();
        assert!(game.remove_header("Event"));
        assert_eq!(game.get_header("Event"), Some("?"));
    }

    #[test]
    fn suffix_annotation_round_trips_through_pgn() {
        let mut game = Game::new();
        game.make_move_san("e4", false).unwrap();
        let fen_after = game.history()[0].fen_after.clone();
        game.set_suffix_annotation(&fen_after, "!!").unwrap();
        let pgn = game.pgn("\n", 0);
        assert!(pgn.contains("e4!!"));
    }
}
