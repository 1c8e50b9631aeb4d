//! Standard Algebraic Notation (SAN) support.
//!
//! SAN is the standard human-readable chess notation used in scoresheets,
//! books, and GUIs. Examples: "e4", "Nf3", "Bxc6+", "O-O", "e8=Q#".

use super::error::SanError;
use super::make_unmake::make_move;
use super::position::Position;
use super::types::{InternalMove, Piece, Square};

type SanParseResult = (Option<usize>, Option<usize>, Vec<char>, Option<Piece>);

impl Position {
    /// Format a move in Standard Algebraic Notation.
    ///
    /// Returns notation like "e4", "Nf3", "Bxc6+", "O-O-O", "e8=Q#". The move
    /// must be legal in this position; check/checkmate suffixes are derived
    /// by playing the move on a scratch copy.
    #[must_use]
    pub fn move_to_san(&self, mv: InternalMove) -> String {
        let mut san = String::new();

        if mv.is_castling() {
            san.push_str(if mv.is_kingside_castle() { "O-O" } else { "O-O-O" });
        } else {
            if mv.piece != Piece::Pawn {
                san.push(mv.piece.to_char().to_ascii_uppercase());
                let (needs_file, needs_rank) = self.needs_disambiguation(mv);
                if needs_file {
                    san.push((b'a' + mv.from.file() as u8) as char);
                }
                if needs_rank {
                    san.push((b'1' + mv.from.rank() as u8) as char);
                }
            } else if mv.is_capture() {
                san.push((b'a' + mv.from.file() as u8) as char);
            }

            if mv.is_capture() {
                san.push('x');
            }

            san.push_str(&mv.to.to_string());

            if let Some(promo) = mv.promotion {
                san.push('=');
                san.push(promo.to_char().to_ascii_uppercase());
            }
        }

        let mut scratch = self.clone();
        make_move(&mut scratch, mv);
        let mover = scratch.side_to_move();
        if scratch.is_checkmate() {
            san.push('#');
        } else if scratch.is_in_check(mover) {
            san.push('+');
        }

        san
    }

    /// Whether `mv`'s source square needs a disambiguating file and/or rank:
    /// true when another legal move of the same piece type reaches the same
    /// destination.
    fn needs_disambiguation(&self, mv: InternalMove) -> (bool, bool) {
        let others: Vec<InternalMove> = self
            .generate_legal_moves()
            .iter()
            .filter(|m| m.to == mv.to && m.piece == mv.piece && m.from != mv.from)
            .copied()
            .collect();

        if others.is_empty() {
            return (false, false);
        }

        let same_file = others.iter().any(|m| m.from.file() == mv.from.file());
        let same_rank = others.iter().any(|m| m.from.rank() == mv.from.rank());

        match (same_file, same_rank) {
            (false, _) => (true, false),
            (true, false) => (false, true),
            (true, true) => (true, true),
        }
    }

    /// Parse a move in Standard Algebraic Notation against this position's
    /// legal moves.
    ///
    /// Accepts notation like "e4", "Nf3", "Bxc6", "O-O", "e8=Q" with optional
    /// check/checkmate suffixes (+, #), which are ignored. Tries a strict
    /// parse first; when that fails and `strict` is false, falls back to a
    /// permissive decode that also accepts forms like "Rc1c4", "Qf3xf7",
    /// "f7f8q" and "b1c3".
    pub fn parse_san(&self, san: &str, strict: bool) -> Result<InternalMove, SanError> {
        let trimmed = san.trim();
        if trimmed.is_empty() {
            return Err(SanError::Empty);
        }
        let stripped = trimmed.trim_end_matches(['=', '+', '#', '?', '!']);
        if stripped.is_empty() {
            return Err(SanError::Empty);
        }

        match self.parse_san_strict(stripped) {
            Ok(mv) => Ok(mv),
            Err(strict_err) => {
                if strict {
                    Err(strict_err)
                } else {
                    self.parse_san_permissive(stripped)
                }
            }
        }
    }

    fn parse_san_strict(&self, san: &str) -> Result<InternalMove, SanError> {
        if san == "O-O" || san == "0-0" {
            return self.find_castling_move(true);
        }
        if san == "O-O-O" || san == "0-0-0" {
            return self.find_castling_move(false);
        }

        let chars: Vec<char> = san.chars().collect();
        if chars.is_empty() {
            return Err(SanError::Empty);
        }

        let (piece, rest) = if chars[0].is_ascii_uppercase() {
            let p = Piece::from_char(chars[0]).ok_or(SanError::InvalidPiece { char: chars[0] })?;
            (p, &chars[1..])
        } else {
            (Piece::Pawn, &chars[..])
        };

        let (disambig_file, disambig_rank, dest_str, promotion) = parse_san_move_str(rest)?;

        if dest_str.len() != 2 {
            return Err(SanError::InvalidSquare {
                notation: dest_str.iter().collect(),
            });
        }
        let dest_file = dest_str[0] as usize - 'a' as usize;
        let dest_rank = dest_str[1] as usize - '1' as usize;
        if dest_file >= 8 || dest_rank >= 8 {
            return Err(SanError::InvalidSquare {
                notation: dest_str.iter().collect(),
            });
        }
        let dest = Square::new(dest_rank, dest_file);

        self.find_san_move(piece, dest, disambig_file, disambig_rank, promotion, san)
    }

    /// Permissive fallback for the second SAN decode pass: accepts an
    /// explicit source square or file/rank, an optional 'x' or '-'
    /// separator, and a lowercase or uppercase promotion letter, e.g.
    /// "Pe2-e4", "Rc1c4", "Qf3xf7", "f7f8q", "b1c3". Ambiguous matches
    /// resolve to the first legal move encountered.
    fn parse_san_permissive(&self, san: &str) -> Result<InternalMove, SanError> {
        let chars: Vec<char> = san.chars().collect();
        if chars.is_empty() {
            return Err(SanError::Empty);
        }

        // Unlike the strict pass, an omitted piece letter here does not mean
        // "pawn" — bare coordinate forms like "b1c3" name no piece at all,
        // so the source/destination squares alone must carry the match.
        let (piece, rest) = if chars[0].is_ascii_uppercase() && "PNBRQK".contains(chars[0]) {
            let p = Piece::from_char(chars[0]).ok_or(SanError::InvalidPiece { char: chars[0] })?;
            (Some(p), &chars[1..])
        } else {
            (None, &chars[..])
        };

        let permissive_match = match_permissive_form(rest)
            .ok_or_else(|| SanError::InvalidSquare { notation: san.to_string() })?;
        let PermissiveMatch { disambig_file, disambig_rank, dest_file, dest_rank, promotion } =
            permissive_match;
        let dest = Square::new(dest_rank, dest_file);

        self.find_san_move_first_match(piece, dest, disambig_file, disambig_rank, promotion, san)
    }

    fn find_castling_move(&self, kingside: bool) -> Result<InternalMove, SanError> {
        let moves = self.generate_legal_moves();
        for mv in moves.iter() {
            if kingside && mv.is_kingside_castle() {
                return Ok(*mv);
            }
            if !kingside && mv.is_queenside_castle() {
                return Ok(*mv);
            }
        }
        Err(SanError::NoMatchingMove {
            san: if kingside { "O-O" } else { "O-O-O" }.to_string(),
        })
    }

    fn find_san_move(
        &self,
        piece: Piece,
        dest: Square,
        disambig_file: Option<usize>,
        disambig_rank: Option<usize>,
        promotion: Option<Piece>,
        san: &str,
    ) -> Result<InternalMove, SanError> {
        let moves = self.generate_legal_moves();
        let mut matching: Vec<InternalMove> = Vec::new();

        for mv in moves.iter() {
            if mv.to != dest || mv.piece != piece || mv.promotion != promotion {
                continue;
            }
            if let Some(file) = disambig_file {
                if mv.from.file() != file {
                    continue;
                }
            }
            if let Some(rank) = disambig_rank {
                if mv.from.rank() != rank {
                    continue;
                }
            }
            matching.push(*mv);
        }

        match matching.len() {
            0 => Err(SanError::NoMatchingMove { san: san.to_string() }),
            1 => Ok(matching[0]),
            _ => Err(SanError::AmbiguousMove { san: san.to_string() }),
        }
    }

    /// Like `find_san_move`, but returns the first legal move matching the
    /// permissive form instead of erroring on ambiguity. `piece` is `None`
    /// for bare coordinate forms ("b1c3"), which match any piece type.
    fn find_san_move_first_match(
        &self,
        piece: Option<Piece>,
        dest: Square,
        disambig_file: Option<usize>,
        disambig_rank: Option<usize>,
        promotion: Option<Piece>,
        san: &str,
    ) -> Result<InternalMove, SanError> {
        let moves = self.generate_legal_moves();

        for mv in moves.iter() {
            if mv.to != dest || mv.promotion != promotion {
                continue;
            }
            if let Some(p) = piece {
                if mv.piece != p {
                    continue;
                }
            }
            if let Some(file) = disambig_file {
                if mv.from.file() != file {
                    continue;
                }
            }
            if let Some(rank) = disambig_rank {
                if mv.from.rank() != rank {
                    continue;
                }
            }
            return Ok(*mv);
        }

        Err(SanError::NoMatchingMove { san: san.to_string() })
    }

    /// Parse a SAN move and play it, returning the move that was made.
    pub fn make_move_san(&mut self, san: &str, strict: bool) -> Result<InternalMove, SanError> {
        let mv = self.parse_san(san, strict)?;
        make_move(self, mv);
        Ok(mv)
    }
}

/// One permissive-form match: destination square plus whatever
/// disambiguation and promotion the source text carried.
struct PermissiveMatch {
    disambig_file: Option<usize>,
    disambig_rank: Option<usize>,
    dest_file: usize,
    dest_rank: usize,
    promotion: Option<Piece>,
}

/// Source-square alternatives tried in the order the permissive grammar's
/// regex alternation (`[a-h][1-8]|[a-h]|[1-8]`) would try them.
enum SourceForm {
    Square,
    File,
    Rank,
    None,
}

/// Match `chars` (the SAN text after any leading piece letter has been
/// consumed) against the permissive grammar: an optional source square,
/// file, or rank; an optional 'x' or '-'; a destination square; and an
/// optional promotion letter.
fn match_permissive_form(chars: &[char]) -> Option<PermissiveMatch> {
    for form in [SourceForm::Square, SourceForm::File, SourceForm::Rank, SourceForm::None] {
        let src_len = match form {
            SourceForm::Square => 2,
            SourceForm::File | SourceForm::Rank => 1,
            SourceForm::None => 0,
        };
        if chars.len() < src_len {
            continue;
        }
        let src = &chars[..src_len];
        let (disambig_file, disambig_rank) = match form {
            SourceForm::Square => {
                if !is_file_char(src[0]) || !is_rank_char(src[1]) {
                    continue;
                }
                (Some(file_index(src[0])), Some(rank_index(src[1])))
            }
            SourceForm::File => {
                if !is_file_char(src[0]) {
                    continue;
                }
                (Some(file_index(src[0])), None)
            }
            SourceForm::Rank => {
                if !is_rank_char(src[0]) {
                    continue;
                }
                (None, Some(rank_index(src[0])))
            }
            SourceForm::None => (None, None),
        };

        let mut rest = &chars[src_len..];
        if rest.first() == Some(&'x') {
            rest = &rest[1..];
        }
        if rest.first() == Some(&'-') {
            rest = &rest[1..];
        }

        if rest.len() == 2 && is_file_char(rest[0]) && is_rank_char(rest[1]) {
            return Some(PermissiveMatch {
                disambig_file,
                disambig_rank,
                dest_file: file_index(rest[0]),
                dest_rank: rank_index(rest[1]),
                promotion: None,
            });
        }
        if rest.len() == 3 && is_file_char(rest[0]) && is_rank_char(rest[1]) {
            if let Some(promotion) = Piece::from_char(rest[2]).filter(|p| *p != Piece::Pawn && *p != Piece::King) {
                return Some(PermissiveMatch {
                    disambig_file,
                    disambig_rank,
                    dest_file: file_index(rest[0]),
                    dest_rank: rank_index(rest[1]),
                    promotion: Some(promotion),
                });
            }
        }
    }

    None
}

fn is_file_char(c: char) -> bool {
    ('a'..='h').contains(&c)
}

fn is_rank_char(c: char) -> bool {
    ('1'..='8').contains(&c)
}

fn file_index(c: char) -> usize {
    c as usize - 'a' as usize
}

fn rank_index(c: char) -> usize {
    c as usize - '1' as usize
}

/// Parse SAN components after the piece letter: disambiguation file/rank,
/// destination square characters, and promotion piece. Capture markers
/// ('x') are consumed but not reported — captures are derived by comparing
/// the destination against the board once the move is matched.
fn parse_san_move_str(chars: &[char]) -> Result<SanParseResult, SanError> {
    let mut idx = 0;
    let mut disambig_file = None;
    let mut disambig_rank = None;
    let mut dest = Vec::new();
    let mut promotion = None;

    while idx < chars.len() {
        let c = chars[idx];

        if c == 'x' {
            idx += 1;
        } else if c == '=' {
            idx += 1;
            if idx < chars.len() {
                let promo_char = chars[idx];
                promotion = Some(
                    Piece::from_char(promo_char).ok_or(SanError::InvalidPromotion { char: promo_char })?,
                );
                idx += 1;
            }
        } else if c.is_ascii_lowercase() && idx + 1 < chars.len() {
            let next = chars[idx + 1];
            if next.is_ascii_digit() {
                dest.push(c);
                dest.push(next);
                idx += 2;
            } else if next == 'x' || next.is_ascii_lowercase() {
                disambig_file = Some(c as usize - 'a' as usize);
                idx += 1;
            } else {
                dest.push(c);
                idx += 1;
            }
        } else if c.is_ascii_digit() && dest.is_empty() {
            disambig_rank = Some(c as usize - '1' as usize);
            idx += 1;
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() {
            dest.push(c);
            idx += 1;
        } else {
            idx += 1;
        }
    }

    Ok((disambig_file, disambig_rank, dest, promotion))
}
