//! FEN parsing, emission, and structural validation (C10).

use super::error::FenError;
use super::position::Position;
use super::types::{CastlingRights, Color, Piece, Square};

/// Fill in trailing FEN fields with their standard defaults and check the
/// field count is within the 2-6 range the loader accepts. Returns the six
/// normalized fields: placement, side, castling, ep, halfmove, fullmove.
fn normalize_fields(fen_str: &str) -> Result<[String; 6], FenError> {
    let parts: Vec<&str> = fen_str.split_whitespace().collect();
    if !(2..=6).contains(&parts.len()) {
        return Err(FenError::TooFewParts { found: parts.len() });
    }

    let mut fields = [
        String::new(),
        String::new(),
        "-".to_string(),
        "-".to_string(),
        "0".to_string(),
        "1".to_string(),
    ];
    for (i, p) in parts.iter().enumerate() {
        fields[i] = (*p).to_string();
    }
    Ok(fields)
}

/// The full structural validator (C10): eleven checks over a normalized
/// (six-field) FEN string.
pub fn validate_fen(fen_str: &str) -> Result<(), FenError> {
    let fields = normalize_fields(fen_str)?;
    validate_fields(&fields)
}

fn validate_fields(fields: &[String; 6]) -> Result<(), FenError> {
    let ranks: Vec<&str> = fields[0].split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::WrongRankCount { found: ranks.len() });
    }

    let mut king_counts = [0usize; 2];
    for (rank_idx, rank_str) in ranks.iter().enumerate() {
        let mut files = 0usize;
        let mut prev_was_digit = false;
        for c in rank_str.chars() {
            if c.is_ascii_digit() {
                if prev_was_digit {
                    return Err(FenError::ConsecutiveDigits { rank: rank_idx });
                }
                prev_was_digit = true;
                files += c.to_digit(10).unwrap() as usize;
            } else {
                prev_was_digit = false;
                let piece = Piece::from_char(c).ok_or(FenError::InvalidPiece { char: c })?;
                let color = if c.is_uppercase() {
                    Color::White
                } else {
                    Color::Black
                };
                if piece == Piece::King {
                    king_counts[color.index()] += 1;
                }
                // FEN rank 0 in this split is board rank 8, rank 7 is board rank 1.
                if piece == Piece::Pawn && (rank_idx == 0 || rank_idx == 7) {
                    return Err(FenError::PawnOnBackRank { rank: 8 - rank_idx });
                }
                files += 1;
            }
            if files > 8 {
                return Err(FenError::TooManyFiles {
                    rank: rank_idx,
                    files,
                });
            }
        }
        if files != 8 {
            return Err(FenError::TooManyFiles {
                rank: rank_idx,
                files,
            });
        }
    }

    if king_counts[Color::White.index()] != 1 {
        return Err(FenError::WrongKingCount {
            color: Color::White,
            found: king_counts[Color::White.index()],
        });
    }
    if king_counts[Color::Black.index()] != 1 {
        return Err(FenError::WrongKingCount {
            color: Color::Black,
            found: king_counts[Color::Black.index()],
        });
    }

    let side = match fields[1].as_str() {
        "w" => Color::White,
        "b" => Color::Black,
        other => {
            return Err(FenError::InvalidSideToMove {
                found: other.to_string(),
            })
        }
    };

    for c in fields[2].chars() {
        if c != '-' && !"KQkq".contains(c) {
            return Err(FenError::InvalidCastling { char: c });
        }
    }

    if fields[3] != "-" {
        let chars: Vec<char> = fields[3].chars().collect();
        if chars.len() != 2 || !('a'..='h').contains(&chars[0]) || !('1'..='8').contains(&chars[1])
        {
            return Err(FenError::InvalidEnPassant {
                found: fields[3].clone(),
            });
        }
        let rank = chars[1];
        let expected_rank = if side == Color::White { '6' } else { '3' };
        if rank != expected_rank {
            return Err(FenError::IllegalEnPassant {
                square: fields[3].clone(),
            });
        }
    }

    if fields[4].parse::<u32>().is_err() {
        return Err(FenError::InvalidHalfmoveClock {
            found: fields[4].clone(),
        });
    }

    match fields[5].parse::<u32>() {
        Ok(n) if n >= 1 => {}
        _ => {
            return Err(FenError::InvalidMoveNumber {
                found: fields[5].clone(),
            })
        }
    }

    Ok(())
}

/// Parse a FEN string into a `Position`, assuming the caller has already run
/// (or deliberately skipped) `validate_fen`.
pub(crate) fn parse_fen(fen_str: &str) -> Result<Position, FenError> {
    let fields = normalize_fields(fen_str)?;
    let mut pos = Position::empty();

    for (rank_idx, rank_str) in fields[0].split('/').enumerate() {
        if rank_idx >= 8 {
            return Err(FenError::WrongRankCount { found: rank_idx + 1 });
        }
        let rank = 7 - rank_idx;
        let mut file = 0usize;
        for c in rank_str.chars() {
            if c.is_ascii_digit() {
                file += c.to_digit(10).unwrap() as usize;
            } else {
                let color = if c.is_uppercase() {
                    Color::White
                } else {
                    Color::Black
                };
                let piece = Piece::from_char(c).ok_or(FenError::InvalidPiece { char: c })?;
                if file >= 8 {
                    return Err(FenError::TooManyFiles {
                        rank: rank_idx,
                        files: file + 1,
                    });
                }
                pos.put(Square::new(rank, file), color, piece);
                file += 1;
            }
        }
    }

    match fields[1].as_str() {
        "w" => pos.set_side_to_move(Color::White),
        "b" => pos.set_side_to_move(Color::Black),
        other => {
            return Err(FenError::InvalidSideToMove {
                found: other.to_string(),
            })
        }
    }

    let mut rights = CastlingRights::none();
    for c in fields[2].chars() {
        match c {
            'K' => rights.set(Color::White, true),
            'Q' => rights.set(Color::White, false),
            'k' => rights.set(Color::Black, true),
            'q' => rights.set(Color::Black, false),
            '-' => {}
            other => return Err(FenError::InvalidCastling { char: other }),
        }
    }
    pos.set_castling(rights);

    if fields[3] != "-" {
        let ep: Square = fields[3].parse().map_err(|_| FenError::InvalidEnPassant {
            found: fields[3].clone(),
        })?;
        pos.set_fen_ep_square(Some(ep));
        if ep_is_capturable(&pos, ep, pos.side_to_move()) {
            pos.set_ep_square(Some(ep));
        }
    }

    let halfmove: u32 = fields[4]
        .parse()
        .map_err(|_| FenError::InvalidHalfmoveClock {
            found: fields[4].clone(),
        })?;
    pos.set_halfmove_clock(halfmove);

    let fullmove: u32 = fields[5]
        .parse()
        .map_err(|_| FenError::InvalidMoveNumber {
            found: fields[5].clone(),
        })?;
    pos.set_fullmove_number(fullmove);

    pos.seed_repetition();

    Ok(pos)
}

/// An en passant square is only wired into move generation when a pawn of
/// `capturing_side` actually sits beside it, matching the chess.js-compatible
/// behavior of never emitting a "phantom" ep square. Shared by FEN loading
/// (the side to move) and `make_move` (the mover's opponent).
pub(crate) fn ep_is_capturable(pos: &Position, ep: Square, capturing_side: Color) -> bool {
    let capture_rank = ep.rank();
    let pawn_rank = if capturing_side == Color::White {
        capture_rank.wrapping_sub(1)
    } else {
        capture_rank + 1
    };
    for df in [-1i32, 1i32] {
        let file = ep.file() as i32 + df;
        if !(0..8).contains(&file) {
            continue;
        }
        if let Some(sq) = Square::try_new(pawn_rank, file as usize) {
            if pos.get(sq) == Some((capturing_side, Piece::Pawn)) {
                return true;
            }
        }
    }
    false
}

/// Serialize a position to FEN.
///
/// When `force_enpassant_square` is false, the ep field is emitted exactly
/// when `Position::ep_square` is set (which this crate only sets when a
/// legal en passant capture exists). When true, the originally-loaded FEN
/// ep square (`fen_ep_square`) is emitted even if no capture is available,
/// matching chess.js's `{ forceEnpassantSquare: true }` option.
pub(crate) fn to_fen(pos: &Position, force_enpassant_square: bool) -> String {
    let mut placement = String::new();
    for rank in (0..8).rev() {
        let mut empty_run = 0;
        for file in 0..8 {
            match pos.get(Square::new(rank, file)) {
                Some((color, piece)) => {
                    if empty_run > 0 {
                        placement.push_str(&empty_run.to_string());
                        empty_run = 0;
                    }
                    placement.push(piece.to_fen_char(color));
                }
                None => empty_run += 1,
            }
        }
        if empty_run > 0 {
            placement.push_str(&empty_run.to_string());
        }
        if rank > 0 {
            placement.push('/');
        }
    }

    let side = if pos.side_to_move() == Color::White {
        "w"
    } else {
        "b"
    };

    let rights = pos.castling_rights();
    let mut castling = String::new();
    if rights.has(Color::White, true) {
        castling.push('K');
    }
    if rights.has(Color::White, false) {
        castling.push('Q');
    }
    if rights.has(Color::Black, true) {
        castling.push('k');
    }
    if rights.has(Color::Black, false) {
        castling.push('q');
    }
    if castling.is_empty() {
        castling.push('-');
    }

    let ep = if force_enpassant_square {
        pos.fen_ep_square()
    } else {
        pos.ep_square()
    };
    let ep_str = ep.map_or_else(|| "-".to_string(), |sq| sq.to_string());

    format!(
        "{} {} {} {} {} {}",
        placement,
        side,
        castling,
        ep_str,
        pos.halfmove_clock(),
        pos.fullmove_number()
    )
}
