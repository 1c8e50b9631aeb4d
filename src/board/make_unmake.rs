//! Applying and reversing moves against a `Position`.
//!
//! `make_move` mutates a `Position` in place and returns the scalar snapshot
//! (`PositionDelta`) taken *before* the mutation. `unmake_move` takes that
//! same snapshot plus the move that was played and restores the position:
//! piece placement is undone by inverting the move's own effect (moving the
//! piece back, re-placing anything captured, reversing the rook step of a
//! castle), while castling rights / en passant / half-move clock / hash come
//! back from the snapshot rather than being recomputed, since they are not
//! otherwise recoverable from the move alone.

use super::fen::ep_is_capturable;
use super::position::{Position, PositionDelta};
use super::types::{Color, InternalMove, Piece, Square};

/// Apply a move to `pos`, returning the state needed to undo it.
///
/// Callers are expected to have already verified the move is at least
/// pseudo-legal; this function does not re-validate piece placement.
pub(crate) fn make_move(pos: &mut Position, mv: InternalMove) -> PositionDelta {
    let delta = pos.snapshot();
    let color = pos.side_to_move();

    pos.set_ep_square(None);

    if mv.is_castling() {
        apply_castle(pos, mv, color);
    } else if mv.is_en_passant() {
        let captured_sq = ep_capture_square(mv.to, color);
        pos.remove(captured_sq);
        pos.remove(mv.from);
        pos.put(mv.to, color, Piece::Pawn);
    } else {
        pos.remove(mv.from);
        let placed = mv.promotion.unwrap_or(mv.piece);
        pos.put(mv.to, color, placed);
    }

    if mv.is_big_pawn() {
        let ep_rank = (mv.from.rank() + mv.to.rank()) / 2;
        let ep = Square::new(ep_rank, mv.from.file());
        if ep_is_capturable(pos, ep, color.opponent()) {
            pos.set_ep_square(Some(ep));
        }
    }

    update_castling_rights(pos, mv, color);

    let reset_clock = mv.piece == Piece::Pawn || mv.is_capture();
    pos.set_halfmove_clock(if reset_clock {
        0
    } else {
        pos.halfmove_clock() + 1
    });

    if color == Color::Black {
        pos.bump_fullmove_number();
    }
    pos.set_side_to_move(color.opponent());
    pos.record_repetition();

    delta
}

/// Reverse a move previously applied with `make_move`, given the snapshot it
/// returned.
pub(crate) fn unmake_move(pos: &mut Position, mv: InternalMove, delta: PositionDelta) {
    pos.unrecord_repetition(pos.hash());
    let mover = pos.side_to_move().opponent();
    pos.set_side_to_move(mover);

    if mv.is_castling() {
        undo_castle(pos, mv, mover);
    } else if mv.is_en_passant() {
        pos.remove(mv.to);
        pos.put(mv.from, mover, Piece::Pawn);
        let captured_sq = ep_capture_square(mv.to, mover);
        pos.put(captured_sq, mover.opponent(), Piece::Pawn);
    } else {
        pos.remove(mv.to);
        pos.put(mv.from, mover, mv.piece);
        if let Some(captured) = mv.captured {
            pos.put(mv.to, mover.opponent(), captured);
        }
    }

    pos.restore_scalars(delta);
}

fn ep_capture_square(to: Square, mover: Color) -> Square {
    let rank = if mover == Color::White {
        to.rank() - 1
    } else {
        to.rank() + 1
    };
    Square::new(rank, to.file())
}

fn apply_castle(pos: &mut Position, mv: InternalMove, color: Color) {
    pos.remove(mv.from);
    pos.put(mv.to, color, Piece::King);

    let rank = if color == Color::White { 0 } else { 7 };
    let (rook_from, rook_to) = if mv.is_kingside_castle() {
        (Square::new(rank, 7), Square::new(rank, 5))
    } else {
        (Square::new(rank, 0), Square::new(rank, 3))
    };
    pos.remove(rook_from);
    pos.put(rook_to, color, Piece::Rook);
}

fn undo_castle(pos: &mut Position, mv: InternalMove, color: Color) {
    pos.remove(mv.to);
    pos.put(mv.from, color, Piece::King);

    let rank = if color == Color::White { 0 } else { 7 };
    let (rook_from, rook_to) = if mv.is_kingside_castle() {
        (Square::new(rank, 7), Square::new(rank, 5))
    } else {
        (Square::new(rank, 0), Square::new(rank, 3))
    };
    pos.remove(rook_to);
    pos.put(rook_from, color, Piece::Rook);
}

fn update_castling_rights(pos: &mut Position, mv: InternalMove, color: Color) {
    let mut rights = pos.castling_rights();
    let start_rank = if color == Color::White { 0 } else { 7 };

    if mv.piece == Piece::King {
        rights.remove(color, true);
        rights.remove(color, false);
    } else if mv.piece == Piece::Rook {
        if mv.from == Square::new(start_rank, 0) {
            rights.remove(color, false);
        } else if mv.from == Square::new(start_rank, 7) {
            rights.remove(color, true);
        }
    }

    if let Some(Piece::Rook) = mv.captured {
        let opp = color.opponent();
        let opp_rank = if opp == Color::White { 0 } else { 7 };
        if mv.to == Square::new(opp_rank, 0) {
            rights.remove(opp, false);
        } else if mv.to == Square::new(opp_rank, 7) {
            rights.remove(opp, true);
        }
    }

    if rights != pos.castling_rights() {
        pos.set_castling(rights);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::types::MoveFlags;

    fn pos_from(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    #[test]
    fn make_unmake_round_trip_restores_hash() {
        let mut pos = Position::new();
        let before_hash = pos.hash();
        let before_fen = pos.fen(false);

        let mv = InternalMove {
            from: Square::new(1, 4),
            to: Square::new(3, 4),
            piece: Piece::Pawn,
            captured: None,
            promotion: None,
            flags: MoveFlags::BIG_PAWN,
        };

        let delta = make_move(&mut pos, mv);
        assert_ne!(pos.hash(), before_hash);
        unmake_move(&mut pos, mv, delta);

        assert_eq!(pos.hash(), before_hash);
        assert_eq!(pos.fen(false), before_fen);
    }

    #[test]
    fn castling_moves_both_king_and_rook() {
        let mut pos = pos_from("4k3/8/8/8/8/8/8/4K2R w K - 0 1");
        let mv = InternalMove {
            from: Square::new(0, 4),
            to: Square::new(0, 6),
            piece: Piece::King,
            captured: None,
            promotion: None,
            flags: MoveFlags::KSIDE_CASTLE,
        };
        let delta = make_move(&mut pos, mv);
        assert_eq!(pos.get(Square::new(0, 6)), Some((Color::White, Piece::King)));
        assert_eq!(pos.get(Square::new(0, 5)), Some((Color::White, Piece::Rook)));
        assert!(pos.get(Square::new(0, 4)).is_none());
        assert!(pos.get(Square::new(0, 7)).is_none());

        unmake_move(&mut pos, mv, delta);
        assert_eq!(pos.get(Square::new(0, 4)), Some((Color::White, Piece::King)));
        assert_eq!(pos.get(Square::new(0, 7)), Some((Color::White, Piece::Rook)));
    }

    #[test]
    fn en_passant_removes_the_captured_pawn() {
        let mut pos = pos_from("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1");
        let mv = InternalMove {
            from: Square::new(4, 4),
            to: Square::new(5, 3),
            piece: Piece::Pawn,
            captured: Some(Piece::Pawn),
            promotion: None,
            flags: MoveFlags::EP_CAPTURE,
        };
        let delta = make_move(&mut pos, mv);
        assert!(pos.get(Square::new(4, 3)).is_none());
        assert_eq!(pos.get(Square::new(5, 3)), Some((Color::White, Piece::Pawn)));

        unmake_move(&mut pos, mv, delta);
        assert_eq!(pos.get(Square::new(4, 3)), Some((Color::Black, Piece::Pawn)));
        assert_eq!(pos.get(Square::new(4, 4)), Some((Color::White, Piece::Pawn)));
    }
}
