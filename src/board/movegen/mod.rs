//! Pseudo-legal move generation, the legality filter, and the game-ending
//! predicates built on top of it (check, checkmate, stalemate, draw rules).

use super::attack_tables::{
    attacks_between, ray_between, BISHOP_RAYS, KING_OFFSETS, KNIGHT_OFFSETS,
    PAWN_CAPTURE_OFFSETS, PAWN_PROMOTION_RANK, PAWN_PUSH_OFFSET, PAWN_START_RANK, ROOK_RAYS,
};
use super::make_unmake::{make_move, unmake_move};
use super::position::Position;
use super::types::{Color, InternalMove, MoveFlags, MoveList, Piece, Square, PROMOTION_PIECES};

impl Position {
    /// Generate every pseudo-legal move for the side to move: legal in
    /// isolation but not yet checked against leaving one's own king in check.
    #[must_use]
    pub fn generate_pseudo_legal_moves(&self) -> MoveList {
        let mut moves = MoveList::new();
        let color = self.side_to_move();

        for (from, piece_color, piece) in self.occupied_squares() {
            if piece_color != color {
                continue;
            }
            match piece {
                Piece::Pawn => self.generate_pawn_moves(from, color, &mut moves),
                Piece::Knight => self.generate_leaper_moves(from, color, &KNIGHT_OFFSETS, Piece::Knight, &mut moves),
                Piece::King => {
                    self.generate_leaper_moves(from, color, &KING_OFFSETS, Piece::King, &mut moves);
                    self.generate_castling_moves(from, color, &mut moves);
                }
                Piece::Bishop => self.generate_slider_moves(from, color, &BISHOP_RAYS, Piece::Bishop, &mut moves),
                Piece::Rook => self.generate_slider_moves(from, color, &ROOK_RAYS, Piece::Rook, &mut moves),
                Piece::Queen => {
                    self.generate_slider_moves(from, color, &ROOK_RAYS, Piece::Queen, &mut moves);
                    self.generate_slider_moves(from, color, &BISHOP_RAYS, Piece::Queen, &mut moves);
                }
            }
        }

        moves
    }

    /// Generate only the pseudo-legal moves that leave no piece of `color`
    /// in check afterwards: the full legal move list.
    #[must_use]
    pub fn generate_legal_moves(&self) -> MoveList {
        let mut out = MoveList::new();
        let mut scratch = self.clone();
        let color = self.side_to_move();

        for mv in self.generate_pseudo_legal_moves().iter() {
            let delta = make_move(&mut scratch, *mv);
            let still_in_check = scratch.is_in_check(color);
            unmake_move(&mut scratch, *mv, delta);
            if !still_in_check {
                out.push(*mv);
            }
        }

        out
    }

    /// True if `color`'s king is currently attacked.
    #[must_use]
    pub fn is_in_check(&self, color: Color) -> bool {
        match self.king_square(color) {
            Some(king_sq) => self.is_square_attacked(king_sq, color.opponent()),
            None => false,
        }
    }

    /// True if any piece of `attacker` attacks `square`.
    #[must_use]
    pub(crate) fn is_square_attacked(&self, square: Square, attacker: Color) -> bool {
        for (from, color, piece) in self.occupied_squares() {
            if color != attacker {
                continue;
            }
            if piece == Piece::Pawn {
                let offsets = PAWN_CAPTURE_OFFSETS[color.index()];
                for offset in offsets {
                    if let Some(target) = step(from, offset) {
                        if target == square {
                            return true;
                        }
                    }
                }
                continue;
            }

            let bit = super::attack_tables::attack_bit(piece);
            let mask = attacks_between(from.raw(), square.raw());
            if mask & bit == 0 {
                continue;
            }
            if matches!(piece, Piece::Bishop | Piece::Rook | Piece::Queen) {
                if self.ray_is_clear(from, square) {
                    return true;
                }
            } else {
                return true;
            }
        }
        false
    }

    fn ray_is_clear(&self, from: Square, to: Square) -> bool {
        let dir = ray_between(from.raw(), to.raw());
        if dir == 0 {
            return false;
        }
        let dir = dir as i32;
        let target = to.raw() as i32;
        let mut cur = from.raw() as i32 + dir;
        while cur != target {
            if self.get(Square::from_raw(cur as i8)).is_some() {
                return false;
            }
            cur += dir;
        }
        true
    }

    fn generate_leaper_moves(
        &self,
        from: Square,
        color: Color,
        offsets: &[i8],
        piece: Piece,
        moves: &mut MoveList,
    ) {
        for &offset in offsets {
            let Some(to) = step(from, offset) else {
                continue;
            };
            self.push_simple_move(from, to, piece, color, moves);
        }
    }

    fn generate_slider_moves(
        &self,
        from: Square,
        color: Color,
        rays: &[i8],
        piece: Piece,
        moves: &mut MoveList,
    ) {
        for &dir in rays {
            let mut cur = from;
            loop {
                let Some(next) = step(cur, dir) else { break };
                match self.get(next) {
                    None => {
                        moves.push(InternalMove {
                            from,
                            to: next,
                            piece,
                            captured: None,
                            promotion: None,
                            flags: MoveFlags::NORMAL,
                        });
                        cur = next;
                    }
                    Some((occ_color, occ_piece)) => {
                        if occ_color != color {
                            moves.push(InternalMove {
                                from,
                                to: next,
                                piece,
                                captured: Some(occ_piece),
                                promotion: None,
                                flags: MoveFlags::CAPTURE,
                            });
                        }
                        break;
                    }
                }
            }
        }
    }

    fn push_simple_move(
        &self,
        from: Square,
        to: Square,
        piece: Piece,
        color: Color,
        moves: &mut MoveList,
    ) {
        match self.get(to) {
            None => moves.push(InternalMove {
                from,
                to,
                piece,
                captured: None,
                promotion: None,
                flags: MoveFlags::NORMAL,
            }),
            Some((occ_color, occ_piece)) => {
                if occ_color != color {
                    moves.push(InternalMove {
                        from,
                        to,
                        piece,
                        captured: Some(occ_piece),
                        promotion: None,
                        flags: MoveFlags::CAPTURE,
                    });
                }
            }
        }
    }

    fn generate_pawn_moves(&self, from: Square, color: Color, moves: &mut MoveList) {
        let push = PAWN_PUSH_OFFSET[color.index()];
        let promo_rank = PAWN_PROMOTION_RANK[color.index()];

        if let Some(one) = step(from, push) {
            if self.get(one).is_none() {
                self.push_pawn_advance(from, one, promo_rank, MoveFlags::NORMAL, moves);

                if from.rank() == PAWN_START_RANK[color.index()] {
                    if let Some(two) = step(one, push) {
                        if self.get(two).is_none() {
                            moves.push(InternalMove {
                                from,
                                to: two,
                                piece: Piece::Pawn,
                                captured: None,
                                promotion: None,
                                flags: MoveFlags::BIG_PAWN,
                            });
                        }
                    }
                }
            }
        }

        for &offset in &PAWN_CAPTURE_OFFSETS[color.index()] {
            let Some(to) = step(from, offset) else {
                continue;
            };
            if let Some((occ_color, occ_piece)) = self.get(to) {
                if occ_color != color {
                    self.push_pawn_advance(from, to, promo_rank, MoveFlags::CAPTURE, moves);
                    patch_last_capture(moves, occ_piece);
                }
            } else if Some(to) == self.ep_square() {
                moves.push(InternalMove {
                    from,
                    to,
                    piece: Piece::Pawn,
                    captured: Some(Piece::Pawn),
                    promotion: None,
                    flags: MoveFlags::EP_CAPTURE,
                });
            }
        }
    }

    fn push_pawn_advance(
        &self,
        from: Square,
        to: Square,
        promo_rank: usize,
        base_flags: MoveFlags,
        moves: &mut MoveList,
    ) {
        if to.rank() == promo_rank {
            for &promo in &PROMOTION_PIECES {
                moves.push(InternalMove {
                    from,
                    to,
                    piece: Piece::Pawn,
                    captured: None,
                    promotion: Some(promo),
                    flags: base_flags | MoveFlags::PROMOTION,
                });
            }
        } else {
            moves.push(InternalMove {
                from,
                to,
                piece: Piece::Pawn,
                captured: None,
                promotion: None,
                flags: base_flags,
            });
        }
    }

    fn generate_castling_moves(&self, from: Square, color: Color, moves: &mut MoveList) {
        let rank = if color == Color::White { 0 } else { 7 };
        if from != Square::new(rank, 4) {
            return;
        }
        if self.is_in_check(color) {
            return;
        }

        let rights = self.castling_rights();

        if rights.has(color, true) {
            let f = Square::new(rank, 5);
            let g = Square::new(rank, 6);
            if self.get(f).is_none()
                && self.get(g).is_none()
                && !self.is_square_attacked(f, color.opponent())
                && !self.is_square_attacked(g, color.opponent())
            {
                moves.push(InternalMove {
                    from,
                    to: g,
                    piece: Piece::King,
                    captured: None,
                    promotion: None,
                    flags: MoveFlags::KSIDE_CASTLE,
                });
            }
        }

        if rights.has(color, false) {
            let d = Square::new(rank, 3);
            let c = Square::new(rank, 2);
            let b = Square::new(rank, 1);
            if self.get(d).is_none()
                && self.get(c).is_none()
                && self.get(b).is_none()
                && !self.is_square_attacked(d, color.opponent())
                && !self.is_square_attacked(c, color.opponent())
            {
                moves.push(InternalMove {
                    from,
                    to: c,
                    piece: Piece::King,
                    captured: None,
                    promotion: None,
                    flags: MoveFlags::QSIDE_CASTLE,
                });
            }
        }
    }

    #[must_use]
    pub fn is_checkmate(&self) -> bool {
        self.is_in_check(self.side_to_move()) && self.generate_legal_moves().is_empty()
    }

    #[must_use]
    pub fn is_stalemate(&self) -> bool {
        !self.is_in_check(self.side_to_move()) && self.generate_legal_moves().is_empty()
    }

    #[must_use]
    pub fn is_draw_by_fifty_moves(&self) -> bool {
        self.halfmove_clock() >= 100
    }

    #[must_use]
    pub fn is_threefold_repetition(&self) -> bool {
        self.current_repetition_count() >= 3
    }

    #[must_use]
    pub fn is_insufficient_material(&self) -> bool {
        let mut minor_count = [0u32; 2];
        let mut bishop_squares: Vec<Square> = Vec::new();

        for (sq, color, piece) in self.occupied_squares() {
            match piece {
                Piece::King => {}
                Piece::Bishop => {
                    minor_count[color.index()] += 1;
                    bishop_squares.push(sq);
                }
                Piece::Knight => minor_count[color.index()] += 1,
                _ => return false,
            }
        }

        let total_minors: u32 = minor_count.iter().sum();
        if total_minors == 0 {
            return true;
        }
        if total_minors == 1 {
            return true;
        }
        if total_minors == 2
            && minor_count[0] == 1
            && minor_count[1] == 1
            && bishop_squares.len() == 2
        {
            let light = |sq: Square| (sq.rank() + sq.file()) % 2 == 0;
            return light(bishop_squares[0]) == light(bishop_squares[1]);
        }

        false
    }

    #[must_use]
    pub fn is_draw(&self) -> bool {
        self.is_draw_by_fifty_moves()
            || self.is_threefold_repetition()
            || self.is_insufficient_material()
            || self.is_stalemate()
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.is_checkmate() || self.is_draw()
    }

    /// Count leaf nodes reachable in `depth` plies; a standard correctness
    /// benchmark for move generators.
    #[must_use]
    pub fn perft(&self, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }
        let moves = self.generate_legal_moves();
        if depth == 1 {
            return moves.len() as u64;
        }

        let mut scratch = self.clone();
        let mut nodes = 0;
        for mv in moves.iter() {
            let delta = make_move(&mut scratch, *mv);
            nodes += scratch.perft(depth - 1);
            unmake_move(&mut scratch, *mv, delta);
        }
        nodes
    }
}

#[inline]
fn step(from: Square, offset: i8) -> Option<Square> {
    let raw = from.raw() as i32 + offset as i32;
    if raw & 0x88 != 0 || !(0..128).contains(&raw) {
        None
    } else {
        Some(Square::from_raw(raw as i8))
    }
}

/// Pawn-capture generation pushes a plain advance first, then patches in the
/// captured piece — this fills that in on the move just pushed.
fn patch_last_capture(moves: &mut MoveList, captured: Piece) {
    let slice = moves.as_mut_slice();
    if let Some(mv) = slice.last_mut() {
        mv.captured = Some(captured);
    }
}
