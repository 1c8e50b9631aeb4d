//! Make/unmake move tests beyond the single-move cases covered inline in
//! `board::make_unmake`'s own test module: longer playouts and full-history
//! unwinding.

use crate::board::{self, InternalMove, Position};

/// Small linear-congruential generator so playout tests are deterministic
/// without a `rand` dependency this crate has no other use for.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0
    }

    fn index(&mut self, bound: usize) -> usize {
        (self.next() % bound as u64) as usize
    }
}

#[test]
fn test_legal_moves_stable_after_make_unmake() {
    let pos = Position::new();

    for mv in pos.generate_legal_moves().iter() {
        let mut scratch = pos.clone();
        let delta = board::make_move(&mut scratch, *mv);
        board::unmake_move(&mut scratch, *mv, delta);
        assert_eq!(scratch.hash(), pos.hash());
        assert_eq!(scratch.fen(false), pos.fen(false));
    }
}

#[test]
fn test_hash_matches_recompute_after_random_playout() {
    let mut pos = Position::new();
    let mut rng = Lcg(0xC0FFEE);
    let mut history: Vec<(InternalMove, board::position::PositionDelta)> = Vec::new();

    for _ in 0..50 {
        let moves = pos.generate_legal_moves();
        if moves.is_empty() {
            break;
        }
        let mv = moves.as_slice()[rng.index(moves.len())];
        let delta = board::make_move(&mut pos, mv);
        history.push((mv, delta));
        assert_eq!(pos.hash(), pos.compute_hash());
    }

    while let Some((mv, delta)) = history.pop() {
        board::unmake_move(&mut pos, mv, delta);
        assert_eq!(pos.hash(), pos.compute_hash());
    }
}

#[test]
fn test_random_playout_round_trip_state() {
    let mut pos = Position::new();
    let initial_hash = pos.hash();
    let initial_fen = pos.fen(false);

    let mut rng = Lcg(0x5EED);
    let mut history: Vec<(InternalMove, board::position::PositionDelta)> = Vec::new();

    for _ in 0..200 {
        let moves = pos.generate_legal_moves();
        if moves.is_empty() {
            break;
        }
        let mv = moves.as_slice()[rng.index(moves.len())];
        let delta = board::make_move(&mut pos, mv);
        history.push((mv, delta));
    }

    while let Some((mv, delta)) = history.pop() {
        board::unmake_move(&mut pos, mv, delta);
    }

    assert_eq!(pos.hash(), initial_hash);
    assert_eq!(pos.fen(false), initial_fen);
}
