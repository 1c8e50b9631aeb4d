//! Property-based tests using proptest.

use crate::board::Position;
use proptest::prelude::*;

/// Strategy to generate a random legal move sequence length.
fn move_count_strategy() -> impl Strategy<Value = usize> {
    1..=20usize
}

/// Strategy for a sequence of move-selector values, consumed one per ply
/// (index modulo the number of legal moves at that ply) so the playout
/// itself stays deterministic from the proptest-shrunk input.
fn selector_strategy(len: usize) -> impl Strategy<Value = Vec<u32>> {
    proptest::collection::vec(any::<u32>(), len)
}

proptest! {
    /// Property: make_move followed by unmake_move restores position state exactly.
    #[test]
    fn prop_make_unmake_restores_state(num_moves in move_count_strategy(), selectors in selector_strategy(20)) {
        let mut pos = Position::new();
        let initial_hash = pos.hash();
        let initial_fen = pos.fen(false);

        let mut history = Vec::new();
        for &selector in selectors.iter().take(num_moves) {
            let moves = pos.generate_legal_moves();
            if moves.is_empty() {
                break;
            }
            let idx = (selector as usize) % moves.len();
            let mv = moves.as_slice()[idx];
            let delta = crate::board::make_move(&mut pos, mv);
            history.push((mv, delta));
        }

        while let Some((mv, delta)) = history.pop() {
            crate::board::unmake_move(&mut pos, mv, delta);
        }

        prop_assert_eq!(pos.hash(), initial_hash);
        prop_assert_eq!(pos.fen(false), initial_fen);
    }

    /// Property: hash is always consistent with a from-scratch recompute.
    #[test]
    fn prop_hash_consistency(num_moves in move_count_strategy(), selectors in selector_strategy(20)) {
        let mut pos = Position::new();

        for &selector in selectors.iter().take(num_moves) {
            let moves = pos.generate_legal_moves();
            if moves.is_empty() {
                break;
            }
            let idx = (selector as usize) % moves.len();
            let mv = moves.as_slice()[idx];
            crate::board::make_move(&mut pos, mv);
            prop_assert_eq!(pos.hash(), pos.compute_hash());
        }
    }

    /// Property: FEN round-trip preserves the essential position state.
    #[test]
    fn prop_fen_roundtrip(num_moves in move_count_strategy(), selectors in selector_strategy(20)) {
        let mut pos = Position::new();

        for &selector in selectors.iter().take(num_moves) {
            let moves = pos.generate_legal_moves();
            if moves.is_empty() {
                break;
            }
            let idx = (selector as usize) % moves.len();
            let mv = moves.as_slice()[idx];
            crate::board::make_move(&mut pos, mv);
        }

        let fen = pos.fen(true);
        let restored = Position::from_fen(&fen).unwrap();

        prop_assert_eq!(pos.hash(), restored.hash());
        prop_assert_eq!(pos.side_to_move(), restored.side_to_move());
        prop_assert_eq!(pos.castling_rights(), restored.castling_rights());
        prop_assert_eq!(pos.ep_square(), restored.ep_square());
    }

    /// Property: every legal move, once made, never leaves its own king in check.
    #[test]
    fn prop_legal_moves_are_legal(selectors in selector_strategy(10)) {
        let mut pos = Position::new();

        for &selector in selectors.iter() {
            let moves = pos.generate_legal_moves();
            if moves.is_empty() {
                break;
            }

            let mover = pos.side_to_move();
            for mv in moves.iter() {
                let mut scratch = pos.clone();
                crate::board::make_move(&mut scratch, *mv);
                prop_assert!(!scratch.is_in_check(mover), "legal move left its own king in check: {:?}", mv);
            }

            let idx = (selector as usize) % moves.len();
            let mv = moves.as_slice()[idx];
            crate::board::make_move(&mut pos, mv);
        }
    }
}
