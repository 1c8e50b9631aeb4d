//! Draw detection tests.

use crate::board::{self, InternalMove, Piece, Position, Square};

fn find_move(pos: &Position, from: Square, to: Square, promotion: Option<Piece>) -> InternalMove {
    pos.generate_legal_moves()
        .iter()
        .find(|m| m.from == from && m.to == to && m.promotion == promotion)
        .copied()
        .expect("expected move not found")
}

#[test]
fn test_fen_halfmove_parsing() {
    let pos = Position::from_fen("8/8/8/8/8/8/8/K1k5 w - - 57 1").unwrap();
    assert_eq!(pos.halfmove_clock(), 57);
}

#[test]
fn test_fifty_move_rule_draw() {
    let pos = Position::from_fen("8/8/8/8/8/8/8/K1k5 w - - 100 1").unwrap();
    assert!(pos.is_draw());
    assert!(pos.is_draw_by_fifty_moves());
}

#[test]
fn test_halfmove_resets_on_pawn_move() {
    let mut pos = Position::from_fen("8/8/8/8/8/8/4P3/K1k5 w - - 99 1").unwrap();
    let mv = find_move(&pos, Square::new(1, 4), Square::new(3, 4), None);
    board::make_move(&mut pos, mv);
    assert_eq!(pos.halfmove_clock(), 0);
    assert!(!pos.is_draw());
}

#[test]
fn test_threefold_repetition() {
    let mut pos = Position::new();
    for _ in 0..2 {
        for (from, to) in [
            (Square::new(0, 6), Square::new(2, 5)),
            (Square::new(7, 6), Square::new(5, 5)),
            (Square::new(2, 5), Square::new(0, 6)),
            (Square::new(5, 5), Square::new(7, 6)),
        ] {
            let mv = find_move(&pos, from, to, None);
            board::make_move(&mut pos, mv);
        }
    }
    assert!(pos.is_threefold_repetition());
    assert!(pos.is_draw());
}

#[test]
fn test_insufficient_material_draw() {
    let pos = Position::from_fen("8/8/8/8/8/8/6N1/K1k5 w - - 0 1").unwrap();
    assert!(!pos.is_draw());
    assert!(pos.is_insufficient_material());
}

#[test]
fn test_unmake_restores_state() {
    let mut pos = Position::new();
    let original_hash = pos.hash();
    let original_castling = pos.castling_rights();
    let original_ep = pos.ep_square();
    let original_halfmove = pos.halfmove_clock();

    let mv = find_move(&pos, Square::new(1, 4), Square::new(3, 4), None);
    let delta = board::make_move(&mut pos, mv);
    board::unmake_move(&mut pos, mv, delta);

    assert_eq!(pos.hash(), original_hash);
    assert_eq!(pos.castling_rights(), original_castling);
    assert_eq!(pos.ep_square(), original_ep);
    assert_eq!(pos.halfmove_clock(), original_halfmove);
}

#[test]
fn test_checkmate_detected() {
    let pos = Position::from_fen("7k/7Q/7K/8/8/8/8/8 b - - 0 1").unwrap();
    assert!(pos.is_checkmate(), "black should be in checkmate");
}

#[test]
fn test_fen_round_trip_normalized() {
    let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    let pos = Position::from_fen(fen).unwrap();
    assert_eq!(pos.fen(false), fen);
}
