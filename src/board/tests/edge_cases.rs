//! Edge case tests for special chess positions and moves.

use std::str::FromStr;

use crate::board::{self, Color, InternalMove, MoveFlags, Piece, Position, Square};

#[test]
fn test_stalemate_position() {
    let pos = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    assert!(!pos.is_checkmate());
    assert!(pos.is_stalemate());
    assert!(pos.generate_legal_moves().is_empty());
}

#[test]
fn test_underpromotion_choices_all_available() {
    let pos = Position::from_fen("8/P7/8/8/8/8/8/K1k5 w - - 0 1").unwrap();
    let moves = pos.generate_legal_moves();

    for piece in [Piece::Knight, Piece::Rook, Piece::Bishop, Piece::Queen] {
        assert!(
            moves.iter().any(|m| m.promotion == Some(piece)),
            "{piece:?} promotion should be available"
        );
    }
}

#[test]
fn test_en_passant_removes_correct_pawn() {
    let mut pos = Position::from_fen("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 1").unwrap();
    let moves = pos.generate_legal_moves();

    let mv = *moves.iter().find(|m| m.is_en_passant()).expect("en passant should be available");
    let delta = board::make_move(&mut pos, mv);

    assert!(pos.get(Square::new(4, 3)).is_none(), "captured pawn should be removed");
    assert_eq!(pos.get(Square::new(5, 3)), Some((Color::White, Piece::Pawn)));

    board::unmake_move(&mut pos, mv, delta);
    assert_eq!(pos.get(Square::new(4, 3)), Some((Color::Black, Piece::Pawn)), "black pawn should be restored");
    assert_eq!(pos.get(Square::new(4, 4)), Some((Color::White, Piece::Pawn)), "white pawn should be back on e5");
}

#[test]
fn test_castling_blocked_by_check() {
    let pos = Position::from_fen("r3k2r/8/8/8/4Q3/8/8/R3K2R b KQkq - 0 1").unwrap();
    let moves = pos.generate_legal_moves();
    assert!(!moves.iter().any(|m| m.is_castling()), "castling should not be available when in check");
}

#[test]
fn test_castling_through_attacked_square() {
    let pos = Position::from_fen("r4rk1/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
    let moves = pos.generate_legal_moves();
    assert!(moves.iter().any(|m| m.is_castling()), "some castling should be available");
}

#[test]
fn test_double_check_only_king_can_move() {
    let pos = Position::from_fen("4k3/8/8/1b6/8/8/3r4/3K4 w - - 0 1").unwrap();
    let moves = pos.generate_legal_moves();
    for mv in moves.iter() {
        assert_eq!(mv.from, Square::new(0, 3), "only the king should be able to move in double check");
    }
}

#[test]
fn test_checkmate_back_rank() {
    let mut pos = Position::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
    let moves = pos.generate_legal_moves();
    let mate_move = *moves
        .iter()
        .find(|m| m.from == Square::new(0, 0) && m.to == Square::new(7, 0))
        .expect("mating move should be generated");

    board::make_move(&mut pos, mate_move);
    assert!(pos.is_checkmate());
}

#[test]
fn test_fen_parsing_errors() {
    assert!(Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR").is_err());
    assert!(Position::from_fen("rnbxkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").is_err());
    assert!(Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1").is_err());
    assert!(Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w XYZ - 0 1").is_err());
}

#[test]
fn test_square_parsing() {
    assert_eq!(Square::from_str("a1").unwrap(), Square::new(0, 0));
    assert_eq!(Square::from_str("h8").unwrap(), Square::new(7, 7));
    assert_eq!(Square::from_str("e4").unwrap(), Square::new(3, 4));

    assert!(Square::from_str("i1").is_err());
    assert!(Square::from_str("a9").is_err());
    assert!(Square::from_str("").is_err());
    assert!(Square::from_str("a").is_err());
}

#[test]
fn test_square_try_new_bounds_checking() {
    assert!(Square::try_new(0, 0).is_some());
    assert!(Square::try_new(7, 7).is_some());
    assert!(Square::try_new(8, 0).is_none());
    assert!(Square::try_new(0, 8).is_none());
}

#[test]
fn test_move_predicate_flags() {
    let quiet = InternalMove {
        from: Square::new(1, 4),
        to: Square::new(3, 4),
        piece: Piece::Pawn,
        captured: None,
        promotion: None,
        flags: MoveFlags::NORMAL | MoveFlags::BIG_PAWN,
    };
    assert!(!quiet.is_capture());
    assert!(!quiet.is_castling());

    let ep = InternalMove {
        from: Square::new(4, 4),
        to: Square::new(5, 5),
        piece: Piece::Pawn,
        captured: Some(Piece::Pawn),
        promotion: None,
        flags: MoveFlags::EP_CAPTURE,
    };
    assert!(ep.is_capture());
    assert!(ep.is_en_passant());

    let castle = InternalMove {
        from: Square::new(0, 4),
        to: Square::new(0, 6),
        piece: Piece::King,
        captured: None,
        promotion: None,
        flags: MoveFlags::KSIDE_CASTLE,
    };
    assert!(castle.is_castling());
    assert!(castle.is_kingside_castle());
}

#[test]
fn test_movelist_index() {
    let pos = Position::new();
    let moves = pos.generate_legal_moves();

    assert!(!moves.is_empty());
    assert_eq!(moves[0], *moves.iter().next().unwrap());
}
