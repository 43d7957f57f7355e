use super::*;

#[test]
fn test_startpos_moves() {
    let pos = Position::startpos();
    let moves = legal_moves(&pos);
    // Starting position has 20 legal moves
    assert_eq!(moves.len(), 20);
}

#[test]
fn test_kiwipete_moves() {
    // Kiwipete position - complex with many move types
    let pos =
        Position::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -")
            .unwrap();
    let moves = legal_moves(&pos);
    assert_eq!(moves.len(), 48);
}

#[test]
fn test_pinned_piece_cannot_leave_the_line() {
    // Knight on e2 is pinned against the king by the rook on e8.
    let pos = Position::from_fen("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1").unwrap();
    let moves = legal_moves(&pos);
    assert!(moves.iter().all(|m| m.from != coord_to_sq("e2").unwrap()));
}

#[test]
fn test_no_castling_through_attacked_square() {
    // Black rook on f8 covers f1.
    let pos = Position::from_fen("5rk1/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
    assert!(!legal_moves(&pos).iter().any(|m| m.is_castle));
}

#[test]
fn test_checkmated_side_has_no_moves() {
    // Fool's mate.
    let pos =
        Position::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
            .unwrap();
    assert!(!has_legal_move(&pos));
}
