//! Game-over detection: mate, stalemate, fifty-move rule, dead material.

use chess_core::{GameStatus, Position};

fn status(fen: &str) -> GameStatus {
    Position::from_fen(fen).unwrap().status()
}

#[test]
fn test_checkmate() {
    assert_eq!(
        status("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3"),
        GameStatus::Checkmate
    );
}

#[test]
fn test_stalemate_king_in_corner() {
    assert_eq!(status("k7/2K5/1Q6/8/8/8/8/8 b - - 0 1"), GameStatus::Stalemate);
}

#[test]
fn test_stalemate_king_and_pawn_endgame() {
    assert_eq!(status("6k1/6P1/6K1/8/8/8/8/8 b - - 0 1"), GameStatus::Stalemate);
}

#[test]
fn test_fifty_move_rule_threshold() {
    assert_eq!(
        status("8/8/8/4k3/8/4K3/4P3/8 w - - 100 60"),
        GameStatus::FiftyMoveRule
    );
    assert_eq!(status("8/8/8/4k3/8/4K3/4P3/8 w - - 99 60"), GameStatus::Ongoing);
}

#[test]
fn test_pawn_move_resets_halfmove_clock() {
    let pos = Position::from_fen("8/8/8/4k3/8/3K4/4P3/8 w - - 99 60").unwrap();
    let push = pos
        .legal_move_details()
        .into_iter()
        .find(|d| d.uci == "e2e3")
        .unwrap();
    assert_eq!(push.after.halfmove_clock, 0);
    assert!(!push.after.is_fifty_move_draw());
}

#[test]
fn test_insufficient_material() {
    let drawn = [
        "8/8/8/4k3/8/4K3/8/8 w - - 0 1",
        "8/8/8/4k3/8/4KB2/8/8 w - - 0 1",
        "8/8/8/4k3/8/4KN2/8/8 w - - 0 1",
        "8/8/4b3/4k3/8/4K3/8/8 w - - 0 1",
        "5b2/8/8/4k3/8/4K3/8/2B5 w - - 0 1",
    ];
    for fen in drawn {
        assert_eq!(status(fen), GameStatus::InsufficientMaterial, "{fen}");
    }
}

#[test]
fn test_sufficient_material() {
    let playable = [
        "2b5/8/8/4k3/8/4K3/8/2B5 w - - 0 1",
        "8/8/8/4k3/8/4K3/4P3/8 w - - 0 1",
        "8/8/8/4k3/8/4K3/8/4R3 w - - 0 1",
        "8/8/8/4k3/8/4K3/3NN3/8 w - - 0 1",
    ];
    for fen in playable {
        assert_eq!(status(fen), GameStatus::Ongoing, "{fen}");
    }
}
