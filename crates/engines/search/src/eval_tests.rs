use super::*;
use chess_core::{legal_moves, parse_uci_move};
use ml_engine::{
    LoadedModel, ModelConfig, ModelFamily, MoveVocabulary, Notation, StaticSession,
};

fn registry_with(models: Vec<LoadedModel>) -> Arc<ModelRegistry> {
    let mut registry = ModelRegistry::new();
    for m in models {
        registry.insert(m);
    }
    Arc::new(registry)
}

#[test]
fn test_capture_order_prefers_valuable_victims() {
    // White pawn and queen can both take on d5; the rook on a8 is en prise to the queen too.
    let pos = chess_core::Position::from_fen("r3k3/8/8/3n4/4P3/8/8/Q3K3 w - - 0 1").unwrap();
    let pxn = parse_uci_move(&pos, "e4d5").unwrap();
    let qxr = parse_uci_move(&pos, "a1a8").unwrap();
    let quiet = parse_uci_move(&pos, "e1e2").unwrap();
    assert!(capture_order(&pos, qxr) > capture_order(&pos, pxn));
    assert!(capture_order(&pos, pxn) > 0.0);
    assert_eq!(capture_order(&pos, quiet), 0.0);
}

#[test]
fn test_value_model_is_flipped_for_black() {
    let value = LoadedModel::from_session(
        "value",
        ModelConfig::new(ModelFamily::BoardValue, "v.onnx"),
        None,
        Box::new(StaticSession::value(0.3)),
    );
    let eval = ModelEvaluator::new(registry_with(vec![value]), None, Some("value".into()));
    let white = Position::startpos();
    let black =
        Position::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1").unwrap();
    assert_eq!(eval.evaluate(&white, &MoveHistory::new()).unwrap(), 300);
    assert_eq!(eval.evaluate(&black, &MoveHistory::new()).unwrap(), -300);
}

#[test]
fn test_policy_ordering_maps_scores_to_moves() {
    let forward = [("d2d4".to_string(), 1), ("g1f3".to_string(), 2)]
        .into_iter()
        .collect();
    let policy = LoadedModel::from_session(
        "opening",
        ModelConfig::new(ModelFamily::HistoryPolicy, "p.onnx"),
        Some(MoveVocabulary::new(Notation::Uci, forward, None)),
        Box::new(StaticSession::policy(vec![0.0, 0.25, 0.75])),
    );
    let eval = ModelEvaluator::new(registry_with(vec![policy]), Some("opening".into()), None);
    assert!(eval.needs_history());

    let pos = Position::startpos();
    let moves = legal_moves(&pos);
    let scores = eval.order(&pos, &MoveHistory::new(), &moves).unwrap();
    for (mv, score) in moves.iter().zip(scores) {
        let expected = match chess_core::move_to_uci(*mv).as_str() {
            "d2d4" => 0.25,
            "g1f3" => 0.75,
            _ => 0.0,
        };
        assert_eq!(score, expected);
    }
}

#[test]
fn test_missing_model_is_an_error() {
    let eval = ModelEvaluator::new(Arc::new(ModelRegistry::new()), Some("gone".into()), None);
    let pos = Position::startpos();
    let err = eval
        .order(&pos, &MoveHistory::new(), &legal_moves(&pos))
        .unwrap_err();
    assert!(matches!(
        err,
        crate::SearchError::Model(ModelError::NotLoaded(_))
    ));
}
