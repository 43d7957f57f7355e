use super::*;
use crate::model::ModelFamily;
use crate::session::StaticSession;
use crate::vocab::{MoveVocabulary, Notation};

fn policy_model(id: &str, moves: &[&str], scores: Vec<f32>) -> LoadedModel {
    let forward = moves
        .iter()
        .enumerate()
        .map(|(i, m)| (m.to_string(), i as u32 + 1))
        .collect();
    LoadedModel::from_session(
        id,
        ModelConfig::new(ModelFamily::HistoryPolicy, "unused.onnx"),
        Some(MoveVocabulary::new(Notation::San, forward, None)),
        Box::new(StaticSession::policy(scores)),
    )
}

#[test]
fn test_unknown_id_is_not_loaded() {
    let registry = ModelRegistry::new();
    let err = registry
        .score("missing", &Position::startpos(), &MoveHistory::new())
        .unwrap_err();
    assert!(matches!(err, ModelError::NotLoaded(id) if id == "missing"));
}

#[test]
fn test_predict_returns_legal_choice() {
    let mut registry = ModelRegistry::new();
    registry.insert(policy_model("less_1000", &["e5", "Nf3", "d4"], vec![0.0, 0.6, 0.3, 0.1]));

    let pos = Position::startpos();
    let legal = pos.legal_move_details();
    let best = registry
        .predict("less_1000", &pos, &MoveHistory::new(), &legal)
        .unwrap()
        .unwrap();
    assert_eq!(best.san, "Nf3");
}

#[test]
fn test_predict_without_overlap_is_none() {
    let mut registry = ModelRegistry::new();
    registry.insert(policy_model("less_1000", &["e5", "Nf6"], vec![0.0, 0.6, 0.4]));
    let pos = Position::startpos();
    let legal = pos.legal_move_details();
    let best = registry
        .predict("less_1000", &pos, &MoveHistory::new(), &legal)
        .unwrap();
    assert!(best.is_none());
}

#[test]
fn test_load_fails_fast() {
    let configs = std::collections::BTreeMap::from([(
        "less_1000".to_string(),
        ModelConfig::new(ModelFamily::HistoryPolicy, "/nonexistent/model.onnx"),
    )]);
    assert!(matches!(
        ModelRegistry::load(&configs),
        Err(ModelError::Load { .. })
    ));
}

#[test]
fn test_clear_drops_sessions() {
    let mut registry = ModelRegistry::new();
    registry.insert(policy_model("a", &["e4"], vec![0.0, 1.0]));
    assert!(registry.contains("a"));
    registry.clear();
    assert!(registry.is_empty());
}
