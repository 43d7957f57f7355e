use chess_bot::{Difficulty, MovePredictor, MoveSource, PathResolver, PredictError, PredictorConfig};
use ml_engine::ModelRegistry;

const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[tokio::test]
async fn test_preload_fails_on_missing_model_file() {
    let config = PredictorConfig::from_toml(
        r#"
        [models.less_1000]
        family = "history_policy"
        path = "no/such/model.onnx"
        move_to_idx = "no/such/move_to_id.json"
        "#,
        &PathResolver::new(std::env::temp_dir()),
    )
    .unwrap();
    let predictor = MovePredictor::new(config);
    let err = predictor.preload().await.unwrap_err();
    assert!(matches!(err, PredictError::Model(_)), "{err}");
    assert!(!predictor.is_ready().await);
}

#[tokio::test]
async fn test_preload_without_models_is_ready() {
    let predictor = MovePredictor::new(PredictorConfig::default());
    predictor.preload().await.unwrap();
    assert!(predictor.is_ready().await);
    // Preloading twice keeps the running lanes.
    predictor.preload().await.unwrap();
    predictor.shutdown().await;
}

#[cfg(unix)]
#[tokio::test]
async fn test_advanced_plays_the_engine_move() {
    use std::os::unix::fs::PermissionsExt;

    let dir = std::env::temp_dir().join(format!("chess_bot_engine_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let script = dir.join("engine.sh");
    std::fs::write(
        &script,
        r#"#!/bin/sh
while IFS= read -r line; do
  case "$line" in
    uci) echo "uciok" ;;
    isready) echo "readyok" ;;
    go*) echo "bestmove d2d4" ;;
    quit) exit 0 ;;
  esac
done
"#,
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    let config = PredictorConfig::from_toml(
        "[engine]\nlinux = \"engine.sh\"\nmacos = \"engine.sh\"\ntimeout_secs = 10\n",
        &PathResolver::new(&dir),
    )
    .unwrap();
    let predictor = MovePredictor::new(config);
    predictor.preload_with(ModelRegistry::new()).await.unwrap();

    let prediction = predictor
        .predict(START, &[] as &[String], Difficulty::Advanced)
        .await
        .unwrap();
    assert_eq!(prediction.mv.san, "d4");
    assert_eq!(prediction.source, MoveSource::Engine);

    let hint = predictor.get_move_hint(START, &[] as &[String]).await.unwrap();
    assert_eq!(hint.uci, "d2d4");

    predictor.shutdown().await;
    let _ = std::fs::remove_dir_all(dir);
}
