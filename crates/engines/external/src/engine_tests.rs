use super::*;

#[test]
fn test_setup_commands_without_tablebases() {
    let engine = ExternalEngine::new(EngineConfig::default());
    let lines: Vec<String> = engine
        .setup_commands(&Position::startpos(), 1750)
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        lines,
        vec![
            "setoption name Threads value 1",
            "setoption name Hash value 128",
            "position fen rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "setoption name UCI_LimitStrength value true",
            "setoption name UCI_Elo value 1750",
        ]
    );
}

#[test]
fn test_setup_commands_with_tablebases() {
    let config = EngineConfig {
        syzygy_linux: Some("/tb".into()),
        syzygy_macos: Some("/tb".into()),
        syzygy_windows: Some("/tb".into()),
        threads: 2,
        ..EngineConfig::default()
    };
    let commands = ExternalEngine::new(config).setup_commands(&Position::startpos(), 2750);
    assert_eq!(commands[0], Command::set_option("Threads", 2));
    assert_eq!(commands[3], Command::set_option("SyzygyPath", "/tb"));
    assert_eq!(commands[4], Command::set_option("SyzygyProbeDepth", 7));
    assert_eq!(commands.len(), 7);
}

#[test]
fn test_config_from_toml() {
    let config: EngineConfig = toml::from_str(
        r#"
        linux = "bin/stockfish"
        windows = "bin/stockfish.exe"
        syzygy_linux = "syzygy"
        timeout_secs = 5
        "#,
    )
    .unwrap();
    assert_eq!(config.binary.linux, Some(PathBuf::from("bin/stockfish")));
    assert_eq!(config.binary.macos, None);
    assert_eq!(config.timeout(), Duration::from_secs(5));
    assert_eq!(config.hash_mb, 128);
    assert_eq!(config.syzygy().linux, Some(PathBuf::from("syzygy")));
}

#[test]
fn test_map_paths_touches_every_slot() {
    let mut config = EngineConfig {
        binary: EngineBinary::everywhere("sf"),
        syzygy_windows: Some("tb".into()),
        ..EngineConfig::default()
    };
    config.map_paths(|p| Path::new("/base").join(p));
    assert_eq!(config.binary.linux, Some(PathBuf::from("/base/sf")));
    assert_eq!(config.binary.windows, Some(PathBuf::from("/base/sf")));
    assert_eq!(config.syzygy_windows, Some(PathBuf::from("/base/tb")));
    assert_eq!(config.syzygy_linux, None);
}

#[test]
fn test_validate_checks_legality() {
    let pos = Position::startpos();
    assert_eq!(validate(&pos, "g1f3").unwrap().san, "Nf3");
    assert!(matches!(
        validate(&pos, "e2e5"),
        Err(EngineError::IllegalMove { .. })
    ));
    assert!(matches!(
        validate(&pos, "(none)"),
        Err(EngineError::IllegalMove { .. })
    ));
}

#[tokio::test]
async fn test_unconfigured_binary_fails_to_spawn() {
    let engine = ExternalEngine::new(EngineConfig::default());
    let err = engine
        .best_move(&Position::startpos(), 1500, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Spawn { .. }), "{err}");
}

#[tokio::test]
async fn test_missing_binary_fails_to_spawn() {
    let config = EngineConfig {
        binary: EngineBinary::everywhere(std::env::temp_dir().join("no_such_engine_binary")),
        ..EngineConfig::default()
    };
    let err = ExternalEngine::new(config)
        .best_move(&Position::startpos(), 1500, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Spawn { .. }), "{err}");
}
