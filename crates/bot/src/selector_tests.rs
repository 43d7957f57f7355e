use super::*;

#[test]
fn test_difficulty_parsing() {
    assert_eq!("novice".parse::<Difficulty>(), Ok(Difficulty::Novice));
    assert_eq!(" Master ".parse::<Difficulty>(), Ok(Difficulty::Master));
    assert!("grandmaster".parse::<Difficulty>().is_err());
    for d in Difficulty::ALL {
        assert_eq!(d.to_string().parse::<Difficulty>(), Ok(d));
    }
}

#[test]
fn test_default_table() {
    let table = DifficultyTable::default();
    assert_eq!(
        select(Difficulty::Novice, &table),
        StrategyPlan::PolicyOnly {
            model: "less_1000".into()
        }
    );
    assert_eq!(
        select(Difficulty::Intermediate, &table).kind(),
        StrategyKind::SearchWithModel
    );
    assert_eq!(
        select(Difficulty::Advanced, &table),
        StrategyPlan::ExternalEngine { elo: 1750, depth: 10 }
    );
    assert_eq!(
        select(Difficulty::Master, &table),
        StrategyPlan::ExternalEngine { elo: 2750, depth: 20 }
    );
}

#[test]
fn test_phase_classification() {
    let start = Position::startpos();
    assert_eq!(GamePhase::classify(&start, 0), GamePhase::Opening);
    assert_eq!(GamePhase::classify(&start, 10), GamePhase::Opening);
    assert_eq!(GamePhase::classify(&start, 11), GamePhase::Middlegame);

    let ending = Position::from_fen("8/5k2/8/8/3R4/8/2K2P2/8 w - - 0 60").unwrap();
    assert_eq!(GamePhase::classify(&ending, 80), GamePhase::Endgame);
    // A bare board still counts as the opening while few plies have been played.
    assert_eq!(GamePhase::classify(&ending, 4), GamePhase::Opening);
}

#[test]
fn test_endgame_falls_back_to_middlegame_model() {
    let mut models = PhaseModels {
        opening: "open".into(),
        middlegame: "middle".into(),
        endgame: None,
    };
    assert_eq!(models.for_phase(GamePhase::Endgame), "middle");
    models.endgame = Some("end".into());
    assert_eq!(models.for_phase(GamePhase::Endgame), "end");
    assert_eq!(models.for_phase(GamePhase::Opening), "open");
}

#[test]
fn test_plan_model_ids() {
    let table = DifficultyTable::default();
    assert_eq!(table.novice.model_ids(), vec!["less_1000"]);
    assert_eq!(
        table.intermediate.model_ids(),
        vec!["1000_1500_opening", "1000_1500_middle"]
    );
    assert!(table.master.model_ids().is_empty());
}

#[test]
fn test_table_overrides_from_toml() {
    let table: DifficultyTable = toml::from_str(
        r#"
        [novice]
        strategy = "external_engine"
        elo = 1350
        depth = 1

        [intermediate]
        strategy = "search_with_model"
        depth = 3
        value_model = "value"
        models = { opening = "o", middlegame = "m" }
        "#,
    )
    .unwrap();
    assert_eq!(
        table.novice,
        StrategyPlan::ExternalEngine { elo: 1350, depth: 1 }
    );
    match &table.intermediate {
        StrategyPlan::SearchWithModel {
            depth,
            max_moves,
            value_model,
            ..
        } => {
            assert_eq!(*depth, 3);
            assert_eq!(*max_moves, None);
            assert_eq!(value_model.as_deref(), Some("value"));
        }
        other => panic!("unexpected plan {other:?}"),
    }
    // Untouched tiers keep their defaults.
    assert_eq!(table.master, DifficultyTable::default().master);
}
