use rand::{Rng, SeedableRng, rngs::StdRng};
use serde_json::json;
use tilematch::*;

fn play_hinted<P: PresentationPort>(engine: &mut Engine<P>, moves: usize) -> Vec<(Pos, Pos)> {
    let mut played = Vec::new();
    for _ in 0..moves {
        let Some((a, b)) = engine.hint() else {
            break;
        };
        engine.attempt_swap(a, b).unwrap();
        played.push((a, b));
    }
    played
}

#[test]
fn every_completed_cycle_leaves_a_settled_playable_board() {
    let mut engine = Engine::initialize(BoardConfig::with_bonus().seeded(7), NullPresentation).unwrap();
    for _ in 0..40 {
        let (a, b) = engine.hint().expect("board always has a move");
        let outcome = engine.attempt_swap(a, b).unwrap();
        assert!(matches!(outcome, SwapOutcome::Resolved(_)));

        let grid = engine.grid();
        assert!(find_matches(grid).is_empty());
        assert!(has_legal_move(grid));
        assert!(grid.is_full());
        assert!(grid.coords_consistent());
        assert!(!engine.is_busy());
        assert_eq!(engine.state(), EngineState::Idle);
    }
    assert!(engine.score() > 0);
}

#[test]
fn same_seed_same_swaps_same_game() {
    let config = BoardConfig::with_bonus().seeded(123);
    let mut first = Engine::initialize(config.clone(), RecordingPresentation::new()).unwrap();
    let mut second = Engine::initialize(config, RecordingPresentation::new()).unwrap();
    assert_eq!(first.grid(), second.grid());

    let moves = play_hinted(&mut first, 25);
    for (a, b) in &moves {
        second.attempt_swap(*a, *b).unwrap();
    }
    assert_eq!(first.grid(), second.grid());
    assert_eq!(first.score(), second.score());
    assert_eq!(first.port().calls, second.port().calls);
}

#[test]
fn different_seeds_give_different_boards() {
    let a = Engine::initialize(BoardConfig::classic().seeded(1), NullPresentation).unwrap();
    let b = Engine::initialize(BoardConfig::classic().seeded(2), NullPresentation).unwrap();
    assert_ne!(BoardLayout::capture(a.grid()), BoardLayout::capture(b.grid()));
}

#[test]
fn non_adjacent_swap_is_a_no_op() {
    let mut engine = Engine::initialize(BoardConfig::classic().seeded(5), RecordingPresentation::new()).unwrap();
    engine.port_mut().clear();
    let before = engine.grid().clone();

    for (a, b) in [
        (Pos::new(0, 0), Pos::new(2, 0)),
        (Pos::new(1, 1), Pos::new(2, 2)),
        (Pos::new(3, 3), Pos::new(3, 3)),
    ] {
        let err = engine.attempt_swap(a, b).unwrap_err();
        assert!(matches!(err, SwapError::NotAdjacent(..)));
        assert!(err.is_rejection());
    }
    assert!(matches!(
        engine.attempt_swap(Pos::new(4, 6), Pos::new(5, 6)),
        Err(SwapError::OutOfBounds(_))
    ));

    assert_eq!(engine.grid(), &before);
    assert_eq!(engine.score(), 0);
    assert!(engine.port().calls.is_empty());
    assert!(!engine.is_busy());
}

#[test]
fn unproductive_swap_round_trips() {
    let mut engine = Engine::initialize(BoardConfig::classic().seeded(11), NullPresentation).unwrap();
    let before = engine.grid().clone();

    let mut pair = None;
    for p in before.positions() {
        let q = p.offset(1, 0);
        if !before.in_bounds(q) {
            continue;
        }
        let mut scratch = before.clone();
        scratch.swap(p, q).unwrap();
        if find_matches(&scratch).is_empty() {
            pair = Some((p, q));
            break;
        }
    }
    let (a, b) = pair.expect("some swap makes no match");

    let outcome = engine.attempt_swap(a, b).unwrap();
    assert_eq!(outcome, SwapOutcome::Reverted);
    assert_eq!(engine.grid(), &before);
    assert_eq!(engine.score(), 0);
    assert!(!engine.is_busy());
}

#[test]
fn detector_never_returns_overlapping_groups() {
    let config = BoardConfig::classic();
    let mut rng = StdRng::seed_from_u64(2024);
    for _ in 0..200 {
        let rows: Vec<String> = (0..6)
            .map(|_| (0..6).map(|_| char::from(b'0' + rng.gen_range(0..3u8))).collect())
            .collect();
        let layout = BoardLayout { rows };
        let mut factory = TileFactory::new(config.alphabet(), None, 0);
        let grid = layout.build(&config, &mut factory).unwrap();

        let groups = find_matches(&grid);
        assert!(groups_are_disjoint(&groups));
        assert!(groups.iter().all(|g| g.len() >= 3));
        assert!(groups.iter().all(|g| g.tiles.iter().all(|t| t.kind == g.kind)));
        assert_eq!(find_matches(&grid), groups);
    }
}

#[test]
fn json_config_drives_a_session() {
    let config_json = json!({
        "rows": 8,
        "cols": 6,
        "kinds": ["APPLE", "BERRY", "CARROT", "PEAR", "GRAPE"],
        "bonus": "STAR",
        "seed": 99,
        "scoring": { "triple": 10, "quad": 20, "five_plus": 40, "bonus_per_tile": 5 }
    });
    let config = BoardConfig::from_json(&config_json.to_string()).unwrap();
    let mut engine = Engine::initialize(config, RecordingPresentation::new()).unwrap();
    assert_eq!(engine.grid().cols(), 6);
    assert_eq!(engine.grid().rows(), 8);

    play_hinted(&mut engine, 10);
    assert!(engine.score() >= 10);
    assert_eq!(engine.score() % 5, 0);

    let dump = engine.port().to_json().unwrap();
    assert!(dump.contains("ScoreChanged"));
}

#[test]
fn layout_from_json_starts_a_session() {
    let layout = BoardLayout::from_json(r#"{ "rows": ["ABCP", "BCPA", "CPAB", "AACA"] }"#).unwrap();
    let mut engine = Engine::from_layout(BoardConfig::classic(), &layout, NullPresentation).unwrap();
    assert_eq!(engine.grid().cols(), 4);
    let outcome = engine.attempt_swap(Pos::new(2, 3), Pos::new(3, 3)).unwrap();
    assert!(matches!(outcome, SwapOutcome::Resolved(_)));
    assert!(engine.score() >= 30);
}

#[test]
fn time_up_stops_input_after_play() {
    let mut engine = Engine::initialize(BoardConfig::classic().seeded(4), NullPresentation).unwrap();
    play_hinted(&mut engine, 3);
    let score = engine.score();
    engine.time_up();
    let (a, b) = engine.hint().unwrap();
    assert!(matches!(engine.attempt_swap(a, b), Err(SwapError::SessionOver)));
    assert_eq!(engine.score(), score);
    assert_eq!(format_hud(engine.score(), 0), format!("Score: {} | Time: 00:00", score));
}
