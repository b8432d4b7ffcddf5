use tilematch::*;

fn engine_from(rows: &[&str], config: BoardConfig) -> Engine<RecordingPresentation> {
    Engine::from_layout(config, &BoardLayout::from_rows(rows), RecordingPresentation::new()).unwrap()
}

#[test]
fn horizontal_triple_resolves_in_one_pass() {
    let mut engine = engine_from(&["1230", "2301", "3012", "0002"], BoardConfig::classic());
    let groups = find_matches(engine.grid());
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 3);

    let matched: Vec<TileId> = groups[0].tiles.iter().map(|t| t.id).collect();
    let above = engine.grid().tile(Pos::new(0, 2)).copied().unwrap();

    let pass = engine.resolve_pass(true).unwrap().expect("one match to resolve");
    assert_eq!(pass.points, 30);
    assert_eq!(engine.score(), 30);

    let mut removed: Vec<TileId> = pass.removed.iter().map(|t| t.id).collect();
    removed.sort();
    let mut expected = matched.clone();
    expected.sort();
    assert_eq!(removed, expected);

    // three columns, three tiles each, one row down
    assert_eq!(pass.drops.len(), 9);
    assert!(pass.drops.iter().all(|d| d.col < 3 && d.to_row == d.from_row + 1));
    let moved = engine.grid().tile(Pos::new(0, 3)).unwrap();
    assert_eq!(moved.id, above.id);

    assert_eq!(pass.spawned.len(), 3);
    assert!(pass.spawned.iter().all(|t| t.row == 0 && t.col < 3 && !t.is_bonus()));
    assert!(pass.bonuses.is_empty());
    assert!(engine.grid().is_full());
    assert!(engine.grid().coords_consistent());

    let barriers = engine.port().barriers();
    assert_eq!(barriers, vec![Step::Removal, Step::Drop, Step::Refill]);
    assert_eq!(engine.port().events(), vec![EngineEvent::ScoreChanged(30)]);
}

#[test]
fn swap_into_a_match_runs_a_full_cycle() {
    let mut engine = engine_from(&["1230", "2301", "3012", "0020"], BoardConfig::classic());
    assert!(find_matches(engine.grid()).is_empty());

    let outcome = engine.attempt_swap(Pos::new(2, 3), Pos::new(3, 3)).unwrap();
    let SwapOutcome::Resolved(report) = outcome else {
        panic!("expected the swap to resolve");
    };
    assert!(report.bonus.is_none());
    assert_eq!(report.passes[0].groups.len(), 1);
    assert_eq!(report.passes[0].groups[0].len(), 3);
    assert!(engine.score() >= 30);
    assert_eq!(engine.score(), report.points());

    assert!(!engine.is_busy());
    assert_eq!(engine.state(), EngineState::Idle);
    assert!(find_matches(engine.grid()).is_empty());
    assert!(engine.has_legal_move());

    let barriers = engine.port().barriers();
    assert_eq!(barriers[0], Step::Swap);
    assert_eq!(barriers[1], Step::Removal);
    assert_eq!(engine.port().events().last(), Some(&EngineEvent::BoardIdle));
}

#[test]
fn l_shape_spawns_bonus_at_the_corner() {
    let mut engine = engine_from(&["0123", "0231", "0002", "1313"], BoardConfig::with_bonus());
    let groups = find_matches(engine.grid());
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 5);
    let corner = Pos::new(0, 2);
    assert_eq!(groups[0].in_group_neighbors(corner), 2);
    assert_eq!(groups[0].in_group_neighbors(Pos::new(0, 0)), 1);
    assert_eq!(groups[0].in_group_neighbors(Pos::new(2, 2)), 1);
    assert_eq!(groups[0].anchor().map(|t| t.pos()), Some(corner));

    let pass = engine.resolve_pass(true).unwrap().unwrap();
    assert_eq!(pass.removed.len(), 5);
    assert_eq!(pass.points, 100);
    assert_eq!(pass.bonuses.len(), 1);
    assert_eq!(pass.bonuses[0].pos(), corner);

    let at_corner = engine.grid().tile(corner).unwrap();
    assert!(at_corner.is_bonus());
    assert_eq!(at_corner.id, pass.bonuses[0].id);
    assert_eq!(pass.spawned.len(), 4);
    assert!(engine.grid().is_full());
}

#[test]
fn mirrored_l_shape_spawns_bonus_at_the_corner() {
    let mut engine = engine_from(&["1203", "2301", "0003", "1313"], BoardConfig::with_bonus());
    let corner = Pos::new(2, 2);
    let groups = find_matches(engine.grid());
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].anchor().map(|t| t.pos()), Some(corner));

    let pass = engine.resolve_pass(true).unwrap().unwrap();
    assert_eq!(pass.bonuses.len(), 1);
    assert_eq!(pass.bonuses[0].pos(), corner);
    // the cell below the corner stays occupied, so the bonus does not move
    let at_corner = engine.grid().tile(corner).unwrap();
    assert!(at_corner.is_bonus());
    assert_eq!(at_corner.id, pass.bonuses[0].id);
}

#[test]
fn bonus_placed_above_a_gap_falls_with_its_column() {
    let mut engine = engine_from(&["2313", "1000", "2031", "3023"], BoardConfig::with_bonus());
    let corner = Pos::new(1, 1);
    let above = engine.grid().tile(Pos::new(1, 0)).copied().unwrap();

    let pass = engine.resolve_pass(true).unwrap().unwrap();
    assert_eq!(pass.removed.len(), 5);
    assert_eq!(pass.bonuses.len(), 1);
    let bonus = pass.bonuses[0];
    assert_eq!(bonus.pos(), corner);

    let landed = Pos::new(1, 3);
    assert_eq!(engine.grid().tile(landed).map(|t| t.id), Some(bonus.id));
    assert!(engine.grid().tile(landed).unwrap().is_bonus());
    assert!(pass.drops.contains(&DropMove { id: bonus.id, col: 1, from_row: 1, to_row: 3 }));
    assert_eq!(engine.grid().tile(Pos::new(1, 2)).map(|t| t.id), Some(above.id));
    assert_eq!(pass.spawned.len(), 4);
    assert!(pass.spawned.iter().all(|t| !t.is_bonus()));

    let barriers = engine.port().barriers();
    assert_eq!(barriers, vec![Step::Removal, Step::BonusSpawn, Step::Drop, Step::Refill]);
}

#[test]
fn l_shape_without_bonus_kind_spawns_nothing_special() {
    let mut engine = engine_from(&["0123", "0231", "0002", "1313"], BoardConfig::classic());
    let pass = engine.resolve_pass(true).unwrap().unwrap();
    assert!(pass.bonuses.is_empty());
    assert_eq!(pass.spawned.len(), 5);
    assert!(engine.grid().occupied().iter().all(|t| !t.is_bonus()));
}

#[test]
fn bonus_swap_clears_every_tile_of_the_other_kind() {
    let mut engine = engine_from(&["2*10", "3120", "0312", "2013"], BoardConfig::with_bonus());
    let berry = TileKind(1);
    assert_eq!(engine.grid().count_kind(berry), 4);
    assert!(find_matches(engine.grid()).is_empty());

    let outcome = engine.attempt_swap(Pos::new(1, 0), Pos::new(2, 0)).unwrap();
    let SwapOutcome::Resolved(report) = outcome else {
        panic!("bonus swap never reverts");
    };
    let bonus = report.bonus.as_ref().expect("bonus path taken");
    assert_eq!(bonus.kind, berry);
    assert_eq!(bonus.cleared.len(), 5);
    assert_eq!(bonus.cleared.iter().filter(|t| t.is_bonus()).count(), 1);
    assert_eq!(bonus.points, 5 * engine.config().scoring.bonus_per_tile);
    assert_eq!(engine.score(), report.points());

    // the follow-up cascade left a settled board
    assert!(find_matches(engine.grid()).is_empty());
    assert!(engine.grid().is_full());
    assert!(!engine.is_busy());
    let barriers = engine.port().barriers();
    assert_eq!(&barriers[..4], &[Step::Swap, Step::Removal, Step::Drop, Step::Refill]);
}

#[test]
fn two_bonus_tiles_swap_like_ordinary_tiles() {
    let mut engine = engine_from(&["**10", "3120", "0312", "2013"], BoardConfig::with_bonus());
    let before = engine.grid().clone();
    let outcome = engine.attempt_swap(Pos::new(0, 0), Pos::new(1, 0)).unwrap();
    assert_eq!(outcome, SwapOutcome::Reverted);
    assert_eq!(engine.grid(), &before);
}

#[test]
fn dead_board_is_reshuffled_into_a_playable_one() {
    let mut engine = engine_from(&["0123", "1230", "2301", "3012"], BoardConfig::classic().seeded(17));
    assert!(find_matches(engine.grid()).is_empty());
    assert!(!engine.has_legal_move());

    let mut ids_before: Vec<TileId> = engine.grid().occupied().iter().map(|t| t.id).collect();
    ids_before.sort();

    assert!(engine.ensure_playable().unwrap());
    assert!(find_matches(engine.grid()).is_empty());
    assert!(engine.has_legal_move());
    assert!(engine.grid().coords_consistent());

    let mut ids_after: Vec<TileId> = engine.grid().occupied().iter().map(|t| t.id).collect();
    ids_after.sort();
    assert_eq!(ids_before, ids_after);
    for k in 0..4 {
        assert_eq!(engine.grid().count_kind(TileKind(k)), 4);
    }

    assert!(engine.port().events().contains(&EngineEvent::BoardReshuffled));
    assert!(engine.port().barriers().contains(&Step::Reshuffle));
    assert_eq!(engine.state(), EngineState::Idle);
}

#[test]
fn playable_board_is_left_alone() {
    let mut engine = engine_from(&["1230", "2301", "3012", "0020"], BoardConfig::classic());
    let before = engine.grid().clone();
    assert!(!engine.ensure_playable().unwrap());
    assert_eq!(engine.grid(), &before);
}

#[test]
fn bonus_swap_alone_keeps_a_board_playable() {
    let mut engine = engine_from(&["0123", "1230", "2301", "301*"], BoardConfig::with_bonus().seeded(17));
    assert!(find_matches(engine.grid()).is_empty());
    assert!(engine.has_legal_move());
    let (a, b) = engine.hint().unwrap();
    assert!(engine.grid().tile(a).unwrap().is_bonus() || engine.grid().tile(b).unwrap().is_bonus());

    let before = engine.grid().clone();
    assert!(!engine.ensure_playable().unwrap());
    assert_eq!(engine.grid(), &before);
    assert!(!engine.port().events().contains(&EngineEvent::BoardReshuffled));
}
