use super::*;

// =============================================================================
// Helpers
// =============================================================================

const WHITE: usize = 0;
const BLACK: usize = 1;
const RED: usize = 2;

fn v(token: &str) -> VersionId {
    VersionId::new(token)
}

/// 2x2 grid, palette white/black/red with red unavailable.
fn snapshot(version: &str, cells: [usize; 4]) -> MapResponse {
    MapResponse {
        version_id: v(version),
        size: 2,
        colors: vec![Rgb::WHITE, Rgb::BLACK, Rgb([255, 0, 0])],
        available_color_indexes: Some(BTreeSet::from([WHITE, BLACK])),
        cell_color_indexes: cells.to_vec(),
    }
}

fn loaded(version: &str, cells: [usize; 4]) -> GridState {
    let mut state = GridState::new();
    state.apply_snapshot(snapshot(version, cells)).unwrap();
    state
}

fn all_white() -> [usize; 4] {
    [WHITE; 4]
}

// =============================================================================
// Snapshots
// =============================================================================

#[test]
fn new_state_is_empty() {
    let state = GridState::new();
    assert!(!state.is_loaded());
    assert_eq!(state.size(), 0);
    assert!(state.pixels().is_empty());
    assert!(state.pending().is_empty());
}

#[test]
fn first_snapshot_loads_and_changes() {
    let mut state = GridState::new();
    let outcome = state.apply_snapshot(snapshot("1", [WHITE, BLACK, BLACK, WHITE])).unwrap();
    assert!(outcome.first_load);
    assert!(outcome.changed);
    assert_eq!(state.version_id(), Some(&v("1")));
    assert_eq!(state.pixels(), &[Rgb::WHITE, Rgb::BLACK, Rgb::BLACK, Rgb::WHITE]);
    assert_eq!(state.color_at(1, 0), Some(Rgb::BLACK));
    assert_eq!(state.available_color_indexes(), &BTreeSet::from([WHITE, BLACK]));
}

#[test]
fn same_version_is_not_a_change() {
    let mut state = loaded("1", all_white());
    let outcome = state.apply_snapshot(snapshot("1", all_white())).unwrap();
    assert!(!outcome.first_load);
    assert!(!outcome.changed);
}

#[test]
fn newer_version_replaces_base_wholesale() {
    let mut state = loaded("1", all_white());
    let mut next = snapshot("2", [BLACK; 4]);
    next.size = 1;
    next.cell_color_indexes = vec![BLACK];
    next.available_color_indexes = None;

    let outcome = state.apply_snapshot(next).unwrap();

    assert!(outcome.changed);
    assert!(!outcome.first_load);
    assert_eq!(state.size(), 1);
    assert_eq!(state.pixels(), &[Rgb::BLACK]);
    assert_eq!(state.available_color_indexes(), &BTreeSet::from([WHITE, BLACK, RED]));
}

#[test]
fn older_snapshot_is_ignored() {
    let mut state = loaded("5", all_white());
    let outcome = state.apply_snapshot(snapshot("4", [BLACK; 4])).unwrap();
    assert!(outcome.stale);
    assert!(!outcome.changed);
    assert_eq!(state.version_id(), Some(&v("5")));
    assert_eq!(state.color_at(0, 0), Some(Rgb::WHITE));
}

#[test]
fn repeated_older_snapshots_rebase() {
    let mut state = loaded("500", all_white());
    let confirmed = state.begin_edit(0, 0, BLACK).unwrap();
    state.confirm_edit(confirmed, v("600"));
    let unconfirmed = state.begin_edit(1, 1, BLACK).unwrap();

    for _ in 1..STALE_REBASE_AFTER {
        let outcome = state.apply_snapshot(snapshot("10", all_white())).unwrap();
        assert!(outcome.stale);
        assert_eq!(state.version_id(), Some(&v("500")));
    }

    let outcome = state.apply_snapshot(snapshot("11", [WHITE, WHITE, BLACK, WHITE])).unwrap();

    assert!(outcome.rebased);
    assert!(outcome.changed);
    assert!(!outcome.stale);
    assert_eq!(outcome.dropped_edits, 1);
    assert_eq!(state.version_id(), Some(&v("11")));
    assert_eq!(state.pending().len(), 1);
    assert_eq!(state.pending()[0].id, unconfirmed);
    assert_eq!(state.color_at(0, 0), Some(Rgb::WHITE));
    assert_eq!(state.color_at(0, 1), Some(Rgb::BLACK));
    assert_eq!(state.color_at(1, 1), Some(Rgb::BLACK));
}

#[test]
fn current_snapshot_resets_stale_streak() {
    let mut state = loaded("5", all_white());
    for _ in 1..STALE_REBASE_AFTER {
        assert!(state.apply_snapshot(snapshot("4", all_white())).unwrap().stale);
    }
    state.apply_snapshot(snapshot("5", all_white())).unwrap();

    let outcome = state.apply_snapshot(snapshot("4", all_white())).unwrap();
    assert!(outcome.stale);
    assert!(!outcome.rebased);
    assert_eq!(state.version_id(), Some(&v("5")));
}

#[test]
fn malformed_snapshot_leaves_state_untouched() {
    let mut state = loaded("1", all_white());
    let mut bad = snapshot("2", [BLACK; 4]);
    bad.cell_color_indexes.push(BLACK);
    assert!(matches!(state.apply_snapshot(bad), Err(SyncError::MalformedSnapshot(_))));
    assert_eq!(state.version_id(), Some(&v("1")));
    assert_eq!(state.color_at(0, 0), Some(Rgb::WHITE));
}

// =============================================================================
// begin_edit
// =============================================================================

#[test]
fn edit_overlays_immediately() {
    let mut state = loaded("1", all_white());
    let id = state.begin_edit(0, 1, BLACK).unwrap();
    assert_eq!(state.color_at(0, 1), Some(Rgb::BLACK));
    assert_eq!(state.color_index_at(0, 1), Some(BLACK));
    assert_eq!(state.pending().len(), 1);
    assert_eq!(state.pending()[0].id, id);
    assert!(!state.pending()[0].is_confirmed());
}

#[test]
fn unavailable_color_fails_without_mutation() {
    let mut state = loaded("1", all_white());
    let err = state.begin_edit(0, 0, RED).unwrap_err();
    assert!(matches!(err, SyncError::InvalidColorIndex { color_index: RED }));
    assert!(state.pending().is_empty());
    assert_eq!(state.color_at(0, 0), Some(Rgb::WHITE));
}

#[test]
fn unknown_color_fails_before_load() {
    let mut state = GridState::new();
    assert!(matches!(state.begin_edit(0, 0, WHITE), Err(SyncError::InvalidColorIndex { .. })));
}

#[test]
fn out_of_range_cell_fails_without_mutation() {
    let mut state = loaded("1", all_white());
    let err = state.begin_edit(2, 0, BLACK).unwrap_err();
    assert!(matches!(err, SyncError::CellOutOfRange { x_index: 2, y_index: 0, size: 2 }));
    assert!(state.pending().is_empty());
}

#[test]
fn edit_ids_increase_in_issue_order() {
    let mut state = loaded("1", all_white());
    let a = state.begin_edit(0, 0, BLACK).unwrap();
    let b = state.begin_edit(0, 0, WHITE).unwrap();
    assert!(a < b);
}

#[test]
fn latest_edit_to_a_cell_wins() {
    let mut state = loaded("1", all_white());
    state.begin_edit(1, 1, BLACK).unwrap();
    state.begin_edit(1, 1, WHITE).unwrap();
    assert_eq!(state.color_at(1, 1), Some(Rgb::WHITE));
    assert_eq!(state.pending().len(), 2);
}

// =============================================================================
// Refresh vs. pending edits
// =============================================================================

#[test]
fn refresh_does_not_roll_back_unconfirmed_edit() {
    let mut state = loaded("1", all_white());
    state.begin_edit(0, 0, BLACK).unwrap();

    state.apply_snapshot(snapshot("2", all_white())).unwrap();

    assert_eq!(state.color_at(0, 0), Some(Rgb::BLACK));
    assert_eq!(state.pending().len(), 1);
}

#[test]
fn confirmed_edit_kept_until_snapshot_reaches_its_version() {
    let mut state = loaded("1", all_white());
    let id = state.begin_edit(0, 0, BLACK).unwrap();
    assert_eq!(state.confirm_edit(id, v("3")), Confirmation::Awaiting);

    let outcome = state.apply_snapshot(snapshot("2", all_white())).unwrap();
    assert_eq!(outcome.dropped_edits, 0);
    assert_eq!(state.pending().len(), 1);
    assert_eq!(state.color_at(0, 0), Some(Rgb::BLACK));

    let outcome = state.apply_snapshot(snapshot("3", [BLACK, WHITE, WHITE, WHITE])).unwrap();
    assert_eq!(outcome.dropped_edits, 1);
    assert!(state.pending().is_empty());
    assert_eq!(state.color_at(0, 0), Some(Rgb::BLACK));
}

#[test]
fn snapshot_past_confirmed_version_shows_server_state() {
    let mut state = loaded("1", all_white());
    let id = state.begin_edit(0, 0, BLACK).unwrap();
    state.confirm_edit(id, v("2"));

    // Someone else repainted the cell after our write landed.
    state.apply_snapshot(snapshot("3", all_white())).unwrap();

    assert!(state.pending().is_empty());
    assert_eq!(state.color_at(0, 0), Some(Rgb::WHITE));
}

#[test]
fn worked_example_two_by_two() {
    let mut state = loaded("1", all_white());

    let id = state.begin_edit(0, 0, BLACK).unwrap();
    assert_eq!(state.color_at(0, 0), Some(Rgb::BLACK));

    assert_eq!(state.confirm_edit(id, v("2")), Confirmation::Awaiting);
    let outcome = state.apply_snapshot(snapshot("2", [BLACK, WHITE, WHITE, WHITE])).unwrap();

    assert!(outcome.changed);
    assert_eq!(outcome.dropped_edits, 1);
    assert!(state.pending().is_empty());
    assert_eq!(state.color_at(0, 0), Some(Rgb::BLACK));
}

#[test]
fn confirmation_after_snapshot_caught_up_drops_at_once() {
    let mut state = loaded("1", all_white());
    let id = state.begin_edit(0, 0, BLACK).unwrap();
    state.apply_snapshot(snapshot("2", [BLACK, WHITE, WHITE, WHITE])).unwrap();
    assert_eq!(state.pending().len(), 1);

    assert_eq!(state.confirm_edit(id, v("2")), Confirmation::Dropped { changed: false });
    assert!(state.pending().is_empty());
    assert_eq!(state.color_at(0, 0), Some(Rgb::BLACK));
}

#[test]
fn late_confirmation_reveals_newer_server_color() {
    let mut state = loaded("1", all_white());
    let id = state.begin_edit(0, 0, BLACK).unwrap();

    // Our write landed at 2, then someone repainted the cell white at 3.
    state.apply_snapshot(snapshot("3", all_white())).unwrap();
    assert_eq!(state.color_at(0, 0), Some(Rgb::BLACK));

    assert_eq!(state.confirm_edit(id, v("2")), Confirmation::Dropped { changed: true });
    assert_eq!(state.color_at(0, 0), Some(Rgb::WHITE));
}

#[test]
fn confirm_unknown_edit_is_reported() {
    let mut state = loaded("1", all_white());
    assert_eq!(state.confirm_edit(EditId(99), v("2")), Confirmation::Unknown);
}

#[test]
fn edits_to_same_cell_resolve_independently() {
    let mut state = loaded("1", all_white());
    let first = state.begin_edit(1, 0, BLACK).unwrap();
    let second = state.begin_edit(1, 0, WHITE).unwrap();
    state.confirm_edit(first, v("2"));
    state.confirm_edit(second, v("3"));

    state.apply_snapshot(snapshot("2", [WHITE, BLACK, WHITE, WHITE])).unwrap();
    assert_eq!(state.pending().len(), 1);
    assert_eq!(state.pending()[0].id, second);
    assert_eq!(state.color_at(1, 0), Some(Rgb::WHITE));

    state.apply_snapshot(snapshot("3", all_white())).unwrap();
    assert!(state.pending().is_empty());
}

// =============================================================================
// Failure
// =============================================================================

#[test]
fn failed_edit_reverts_to_base() {
    let mut state = loaded("1", [WHITE, BLACK, WHITE, WHITE]);
    let id = state.begin_edit(1, 0, WHITE).unwrap();
    assert_eq!(state.color_at(1, 0), Some(Rgb::WHITE));

    assert!(state.fail_edit(id));

    assert!(state.pending().is_empty());
    assert_eq!(state.color_at(1, 0), Some(Rgb::BLACK));
}

#[test]
fn failed_edit_reveals_earlier_pending_edit() {
    let mut state = loaded("1", all_white());
    state.begin_edit(0, 0, BLACK).unwrap();
    let later = state.begin_edit(0, 0, WHITE).unwrap();

    state.fail_edit(later);

    assert_eq!(state.color_at(0, 0), Some(Rgb::BLACK));
}

#[test]
fn failing_unknown_edit_is_a_no_op() {
    let mut state = loaded("1", all_white());
    assert!(!state.fail_edit(EditId(7)));
}

// =============================================================================
// View
// =============================================================================

#[test]
fn view_mirrors_state() {
    let mut state = loaded("1", all_white());
    state.begin_edit(1, 1, BLACK).unwrap();
    let view = state.view();
    assert!(view.is_loaded());
    assert_eq!(view.size, 2);
    assert_eq!(view.pending_edits, 1);
    assert_eq!(view.color_at(1, 1), Some(Rgb::BLACK));
    assert_eq!(view.color_index_at(1, 1), Some(BLACK));
    assert_eq!(view.raw_pixels()[3], [0, 0, 0]);
    assert_eq!(view.color_at(2, 0), None);
}
