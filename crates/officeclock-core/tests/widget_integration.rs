//! Integration tests for the widget state through the on-disk store.
//!
//! Each test plays a sequence of commands with explicit timestamps,
//! reopening the store between steps the way separate CLI runs do.

use chrono::{TimeZone, Utc};
use officeclock_core::storage::STATE_KEY;
use officeclock_core::{Database, Event, Mode, PomodoroState, StateStore, Tab};
use tempfile::TempDir;

const MIN: i64 = 60_000;
const HOUR: i64 = 60 * MIN;

fn open(dir: &TempDir) -> StateStore {
    let db = Database::open_at(&dir.path().join("officeclock.db")).unwrap();
    StateStore::new(db, PomodoroState::default())
}

#[test]
fn office_week_survives_restarts() {
    let dir = TempDir::new().unwrap();
    // Monday 2024-06-10.
    let monday_9 = Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap();
    let t0 = monday_9.timestamp_millis();

    let mut state = open(&dir).load().unwrap();
    assert!(state.start_office(t0).is_some());
    open(&dir).save(&state).unwrap();

    let mut state = open(&dir).load().unwrap();
    assert!(state.start_office(t0 + HOUR).is_none());
    assert!(state.stop_office(t0 + 8 * HOUR).is_some());
    open(&dir).save(&state).unwrap();

    let state = open(&dir).load().unwrap();
    let wednesday = Utc.with_ymd_and_hms(2024, 6, 12, 12, 0, 0).unwrap();
    let summary = state.ledger().weekly_summary_at(&wednesday);
    assert_eq!(summary.total_ms, 8 * HOUR);
    assert_eq!(summary.avg_per_worked_day_ms, 8 * HOUR);
    assert_eq!(summary.avg_per_week_day_ms, 8 * HOUR / 7);
    assert_eq!(summary.avg_session_ms, 8 * HOUR);
}

#[test]
fn pomodoro_catches_up_after_process_was_gone() {
    let dir = TempDir::new().unwrap();

    let mut state = open(&dir).load().unwrap();
    state.pomodoro_mut().start(0);
    open(&dir).save(&state).unwrap();

    // 25m focus + 5m break + 10m into the next focus, nobody watching.
    let mut state = open(&dir).load().unwrap();
    let event = state.pomodoro_mut().tick(40 * MIN);
    assert!(matches!(
        event,
        Some(Event::PhasesAdvanced { from: Mode::Focus, to: Mode::Focus, phases: 2, .. })
    ));
    let p = state.pomodoro();
    assert_eq!(p.mode(), Mode::Focus);
    assert_eq!(p.completed_focus_sessions(), 1);
    assert_eq!(p.remaining_ms(), 15 * MIN as u64);
    open(&dir).save(&state).unwrap();

    let mut state = open(&dir).load().unwrap();
    state.pomodoro_mut().pause(45 * MIN);
    assert_eq!(state.pomodoro().remaining_ms(), 10 * MIN as u64);
    assert!(!state.pomodoro().is_running());
}

#[test]
fn corrupt_blob_resets_quietly() {
    let dir = TempDir::new().unwrap();
    let db = Database::open_at(&dir.path().join("officeclock.db")).unwrap();
    db.kv_set(STATE_KEY, "{\"sessions\": 12, \"activeStart\": 5").unwrap();
    drop(db);

    let state = open(&dir).load().unwrap();
    assert!(state.ledger().sessions().is_empty());
    assert_eq!(state.ledger().active_start(), None);
}

#[test]
fn tab_selection_round_trips() {
    let dir = TempDir::new().unwrap();
    assert_eq!(open(&dir).load_tab().unwrap(), Tab::Office);
    open(&dir).save_tab(Tab::Stats).unwrap();
    assert_eq!(open(&dir).load_tab().unwrap(), Tab::Stats);
}
