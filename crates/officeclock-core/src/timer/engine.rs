//! Pomodoro reconciler.
//!
//! A wall-clock-based focus/break countdown. Nothing runs in the
//! background: every command takes `now`, and elapsed time since the last
//! observation is replayed through as many focus/break phases as it
//! covers. The process can be gone for hours and still catch up exactly.
//!
//! ## State Transitions
//!
//! ```text
//! Focus --(countdown hits 0)--> Break --(countdown hits 0)--> Focus
//! ```
//!
//! Leaving `Focus` increments the completed-session counter.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::clock;
use crate::error::ValidationError;
use crate::events::Event;

pub const DEFAULT_FOCUS_MINUTES: u32 = 25;
pub const DEFAULT_BREAK_MINUTES: u32 = 5;
pub const MIN_MINUTES: u32 = 1;
pub const MAX_MINUTES: u32 = 180;

const MS_PER_MINUTE: u64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Focus,
    Break,
}

impl Mode {
    pub fn other(self) -> Self {
        match self {
            Mode::Focus => Mode::Break,
            Mode::Break => Mode::Focus,
        }
    }
}

/// Outcome of replaying elapsed time through the countdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Advance {
    /// Number of countdowns that ran out.
    pub phases: u64,
    /// Focus countdowns among them.
    pub focus_completed: u64,
}

/// Focus/break countdown state.
///
/// Invariant: `remaining_ms` never exceeds the duration of the current
/// mode. Deserialization repairs values that break it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawPomodoro")]
pub struct PomodoroState {
    focus_minutes: u32,
    break_minutes: u32,
    mode: Mode,
    remaining_ms: u64,
    running: bool,
    last_tick_ms: Option<i64>,
    completed_focus_sessions: u32,
}

impl Default for PomodoroState {
    fn default() -> Self {
        Self::fresh(DEFAULT_FOCUS_MINUTES, DEFAULT_BREAK_MINUTES)
    }
}

impl PomodoroState {
    /// A stopped countdown at the start of a focus phase.
    ///
    /// # Errors
    /// Returns `InvalidValue` if either duration is outside
    /// `MIN_MINUTES..=MAX_MINUTES`.
    pub fn new(focus_minutes: u32, break_minutes: u32) -> Result<Self, ValidationError> {
        validate_minutes("focusMinutes", focus_minutes)?;
        validate_minutes("breakMinutes", break_minutes)?;
        Ok(Self::fresh(focus_minutes, break_minutes))
    }

    fn fresh(focus_minutes: u32, break_minutes: u32) -> Self {
        Self {
            focus_minutes,
            break_minutes,
            mode: Mode::Focus,
            remaining_ms: minutes_to_ms(focus_minutes),
            running: false,
            last_tick_ms: None,
            completed_focus_sessions: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn last_tick_ms(&self) -> Option<i64> {
        self.last_tick_ms
    }

    pub fn completed_focus_sessions(&self) -> u32 {
        self.completed_focus_sessions
    }

    pub fn focus_minutes(&self) -> u32 {
        self.focus_minutes
    }

    pub fn break_minutes(&self) -> u32 {
        self.break_minutes
    }

    /// Full duration of `mode` with the configured minutes.
    pub fn duration_ms(&self, mode: Mode) -> u64 {
        match mode {
            Mode::Focus => minutes_to_ms(self.focus_minutes),
            Mode::Break => minutes_to_ms(self.break_minutes),
        }
    }

    pub fn total_ms(&self) -> u64 {
        self.duration_ms(self.mode)
    }

    /// Reconciled view at `now` without touching `self`.
    pub fn snapshot(&self, now: i64) -> Event {
        let mut view = self.clone();
        view.flush(now);
        Event::PomodoroSnapshot {
            mode: view.mode,
            running: view.running,
            remaining_ms: view.remaining_ms,
            total_ms: view.total_ms(),
            focus_minutes: view.focus_minutes,
            break_minutes: view.break_minutes,
            completed_focus_sessions: view.completed_focus_sessions,
            at: clock::from_ms(now, &Utc),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, now: i64) -> Option<Event> {
        if self.running {
            return None;
        }
        self.running = true;
        self.last_tick_ms = Some(now);
        Some(Event::PomodoroStarted {
            mode: self.mode,
            remaining_ms: self.remaining_ms,
            at: clock::from_ms(now, &Utc),
        })
    }

    /// Call periodically. Returns `Some(Event::PhasesAdvanced)` when at
    /// least one countdown ran out since the previous call.
    pub fn tick(&mut self, now: i64) -> Option<Event> {
        if !self.running {
            return None;
        }
        let from = self.mode;
        let advance = self.flush(now);
        self.phases_event(from, advance, now)
    }

    /// Reconcile up to `now` and stop the countdown.
    ///
    /// Returns the pause event, preceded by a `PhasesAdvanced` event when
    /// countdowns ran out in the meantime.
    pub fn pause(&mut self, now: i64) -> Vec<Event> {
        if !self.running {
            return Vec::new();
        }
        let from = self.mode;
        let advance = self.flush(now);
        self.running = false;
        self.last_tick_ms = None;

        let mut events: Vec<Event> = self.phases_event(from, advance, now).into_iter().collect();
        events.push(Event::PomodoroPaused {
            mode: self.mode,
            remaining_ms: self.remaining_ms,
            at: clock::from_ms(now, &Utc),
        });
        events
    }

    /// Back to a stopped, full-length focus countdown with no completed
    /// sessions, using the currently configured minutes.
    pub fn reset(&mut self, now: i64) -> Event {
        *self = Self::fresh(self.focus_minutes, self.break_minutes);
        Event::PomodoroReset {
            focus_minutes: self.focus_minutes,
            break_minutes: self.break_minutes,
            at: clock::from_ms(now, &Utc),
        }
    }

    /// Change the configured durations. Only allowed while stopped.
    ///
    /// An untouched countdown (still at its full duration) picks up the
    /// new length immediately; a partially run one is clamped.
    ///
    /// # Errors
    /// Returns `Locked` while running and `InvalidValue` for durations
    /// outside `MIN_MINUTES..=MAX_MINUTES`. Nothing changes on error.
    pub fn set_minutes(
        &mut self,
        focus_minutes: u32,
        break_minutes: u32,
    ) -> Result<(), ValidationError> {
        if self.running {
            return Err(ValidationError::Locked {
                field: "durations".into(),
            });
        }
        validate_minutes("focusMinutes", focus_minutes)?;
        validate_minutes("breakMinutes", break_minutes)?;

        let untouched = self.remaining_ms == self.total_ms();
        self.focus_minutes = focus_minutes;
        self.break_minutes = break_minutes;
        let total = self.total_ms();
        self.remaining_ms = if untouched {
            total
        } else {
            self.remaining_ms.min(total)
        };
        Ok(())
    }

    /// Apply user-typed minute values, keeping the previous value for any
    /// input that does not parse or is out of range.
    ///
    /// # Errors
    /// Returns `Locked` while running.
    pub fn apply_minute_input(
        &mut self,
        focus: Option<&str>,
        brk: Option<&str>,
    ) -> Result<MinuteInput, ValidationError> {
        if self.running {
            return Err(ValidationError::Locked {
                field: "durations".into(),
            });
        }
        let mut rejected = Vec::new();
        let focus_minutes = resolve_input("focus", focus, self.focus_minutes, &mut rejected);
        let break_minutes = resolve_input("break", brk, self.break_minutes, &mut rejected);
        self.set_minutes(focus_minutes, break_minutes)?;
        Ok(MinuteInput {
            focus_minutes,
            break_minutes,
            rejected,
        })
    }

    /// Replay `elapsed_ms` of wall-clock time through the countdown.
    ///
    /// Applying one delta gives the same state as applying any split of
    /// it. A countdown that reaches exactly zero flips the mode.
    pub fn reconcile(&mut self, elapsed_ms: u64) -> Advance {
        let mut advance = Advance::default();
        if elapsed_ms < self.remaining_ms {
            self.remaining_ms -= elapsed_ms;
            return advance;
        }

        let mut left = elapsed_ms - self.remaining_ms;
        self.flip(&mut advance);

        // Skip whole focus+break cycles in one step.
        let cycle = minutes_to_ms(self.focus_minutes) + minutes_to_ms(self.break_minutes);
        let cycles = left / cycle;
        if cycles > 0 {
            left -= cycles * cycle;
            advance.phases += cycles * 2;
            advance.focus_completed += cycles;
            self.add_completed(cycles);
        }

        while left >= self.remaining_ms {
            left -= self.remaining_ms;
            self.flip(&mut advance);
        }
        self.remaining_ms -= left;
        advance
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn flush(&mut self, now: i64) -> Advance {
        let Some(last) = self.last_tick_ms else {
            return Advance::default();
        };
        // A clock that went backwards counts as no time passing.
        let elapsed = u64::try_from(now.saturating_sub(last)).unwrap_or(0);
        let advance = self.reconcile(elapsed);
        self.last_tick_ms = Some(now.max(last));
        advance
    }

    fn flip(&mut self, advance: &mut Advance) {
        if self.mode == Mode::Focus {
            advance.focus_completed += 1;
            self.add_completed(1);
        }
        advance.phases += 1;
        self.mode = self.mode.other();
        self.remaining_ms = self.total_ms();
    }

    fn add_completed(&mut self, n: u64) {
        let n = u32::try_from(n).unwrap_or(u32::MAX);
        self.completed_focus_sessions = self.completed_focus_sessions.saturating_add(n);
    }

    fn phases_event(&self, from: Mode, advance: Advance, now: i64) -> Option<Event> {
        if advance.phases == 0 {
            return None;
        }
        tracing::info!(
            from = ?from,
            to = ?self.mode,
            phases = advance.phases,
            completed = self.completed_focus_sessions,
            "pomodoro phase change"
        );
        Some(Event::PhasesAdvanced {
            from,
            to: self.mode,
            phases: advance.phases,
            completed_focus_sessions: self.completed_focus_sessions,
            at: clock::from_ms(now, &Utc),
        })
    }
}

/// Effective minutes after applying user input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MinuteInput {
    pub focus_minutes: u32,
    pub break_minutes: u32,
    /// Inputs that were ignored, e.g. `"focus: abc"`.
    pub rejected: Vec<String>,
}

fn minutes_to_ms(minutes: u32) -> u64 {
    u64::from(minutes) * MS_PER_MINUTE
}

fn validate_minutes(field: &str, minutes: u32) -> Result<(), ValidationError> {
    if (MIN_MINUTES..=MAX_MINUTES).contains(&minutes) {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.into(),
            message: format!("must be between {MIN_MINUTES} and {MAX_MINUTES}, got {minutes}"),
        })
    }
}

fn resolve_input(
    name: &str,
    input: Option<&str>,
    previous: u32,
    rejected: &mut Vec<String>,
) -> u32 {
    let Some(raw) = input else {
        return previous;
    };
    match raw.trim().parse::<u32>() {
        Ok(m) if (MIN_MINUTES..=MAX_MINUTES).contains(&m) => m,
        _ => {
            tracing::warn!(input = raw, previous, "ignoring invalid {} minutes", name);
            rejected.push(format!("{name}: {raw}"));
            previous
        }
    }
}

/// Persisted shape; every field optional so partial blobs still load.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawPomodoro {
    focus_minutes: u32,
    break_minutes: u32,
    mode: Mode,
    remaining_ms: Option<u64>,
    running: bool,
    last_tick_ms: Option<i64>,
    completed_focus_sessions: u32,
}

impl Default for RawPomodoro {
    fn default() -> Self {
        Self {
            focus_minutes: DEFAULT_FOCUS_MINUTES,
            break_minutes: DEFAULT_BREAK_MINUTES,
            mode: Mode::Focus,
            remaining_ms: None,
            running: false,
            last_tick_ms: None,
            completed_focus_sessions: 0,
        }
    }
}

impl From<RawPomodoro> for PomodoroState {
    fn from(raw: RawPomodoro) -> Self {
        let focus_minutes = if validate_minutes("focusMinutes", raw.focus_minutes).is_ok() {
            raw.focus_minutes
        } else {
            DEFAULT_FOCUS_MINUTES
        };
        let break_minutes = if validate_minutes("breakMinutes", raw.break_minutes).is_ok() {
            raw.break_minutes
        } else {
            DEFAULT_BREAK_MINUTES
        };
        let mut state = Self::fresh(focus_minutes, break_minutes);
        state.mode = raw.mode;
        let total = state.total_ms();
        state.remaining_ms = raw.remaining_ms.map_or(total, |r| r.min(total));
        // A running countdown needs a reference point to reconcile from.
        state.running = raw.running && raw.last_tick_ms.is_some();
        state.last_tick_ms = if state.running { raw.last_tick_ms } else { None };
        state.completed_focus_sessions = raw.completed_focus_sessions;
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const MIN: u64 = MS_PER_MINUTE;

    #[test]
    fn catches_up_through_full_cycle() {
        let mut p = PomodoroState::new(25, 5).unwrap();
        assert_eq!(p.remaining_ms(), 1_500_000);
        p.reconcile(1_500_000 + 300_000 + 600_000);
        assert_eq!(p.mode(), Mode::Focus);
        assert_eq!(p.completed_focus_sessions(), 1);
        assert_eq!(p.remaining_ms(), 900_000);
    }

    #[test]
    fn short_countdown_long_absence() {
        // 2 minutes left in focus, 50 minutes pass.
        let mut p = PomodoroState::new(25, 5).unwrap();
        p.reconcile(23 * MIN);
        assert_eq!(p.remaining_ms(), 2 * MIN);

        let advance = p.reconcile(50 * MIN);
        // 2m focus, 5m break, 25m focus, 5m break, 13m into focus.
        assert_eq!(advance.phases, 4);
        assert_eq!(advance.focus_completed, 2);
        assert_eq!(p.mode(), Mode::Focus);
        assert_eq!(p.remaining_ms(), 12 * MIN);
        assert_eq!(p.completed_focus_sessions(), 2);
    }

    #[test]
    fn exact_boundary_flips_mode() {
        let mut p = PomodoroState::new(25, 5).unwrap();
        p.reconcile(25 * MIN);
        assert_eq!(p.mode(), Mode::Break);
        assert_eq!(p.remaining_ms(), 5 * MIN);
        assert_eq!(p.completed_focus_sessions(), 1);
    }

    #[test]
    fn leaving_break_does_not_count() {
        let mut p = PomodoroState::new(1, 1).unwrap();
        p.reconcile(MIN);
        p.reconcile(MIN);
        assert_eq!(p.mode(), Mode::Focus);
        assert_eq!(p.completed_focus_sessions(), 1);
    }

    #[test]
    fn tick_only_reconciles_while_running() {
        let mut p = PomodoroState::default();
        assert!(p.tick(10 * MIN as i64).is_none());
        assert_eq!(p.remaining_ms(), 25 * MIN);

        p.start(0);
        assert!(p.tick(MIN as i64).is_none());
        assert_eq!(p.remaining_ms(), 24 * MIN);

        let event = p.tick(26 * MIN as i64);
        assert!(matches!(
            event,
            Some(Event::PhasesAdvanced { from: Mode::Focus, to: Mode::Break, phases: 1, .. })
        ));
        assert_eq!(p.remaining_ms(), 4 * MIN);
    }

    #[test]
    fn start_twice_is_noop() {
        let mut p = PomodoroState::default();
        assert!(p.start(0).is_some());
        assert!(p.start(5_000).is_none());
        assert_eq!(p.last_tick_ms(), Some(0));
    }

    #[test]
    fn pause_reconciles_and_stops() {
        let mut p = PomodoroState::default();
        p.start(0);
        let events = p.pause(10 * MIN as i64);
        assert_eq!(events.len(), 1);
        assert!(!p.is_running());
        assert_eq!(p.last_tick_ms(), None);
        assert_eq!(p.remaining_ms(), 15 * MIN);

        // Time passing while paused changes nothing.
        assert!(p.pause(100 * MIN as i64).is_empty());
        p.start(200 * MIN as i64);
        p.tick(201 * MIN as i64);
        assert_eq!(p.remaining_ms(), 14 * MIN);
    }

    #[test]
    fn reset_uses_configured_minutes() {
        let mut p = PomodoroState::default();
        p.start(0);
        p.pause(40 * MIN as i64);
        assert_eq!(p.completed_focus_sessions(), 1);

        p.set_minutes(50, 10).unwrap();
        p.reset(0);
        assert_eq!(p.mode(), Mode::Focus);
        assert_eq!(p.remaining_ms(), 50 * MIN);
        assert_eq!(p.completed_focus_sessions(), 0);
        assert!(!p.is_running());
    }

    #[test]
    fn minutes_locked_while_running() {
        let mut p = PomodoroState::default();
        p.start(0);
        assert_eq!(
            p.set_minutes(30, 5),
            Err(ValidationError::Locked { field: "durations".into() })
        );
        assert_eq!(p.focus_minutes(), 25);
    }

    #[test]
    fn untouched_countdown_takes_new_length() {
        let mut p = PomodoroState::default();
        p.set_minutes(50, 10).unwrap();
        assert_eq!(p.remaining_ms(), 50 * MIN);
    }

    #[test]
    fn partial_countdown_is_clamped() {
        let mut p = PomodoroState::default();
        p.reconcile(5 * MIN);
        p.set_minutes(10, 5).unwrap();
        assert_eq!(p.remaining_ms(), 10 * MIN);

        let mut q = PomodoroState::default();
        q.reconcile(20 * MIN);
        q.set_minutes(10, 5).unwrap();
        assert_eq!(q.remaining_ms(), 5 * MIN);
    }

    #[test]
    fn invalid_minute_input_keeps_previous() {
        let mut p = PomodoroState::default();
        let applied = p.apply_minute_input(Some("abc"), Some("0")).unwrap();
        assert_eq!(applied.focus_minutes, 25);
        assert_eq!(applied.break_minutes, 5);
        assert_eq!(applied.rejected.len(), 2);

        let applied = p.apply_minute_input(Some(" 40 "), None).unwrap();
        assert_eq!(applied.focus_minutes, 40);
        assert!(applied.rejected.is_empty());
        assert_eq!(p.focus_minutes(), 40);
    }

    #[test]
    fn new_rejects_out_of_range() {
        assert!(PomodoroState::new(0, 5).is_err());
        assert!(PomodoroState::new(25, MAX_MINUTES + 1).is_err());
    }

    #[test]
    fn snapshot_does_not_mutate() {
        let mut p = PomodoroState::default();
        p.start(0);
        let snap = p.snapshot(MIN as i64);
        match snap {
            Event::PomodoroSnapshot { remaining_ms, running, .. } => {
                assert_eq!(remaining_ms, 24 * MIN);
                assert!(running);
            }
            _ => panic!("Expected PomodoroSnapshot"),
        }
        assert_eq!(p.remaining_ms(), 25 * MIN);
    }

    #[test]
    fn deserialize_repairs_invariants() {
        let json = r#"{"focusMinutes":10,"breakMinutes":5,"mode":"break","remainingMs":999999999,"running":true}"#;
        let p: PomodoroState = serde_json::from_str(json).unwrap();
        assert_eq!(p.mode(), Mode::Break);
        assert_eq!(p.remaining_ms(), 5 * MIN);
        // No lastTickMs to reconcile from, so it cannot stay running.
        assert!(!p.is_running());

        let p: PomodoroState = serde_json::from_str(r#"{"focusMinutes":0}"#).unwrap();
        assert_eq!(p.focus_minutes(), DEFAULT_FOCUS_MINUTES);
        assert_eq!(p.remaining_ms(), 25 * MIN);
    }

    #[test]
    fn serialized_shape_is_camel_case() {
        let json = serde_json::to_value(PomodoroState::default()).unwrap();
        assert_eq!(json["focusMinutes"], 25);
        assert_eq!(json["remainingMs"], 1_500_000);
        assert_eq!(json["mode"], "focus");
        assert_eq!(json["completedFocusSessions"], 0);
    }

    proptest! {
        #[test]
        fn reconcile_is_split_invariant(
            focus in 1u32..60,
            brk in 1u32..30,
            parts in prop::collection::vec(0u64..200 * MIN, 1..10),
        ) {
            let total: u64 = parts.iter().sum();

            let mut whole = PomodoroState::new(focus, brk).unwrap();
            whole.reconcile(total);

            let mut split = PomodoroState::new(focus, brk).unwrap();
            for part in &parts {
                split.reconcile(*part);
            }

            prop_assert_eq!(whole.mode(), split.mode());
            prop_assert_eq!(whole.remaining_ms(), split.remaining_ms());
            prop_assert_eq!(whole.completed_focus_sessions(), split.completed_focus_sessions());
        }

        #[test]
        fn remaining_never_exceeds_mode_duration(
            focus in 1u32..60,
            brk in 1u32..30,
            elapsed in 0u64..1_000 * MIN,
        ) {
            let mut p = PomodoroState::new(focus, brk).unwrap();
            p.reconcile(elapsed);
            prop_assert!(p.remaining_ms() <= p.total_ms());
            prop_assert!(p.remaining_ms() > 0);
        }
    }
}
