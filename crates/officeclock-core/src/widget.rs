//! Owned widget state.
//!
//! `WidgetState` is the one in-memory object behind every command: the
//! office ledger plus the Pomodoro countdown. It serializes to the single
//! blob `{ activeStart, sessions, pomodoro }` that the store persists.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clock;
use crate::events::Event;
use crate::ledger::{Ledger, Session, StopOutcome, WeeklySummary};
use crate::timer::PomodoroState;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetState {
    #[serde(flatten)]
    ledger: Ledger,
    pomodoro: PomodoroState,
}

impl WidgetState {
    /// A fresh state whose countdown uses the given defaults.
    pub fn with_pomodoro(pomodoro: PomodoroState) -> Self {
        Self {
            ledger: Ledger::default(),
            pomodoro,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn pomodoro(&self) -> &PomodoroState {
        &self.pomodoro
    }

    pub fn pomodoro_mut(&mut self) -> &mut PomodoroState {
        &mut self.pomodoro
    }

    // ── Office session ───────────────────────────────────────────────

    pub fn start_office(&mut self, now: i64) -> Option<Event> {
        if !self.ledger.start(now) {
            return None;
        }
        Some(Event::OfficeStarted {
            at: clock::from_ms(now, &Utc),
        })
    }

    pub fn stop_office(&mut self, now: i64) -> Option<Event> {
        let started = self.ledger.active_start()?;
        let outcome = self.ledger.stop(now)?;
        Some(Event::OfficeStopped {
            started_at: clock::from_ms(started, &Utc),
            duration_ms: now.saturating_sub(started).max(0),
            recorded: matches!(outcome, StopOutcome::Recorded(_)),
            at: clock::from_ms(now, &Utc),
        })
    }

    pub fn weekly_summary(&self, now: i64) -> WeeklySummary {
        self.ledger.weekly_summary(now)
    }

    // ── Persistence ──────────────────────────────────────────────────

    /// Parse a persisted blob, never failing.
    ///
    /// Unparseable JSON gives the default state. Within a valid object each
    /// field falls back on its own: a bad or out-of-range `activeStart`
    /// becomes `None`, a non-array `sessions` becomes empty, sessions with
    /// `end <= start` or unrepresentable bounds are dropped and a malformed `pomodoro` becomes `default_pomodoro`.
    pub fn from_json_lenient(raw: &str, default_pomodoro: &PomodoroState) -> Self {
        let value: Value = match serde_json::from_str(raw) {
            Ok(Value::Object(map)) => Value::Object(map),
            Ok(_) | Err(_) => {
                tracing::warn!("persisted state is not a JSON object, using defaults");
                return Self::with_pomodoro(default_pomodoro.clone());
            }
        };

        let active_start = value
            .get("activeStart")
            .and_then(Value::as_i64)
            .filter(|&ms| {
                let ok = clock::is_representable(ms);
                if !ok {
                    tracing::warn!(active_start = ms, "dropping out-of-range open session");
                }
                ok
            });

        let sessions: Vec<Session> = match value.get("sessions") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match Session::deserialize(item) {
                    Ok(session) => Some(session),
                    Err(e) => {
                        tracing::warn!(error = %e, "dropping invalid persisted session");
                        None
                    }
                })
                .collect(),
            _ => Vec::new(),
        };

        let pomodoro = value
            .get("pomodoro")
            .and_then(|p| match PomodoroState::deserialize(p) {
                Ok(state) => Some(state),
                Err(e) => {
                    tracing::warn!(error = %e, "invalid persisted pomodoro state, using defaults");
                    None
                }
            })
            .unwrap_or_else(|| default_pomodoro.clone());

        Self {
            ledger: Ledger::from_parts(active_start, sessions),
            pomodoro,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// The four views of the widget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Office,
    Stats,
    Pomodoro,
    Weather,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Office, Tab::Stats, Tab::Pomodoro, Tab::Weather];

    pub fn as_str(self) -> &'static str {
        match self {
            Tab::Office => "office",
            Tab::Stats => "stats",
            Tab::Pomodoro => "pomodoro",
            Tab::Weather => "weather",
        }
    }

    /// Parse a stored identifier, defaulting to the first tab.
    pub fn from_stored(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tab::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown tab '{s}' (expected office, stats, pomodoro or weather)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::Mode;

    fn defaults() -> PomodoroState {
        PomodoroState::default()
    }

    #[test]
    fn roundtrip_keeps_everything() {
        let mut state = WidgetState::default();
        state.start_office(1_000);
        state.stop_office(5_000);
        state.start_office(7_000);
        state.pomodoro_mut().start(0);
        state.pomodoro_mut().pause(60_000);

        let json = state.to_json().unwrap();
        let loaded = WidgetState::from_json_lenient(&json, &defaults());
        assert_eq!(loaded, state);
    }

    #[test]
    fn blob_shape_matches_storage_format() {
        let mut state = WidgetState::default();
        state.start_office(1_000);
        let value: Value = serde_json::from_str(&state.to_json().unwrap()).unwrap();
        assert_eq!(value["activeStart"], 1_000);
        assert!(value["sessions"].is_array());
        assert_eq!(value["pomodoro"]["mode"], "focus");
    }

    #[test]
    fn garbage_gives_defaults() {
        for raw in ["", "not json", "[1,2]", "null", "42"] {
            assert_eq!(
                WidgetState::from_json_lenient(raw, &defaults()),
                WidgetState::default()
            );
        }
    }

    #[test]
    fn bad_fields_fall_back_individually() {
        let raw = r#"{
            "activeStart": "yesterday",
            "sessions": [{"start": 1, "end": 5}, {"start": 9, "end": 9}, {"start": "x"}],
            "pomodoro": {"mode": "break", "remainingMs": 1000}
        }"#;
        let state = WidgetState::from_json_lenient(raw, &defaults());
        assert_eq!(state.ledger().active_start(), None);
        assert_eq!(state.ledger().sessions().len(), 1);
        assert_eq!(state.pomodoro().mode(), Mode::Break);
        assert_eq!(state.pomodoro().remaining_ms(), 1000);

        let raw = r#"{"activeStart": 10, "sessions": {}, "pomodoro": "nope"}"#;
        let custom = PomodoroState::new(50, 10).unwrap();
        let state = WidgetState::from_json_lenient(raw, &custom);
        assert_eq!(state.ledger().active_start(), Some(10));
        assert!(state.ledger().sessions().is_empty());
        assert_eq!(state.pomodoro(), &custom);
    }

    #[test]
    fn extreme_timestamps_are_dropped() {
        let now = 1_700_000_000_000;
        let raw = format!(
            r#"{{
                "activeStart": {},
                "sessions": [{{"start": {}, "end": {}}}, {{"start": 1000, "end": 5000}}]
            }}"#,
            i64::MIN,
            i64::MIN,
            i64::MAX
        );
        let state = WidgetState::from_json_lenient(&raw, &defaults());
        assert_eq!(state.ledger().active_start(), None);
        assert_eq!(state.ledger().elapsed_ms(now), 0);

        let recent = state.ledger().recent(8);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].duration_ms(), 4000);

        let summary = state.weekly_summary(now);
        assert_eq!(summary.total_ms, 0);
        assert_eq!(summary.session_count, 0);
    }

    #[test]
    fn office_events_follow_ledger_rules() {
        let mut state = WidgetState::default();
        assert!(state.stop_office(10).is_none());
        assert!(state.start_office(10).is_some());
        assert!(state.start_office(20).is_none());
        match state.stop_office(10) {
            Some(Event::OfficeStopped { recorded, duration_ms, .. }) => {
                assert!(!recorded);
                assert_eq!(duration_ms, 0);
            }
            other => panic!("Expected OfficeStopped, got {other:?}"),
        }
    }

    #[test]
    fn tab_parsing_defaults_to_office() {
        assert_eq!(Tab::from_stored(None), Tab::Office);
        assert_eq!(Tab::from_stored(Some("bogus")), Tab::Office);
        assert_eq!(Tab::from_stored(Some("weather")), Tab::Weather);
        assert!("Stats".parse::<Tab>().is_err());
        for tab in Tab::ALL {
            assert_eq!(tab.to_string().parse::<Tab>(), Ok(tab));
        }
    }
}
