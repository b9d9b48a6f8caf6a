use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Mode;

/// Every state change in the system produces an Event.
/// The CLI prints them; the watch loop logs them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    OfficeStarted {
        at: DateTime<Utc>,
    },
    OfficeStopped {
        started_at: DateTime<Utc>,
        duration_ms: i64,
        /// False when the session had no positive duration.
        recorded: bool,
        at: DateTime<Utc>,
    },
    PomodoroStarted {
        mode: Mode,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    PomodoroPaused {
        mode: Mode,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    PomodoroReset {
        focus_minutes: u32,
        break_minutes: u32,
        at: DateTime<Utc>,
    },
    /// One or more countdowns ran out since the last reconciliation.
    PhasesAdvanced {
        from: Mode,
        to: Mode,
        phases: u64,
        completed_focus_sessions: u32,
        at: DateTime<Utc>,
    },
    PomodoroSnapshot {
        mode: Mode,
        running: bool,
        remaining_ms: u64,
        total_ms: u64,
        focus_minutes: u32,
        break_minutes: u32,
        completed_focus_sessions: u32,
        at: DateTime<Utc>,
    },
}
