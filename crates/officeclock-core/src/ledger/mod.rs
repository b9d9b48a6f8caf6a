//! Office presence ledger.
//!
//! Records start/stop timestamps of "in office" sessions and aggregates
//! them per calendar week. All operations take `now` explicitly; the
//! caller decides which clock drives the ledger.

mod session;
mod week;

pub use session::Session;
pub use week::{WeekBounds, WeeklySummary};

use std::collections::HashSet;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::clock;

/// Number of sessions shown in the "recent" list.
pub const RECENT_LIMIT: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    active_start: Option<i64>,
    sessions: Vec<Session>,
}

impl Ledger {
    /// Rebuild a ledger from persisted parts.
    ///
    /// Sessions are already validated by construction.
    pub fn from_parts(active_start: Option<i64>, sessions: Vec<Session>) -> Self {
        Self {
            active_start,
            sessions,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn active_start(&self) -> Option<i64> {
        self.active_start
    }

    pub fn is_active(&self) -> bool {
        self.active_start.is_some()
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Live elapsed time of the open session, 0 if none.
    pub fn elapsed_ms(&self, now: i64) -> i64 {
        self.active_start
            .map(|start| now.saturating_sub(start).max(0))
            .unwrap_or(0)
    }

    /// Most recent sessions by start time, newest first.
    pub fn recent(&self, limit: usize) -> Vec<Session> {
        let mut sessions = self.sessions.clone();
        sessions.sort_by(|a, b| b.start().cmp(&a.start()));
        sessions.truncate(limit);
        sessions
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Open a session at `now`. Returns `false` if one is already open.
    pub fn start(&mut self, now: i64) -> bool {
        if self.active_start.is_some() {
            return false;
        }
        self.active_start = Some(now);
        tracing::debug!(at = now, "office session opened");
        true
    }

    /// Close the open session at `now`.
    ///
    /// Returns `None` when nothing was open. The session is recorded only
    /// if it has a positive duration; a zero-length close still clears the
    /// open marker but yields no record.
    pub fn stop(&mut self, now: i64) -> Option<StopOutcome> {
        let start = self.active_start.take()?;
        match Session::new(start, now) {
            Ok(session) => {
                self.sessions.push(session);
                tracing::debug!(start, end = now, "office session recorded");
                Some(StopOutcome::Recorded(session))
            }
            Err(_) => {
                tracing::debug!(start, end = now, "discarded empty office session");
                Some(StopOutcome::Discarded)
            }
        }
    }

    // ── Aggregates ───────────────────────────────────────────────────

    /// Weekly summary for the week containing `now` in the local time zone.
    pub fn weekly_summary(&self, now: i64) -> WeeklySummary {
        self.weekly_summary_at(&clock::local(now))
    }

    /// Weekly summary for the week containing `now`, bucketing days in
    /// `now`'s time zone.
    pub fn weekly_summary_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> WeeklySummary {
        let tz = now.timezone();
        let now_ms = now.timestamp_millis();
        let week = WeekBounds::containing(now);

        let in_week: Vec<&Session> = self
            .sessions
            .iter()
            .filter(|s| week.contains(s.start()) && s.end() <= week.end_ms)
            .collect();

        let active_ms = self.elapsed_ms(now_ms);
        let total_ms = in_week
            .iter()
            .fold(active_ms, |acc, s| acc.saturating_add(s.duration_ms()));

        let mut days: HashSet<_> = in_week
            .iter()
            .map(|s| clock::from_ms(s.start(), &tz).date_naive())
            .collect();
        if let Some(start) = self.active_start {
            days.insert(clock::from_ms(start, &tz).date_naive());
        }

        let worked_days = days.len();
        let session_count = in_week.len() + usize::from(self.active_start.is_some());

        WeeklySummary {
            week,
            total_ms,
            worked_days,
            session_count,
            avg_per_worked_day_ms: average(total_ms, worked_days),
            avg_per_week_day_ms: total_ms / 7,
            avg_session_ms: average(total_ms, session_count),
        }
    }
}

/// Result of closing an open session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Recorded(Session),
    /// The session had no positive duration and was dropped.
    Discarded,
}

fn average(total: i64, count: usize) -> i64 {
    if count == 0 {
        0
    } else {
        total / count as i64
    }
}
