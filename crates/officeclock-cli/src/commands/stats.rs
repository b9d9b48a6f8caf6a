use clap::Subcommand;
use officeclock_core::clock::{self, now_ms};
use officeclock_core::format;
use officeclock_core::Config;
use serde_json::json;

use super::{open_store, print_json};

#[derive(Subcommand)]
pub enum StatsAction {
    /// This week's totals and averages (Monday to Sunday)
    Week,
}

pub fn run(config: &Config, action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(config)?;
    let state = store.load()?;

    match action {
        StatsAction::Week => {
            let s = state.weekly_summary(now_ms());
            print_json(&json!({
                "week_start": clock::local(s.week.start_ms).to_rfc3339(),
                "week_end": clock::local(s.week.end_ms).to_rfc3339(),
                "total": format::short(s.total_ms),
                "avg_per_worked_day": format::short(s.avg_per_worked_day_ms),
                "avg_per_week_day": format::short(s.avg_per_week_day_ms),
                "avg_session": format::short(s.avg_session_ms),
                "summary": s,
            }))?;
        }
    }
    Ok(())
}
