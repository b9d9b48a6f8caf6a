use clap::Subcommand;
use officeclock_core::clock::{self, now_ms};
use officeclock_core::format;
use officeclock_core::ledger::RECENT_LIMIT;
use officeclock_core::Config;
use serde::Serialize;
use serde_json::json;

use super::{open_store, print_json};

#[derive(Subcommand)]
pub enum OfficeAction {
    /// Arrive: open a session now
    Start,
    /// Leave: close the open session
    Stop,
    /// Print whether a session is open and for how long
    Status,
    /// List the most recent sessions, newest first
    Sessions {
        #[arg(long, default_value_t = RECENT_LIMIT)]
        limit: usize,
    },
}

#[derive(Serialize)]
struct SessionRow {
    date: String,
    start: String,
    end: String,
    duration: String,
    duration_ms: i64,
}

pub fn run(config: &Config, action: OfficeAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(config)?;
    let mut state = store.load()?;
    let now = now_ms();

    match action {
        OfficeAction::Start => match state.start_office(now) {
            Some(event) => {
                store.save(&state)?;
                print_json(&event)?;
                eprintln!("Started at {}", clock::local(now).format("%H:%M:%S"));
            }
            None => eprintln!("Already in office."),
        },
        OfficeAction::Stop => match state.stop_office(now) {
            Some(event) => {
                store.save(&state)?;
                print_json(&event)?;
                eprintln!("Stopped at {}", clock::local(now).format("%H:%M:%S"));
            }
            None => eprintln!("Not in office."),
        },
        OfficeAction::Status => {
            let ledger = state.ledger();
            let elapsed = ledger.elapsed_ms(now);
            print_json(&json!({
                "in_office": ledger.is_active(),
                "status": if ledger.is_active() { "In office" } else { "Not in office" },
                "active_since": ledger.active_start().map(|s| clock::local(s).to_rfc3339()),
                "elapsed_ms": elapsed,
                "elapsed": format::clock(elapsed),
            }))?;
        }
        OfficeAction::Sessions { limit } => {
            let rows: Vec<SessionRow> = state
                .ledger()
                .recent(limit)
                .into_iter()
                .map(|s| {
                    let start = clock::local(s.start());
                    let end = clock::local(s.end());
                    SessionRow {
                        date: start.format("%Y-%m-%d").to_string(),
                        start: start.format("%H:%M").to_string(),
                        end: end.format("%H:%M").to_string(),
                        duration: format::short(s.duration_ms()),
                        duration_ms: s.duration_ms(),
                    }
                })
                .collect();
            if rows.is_empty() {
                eprintln!("No sessions recorded yet.");
            }
            print_json(&rows)?;
        }
    }
    Ok(())
}
