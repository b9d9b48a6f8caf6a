use clap::Subcommand;
use officeclock_core::clock::now_ms;
use officeclock_core::{Config, Event};

use super::{open_store, print_json};

#[derive(Subcommand)]
pub enum PomodoroAction {
    /// Start or continue the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Back to a full focus countdown and zero completed sessions
    Reset,
    /// Print the countdown, caught up to now
    Status,
    /// Change focus/break minutes (only while paused)
    Set {
        /// Focus minutes (1-180); invalid input keeps the current value
        #[arg(long)]
        focus: Option<String>,
        /// Break minutes (1-180); invalid input keeps the current value
        #[arg(long = "break")]
        brk: Option<String>,
    },
}

pub fn run(config: &Config, action: PomodoroAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(config)?;
    let mut state = store.load()?;
    let now = now_ms();

    // Catch up on whatever happened since the last command.
    let caught_up = state.pomodoro_mut().tick(now);

    let events: Vec<Event> = match action {
        PomodoroAction::Start => {
            let started = state.pomodoro_mut().start(now);
            if started.is_none() {
                eprintln!("Already running.");
            }
            caught_up.into_iter().chain(started).collect()
        }
        PomodoroAction::Pause => {
            let paused = state.pomodoro_mut().pause(now);
            if paused.is_empty() {
                eprintln!("Not running.");
            }
            caught_up.into_iter().chain(paused).collect()
        }
        PomodoroAction::Reset => vec![state.pomodoro_mut().reset(now)],
        PomodoroAction::Status => caught_up
            .into_iter()
            .chain(std::iter::once(state.pomodoro().snapshot(now)))
            .collect(),
        PomodoroAction::Set { focus, brk } => {
            let applied = state
                .pomodoro_mut()
                .apply_minute_input(focus.as_deref(), brk.as_deref())?;
            for rejected in &applied.rejected {
                eprintln!("ignored invalid minutes ({rejected}), keeping previous value");
            }
            caught_up
                .into_iter()
                .chain(std::iter::once(state.pomodoro().snapshot(now)))
                .collect()
        }
    };

    store.save(&state)?;
    for event in &events {
        print_json(event)?;
    }
    Ok(())
}
