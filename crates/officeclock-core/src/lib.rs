//! # officeclock Core Library
//!
//! Business logic for the officeclock productivity widget: an office
//! presence ledger with weekly statistics, a Pomodoro countdown that
//! catches up on time that passed while nothing was watching, and a
//! small weather panel. The CLI is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Ledger**: start/stop office sessions, weekly aggregates
//! - **Timer**: wall-clock Pomodoro reconciler plus the `Ticker` that
//!   drives live refresh
//! - **Storage**: SQLite key-value blob and TOML configuration
//! - **Weather**: Open-Meteo client that degrades to "unavailable"
//!
//! ## Key Components
//!
//! - [`WidgetState`]: the owned state every command operates on
//! - [`StateStore`]: lenient load/save of that state
//! - [`PomodoroState`]: focus/break countdown
//! - [`Config`]: application configuration

pub mod clock;
pub mod error;
pub mod events;
pub mod format;
pub mod ledger;
pub mod storage;
pub mod timer;
pub mod weather;
pub mod widget;

pub use error::{ConfigError, CoreError, DatabaseError, ValidationError, WeatherError};
pub use events::Event;
pub use ledger::{Ledger, Session, StopOutcome, WeekBounds, WeeklySummary};
pub use storage::{Config, Database, StateStore};
pub use timer::{Mode, PomodoroState, Ticker};
pub use weather::{WeatherClient, WeatherReport};
pub use widget::{Tab, WidgetState};
