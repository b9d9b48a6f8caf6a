mod config;
pub mod database;
mod store;

pub use config::{Config, LoggingConfig, PomodoroConfig, WeatherConfig};
pub use database::Database;
pub use store::{StateStore, STATE_KEY, TAB_KEY};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory.
///
/// `OFFICECLOCK_HOME` wins when set. Otherwise `~/.config/officeclock[-dev]/`
/// based on `OFFICECLOCK_ENV` (set `OFFICECLOCK_ENV=dev` for the
/// development directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("OFFICECLOCK_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env =
                std::env::var("OFFICECLOCK_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("officeclock-dev")
            } else {
                base_dir.join("officeclock")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
