pub mod config;
pub mod office;
pub mod pomodoro;
pub mod stats;
pub mod tab;
pub mod watch;
pub mod weather;

use officeclock_core::{Config, Database, StateStore};

/// Open the kv store in the data directory.
pub fn open_store(config: &Config) -> Result<StateStore, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    Ok(StateStore::new(db, config.default_pomodoro()))
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
