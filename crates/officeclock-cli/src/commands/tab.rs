use clap::Subcommand;
use officeclock_core::{Config, Tab};

use super::open_store;

#[derive(Subcommand)]
pub enum TabAction {
    /// Print the selected tab
    Get,
    /// Select a tab (office, stats, pomodoro, weather)
    Set { tab: Tab },
}

pub fn run(config: &Config, action: TabAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(config)?;
    match action {
        TabAction::Get => println!("{}", store.load_tab()?),
        TabAction::Set { tab } => {
            store.save_tab(tab)?;
            println!("{tab}");
        }
    }
    Ok(())
}
