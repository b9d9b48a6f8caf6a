use clap::{CommandFactory, Parser, Subcommand};

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "officeclock", version, about = "Office time tracker, Pomodoro timer and weather panel")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Office presence tracking
    Office {
        #[command(subcommand)]
        action: commands::office::OfficeAction,
    },
    /// Weekly statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Pomodoro focus/break countdown
    Pomodoro {
        #[command(subcommand)]
        action: commands::pomodoro::PomodoroAction,
    },
    /// Fetch current weather and the daily outlook
    Weather,
    /// Selected view
    Tab {
        #[command(subcommand)]
        action: commands::tab::TabAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Live view refreshed every second
    Watch {
        /// Stop after this many seconds instead of waiting for Ctrl-C
        #[arg(long)]
        for_secs: Option<u64>,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    let config = officeclock_core::Config::load_or_default();
    logging::init(&config.logging);

    let result = match cli.command {
        Commands::Office { action } => commands::office::run(&config, action),
        Commands::Stats { action } => commands::stats::run(&config, action),
        Commands::Pomodoro { action } => commands::pomodoro::run(&config, action),
        Commands::Weather => commands::weather::run(&config),
        Commands::Tab { action } => commands::tab::run(&config, action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Watch { for_secs } => commands::watch::run(&config, for_secs),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "officeclock",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
