use officeclock_core::storage::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber.
///
/// `OFFICECLOCK_LOG` overrides the configured level; stdout stays
/// reserved for command output.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_env("OFFICECLOCK_LOG")
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
