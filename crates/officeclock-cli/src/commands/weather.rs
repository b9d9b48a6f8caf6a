use officeclock_core::{Config, WeatherClient};

use super::print_json;

pub fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let client = WeatherClient::new(&config.weather)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let report = runtime.block_on(client.report());
    if !report.current.is_available() || !report.daily.is_available() {
        eprintln!("Weather unavailable; run `officeclock weather` again to retry.");
    }
    print_json(&report)
}
