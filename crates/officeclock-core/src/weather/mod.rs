//! Weather panel backed by the Open-Meteo forecast API.
//!
//! Two GET requests per refresh: current conditions with the next hours,
//! and the daily outlook. Each half degrades to `Unavailable` on its own;
//! nothing here ever returns an error to the caller of [`WeatherClient::report`].

mod codes;

pub use codes::describe;

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::WeatherError;
use crate::storage::WeatherConfig;

const FORECAST_PATH: &str = "/v1/forecast";
const CURRENT_FIELDS: &str = "temperature_2m,apparent_temperature,weather_code,wind_speed_10m";
const HOURLY_FIELDS: &str = "temperature_2m,precipitation_probability";
const DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min,precipitation_sum";
const FORECAST_HOURS: u32 = 12;
const FORECAST_DAYS: u32 = 7;

/// Either the data or why it could not be shown.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Availability<T> {
    Available { data: T },
    Unavailable { reason: String },
}

impl<T> Availability<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available { .. })
    }
}

impl<T> From<Result<T, WeatherError>> for Availability<T> {
    fn from(result: Result<T, WeatherError>) -> Self {
        match result {
            Ok(data) => Availability::Available { data },
            Err(e) => {
                tracing::warn!(error = %e, "weather unavailable");
                Availability::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub time: String,
    pub temperature_c: f64,
    pub apparent_temperature_c: f64,
    pub weather_code: u8,
    pub description: &'static str,
    pub wind_speed_kmh: f64,
    pub next_hours: Vec<HourlyPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyPoint {
    pub time: String,
    pub temperature_c: f64,
    pub precipitation_probability: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyForecast {
    pub date: String,
    pub weather_code: u8,
    pub description: &'static str,
    pub max_c: f64,
    pub min_c: f64,
    pub precipitation_mm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub latitude: f64,
    pub longitude: f64,
    pub current: Availability<CurrentConditions>,
    pub daily: Availability<Vec<DailyForecast>>,
}

pub struct WeatherClient {
    http: Client,
    endpoint: Url,
    latitude: f64,
    longitude: f64,
}

impl WeatherClient {
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let endpoint = Url::parse(&config.base_url)?.join(FORECAST_PATH)?;
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            endpoint,
            latitude: config.latitude,
            longitude: config.longitude,
        })
    }

    /// Fetch both panels concurrently. Never fails.
    pub async fn report(&self) -> WeatherReport {
        let (current, daily) = tokio::join!(self.fetch_current(), self.fetch_daily());
        WeatherReport {
            latitude: self.latitude,
            longitude: self.longitude,
            current: current.into(),
            daily: daily.into(),
        }
    }

    /// Current conditions plus the next hours.
    ///
    /// # Errors
    /// Returns an error on network failure or a non-success status.
    pub async fn fetch_current(&self) -> Result<CurrentConditions, WeatherError> {
        let hours = FORECAST_HOURS.to_string();
        let body: CurrentResponse = self
            .get(&[
                ("current", CURRENT_FIELDS),
                ("hourly", HOURLY_FIELDS),
                ("forecast_hours", hours.as_str()),
            ])
            .await?;

        let hourly = body.hourly;
        let next_hours = hourly
            .time
            .into_iter()
            .zip(hourly.temperature_2m)
            .enumerate()
            .map(|(i, (time, temperature_c))| HourlyPoint {
                time,
                temperature_c,
                precipitation_probability: hourly
                    .precipitation_probability
                    .get(i)
                    .copied()
                    .flatten(),
            })
            .collect();

        let c = body.current;
        Ok(CurrentConditions {
            time: c.time,
            temperature_c: c.temperature_2m,
            apparent_temperature_c: c.apparent_temperature,
            weather_code: c.weather_code,
            description: describe(c.weather_code),
            wind_speed_kmh: c.wind_speed_10m,
            next_hours,
        })
    }

    /// Daily outlook.
    ///
    /// # Errors
    /// Returns an error on network failure or a non-success status.
    pub async fn fetch_daily(&self) -> Result<Vec<DailyForecast>, WeatherError> {
        let days = FORECAST_DAYS.to_string();
        let body: DailyResponse = self
            .get(&[("daily", DAILY_FIELDS), ("forecast_days", days.as_str())])
            .await?;

        let d = body.daily;
        let forecast = d
            .time
            .into_iter()
            .enumerate()
            .map(|(i, date)| {
                let code = d.weather_code.get(i).copied().unwrap_or_default();
                DailyForecast {
                    date,
                    weather_code: code,
                    description: describe(code),
                    max_c: d.temperature_2m_max.get(i).copied().unwrap_or_default(),
                    min_c: d.temperature_2m_min.get(i).copied().unwrap_or_default(),
                    precipitation_mm: d.precipitation_sum.get(i).copied().unwrap_or_default(),
                }
            })
            .collect();
        Ok(forecast)
    }

    async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        fields: &[(&str, &str)],
    ) -> Result<T, WeatherError> {
        let latitude = self.latitude.to_string();
        let longitude = self.longitude.to_string();
        let mut params = vec![
            ("latitude", latitude.as_str()),
            ("longitude", longitude.as_str()),
            ("timezone", "auto"),
        ];
        params.extend_from_slice(fields);
        let url = Url::parse_with_params(self.endpoint.as_str(), &params)?;

        tracing::debug!(%url, "fetching weather");
        let resp = self.http.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(WeatherError::Status(resp.status().as_u16()));
        }
        Ok(resp.json().await?)
    }
}

#[derive(Deserialize)]
struct CurrentResponse {
    current: CurrentBlock,
    hourly: HourlyBlock,
}

#[derive(Deserialize)]
struct CurrentBlock {
    time: String,
    temperature_2m: f64,
    apparent_temperature: f64,
    weather_code: u8,
    wind_speed_10m: f64,
}

#[derive(Deserialize)]
struct HourlyBlock {
    time: Vec<String>,
    temperature_2m: Vec<f64>,
    #[serde(default)]
    precipitation_probability: Vec<Option<u8>>,
}

#[derive(Deserialize)]
struct DailyResponse {
    daily: DailyBlock,
}

#[derive(Deserialize)]
struct DailyBlock {
    time: Vec<String>,
    weather_code: Vec<u8>,
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
    #[serde(default)]
    precipitation_sum: Vec<f64>,
}
