use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::{BotError, Result, truncate_body},
    model::{Conditions, Location, WeatherRecord, Wind},
    provider::{LocationQuery, escape},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    /// Point the provider at another endpoint, e.g. a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// The query string is assembled by hand so the pre-escaped
    /// `city,region,country` triple reaches the API exactly as built.
    pub fn request_url(&self, query: &LocationQuery) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            BotError::Config(format!("Invalid OpenWeather URL '{}': {e}", self.base_url))
        })?;

        url.set_query(Some(&format!(
            "q={}&appid={}",
            query.to_query_string(),
            escape(&self.api_key)
        )));

        Ok(url)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: i64,
    pressure: i64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    deg: i64,
    // Absent in calm weather.
    #[serde(default)]
    gust: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    sys: OwSys,
}

impl TryFrom<OwCurrentResponse> for WeatherRecord {
    type Error = BotError;

    fn try_from(parsed: OwCurrentResponse) -> Result<Self> {
        if parsed.weather.is_empty() {
            return Err(BotError::Decode {
                context: "OpenWeather current JSON",
                detail: "`weather` array is empty".to_string(),
            });
        }

        Ok(WeatherRecord {
            conditions: Conditions {
                temp_k: parsed.main.temp,
                feels_like_k: parsed.main.feels_like,
                humidity_pct: parsed.main.humidity,
                pressure_hpa: parsed.main.pressure,
            },
            descriptions: parsed.weather.into_iter().map(|w| w.description).collect(),
            wind: Wind {
                speed_mps: parsed.wind.speed,
                gust_mps: parsed.wind.gust,
                deg: parsed.wind.deg,
            },
            location: Location {
                name: parsed.name,
                country: parsed.sys.country,
            },
            observed_at: parsed.dt,
        })
    }
}

/// Decode a current-weather body into a record.
pub fn parse_current(body: &str) -> Result<WeatherRecord> {
    let parsed: OwCurrentResponse =
        serde_json::from_str(body).map_err(|e| BotError::Decode {
            context: "OpenWeather current JSON",
            detail: e.to_string(),
        })?;

    WeatherRecord::try_from(parsed)
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch(&self, query: &LocationQuery) -> Result<WeatherRecord> {
        let url = self.request_url(query)?;
        debug!(q = %query.to_query_string(), "requesting current weather");

        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| BotError::Network {
                context: "sending request to OpenWeather",
                source,
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|source| BotError::Network {
            context: "reading OpenWeather response body",
            source,
        })?;

        if !status.is_success() {
            return Err(BotError::Upstream {
                service: "OpenWeather",
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        parse_current(&body)
    }
}
