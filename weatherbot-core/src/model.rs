use serde::{Deserialize, Serialize};

/// One observation, fetched fresh every cycle. Temperatures stay in kelvin here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub conditions: Conditions,
    /// First entry is authoritative.
    pub descriptions: Vec<String>,
    pub wind: Wind,
    pub location: Location,
    /// UNIX epoch seconds, as reported by the server.
    pub observed_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    pub temp_k: f64,
    pub feels_like_k: f64,
    pub humidity_pct: i64,
    pub pressure_hpa: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed_mps: f64,
    pub gust_mps: f64,
    pub deg: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    /// ISO-3166 alpha-2.
    pub country: String,
}

impl WeatherRecord {
    pub fn primary_description(&self) -> Option<&str> {
        self.descriptions.first().map(String::as_str)
    }
}
