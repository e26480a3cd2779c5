use crate::{error::Result, model::WeatherRecord};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use url::form_urlencoded;

pub mod openweather;

pub use openweather::OpenWeatherProvider;

/// The place the bot reports on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LocationQuery {
    pub city: String,
    pub region: String,
    pub country_code: String,
    /// Keep `city,,CC` when the region is blank instead of dropping the segment.
    pub legacy_empty_region: bool,
}

impl LocationQuery {
    pub fn new(city: &str, region: &str, country_code: &str) -> Self {
        Self {
            city: city.to_string(),
            region: region.to_string(),
            country_code: country_code.to_string(),
            legacy_empty_region: false,
        }
    }

    /// Value of the `q` parameter: escaped city and region joined with the country code.
    pub fn to_query_string(&self) -> String {
        let city = escape(self.city.trim());
        let region = escape(self.region.trim());
        let country = escape(self.country_code.trim());

        if region.is_empty() && !self.legacy_empty_region {
            format!("{city},{country}")
        } else {
            format!("{city},{region},{country}")
        }
    }
}

pub(crate) fn escape(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Issues exactly one request; retrying is the caller's business.
    async fn fetch(&self, query: &LocationQuery) -> Result<WeatherRecord>;
}
