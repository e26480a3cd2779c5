//! Turns a [`WeatherRecord`] into the text of a post.
//!
//! Every function here is pure: no I/O, and identical input gives identical
//! output. Temperatures are converted from kelvin only at this point.

use chrono::{DateTime, FixedOffset, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Location, WeatherRecord};

pub const ABSOLUTE_ZERO_C: f64 = -273.15;
const MPS_TO_KMH: f64 = 3.6;

/// Returned when a bearing falls outside every compass bucket.
pub const UNKNOWN_DIRECTION: &str = "???";
const UNKNOWN_TIME: &str = "????-??-?? ?:??";

const TIME_FORMAT: &str = "%Y-%m-%d %-I:%M%p";

/// Inclusive degree ranges of the original nine-bucket table.
const LEGACY_BUCKETS: [(&str, i64, i64); 9] = [
    ("N", 0, 22),
    ("NNE", 23, 67),
    ("NE", 68, 112),
    ("ENE", 113, 157),
    ("E", 158, 202),
    ("ESE", 203, 247),
    ("SE", 248, 292),
    ("SSE", 293, 337),
    ("S", 338, 360),
];

const ROSE_16: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompassMode {
    /// Nine 45° buckets running N..S around the whole circle. West-side
    /// bearings come out as eastern labels; kept for compatibility.
    Legacy,
    #[default]
    SixteenPoint,
}

impl CompassMode {
    pub const fn all() -> &'static [CompassMode] {
        &[CompassMode::SixteenPoint, CompassMode::Legacy]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompassMode::Legacy => "legacy",
            CompassMode::SixteenPoint => "sixteen_point",
        }
    }
}

impl std::fmt::Display for CompassMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZoneSetting {
    #[default]
    Local,
    Fixed(FixedOffset),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormatOptions {
    /// Start the sentence with "City, CC: ".
    pub include_location: bool,
    pub hashtags: Vec<String>,
    pub zone: ZoneSetting,
    /// Appended verbatim after the timestamp, e.g. "NST".
    pub zone_label: String,
    pub compass: CompassMode,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            include_location: true,
            hashtags: vec!["#weather".to_string()],
            zone: ZoneSetting::Local,
            zone_label: "NST".to_string(),
            compass: CompassMode::SixteenPoint,
        }
    }
}

/// Kelvin to whole degrees Celsius, rounding half away from zero.
pub fn celsius(kelvin: f64) -> i64 {
    (kelvin + ABSOLUTE_ZERO_C).round() as i64
}

pub fn temperature_label(kelvin: f64) -> String {
    format!("{}°C", celsius(kelvin))
}

/// Metres per second to whole km/h.
pub fn kmh(mps: f64) -> i64 {
    (mps * MPS_TO_KMH).round() as i64
}

pub fn speed_label(mps: f64) -> String {
    format!("{} km/h", kmh(mps))
}

/// Capitalizes the first letter of every word and lowercases the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;

    for c in text.chars() {
        if c.is_alphanumeric() || c == '\'' {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }

    out
}

/// The nine-bucket lookup, reproduced as-is.
///
/// Normalization uses the truncating `%`, so negative bearings stay negative,
/// match no bucket, and yield [`UNKNOWN_DIRECTION`].
pub fn compass_legacy(degrees: i64) -> &'static str {
    let degrees = degrees % 360;

    LEGACY_BUCKETS
        .iter()
        .find(|(_, lo, hi)| (*lo..=*hi).contains(&degrees))
        .map_or(UNKNOWN_DIRECTION, |(label, _, _)| *label)
}

/// Standard 16-point rose, 22.5° per label centred on each heading.
pub fn compass_16(degrees: i64) -> &'static str {
    let degrees = degrees.rem_euclid(360);
    // (d + 11.25) / 22.5 in integer arithmetic.
    let idx = ((degrees * 4 + 45) / 90) as usize % ROSE_16.len();
    ROSE_16[idx]
}

pub fn compass(degrees: i64, mode: CompassMode) -> &'static str {
    match mode {
        CompassMode::Legacy => compass_legacy(degrees),
        CompassMode::SixteenPoint => compass_16(degrees),
    }
}

pub fn location_label(location: &Location) -> String {
    format!("{}, {}", location.name, location.country)
}

/// Epoch seconds as `YYYY-MM-DD h:mmAM` in the chosen zone, followed by the label.
pub fn updated_label(epoch: i64, zone: ZoneSetting, zone_label: &str) -> String {
    let stamp = match DateTime::<Utc>::from_timestamp(epoch, 0) {
        Some(utc) => match zone {
            ZoneSetting::Local => utc.with_timezone(&Local).format(TIME_FORMAT).to_string(),
            ZoneSetting::Fixed(offset) => utc.with_timezone(&offset).format(TIME_FORMAT).to_string(),
        },
        None => UNKNOWN_TIME.to_string(),
    };

    if zone_label.is_empty() {
        stamp
    } else {
        format!("{stamp} {zone_label}")
    }
}

fn hashtag_line(tags: &[String]) -> String {
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(|t| {
            if t.starts_with('#') {
                t.to_string()
            } else {
                format!("#{t}")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Default)]
pub struct StatusFormatter {
    options: FormatOptions,
}

impl StatusFormatter {
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    pub fn format(&self, record: &WeatherRecord) -> String {
        let opts = &self.options;

        let description = record
            .primary_description()
            .map(title_case)
            .unwrap_or_else(|| "Unknown".to_string());

        let mut status = format!(
            "{description}, {temp} (feels like {feels}). Humidity {hum}%, pressure {pres} hPa. \
             Wind {wind} {dir}, gusts {gust}. Updated {updated}",
            temp = temperature_label(record.conditions.temp_k),
            feels = temperature_label(record.conditions.feels_like_k),
            hum = record.conditions.humidity_pct,
            pres = record.conditions.pressure_hpa,
            wind = speed_label(record.wind.speed_mps),
            dir = compass(record.wind.deg, opts.compass),
            gust = speed_label(record.wind.gust_mps),
            updated = updated_label(record.observed_at, opts.zone, &opts.zone_label),
        );

        if opts.include_location {
            status = format!("{}: {status}", location_label(&record.location));
        }

        let tags = hashtag_line(&opts.hashtags);
        if !tags.is_empty() {
            status.push(' ');
            status.push_str(&tags);
        }

        status
    }
}
