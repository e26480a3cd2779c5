//! Core library for the `weatherbot` binary.
//!
//! This crate defines:
//! - The weather record fetched from OpenWeather each cycle
//! - The status formatter turning a record into post text
//! - Publishers that post the text to Mastodon (or just log it)
//! - Configuration, the error taxonomy and the cycle runner tying it together

pub mod config;
pub mod cycle;
pub mod error;
pub mod format;
pub mod model;
pub mod provider;
pub mod publisher;

pub use config::Config;
pub use cycle::{Bot, CycleReport, ErrorPolicy, RunSummary};
pub use error::BotError;
pub use format::{FormatOptions, StatusFormatter};
pub use model::WeatherRecord;
pub use provider::{LocationQuery, OpenWeatherProvider, WeatherProvider};
pub use publisher::{DryRunPublisher, MastodonClient, PublishedStatus, StatusPublisher};
