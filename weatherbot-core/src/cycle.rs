use std::time::Duration;
use tracing::{error, info, warn};

use crate::{
    error::{BotError, Result},
    format::{StatusFormatter, UNKNOWN_DIRECTION},
    provider::{LocationQuery, WeatherProvider},
    publisher::{PublishedStatus, StatusPublisher},
};

/// What to do when a cycle fails with a non-fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Log it and try again after the next sleep.
    #[default]
    SkipCycle,
    /// Stop the loop and hand the error back.
    Abort,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub status: String,
    pub published: PublishedStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub succeeded: u64,
    pub failed: u64,
}

/// One fetch-format-publish pipeline for a single location.
#[derive(Debug)]
pub struct Bot<W, P> {
    provider: W,
    publisher: P,
    formatter: StatusFormatter,
    query: LocationQuery,
}

impl<W: WeatherProvider, P: StatusPublisher> Bot<W, P> {
    pub fn new(provider: W, publisher: P, formatter: StatusFormatter, query: LocationQuery) -> Self {
        Self {
            provider,
            publisher,
            formatter,
            query,
        }
    }

    /// Fetch and format without posting.
    pub async fn preview(&self) -> Result<String> {
        let record = self.provider.fetch(&self.query).await?;
        Ok(self.formatter.format(&record))
    }

    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let status = self.preview().await?;

        if status.contains(UNKNOWN_DIRECTION) {
            warn!(%status, "wind direction did not match any compass bucket");
            return Err(BotError::Publish(format!(
                "refusing to post status with an unknown wind direction: {status}"
            )));
        }

        let published = self.publisher.publish(&status).await?;
        Ok(CycleReport { status, published })
    }

    /// Runs cycles back to back with `interval` of sleep between them.
    ///
    /// Stops after `max_cycles` when given (zero runs nothing), otherwise only on a fatal error or
    /// on any error under [`ErrorPolicy::Abort`].
    pub async fn run(
        &self,
        interval: Duration,
        policy: ErrorPolicy,
        max_cycles: Option<u64>,
    ) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        let mut cycle: u64 = 0;

        if max_cycles == Some(0) {
            return Ok(summary);
        }

        loop {
            cycle += 1;

            match self.run_cycle().await {
                Ok(report) => {
                    summary.succeeded += 1;
                    info!(cycle, id = %report.published.id, status = %report.status, "cycle complete");
                }
                Err(err) => {
                    summary.failed += 1;
                    error!(cycle, error = %err, "cycle failed");

                    if err.is_fatal() || policy == ErrorPolicy::Abort {
                        return Err(err);
                    }
                }
            }

            if max_cycles.is_some_and(|max| cycle >= max) {
                return Ok(summary);
            }

            info!(seconds = interval.as_secs(), "sleeping until next cycle");
            tokio::time::sleep(interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        format::{CompassMode, FormatOptions, ZoneSetting},
        model::{Conditions, Location, WeatherRecord, Wind},
    };
    use async_trait::async_trait;
    use chrono::FixedOffset;
    use std::{collections::VecDeque, sync::Mutex};

    fn record() -> WeatherRecord {
        WeatherRecord {
            conditions: Conditions {
                temp_k: 280.15,
                feels_like_k: 276.15,
                humidity_pct: 90,
                pressure_hpa: 1003,
            },
            descriptions: vec!["light rain".into()],
            wind: Wind {
                speed_mps: 10.0,
                gust_mps: 15.0,
                deg: 270,
            },
            location: Location {
                name: "Corner Brook".into(),
                country: "CA".into(),
            },
            observed_at: 1714588440,
        }
    }

    fn decode_error() -> BotError {
        BotError::Decode {
            context: "test",
            detail: "garbage".into(),
        }
    }

    #[derive(Debug)]
    struct ScriptedProvider {
        outcomes: Mutex<VecDeque<Result<WeatherRecord>>>,
    }

    impl ScriptedProvider {
        fn new(outcomes: Vec<Result<WeatherRecord>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
            }
        }
    }

    #[async_trait]
    impl WeatherProvider for ScriptedProvider {
        async fn fetch(&self, _query: &LocationQuery) -> Result<WeatherRecord> {
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(decode_error()))
        }
    }

    #[derive(Debug, Default)]
    struct RecordingPublisher {
        posted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl StatusPublisher for RecordingPublisher {
        async fn publish(&self, text: &str) -> Result<PublishedStatus> {
            let mut posted = self.posted.lock().unwrap();
            posted.push(text.to_string());
            Ok(PublishedStatus {
                id: posted.len().to_string(),
                url: None,
            })
        }
    }

    fn bot(outcomes: Vec<Result<WeatherRecord>>) -> Bot<ScriptedProvider, RecordingPublisher> {
        let formatter = StatusFormatter::new(FormatOptions {
            zone: ZoneSetting::Fixed(FixedOffset::east_opt(0).unwrap()),
            zone_label: "UTC".into(),
            ..FormatOptions::default()
        });

        Bot::new(
            ScriptedProvider::new(outcomes),
            RecordingPublisher::default(),
            formatter,
            LocationQuery::new("Corner Brook", "NL", "CA"),
        )
    }

    #[tokio::test]
    async fn cycle_posts_formatted_status() {
        let bot = bot(vec![Ok(record())]);
        let report = bot.run_cycle().await.unwrap();

        assert_eq!(report.published.id, "1");
        assert!(report.status.starts_with("Corner Brook, CA: Light Rain, 7°C (feels like 3°C)."));
        assert!(report.status.contains("Wind 36 km/h W, gusts 54 km/h."));
        assert!(report.status.contains("Updated 2024-05-01 6:34PM UTC"));
        assert_eq!(bot.publisher.posted.lock().unwrap().as_slice(), [report.status]);
    }

    #[tokio::test]
    async fn fetch_failure_skips_formatting_and_posting() {
        let bot = bot(vec![Err(decode_error())]);
        let err = bot.run_cycle().await.unwrap_err();

        assert!(matches!(err, BotError::Decode { .. }));
        assert!(bot.publisher.posted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn skip_policy_keeps_running_after_a_bad_cycle() {
        let bot = bot(vec![Err(decode_error()), Ok(record())]);
        let summary = bot
            .run(Duration::ZERO, ErrorPolicy::SkipCycle, Some(2))
            .await
            .unwrap();

        assert_eq!(summary, RunSummary { succeeded: 1, failed: 1 });
        assert_eq!(bot.publisher.posted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn abort_policy_stops_on_first_error() {
        let bot = bot(vec![Err(decode_error()), Ok(record())]);
        let err = bot
            .run(Duration::ZERO, ErrorPolicy::Abort, Some(2))
            .await
            .unwrap_err();

        assert!(matches!(err, BotError::Decode { .. }));
        assert!(bot.publisher.posted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn config_errors_abort_regardless_of_policy() {
        let bot = bot(vec![
            Err(BotError::Config("bad url".into())),
            Ok(record()),
        ]);
        let err = bot
            .run(Duration::ZERO, ErrorPolicy::SkipCycle, Some(2))
            .await
            .unwrap_err();

        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn zero_max_cycles_runs_nothing() {
        let bot = bot(vec![Ok(record())]);
        let summary = bot
            .run(Duration::ZERO, ErrorPolicy::SkipCycle, Some(0))
            .await
            .unwrap();

        assert_eq!(summary, RunSummary::default());
        assert!(bot.publisher.posted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_wind_direction_is_never_posted() {
        let mut rec = record();
        rec.wind.deg = -10;

        let bot = Bot::new(
            ScriptedProvider::new(vec![Ok(rec)]),
            RecordingPublisher::default(),
            StatusFormatter::new(FormatOptions {
                compass: CompassMode::Legacy,
                ..FormatOptions::default()
            }),
            LocationQuery::new("Corner Brook", "NL", "CA"),
        );
        let err = bot.run_cycle().await.unwrap_err();

        assert!(matches!(err, BotError::Publish(_)));
        assert!(!err.is_fatal());
        assert!(bot.publisher.posted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn preview_does_not_post() {
        let bot = bot(vec![Ok(record())]);
        let status = bot.preview().await.unwrap();

        assert!(status.ends_with("#weather"));
        assert!(bot.publisher.posted.lock().unwrap().is_empty());
    }
}
