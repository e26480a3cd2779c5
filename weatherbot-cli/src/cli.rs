use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::info;
use weatherbot_core::{
    Bot, Config, DryRunPublisher, ErrorPolicy, MastodonClient, OpenWeatherProvider,
    PublishedStatus, StatusFormatter, StatusPublisher, WeatherProvider,
};

use crate::configure;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherbot", version, about = "Posts the current weather to Mastodon")]
pub struct Cli {
    /// Log at debug level (ignored when RUST_LOG is set).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Post the weather every interval until stopped.
    Run {
        /// Seconds between posts; overrides the configured interval.
        #[arg(long)]
        interval: Option<u64>,

        /// Log statuses instead of posting them.
        #[arg(long)]
        dry_run: bool,

        /// Exit on the first failed cycle instead of waiting for the next one.
        #[arg(long)]
        abort_on_error: bool,

        /// Stop after this many cycles.
        #[arg(long)]
        max_cycles: Option<u64>,
    },

    /// Run a single cycle and exit.
    Once {
        /// Log the status instead of posting it.
        #[arg(long)]
        dry_run: bool,
    },

    /// Fetch and format the current status without posting.
    Preview {
        /// Print the fetched record alongside the status as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Check that the Mastodon access token works.
    Check,

    /// Interactively write the config file.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Run {
                interval,
                dry_run,
                abort_on_error,
                max_cycles,
            } => {
                let mut config = load_config()?;
                if let Some(secs) = interval {
                    config.schedule.interval_secs = secs;
                }
                if abort_on_error {
                    config.schedule.abort_on_error = true;
                }
                config.validate(!dry_run)?;

                let policy = if config.schedule.abort_on_error {
                    ErrorPolicy::Abort
                } else {
                    ErrorPolicy::SkipCycle
                };

                let bot = build_bot(&config, dry_run)?;
                info!(
                    interval_secs = config.schedule.interval_secs,
                    dry_run, "starting weather bot"
                );
                let summary = bot.run(config.interval(), policy, max_cycles).await?;
                info!(
                    succeeded = summary.succeeded,
                    failed = summary.failed,
                    "weather bot finished"
                );
            }
            Command::Once { dry_run } => {
                let config = load_config()?;
                config.validate(!dry_run)?;
                let report = build_bot(&config, dry_run)?.run_cycle().await?;
                println!("{}", report.status);
                println!("{}", outcome_line(dry_run, &report.published));
            }
            Command::Preview { json } => {
                let config = load_config()?;
                config.validate(false)?;
                let provider = build_provider(&config);
                let formatter = StatusFormatter::new(config.format_options()?);

                let record = provider.fetch(&config.location).await?;
                let status = formatter.format(&record);

                if json {
                    let out = json!({ "record": record, "status": status });
                    println!("{}", serde_json::to_string_pretty(&out)?);
                } else {
                    println!("{status}");
                }
            }
            Command::Check => {
                let config = load_config()?;
                config.validate(true)?;
                let account = build_mastodon(&config).verify_credentials().await?;
                println!(
                    "Authenticated as @{} ({}) on {}",
                    account.acct, account.display_name, config.mastodon.server
                );
            }
            Command::Configure => configure::run()?,
        }

        Ok(())
    }
}

fn outcome_line(dry_run: bool, published: &PublishedStatus) -> String {
    match (&published.url, dry_run) {
        (_, true) => "Dry run: status was not posted.".to_string(),
        (Some(url), false) => format!("Posted: {url}"),
        (None, false) => format!("Posted status with ID: {}", published.id),
    }
}

fn load_config() -> anyhow::Result<Config> {
    Config::load().context("Failed to load configuration")
}

fn build_provider(config: &Config) -> OpenWeatherProvider {
    let provider = OpenWeatherProvider::new(config.openweather.api_key.clone());
    match &config.openweather.base_url {
        Some(url) => provider.with_base_url(url.clone()),
        None => provider,
    }
}

fn build_mastodon(config: &Config) -> MastodonClient {
    MastodonClient::new(&config.mastodon.server, config.mastodon.access_token.clone())
        .with_visibility(config.mastodon.visibility)
}

fn build_bot(
    config: &Config,
    dry_run: bool,
) -> anyhow::Result<Bot<OpenWeatherProvider, Box<dyn StatusPublisher>>> {
    let publisher: Box<dyn StatusPublisher> = if dry_run {
        Box::new(DryRunPublisher)
    } else {
        Box::new(build_mastodon(config))
    };

    Ok(Bot::new(
        build_provider(config),
        publisher,
        StatusFormatter::new(config.format_options()?),
        config.location.clone(),
    ))
}
