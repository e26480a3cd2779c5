use anyhow::Result;
use inquire::{Confirm, Password, PasswordDisplayMode, Select, Text};
use weatherbot_core::{Config, format::CompassMode, publisher::mastodon::Visibility};

/// Prompt for every setting, pre-filled from the existing file, then save it.
///
/// Environment overrides are deliberately not loaded here so they never end
/// up written to disk.
pub fn run() -> Result<()> {
    let mut cfg = Config::load_file()?;

    cfg.location.city = Text::new("City:")
        .with_initial_value(&cfg.location.city)
        .prompt()?;
    cfg.location.region = Text::new("Region / state (optional):")
        .with_initial_value(&cfg.location.region)
        .prompt()?;
    cfg.location.country_code = Text::new("Country code (ISO-3166, e.g. CA):")
        .with_initial_value(&cfg.location.country_code)
        .prompt()?
        .to_uppercase();

    cfg.openweather.api_key = secret("OpenWeather API key:", &cfg.openweather.api_key)?;

    cfg.mastodon.server = Text::new("Mastodon server URL:")
        .with_initial_value(&cfg.mastodon.server)
        .with_placeholder("https://mastodon.social")
        .prompt()?;
    cfg.mastodon.client_key = secret("Mastodon client key:", &cfg.mastodon.client_key)?;
    cfg.mastodon.client_secret = secret("Mastodon client secret:", &cfg.mastodon.client_secret)?;
    cfg.mastodon.access_token = secret("Mastodon access token:", &cfg.mastodon.access_token)?;

    let visibilities = Visibility::all().to_vec();
    let current = visibilities
        .iter()
        .position(|v| *v == cfg.mastodon.visibility)
        .unwrap_or(0);
    cfg.mastodon.visibility = Select::new("Post visibility:", visibilities)
        .with_starting_cursor(current)
        .prompt()?;

    let modes = CompassMode::all().to_vec();
    let current = modes
        .iter()
        .position(|m| *m == cfg.status.compass)
        .unwrap_or(0);
    cfg.status.compass = Select::new("Compass labels:", modes)
        .with_starting_cursor(current)
        .with_help_message("legacy = original nine-bucket table without western labels")
        .prompt()?;

    cfg.status.include_location = Confirm::new("Start posts with the location?")
        .with_default(cfg.status.include_location)
        .prompt()?;

    let hashtags = Text::new("Hashtags (space separated):")
        .with_initial_value(&cfg.status.hashtags.join(" "))
        .prompt()?;
    cfg.status.hashtags = hashtags.split_whitespace().map(str::to_string).collect();

    cfg.status.zone_label = Text::new("Time zone label:")
        .with_initial_value(&cfg.status.zone_label)
        .prompt()?;

    let path = cfg.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}

/// Masked prompt; leaving it blank keeps the current value.
fn secret(message: &str, current: &str) -> Result<String> {
    let help = if current.is_empty() {
        "not set yet"
    } else {
        "leave blank to keep the current value"
    };

    let value = Password::new(message)
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_help_message(help)
        .prompt()?;

    Ok(if value.trim().is_empty() {
        current.to_string()
    } else {
        value
    })
}
