use thiserror::Error;

/// Everything that can go wrong during a bot cycle.
#[derive(Debug, Error)]
pub enum BotError {
    /// Missing or invalid configuration values.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The HTTP call could not complete.
    #[error("Network error while {context}: {source}")]
    Network {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The remote service answered, but not with a success status.
    #[error("{service} request failed with status {status}: {body}")]
    Upstream {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// The response body was not valid JSON or did not match the expected shape.
    #[error("Failed to decode {context}: {detail}")]
    Decode { context: &'static str, detail: String },

    /// Posting the status failed.
    #[error("Failed to publish status: {0}")]
    Publish(String),
}

impl BotError {
    /// Fatal errors stop the bot; everything else only spoils the current cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BotError::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, BotError>;

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_config_errors_are_fatal() {
        assert!(BotError::Config("missing city".into()).is_fatal());
        assert!(!BotError::Publish("boom".into()).is_fatal());
        assert!(
            !BotError::Decode { context: "weather", detail: "eof".into() }.is_fatal()
        );
    }

    #[test]
    fn truncate_body_keeps_short_bodies() {
        assert_eq!(truncate_body("not found"), "not found");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let body = "é".repeat(150);
        let out = truncate_body(&body);
        assert!(out.ends_with("..."));
        assert!(out.len() <= 203);
    }
}
