use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{BotError, Result, truncate_body};

use super::{PublishedStatus, StatusPublisher, ensure_postable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Unlisted,
    Private,
    Direct,
}

impl Visibility {
    pub const fn all() -> &'static [Visibility] {
        &[
            Visibility::Public,
            Visibility::Unlisted,
            Visibility::Private,
            Visibility::Direct,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Unlisted => "unlisted",
            Visibility::Private => "private",
            Visibility::Direct => "direct",
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The account an access token belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub acct: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Clone)]
pub struct MastodonClient {
    server: String,
    access_token: String,
    visibility: Visibility,
    http: Client,
}

impl MastodonClient {
    pub fn new(server: &str, access_token: String) -> Self {
        Self {
            server: server.trim_end_matches('/').to_string(),
            access_token,
            visibility: Visibility::default(),
            http: Client::new(),
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.server)
    }

    /// Checks that the access token is accepted and returns its account.
    pub async fn verify_credentials(&self) -> Result<Account> {
        let res = self
            .http
            .get(self.endpoint("/api/v1/accounts/verify_credentials"))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| BotError::Publish(format!("could not reach {}: {e}", self.server)))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| BotError::Publish(format!("failed to read credentials response: {e}")))?;

        if !status.is_success() {
            return Err(BotError::Publish(format!(
                "credential check failed with status {status}: {}",
                truncate_body(&body)
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| BotError::Publish(format!("unexpected account JSON: {e}")))
    }
}

#[async_trait]
impl StatusPublisher for MastodonClient {
    async fn publish(&self, text: &str) -> Result<PublishedStatus> {
        ensure_postable(text)?;
        debug!(server = %self.server, visibility = %self.visibility, "posting status");

        let res = self
            .http
            .post(self.endpoint("/api/v1/statuses"))
            .bearer_auth(&self.access_token)
            .form(&[("status", text), ("visibility", self.visibility.as_str())])
            .send()
            .await
            .map_err(|e| BotError::Publish(format!("could not reach {}: {e}", self.server)))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| BotError::Publish(format!("failed to read post response: {e}")))?;

        if !status.is_success() {
            return Err(BotError::Publish(format!(
                "server responded with status {status}: {}",
                truncate_body(&body)
            )));
        }

        let published: PublishedStatus = serde_json::from_str(&body)
            .map_err(|e| BotError::Publish(format!("unexpected status JSON: {e}")))?;

        info!(id = %published.id, "posted status");
        Ok(published)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = MastodonClient::new("https://mastodon.example/", "TOKEN".into());
        assert_eq!(
            client.endpoint("/api/v1/statuses"),
            "https://mastodon.example/api/v1/statuses"
        );
    }

    #[test]
    fn visibility_serializes_lowercase() {
        let v: Visibility = serde_json::from_str("\"unlisted\"").unwrap();
        assert_eq!(v, Visibility::Unlisted);
        assert_eq!(Visibility::default().to_string(), "public");
    }

    #[tokio::test]
    async fn empty_status_never_reaches_the_network() {
        // Port 1 is never listening; an attempted request would fail differently.
        let client = MastodonClient::new("http://127.0.0.1:1", "TOKEN".into());
        let err = client.publish("").await.unwrap_err();
        assert!(err.to_string().contains("empty status"));
    }
}
