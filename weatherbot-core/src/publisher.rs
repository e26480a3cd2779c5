use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::info;

use crate::error::{BotError, Result};

pub mod mastodon;

pub use mastodon::MastodonClient;

/// What the posting service reports back after a successful post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedStatus {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[async_trait]
pub trait StatusPublisher: Send + Sync + Debug {
    async fn publish(&self, text: &str) -> Result<PublishedStatus>;
}

#[async_trait]
impl<T: StatusPublisher + ?Sized> StatusPublisher for Box<T> {
    async fn publish(&self, text: &str) -> Result<PublishedStatus> {
        (**self).publish(text).await
    }
}

/// Refuses blank text before anything goes over the wire.
pub(crate) fn ensure_postable(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(BotError::Publish("refusing to post an empty status".to_string()));
    }
    Ok(())
}

/// Logs the status instead of posting it.
#[derive(Debug, Clone, Default)]
pub struct DryRunPublisher;

#[async_trait]
impl StatusPublisher for DryRunPublisher {
    async fn publish(&self, text: &str) -> Result<PublishedStatus> {
        ensure_postable(text)?;
        info!(status = %text, "dry run, not posting");

        Ok(PublishedStatus {
            id: "dry-run".to_string(),
            url: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dry_run_accepts_text() {
        let published = DryRunPublisher.publish("Sunny, 20°C").await.unwrap();
        assert_eq!(published.id, "dry-run");
        assert_eq!(published.url, None);
    }

    #[tokio::test]
    async fn boxed_publisher_delegates() {
        let boxed: Box<dyn StatusPublisher> = Box::new(DryRunPublisher);
        assert_eq!(boxed.publish("Fog").await.unwrap().id, "dry-run");
    }

    #[tokio::test]
    async fn dry_run_rejects_blank_text() {
        let err = DryRunPublisher.publish("   ").await.unwrap_err();
        assert!(matches!(err, BotError::Publish(_)));
    }
}
