// Feed source trait — where raw posts come from.
//
// The pipeline only needs "latest posts" and "recent posts for a hashtag".
// BlueskyFeed is the real implementation; tests plug in an in-memory one.

use anyhow::Result;
use async_trait::async_trait;

use super::client::AtpClient;
use super::posts;
use super::raw::RawPost;
use crate::config::Config;

#[async_trait]
pub trait FeedSource: Send + Sync {
    /// The most recent posts from the account's home timeline, newest first.
    async fn latest_posts(&self, count: usize) -> Result<Vec<RawPost>>;

    /// Recent posts tagged with `tag` (with or without the leading `#`).
    async fn posts_for_hashtag(&self, tag: &str, count: usize) -> Result<Vec<RawPost>>;
}

/// Bluesky feed over an authenticated AT Protocol session.
pub struct BlueskyFeed {
    client: AtpClient,
}

impl BlueskyFeed {
    /// Check credentials, then open a session. No request is made when
    /// credentials are missing.
    pub async fn connect(config: &Config) -> Result<Self> {
        config.require_credentials()?;
        let client = AtpClient::login(
            &config.pds_url,
            &config.bluesky_handle,
            &config.bluesky_app_password,
        )
        .await?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedSource for BlueskyFeed {
    async fn latest_posts(&self, count: usize) -> Result<Vec<RawPost>> {
        posts::fetch_timeline(&self.client, count).await
    }

    async fn posts_for_hashtag(&self, tag: &str, count: usize) -> Result<Vec<RawPost>> {
        posts::search_hashtag(&self.client, tag, count).await
    }
}
