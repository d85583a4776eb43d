// Post fetching — home timeline and hashtag search, with pagination.
//
// Both endpoints return at most 100 posts per page; we keep following the
// cursor until `max_posts` are collected or the feed runs out. Posts come
// back newest-first, which is the order written to the raw feed file.

use anyhow::{Context, Result};
use atrium_api::app::bsky::feed::defs::PostView;
use atrium_api::app::bsky::feed::{get_timeline, search_posts};
use atrium_api::types::TryFromUnknown;
use tracing::{debug, info};

use super::client::AtpClient;
use super::raw::RawPost;

/// Pull the text out of a post view's untyped record.
fn post_text(post_view: &PostView) -> String {
    atrium_api::app::bsky::feed::post::Record::try_from_unknown(post_view.record.clone())
        .map(|record| record.data.text.clone())
        .unwrap_or_default()
}

/// Fetch the most recent posts from the authenticated account's home
/// timeline. Reposts and posts without text are skipped.
pub async fn fetch_timeline(client: &AtpClient, max_posts: usize) -> Result<Vec<RawPost>> {
    let mut posts = Vec::new();
    let mut cursor: Option<String> = None;
    let page_size = max_posts.clamp(1, 100).to_string();

    loop {
        let mut params: Vec<(&str, &str)> = vec![("limit", &page_size)];
        if let Some(ref c) = cursor {
            params.push(("cursor", c));
        }

        let output: get_timeline::Output = client
            .xrpc_get("app.bsky.feed.getTimeline", &params)
            .await
            .context("Failed to fetch home timeline")?;

        for feed_item in &output.feed {
            if feed_item.reason.is_some() {
                continue;
            }
            let text = post_text(&feed_item.post);
            if text.trim().is_empty() {
                continue;
            }
            posts.push(RawPost::new(feed_item.post.uri.clone(), &text));
            if posts.len() >= max_posts {
                break;
            }
        }

        debug!(
            page_posts = output.feed.len(),
            total_collected = posts.len(),
            "Fetched timeline page"
        );

        if posts.len() >= max_posts {
            break;
        }
        cursor = output.data.cursor.clone();
        if cursor.is_none() || output.feed.is_empty() {
            break;
        }
    }

    info!(count = posts.len(), "Collected timeline posts");
    Ok(posts)
}

/// Search recent posts tagged with `#tag`.
pub async fn search_hashtag(client: &AtpClient, tag: &str, max_posts: usize) -> Result<Vec<RawPost>> {
    let tag = tag.trim_start_matches('#');
    let query = format!("#{tag}");
    let mut posts = Vec::new();
    let mut cursor: Option<String> = None;
    let page_size = max_posts.clamp(1, 100).to_string();

    loop {
        let mut params: Vec<(&str, &str)> =
            vec![("q", &query), ("sort", "latest"), ("limit", &page_size)];
        if let Some(ref c) = cursor {
            params.push(("cursor", c));
        }

        let output: search_posts::Output = client
            .xrpc_get("app.bsky.feed.searchPosts", &params)
            .await
            .with_context(|| format!("Failed to search posts for #{tag}"))?;

        for post_view in &output.posts {
            let text = post_text(post_view);
            if text.trim().is_empty() {
                continue;
            }
            posts.push(RawPost::new(post_view.uri.clone(), &text));
            if posts.len() >= max_posts {
                break;
            }
        }

        debug!(
            tag,
            page_posts = output.posts.len(),
            total_collected = posts.len(),
            "Fetched search page"
        );

        if posts.len() >= max_posts {
            break;
        }
        cursor = output.data.cursor.clone();
        if cursor.is_none() || output.posts.is_empty() {
            break;
        }
    }

    info!(count = posts.len(), tag, "Collected hashtag posts");
    Ok(posts)
}
