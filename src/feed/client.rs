// AT Protocol client — XRPC over HTTP with an app-password session.
//
// The home timeline and post search both need an authenticated session, so
// the client logs in once with com.atproto.server.createSession and sends
// the access token as a bearer header on every read.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Default server for session creation and feed reads.
pub const DEFAULT_PDS_URL: &str = "https://bsky.social";

/// Thin reqwest wrapper with a generic XRPC GET helper.
pub struct AtpClient {
    client: reqwest::Client,
    base_url: String,
    access_jwt: Option<String>,
}

impl AtpClient {
    /// Create an unauthenticated client pointing at the given base URL.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("seedling/0.1 (topic-labeling)")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_jwt: None,
        })
    }

    /// Create a client and open a session with a handle and app password.
    pub async fn login(base_url: &str, identifier: &str, password: &str) -> Result<Self> {
        let mut client = Self::new(base_url)?;
        let url = format!("{}/xrpc/com.atproto.server.createSession", client.base_url);

        let response = client
            .client
            .post(&url)
            .json(&CreateSessionRequest {
                identifier,
                password,
            })
            .send()
            .await
            .with_context(|| format!("Failed to reach {} to create a session", client.base_url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("createSession for @{identifier} returned {status}: {body}");
        }

        let session: CreateSessionResponse = response
            .json()
            .await
            .context("Failed to parse createSession response")?;

        info!(handle = %session.handle, "Opened Bluesky session");
        client.access_jwt = Some(session.access_jwt);
        Ok(client)
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_jwt.is_some()
    }

    /// Make a GET request to an XRPC endpoint and deserialize the response.
    ///
    /// `nsid` is the XRPC method name (e.g. "app.bsky.feed.getTimeline").
    pub async fn xrpc_get<T: DeserializeOwned>(
        &self,
        nsid: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}/xrpc/{}", self.base_url, nsid);

        debug!(nsid = nsid, "XRPC GET request");

        let mut request = self.client.get(&url).query(params);
        if let Some(token) = &self.access_jwt {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("XRPC request failed: {nsid}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("XRPC {nsid} returned {status}: {body}");
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to deserialize {nsid} response"))
    }
}

// -- Serde types for com.atproto.server.createSession --

#[derive(Serialize)]
struct CreateSessionRequest<'a> {
    identifier: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionResponse {
    access_jwt: String,
    handle: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = AtpClient::new("https://bsky.social/").unwrap();
        assert_eq!(client.base_url, "https://bsky.social");
        assert!(!client.is_authenticated());
    }
}
