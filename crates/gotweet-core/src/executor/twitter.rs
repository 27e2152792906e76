//! ============================================================================
//! Twitter Executor - Tweet Posting via Twitter API v2
//! ============================================================================
//! Posts tweets as the user the token bundle belongs to, signing each
//! request with OAuth 1.0a. Tweet text is passed through untouched; length
//! and content rules are left to the API.
//! ============================================================================

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::auth::OAuth1Signer;
use crate::relay::TweetPoster;
use crate::tokens::TokenBundle;
use crate::types::{preview, TweetResult};

/// Twitter API base URL
const TWITTER_API_BASE: &str = "https://api.twitter.com";

/// Executor for Twitter posting operations
pub struct TwitterExecutor {
    client: reqwest::Client,
    signer: OAuth1Signer,
    api_base: String,
}

impl TwitterExecutor {
    /// Create a new TwitterExecutor acting as the user owning `tokens`
    pub fn new(tokens: &TokenBundle) -> Self {
        Self {
            client: reqwest::Client::new(),
            signer: OAuth1Signer::new(tokens),
            api_base: TWITTER_API_BASE.to_string(),
        }
    }

    /// Point the executor at a different API host
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Post a single tweet
    pub async fn post_tweet(&self, text: &str) -> Result<TweetResult> {
        info!("Posting tweet: {}...", preview(text));

        let url = format!("{}/2/tweets", self.api_base);
        let authorization = self.signer.authorization_header("POST", &url, &[])?;
        let body = serde_json::json!({ "text": text });

        let response = self
            .client
            .post(&url)
            .header("Authorization", authorization)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to post tweet: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Twitter API error {}: {}", status, body));
        }

        let tweet_response: TwitterTweetResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse tweet response: {}", e))?;
        debug!("Tweet response: {:?}", tweet_response);

        let data = tweet_response.data;
        let result = TweetResult::new(data.id, data.text);

        info!("Tweet posted: {}", result.url);
        Ok(result)
    }
}

#[async_trait]
impl TweetPoster for TwitterExecutor {
    async fn post(&self, text: &str) -> Result<TweetResult> {
        self.post_tweet(text).await
    }
}

// ============================================================================
// Twitter API Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct TwitterTweetResponse {
    data: TwitterTweetData,
}

#[derive(Debug, Deserialize)]
struct TwitterTweetData {
    id: String,
    #[serde(default)]
    text: String,
}
