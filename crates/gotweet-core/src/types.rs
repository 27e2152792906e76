//! ============================================================================
//! Core Types for Gotweet
//! ============================================================================

use serde::{Deserialize, Serialize};

/// Result of posting a tweet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweetResult {
    pub tweet_id: String,
    pub url: String,
    /// Text as echoed back by the API (may differ from the input after
    /// server-side normalization)
    pub text: String,
}

impl TweetResult {
    /// Build a result for a tweet id, deriving its public status URL
    pub fn new(tweet_id: impl Into<String>, text: impl Into<String>) -> Self {
        let tweet_id = tweet_id.into();
        let url = format!("https://twitter.com/i/status/{}", tweet_id);
        Self {
            tweet_id,
            url,
            text: text.into(),
        }
    }
}

/// First 50 characters of `text`, for log lines
pub(crate) fn preview(text: &str) -> String {
    text.chars().take(50).collect()
}
