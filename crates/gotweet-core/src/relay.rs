//! ============================================================================
//! Tweet Relay - Request Body to Tweet
//! ============================================================================
//! The whole request body is the tweet text. No parsing, no options, no
//! retries. Bytes that are not valid UTF-8 become U+FFFD rather than an
//! error. Post errors are always returned to the caller; the server decides
//! that they are fatal.
//! ============================================================================

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::types::{preview, TweetResult};

/// Anything that can publish a tweet
#[async_trait]
pub trait TweetPoster: Send + Sync {
    async fn post(&self, text: &str) -> anyhow::Result<TweetResult>;
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("failed to read request body: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to post tweet: {0:#}")]
    Post(anyhow::Error),
}

/// Forwards request bodies to a shared, read-only poster
#[derive(Clone)]
pub struct Relay {
    poster: Arc<dyn TweetPoster>,
}

impl Relay {
    pub fn new(poster: Arc<dyn TweetPoster>) -> Self {
        Self { poster }
    }

    /// Post `body` verbatim as a tweet
    pub async fn handle(&self, body: Vec<u8>) -> Result<TweetResult, RelayError> {
        let text = match String::from_utf8(body) {
            Ok(text) => text,
            Err(e) => {
                warn!("Request body is not valid UTF-8, replacing invalid bytes");
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };
        info!("Received request body to POST: {}", preview(&text));

        let tweet = self.poster.post(&text).await.map_err(RelayError::Post)?;
        info!("Posted tweet {} ({})", tweet.tweet_id, tweet.url);
        Ok(tweet)
    }
}
