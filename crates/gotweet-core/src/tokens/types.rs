// ============================================================================
// TokenBundle - the four Twitter user-context credentials
// ============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment variable names for each token
pub const ENV_CONSUMER_KEY: &str = "TWITTER_CONSUMER_KEY";
pub const ENV_CONSUMER_SECRET: &str = "TWITTER_CONSUMER_SECRET";
pub const ENV_ACCESS_TOKEN: &str = "TWITTER_ACCESS_TOKEN";
pub const ENV_ACCESS_TOKEN_SECRET: &str = "TWITTER_ACCESS_TOKEN_SECRET";

/// Everything needed to act as a Twitter user. Written to disk so the
/// secrets can be removed from the environment after first start.
///
/// Missing keys decode as empty strings; use [`TokenBundle::is_valid`]
/// before trusting a decoded bundle.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenBundle {
    /// Maps to API key
    pub consumer_key: String,
    /// Maps to API secret
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl TokenBundle {
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        access_token: impl Into<String>,
        access_token_secret: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            access_token: access_token.into(),
            access_token_secret: access_token_secret.into(),
        }
    }

    /// Build a bundle from an environment lookup. Unset variables become
    /// empty fields.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).unwrap_or_default();
        Self {
            consumer_key: get(ENV_CONSUMER_KEY),
            consumer_secret: get(ENV_CONSUMER_SECRET),
            access_token: get(ENV_ACCESS_TOKEN),
            access_token_secret: get(ENV_ACCESS_TOKEN_SECRET),
        }
    }

    /// True if all four tokens are populated
    pub fn is_valid(&self) -> bool {
        !(self.consumer_key.is_empty()
            || self.consumer_secret.is_empty()
            || self.access_token.is_empty()
            || self.access_token_secret.is_empty())
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        "<empty>"
    } else {
        "<redacted>"
    }
}

impl fmt::Debug for TokenBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenBundle")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &redact(&self.consumer_secret))
            .field("access_token", &self.access_token)
            .field("access_token_secret", &redact(&self.access_token_secret))
            .finish()
    }
}
