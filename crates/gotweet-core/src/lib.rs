//! ============================================================================
//! GOTWEET-CORE: Tokens In, Tweets Out
//! ============================================================================
//! This crate holds everything the relay server needs besides the socket:
//! - Twitter token resolution (file first, then environment) and persistence
//! - OAuth 1.0a request signing
//! - Twitter API v2 posting via reqwest
//! - The relay that turns a request body into a tweet
//! ============================================================================

pub mod auth;
pub mod executor;
pub mod relay;
pub mod tokens;
pub mod types;

// Re-export main types for convenience
pub use executor::TwitterExecutor;
pub use relay::{Relay, RelayError, TweetPoster};
pub use tokens::{ErrorKind, TokenBundle, TokenError, TokenStore};
pub use types::TweetResult;
