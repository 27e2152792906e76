//! ============================================================================
//! Auth Module - Request Signing
//! ============================================================================
//! Handles authentication for the Twitter API:
//! - OAuth 1.0a user-context signing (HMAC-SHA1)
//! ============================================================================

mod oauth1;

pub use oauth1::{percent_encode, OAuth1Signer};
