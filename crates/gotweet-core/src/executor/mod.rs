//! ============================================================================
//! Executor Module - Outbound API Executors
//! ============================================================================
//! - TwitterExecutor: tweet posting via Twitter API v2 (OAuth 1.0a)
//! ============================================================================

mod twitter;

pub use twitter::TwitterExecutor;
