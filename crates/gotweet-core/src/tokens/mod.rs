// ============================================================================
// TokenStore - Twitter token resolution and persistence
// ============================================================================
// Tokens are read from a JSON file (default: ~/.gotweet-server). If that file
// does not exist they are read from TWITTER_* environment variables instead.
// Whatever resolves is written back to the file so later starts do not need
// secrets in the environment.
// ============================================================================

pub mod types;

pub use types::{
    TokenBundle, ENV_ACCESS_TOKEN, ENV_ACCESS_TOKEN_SECRET, ENV_CONSUMER_KEY,
    ENV_CONSUMER_SECRET,
};

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// File name of the tokens file under the home directory
pub const TOKENS_FILE_NAME: &str = ".gotweet-server";

/// Coarse classification of a [`TokenError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Tokens are missing or invalid, from either source
    Configuration,
    /// Filesystem access failed for a reason other than "not found"
    Io,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("could not retrieve tokens from environment")]
    MissingFromEnvironment,

    #[error("could not retrieve all tokens from disk")]
    IncompleteOnDisk,

    #[error("malformed tokens file {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot determine home directory")]
    NoHomeDirectory,

    #[error("failed to encode tokens: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl TokenError {
    fn io(action: &'static str, path: &Path, source: io::Error) -> Self {
        TokenError::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TokenError::MissingFromEnvironment
            | TokenError::IncompleteOnDisk
            | TokenError::Malformed { .. }
            | TokenError::NoHomeDirectory => ErrorKind::Configuration,
            TokenError::Encode(_) | TokenError::Io { .. } => ErrorKind::Io,
        }
    }
}

/// Location of the persisted tokens file
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.gotweet-server`
    pub fn default_path() -> Result<PathBuf, TokenError> {
        let home = dirs::home_dir().ok_or(TokenError::NoHomeDirectory)?;
        Ok(home.join(TOKENS_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve tokens from the file, falling back to the process environment
    pub fn resolve(&self) -> Result<TokenBundle, TokenError> {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    /// Resolve tokens from the file, falling back to `lookup` for the
    /// environment. A present file always wins, even when it is incomplete.
    /// Any bundle returned is valid.
    pub fn resolve_with<F>(&self, lookup: F) -> Result<TokenBundle, TokenError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(
                    "No tokens file at {}, reading environment",
                    self.path.display()
                );
                let bundle = TokenBundle::from_lookup(lookup);
                if !bundle.is_valid() {
                    return Err(TokenError::MissingFromEnvironment);
                }
                info!("Resolved Twitter tokens from environment");
                return Ok(bundle);
            }
            Err(e) => return Err(TokenError::io("open", &self.path, e)),
        };

        let mut raw = Vec::new();
        file.read_to_end(&mut raw)
            .map_err(|e| TokenError::io("read", &self.path, e))?;

        let bundle: TokenBundle =
            serde_json::from_slice(&raw).map_err(|source| TokenError::Malformed {
                path: self.path.clone(),
                source,
            })?;

        if !bundle.is_valid() {
            return Err(TokenError::IncompleteOnDisk);
        }

        info!("Resolved Twitter tokens from {}", self.path.display());
        Ok(bundle)
    }

    /// Write `bundle` to the tokens file atomically.
    ///
    /// The JSON is written and synced to a temp file in the same directory,
    /// then renamed over the target. A failure at any step leaves the
    /// target as it was. The temp file is created with mode 0600 on Unix.
    pub fn persist(&self, bundle: &TokenBundle) -> Result<(), TokenError> {
        let encoded = serde_json::to_vec(bundle).map_err(TokenError::Encode)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(".gotweet-tmp")
            .tempfile_in(dir)
            .map_err(|e| TokenError::io("create temp file in", dir, e))?;

        tmp.write_all(&encoded)
            .map_err(|e| TokenError::io("write", tmp.path(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| TokenError::io("sync", tmp.path(), e))?;

        tmp.persist(&self.path)
            .map_err(|e| TokenError::io("replace", &self.path, e.error))?;

        debug!("Persisted Twitter tokens to {}", self.path.display());
        Ok(())
    }
}
