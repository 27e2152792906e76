// ============================================================================
// Server configuration - CLI flags with environment fallbacks
// ============================================================================

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;
use gotweet_core::{TokenError, TokenStore};

/// Relay HTTP request bodies to Twitter as tweets
#[derive(Parser, Debug, Clone)]
#[command(name = "gotweet-server", version, about = "Post request bodies to Twitter")]
pub struct ServerConfig {
    /// Address to bind; use `::` to accept IPv6 as well
    #[arg(long, env = "GOTWEET_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 4000)]
    pub port: u16,

    /// Path to the tokens file (default: ~/.gotweet-server)
    #[arg(long, env = "GOTWEET_TOKENS_PATH")]
    pub tokens_path: Option<PathBuf>,
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        SocketAddr::new(self.host, self.port).to_string()
    }

    pub fn token_store(&self) -> Result<TokenStore, TokenError> {
        let path = match &self.tokens_path {
            Some(path) => path.clone(),
            None => TokenStore::default_path()?,
        };
        Ok(TokenStore::new(path))
    }
}
