use std::net::SocketAddr;
use wordtok::IdStrategy;

/// Address the server listens on when nothing else is configured
pub const DEFAULT_BIND: &str = "0.0.0.0:3000";

/// Largest request body accepted by default, 100 KiB
pub const DEFAULT_MAX_BODY_BYTES: usize = 100 * 1024;

/// Everything needed to start a server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Address to listen on.  Port 0 picks any free port; see [`crate::HttpServer::local_addr`].
    pub bind: SocketAddr,

    /// How the shared vocabulary assigns ids to new tokens
    pub id_strategy: IdStrategy,

    /// Requests with a bigger body are answered with 413 without being parsed
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 3000)),
            id_strategy: IdStrategy::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bind_matches_constant() {
        assert_eq!(
            DEFAULT_BIND.parse::<SocketAddr>().unwrap(),
            ServerConfig::default().bind
        );
    }
}
