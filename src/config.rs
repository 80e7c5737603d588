use std::env;
use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("CHESS_PORT must be a port number, got {0:?}")]
    InvalidPort(String),
}

/// Server settings, read from `CHESS_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Built front-end files, served under `/static` when set.
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            static_dir: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<ServerConfig, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<ServerConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServerConfig::default();
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match non_empty("CHESS_PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => defaults.port,
        };

        Ok(ServerConfig {
            host: non_empty("CHESS_HOST").unwrap_or(defaults.host),
            port,
            static_dir: non_empty("CHESS_STATIC_DIR").map(PathBuf::from),
        })
    }

    pub fn address(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}
