//! Runtime configuration, read from command-line flags or the environment.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

/// Upper bound for every duration setting: one year.
pub const MAX_DURATION_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be greater than zero")]
    Zero { name: &'static str },

    #[error("{name} must be at most {max} seconds")]
    TooLarge { name: &'static str, max: u64 },
}

/// Player API server.
#[derive(Debug, Clone, Parser)]
#[command(name = "players-api", version, about)]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "PLAYERS_API_ADDR", default_value = "127.0.0.1:9000")]
    pub addr: String,

    /// Lifetime of a cached GET response, in seconds.
    #[arg(long, env = "PLAYERS_API_CACHE_TTL_SECS", default_value_t = 3600)]
    pub cache_ttl_secs: u64,

    /// How often expired cache entries are purged, in seconds.
    #[arg(long, env = "PLAYERS_API_SWEEP_INTERVAL_SECS", default_value_t = 600)]
    pub sweep_interval_secs: u64,

    /// JSON file with the initial players; the bundled squad is used if omitted.
    #[arg(long, env = "PLAYERS_API_SEED")]
    pub seed: Option<PathBuf>,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_secs("cache-ttl-secs", self.cache_ttl_secs)?;
        check_secs("sweep-interval-secs", self.sweep_interval_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

fn check_secs(name: &'static str, secs: u64) -> Result<(), ConfigError> {
    match secs {
        0 => Err(ConfigError::Zero { name }),
        s if s > MAX_DURATION_SECS => Err(ConfigError::TooLarge {
            name,
            max: MAX_DURATION_SECS,
        }),
        _ => Ok(()),
    }
}
