//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use pyramid::{
    GameSettings, SessionConfig,
    constants::{MAX_PLAYERS, MIN_PLAYERS},
};
use std::{net::SocketAddr, time::Duration};

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Prometheus exporter bind address; metrics are off when unset
    pub metrics_bind: Option<SocketAddr>,
    /// Timers and rules for new sessions
    pub session: SessionConfig,
    /// Per-connection message limits
    pub rate_limit: RateLimitConfig,
    /// Capacity of each connection's outbound queue
    pub outbox_capacity: usize,
}

/// Per-connection message rate limits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Messages allowed per second
    pub burst_per_sec: usize,
    /// Messages allowed per minute
    pub sustained_per_min: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            burst_per_sec: 10,
            sustained_per_min: 120,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            metrics_bind: None,
            session: SessionConfig::default(),
            rate_limit: RateLimitConfig::default(),
            outbox_capacity: 256,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `metrics_bind_override` - Optional metrics address override (from CLI args)
    ///
    /// # Returns
    ///
    /// * `Result<ServerConfig, ConfigError>` - Loaded configuration or error
    ///
    /// # Errors
    ///
    /// Returns error if a set variable cannot be parsed
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        metrics_bind_override: Option<SocketAddr>,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        // Bind address: SERVER_BIND wins over PORT
        let bind = match bind_override {
            Some(addr) => addr,
            None => match parse_env::<SocketAddr>("SERVER_BIND")? {
                Some(addr) => addr,
                None => parse_env::<u16>("PORT")?
                    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
                    .unwrap_or(defaults.bind),
            },
        };

        let metrics_bind = match metrics_bind_override {
            Some(addr) => Some(addr),
            None => parse_env("METRICS_BIND")?,
        };

        let session_defaults = SessionConfig::default();
        let session = SessionConfig {
            memorize_duration: Duration::from_secs(parse_env_or(
                "MEMORIZE_SECS",
                session_defaults.memorize_duration.as_secs(),
            )),
            recall_start_delay: Duration::from_millis(parse_env_or(
                "RECALL_START_DELAY_MS",
                duration_ms(session_defaults.recall_start_delay),
            )),
            recall_turn_delay: Duration::from_millis(parse_env_or(
                "RECALL_TURN_DELAY_MS",
                duration_ms(session_defaults.recall_turn_delay),
            )),
            finish_delay: Duration::from_millis(parse_env_or(
                "FINISH_DELAY_MS",
                duration_ms(session_defaults.finish_delay),
            )),
            game: GameSettings {
                min_players: parse_env_or("MIN_PLAYERS", MIN_PLAYERS),
                max_players: parse_env_or("MAX_PLAYERS", MAX_PLAYERS),
                ..session_defaults.game.clone()
            },
            ..session_defaults
        };

        let rate_limit = RateLimitConfig {
            burst_per_sec: parse_env_or("WS_BURST_LIMIT", defaults.rate_limit.burst_per_sec),
            sustained_per_min: parse_env_or(
                "WS_SUSTAINED_LIMIT",
                defaults.rate_limit.sustained_per_min,
            ),
        };

        Ok(ServerConfig {
            bind,
            metrics_bind,
            session,
            rate_limit,
            outbox_capacity: parse_env_or("WS_OUTBOX_CAPACITY", defaults.outbox_capacity),
        })
    }

    /// Validate configuration after loading
    ///
    /// # Returns
    ///
    /// * `Result<(), ConfigError>` - Success or validation error
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.game().min_players < 2 {
            return Err(ConfigError::Invalid {
                var: "MIN_PLAYERS".to_string(),
                reason: "Must be at least 2".to_string(),
            });
        }

        // Four cards each plus at least a one-card pyramid must fit in the deck
        if self.game().max_players > 12 {
            return Err(ConfigError::Invalid {
                var: "MAX_PLAYERS".to_string(),
                reason: "Must be at most 12 (four cards each from a 52-card deck)".to_string(),
            });
        }

        if self.rate_limit.burst_per_sec == 0 {
            return Err(ConfigError::Invalid {
                var: "WS_BURST_LIMIT".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.rate_limit.sustained_per_min < self.rate_limit.burst_per_sec {
            return Err(ConfigError::Invalid {
                var: "WS_SUSTAINED_LIMIT".to_string(),
                reason: format!(
                    "Must be at least the burst limit ({})",
                    self.rate_limit.burst_per_sec
                ),
            });
        }

        if self.outbox_capacity == 0 {
            return Err(ConfigError::Invalid {
                var: "WS_OUTBOX_CAPACITY".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        self.session
            .validate()
            .map_err(|reason| ConfigError::Invalid {
                var: "session".to_string(),
                reason,
            })
    }

    fn game(&self) -> &GameSettings {
        &self.session.game
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    Unparsable { var: String, value: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Parse an optional environment variable, failing loudly on garbage
fn parse_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Unparsable {
                var: key.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Unparsable {
            var: "SERVER_BIND".to_string(),
            value: "nowhere".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("SERVER_BIND"));
        assert!(msg.contains("nowhere"));
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bind.port(), 3000);
        assert_eq!(config.session.recall_turn_delay, Duration::from_secs(3));
    }

    #[test]
    fn test_overrides_win() {
        let bind: SocketAddr = "127.0.0.1:8080".parse().unwrap();
        let metrics: SocketAddr = "127.0.0.1:9090".parse().unwrap();
        let config = ServerConfig::from_env(Some(bind), Some(metrics)).unwrap();
        assert_eq!(config.bind, bind);
        assert_eq!(config.metrics_bind, Some(metrics));
    }

    #[test]
    fn test_config_validation_too_many_players() {
        let mut config = ServerConfig::default();
        config.session.game.max_players = 20;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var, .. } if var == "MAX_PLAYERS"));
    }

    #[test]
    fn test_config_validation_sustained_below_burst() {
        let config = ServerConfig {
            rate_limit: RateLimitConfig {
                burst_per_sec: 10,
                sustained_per_min: 5,
            },
            ..ServerConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}
