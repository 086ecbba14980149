//! Session timing configuration.

use std::time::Duration;

use crate::game::GameSettings;

/// Timer lengths and game rules for new sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// How long players may study their hands (default: 30s)
    pub memorize_duration: Duration,

    /// Pause between the last pyramid flip and the first recital prompt (default: 2s)
    pub recall_start_delay: Duration,

    /// Pause between one recital result and the next prompt (default: 3s)
    pub recall_turn_delay: Duration,

    /// Pause between the last recital and the finished phase (default: 3s)
    pub finish_delay: Duration,

    /// Capacity of the actor's inbox
    pub inbox_capacity: usize,

    /// Attempts at drawing an unused session code before giving up
    pub max_code_attempts: usize,

    pub game: GameSettings,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            memorize_duration: Duration::from_secs(30),
            recall_start_delay: Duration::from_secs(2),
            recall_turn_delay: Duration::from_secs(3),
            finish_delay: Duration::from_secs(3),
            inbox_capacity: 100,
            max_code_attempts: 16,
            game: GameSettings::default(),
        }
    }
}

impl SessionConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.memorize_duration.is_zero() {
            return Err("Memorize duration must be positive".to_string());
        }

        if self.inbox_capacity == 0 {
            return Err("Inbox capacity must be positive".to_string());
        }

        if self.max_code_attempts == 0 {
            return Err("Code attempts must be positive".to_string());
        }

        if self.game.min_players == 0 || self.game.min_players > self.game.max_players {
            return Err("Min players must be between 1 and max players".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.memorize_duration, Duration::from_secs(30));
        assert_eq!(config.game.min_players, 3);
        assert_eq!(config.game.max_players, 7);
    }

    #[test]
    fn test_validate_rejects_inverted_player_bounds() {
        let mut config = SessionConfig::default();
        config.game.min_players = 8;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_memorize() {
        let config = SessionConfig {
            memorize_duration: Duration::ZERO,
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
