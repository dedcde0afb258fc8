use super::spec::{DEFAULT_TOKEN_LENGTH, MINIMUM_TOKEN_LENGTH, Trigger};
use crate::core::{Result, TokenError};
use serde::{Deserialize, Serialize};

/// Defaults applied to token field declarations that leave options unset.
///
/// # Examples
///
/// ```
/// use persist_token::{TokenConfig, Trigger};
///
/// let config = TokenConfig::new()
///     .default_length(32)
///     .default_trigger(Trigger::OnConstruction);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Length of tokens declared without an explicit length
    pub default_length: usize,

    /// Trigger of tokens declared without an explicit trigger
    pub default_trigger: Trigger,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            default_length: DEFAULT_TOKEN_LENGTH,
            default_trigger: Trigger::BeforeFirstPersistence,
        }
    }
}

impl TokenConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default token length
    pub fn default_length(mut self, length: usize) -> Self {
        self.default_length = length;
        self
    }

    /// Set the default trigger
    pub fn default_trigger(mut self, trigger: Trigger) -> Self {
        self.default_trigger = trigger;
        self
    }

    /// Parse a configuration from JSON, filling unset keys with defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_length < MINIMUM_TOKEN_LENGTH {
            return Err(TokenError::InvalidConfig(format!(
                "default_length must be at least {}, got {}",
                MINIMUM_TOKEN_LENGTH, self.default_length
            )));
        }
        Ok(())
    }
}
