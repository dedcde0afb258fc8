use crate::core::{Result, TokenError};
use crate::lifecycle::LifecycleEvent;
use serde::{Deserialize, Serialize};

/// Shortest token a field may be declared with.
pub const MINIMUM_TOKEN_LENGTH: usize = 24;

/// Length used when a declaration does not name one.
pub const DEFAULT_TOKEN_LENGTH: usize = MINIMUM_TOKEN_LENGTH;

/// Lifecycle point at which a token field is filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// As soon as an in-memory instance is constructed or loaded.
    OnConstruction,
    /// Right before the first create is sent to storage.
    #[default]
    BeforeFirstPersistence,
}

impl From<Trigger> for LifecycleEvent {
    fn from(trigger: Trigger) -> Self {
        match trigger {
            Trigger::OnConstruction => LifecycleEvent::AfterInitialize,
            Trigger::BeforeFirstPersistence => LifecycleEvent::BeforeCreate,
        }
    }
}

/// Declaration of one token attribute on a record type.
///
/// Only constructed through [`TokenFieldSpec::new`], so `length` is always at
/// least [`MINIMUM_TOKEN_LENGTH`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenFieldSpec {
    attribute: String,
    length: usize,
    trigger: Trigger,
}

impl TokenFieldSpec {
    pub fn new(attribute: impl Into<String>, length: usize, trigger: Trigger) -> Result<Self> {
        let attribute = attribute.into();
        if length < MINIMUM_TOKEN_LENGTH {
            return Err(TokenError::MinimumLength { attribute, length });
        }

        Ok(Self {
            attribute,
            length,
            trigger,
        })
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    /// Key under which the generation hook of this field is registered.
    pub fn hook_key(&self) -> String {
        hook_key(&self.attribute)
    }
}

pub(crate) fn hook_key(attribute: &str) -> String {
    format!("secure_token:{}", attribute)
}

/// Optional settings of a token field declaration.
///
/// Unset values fall back to the registry's [`TokenConfig`](super::TokenConfig).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenFieldOptions {
    pub length: Option<usize>,
    pub trigger: Option<Trigger>,
}

impl TokenFieldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the token length
    pub fn length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    /// Set the lifecycle trigger
    pub fn on(mut self, trigger: Trigger) -> Self {
        self.trigger = Some(trigger);
        self
    }
}
