// ============================================================================
// persist_token Library
// ============================================================================

//! Secure random token fields for persisted records.
//!
//! A record type declares token attributes once. Each attribute is filled with
//! a base58 token either when an instance is constructed or right before it is
//! first stored, and never when the caller already assigned a value.
//!
//! ```
//! use std::sync::Arc;
//! use persist_token::{
//!     InMemoryRecordStore, RecordModel, TokenFieldOptions, Trigger, secure_token_record,
//! };
//!
//! secure_token_record! {
//!     pub struct User {
//!         token: Option<String>,
//!         auth_token: Option<String>,
//!         invite_code: Option<String>,
//!     }
//! }
//!
//! # fn main() -> persist_token::Result<()> {
//! let mut users = RecordModel::<User>::new(Arc::new(InMemoryRecordStore::new()));
//! users.has_secure_token("token")?;
//! users.declare_token_field("auth_token", TokenFieldOptions::new().length(36))?;
//! users.declare_token_field(
//!     "invite_code",
//!     TokenFieldOptions::new().on(Trigger::OnConstruction),
//! )?;
//!
//! let mut user = users.new_record()?;
//! assert!(user.invite_code().is_some());
//! assert!(user.token().is_none());
//!
//! users.save(&mut user)?;
//! assert_eq!(user.token().as_deref().map(str::len), Some(24));
//! assert_eq!(user.auth_token().as_deref().map(str::len), Some(36));
//! # Ok(())
//! # }
//! ```

extern crate self as persist_token;

pub mod core;
pub mod lifecycle;
mod macros;
pub mod model;
pub mod record;
pub mod storage;
pub mod token;

#[doc(hidden)]
pub use paste;
#[doc(hidden)]
pub use serde;

// Re-export main types for convenience
pub use crate::core::{Result, StorageError, StorageResult, TokenError};
pub use lifecycle::{HookRegistry, LifecycleCallback, LifecycleEvent, LifecycleHooks};
pub use model::RecordModel;
pub use record::{AttributeValue, Record, RecordMetadata, RecordUpdate};
pub use storage::{InMemoryRecordStore, RecordState, RecordStore};
pub use token::{
    BASE58_ALPHABET, DEFAULT_TOKEN_LENGTH, MINIMUM_TOKEN_LENGTH, SecureRandomGenerator, SecureTokens, TokenConfig,
    TokenFieldOptions, TokenFieldSpec, TokenGenerator, Trigger, generate_secure_token,
};
