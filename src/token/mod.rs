//! Secure token fields.
//!
//! A token field is a string attribute of a record type that is filled with a
//! random base58 token at a declared lifecycle point, unless the caller has
//! already given it a value.

mod binder;
mod config;
mod generator;
mod registry;
pub mod runtime;
mod spec;

pub use binder::bind_token_field;
pub use config::TokenConfig;
pub use generator::{BASE58_ALPHABET, SecureRandomGenerator, TokenGenerator, generate_secure_token};
pub use registry::SecureTokens;
pub use spec::{DEFAULT_TOKEN_LENGTH, MINIMUM_TOKEN_LENGTH, TokenFieldOptions, TokenFieldSpec, Trigger};
