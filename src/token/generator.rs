use crate::core::{Result, TokenError};
use lazy_static::lazy_static;
use rand::RngCore;
use rand::rngs::OsRng;
use std::sync::Arc;

/// Base58 alphabet: no `0`, `O`, `I`, `l`, and nothing that needs escaping in
/// URLs, file names or log lines.
pub const BASE58_ALPHABET: &[u8; 58] =
    b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

// Largest multiple of 58 that fits in a byte. Bytes at or above it are
// rejected so every alphabet symbol is equally likely.
const ACCEPT_BELOW: u8 = 58 * 4;

/// Source of random token strings.
///
/// Implementations must be safe to share between threads: a single generator
/// is handed to every lifecycle callback of a record type.
pub trait TokenGenerator: Send + Sync {
    /// Returns a token of exactly `length` characters.
    fn generate(&self, length: usize) -> Result<String>;
}

/// Token generator backed by the operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecureRandomGenerator;

lazy_static! {
    static ref SHARED_GENERATOR: Arc<SecureRandomGenerator> = Arc::new(SecureRandomGenerator);
}

impl SecureRandomGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Process-wide generator used when a model is built without one.
    pub fn shared() -> Arc<dyn TokenGenerator> {
        SHARED_GENERATOR.clone()
    }
}

impl TokenGenerator for SecureRandomGenerator {
    fn generate(&self, length: usize) -> Result<String> {
        let mut token = String::with_capacity(length);
        // Rejection discards about 9% of bytes; over-draw a little so most
        // tokens need a single fill.
        let mut buffer = vec![0u8; length + length / 8 + 8];

        while token.len() < length {
            OsRng
                .try_fill_bytes(&mut buffer)
                .map_err(|err| TokenError::RandomSource(err.to_string()))?;

            for byte in buffer.iter().copied().filter(|b| *b < ACCEPT_BELOW) {
                if token.len() == length {
                    break;
                }
                token.push(BASE58_ALPHABET[(byte % 58) as usize] as char);
            }
        }

        Ok(token)
    }
}

/// Generates a token of `length` characters with the shared secure generator.
///
/// Unlike declared token fields, no minimum length is enforced here.
pub fn generate_secure_token(length: usize) -> Result<String> {
    SHARED_GENERATOR.generate(length)
}
