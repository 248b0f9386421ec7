//! Key custody capability consumed by the engine.

use async_trait::async_trait;
use thiserror::Error;

use burnbox_crypto::SymmetricKey;

/// Errors that can occur while obtaining the envelope key.
#[derive(Debug, Error)]
pub enum KeyProviderError {
    /// The custodian could not be reached or refused the request.
    #[error("key unavailable: {0}")]
    Unavailable(String),

    /// The custodian returned unusable key material.
    #[error("invalid key material: {0}")]
    InvalidKey(String),
}

/// Provider of the server-side envelope encryption key.
///
/// The key is assumed stable within a rotation window; rotation itself is the
/// custodian's concern, not the engine's.
#[async_trait]
pub trait KeyProvider: Send + Sync {
    /// Returns the current envelope encryption key.
    async fn encryption_key(&self) -> Result<SymmetricKey, KeyProviderError>;
}

/// Key provider holding a fixed in-process key.
///
/// Suitable for development and tests; production deployments should back the
/// trait with a managed key custodian.
#[derive(Debug, Clone)]
pub struct StaticKeyProvider {
    key: SymmetricKey,
}

impl StaticKeyProvider {
    /// Wraps an existing key.
    pub fn new(key: SymmetricKey) -> Self {
        Self { key }
    }

    /// Generates a fresh random key.
    pub fn generate() -> Self {
        Self::new(SymmetricKey::generate())
    }
}

#[async_trait]
impl KeyProvider for StaticKeyProvider {
    async fn encryption_key(&self) -> Result<SymmetricKey, KeyProviderError> {
        Ok(self.key.clone())
    }
}
