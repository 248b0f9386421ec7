//! Secret persistence capability consumed by the engine.
//!
//! Any conforming backend is acceptable; the engine never assumes more than
//! this trait. Deletion is a soft scrub performed through `update`, so
//! backends must keep rows in place and never cascade onto access events.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{AccessEvent, Secret};

/// Errors that can occur inside a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No row for the given identifier (update path only; lookups return
    /// `None` instead).
    #[error("record not found: {0}")]
    NotFound(String),

    /// Backend connection failure.
    #[error("connection error: {0}")]
    Connection(String),

    /// Row could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Any other backend failure.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Persistence capability for secrets and their access ledger.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Persists a new secret, assigning its identifier. Returns the persisted
    /// record, id filled in.
    async fn create(&self, secret: Secret) -> Result<Secret, StoreError>;

    /// Fetches a secret by id. `None` when no row exists.
    async fn get(&self, id: &str) -> Result<Option<Secret>, StoreError>;

    /// Rewrites an existing secret in place (the deletion scrub). The row
    /// keeps its identifier.
    async fn update(&self, secret: &Secret) -> Result<(), StoreError>;

    /// Appends one disclosure event for a secret.
    async fn create_access_event(
        &self,
        secret_id: &str,
        occurred_at: u64,
    ) -> Result<AccessEvent, StoreError>;

    /// Returns every disclosure event for a secret, in occurrence order.
    async fn access_history(&self, secret_id: &str) -> Result<Vec<AccessEvent>, StoreError>;
}
