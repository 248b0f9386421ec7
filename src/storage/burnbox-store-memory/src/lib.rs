//! # Burnbox Storage - In-Memory Backend
//!
//! `SecretStore` backend holding everything in process memory. Intended for
//! tests and development; nothing survives a restart.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use burnbox_crypto::random;
use burnbox_engine::{AccessEvent, Secret, SecretStore, StoreError};

/// Random bytes in a secret identifier (rendered as 10 hex chars).
const SECRET_ID_BYTES: usize = 5;

/// Random bytes in an access event identifier.
const EVENT_ID_BYTES: usize = 16;

/// In-memory secret store.
///
/// Secrets live in a map keyed by id; access events in an append-only list.
/// Deletion never removes a row here either: the engine scrubs and calls
/// [`SecretStore::update`], keeping the semantics identical to a durable
/// backend. Clones share the same state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

#[derive(Default)]
struct State {
    secrets: HashMap<String, Secret>,
    events: Vec<AccessEvent>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecretStore for MemoryStore {
    async fn create(&self, mut secret: Secret) -> Result<Secret, StoreError> {
        let mut state = self.state.write().await;

        // Short random ids keep share links compact; regenerate on the
        // (unlikely) collision.
        let mut id = random::generate_token(SECRET_ID_BYTES);
        while state.secrets.contains_key(&id) {
            id = random::generate_token(SECRET_ID_BYTES);
        }

        secret.id = id.clone();
        state.secrets.insert(id, secret.clone());

        debug!(id = %secret.id, "secret stored");
        Ok(secret)
    }

    async fn get(&self, id: &str) -> Result<Option<Secret>, StoreError> {
        Ok(self.state.read().await.secrets.get(id).cloned())
    }

    async fn update(&self, secret: &Secret) -> Result<(), StoreError> {
        let mut state = self.state.write().await;

        match state.secrets.get_mut(&secret.id) {
            Some(row) => {
                *row = secret.clone();
                debug!(id = %secret.id, "secret updated");
                Ok(())
            }
            None => Err(StoreError::NotFound(secret.id.clone())),
        }
    }

    async fn create_access_event(
        &self,
        secret_id: &str,
        occurred_at: u64,
    ) -> Result<AccessEvent, StoreError> {
        let event = AccessEvent {
            id: random::generate_token(EVENT_ID_BYTES),
            secret_id: secret_id.to_string(),
            occurred_at,
        };

        self.state.write().await.events.push(event.clone());
        Ok(event)
    }

    async fn access_history(&self, secret_id: &str) -> Result<Vec<AccessEvent>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .events
            .iter()
            .filter(|event| event.secret_id == secret_id)
            .cloned()
            .collect())
    }
}
