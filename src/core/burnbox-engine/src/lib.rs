//! # Burnbox Engine
//!
//! Secret lifecycle and access-control engine.
//!
//! A sender publishes a client-encrypted blob under policy constraints
//! (expiration, optional password, optional view limit); recipients retrieve
//! it until a gate closes, after which the plaintext is permanently
//! unrecoverable.
//!
//! ## Features
//!
//! - Server-side envelope encryption on top of the client's own layer
//! - Password gating via salted one-way digests
//! - View-count limits backed by an append-only access ledger
//! - Soft deletion: rows are scrubbed, never removed, so the ledger survives
//!
//! The engine is a stateless orchestrator over three injected collaborators:
//! a [`SecretStore`], a [`KeyProvider`], and a [`Clock`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod clock;
pub mod domain;
pub mod error;
pub mod key_provider;
pub mod store;
pub mod validate;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use tracing::{debug, error, info};

use burnbox_crypto::{aead, hash, random};

pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::{AccessEvent, MetadataView, NewSecret, Secret, SecurityPolicy, TOMBSTONE_NAME};
pub use error::{EngineError, MSG_INVALID_PASSWORD, MSG_NOT_FOUND, MSG_VIEW_LIMIT_EXCEEDED};
pub use key_provider::{KeyProvider, KeyProviderError, StaticKeyProvider};
pub use store::{SecretStore, StoreError};
pub use validate::{validate, Violation};

/// Random bytes in a per-secret password salt (rendered as 32 hex chars).
const SALT_BYTES: usize = 16;

/// The secret lifecycle service.
///
/// Holds no mutable state between calls; one instance may serve unlimited
/// concurrent, unrelated calls. Collaborators are awaited sequentially within
/// an operation, and a single collaborator failure aborts the whole operation.
pub struct SecretService<S, K, C> {
    store: S,
    keys: K,
    clock: C,
}

impl<S, K, C> SecretService<S, K, C>
where
    S: SecretStore,
    K: KeyProvider,
    C: Clock,
{
    /// Builds a service from its collaborators. No registry, no globals.
    pub fn new(store: S, keys: K, clock: C) -> Self {
        Self { store, keys, clock }
    }

    /// Creates a new secret.
    ///
    /// Validates the candidate, wraps the client ciphertext in the
    /// server-side envelope layer, hashes the password if one was supplied,
    /// and persists the result. The store assigns the identifier; only that
    /// identifier should cross the outward boundary.
    pub async fn create(&self, candidate: NewSecret) -> Result<Secret, EngineError> {
        let now = self.clock.now();

        let violations = validate(&candidate, now);
        if !violations.is_empty() {
            return Err(EngineError::Validation(violations));
        }

        let key = self
            .keys
            .encryption_key()
            .await
            .map_err(|e| internal("error obtaining encryption key", e))?;

        let (ciphertext, nonce) = aead::encrypt(&key, candidate.encrypted_value.as_bytes())
            .map_err(|e| internal("error applying envelope encryption", e))?;

        let (password_hash, salt) = match candidate.supplied_password() {
            Some(password) => {
                let salt = random::generate_token(SALT_BYTES);
                let digest = hash::compute_hash(password, &salt);
                (Some(digest), Some(salt))
            }
            None => (None, None),
        };

        let secret = Secret {
            id: String::new(),
            name: candidate.name,
            encrypted_value: BASE64.encode(&ciphertext),
            server_iv: BASE64.encode(nonce),
            client_iv: candidate.client_iv,
            policy: SecurityPolicy {
                password_hash,
                salt,
                expiration: candidate.expiration,
                max_access_count: candidate.max_access_count,
            },
            access_history: Vec::new(),
            created_at: now,
        };

        let created = self
            .store
            .create(secret)
            .await
            .map_err(|e| internal("error persisting secret", e))?;

        debug!(id = %created.id, "secret created");
        Ok(created)
    }

    /// Returns the policy of a live secret.
    ///
    /// The boundary layer must expose at most [`MetadataView`] from this;
    /// the digest and salt never leave the trust boundary.
    pub async fn metadata(&self, id: &str) -> Result<SecurityPolicy, EngineError> {
        let secret = self.fetch_live(id).await?;
        Ok(secret.policy)
    }

    /// Retrieves a secret, enforcing the password and view-limit gates.
    ///
    /// On success the returned `encrypted_value` has had the server-side
    /// envelope removed; it is still the client's own ciphertext, to be
    /// finished client-side with `client_iv` and a key this engine never saw.
    pub async fn retrieve(&self, id: &str, password: &str) -> Result<Secret, EngineError> {
        let mut secret = self.fetch_live(id).await?;

        if secret.policy.requires_password() {
            let salt = secret.policy.salt.as_deref().unwrap_or_default();
            let stored = secret.policy.password_hash.as_deref().unwrap_or_default();

            if !hash::verify_hash(password, salt, stored) {
                return Err(EngineError::InvalidRequest(MSG_INVALID_PASSWORD.to_string()));
            }
        }

        if secret.policy.max_access_count.is_some() {
            secret.access_history = self
                .store
                .access_history(&secret.id)
                .await
                .map_err(|e| internal("error loading access history", e))?;

            if secret.over_access_limit() {
                return Err(EngineError::InvalidRequest(
                    MSG_VIEW_LIMIT_EXCEEDED.to_string(),
                ));
            }

            // The view slot is consumed here, before decryption: once the
            // limit check passes the event is recorded, and a decryption
            // failure afterwards still counts against the limit.
            //
            // Two concurrent retrievals of the same secret can both observe
            // the ledger below the limit and both append; there is no
            // compare-and-set guard on this read-then-append sequence.
            self.store
                .create_access_event(&secret.id, self.clock.now())
                .await
                .map_err(|e| internal("error recording access event", e))?;
        }

        let key = self
            .keys
            .encryption_key()
            .await
            .map_err(|e| internal("error obtaining encryption key", e))?;

        let nonce = BASE64
            .decode(&secret.server_iv)
            .map_err(|e| internal("error decoding stored server iv", e))?;
        let ciphertext = BASE64
            .decode(&secret.encrypted_value)
            .map_err(|e| internal("error decoding stored ciphertext", e))?;

        let plaintext = aead::decrypt(&key, &nonce, &ciphertext)
            .map_err(|e| internal("error removing envelope encryption", e))?;

        secret.encrypted_value = String::from_utf8(plaintext.to_vec())
            .map_err(|e| internal("envelope plaintext is not valid UTF-8", e))?;

        debug!(id = %secret.id, "secret disclosed");
        Ok(secret)
    }

    /// Deletes a secret by scrubbing every sensitive field in place.
    ///
    /// The row keeps its identifier and its access events. A second delete
    /// goes through the same live-secret lookup and therefore sees NotFound,
    /// which makes the operation observably idempotent.
    pub async fn delete(&self, id: &str) -> Result<(), EngineError> {
        let mut secret = self.fetch_live(id).await?;

        secret.scrub();

        self.store
            .update(&secret)
            .await
            .map_err(|e| internal("error persisting scrubbed secret", e))?;

        info!(id = %secret.id, "secret deleted");
        Ok(())
    }

    /// Shared lookup for the read paths. An absent row, an expired policy,
    /// and an already-scrubbed row (empty ciphertext) are deliberately
    /// indistinguishable to the caller.
    async fn fetch_live(&self, id: &str) -> Result<Secret, EngineError> {
        let found = self
            .store
            .get(id)
            .await
            .map_err(|e| internal("error fetching secret", e))?;

        match found {
            Some(secret)
                if !secret.policy.is_expired(self.clock.now())
                    && !secret.encrypted_value.is_empty() =>
            {
                Ok(secret)
            }
            _ => Err(EngineError::NotFound),
        }
    }
}

/// Logs a collaborator failure with full detail and collapses it to the
/// opaque `Internal` kind.
fn internal<E: std::fmt::Display>(context: &str, err: E) -> EngineError {
    error!(error = %err, "{context}");
    EngineError::Internal
}
