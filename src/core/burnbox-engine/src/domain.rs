//! Domain model: the protected secret, its security policy, and its access
//! ledger.
//!
//! All instants are UTC unix seconds. Ciphertext and IV fields are base64
//! strings; the stored `encrypted_value` carries two layers of encryption
//! (the client's own, then the server-side envelope).

use serde::{Deserialize, Serialize};

/// Name written over a secret when it is deleted. The row itself is kept so
/// access events keep a valid parent.
pub const TOMBSTONE_NAME: &str = "[deleted]";

/// A protected secret record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Secret {
    /// Store-assigned opaque identifier, immutable after creation.
    pub id: String,
    /// Optional display label; replaced by [`TOMBSTONE_NAME`] on deletion.
    pub name: Option<String>,
    /// Base64 ciphertext. Client-encrypted on the way in; the engine wraps it
    /// in a second, server-side layer before persistence.
    pub encrypted_value: String,
    /// Base64 nonce of the server-side envelope layer. Scrubbing it makes the
    /// envelope layer permanently undecryptable.
    pub server_iv: String,
    /// Base64 IV of the client-side layer, opaque to this engine.
    pub client_iv: String,
    /// Access policy, owned 1:1 by the secret.
    pub policy: SecurityPolicy,
    /// Append-only disclosure ledger, loaded only when a view limit is set.
    #[serde(default)]
    pub access_history: Vec<AccessEvent>,
    /// Creation instant, stamped from the injected clock.
    pub created_at: u64,
}

impl Secret {
    /// Whether the configured view limit has been reached.
    ///
    /// Without a configured limit (absent or zero) this is always false; the
    /// ledger length is only meaningful under a limit.
    pub fn over_access_limit(&self) -> bool {
        match self.policy.max_access_count {
            None | Some(0) => false,
            Some(limit) => self.access_history.len() >= limit as usize,
        }
    }

    /// Erases every sensitive field and writes the tombstone name.
    ///
    /// The record stays in place: access events reference it and must not be
    /// orphaned. Losing `server_iv` alone already makes the envelope layer
    /// undecryptable.
    pub fn scrub(&mut self) {
        self.encrypted_value.clear();
        self.server_iv.clear();
        self.client_iv.clear();
        self.policy.password_hash = None;
        self.policy.salt = None;
        self.name = Some(TOMBSTONE_NAME.to_string());
    }
}

/// Access policy owned by a secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityPolicy {
    /// Salted digest of the password, never the plaintext. Absent when the
    /// secret is not password-gated.
    pub password_hash: Option<String>,
    /// Per-secret random salt, present whenever `password_hash` is.
    pub salt: Option<String>,
    /// Absolute expiration instant (unix seconds).
    pub expiration: u64,
    /// Maximum number of disclosures; absent means unlimited.
    pub max_access_count: Option<u32>,
}

impl SecurityPolicy {
    /// Whether retrieval requires a password.
    pub fn requires_password(&self) -> bool {
        self.password_hash
            .as_deref()
            .is_some_and(|h| !h.trim().is_empty())
    }

    /// Whether the policy has expired at `now`. The expiration instant itself
    /// counts as expired.
    pub fn is_expired(&self, now: u64) -> bool {
        self.expiration <= now
    }
}

/// One successful disclosure of a view-limited secret.
///
/// Events are immutable and survive deletion of the parent secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessEvent {
    /// Store-assigned event identifier.
    pub id: String,
    /// Identifier of the disclosed secret.
    pub secret_id: String,
    /// Disclosure instant (unix seconds).
    pub occurred_at: u64,
}

/// A creation candidate, before validation and envelope encryption.
///
/// This is the only place a plaintext password exists inside the engine; the
/// persisted policy only ever carries the salted digest.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSecret {
    /// Optional display label.
    pub name: Option<String>,
    /// Client-encrypted payload, base64.
    pub encrypted_value: String,
    /// Client-side IV, base64, passed through untouched.
    pub client_iv: String,
    /// Optional plaintext password to gate retrieval.
    pub password: Option<String>,
    /// Absolute expiration instant (unix seconds).
    pub expiration: u64,
    /// Optional view limit; must be positive when present.
    pub max_access_count: Option<u32>,
}

impl NewSecret {
    /// The plaintext password, if one was actually supplied.
    pub(crate) fn supplied_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.trim().is_empty())
    }
}

/// The only policy shape allowed to cross the outward boundary from
/// GetMetadata: no digest, no salt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataView {
    /// Whether retrieval requires a password.
    pub requires_password: bool,
    /// Absolute expiration instant (unix seconds).
    pub expiration: u64,
}

impl From<&SecurityPolicy> for MetadataView {
    fn from(policy: &SecurityPolicy) -> Self {
        Self {
            requires_password: policy.requires_password(),
            expiration: policy.expiration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret_with_policy(policy: SecurityPolicy) -> Secret {
        Secret {
            id: "secret-123".to_string(),
            name: Some("test".to_string()),
            encrypted_value: "ciphertext".to_string(),
            server_iv: "server-iv".to_string(),
            client_iv: "client-iv".to_string(),
            policy,
            access_history: Vec::new(),
            created_at: 0,
        }
    }

    fn open_policy() -> SecurityPolicy {
        SecurityPolicy {
            password_hash: None,
            salt: None,
            expiration: 1_000_000,
            max_access_count: None,
        }
    }

    #[test]
    fn test_expiration_equality_counts_as_expired() {
        let policy = SecurityPolicy {
            expiration: 1_653_177_600, // 2022-05-22T00:00:00Z
            ..open_policy()
        };

        assert!(policy.is_expired(1_653_177_600));
        assert!(policy.is_expired(1_653_177_601));
        assert!(!policy.is_expired(1_653_177_599));
    }

    #[test]
    fn test_requires_password_blank_hash_is_open() {
        let mut policy = open_policy();
        assert!(!policy.requires_password());

        policy.password_hash = Some("   ".to_string());
        assert!(!policy.requires_password());

        policy.password_hash = Some("digest".to_string());
        assert!(policy.requires_password());
    }

    #[test]
    fn test_over_access_limit_unlimited_when_absent_or_zero() {
        let mut secret = secret_with_policy(open_policy());
        secret.access_history = vec![AccessEvent {
            id: "e1".to_string(),
            secret_id: "secret-123".to_string(),
            occurred_at: 1,
        }];

        assert!(!secret.over_access_limit());

        // A literal zero never survives the create path, but the predicate
        // still treats it as unlimited.
        secret.policy.max_access_count = Some(0);
        assert!(!secret.over_access_limit());
    }

    #[test]
    fn test_over_access_limit_boundary() {
        let mut secret = secret_with_policy(SecurityPolicy {
            max_access_count: Some(2),
            ..open_policy()
        });

        assert!(!secret.over_access_limit());

        secret.access_history.push(AccessEvent {
            id: "e1".to_string(),
            secret_id: "secret-123".to_string(),
            occurred_at: 1,
        });
        assert!(!secret.over_access_limit());

        secret.access_history.push(AccessEvent {
            id: "e2".to_string(),
            secret_id: "secret-123".to_string(),
            occurred_at: 2,
        });
        assert!(secret.over_access_limit());
    }

    #[test]
    fn test_scrub_erases_sensitive_fields() {
        let mut secret = secret_with_policy(SecurityPolicy {
            password_hash: Some("digest".to_string()),
            salt: Some("salt".to_string()),
            ..open_policy()
        });

        secret.scrub();

        assert!(secret.encrypted_value.is_empty());
        assert!(secret.server_iv.is_empty());
        assert!(secret.client_iv.is_empty());
        assert!(secret.policy.password_hash.is_none());
        assert!(secret.policy.salt.is_none());
        assert_eq!(secret.name.as_deref(), Some(TOMBSTONE_NAME));
        // Expiration and the ledger are left alone.
        assert_eq!(secret.policy.expiration, 1_000_000);
    }

    #[test]
    fn test_metadata_view_strips_credentials() {
        let policy = SecurityPolicy {
            password_hash: Some("digest".to_string()),
            salt: Some("salt".to_string()),
            ..open_policy()
        };

        let view = MetadataView::from(&policy);

        assert!(view.requires_password);
        assert_eq!(view.expiration, 1_000_000);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "requires_password": true, "expiration": 1_000_000 })
        );
    }
}
