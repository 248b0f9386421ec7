//! Integration tests for the Burnbox secret lifecycle engine.
//!
//! These tests exercise the complete workflow (create, metadata, retrieve,
//! delete) with real crypto against both storage backends.

use burnbox_engine::{Clock, FixedClock, SecretService, SecretStore, StaticKeyProvider};

/// 2022-05-21T00:00:00Z, the instant every test clock is pinned to.
pub const NOW: u64 = 1_653_091_200;

/// Seconds in a day.
pub const DAY: u64 = 86_400;

/// Initializes a tracing subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_test_writer()
        .try_init();
}

/// Wires a lifecycle service over the given backend with a fresh envelope
/// key and the given clock.
pub fn service_over<S, C>(store: S, clock: C) -> SecretService<S, StaticKeyProvider, C>
where
    S: SecretStore,
    C: Clock,
{
    SecretService::new(store, StaticKeyProvider::generate(), clock)
}

/// Shorthand for the usual fixed-clock wiring.
pub fn service<S: SecretStore>(store: S) -> SecretService<S, StaticKeyProvider, FixedClock> {
    service_over(store, FixedClock(NOW))
}

#[cfg(test)]
mod tests {
    use super::*;

    use anyhow::Result;
    use tempfile::TempDir;

    use burnbox_engine::{EngineError, MetadataView, NewSecret};
    use burnbox_store_memory::MemoryStore;
    use burnbox_store_sqlite::SqliteStore;

    fn candidate() -> NewSecret {
        NewSecret {
            name: Some("deploy token".to_string()),
            encrypted_value: "abc".to_string(),
            client_iv: "123".to_string(),
            password: None,
            expiration: NOW + 7 * DAY,
            max_access_count: None,
        }
    }

    /// The full lifecycle: create, inspect, retrieve, delete, then verify
    /// the link is dead both ways.
    async fn full_lifecycle<S: SecretStore>(store: S) -> Result<()> {
        let svc = service(store);

        let created = svc.create(candidate()).await?;
        assert!(!created.id.is_empty());

        let policy = svc.metadata(&created.id).await?;
        assert_eq!(
            MetadataView::from(&policy),
            MetadataView {
                requires_password: false,
                expiration: NOW + 7 * DAY,
            }
        );

        let disclosed = svc.retrieve(&created.id, "").await?;
        assert_eq!(disclosed.encrypted_value, "abc");
        assert_eq!(disclosed.client_iv, "123");

        svc.delete(&created.id).await?;

        assert!(matches!(
            svc.retrieve(&created.id, "").await,
            Err(EngineError::NotFound)
        ));
        assert!(matches!(
            svc.metadata(&created.id).await,
            Err(EngineError::NotFound)
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_full_lifecycle_memory() -> Result<()> {
        init_tracing();
        full_lifecycle(MemoryStore::new()).await
    }

    #[tokio::test]
    async fn test_full_lifecycle_sqlite() -> Result<()> {
        init_tracing();
        let tmp = TempDir::new()?;
        full_lifecycle(SqliteStore::open(tmp.path()).await?).await
    }

    #[tokio::test]
    async fn test_password_gate_end_to_end_sqlite() -> Result<()> {
        init_tracing();
        let tmp = TempDir::new()?;
        let svc = service(SqliteStore::open(tmp.path()).await?);

        let created = svc
            .create(NewSecret {
                password: Some("Password1!".to_string()),
                ..candidate()
            })
            .await?;

        let policy = svc.metadata(&created.id).await?;
        assert!(MetadataView::from(&policy).requires_password);

        let rejected = svc.retrieve(&created.id, "Password2!").await;
        assert!(matches!(rejected, Err(EngineError::InvalidRequest(_))));

        let disclosed = svc.retrieve(&created.id, "Password1!").await?;
        assert_eq!(disclosed.encrypted_value, "abc");

        Ok(())
    }

    #[tokio::test]
    async fn test_view_limit_exhaustion_end_to_end_sqlite() -> Result<()> {
        init_tracing();
        let tmp = TempDir::new()?;
        let svc = service(SqliteStore::open(tmp.path()).await?);

        let created = svc
            .create(NewSecret {
                max_access_count: Some(2),
                ..candidate()
            })
            .await?;

        assert_eq!(svc.retrieve(&created.id, "").await?.encrypted_value, "abc");
        assert_eq!(svc.retrieve(&created.id, "").await?.encrypted_value, "abc");

        let exhausted = svc.retrieve(&created.id, "").await;
        assert!(matches!(exhausted, Err(EngineError::InvalidRequest(_))));

        Ok(())
    }

    #[tokio::test]
    async fn test_expiration_end_to_end_memory() -> Result<()> {
        init_tracing();
        let store = MemoryStore::new();

        // Created while valid...
        let id = {
            let svc = service_over(store.clone(), FixedClock(NOW));
            svc.create(NewSecret {
                expiration: NOW + 60,
                ..candidate()
            })
            .await?
            .id
        };

        // ...unreadable from the expiration instant onward.
        let svc = service_over(store, FixedClock(NOW + 60));
        assert!(matches!(
            svc.retrieve(&id, "").await,
            Err(EngineError::NotFound)
        ));
        assert!(matches!(svc.metadata(&id).await, Err(EngineError::NotFound)));

        Ok(())
    }

    #[tokio::test]
    async fn test_metadata_view_serializes_without_credentials() -> Result<()> {
        init_tracing();
        let svc = service(MemoryStore::new());

        let created = svc
            .create(NewSecret {
                password: Some("Password1!".to_string()),
                ..candidate()
            })
            .await?;

        let policy = svc.metadata(&created.id).await?;
        let json = serde_json::to_string(&MetadataView::from(&policy))?;

        assert!(!json.contains("hash"));
        assert!(!json.contains("salt"));
        assert!(json.contains("requires_password"));

        Ok(())
    }

    #[tokio::test]
    async fn test_tombstone_survives_reopen_sqlite() -> Result<()> {
        init_tracing();
        let tmp = TempDir::new()?;

        let id = {
            let svc = service(SqliteStore::open(tmp.path()).await?);
            let created = svc
                .create(NewSecret {
                    max_access_count: Some(5),
                    ..candidate()
                })
                .await?;
            svc.retrieve(&created.id, "").await?;
            svc.delete(&created.id).await?;
            created.id
        };

        // A fresh handle sees the same dead link and the intact ledger.
        let store = SqliteStore::open(tmp.path()).await?;
        let history = store.access_history(&id).await?;
        assert_eq!(history.len(), 1);

        let svc = service(store);
        assert!(matches!(
            svc.retrieve(&id, "").await,
            Err(EngineError::NotFound)
        ));

        Ok(())
    }
}
