//! # Burnbox Storage - SQLite Backend
//!
//! SQLite implementation of the `SecretStore` trait.
//!
//! Secrets and their access ledger live in two tables. Deletion is carried
//! out by the engine as an update of the scrubbed row; this backend never
//! removes a secret row, so access events always keep a valid parent.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use burnbox_crypto::random;
use burnbox_engine::{AccessEvent, Secret, SecretStore, SecurityPolicy, StoreError};

/// Random bytes in a secret identifier (rendered as 10 hex chars).
const SECRET_ID_BYTES: usize = 5;

/// Random bytes in an access event identifier.
const EVENT_ID_BYTES: usize = 16;

/// SQLite secret store.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    #[allow(dead_code)]
    db_path: PathBuf,
}

impl SqliteStore {
    /// Opens or creates the database file under `base_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, the connection
    /// fails, or the schema migration fails.
    pub async fn open(base_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let base = base_path.as_ref();
        std::fs::create_dir_all(base)
            .map_err(|e| StoreError::Connection(format!("failed to create directory: {e}")))?;

        let db_path = base.join("burnbox.db");
        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        debug!(path = %db_path.display(), "Opening SQLite database");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let store = Self { pool, db_path };
        store.migrate().await?;

        info!("SQLite secret store ready");
        Ok(store)
    }

    /// Runs database migrations.
    async fn migrate(&self) -> Result<(), StoreError> {
        debug!("Running database migrations");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS secrets (
                id               TEXT PRIMARY KEY,
                name             TEXT,
                encrypted_value  TEXT NOT NULL,
                server_iv        TEXT NOT NULL,
                client_iv        TEXT NOT NULL,
                password_hash    TEXT,
                salt             TEXT,
                expiration       INTEGER NOT NULL,
                max_access_count INTEGER,
                created_at       INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Connection(format!("migration failed: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS access_history (
                id          TEXT PRIMARY KEY,
                secret_id   TEXT NOT NULL,
                occurred_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Connection(format!("migration failed: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_access_history_secret ON access_history (secret_id)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Connection(format!("migration failed: {e}")))?;

        debug!("Migrations complete");
        Ok(())
    }
}

type SecretRow = (
    String,         // id
    Option<String>, // name
    String,         // encrypted_value
    String,         // server_iv
    String,         // client_iv
    Option<String>, // password_hash
    Option<String>, // salt
    i64,            // expiration
    Option<i64>,    // max_access_count
    i64,            // created_at
);

fn row_to_secret(row: SecretRow) -> Secret {
    let (
        id,
        name,
        encrypted_value,
        server_iv,
        client_iv,
        password_hash,
        salt,
        expiration,
        max_access_count,
        created_at,
    ) = row;

    Secret {
        id,
        name,
        encrypted_value,
        server_iv,
        client_iv,
        policy: SecurityPolicy {
            password_hash,
            salt,
            expiration: expiration as u64,
            max_access_count: max_access_count.map(|c| c as u32),
        },
        access_history: Vec::new(),
        created_at: created_at as u64,
    }
}

#[async_trait]
impl SecretStore for SqliteStore {
    async fn create(&self, mut secret: Secret) -> Result<Secret, StoreError> {
        secret.id = random::generate_token(SECRET_ID_BYTES);

        sqlx::query(
            r#"
            INSERT INTO secrets
                (id, name, encrypted_value, server_iv, client_iv,
                 password_hash, salt, expiration, max_access_count, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&secret.id)
        .bind(secret.name.as_deref())
        .bind(&secret.encrypted_value)
        .bind(&secret.server_iv)
        .bind(&secret.client_iv)
        .bind(secret.policy.password_hash.as_deref())
        .bind(secret.policy.salt.as_deref())
        .bind(secret.policy.expiration as i64)
        .bind(secret.policy.max_access_count.map(|c| c as i64))
        .bind(secret.created_at as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        debug!(id = %secret.id, "secret stored");
        Ok(secret)
    }

    async fn get(&self, id: &str) -> Result<Option<Secret>, StoreError> {
        let row: Option<SecretRow> = sqlx::query_as(
            r#"
            SELECT id, name, encrypted_value, server_iv, client_iv,
                   password_hash, salt, expiration, max_access_count, created_at
            FROM secrets WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(row.map(row_to_secret))
    }

    async fn update(&self, secret: &Secret) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE secrets SET
                name = ?,
                encrypted_value = ?,
                server_iv = ?,
                client_iv = ?,
                password_hash = ?,
                salt = ?,
                expiration = ?,
                max_access_count = ?
            WHERE id = ?
            "#,
        )
        .bind(secret.name.as_deref())
        .bind(&secret.encrypted_value)
        .bind(&secret.server_iv)
        .bind(&secret.client_iv)
        .bind(secret.policy.password_hash.as_deref())
        .bind(secret.policy.salt.as_deref())
        .bind(secret.policy.expiration as i64)
        .bind(secret.policy.max_access_count.map(|c| c as i64))
        .bind(&secret.id)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(secret.id.clone()));
        }

        debug!(id = %secret.id, "secret updated");
        Ok(())
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

        sqlx::query("INSERT INTO access_history (id, secret_id, occurred_at) VALUES (?, ?, ?)")
            .bind(&event.id)
            .bind(&event.secret_id)
            .bind(event.occurred_at as i64)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(event)
    }

    async fn access_history(&self, secret_id: &str) -> Result<Vec<AccessEvent>, StoreError> {
        let rows: Vec<(String, String, i64)> = sqlx::query_as(
            "SELECT id, secret_id, occurred_at FROM access_history WHERE secret_id = ? ORDER BY occurred_at, id",
        )
        .bind(secret_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(id, secret_id, occurred_at)| AccessEvent {
                id,
                secret_id,
                occurred_at: occurred_at as u64,
            })
            .collect())
    }
}
