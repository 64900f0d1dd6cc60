//! Credential Store
//!
//! Persistence for [`Account`] records behind the [`AccountStore`] trait.
//! Every operation touches a single row; uniqueness of username and email
//! is enforced by the schema.

use crate::error::StoreError;
use crate::models::{Account, AccountUpdate, NewAccount};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use uuid::Uuid;

/// Account persistence operations
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account
    async fn create(&self, account: NewAccount) -> Result<Account, StoreError>;

    /// Get account by ID
    async fn get_by_id(&self, id: Uuid) -> Result<Account, StoreError>;

    /// Get account by username
    async fn get_by_username(&self, username: &str) -> Result<Account, StoreError>;

    /// Get account by email
    async fn get_by_email(&self, email: &str) -> Result<Account, StoreError>;

    /// Apply a partial update and bump `updated_at`
    async fn update(&self, id: Uuid, changes: AccountUpdate) -> Result<Account, StoreError>;

    /// Delete account by ID
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}

const CREATE_ACCOUNTS: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    id BLOB PRIMARY KEY NOT NULL,
    username VARCHAR(50) NOT NULL UNIQUE,
    email VARCHAR(255) NOT NULL UNIQUE,
    password_hash VARCHAR(255) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// SQLite-backed account store
#[derive(Clone)]
pub struct SqliteAccountStore {
    db: SqlitePool,
}

impl SqliteAccountStore {
    /// Open a pool for `url` and run the schema migration
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let db = SqlitePoolOptions::new().connect_with(options).await?;

        Self::from_pool(db).await
    }

    /// In-memory database on a single long-lived connection
    ///
    /// Each SQLite `:memory:` connection is its own database, so the pool
    /// must never open a second one or recycle the first.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        Self::from_pool(db).await
    }

    /// Wrap an existing pool, running the schema migration
    pub async fn from_pool(db: SqlitePool) -> Result<Self, StoreError> {
        let store = Self { db };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        tracing::info!("Running account database migrations");

        // UNIQUE columns carry their own index
        sqlx::query(CREATE_ACCOUNTS).execute(&self.db).await?;

        tracing::info!("Account migrations completed successfully");
        Ok(())
    }
}

#[async_trait]
impl AccountStore for SqliteAccountStore {
    async fn create(&self, account: NewAccount) -> Result<Account, StoreError> {
        let now = Utc::now();

        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (id, username, email, password_hash, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 1, $5, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(now)
        .fetch_one(&self.db)
        .await?;

        tracing::debug!(account_id = %account.id, "Account created");
        Ok(account)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Account, StoreError> {
        sqlx::query_as("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn get_by_username(&self, username: &str) -> Result<Account, StoreError> {
        sqlx::query_as("SELECT * FROM accounts WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.db)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn get_by_email(&self, email: &str) -> Result<Account, StoreError> {
        sqlx::query_as("SELECT * FROM accounts WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.db)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, id: Uuid, changes: AccountUpdate) -> Result<Account, StoreError> {
        sqlx::query_as(
            r#"
            UPDATE accounts SET
                username = COALESCE($2, username),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                is_active = COALESCE($5, is_active),
                updated_at = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.username)
        .bind(changes.email)
        .bind(changes.password_hash)
        .bind(changes.is_active)
        .bind(Utc::now())
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        tracing::debug!(account_id = %id, "Account deleted");
        Ok(())
    }
}
