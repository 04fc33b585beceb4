use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tokio::sync::RwLock;
use tracing::debug;

use shared::domain::IdentityToken;

/// Fixed key under which the signed-in user's token is kept.
pub const IDENTITY_KEY: &str = "prelnk_user";

/// Persistent home of the single identity token shared by all controllers.
///
/// Errors returned here are environment failures (disk, database); callers are
/// expected to propagate them rather than fold them into UI state.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn get(&self) -> Result<Option<IdentityToken>>;
    async fn set(&self, token: &IdentityToken) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}

#[derive(Default)]
pub struct MemoryIdentityStore {
    token: RwLock<Option<IdentityToken>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: IdentityToken) -> Self {
        Self {
            token: RwLock::new(Some(token)),
        }
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn get(&self) -> Result<Option<IdentityToken>> {
        Ok(self.token.read().await.clone())
    }

    async fn set(&self, token: &IdentityToken) -> Result<()> {
        *self.token.write().await = Some(token.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.token.write().await.take();
        Ok(())
    }
}

#[derive(Clone)]
pub struct SqliteIdentityStore {
    pool: Pool<Sqlite>,
}

impl SqliteIdentityStore {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid sqlite url '{database_url}'"))?
            .create_if_missing(true);
        let pool_options = if is_in_memory(database_url) {
            // Every connection to an in-memory url opens its own empty
            // database, so the pool must keep exactly one alive.
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(2)
        };
        let pool = pool_options
            .connect_with(connect_options)
            .await
            .with_context(|| format!("failed to open identity database '{database_url}'"))?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to migrate identity database")?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for SqliteIdentityStore {
    async fn get(&self) -> Result<Option<IdentityToken>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv WHERE key = ?")
            .bind(IDENTITY_KEY)
            .fetch_optional(&self.pool)
            .await
            .context("failed to read identity token")?;
        Ok(value.map(IdentityToken))
    }

    async fn set(&self, token: &IdentityToken) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv (key, value, updated_at)
            VALUES (?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(IDENTITY_KEY)
        .bind(token.as_str())
        .execute(&self.pool)
        .await
        .context("failed to write identity token")?;
        debug!(key = IDENTITY_KEY, "identity token stored");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM kv WHERE key = ?")
            .bind(IDENTITY_KEY)
            .execute(&self.pool)
            .await
            .context("failed to clear identity token")?;
        Ok(())
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if is_in_memory(database_url) || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
