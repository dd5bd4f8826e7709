//! SQLite-backed redirect store using sqlx.
//!
//! `old_path` uniqueness is enforced by a unique index, so concurrent
//! creates and updates cannot race past the duplicate check: the losing
//! statement fails with a constraint violation that is reported as
//! [`StoreError::DuplicatePath`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;

use crate::config::DatabaseConfig;
use crate::redirects::rule::{validate_paths, RedirectRule, RuleId, RuleStats, PERMANENT_REDIRECT};
use crate::redirects::store::{RedirectStore, StoreError};

const RULE_COLUMNS: &str = "id, old_path, new_path, status, created_at, active";

#[derive(Clone, Debug)]
pub struct SqliteRedirectStore {
    pool: SqlitePool,
}

impl SqliteRedirectStore {
    /// Open (creating if missing) the database and apply migrations.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        let store = Self::from_pool(pool).await?;
        tracing::info!(url = %config.url, "Redirect store opened");
        Ok(store)
    }

    /// A private in-memory database. Useful for tests and dry runs.
    ///
    /// Pinned to a single connection that never expires; every
    /// `:memory:` connection is a separate database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, applying pending migrations.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

fn row_to_rule(row: &SqliteRow) -> Result<RedirectRule, sqlx::Error> {
    let status: String = row.try_get("status")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    Ok(RedirectRule {
        id: RuleId(row.try_get("id")?),
        old_path: row.try_get("old_path")?,
        new_path: row.try_get("new_path")?,
        status: status.parse().unwrap_or(PERMANENT_REDIRECT),
        created_at,
        active: row.try_get("active")?,
    })
}

/// Translate a unique-index violation into a duplicate error for `old_path`.
fn map_write_error(err: sqlx::Error, old_path: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::DuplicatePath(old_path.to_string())
        }
        _ => StoreError::Storage(err),
    }
}

#[async_trait]
impl RedirectStore for SqliteRedirectStore {
    async fn create(&self, old_raw: &str, new_raw: &str) -> Result<RuleId, StoreError> {
        let (old_path, new_path) = validate_paths(old_raw, new_raw)?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO redirects (old_path, new_path, status, created_at, active)
             VALUES (?, ?, ?, ?, 1)
             RETURNING id",
        )
        .bind(&old_path)
        .bind(&new_path)
        .bind(PERMANENT_REDIRECT.to_string())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &old_path))?;

        tracing::debug!(id, old_path = %old_path, new_path = %new_path, "Redirect created");
        Ok(RuleId(id))
    }

    async fn update(&self, id: RuleId, old_raw: &str, new_raw: &str) -> Result<(), StoreError> {
        let (old_path, new_path) = validate_paths(old_raw, new_raw)?;

        // The unique index ignores the row being rewritten, so keeping the
        // current old_path is not a conflict.
        let result = sqlx::query("UPDATE redirects SET old_path = ?, new_path = ? WHERE id = ?")
            .bind(&old_path)
            .bind(&new_path)
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &old_path))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        tracing::debug!(%id, old_path = %old_path, new_path = %new_path, "Redirect updated");
        Ok(())
    }

    async fn toggle_active(&self, id: RuleId) -> Result<bool, StoreError> {
        let active: Option<bool> =
            sqlx::query_scalar("UPDATE redirects SET active = NOT active WHERE id = ? RETURNING active")
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await?;
        active.ok_or(StoreError::NotFound(id))
    }

    async fn delete(&self, id: RuleId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM redirects WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn clear_all(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM redirects").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn list(&self) -> Result<Vec<RedirectRule>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {RULE_COLUMNS} FROM redirects ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(row_to_rule).collect::<Result<Vec<_>, sqlx::Error>>()?)
    }

    async fn get(&self, id: RuleId) -> Result<RedirectRule, StoreError> {
        let row = sqlx::query(&format!("SELECT {RULE_COLUMNS} FROM redirects WHERE id = ?"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(row_to_rule(&row)?),
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn stats(&self) -> Result<RuleStats, StoreError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total, COALESCE(SUM(active), 0) AS active FROM redirects",
        )
        .fetch_one(&self.pool)
        .await?;
        let total: i64 = row.try_get("total")?;
        let active: i64 = row.try_get("active")?;
        Ok(RuleStats {
            total: total as u64,
            active: active as u64,
        })
    }

    async fn lookup_active(&self, old_path: &str) -> Result<Option<RedirectRule>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {RULE_COLUMNS} FROM redirects WHERE old_path = ? AND active = 1 LIMIT 1"
        ))
        .bind(old_path)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(row_to_rule).transpose()?)
    }

    async fn exists_by_old_path(
        &self,
        old_path: &str,
        exclude: Option<RuleId>,
    ) -> Result<bool, StoreError> {
        let found: Option<i64> = match exclude {
            Some(id) => {
                sqlx::query_scalar("SELECT id FROM redirects WHERE old_path = ? AND id != ? LIMIT 1")
                    .bind(old_path)
                    .bind(id.0)
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_scalar("SELECT id FROM redirects WHERE old_path = ? LIMIT 1")
                    .bind(old_path)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };
        Ok(found.is_some())
    }
}
