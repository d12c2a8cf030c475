use async_trait::async_trait;
use sqlx::SqlitePool;
use time::OffsetDateTime;

use super::{Error, Result, SessionStore};
use crate::token::Token;

/// Store backed by a SQLite table with columns `(token, data, expiry, createtime, updatetime)`.
///
/// Text and binary payloads share the `data` column. Reads only return rows whose expiry is not
/// yet in the past.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    table_name: String,
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Database(Box::new(err))
    }
}

fn now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            table_name: "sessions".into(),
        }
    }

    /// Uses `table_name` instead of `sessions`. Only ASCII alphanumerics and `_` are accepted.
    pub fn with_table_name(mut self, table_name: impl AsRef<str>) -> Result<Self> {
        let table_name = table_name.as_ref();
        if table_name.is_empty()
            || !table_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(Error::Backend(format!(
                "Invalid table name {table_name:?}: only [A-Za-z0-9_] is allowed"
            )));
        }

        self.table_name = table_name.to_owned();
        Ok(self)
    }

    /// Creates the session table and its expiry index if they don't exist yet.
    pub async fn migrate(&self) -> Result<()> {
        let create_table = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                token TEXT PRIMARY KEY NOT NULL,
                data BLOB NOT NULL,
                expiry INTEGER NOT NULL,
                createtime INTEGER NOT NULL,
                updatetime INTEGER NOT NULL
            )
            "#,
            table = self.table_name
        );
        sqlx::query(&create_table).execute(&self.pool).await?;

        let create_index = format!(
            "CREATE INDEX IF NOT EXISTS {table}_expiry_idx ON {table} (expiry)",
            table = self.table_name
        );
        sqlx::query(&create_index).execute(&self.pool).await?;

        Ok(())
    }

    fn upsert_query(&self) -> String {
        format!(
            r#"
            INSERT INTO {table} (token, data, expiry, createtime, updatetime)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(token) DO UPDATE SET
                data = excluded.data,
                expiry = excluded.expiry,
                updatetime = excluded.updatetime
            "#,
            table = self.table_name
        )
    }
}

#[async_trait]
impl SessionStore for SqliteStore {
    async fn get(&self, token: &Token) -> Result<Option<String>> {
        let query = format!(
            "SELECT CAST(data AS TEXT) FROM {} WHERE token = ? AND expiry >= ?",
            self.table_name
        );
        let data: Option<String> = sqlx::query_scalar(&query)
            .bind(token.to_string())
            .bind(now())
            .fetch_optional(&self.pool)
            .await?;
        Ok(data)
    }

    async fn save(&self, token: &Token, data: &str, expiry: i64) -> Result<()> {
        let query = self.upsert_query();
        let now = now();
        sqlx::query(&query)
            .bind(token.to_string())
            .bind(data)
            .bind(expiry)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_bytes(&self, token: &Token) -> Result<Option<Vec<u8>>> {
        let query = format!(
            "SELECT CAST(data AS BLOB) FROM {} WHERE token = ? AND expiry >= ?",
            self.table_name
        );
        let data: Option<Vec<u8>> = sqlx::query_scalar(&query)
            .bind(token.to_string())
            .bind(now())
            .fetch_optional(&self.pool)
            .await?;
        Ok(data)
    }

    async fn save_bytes(&self, token: &Token, data: &[u8], expiry: i64) -> Result<()> {
        let query = self.upsert_query();
        let now = now();
        sqlx::query(&query)
            .bind(token.to_string())
            .bind(data)
            .bind(expiry)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, token: &Token) -> Result<()> {
        let query = format!("DELETE FROM {} WHERE token = ?", self.table_name);
        sqlx::query(&query)
            .bind(token.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_expired(&self, threshold: i64) -> Result<u64> {
        let query = format!("DELETE FROM {} WHERE expiry < ?", self.table_name);
        let res = sqlx::query(&query)
            .bind(threshold)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }
}
