//! The persistence contract session backends implement, plus the bundled backends.

use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::token::Token;

mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Database error: {0}")]
    Database(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Storage for serialized session payloads, keyed by [`Token`].
///
/// Expiry values are absolute Unix timestamps in seconds. A backend may report an expired entry
/// the same way as a missing one, i.e. `Ok(None)`.
#[async_trait]
pub trait SessionStore: Debug + Send + Sync + 'static {
    async fn get(&self, token: &Token) -> Result<Option<String>>;

    async fn save(&self, token: &Token, data: &str, expiry: i64) -> Result<()>;

    async fn get_bytes(&self, token: &Token) -> Result<Option<Vec<u8>>>;

    async fn save_bytes(&self, token: &Token, data: &[u8], expiry: i64) -> Result<()>;

    async fn delete(&self, token: &Token) -> Result<()>;

    /// Removes every entry whose expiry is strictly before `threshold`, returning how many were
    /// removed.
    async fn delete_expired(&self, threshold: i64) -> Result<u64>;
}

/// Calls [`SessionStore::delete_expired`] with the current time once per `period`.
///
/// The first sweep runs immediately. This future only completes when the store reports an error,
/// so it is meant to be spawned onto the runtime next to the server.
pub async fn continuously_delete_expired<S>(store: &S, period: Duration) -> Result<()>
where
    S: SessionStore + ?Sized,
{
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        let threshold = OffsetDateTime::now_utc().unix_timestamp();
        let deleted = store.delete_expired(threshold).await?;
        if deleted > 0 {
            tracing::debug!(deleted, "expired sessions removed");
        }
    }
}
