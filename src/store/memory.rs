use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use time::OffsetDateTime;

use super::{Error, Result, SessionStore};
use crate::token::Token;

/// Process-local store backed by a `HashMap`.
///
/// Clones share the same map. Entries past their expiry are hidden from reads and removed by
/// [`SessionStore::delete_expired`]; nothing else evicts them.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<Token, Entry>>>,
}

#[derive(Debug, Clone)]
struct Entry {
    payload: Payload,
    expiry: i64,
}

#[derive(Debug, Clone)]
enum Payload {
    Text(String),
    Binary(Vec<u8>),
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<MutexGuard<'_, HashMap<Token, Entry>>> {
        self.entries
            .lock()
            .map_err(|_| Error::Backend("memory store lock is poisoned".into()))
    }

    fn live_entry(&self, token: &Token) -> Result<Option<Payload>> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        Ok(self
            .entries()?
            .get(token)
            .filter(|entry| entry.expiry >= now)
            .map(|entry| entry.payload.clone()))
    }

    fn insert(&self, token: &Token, payload: Payload, expiry: i64) -> Result<()> {
        self.entries()?.insert(*token, Entry { payload, expiry });
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get(&self, token: &Token) -> Result<Option<String>> {
        match self.live_entry(token)? {
            Some(Payload::Text(data)) => Ok(Some(data)),
            Some(Payload::Binary(_)) => Err(Error::Backend(format!(
                "session {token} holds a binary payload"
            ))),
            None => Ok(None),
        }
    }

    async fn save(&self, token: &Token, data: &str, expiry: i64) -> Result<()> {
        self.insert(token, Payload::Text(data.to_owned()), expiry)
    }

    async fn get_bytes(&self, token: &Token) -> Result<Option<Vec<u8>>> {
        match self.live_entry(token)? {
            Some(Payload::Binary(data)) => Ok(Some(data)),
            Some(Payload::Text(_)) => Err(Error::Backend(format!(
                "session {token} holds a text payload"
            ))),
            None => Ok(None),
        }
    }

    async fn save_bytes(&self, token: &Token, data: &[u8], expiry: i64) -> Result<()> {
        self.insert(token, Payload::Binary(data.to_vec()), expiry)
    }

    async fn delete(&self, token: &Token) -> Result<()> {
        self.entries()?.remove(token);
        Ok(())
    }

    async fn delete_expired(&self, threshold: i64) -> Result<u64> {
        let mut entries = self.entries()?;
        let before = entries.len();
        entries.retain(|_, entry| entry.expiry >= threshold);
        Ok((before - entries.len()) as u64)
    }
}
