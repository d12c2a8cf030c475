use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use time::OffsetDateTime;

use crate::{Error, Result, format::Record, token::Token, value::Value};

/// Per-client bag of typed values, identified by a [`Token`].
///
/// `Session` is a handle: clones share the same underlying values, so a handler can pass it to
/// spawned tasks and every clone sees the same writes. Each load from a store produces a new,
/// unrelated instance.
///
/// Writes always take the exclusive lock. Reads take it too unless the session was created with
/// dirty reads enabled, in which case readers share the lock and never block one another. Dirty
/// reads are not lock-free: a reader still waits while a writer holds the lock.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    token: Token,
    values: RwLock<HashMap<String, Value>>,
    dirty_read: bool,
}

impl Session {
    /// Creates an empty session with a freshly generated token.
    #[must_use]
    pub fn new() -> Self {
        Self::with_dirty_read(false)
    }

    #[must_use]
    pub fn with_dirty_read(dirty_read: bool) -> Self {
        Self::build(Token::generate(), HashMap::new(), dirty_read)
    }

    /// Rebuilds a session from previously persisted state.
    #[must_use]
    pub fn from_values(token: Token, values: HashMap<String, Value>) -> Self {
        Self::build(token, values, false)
    }

    pub(crate) fn from_record(record: Record, dirty_read: bool) -> Self {
        Self::build(record.token, record.values, dirty_read)
    }

    fn build(token: Token, values: HashMap<String, Value>, dirty_read: bool) -> Self {
        Self {
            inner: Arc::new(Inner {
                token,
                values: RwLock::new(values),
                dirty_read,
            }),
        }
    }

    pub fn token(&self) -> Token {
        self.inner.token
    }

    pub fn is_dirty_read(&self) -> bool {
        self.inner.dirty_read
    }

    /// Inserts or overwrites the value stored under `key`.
    pub fn put(&self, key: impl Into<String>, value: impl Into<Value>) {
        let mut values = self
            .inner
            .values
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        values.insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.inner
            .values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.read(|values| values.get(key).cloned())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.read(|values| values.contains_key(key))
    }

    pub fn keys(&self) -> Vec<String> {
        self.read(|values| values.keys().cloned().collect())
    }

    pub fn len(&self) -> usize {
        self.read(HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.read(HashMap::is_empty)
    }

    pub fn get_string(&self, key: &str) -> Result<String> {
        self.typed(key, Value::as_string)
    }

    pub fn get_bool(&self, key: &str) -> Result<bool> {
        self.typed(key, Value::as_bool)
    }

    pub fn get_int(&self, key: &str) -> Result<i64> {
        self.typed(key, Value::as_int)
    }

    pub fn get_float(&self, key: &str) -> Result<f64> {
        self.typed(key, Value::as_float)
    }

    pub fn get_time(&self, key: &str) -> Result<OffsetDateTime> {
        self.typed(key, Value::as_time)
    }

    pub(crate) fn record(&self) -> Record {
        Record {
            token: self.inner.token,
            values: self.read(HashMap::clone),
        }
    }

    fn typed<T>(&self, key: &str, convert: impl FnOnce(&Value) -> Result<T>) -> Result<T> {
        self.read(|values| match values.get(key) {
            Some(value) => convert(value),
            None => Err(Error::Missing(key.to_owned())),
        })
    }

    fn read<T>(&self, f: impl FnOnce(&HashMap<String, Value>) -> T) -> T {
        if self.inner.dirty_read {
            let values = self
                .inner
                .values
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            f(&*values)
        } else {
            let values = self
                .inner
                .values
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            f(&*values)
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
