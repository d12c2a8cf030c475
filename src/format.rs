//! Helpers for encoding/decoding the payload handed to a [`SessionStore`](crate::SessionStore).
//!
//! Two encodings exist: JSON, which stays readable in the backing table, and a compact binary
//! form. Both carry the same versioned envelope holding only the session token and its values.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, token::Token, value::Value};

const VERSION: u8 = 1;

/// How session payloads are serialized before they reach the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    /// Text payloads, stored through [`SessionStore::save`](crate::SessionStore::save).
    #[default]
    Json,
    /// Byte payloads, stored through [`SessionStore::save_bytes`](crate::SessionStore::save_bytes).
    Binary,
}

/// Snapshot of a session's persistent state.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub token: Token,
    pub values: HashMap<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    v: u8,
    token: Token,
    values: HashMap<String, Value>,
}

impl Envelope {
    fn wrap(record: &Record) -> Self {
        Self {
            v: VERSION,
            token: record.token,
            values: record.values.clone(),
        }
    }

    fn into_record(self) -> Result<Record> {
        if self.v != VERSION {
            return Err(Error::Decode(format!(
                "Unsupported session payload version: {}",
                self.v
            )));
        }

        Ok(Record {
            token: self.token,
            values: self.values,
        })
    }
}

/// Encode a [`Record`] as a JSON document.
///
/// JSON has no representation for NaN or the infinities, so records holding one are rejected
/// here rather than written as `null` and failing on every later load.
pub fn encode_json(record: &Record) -> Result<String> {
    if let Some((key, value)) = record
        .values
        .iter()
        .find(|(_, value)| matches!(value, Value::Float(f) if !f.is_finite()))
    {
        return Err(Error::Encode(format!(
            "value `{key}` ({value}) has no JSON representation"
        )));
    }
    serde_json::to_string(&Envelope::wrap(record)).map_err(|err| Error::Encode(err.to_string()))
}

/// Decode a JSON document into a [`Record`].
pub fn decode_json(data: &str) -> Result<Record> {
    serde_json::from_str::<Envelope>(data)
        .map_err(|err| Error::Decode(err.to_string()))?
        .into_record()
}

/// Encode a [`Record`] with the compact binary encoding.
pub fn encode_binary(record: &Record) -> Result<Vec<u8>> {
    bincode::serialize(&Envelope::wrap(record)).map_err(|err| Error::Encode(err.to_string()))
}

/// Decode bytes produced by [`encode_binary`] into a [`Record`].
pub fn decode_binary(data: &[u8]) -> Result<Record> {
    bincode::deserialize::<Envelope>(data)
        .map_err(|err| Error::Decode(err.to_string()))?
        .into_record()
}
