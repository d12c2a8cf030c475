use std::{fmt, num::TryFromIntError};

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{Error, Result};

/// A single session value.
///
/// Each typed conversion accepts its own variant, and falls back to parsing a
/// [`Value::String`] when the stored value is text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    String(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    Time(#[serde(with = "time::serde::rfc3339")] OffsetDateTime),
}

impl Value {
    /// Name of the variant as it appears in type mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::String(_) => "String",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Integer",
            Value::Float(_) => "Float",
            Value::Time(_) => "Time",
        }
    }

    pub fn as_string(&self) -> Result<String> {
        match self {
            Value::String(s) => Ok(s.clone()),
            other => Err(other.mismatch("String")),
        }
    }

    /// Only the literals `true` and `false` coerce, compared case-insensitively.
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
            other => Err(other.mismatch("Bool")),
        }
    }

    pub fn as_int(&self) -> Result<i64> {
        match self {
            Value::Int(i) => Ok(*i),
            Value::String(s) => s.parse().map_err(|_| self.mismatch("Integer")),
            other => Err(other.mismatch("Integer")),
        }
    }

    pub fn as_float(&self) -> Result<f64> {
        match self {
            Value::Float(f) => Ok(*f),
            Value::String(s) => s.parse().map_err(|_| self.mismatch("Float")),
            other => Err(other.mismatch("Float")),
        }
    }

    /// Strings must be RFC 3339 timestamps, e.g. `2006-01-02T15:04:05Z` or with an offset.
    pub fn as_time(&self) -> Result<OffsetDateTime> {
        match self {
            Value::Time(t) => Ok(*t),
            Value::String(s) => {
                OffsetDateTime::parse(s, &Rfc3339).map_err(|_| self.mismatch("Time"))
            }
            other => Err(other.mismatch("Time")),
        }
    }

    fn mismatch(&self, expected: &'static str) -> Error {
        Error::TypeMismatch {
            value: self.to_string(),
            expected,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Time(t) => match t.format(&Rfc3339) {
                Ok(formatted) => f.write_str(&formatted),
                Err(_) => write!(f, "{t}"),
            },
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<isize> for Value {
    fn from(value: isize) -> Self {
        // isize is at most 64 bits wide on every target Rust supports.
        Value::Int(value as i64)
    }
}

macro_rules! impl_try_from_unsigned {
    ($($ty:ty),*) => {
        $(
            impl TryFrom<$ty> for Value {
                type Error = TryFromIntError;

                fn try_from(value: $ty) -> std::result::Result<Self, Self::Error> {
                    i64::try_from(value).map(Value::Int)
                }
            }
        )*
    };
}

impl_try_from_unsigned!(u64, usize);

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<OffsetDateTime> for Value {
    fn from(value: OffsetDateTime) -> Self {
        Value::Time(value)
    }
}
