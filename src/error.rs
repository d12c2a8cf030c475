use thiserror::Error;

use crate::store;

#[derive(Error, Debug)]
pub enum Error {
    /// A typed accessor found a value that is neither of the requested type nor a string that
    /// parses as one.
    #[error("{value} is not a valid {expected}")]
    TypeMismatch {
        value: String,
        expected: &'static str,
    },

    #[error("no session value stored under `{0}`")]
    Missing(String),

    #[error("invalid session token: {0}")]
    InvalidToken(String),

    #[error("failed to encode session: {0}")]
    Encode(String),

    #[error("failed to decode session: {0}")]
    Decode(String),

    #[error(transparent)]
    Store(#[from] store::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
