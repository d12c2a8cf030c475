//! Server-side sessions for `tower` services.
//!
//! A [`SessionManagerLayer`] reads a token from the request's session cookie, loads the matching
//! [`Session`] from a pluggable [`SessionStore`] (or starts a new one), inserts it into the
//! request extensions, and after the inner service responds saves it back with a sliding expiry
//! and sets the cookie again.
//!
//! Sessions hold typed [`Value`]s. The typed getters accept either the native variant or a string
//! that parses as the requested type.
//!
//! # Stores
//! [`MemoryStore`] keeps payloads in process memory. With the `sqlite` feature, [`SqliteStore`]
//! keeps them in a SQLite table. Payloads are JSON by default; [`Encoding::Binary`] switches to a
//! compact binary form.
//!
//! # Security
//! Stored payloads are not encrypted and tokens are never rotated. With the `signed` feature the
//! token cookie can be authenticated with [`SessionManagerLayer::signed`].

mod config;
mod controller;
mod error;
#[cfg(feature = "axum")]
mod extract;
pub mod format;
pub mod layer;
mod manager;
mod session;
pub mod store;
mod token;
mod value;

pub use tower_cookies::cookie::SameSite;

#[cfg(feature = "signed")]
pub use tower_cookies::Key;

pub use crate::config::{CookieOptions, DEFAULT_COOKIE_NAME};
pub use crate::controller::{CookieController, PlaintextCookie};
pub use crate::error::{Error, Result};
pub use crate::format::Encoding;
pub use crate::layer::SessionManagerLayer;
pub use crate::manager::SessionManager;
pub use crate::session::Session;
pub use crate::store::{MemoryStore, SessionStore, continuously_delete_expired};
pub use crate::token::Token;
pub use crate::value::Value;

#[cfg(feature = "signed")]
pub use crate::controller::SignedCookie;

#[cfg(feature = "sqlite")]
pub use crate::store::SqliteStore;
