#![allow(dead_code)]

// Shared helpers for integration tests.
//
// Cookies are parsed with `tower_cookies::Cookie` so assertions see the same attributes a browser
// would, and are sent back as a bare `name=value` pair the way a browser would.
use std::convert::Infallible;

use async_trait::async_trait;
use axum::body::Body;
use http::{HeaderMap, Request, Response, header};
use http_body_util::BodyExt as _;
use tower_cookies::Cookie;
use tower_server_sessions::{
    MemoryStore, Session, SessionManager, SessionManagerLayer, SessionStore, Token, store,
};

pub const KEY: &str = "message";
pub const VALUE: &str = "Hello from a session!";

pub async fn body_string(body: Body) -> String {
    // Collect an Axum body into a UTF-8 string for assertions.
    let bytes = body
        .collect()
        .await
        .expect("body collects successfully")
        .to_bytes();
    String::from_utf8_lossy(&bytes).into_owned()
}

pub async fn put_handler(req: Request<Body>) -> Result<Response<Body>, Infallible> {
    // Writes `KEY` into the session, like a page that records a flash message.
    let session = req
        .extensions()
        .get::<Session>()
        .cloned()
        .expect("request includes Session extension");

    session.put(KEY, VALUE);

    Ok(Response::new(Body::empty()))
}

pub async fn get_handler(req: Request<Body>) -> Result<Response<Body>, Infallible> {
    // Echoes `KEY` back, or an empty body when the session doesn't hold it.
    let session = req
        .extensions()
        .get::<Session>()
        .cloned()
        .expect("request includes Session extension");

    let message = session.get_string(KEY).unwrap_or_default();

    Ok(Response::new(Body::from(message)))
}

pub fn memory_layer() -> (MemoryStore, SessionManagerLayer) {
    // Layer over a fresh memory store; the store handle is returned so tests can inspect it.
    let store = MemoryStore::new();
    let layer = SessionManagerLayer::new(SessionManager::new(store.clone()));
    (store, layer)
}

pub fn get_session_cookie(res: &Response<Body>) -> Cookie<'static> {
    get_session_cookie_from_headers(res.headers())
}

pub fn get_session_cookie_from_headers(headers: &HeaderMap) -> Cookie<'static> {
    // Parse the `Set-Cookie` header into a `Cookie` structure.
    let set_cookie = headers
        .get(header::SET_COOKIE)
        .expect("response includes set-cookie header");
    let set_cookie = set_cookie
        .to_str()
        .expect("set-cookie header is valid utf-8");
    Cookie::parse_encoded(set_cookie)
        .expect("set-cookie parses successfully")
        .into_owned()
}

pub fn cookie_header_value(cookie: &Cookie<'_>) -> String {
    // Encode a cookie for use in a `Cookie` request header.
    cookie.stripped().encoded().to_string()
}

pub fn token_of(cookie: &Cookie<'_>) -> Token {
    cookie.value().parse().expect("cookie carries a token")
}

/// Which store operations a [`FailingStore`] should fail.
#[derive(Debug, Clone, Copy)]
pub enum Fail {
    Reads,
    Writes,
}

/// Memory store whose reads or writes report a backend error.
#[derive(Debug, Clone)]
pub struct FailingStore {
    inner: MemoryStore,
    fail: Fail,
}

impl FailingStore {
    pub fn new(inner: MemoryStore, fail: Fail) -> Self {
        Self { inner, fail }
    }

    fn check(&self, op: Fail) -> store::Result<()> {
        match (self.fail, op) {
            (Fail::Reads, Fail::Reads) | (Fail::Writes, Fail::Writes) => {
                Err(store::Error::Backend("connection refused".into()))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl SessionStore for FailingStore {
    async fn get(&self, token: &Token) -> store::Result<Option<String>> {
        self.check(Fail::Reads)?;
        self.inner.get(token).await
    }

    async fn save(&self, token: &Token, data: &str, expiry: i64) -> store::Result<()> {
        self.check(Fail::Writes)?;
        self.inner.save(token, data, expiry).await
    }

    async fn get_bytes(&self, token: &Token) -> store::Result<Option<Vec<u8>>> {
        self.check(Fail::Reads)?;
        self.inner.get_bytes(token).await
    }

    async fn save_bytes(&self, token: &Token, data: &[u8], expiry: i64) -> store::Result<()> {
        self.check(Fail::Writes)?;
        self.inner.save_bytes(token, data, expiry).await
    }

    async fn delete(&self, token: &Token) -> store::Result<()> {
        self.check(Fail::Writes)?;
        self.inner.delete(token).await
    }

    async fn delete_expired(&self, threshold: i64) -> store::Result<u64> {
        self.check(Fail::Writes)?;
        self.inner.delete_expired(threshold).await
    }
}
