use std::sync::Arc;

use time::{Duration, OffsetDateTime};
use tower_cookies::Cookie;

use crate::{
    Result,
    config::CookieOptions,
    format::{self, Encoding},
    session::Session,
    store::SessionStore,
    token::Token,
};

/// Loads sessions from a [`SessionStore`], persists them again, and describes the cookie that
/// carries their token.
///
/// This is the request-independent half of [`SessionManagerLayer`](crate::SessionManagerLayer);
/// it can also be driven by hand from code that is not a `tower` service.
#[derive(Debug, Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    idle_timeout: Duration,
    encoding: Encoding,
    dirty_read: bool,
    cookie_options: CookieOptions,
}

impl SessionManager {
    pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::minutes(10);

    /// Store expiry used when the idle timeout is zero; never reached by `delete_expired`.
    pub const NO_EXPIRY: i64 = i64::MAX;

    pub fn new(store: impl SessionStore) -> Self {
        Self::from_arc(Arc::new(store))
    }

    pub fn from_arc(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            idle_timeout: Self::DEFAULT_IDLE_TIMEOUT,
            encoding: Encoding::default(),
            dirty_read: false,
            cookie_options: CookieOptions::default(),
        }
    }

    /// Sliding expiry window; every saved request pushes the store expiry to `now + idle_timeout`.
    /// A zero timeout leaves the cookie without `Max-Age`.
    #[must_use]
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Applied to every session this manager creates or loads.
    #[must_use]
    pub fn with_dirty_read(mut self, dirty_read: bool) -> Self {
        self.dirty_read = dirty_read;
        self
    }

    #[must_use]
    pub fn with_cookie_options(mut self, cookie_options: CookieOptions) -> Self {
        self.cookie_options = cookie_options;
        self
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn cookie_options(&self) -> &CookieOptions {
        &self.cookie_options
    }

    pub fn new_session(&self) -> Session {
        Session::with_dirty_read(self.dirty_read)
    }

    /// Hydrates the session stored under `token`.
    ///
    /// A token the store doesn't know (or has expired) yields a brand-new session with a fresh
    /// token; the presented token is not reused.
    pub async fn load(&self, token: &Token) -> Result<Session> {
        let record = match self.encoding {
            Encoding::Json => match self.store.get(token).await? {
                Some(data) if !data.is_empty() => Some(format::decode_json(&data)?),
                _ => None,
            },
            Encoding::Binary => match self.store.get_bytes(token).await? {
                Some(data) if !data.is_empty() => Some(format::decode_binary(&data)?),
                _ => None,
            },
        };

        match record {
            Some(record) => {
                tracing::debug!(%token, "session loaded");
                Ok(Session::from_record(record, self.dirty_read))
            }
            None => {
                tracing::debug!(%token, "session not found, starting a new one");
                Ok(self.new_session())
            }
        }
    }

    /// Hydrates from a raw cookie value; a missing, empty or unparsable value starts a new session.
    pub async fn load_from_cookie(&self, value: Option<&str>) -> Result<Session> {
        let Some(value) = value.filter(|value| !value.is_empty()) else {
            return Ok(self.new_session());
        };

        match value.parse::<Token>() {
            Ok(token) => self.load(&token).await,
            Err(err) => {
                tracing::warn!(err = %err, "ignoring unparsable session cookie");
                Ok(self.new_session())
            }
        }
    }

    /// Persists `session` with a fresh sliding expiry and returns that expiry.
    ///
    /// Without a positive idle timeout the session lives as long as the browser keeps the cookie,
    /// so the store entry is saved with [`NO_EXPIRY`](Self::NO_EXPIRY).
    pub async fn save(&self, session: &Session) -> Result<OffsetDateTime> {
        let expires_at = OffsetDateTime::now_utc() + self.idle_timeout;
        let expiry = if self.idle_timeout.is_positive() {
            expires_at.unix_timestamp()
        } else {
            Self::NO_EXPIRY
        };
        let record = session.record();

        match self.encoding {
            Encoding::Json => {
                let data = format::encode_json(&record)?;
                self.store.save(&record.token, &data, expiry).await?;
            }
            Encoding::Binary => {
                let data = format::encode_binary(&record)?;
                self.store.save_bytes(&record.token, &data, expiry).await?;
            }
        }

        Ok(expires_at)
    }

    /// The response cookie for `token`, expiring alongside the stored session.
    pub fn session_cookie(&self, token: &Token, expires_at: OffsetDateTime) -> Cookie<'static> {
        self.cookie_options
            .build_cookie(token.to_string(), self.idle_timeout, expires_at)
    }

    /// Sweeps entries that expired before now. Meant for scheduled maintenance, never called on
    /// the request path.
    pub async fn delete_expired(&self) -> Result<u64> {
        let threshold = OffsetDateTime::now_utc().unix_timestamp();
        Ok(self.store.delete_expired(threshold).await?)
    }
}
