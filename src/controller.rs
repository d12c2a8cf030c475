use std::fmt::Debug;

use tower_cookies::{Cookie, Cookies};

/// How the token cookie is read from the request jar and written back to the response.
pub trait CookieController: Debug + Clone + Send + Sync + 'static {
    /// Returns the token cookie's value, or `None` when it is absent or fails verification.
    fn token(&self, cookies: &Cookies, name: &str) -> Option<String>;

    fn set(&self, cookies: &Cookies, cookie: Cookie<'static>);
}

/// Token cookie sent as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaintextCookie;

impl CookieController for PlaintextCookie {
    fn token(&self, cookies: &Cookies, name: &str) -> Option<String> {
        cookies.get(name).map(|cookie| cookie.value().to_owned())
    }

    fn set(&self, cookies: &Cookies, cookie: Cookie<'static>) {
        cookies.add(cookie);
    }
}

/// Token cookie authenticated with an HMAC, so forged tokens are dropped before the store is
/// consulted.
#[cfg(feature = "signed")]
#[derive(Debug, Clone)]
pub struct SignedCookie {
    key: crate::Key,
}

#[cfg(feature = "signed")]
impl SignedCookie {
    pub fn new(key: crate::Key) -> Self {
        Self { key }
    }
}

#[cfg(feature = "signed")]
impl CookieController for SignedCookie {
    fn token(&self, cookies: &Cookies, name: &str) -> Option<String> {
        cookies
            .signed(&self.key)
            .get(name)
            .map(|cookie| cookie.value().to_owned())
    }

    fn set(&self, cookies: &Cookies, cookie: Cookie<'static>) {
        cookies.signed(&self.key).add(cookie);
    }
}
