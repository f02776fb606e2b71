use std::sync::Arc;

use arc_swap::ArcSwap;
use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// The bearer token attached to every authenticated request.
///
/// Cloning shares the underlying slot: replacing the token through any
/// clone changes the `Authorization` header of every request built
/// afterwards, including replays of requests that already failed.
#[derive(Clone)]
pub struct BearerToken {
    inner: Arc<ArcSwap<SecretString>>,
}

impl BearerToken {
    pub fn new(token: SecretString) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(token)),
        }
    }

    /// A token slot with no credential. Requests still carry the header,
    /// with an empty value after the scheme.
    pub fn empty() -> Self {
        Self::new(SecretString::from(String::new()))
    }

    /// Swap in a new token.
    pub fn replace(&self, token: SecretString) {
        self.inner.store(Arc::new(token));
    }

    /// The current token.
    pub fn current(&self) -> Arc<SecretString> {
        self.inner.load_full()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.load().expose_secret().is_empty()
    }

    /// Render `Bearer <token>` as a sensitive header value.
    pub fn header_value(&self) -> Result<HeaderValue, Error> {
        let token = self.inner.load();
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| Error::InvalidToken {
                message: format!("token is not a valid header value: {e}"),
            })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerToken")
            .field("empty", &self.is_empty())
            .finish()
    }
}

impl Default for BearerToken {
    fn default() -> Self {
        Self::empty()
    }
}
