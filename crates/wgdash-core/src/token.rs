//! Persisted access token.
//!
//! A [`TokenStore`] is a single slot holding the bearer token: read once
//! when a session is built, overwritten when the user supplies a new
//! token. Implementations live wherever the storage does; the config
//! crate provides file and keyring backends.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use secrecy::SecretString;

use crate::error::CoreError;

pub trait TokenStore: Send + Sync {
    /// The stored token, or `None` if nothing was ever saved.
    fn load(&self) -> Result<Option<SecretString>, CoreError>;

    /// Overwrite the stored token.
    fn save(&self, token: &SecretString) -> Result<(), CoreError>;
}

/// Process-local token slot. Nothing survives the process.
#[derive(Default)]
pub struct MemoryTokenStore {
    slot: ArcSwapOption<SecretString>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: SecretString) -> Self {
        Self {
            slot: ArcSwapOption::from_pointee(token),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<SecretString>, CoreError> {
        Ok(self.slot.load_full().map(|t| SecretString::clone(&t)))
    }

    fn save(&self, token: &SecretString) -> Result<(), CoreError> {
        self.slot.store(Some(Arc::new(token.clone())));
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn memory_store_starts_empty_and_keeps_last_save() {
        let store = MemoryTokenStore::new();
        assert!(store.load().unwrap().is_none());

        store.save(&SecretString::from("one".to_string())).unwrap();
        store.save(&SecretString::from("two".to_string())).unwrap();
        assert_eq!(store.load().unwrap().unwrap().expose_secret(), "two");
    }
}
