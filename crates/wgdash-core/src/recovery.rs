//! Types for the access-token recovery flow.
//!
//! When the backend rejects our credentials the session asks a
//! [`TokenPrompt`] for a replacement, then announces the change to
//! everyone holding a [`CredentialEvent`] receiver.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::Serialize;
use thiserror::Error;

/// Modal tag shown while the token prompt is open.
pub const ACCESS_TOKEN_MODAL: &str = "access-token";

#[derive(Debug, Error)]
#[error("{0}")]
pub struct PromptError(pub String);

/// A blocking dialog that asks the user for a replacement token.
///
/// Runs on the blocking thread pool, so it may wait on stdin.
pub trait TokenPrompt: Send + Sync + 'static {
    /// `Ok(Some(token))` when the user confirmed, `Ok(None)` when they
    /// cancelled.
    fn request_token(&self) -> Result<Option<SecretString>, PromptError>;
}

/// Published every time the session's token changes.
///
/// `generation` starts at 0 for the token loaded at startup and increases
/// by one per rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CredentialEvent {
    pub generation: u64,
    pub changed_at: Option<DateTime<Utc>>,
}

impl CredentialEvent {
    pub(crate) fn initial() -> Self {
        Self {
            generation: 0,
            changed_at: None,
        }
    }

    pub(crate) fn next(self) -> Self {
        Self {
            generation: self.generation + 1,
            changed_at: Some(Utc::now()),
        }
    }
}
