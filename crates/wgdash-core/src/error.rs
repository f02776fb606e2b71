// ── Core error types ──
//
// User-facing errors from wgdash-core. The `From<wgdash_api::Error>` impl
// sorts transport failures into domain variants, and every variant built
// from a backend failure keeps that failure intact as its source.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to wgrest at {url}: {reason}")]
    ConnectionFailed {
        url: String,
        reason: String,
        #[source]
        source: Option<wgdash_api::Error>,
    },

    #[error("Request timed out")]
    Timeout {
        #[source]
        source: wgdash_api::Error,
    },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        message: String,
        #[source]
        source: Option<wgdash_api::Error>,
    },

    /// The user dismissed the token prompt. Nothing was stored and the
    /// request was not retried.
    #[error("Access token prompt cancelled")]
    RecoveryCancelled {
        #[source]
        source: wgdash_api::Error,
    },

    /// The token prompt could not be shown (no terminal, I/O failure).
    #[error("Cannot prompt for an access token: {message}")]
    PromptUnavailable {
        message: String,
        #[source]
        source: wgdash_api::Error,
    },

    #[error("Token storage error: {message}")]
    TokenStore { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Device not found: {name}")]
    DeviceNotFound {
        name: String,
        #[source]
        source: Option<wgdash_api::Error>,
    },

    #[error("Peer not found: {key}")]
    PeerNotFound {
        key: String,
        #[source]
        source: Option<wgdash_api::Error>,
    },

    #[error("Entity not found: {message}")]
    NotFound {
        message: String,
        #[source]
        source: wgdash_api::Error,
    },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed {
        message: String,
        #[source]
        source: wgdash_api::Error,
    },

    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        #[source]
        source: wgdash_api::Error,
    },

    // ── API errors ───────────────────────────────────────────────────
    #[error(
        "API error: {message}{}",
        .detail.as_deref().map(|d| format!(" ({d})")).unwrap_or_default()
    )]
    Api {
        message: String,
        /// The wgrest error code (e.g. `device_not_found`).
        code: Option<String>,
        /// HTTP status code (if applicable).
        status: Option<u16>,
        detail: Option<String>,
        #[source]
        source: wgdash_api::Error,
    },

    /// The server answered with a body we could not decode.
    #[error("Unexpected response from wgrest")]
    Decode {
        #[source]
        source: wgdash_api::Error,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<wgdash_api::Error>,
    },
}

impl CoreError {
    /// Returns `true` for either authentication-recovery dead end.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed { .. }
                | Self::RecoveryCancelled { .. }
                | Self::PromptUnavailable { .. }
        )
    }

    /// The backend failure this error was built from, exactly as the API
    /// client reported it.
    pub fn api_error(&self) -> Option<&wgdash_api::Error> {
        match self {
            Self::Timeout { source }
            | Self::RecoveryCancelled { source }
            | Self::PromptUnavailable { source, .. }
            | Self::NotFound { source, .. }
            | Self::ValidationFailed { source, .. }
            | Self::Conflict { source, .. }
            | Self::Api { source, .. }
            | Self::Decode { source } => Some(source),
            Self::ConnectionFailed { source, .. }
            | Self::AuthenticationFailed { source, .. }
            | Self::DeviceNotFound { source, .. }
            | Self::PeerNotFound { source, .. }
            | Self::Config { source, .. } => source.as_ref(),
            Self::TokenStore { .. } => None,
        }
    }

    /// HTTP status of the underlying response, if there was one.
    pub fn status(&self) -> Option<u16> {
        self.api_error().and_then(wgdash_api::Error::status)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<wgdash_api::Error> for CoreError {
    fn from(err: wgdash_api::Error) -> Self {
        use wgdash_api::Error as ApiError;

        if err.is_auth_failure() {
            return CoreError::AuthenticationFailed {
                message: err.to_string(),
                source: Some(err),
            };
        }
        match err {
            err @ ApiError::InvalidToken { .. } => CoreError::AuthenticationFailed {
                message: err.to_string(),
                source: Some(err),
            },
            ApiError::Transport(e) => {
                if e.is_timeout() {
                    CoreError::Timeout {
                        source: ApiError::Transport(e),
                    }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                        source: Some(ApiError::Transport(e)),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                        detail: None,
                        source: ApiError::Transport(e),
                    }
                }
            }
            err @ ApiError::InvalidUrl(_) => CoreError::Config {
                message: err.to_string(),
                source: Some(err),
            },
            err @ ApiError::Tls(_) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: err.to_string(),
                source: Some(err),
            },
            ApiError::Api {
                status,
                code,
                message,
                detail,
            } => {
                let summary = message.clone();
                let source = ApiError::Api {
                    status,
                    code: code.clone(),
                    message,
                    detail: detail.clone(),
                };
                match status {
                    404 => CoreError::NotFound {
                        message: summary,
                        source,
                    },
                    409 => CoreError::Conflict {
                        message: summary,
                        source,
                    },
                    400 => CoreError::ValidationFailed {
                        message: summary,
                        source,
                    },
                    _ => CoreError::Api {
                        message: summary,
                        code,
                        status: Some(status),
                        detail,
                        source,
                    },
                }
            }
            err @ ApiError::Deserialization { .. } => CoreError::Decode { source: err },
        }
    }
}
