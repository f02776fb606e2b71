//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use wgdash_config::ConfigError;
use wgdash_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const CANCELLED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to wgrest at {url}")]
    #[diagnostic(
        code(wgdash::connection_failed),
        help(
            "Check that wgrest is running and reachable.\n\
             Reason: {reason}\n\
             Try: wgdash version --url {url}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(wgdash::timeout),
        help("Increase the timeout with --timeout or check the server.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(wgdash::auth_failed),
        help(
            "The server rejected the access token.\n\
             Store a new one with: wgdash config set-token"
        )
    )]
    AuthFailed { message: String },

    #[error("Access token prompt cancelled")]
    #[diagnostic(
        code(wgdash::prompt_cancelled),
        help("The request was not retried and no token was saved.")
    )]
    PromptCancelled,

    #[error("Cannot ask for a new access token: {message}")]
    #[diagnostic(
        code(wgdash::prompt_unavailable),
        help(
            "Run in an interactive terminal, pass --token, or store one with:\n\
             wgdash config set-token <TOKEN>"
        )
    )]
    PromptUnavailable { message: String },

    #[error("Token storage failed: {message}")]
    #[diagnostic(code(wgdash::token_store))]
    TokenStore { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(wgdash::not_found),
        help("Run: wgdash {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Conflict: {message}")]
    #[diagnostic(code(wgdash::conflict))]
    Conflict { message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({code}): {message}")]
    #[diagnostic(code(wgdash::api_error))]
    ApiError { code: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(wgdash::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(wgdash::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: wgdash config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No wgrest server configured")]
    #[diagnostic(
        code(wgdash::no_config),
        help(
            "Create a profile with: wgdash config init\n\
             Or pass --url. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(wgdash::config))]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(wgdash::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(wgdash::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::PromptUnavailable { .. } => exit_code::AUTH,
            Self::PromptCancelled => exit_code::CANCELLED,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::ProfileNotFound { .. }
            | Self::NoConfig { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason, .. } => {
                CliError::ConnectionFailed { url, reason }
            }
            CoreError::Timeout { .. } => CliError::Timeout,
            CoreError::AuthenticationFailed { message, .. } => CliError::AuthFailed { message },
            CoreError::RecoveryCancelled { .. } => CliError::PromptCancelled,
            CoreError::PromptUnavailable { message, .. } => CliError::PromptUnavailable { message },
            CoreError::TokenStore { message } => CliError::TokenStore { message },

            CoreError::DeviceNotFound { name, .. } => CliError::NotFound {
                resource_type: "device".into(),
                identifier: name,
                list_command: "devices list".into(),
            },
            CoreError::PeerNotFound { key, .. } => CliError::NotFound {
                resource_type: "peer".into(),
                identifier: key,
                list_command: "peers list <DEVICE>".into(),
            },
            CoreError::NotFound { message, .. } => CliError::NotFound {
                resource_type: "resource".into(),
                identifier: message,
                list_command: "devices list".into(),
            },

            CoreError::ValidationFailed { message, .. } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::Conflict { message, .. } => CliError::Conflict { message },
            CoreError::Api {
                message,
                code,
                detail,
                ..
            } => CliError::ApiError {
                code: code.unwrap_or_else(|| "unknown".into()),
                message: match detail {
                    Some(detail) if !detail.is_empty() => format!("{message} ({detail})"),
                    _ => message,
                },
            },
            CoreError::Config { message, .. } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Decode { source } => CliError::Internal(source.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovery_outcomes_map_to_distinct_exit_codes() {
        let auth = CliError::from(CoreError::AuthenticationFailed {
            message: "invalid token".into(),
            source: None,
        });
        assert_eq!(auth.exit_code(), exit_code::AUTH);
        assert_eq!(CliError::PromptCancelled.exit_code(), exit_code::CANCELLED);
    }

    #[test]
    fn missing_device_is_not_found() {
        let err = CliError::from(CoreError::DeviceNotFound {
            name: "wg9".into(),
            source: None,
        });
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
        assert_eq!(err.to_string(), "device 'wg9' not found");
    }
}
