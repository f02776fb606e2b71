// ── Runtime session configuration ──
//
// Describes *how* to reach a wgrest server. Never touches disk: the CLI
// builds a `SessionConfig` from its profile and hands it in. The access
// token is not part of it; it comes from a `TokenStore`.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;
use wgdash_api::{TlsMode, TransportConfig};

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Configuration for one wgrest deployment.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Service root (e.g. `https://vpn.example.com`).
    pub url: Url,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// Surface every failed request as an error notification before the
    /// authentication check runs.
    pub notify_all_errors: bool,
}

impl SessionConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            notify_all_errors: false,
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
        }
    }
}
