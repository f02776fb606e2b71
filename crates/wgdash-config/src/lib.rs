//! Shared configuration for wgdash.
//!
//! TOML profiles, access-token storage (file or keyring), the token
//! resolution chain, and translation to `wgdash_core::SessionConfig`.
//! The CLI layers its flag overrides on top.

use std::collections::HashMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;
use tracing::debug;

use wgdash_core::{CoreError, SessionConfig, TlsVerification, TokenStore};

/// Service name used for keyring entries.
const KEYRING_SERVICE: &str = "wgdash";

/// Overrides the config file location when set.
pub const CONFIG_PATH_ENV: &str = "WGDASH_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' not found")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl From<ConfigError> for CoreError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Keyring(message) => CoreError::TokenStore { message },
            ConfigError::Io(e) => CoreError::TokenStore {
                message: e.to_string(),
            },
            other => CoreError::Config {
                message: other.to_string(),
                source: None,
            },
        }
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named wgrest deployments.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile by name.
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Show every failed request as an error notice.
    #[serde(default)]
    pub notify_errors: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            notify_errors: false,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// Where a profile persists its access token.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TokenStoreKind {
    #[default]
    File,
    Keyring,
}

/// A named wgrest deployment.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// wgrest base URL (e.g., "https://vpn.example.com").
    pub url: String,

    /// Access token (plaintext, lowest priority).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Environment variable holding the access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,

    /// Backend for tokens entered at the prompt.
    #[serde(default)]
    pub token_store: TokenStoreKind,

    /// Path to custom CA certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Override `defaults.notify_errors`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_errors: Option<bool>,
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "wgdash", "wgdash")
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("wgdash");
    p
}

/// Resolve the config file path: `$WGDASH_CONFIG`, else platform
/// conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    project_dirs().map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Directory holding file-backed tokens, next to the config file when
/// its location was overridden.
pub fn token_dir() -> PathBuf {
    if std::env::var_os(CONFIG_PATH_ENV).is_some() {
        let path = config_path();
        return path
            .parent()
            .map_or_else(|| PathBuf::from("tokens"), |p| p.join("tokens"));
    }
    project_dirs().map_or_else(
        || dirs_fallback().join("tokens"),
        |dirs| dirs.data_dir().join("tokens"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. Missing files yield the defaults;
/// `WGDASH_` variables (nested with `__`) override file values.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("WGDASH_").ignore(&["CONFIG"]).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(&config_path(), cfg)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Token stores ────────────────────────────────────────────────────

/// One file per profile holding the raw token.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<token_dir>/<profile>.token`
    pub fn for_profile(profile_name: &str) -> Self {
        Self::new(token_dir().join(format!("{profile_name}.token")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<SecretString>, ConfigError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(SecretString::from(token.to_owned())))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write to a sibling temp file, then rename over the target.
    fn write(&self, token: &SecretString) -> Result<(), ConfigError> {
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent)?;

        let tmp = self.path.with_extension("token.tmp");
        {
            let mut file = open_private(&tmp)?;
            file.write_all(token.expose_secret().as_bytes())?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), "token written");
        Ok(())
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<std::fs::File> {
    use std::os::unix::fs::OpenOptionsExt as _;
    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<std::fs::File> {
    std::fs::File::create(path)
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<SecretString>, CoreError> {
        Ok(self.read()?)
    }

    fn save(&self, token: &SecretString) -> Result<(), CoreError> {
        Ok(self.write(token)?)
    }
}

/// Token kept in the system keyring under `wgdash` / `<profile>/token`.
pub struct KeyringTokenStore {
    profile: String,
}

impl KeyringTokenStore {
    pub fn for_profile(profile_name: &str) -> Self {
        Self {
            profile: profile_name.into(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry, ConfigError> {
        keyring::Entry::new(KEYRING_SERVICE, &format!("{}/token", self.profile))
            .map_err(|e| ConfigError::Keyring(e.to_string()))
    }
}

impl TokenStore for KeyringTokenStore {
    fn load(&self) -> Result<Option<SecretString>, CoreError> {
        match self.entry()?.get_password() {
            Ok(secret) => Ok(Some(SecretString::from(secret))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(ConfigError::Keyring(e.to_string()).into()),
        }
    }

    fn save(&self, token: &SecretString) -> Result<(), CoreError> {
        self.entry()?
            .set_password(token.expose_secret())
            .map_err(|e| ConfigError::Keyring(e.to_string()))?;
        Ok(())
    }
}

/// The persistent store a profile writes prompted tokens to.
pub fn token_store_for(profile: &Profile, profile_name: &str) -> Arc<dyn TokenStore> {
    match profile.token_store {
        TokenStoreKind::File => Arc::new(FileTokenStore::for_profile(profile_name)),
        TokenStoreKind::Keyring => Arc::new(KeyringTokenStore::for_profile(profile_name)),
    }
}

// ── Token resolution chain ──────────────────────────────────────────

/// Reads the first token found in: explicit override, the persisted
/// store, the profile's plaintext token. Saves always go to the store.
pub struct TokenChain {
    explicit: Option<SecretString>,
    store: Arc<dyn TokenStore>,
    fallback: Option<SecretString>,
}

impl TokenChain {
    pub fn new(
        explicit: Option<SecretString>,
        store: Arc<dyn TokenStore>,
        fallback: Option<SecretString>,
    ) -> Self {
        Self {
            explicit,
            store,
            fallback,
        }
    }
}

impl TokenStore for TokenChain {
    fn load(&self) -> Result<Option<SecretString>, CoreError> {
        if let Some(ref token) = self.explicit {
            return Ok(Some(token.clone()));
        }
        if let Some(token) = self.store.load()? {
            return Ok(Some(token));
        }
        Ok(self.fallback.clone())
    }

    fn save(&self, token: &SecretString) -> Result<(), CoreError> {
        self.store.save(token)
    }
}

/// Build the token chain for a profile (no CLI flag step): the
/// `token_env` variable, then the profile's store, then `token`.
pub fn resolve_token_chain(profile: &Profile, profile_name: &str) -> TokenChain {
    resolve_token_chain_with(profile, token_store_for(profile, profile_name), |name| {
        std::env::var(name).ok()
    })
}

fn resolve_token_chain_with(
    profile: &Profile,
    store: Arc<dyn TokenStore>,
    lookup: impl Fn(&str) -> Option<String>,
) -> TokenChain {
    let explicit = profile
        .token_env
        .as_deref()
        .and_then(lookup)
        .filter(|v| !v.is_empty())
        .map(SecretString::from);
    let fallback = profile.token.clone().map(SecretString::from);
    TokenChain::new(explicit, store, fallback)
}

// ── Session config ──────────────────────────────────────────────────

/// Build a `SessionConfig` from a profile and the global defaults.
pub fn profile_to_session_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<SessionConfig, ConfigError> {
    let url: url::Url = profile.url.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {}", profile.url),
    })?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let mut config = SessionConfig::new(url);
    config.tls = tls;
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.notify_all_errors = profile.notify_errors.unwrap_or(defaults.notify_errors);
    Ok(config)
}
