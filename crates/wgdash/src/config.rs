//! CLI configuration: thin wrapper around `wgdash_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides (--url,
//! --token, --insecure, ...).

use std::sync::Arc;

use secrecy::SecretString;

use wgdash_core::{SessionConfig, TokenStore};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use wgdash_config::{
    Config, Profile, TokenChain, TokenStoreKind, config_path, load_config,
    load_config_or_default, save_config, token_store_for,
};

/// Everything needed to open a session for one profile.
pub struct ResolvedProfile {
    pub name: String,
    pub session: SessionConfig,
    pub tokens: Arc<dyn TokenStore>,
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// The profile named by flags/config, or a bare one when only `--url`
/// was given.
pub fn active_profile(global: &GlobalOpts, config: &Config) -> Result<(String, Profile), CliError> {
    let name = active_profile_name(global, config);

    if let Some(profile) = config.profiles.get(&name) {
        return Ok((name, profile.clone()));
    }
    if global.url.is_some() {
        return Ok((name, Profile::default()));
    }
    if config.profiles.is_empty() {
        return Err(CliError::NoConfig {
            path: config_path().display().to_string(),
        });
    }

    let mut available: Vec<_> = config.profiles.keys().cloned().collect();
    available.sort();
    Err(CliError::ProfileNotFound {
        name,
        available: available.join(", "),
    })
}

/// Translate the active profile + global flags into session settings.
///
/// CLI flags take priority over profile values.
pub fn resolve(global: &GlobalOpts, config: &Config) -> Result<ResolvedProfile, CliError> {
    let (name, mut profile) = active_profile(global, config)?;

    if let Some(ref url) = global.url {
        profile.url.clone_from(url);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    if global.notify_errors {
        profile.notify_errors = Some(true);
    }

    let session = wgdash_config::profile_to_session_config(&profile, &config.defaults)?;

    let tokens: Arc<dyn TokenStore> = match global.token {
        Some(ref token) => Arc::new(TokenChain::new(
            Some(SecretString::from(token.clone())),
            token_store_for(&profile, &name),
            None,
        )),
        None => Arc::new(wgdash_config::resolve_token_chain(&profile, &name)),
    };

    Ok(ResolvedProfile {
        name,
        session,
        tokens,
    })
}
