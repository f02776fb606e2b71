//! Config subcommand handlers.

use std::fmt::Write as _;

use dialoguer::{Confirm, Input, Select};
use secrecy::{ExposeSecret, SecretString};
use wgdash_core::TokenStore;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile, TokenStoreKind};
use crate::error::CliError;
use crate::output;
use crate::prompt;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display. Expects tokens to be masked already.
///
/// `env_set` reports whether a `token_env` variable is present; a present
/// variable is read before the saved token, so that is called out.
fn format_config(cfg: &Config, env_set: impl Fn(&str) -> bool) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "notify_errors = {}", cfg.defaults.notify_errors);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "url = \"{}\"", p.url);
        let _ = writeln!(out, "token_store = \"{}\"", p.token_store);
        if let Some(ref token) = p.token {
            let _ = writeln!(out, "token = \"{token}\"");
        }
        if let Some(ref env) = p.token_env {
            let _ = writeln!(out, "token_env = \"{env}\"");
            if env_set(env) {
                let _ = writeln!(out, "# ${env} is set and overrides the saved token");
            }
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(notify) = p.notify_errors {
            let _ = writeln!(out, "notify_errors = {notify}");
        }
    }
    out
}

fn env_is_set(name: &str) -> bool {
    std::env::var(name).is_ok_and(|v| !v.is_empty())
}

fn redact(cfg: &mut Config) {
    for profile in cfg.profiles.values_mut() {
        if profile.token.is_some() {
            profile.token = Some("****".into());
        }
    }
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn store_token(profile: &Profile, profile_name: &str, token: &SecretString) -> Result<(), CliError> {
    if token.expose_secret().is_empty() {
        return Err(CliError::Validation {
            field: "token".into(),
            reason: "token cannot be empty".into(),
        });
    }
    config::token_store_for(profile, profile_name).save(token)?;
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("wgdash configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let mut cfg = config::load_config_or_default();

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let url: String = Input::new()
                .with_prompt("wgrest URL")
                .default("http://127.0.0.1:8000".into())
                .interact_text()
                .map_err(prompt_err)?;

            let store_choices = &[
                "Token file in the data directory (0600)",
                "System keyring",
            ];
            let token_store = match Select::new()
                .with_prompt("Where should access tokens be stored?")
                .items(store_choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?
            {
                0 => TokenStoreKind::File,
                _ => TokenStoreKind::Keyring,
            };

            let profile = Profile {
                url,
                token_store,
                ..Profile::default()
            };
            // Validate before anything is written.
            wgdash_config::profile_to_session_config(&profile, &cfg.defaults)?;

            let store_now = Confirm::new()
                .with_prompt("Enter an access token now?")
                .default(true)
                .interact()
                .map_err(prompt_err)?;
            if store_now {
                let token = prompt::read_token("Access token")
                    .map_err(|e| CliError::PromptUnavailable { message: e.0 })?;
                store_token(&profile, &profile_name, &token)?;
                eprintln!("   ✓ Token stored ({token_store})");
            }

            if cfg.profiles.is_empty() || cfg.default_profile.is_none() {
                cfg.default_profile = Some(profile_name.clone());
            }
            cfg.profiles.insert(profile_name.clone(), profile);
            config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Profile: {profile_name}");
            eprintln!("\n  Test it: wgdash version -p {profile_name}");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let mut cfg = config::load_config()?;
            redact(&mut cfg);
            let out = output::render_single(
                &global.output,
                &cfg,
                |cfg| format_config(cfg, env_is_set),
                |_| "config".into(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        // ── Set-token ───────────────────────────────────────────────
        ConfigCommand::SetToken { token } => {
            let cfg = config::load_config_or_default();
            let (profile_name, profile) = config::active_profile(global, &cfg)?;

            let token = match token {
                Some(token) => SecretString::from(token),
                None => prompt::read_token("Access token")
                    .map_err(|e| CliError::PromptUnavailable { message: e.0 })?,
            };
            store_token(&profile, &profile_name, &token)?;

            if !global.quiet {
                eprintln!(
                    "✓ Token saved for profile '{profile_name}' ({})",
                    profile.token_store
                );
                if let Some(env) = profile.token_env.as_deref().filter(|e| env_is_set(e)) {
                    eprintln!("  Note: ${env} is set and will be used instead until it is unset");
                }
            }
            Ok(())
        }
    }
}
