//! Interactive access-token prompt.

use std::io::IsTerminal;

use dialoguer::Password;
use dialoguer::theme::ColorfulTheme;
use secrecy::SecretString;

use wgdash_core::{PromptError, TokenPrompt};

/// Asks for a replacement token on the terminal. Input is hidden; an
/// empty answer cancels.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl TokenPrompt for TerminalPrompt {
    fn request_token(&self) -> Result<Option<SecretString>, PromptError> {
        if !std::io::stdin().is_terminal() || !std::io::stderr().is_terminal() {
            return Err(PromptError("stdin is not an interactive terminal".into()));
        }

        eprintln!("The server rejected the access token.");
        let input = Password::with_theme(&ColorfulTheme::default())
            .with_prompt("New access token (leave empty to cancel)")
            .allow_empty_password(true)
            .interact()
            .map_err(|e| PromptError(e.to_string()))?;

        let token = input.trim();
        if token.is_empty() {
            Ok(None)
        } else {
            Ok(Some(SecretString::from(token.to_owned())))
        }
    }
}

/// Read a token outside the recovery flow (`config set-token`).
pub fn read_token(prompt: &str) -> Result<SecretString, PromptError> {
    let input = Password::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .interact()
        .map_err(|e| PromptError(e.to_string()))?;
    Ok(SecretString::from(input.trim().to_owned()))
}
