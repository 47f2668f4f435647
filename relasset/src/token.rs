use anyhow::{anyhow, Context, Result};
use log::debug;
use std::env;

/// The env var that a GitHub token is read from when one isn't given explicitly.
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

const PROMPT: &str = "Enter GitHub personal access token: ";

/// Prompts on the terminal for a GitHub personal access token. What the user types is not echoed.
///
/// The token is returned to the caller rather than stored anywhere, so pass it on to
/// [`UploaderBuilder::token`](crate::UploaderBuilder::token).
///
/// # Errors
///
/// Returns an error if the terminal can't be read from or if the user enters an empty token.
pub fn prompt_for_token() -> Result<String> {
    let token =
        rpassword::prompt_password(PROMPT).context("could not read a token from the terminal")?;
    non_empty(token).ok_or_else(|| anyhow!("no token was entered"))
}

pub(crate) fn token_from_env() -> Option<String> {
    let token = env::var(TOKEN_ENV_VAR).ok().and_then(non_empty);
    if token.is_some() {
        debug!("Using GitHub token from the {TOKEN_ENV_VAR} environment variable.");
    } else {
        debug!("The {TOKEN_ENV_VAR} environment variable is not set.");
    }
    token
}

fn non_empty(token: String) -> Option<String> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == token.len() {
        Some(token)
    } else {
        Some(trimmed.to_string())
    }
}
