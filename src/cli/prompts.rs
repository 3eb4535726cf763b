//! Interactive prompts. Only reachable when the shell runs in interactive mode.

use dialoguer::{theme::ColorfulTheme, Confirm, Password};

use crate::cli::core::CommandError;

pub fn confirm(theme: &ColorfulTheme, question: &str, default: bool) -> Result<bool, CommandError> {
    Ok(Confirm::with_theme(theme)
        .with_prompt(question)
        .default(default)
        .interact()?)
}

/// Reads a password without echo. `repeat` asks twice and requires both to match.
pub fn password(theme: &ColorfulTheme, label: &str, repeat: bool) -> Result<String, CommandError> {
    let prompt = Password::with_theme(theme).with_prompt(label);
    let prompt = if repeat {
        prompt.with_confirmation("Repeat password", "Passwords do not match")
    } else {
        prompt
    };
    Ok(prompt.interact()?)
}
