//! Prompt helpers for the create/edit forms.

use crate::error::{ConsoleError, ConsoleResult};
use crate::terminal::Terminal;

fn cancelled() -> ConsoleError {
    ConsoleError::usage("Cancelled")
}

/// Asks for a value. End of input cancels the form.
pub async fn ask(term: &mut dyn Terminal, label: &str) -> ConsoleResult<String> {
    let line = term.read_line(&format!("{}: ", label)).await?;
    line.map(|l| l.trim().to_string()).ok_or_else(cancelled)
}

/// Asks for a value, keeping `current` when the answer is blank.
pub async fn ask_default(term: &mut dyn Terminal, label: &str, current: &str) -> ConsoleResult<String> {
    let answer = term
        .read_line(&format!("{} [{}]: ", label, current))
        .await?
        .ok_or_else(cancelled)?;
    let answer = answer.trim();
    if answer.is_empty() {
        Ok(current.to_string())
    } else {
        Ok(answer.to_string())
    }
}

pub async fn ask_secret(term: &mut dyn Terminal, label: &str) -> ConsoleResult<String> {
    term.read_secret(&format!("{}: ", label))
        .await?
        .ok_or_else(cancelled)
}

/// `y` or `yes` confirms; anything else, including end of input, declines.
pub async fn confirm(term: &mut dyn Terminal, question: &str) -> ConsoleResult<bool> {
    let answer = term.read_line(&format!("{} [y/N]: ", question)).await?;
    Ok(matches!(
        answer.as_deref().map(|a| a.trim().to_lowercase()).as_deref(),
        Some("y") | Some("yes")
    ))
}
