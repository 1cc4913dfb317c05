//! Interactive yes/no gate used before destructive cart operations.

use async_trait::async_trait;
use std::io::{BufRead, Write};

/// Asks the user to approve an action.
#[async_trait]
pub trait ConfirmGate: Send + Sync {
    /// Returns `true` only when the user explicitly agreed.
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Answers every prompt with a fixed value. Useful for scripted runs.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

#[async_trait]
impl ConfirmGate for AutoConfirm {
    async fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}

/// Prompts on stdout and reads a `y`/`yes` answer from stdin.
/// Anything else, including EOF or a read error, declines.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConfirm;

#[async_trait]
impl ConfirmGate for StdinConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        let prompt = prompt.to_string();
        let answer = tokio::task::spawn_blocking(move || {
            let mut stdout = std::io::stdout().lock();
            write!(stdout, "{prompt} [y/N] ").ok()?;
            stdout.flush().ok()?;
            let mut line = String::new();
            match std::io::stdin().lock().read_line(&mut line) {
                Ok(0) | Err(_) => None,
                Ok(_) => Some(line),
            }
        })
        .await
        .ok()
        .flatten();

        answer.as_deref().is_some_and(is_yes)
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
