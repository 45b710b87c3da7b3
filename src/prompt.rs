//! Interactive prompt abstraction
//!
//! Confirmation and input prompts sit behind a trait so the sync engine can
//! run non-interactively (`--yes`) and so tests can script operator answers.

use anyhow::{Context, Result};
use std::io::{BufRead, Write};

/// Provider of operator decisions
pub trait Prompter: Send + Sync {
    /// Ask a yes/no question; `true` means confirmed
    fn confirm(&self, question: &str) -> Result<bool>;

    /// Ask for a free-text value (e.g. a username)
    fn input(&self, question: &str) -> Result<String>;
}

/// Prompter backed by the controlling terminal
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&self, question: &str) -> Result<bool> {
        let answer = read_line(&format!("{} (y/n): ", question))?;
        Ok(answer.trim().eq_ignore_ascii_case("y"))
    }

    fn input(&self, question: &str) -> Result<String> {
        let answer = read_line(&format!("{}: ", question))?;
        Ok(answer.trim().to_string())
    }
}

fn read_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    std::io::stdout().flush().context("Failed to flush stdout")?;

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line)
}

/// Prompter that confirms everything without asking (`--yes` mode)
pub struct AssumeYes;

impl Prompter for AssumeYes {
    fn confirm(&self, _question: &str) -> Result<bool> {
        Ok(true)
    }

    fn input(&self, question: &str) -> Result<String> {
        anyhow::bail!("Input required in non-interactive mode: {}", question)
    }
}
