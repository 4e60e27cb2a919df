//! Terminal presentation: colours, the thinking spinner, the action prompt
//! and the clipboard.

use std::io::{BufRead, Write};
use std::time::Duration;
use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};
use crate::suggestion::Suggestion;

pub fn error_style(text: &str) -> ColoredString {
    text.truecolor(0xFF, 0x6B, 0x6B).bold()
}

pub fn success_style(text: &str) -> ColoredString {
    text.truecolor(0x4E, 0xCD, 0xC4).bold()
}

pub fn info_style(text: &str) -> ColoredString {
    text.truecolor(0x45, 0xB7, 0xD1)
}

pub fn command_style(text: &str) -> ColoredString {
    text.truecolor(0x96, 0xCE, 0xB4).bold()
}

/// What the user chose to do with a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Run,
    Copy,
    Retry,
    Exit,
}

impl Action {
    /// Enter runs, `y`/`Y` copies, anything else exits.
    pub fn from_input(input: &str) -> Action {
        match input.trim() {
            "" => Action::Run,
            "y" | "Y" => Action::Copy,
            _ => Action::Exit,
        }
    }

    /// After a failed run: `r`/`R` asks for an alternative, anything else exits.
    pub fn from_retry_input(input: &str) -> Action {
        match input.trim() {
            "r" | "R" => Action::Retry,
            _ => Action::Exit,
        }
    }
}

/// Shows a `Thinking...` spinner on stderr while `work` runs.
pub fn with_spinner<T>(work: impl FnOnce() -> T) -> T {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⣾⣽⣻⢿⡿⣟⣯⣷ ")
            .template(" {spinner:.yellow} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("{}", info_style("Thinking...")));
    spinner.enable_steady_tick(Duration::from_millis(80));
    let result = work();
    spinner.finish_and_clear();
    result
}

pub fn print_suggestion(suggestion: &Suggestion) {
    println!();
    println!(" {} {}", success_style("Suggested command:"), command_style(&suggestion.command));
    if let Some(description) = &suggestion.description {
        println!(" {}", info_style(description));
    }
    println!();
}

/// Prints `message` and reads one line from `input`. EOF reads as empty.
pub fn prompt_line<R: BufRead, W: Write>(message: &str, input: &mut R, out: &mut W) -> Result<String> {
    write!(out, " {}", info_style(message))?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line).context("could not read from stdin")?;
    Ok(line.trim().to_string())
}

pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("clipboard unavailable")?;
    clipboard.set_text(text.to_string()).context("could not set clipboard text")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_action_from_input() {
        assert_eq!(Action::from_input(""), Action::Run);
        assert_eq!(Action::from_input("\n"), Action::Run);
        assert_eq!(Action::from_input("y"), Action::Copy);
        assert_eq!(Action::from_input("Y\n"), Action::Copy);
        assert_eq!(Action::from_input("yes"), Action::Exit);
        assert_eq!(Action::from_input("q"), Action::Exit);
    }

    #[test]
    fn test_retry_input() {
        assert_eq!(Action::from_retry_input("r"), Action::Retry);
        assert_eq!(Action::from_retry_input("R\n"), Action::Retry);
        assert_eq!(Action::from_retry_input(""), Action::Exit);
    }

    #[test]
    fn test_prompt_line() {
        colored::control::set_override(false);
        let mut input = Cursor::new("y\n");
        let mut out = Vec::new();
        let line = prompt_line("Press Enter: ", &mut input, &mut out).unwrap();
        assert_eq!(line, "y");
        assert_eq!(String::from_utf8(out).unwrap(), " Press Enter: ");
    }

    #[test]
    fn test_prompt_line_eof() {
        let mut input = Cursor::new("");
        let mut out = Vec::new();
        assert_eq!(prompt_line("? ", &mut input, &mut out).unwrap(), "");
    }

    #[test]
    fn test_spinner_returns_result() {
        assert_eq!(with_spinner(|| 42), 42);
    }
}
