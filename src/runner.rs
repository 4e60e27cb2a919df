use std::process::{Command, Stdio};
use anyhow::{bail, Context, Result};
use tracing::debug;

/// Splits a command line on whitespace. No shell quoting is interpreted.
pub fn split_command(command: &str) -> Vec<&str> {
    command.split_whitespace().collect()
}

/// Runs `command` with the terminal's stdin, stdout and stderr.
///
/// An empty command is a no-op. Spawn failures and non-zero exits are
/// errors; their message is what the retry prompt feeds back to the model.
pub fn run_command(command: &str) -> Result<()> {
    let parts = split_command(command);
    let Some((program, args)) = parts.split_first() else {
        return Ok(());
    };
    debug!(program, ?args, "running suggested command");
    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .with_context(|| format!("could not start `{program}`"))?;
    if !status.success() {
        bail!("`{command}` exited with {status}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_command() {
        assert_eq!(split_command("  ls   -la /tmp "), vec!["ls", "-la", "/tmp"]);
        assert!(split_command("   ").is_empty());
    }

    #[test]
    fn test_empty_command_is_noop() {
        run_command("").unwrap();
    }

    #[test]
    fn test_missing_program() {
        let err = run_command("definitely-not-a-real-program-xyz --flag").unwrap_err();
        assert!(format!("{err:#}").contains("could not start"));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_status() {
        run_command("true").unwrap();
        let err = run_command("false").unwrap_err();
        assert!(err.to_string().contains("exited with"));
    }
}
