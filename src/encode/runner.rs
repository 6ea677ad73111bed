use std::process::{Command, Output};

use crate::foundation::error::{ReviewError, ReviewResult};

/// Runs an assembled encoder command line.
pub trait EncoderRunner {
    /// Run `command_line` to completion. A failed run is an [`crate::ReviewError::Encode`].
    fn run(&self, command_line: &str) -> ReviewResult<()>;
}

/// Runs commands through the platform shell and waits for them to exit.
#[derive(Clone, Copy, Debug, Default)]
pub struct ShellRunner;

impl EncoderRunner for ShellRunner {
    #[tracing::instrument(level = "debug", skip(self))]
    fn run(&self, command_line: &str) -> ReviewResult<()> {
        let mut cmd = shell_command(command_line);
        let output = cmd.output().map_err(|e| {
            ReviewError::encode(format!("failed to spawn shell for encoder: {e}"))
        })?;
        log_output(&output);
        if !output.status.success() {
            return Err(ReviewError::encode(format!(
                "encoder exited with status {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

/// Logs commands instead of running them. Used when only planning.
#[derive(Clone, Copy, Debug, Default)]
pub struct DryRunRunner;

impl EncoderRunner for DryRunRunner {
    fn run(&self, command_line: &str) -> ReviewResult<()> {
        tracing::info!(command = command_line, "dry run, encoder not started");
        Ok(())
    }
}

#[cfg(windows)]
fn shell_command(command_line: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command_line);
    cmd
}

#[cfg(not(windows))]
fn shell_command(command_line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command_line);
    cmd
}

/// Command for a tool configured as invocation tokens, e.g. `["oiiotool"]`.
pub(crate) fn tool_command(tokens: &[String]) -> ReviewResult<Command> {
    let (exe, args) = tokens
        .split_first()
        .ok_or_else(|| ReviewError::validation("tool invocation is empty"))?;
    let mut cmd = Command::new(exe);
    cmd.args(args);
    Ok(cmd)
}

/// Run `cmd` to completion and return its stdout; a non-zero exit is an error.
pub(crate) fn run_tool(mut cmd: Command, what: &str) -> ReviewResult<Vec<u8>> {
    let output = cmd
        .output()
        .map_err(|e| ReviewError::encode(format!("failed to run {what}: {e}")))?;
    if !output.status.success() {
        return Err(ReviewError::encode(format!(
            "{what} exited with status {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(output.stdout)
}

fn log_output(output: &Output) {
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.trim().is_empty() {
        tracing::debug!(stdout = %stdout.trim(), "encoder stdout");
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        tracing::debug!(stderr = %stderr.trim(), "encoder stderr");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/runner.rs"]
mod tests;
