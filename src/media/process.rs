/*!
 * Running external tools with a deadline.
 */

use std::time::Duration;

use log::debug;
use tokio::process::Command;

use crate::errors::MediaError;

/// Captured result of a finished tool run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Run `program` with `args`, killing it if it outlives `timeout`
pub async fn run_tool(
    program: &str,
    args: &[String],
    timeout: Duration,
) -> Result<ToolOutput, MediaError> {
    debug!("Running {} {}", program, args.join(" "));

    let tool_future = Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output();

    let output = tokio::select! {
        result = tool_future => {
            result.map_err(|source| MediaError::Spawn {
                program: program.to_string(),
                source,
            })?
        },
        _ = tokio::time::sleep(timeout) => {
            return Err(MediaError::Timeout {
                program: program.to_string(),
                secs: timeout.as_secs(),
            });
        }
    };

    Ok(ToolOutput {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Last `max_lines` non-empty lines of tool output
pub fn tail_lines(text: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let skip = lines.len().saturating_sub(max_lines);
    lines[skip..].join("\n")
}
