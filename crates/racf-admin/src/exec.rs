//! Command execution — the seam between command text and captured console output.
//!
//! The [`Executor`] trait is implemented by the host environment. Two
//! providers ship with the crate:
//!
//! - [`TsoCommandExecutor`] runs each command through a TSO wrapper program
//!   (`tsocmd` by default) and captures its stdout verbatim.
//! - [`ScriptedExecutor`] replays canned console output, for tests and dry runs.

use std::collections::{HashMap, VecDeque};
use std::process::Command;

use tracing::{debug, warn};

use crate::command::redact;
use crate::config::ExecutorConfig;
use crate::error::RacfAdminError;
use crate::parse::message_line;
use crate::Result;

/// Phrase of the RACF and TSO messages that reject a command for lack of authority.
const NOT_AUTHORIZED: &str = "NOT AUTHORIZED";

/// Runs one administrative command in a privileged session.
///
/// Implementations must return stdout exactly as produced, whitespace
/// included; listing parsers slice fixed columns out of it.
pub trait Executor {
    /// Run `command` and return its captured output.
    fn run(&mut self, command: &str) -> Result<String>;
}

impl<E: Executor + ?Sized> Executor for &mut E {
    fn run(&mut self, command: &str) -> Result<String> {
        (**self).run(command)
    }
}

/// Run a command and screen its output for execution-level failures.
///
/// Empty output and RACF authority rejections are surfaced as errors so they
/// are never mistaken for an absent resource.
pub fn issue<E: Executor + ?Sized>(executor: &mut E, command: &str) -> Result<String> {
    debug!(command = %redact(command), "issuing RACF command");
    let output = executor.run(command)?;

    if output.trim().is_empty() {
        return Err(RacfAdminError::NoOutput {
            command: redact(command),
        });
    }

    if let Some(line) = message_line(&output, NOT_AUTHORIZED) {
        warn!(command = %redact(command), message = line, "RACF rejected command");
        return Err(RacfAdminError::NotAuthorized {
            command: redact(command),
            message: line.to_string(),
        });
    }

    Ok(output)
}

// ---------------------------------------------------------------------------
//  TSO wrapper program
// ---------------------------------------------------------------------------

/// Executes commands through an external TSO wrapper program.
///
/// The command text is passed as a single argument, never through a shell.
#[derive(Debug, Clone)]
pub struct TsoCommandExecutor {
    program: String,
}

impl TsoCommandExecutor {
    /// Create an executor that invokes `program <command>`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Create an executor from configuration.
    pub fn from_config(config: &ExecutorConfig) -> Self {
        Self::new(config.program.clone())
    }

    /// The wrapper program name.
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for TsoCommandExecutor {
    fn default() -> Self {
        Self::from_config(&ExecutorConfig::default())
    }
}

impl Executor for TsoCommandExecutor {
    fn run(&mut self, command: &str) -> Result<String> {
        let output = Command::new(&self.program)
            .arg(command)
            .output()
            .map_err(|e| RacfAdminError::Execution {
                command: redact(command),
                message: format!("{}: {}", self.program, e),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            // TSO reports command-level failures with a non-zero rc and a
            // message on stdout; the listing parsers interpret those.
            debug!(
                program = %self.program,
                status = ?output.status.code(),
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "TSO wrapper exited with non-zero status"
            );
        }
        Ok(stdout)
    }
}

// ---------------------------------------------------------------------------
//  Scripted console
// ---------------------------------------------------------------------------

/// In-memory executor that replays canned console output per command.
///
/// Responses queued for a command are returned in order; the last one keeps
/// being returned once the queue is down to a single entry. Every command
/// received is recorded, in order.
#[derive(Debug, Clone, Default)]
pub struct ScriptedExecutor {
    responses: HashMap<String, VecDeque<String>>,
    issued: Vec<String>,
}

impl ScriptedExecutor {
    /// Create a scripted executor with no responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `output` as the next response to `command`.
    pub fn respond(&mut self, command: impl Into<String>, output: impl Into<String>) -> &mut Self {
        self.responses
            .entry(command.into())
            .or_default()
            .push_back(output.into());
        self
    }

    /// Commands received so far, in order.
    pub fn issued(&self) -> &[String] {
        &self.issued
    }

    /// Number of times `command` was received.
    pub fn count(&self, command: &str) -> usize {
        self.issued.iter().filter(|c| c.as_str() == command).count()
    }
}

impl Executor for ScriptedExecutor {
    fn run(&mut self, command: &str) -> Result<String> {
        self.issued.push(command.to_string());
        let queue = self
            .responses
            .get_mut(command)
            .ok_or_else(|| RacfAdminError::Execution {
                command: redact(command),
                message: "no scripted response".to_string(),
            })?;
        let output = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        output.ok_or_else(|| RacfAdminError::Execution {
            command: redact(command),
            message: "no scripted response".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_replays_in_order_then_repeats_last() {
        let mut exec = ScriptedExecutor::new();
        exec.respond("LU BOB", "first").respond("LU BOB", "second");
        assert_eq!(exec.run("LU BOB").unwrap(), "first");
        assert_eq!(exec.run("LU BOB").unwrap(), "second");
        assert_eq!(exec.run("LU BOB").unwrap(), "second");
        assert_eq!(exec.count("LU BOB"), 3);
    }

    #[test]
    fn test_scripted_unknown_command() {
        let mut exec = ScriptedExecutor::new();
        let err = exec.run("DU BOB").unwrap_err();
        assert!(matches!(err, RacfAdminError::Execution { .. }));
        assert_eq!(exec.issued(), ["DU BOB".to_string()]);
    }

    #[test]
    fn test_issue_empty_output_is_error() {
        let mut exec = ScriptedExecutor::new();
        exec.respond("LU BOB", "  \n");
        let err = issue(&mut exec, "LU BOB").unwrap_err();
        assert!(matches!(err, RacfAdminError::NoOutput { .. }));
    }

    #[test]
    fn test_issue_not_authorized() {
        let mut exec = ScriptedExecutor::new();
        exec.respond("LU BOB", "LU BOB\nICH30009I NOT AUTHORIZED TO LIST BOB\n");
        match issue(&mut exec, "LU BOB").unwrap_err() {
            RacfAdminError::NotAuthorized { message, .. } => {
                assert_eq!(message, "ICH30009I NOT AUTHORIZED TO LIST BOB");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_issue_ignores_phrase_outside_messages() {
        let listing = "USER=BOB  NAME=NOT AUTHORIZED      OWNER=SYS1      CREATED=24.061\n";
        let mut exec = ScriptedExecutor::new();
        exec.respond("LU BOB", listing);
        assert_eq!(issue(&mut exec, "LU BOB").unwrap(), listing);
    }

    #[test]
    fn test_issue_redacts_password_in_errors() {
        let mut exec = ScriptedExecutor::new();
        let err = issue(&mut exec, "AU BOB PASSWORD(SECRET1)").unwrap_err();
        assert!(err.to_string().contains("PASSWORD(********)"));
        assert!(!err.to_string().contains("SECRET1"));
    }

    #[test]
    fn test_tso_executor_missing_program() {
        let mut exec = TsoCommandExecutor::new("/nonexistent/racf-admin-tsocmd");
        let err = exec.run("LU BOB").unwrap_err();
        assert!(matches!(err, RacfAdminError::Execution { .. }));
    }

    #[test]
    fn test_mut_ref_is_executor() {
        let mut exec = ScriptedExecutor::new();
        exec.respond("DU BOB", "done");
        {
            let mut borrowed = &mut exec;
            assert_eq!(issue(&mut borrowed, "DU BOB").unwrap(), "done");
        }
        assert_eq!(exec.issued().len(), 1);
    }
}
