//! Idempotent reconciliation of users, certificates and key rings.
//!
//! Every cycle follows the same shape:
//!
//! 1. list the resource (side-effect free);
//! 2. decide from the listing and the desired state;
//! 3. issue at most the commands needed to converge;
//! 4. re-list so the caller sees the resulting state.
//!
//! Nothing is cached between cycles. Two cycles on the same resource must be
//! serialized by the caller.

pub mod certificate;
pub mod keyring;
pub mod user;

use std::fmt;

use serde::Serialize;
use tracing::info;

use crate::command::redact;
use crate::config::AdminConfig;
use crate::error::RacfAdminError;
use crate::exec::{issue, Executor};
use crate::record::Listing;
use crate::Result;

pub use certificate::CertificateRequest;
pub use keyring::KeyRingRequest;
pub use user::UserRequest;

/// Terminal state of one reconciliation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The resource already matched the request.
    Unchanged,
    /// The resource was created.
    Created,
    /// The resource was deleted.
    Deleted,
    /// At least one relation was removed.
    Modified,
    /// At least one relation was added.
    ConnectionUpdated,
}

impl Outcome {
    /// Whether this outcome reports a change.
    pub fn is_change(self) -> bool {
        self != Self::Unchanged
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unchanged => write!(f, "unchanged"),
            Self::Created => write!(f, "created"),
            Self::Deleted => write!(f, "deleted"),
            Self::Modified => write!(f, "modified"),
            Self::ConnectionUpdated => write!(f, "connection updated"),
        }
    }
}

/// Result of one reconciliation cycle.
#[derive(Debug, Clone, Serialize)]
pub struct Reconciled<T> {
    /// Whether any mutating command was issued (or, in check mode, would be).
    pub changed: bool,
    /// What the cycle did.
    pub outcome: Outcome,
    /// The state after the cycle: the re-list when something was applied,
    /// otherwise the initial listing.
    pub info: Listing<T>,
    /// Mutating commands, in issue order, with passwords redacted.
    pub commands: Vec<String>,
    /// Raw output of each mutating command that actually ran.
    pub command_outputs: Vec<String>,
}

/// Mutating commands collected during one cycle.
#[derive(Debug, Default)]
struct Changes {
    commands: Vec<String>,
    outputs: Vec<String>,
}

impl Changes {
    /// Whether at least one command reached the executor.
    fn applied(&self) -> bool {
        !self.outputs.is_empty()
    }

    /// Fail when the re-list contradicts an applied create or delete.
    ///
    /// RACF reports many rejections (unknown group, duplicate label, ...) as
    /// ordinary console text, so the listing is the only reliable verdict.
    fn confirm<T>(&self, outcome: Outcome, info: &Listing<T>) -> Result<()> {
        let contradicted = match outcome {
            Outcome::Created => info.is_empty(),
            Outcome::Deleted => !info.is_empty(),
            _ => false,
        };
        if !contradicted || !self.applied() {
            return Ok(());
        }
        let output = self.outputs.first().map_or("", |o| o.trim());
        Err(RacfAdminError::Execution {
            command: self.commands.first().cloned().unwrap_or_default(),
            message: format!("resource not {outcome} according to '{}': {output}", info.command),
        })
    }

    fn finish<T>(self, outcome: Outcome, info: Listing<T>) -> Reconciled<T> {
        Reconciled {
            changed: outcome.is_change(),
            outcome,
            info,
            commands: self.commands,
            command_outputs: self.outputs,
        }
    }
}

/// Drives list/decide/mutate cycles through an [`Executor`].
#[derive(Debug)]
pub struct Reconciler<E> {
    executor: E,
    config: AdminConfig,
}

impl<E: Executor> Reconciler<E> {
    /// Create a reconciler issuing commands through `executor`.
    pub fn new(executor: E, config: AdminConfig) -> Self {
        Self { executor, config }
    }

    /// The active configuration.
    pub fn config(&self) -> &AdminConfig {
        &self.config
    }

    /// The underlying executor.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Consume the reconciler and return the executor.
    pub fn into_executor(self) -> E {
        self.executor
    }

    /// Issue a side-effect free command.
    fn query(&mut self, command: &str) -> Result<String> {
        issue(&mut self.executor, command)
    }

    /// Issue a mutating command, or only record it in check mode.
    fn apply(&mut self, changes: &mut Changes, command: &str) -> Result<()> {
        let redacted = redact(command);
        if self.config.check_mode {
            info!(command = %redacted, "check mode: command not issued");
            changes.commands.push(redacted);
            return Ok(());
        }

        info!(command = %redacted, "applying RACF change");
        let output = issue(&mut self.executor, command)?;
        changes.commands.push(redacted);
        changes.outputs.push(output);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_change_flag() {
        assert!(!Outcome::Unchanged.is_change());
        for outcome in [
            Outcome::Created,
            Outcome::Deleted,
            Outcome::Modified,
            Outcome::ConnectionUpdated,
        ] {
            assert!(outcome.is_change());
        }
    }

    #[test]
    fn test_outcome_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Outcome::ConnectionUpdated).unwrap(),
            r#""connection_updated""#
        );
    }

    #[test]
    fn test_changes_finish() {
        let changes = Changes {
            commands: vec!["DU BOB".into()],
            outputs: vec!["ok".into()],
        };
        assert!(changes.applied());
        let result: Reconciled<u8> = changes.finish(Outcome::Deleted, Listing::not_found("LU BOB"));
        assert!(result.changed);
        assert_eq!(result.commands, vec!["DU BOB"]);
        assert_eq!(result.command_outputs, vec!["ok"]);
    }

    #[test]
    fn test_confirm_rejects_contradicting_listing() {
        let changes = Changes {
            commands: vec!["AU BOB DFLTGRP(NOGRP)".into()],
            outputs: vec!["IKJ56702I INVALID GROUP, NOGRP\n".into()],
        };
        let missing: Listing<u8> = Listing::not_found("LU BOB");
        match changes.confirm(Outcome::Created, &missing).unwrap_err() {
            RacfAdminError::Execution { command, message } => {
                assert_eq!(command, "AU BOB DFLTGRP(NOGRP)");
                assert!(message.contains("IKJ56702I INVALID GROUP, NOGRP"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(changes.confirm(Outcome::Deleted, &missing).is_ok());
        assert!(changes.confirm(Outcome::Modified, &missing).is_ok());
    }

    #[test]
    fn test_confirm_skips_check_mode() {
        let planned = Changes {
            commands: vec!["DU BOB".into()],
            outputs: Vec::new(),
        };
        let missing: Listing<u8> = Listing::not_found("LU BOB");
        assert!(planned.confirm(Outcome::Created, &missing).is_ok());
    }
}
