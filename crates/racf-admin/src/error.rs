//! RACF administration error types.

use miette::Diagnostic;
use thiserror::Error;

/// Errors produced while driving RACF through TSO commands.
///
/// A resource that does not exist is not an error: listings report it through
/// [`ListStatus::NotFound`](crate::record::ListStatus::NotFound).
#[derive(Debug, Error, Diagnostic)]
pub enum RacfAdminError {
    /// The command could not be started or did not complete.
    #[error("failed to execute '{command}': {message}")]
    #[diagnostic(code(racf_admin::execution))]
    Execution {
        /// The command text handed to the executor.
        command: String,
        /// The underlying failure.
        message: String,
    },

    /// The command ran but wrote nothing to stdout.
    #[error("command '{command}' returned no output")]
    #[diagnostic(
        code(racf_admin::no_output),
        help("Check that the TSO command wrapper is installed and the session is authorized")
    )]
    NoOutput {
        /// The command text handed to the executor.
        command: String,
    },

    /// RACF rejected the command for lack of authority.
    #[error("not authorized to run '{command}': {message}")]
    #[diagnostic(code(racf_admin::not_authorized))]
    NotAuthorized {
        /// The command text handed to the executor.
        command: String,
        /// The RACF message line that reported the rejection.
        message: String,
    },

    /// The command output did not match the expected listing format.
    #[error("unexpected {resource} listing format: {detail}")]
    #[diagnostic(
        code(racf_admin::format_mismatch),
        help("The RACF output layout differs from the one this release parses")
    )]
    FormatMismatch {
        /// The kind of listing being parsed.
        resource: &'static str,
        /// What diverged.
        detail: String,
    },

    /// A field required to build the command was not supplied.
    #[error("{field} is mandatory to {operation}")]
    #[diagnostic(code(racf_admin::mandatory_field))]
    MandatoryFieldMissing {
        /// The operation that was requested.
        operation: &'static str,
        /// The missing field.
        field: &'static str,
    },

    /// A relation change targets a resource that does not exist.
    #[error("{kind} '{name}' does not exist")]
    #[diagnostic(code(racf_admin::resource_missing))]
    ResourceMissing {
        /// The resource kind.
        kind: &'static str,
        /// The resource name.
        name: String,
    },

    /// The requested state does not apply to the resource kind.
    #[error("{kind} does not support state '{state}'")]
    #[diagnostic(
        code(racf_admin::unsupported_state),
        help("Certificates accept only present and absent")
    )]
    UnsupportedState {
        /// The resource kind.
        kind: &'static str,
        /// The requested state.
        state: crate::types::DesiredState,
    },

    /// Configuration could not be loaded.
    #[error("invalid configuration: {message}")]
    #[diagnostic(code(racf_admin::config))]
    Config {
        /// The error description.
        message: String,
    },
}

impl RacfAdminError {
    pub(crate) fn format_mismatch(resource: &'static str, detail: impl Into<String>) -> Self {
        Self::FormatMismatch {
            resource,
            detail: detail.into(),
        }
    }
}
