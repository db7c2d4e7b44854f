//! # RACF Administration
//!
//! Idempotent management of RACF users, digital certificates and key rings
//! through TSO commands.
//!
//! ## Features
//!
//! - **Command builders** — LU/AU/DU/CO/RE and RACDCERT LIST, GENCERT,
//!   DELETE, LISTRING, ADDRING, DELRING, CONNECT and REMOVE from sparse,
//!   typed attributes
//! - **Listing parsers** — console text to typed records, with explicit
//!   not-found detection and loud failure on layout drift
//! - **Reconciler** — list, decide, mutate, re-list; check mode plans without
//!   issuing anything
//! - **Executors** — a `tsocmd` process backend and a scripted in-memory console
//!
//! ## Example
//!
//! ```rust
//! use racf_admin::{AdminConfig, DesiredState, Outcome, Reconciler, ScriptedExecutor};
//! use racf_admin::reconcile::KeyRingRequest;
//!
//! let mut console = ScriptedExecutor::new();
//! console
//!     .respond("RACDCERT LISTRING(WEBRING)", "IRRD114I Ring WEBRING does not exist.\n")
//!     .respond(
//!         "RACDCERT LISTRING(WEBRING)",
//!         "Digital ring information for user WEBSRV:\n\n  Ring:\n       >WEBRING<\n  \
//!          *** No certificates connected ***\n",
//!     )
//!     .respond("RACDCERT ADDRING(WEBRING)", "READY\n");
//!
//! let mut reconciler = Reconciler::new(console, AdminConfig::for_user("WEBSRV"));
//! let result = reconciler
//!     .reconcile_keyring(&KeyRingRequest::new("WEBRING", DesiredState::Present))
//!     .unwrap();
//!
//! assert!(result.changed);
//! assert_eq!(result.outcome, Outcome::Created);
//! assert_eq!(result.commands, vec!["RACDCERT ADDRING(WEBRING)"]);
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod exec;
pub mod parse;
pub mod record;
pub mod reconcile;
pub mod types;

pub use config::{AdminConfig, ExecutorConfig};
pub use error::RacfAdminError;
pub use exec::{Executor, ScriptedExecutor, TsoCommandExecutor};
pub use record::{
    CertificateRecord, ConnectedCertificate, GroupConnection, KeyRingRecord, ListStatus, Listing,
    RingAssociation, RingAssociations, UserRecord,
};
pub use reconcile::{Outcome, Reconciled, Reconciler};
pub use types::{ConnectAuthority, DesiredState, ResourceKind, TrustStatus, UserSegment};

/// Convenience result type for RACF administration.
pub type Result<T> = std::result::Result<T, RacfAdminError>;
