//! Certificate reconciliation, including the per-certificate ring lookup.

use serde::Deserialize;
use tracing::debug;

use super::{Changes, Outcome, Reconciled, Reconciler};
use crate::command::certificate::{self as cmd, effective_label, DistinguishedName};
use crate::command::required;
use crate::error::RacfAdminError;
use crate::exec::Executor;
use crate::parse;
use crate::record::{CertificateRecord, Listing, RingAssociations};
use crate::types::{DesiredState, ResourceKind};
use crate::Result;

/// Desired state of one certificate.
#[derive(Debug, Clone, Deserialize)]
pub struct CertificateRequest {
    /// Certificate label; defaults to the subject common name.
    #[serde(default)]
    pub label: Option<String>,
    /// Owning user; defaults to the acting principal.
    #[serde(default)]
    pub owner: Option<String>,
    /// Subject name used when the certificate is generated.
    #[serde(default)]
    pub subject: DistinguishedName,
    /// Desired state (present or absent).
    pub state: DesiredState,
}

impl CertificateRequest {
    /// A request addressed by label.
    pub fn new(label: impl Into<String>, state: DesiredState) -> Self {
        Self {
            label: Some(label.into()),
            owner: None,
            subject: DistinguishedName::default(),
            state,
        }
    }

    /// The label the certificate is addressed by.
    pub fn effective_label(&self) -> Option<&str> {
        effective_label(self.label.as_deref(), &self.subject)
    }
}

impl<E: Executor> Reconciler<E> {
    /// List certificates, optionally narrowed to one label, and resolve ring associations.
    ///
    /// Each certificate that reports associations costs one extra listing.
    pub fn list_certificates(
        &mut self,
        label: Option<&str>,
        owner: Option<&str>,
    ) -> Result<Listing<CertificateRecord>> {
        let command = cmd::list(&self.config, label, owner);
        let output = self.query(&command)?;
        let mut listing = parse::certificate::parse_listing(&command, &output)?;

        for record in &mut listing.records {
            if let RingAssociations::Rings(rings) = &mut record.ring_associations {
                let lookup = cmd::list(
                    &self.config,
                    Some(record.label.as_str()),
                    Some(record.user.as_str()),
                );
                debug!(label = %record.label, "resolving ring associations");
                let text = self.query(&lookup)?;
                *rings = parse::certificate::parse_ring_associations(&text)?;
            }
        }

        Ok(listing)
    }

    /// Bring one certificate to the requested state.
    pub fn reconcile_certificate(
        &mut self,
        request: &CertificateRequest,
    ) -> Result<Reconciled<CertificateRecord>> {
        let owner = request.owner.as_deref();
        let label = request.effective_label();
        let mut changes = Changes::default();

        let (current, outcome) = match request.state {
            DesiredState::Present => {
                // Listing without a label would match every certificate of the owner.
                let label = required(label, "generate a certificate", "certificate label")?;
                let current = self.list_certificates(Some(label), owner)?;
                if current.is_empty() {
                    let create = cmd::create(&self.config, &request.subject, Some(label), owner)?;
                    self.apply(&mut changes, &create)?;
                    (current, Outcome::Created)
                } else {
                    (current, Outcome::Unchanged)
                }
            }
            DesiredState::Absent => {
                let delete = cmd::delete(&self.config, label, owner)?;
                let current = self.list_certificates(label, owner)?;
                if current.is_empty() {
                    (current, Outcome::Unchanged)
                } else {
                    self.apply(&mut changes, &delete)?;
                    (current, Outcome::Deleted)
                }
            }
            state @ (DesiredState::Connect | DesiredState::Remove) => {
                return Err(RacfAdminError::UnsupportedState {
                    kind: ResourceKind::Certificate.as_str(),
                    state,
                });
            }
        };

        let info = if changes.applied() {
            self.list_certificates(label, owner)?
        } else {
            current
        };
        changes.confirm(outcome, &info)?;
        Ok(changes.finish(outcome, info))
    }
}
