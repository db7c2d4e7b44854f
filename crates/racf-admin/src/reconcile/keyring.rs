//! Key ring reconciliation and certificate membership.

use serde::Deserialize;
use tracing::debug;

use super::{Changes, Outcome, Reconciled, Reconciler};
use crate::command::keyring as cmd;
use crate::command::{non_empty, required};
use crate::error::RacfAdminError;
use crate::exec::Executor;
use crate::parse;
use crate::record::{KeyRingRecord, Listing};
use crate::types::{DesiredState, ResourceKind};
use crate::Result;

/// Desired state of one key ring, optionally with one certificate membership.
#[derive(Debug, Clone, Deserialize)]
pub struct KeyRingRequest {
    /// Key ring name.
    pub name: String,
    /// Ring owner; defaults to the acting principal.
    #[serde(default)]
    pub owner: Option<String>,
    /// Desired state.
    pub state: DesiredState,
    /// Owner of the certificate to connect or remove.
    #[serde(default)]
    pub certificate_owner: Option<String>,
    /// Label of the certificate to connect or remove.
    #[serde(default)]
    pub certificate_label: Option<String>,
}

impl KeyRingRequest {
    /// A request for a ring owned by the acting principal.
    pub fn new(name: impl Into<String>, state: DesiredState) -> Self {
        Self {
            name: name.into(),
            owner: None,
            state,
            certificate_owner: None,
            certificate_label: None,
        }
    }

    /// Address a certificate for connect or remove.
    pub fn with_certificate(mut self, owner: Option<&str>, label: impl Into<String>) -> Self {
        self.certificate_owner = owner.map(str::to_string);
        self.certificate_label = Some(label.into());
        self
    }
}

impl<E: Executor> Reconciler<E> {
    /// List one key ring and its connected certificates.
    pub fn list_keyring(
        &mut self,
        name: &str,
        owner: Option<&str>,
    ) -> Result<Listing<KeyRingRecord>> {
        let command = cmd::list(&self.config, name, owner)?;
        let output = self.query(&command)?;
        let hint = non_empty(owner).or(self.config.acting_user.as_deref());
        parse::keyring::parse_listing(&command, &output, name.trim(), hint)
    }

    /// Bring one key ring to the requested state.
    ///
    /// `present` and `connect` both connect the requested certificate when it
    /// is not yet in the ring; `connect` and `remove` require the ring to exist.
    pub fn reconcile_keyring(
        &mut self,
        request: &KeyRingRequest,
    ) -> Result<Reconciled<KeyRingRecord>> {
        let name = request.name.trim();
        let owner = request.owner.as_deref();
        let label = non_empty(request.certificate_label.as_deref());
        let current = self.list_keyring(name, owner)?;
        let mut changes = Changes::default();

        let outcome = match request.state {
            DesiredState::Absent => {
                if current.is_empty() {
                    Outcome::Unchanged
                } else {
                    let command = cmd::delete(&self.config, name, owner)?;
                    self.apply(&mut changes, &command)?;
                    Outcome::Deleted
                }
            }
            DesiredState::Present => {
                let created = current.is_empty();
                if created {
                    let command = cmd::create(&self.config, name, owner)?;
                    self.apply(&mut changes, &command)?;
                }
                let connected = match label {
                    Some(label) => {
                        self.connect_certificate(&mut changes, request, current.first(), label)?
                    }
                    None => false,
                };
                if created {
                    Outcome::Created
                } else if connected {
                    Outcome::ConnectionUpdated
                } else {
                    Outcome::Unchanged
                }
            }
            DesiredState::Connect => {
                let ring = existing(&current, name)?;
                let label = required(label, "connect a certificate", "certificate label")?;
                if self.connect_certificate(&mut changes, request, Some(ring), label)? {
                    Outcome::ConnectionUpdated
                } else {
                    Outcome::Unchanged
                }
            }
            DesiredState::Remove => {
                let ring = existing(&current, name)?;
                let label = required(label, "remove a certificate", "certificate label")?;
                if ring.certificate(label).is_none() {
                    debug!(ring = name, label, "certificate not connected, skipping");
                    Outcome::Unchanged
                } else {
                    let command = cmd::remove(
                        &self.config,
                        name,
                        owner,
                        request.certificate_owner.as_deref(),
                        label,
                    )?;
                    self.apply(&mut changes, &command)?;
                    Outcome::Modified
                }
            }
        };

        let info = if changes.applied() {
            self.list_keyring(name, owner)?
        } else {
            current
        };
        changes.confirm(outcome, &info)?;
        Ok(changes.finish(outcome, info))
    }

    /// Connect `label` unless the ring already holds it. Returns whether a command was planned.
    fn connect_certificate(
        &mut self,
        changes: &mut Changes,
        request: &KeyRingRequest,
        ring: Option<&KeyRingRecord>,
        label: &str,
    ) -> Result<bool> {
        if ring.is_some_and(|r| r.certificate(label).is_some()) {
            debug!(ring = %request.name, label, "certificate already connected, skipping");
            return Ok(false);
        }
        let command = cmd::connect(
            &self.config,
            &request.name,
            request.owner.as_deref(),
            request.certificate_owner.as_deref(),
            label,
        )?;
        self.apply(changes, &command)?;
        Ok(true)
    }
}

fn existing<'a>(current: &'a Listing<KeyRingRecord>, name: &str) -> Result<&'a KeyRingRecord> {
    current.first().ok_or_else(|| RacfAdminError::ResourceMissing {
        kind: ResourceKind::KeyRing.as_str(),
        name: name.to_string(),
    })
}
