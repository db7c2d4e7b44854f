//! User profile reconciliation.

use serde::Deserialize;
use tracing::debug;

use super::{Changes, Outcome, Reconciled, Reconciler};
use crate::command::user::{self as cmd, GroupRequest, UserAttributes};
use crate::command::non_empty;
use crate::error::RacfAdminError;
use crate::exec::Executor;
use crate::parse;
use crate::record::{Listing, UserRecord};
use crate::types::{DesiredState, ResourceKind, UserSegment};
use crate::Result;

/// Desired state of one user profile.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRequest {
    /// User ID.
    pub name: String,
    /// Desired state.
    pub state: DesiredState,
    /// Segments to include in listings.
    #[serde(default)]
    pub segments: Vec<UserSegment>,
    /// Attributes used when the profile is created.
    #[serde(default)]
    pub attributes: UserAttributes,
    /// Group connections to add (present, connect) or remove (remove).
    #[serde(default)]
    pub groups: Vec<GroupRequest>,
}

impl UserRequest {
    /// A request with no segments, attributes or groups.
    pub fn new(name: impl Into<String>, state: DesiredState) -> Self {
        Self {
            name: name.into(),
            state,
            segments: Vec::new(),
            attributes: UserAttributes::default(),
            groups: Vec::new(),
        }
    }

    /// Add a group connection request.
    pub fn with_group(mut self, group: GroupRequest) -> Self {
        self.groups.push(group);
        self
    }
}

impl<E: Executor> Reconciler<E> {
    /// List one user profile with the requested segments.
    pub fn list_user(
        &mut self,
        name: &str,
        segments: &[UserSegment],
    ) -> Result<Listing<UserRecord>> {
        let command = cmd::list(name, segments)?;
        let output = self.query(&command)?;
        parse::user::parse_listing(&command, &output)
    }

    /// Bring one user profile to the requested state.
    pub fn reconcile_user(&mut self, request: &UserRequest) -> Result<Reconciled<UserRecord>> {
        let name = request.name.trim();
        let current = self.list_user(name, &request.segments)?;
        let mut changes = Changes::default();
        // Listing taken right after a create, reused when nothing else was applied.
        let mut created: Option<Listing<UserRecord>> = None;

        let outcome = match request.state {
            DesiredState::Absent => {
                if current.is_empty() {
                    Outcome::Unchanged
                } else {
                    self.apply(&mut changes, &cmd::delete(name)?)?;
                    Outcome::Deleted
                }
            }
            DesiredState::Present => {
                if current.is_empty() {
                    let command = cmd::create(&self.config, name, &request.attributes)?;
                    self.apply(&mut changes, &command)?;
                    // A new profile is connected to its default group only.
                    let mut connected = if changes.applied() {
                        let listing = self.list_user(name, &request.segments)?;
                        changes.confirm(Outcome::Created, &listing)?;
                        let groups = listing.first().map(connected_groups).unwrap_or_default();
                        created = Some(listing);
                        groups
                    } else {
                        non_empty(request.attributes.default_group.as_deref())
                            .map(|g| vec![g.to_ascii_uppercase()])
                            .unwrap_or_default()
                    };
                    if self.connect_groups(&mut changes, name, &request.groups, &mut connected)? {
                        created = None;
                    }
                    Outcome::Created
                } else {
                    let mut connected = current.first().map(connected_groups).unwrap_or_default();
                    if self.connect_groups(&mut changes, name, &request.groups, &mut connected)? {
                        Outcome::ConnectionUpdated
                    } else {
                        Outcome::Unchanged
                    }
                }
            }
            DesiredState::Connect => {
                let mut connected = existing(&current, name)?;
                if self.connect_groups(&mut changes, name, &request.groups, &mut connected)? {
                    Outcome::ConnectionUpdated
                } else {
                    Outcome::Unchanged
                }
            }
            DesiredState::Remove => {
                let mut connected = existing(&current, name)?;
                let mut removed = false;
                for group in &request.groups {
                    let group_name = group.group_name.trim();
                    if !is_listed(&connected, group_name) {
                        debug!(user = name, group = group_name, "not connected, skipping");
                        continue;
                    }
                    self.apply(&mut changes, &cmd::remove(name, group_name)?)?;
                    connected.retain(|c| !c.eq_ignore_ascii_case(group_name));
                    removed = true;
                }
                if removed {
                    Outcome::Modified
                } else {
                    Outcome::Unchanged
                }
            }
        };

        let info = match created {
            Some(listing) => listing,
            None if changes.applied() => self.list_user(name, &request.segments)?,
            None => current,
        };
        changes.confirm(outcome, &info)?;
        Ok(changes.finish(outcome, info))
    }

    /// Connect every requested group not yet connected. Returns whether any command was planned.
    ///
    /// Planned groups join `connected`, so a group requested twice is connected once.
    fn connect_groups(
        &mut self,
        changes: &mut Changes,
        name: &str,
        groups: &[GroupRequest],
        connected: &mut Vec<String>,
    ) -> Result<bool> {
        let mut any = false;
        for group in groups {
            if is_listed(connected, &group.group_name) {
                debug!(user = name, group = %group.group_name, "already connected, skipping");
                continue;
            }
            let command = cmd::connect(&self.config, name, group)?;
            self.apply(changes, &command)?;
            connected.push(group.group_name.trim().to_ascii_uppercase());
            any = true;
        }
        Ok(any)
    }
}

fn connected_groups(user: &UserRecord) -> Vec<String> {
    user.group_connects
        .iter()
        .map(|c| c.group_name.to_ascii_uppercase())
        .collect()
}

fn is_listed(connected: &[String], group: &str) -> bool {
    connected.iter().any(|c| c.eq_ignore_ascii_case(group.trim()))
}

/// Group connections of a user that must already exist.
fn existing(current: &Listing<UserRecord>, name: &str) -> Result<Vec<String>> {
    current
        .first()
        .map(connected_groups)
        .ok_or_else(|| RacfAdminError::ResourceMissing {
            kind: ResourceKind::User.as_str(),
            name: name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AdminConfig;
    use crate::exec::ScriptedExecutor;
    use crate::types::ConnectAuthority;

    const NOT_FOUND: &str = "ICH30001I UNABLE TO LOCATE USER    ENTRY BOB\n";

    fn listing(groups: &[&str]) -> String {
        let mut text = String::from(
            "USER=BOB  NAME=BOB SMITH           OWNER=SYS1      CREATED=24.061\n \
             DEFAULT-GROUP=SYS1     PASSDATE=00.000 PASS-INTERVAL=N/A\n \
             ATTRIBUTES=NONE\n",
        );
        for g in groups {
            text.push_str(&format!(
                "  GROUP={g:<8}  AUTH=USE      CONNECT-OWNER=SYS1      CONNECT-DATE=24.061\n    \
                 CONNECT ATTRIBUTES=NONE\n"
            ));
        }
        text
    }

    fn reconciler(exec: ScriptedExecutor) -> Reconciler<ScriptedExecutor> {
        Reconciler::new(exec, AdminConfig::for_user("ADMIN"))
    }

    #[test]
    fn test_present_creates_then_relists() {
        let mut exec = ScriptedExecutor::new();
        exec.respond("LU BOB", NOT_FOUND)
            .respond("LU BOB", listing(&["SYS1"]))
            .respond("AU BOB DFLTGRP(SYS1) NAME('Bob Smith')", "READY\n");

        let mut request = UserRequest::new("BOB", DesiredState::Present);
        request.attributes.default_group = Some("SYS1".into());
        request.attributes.name = Some("Bob Smith".into());

        let mut r = reconciler(exec);
        let result = r.reconcile_user(&request).unwrap();
        assert!(result.changed);
        assert_eq!(result.outcome, Outcome::Created);
        assert_eq!(result.commands, vec!["AU BOB DFLTGRP(SYS1) NAME('Bob Smith')"]);
        assert_eq!(result.info.first().unwrap().user, "BOB");
        // list, then the listing after the create doubles as the final state
        assert_eq!(r.executor().count("LU BOB"), 2);
    }

    #[test]
    fn test_present_create_with_groups_lists_again() {
        let mut exec = ScriptedExecutor::new();
        exec.respond("LU BOB", NOT_FOUND)
            .respond("LU BOB", listing(&["SYS1"]))
            .respond("LU BOB", listing(&["SYS1", "WEBADM"]))
            .respond("AU BOB DFLTGRP(SYS1)", "READY\n")
            .respond("CO (BOB) GROUP(WEBADM)", "READY\n");

        let mut request =
            UserRequest::new("BOB", DesiredState::Present).with_group(GroupRequest::new("WEBADM"));
        request.attributes.default_group = Some("SYS1".into());

        let mut r = reconciler(exec);
        let result = r.reconcile_user(&request).unwrap();
        assert_eq!(result.outcome, Outcome::Created);
        assert!(result.info.first().unwrap().is_connected_to("WEBADM"));
        assert_eq!(r.executor().count("LU BOB"), 3);
    }

    #[test]
    fn test_present_rejected_create_fails() {
        let mut exec = ScriptedExecutor::new();
        exec.respond("LU BOB", NOT_FOUND)
            .respond("AU BOB DFLTGRP(NOGRP)", "IKJ56702I INVALID GROUP, NOGRP\n");

        let mut request =
            UserRequest::new("BOB", DesiredState::Present).with_group(GroupRequest::new("WEBADM"));
        request.attributes.default_group = Some("NOGRP".into());

        let mut r = reconciler(exec);
        match r.reconcile_user(&request).unwrap_err() {
            RacfAdminError::Execution { command, message } => {
                assert_eq!(command, "AU BOB DFLTGRP(NOGRP)");
                assert!(message.contains("IKJ56702I INVALID GROUP, NOGRP"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(r.executor().count("CO (BOB) GROUP(WEBADM)"), 0);
    }

    #[test]
    fn test_absent_rejected_delete_fails() {
        let mut exec = ScriptedExecutor::new();
        exec.respond("LU BOB", listing(&["SYS1"]))
            .respond("DU BOB", "ICH04005I BOB OWNS PROFILES, NOT DELETED\n");
        let err = reconciler(exec)
            .reconcile_user(&UserRequest::new("BOB", DesiredState::Absent))
            .unwrap_err();
        assert!(matches!(err, RacfAdminError::Execution { .. }));
    }

    #[test]
    fn test_present_existing_is_unchanged() {
        let mut exec = ScriptedExecutor::new();
        exec.respond("LU BOB", listing(&["SYS1"]));
        let mut r = reconciler(exec);
        let result = r
            .reconcile_user(&UserRequest::new("BOB", DesiredState::Present))
            .unwrap();
        assert!(!result.changed);
        assert_eq!(result.outcome, Outcome::Unchanged);
        assert_eq!(r.executor().issued(), ["LU BOB"]);
    }

    #[test]
    fn test_absent_missing_issues_no_delete() {
        let mut exec = ScriptedExecutor::new();
        exec.respond("LU BOB", NOT_FOUND);
        let mut r = reconciler(exec);
        let result = r
            .reconcile_user(&UserRequest::new("BOB", DesiredState::Absent))
            .unwrap();
        assert_eq!(result.outcome, Outcome::Unchanged);
        assert!(result.info.is_not_found());
        assert_eq!(r.executor().count("DU BOB"), 0);
    }

    #[test]
    fn test_absent_deletes_and_relists() {
        let mut exec = ScriptedExecutor::new();
        exec.respond("LU BOB", listing(&["SYS1"]))
            .respond("LU BOB", NOT_FOUND)
            .respond("DU BOB", "READY\n");
        let mut r = reconciler(exec);
        let result = r
            .reconcile_user(&UserRequest::new("BOB", DesiredState::Absent))
            .unwrap();
        assert_eq!(result.outcome, Outcome::Deleted);
        assert!(result.info.is_not_found());
        assert_eq!(result.command_outputs, vec!["READY\n"]);
    }

    #[test]
    fn test_connect_only_missing_groups() {
        let mut exec = ScriptedExecutor::new();
        exec.respond("LU BOB", listing(&["SYS1"]))
            .respond("LU BOB", listing(&["SYS1", "WEBADM"]))
            .respond("CO (BOB) GROUP(WEBADM) AUTHORITY(CONNECT)", "READY\n");

        let mut web = GroupRequest::new("WEBADM");
        web.authority = Some(ConnectAuthority::Connect);
        let request = UserRequest::new("BOB", DesiredState::Connect)
            .with_group(GroupRequest::new("sys1"))
            .with_group(web);

        let mut r = reconciler(exec);
        let result = r.reconcile_user(&request).unwrap();
        assert_eq!(result.outcome, Outcome::ConnectionUpdated);
        assert_eq!(result.commands, vec!["CO (BOB) GROUP(WEBADM) AUTHORITY(CONNECT)"]);
        assert!(result.info.first().unwrap().is_connected_to("WEBADM"));
    }

    #[test]
    fn test_connect_repeated_group_once() {
        let mut exec = ScriptedExecutor::new();
        exec.respond("LU BOB", listing(&["SYS1"]))
            .respond("LU BOB", listing(&["SYS1", "WEB"]))
            .respond("CO (BOB) GROUP(WEB)", "READY\n");
        let request = UserRequest::new("BOB", DesiredState::Connect)
            .with_group(GroupRequest::new("WEB"))
            .with_group(GroupRequest::new("web"));
        let mut r = reconciler(exec);
        let result = r.reconcile_user(&request).unwrap();
        assert_eq!(result.outcome, Outcome::ConnectionUpdated);
        assert_eq!(result.commands, vec!["CO (BOB) GROUP(WEB)"]);
        assert_eq!(r.executor().count("CO (BOB) GROUP(web)"), 0);
    }

    #[test]
    fn test_remove_repeated_group_once() {
        let mut exec = ScriptedExecutor::new();
        exec.respond("LU BOB", listing(&["SYS1", "WEB"]))
            .respond("LU BOB", listing(&["SYS1"]))
            .respond("RE (BOB) GROUP(WEB)", "READY\n");
        let request = UserRequest::new("BOB", DesiredState::Remove)
            .with_group(GroupRequest::new("WEB"))
            .with_group(GroupRequest::new("web"));
        let mut r = reconciler(exec);
        let result = r.reconcile_user(&request).unwrap();
        assert_eq!(result.commands, vec!["RE (BOB) GROUP(WEB)"]);
        assert_eq!(r.executor().count("RE (BOB) GROUP(web)"), 0);
    }

    #[test]
    fn test_connect_already_connected_is_unchanged() {
        let mut exec = ScriptedExecutor::new();
        exec.respond("LU BOB", listing(&["SYS1", "WEBADM"]));
        let request =
            UserRequest::new("BOB", DesiredState::Connect).with_group(GroupRequest::new("WEBADM"));
        let mut r = reconciler(exec);
        let result = r.reconcile_user(&request).unwrap();
        assert!(!result.changed);
        assert!(result.commands.is_empty());
    }

    #[test]
    fn test_connect_missing_user_fails() {
        let mut exec = ScriptedExecutor::new();
        exec.respond("LU BOB", NOT_FOUND);
        let request =
            UserRequest::new("BOB", DesiredState::Connect).with_group(GroupRequest::new("WEBADM"));
        let err = reconciler(exec).reconcile_user(&request).unwrap_err();
        assert!(matches!(err, RacfAdminError::ResourceMissing { kind: "user", .. }));
    }

    #[test]
    fn test_remove_connected_group() {
        let mut exec = ScriptedExecutor::new();
        exec.respond("LU BOB", listing(&["SYS1", "WEBADM"]))
            .respond("LU BOB", listing(&["SYS1"]))
            .respond("RE (BOB) GROUP(WEBADM)", "READY\n");
        let request = UserRequest::new("BOB", DesiredState::Remove)
            .with_group(GroupRequest::new("WEBADM"))
            .with_group(GroupRequest::new("PAYROLL"));
        let mut r = reconciler(exec);
        let result = r.reconcile_user(&request).unwrap();
        assert_eq!(result.outcome, Outcome::Modified);
        assert_eq!(result.commands, vec!["RE (BOB) GROUP(WEBADM)"]);
        assert_eq!(r.executor().count("RE (BOB) GROUP(PAYROLL)"), 0);
    }

    #[test]
    fn test_check_mode_plans_without_issuing() {
        let mut exec = ScriptedExecutor::new();
        exec.respond("LU BOB", NOT_FOUND);
        let mut config = AdminConfig::for_user("ADMIN");
        config.check_mode = true;

        let mut request = UserRequest::new("BOB", DesiredState::Present)
            .with_group(GroupRequest::new("SYS1"))
            .with_group(GroupRequest::new("WEBADM"));
        request.attributes.default_group = Some("SYS1".into());
        request.attributes.password = Some("secret".into());

        let mut r = Reconciler::new(exec, config);
        let result = r.reconcile_user(&request).unwrap();
        assert!(result.changed);
        assert_eq!(result.outcome, Outcome::Created);
        assert_eq!(
            result.commands,
            vec![
                "AU BOB DFLTGRP(SYS1) PASSWORD(********)",
                "CO (BOB) GROUP(WEBADM)",
            ]
        );
        assert!(result.command_outputs.is_empty());
        assert!(result.info.is_not_found());
        assert_eq!(r.executor().issued(), ["LU BOB"]);
    }
}
