//! User profile commands — LISTUSER (LU), ADDUSER (AU), DELUSER (DU),
//! CONNECT (CO) and REMOVE (RE).

use serde::{Deserialize, Serialize};

use super::{
    group_clause, join_clauses, keyword, non_empty, numeric_keyword, quoted_keyword, required,
};
use crate::config::AdminConfig;
use crate::types::{ConnectAuthority, UserSegment};
use crate::Result;

/// Value of the OMVS `uid` attribute that requests RACF-assigned UIDs.
pub const AUTO_UID: &str = "auto";

/// Attributes for a new user profile. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserAttributes {
    /// DFLTGRP — default group.
    pub default_group: Option<String>,
    /// NAME — the user's name.
    pub name: Option<String>,
    /// OWNER — owner of the profile.
    pub owner: Option<String>,
    /// PASSWORD — initial password. Takes precedence over `no_password`.
    pub password: Option<String>,
    /// NOPASSWORD — protected user with no password.
    pub no_password: bool,
    /// OMVS segment.
    pub omvs: Option<OmvsAttributes>,
    /// TSO segment.
    pub tso: Option<TsoAttributes>,
    /// DFP segment.
    pub dfp: Option<DfpAttributes>,
}

/// OMVS segment attributes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OmvsAttributes {
    /// UID, or `auto` for AUTOUID.
    pub uid: Option<String>,
    pub home: Option<String>,
    pub program: Option<String>,
    pub cputimemax: Option<String>,
    pub assizemax: Option<String>,
    pub fileprocmax: Option<String>,
    pub procusermax: Option<String>,
    pub threadsmax: Option<String>,
    pub mmapareamax: Option<String>,
}

/// TSO segment attributes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TsoAttributes {
    pub acctnum: Option<String>,
    pub dest: Option<String>,
    pub holdclass: Option<String>,
    pub msgclass: Option<String>,
    /// PROC — logon procedure.
    #[serde(rename = "proc")]
    pub logon_proc: Option<String>,
    pub size: Option<String>,
    pub maxsize: Option<String>,
    pub sysoutclass: Option<String>,
    pub userdata: Option<String>,
    pub command: Option<String>,
}

/// DFP segment attributes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DfpAttributes {
    pub dataappl: Option<String>,
    pub dataclas: Option<String>,
    pub mgmtclas: Option<String>,
    pub storclas: Option<String>,
}

/// A requested group connection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupRequest {
    /// The group to connect to (the relation key).
    pub group_name: String,
    /// AUTHORITY — connect authority.
    pub authority: Option<ConnectAuthority>,
    /// OWNER — owner of the connect entry.
    pub owner: Option<String>,
}

impl GroupRequest {
    /// Request a plain connection to `group`.
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            group_name: group.into(),
            ..Self::default()
        }
    }
}

/// `LU <name> [<segment> ...]`
pub fn list(name: &str, segments: &[UserSegment]) -> Result<String> {
    let name = required(Some(name), "list a user", "user name")?;
    let mut command = format!("LU {name}");
    for segment in segments {
        command.push(' ');
        command.push_str(segment.keyword());
    }
    Ok(command)
}

/// `AU <name> [DFLTGRP(..)] [NAME('..')] [OWNER(..)] [PASSWORD(..)|NOPASSWORD] [OMVS(..)] [TSO(..)] [DFP(..)]`
pub fn create(config: &AdminConfig, name: &str, attrs: &UserAttributes) -> Result<String> {
    let name = required(Some(name), "create a user", "user name")?;
    let password = match non_empty(attrs.password.as_deref()) {
        Some(pw) => Some(format!("PASSWORD({pw})")),
        None if attrs.no_password => Some("NOPASSWORD".to_string()),
        None => None,
    };
    let clauses = join_clauses([
        keyword("DFLTGRP", attrs.default_group.as_deref()),
        quoted_keyword("NAME", attrs.name.as_deref()),
        keyword("OWNER", config.explicit_owner(attrs.owner.as_deref())),
        password,
        attrs.omvs.as_ref().and_then(omvs_clause),
        attrs.tso.as_ref().and_then(tso_clause),
        attrs.dfp.as_ref().and_then(dfp_clause),
    ]);
    Ok(if clauses.is_empty() {
        format!("AU {name}")
    } else {
        format!("AU {name} {clauses}")
    })
}

/// `DU <name>`
pub fn delete(name: &str) -> Result<String> {
    let name = required(Some(name), "delete a user", "user name")?;
    Ok(format!("DU {name}"))
}

/// `CO (<name>) GROUP(<group>) [AUTHORITY(..)] [OWNER(..)]`
pub fn connect(config: &AdminConfig, name: &str, group: &GroupRequest) -> Result<String> {
    let name = required(Some(name), "connect a user", "user name")?;
    let group_name = required(Some(group.group_name.as_str()), "connect a user", "group name")?;
    let authority = group.authority.map(|a| a.to_string());
    let clauses = join_clauses([
        Some(format!("GROUP({group_name})")),
        keyword("AUTHORITY", authority.as_deref()),
        keyword("OWNER", config.explicit_owner(group.owner.as_deref())),
    ]);
    Ok(format!("CO ({name}) {clauses}"))
}

/// `RE (<name>) GROUP(<group>)`
pub fn remove(name: &str, group_name: &str) -> Result<String> {
    let name = required(Some(name), "remove a user from a group", "user name")?;
    let group_name = required(Some(group_name), "remove a user from a group", "group name")?;
    Ok(format!("RE ({name}) GROUP({group_name})"))
}

fn omvs_clause(omvs: &OmvsAttributes) -> Option<String> {
    let uid = match non_empty(omvs.uid.as_deref()) {
        Some(uid) if uid.eq_ignore_ascii_case(AUTO_UID) => Some("AUTOUID".to_string()),
        other => numeric_keyword("UID", other),
    };
    group_clause(
        "OMVS",
        [
            uid,
            quoted_keyword("HOME", omvs.home.as_deref()),
            quoted_keyword("PROGRAM", omvs.program.as_deref()),
            numeric_keyword("CPUTIMEMAX", omvs.cputimemax.as_deref()),
            numeric_keyword("ASSIZEMAX", omvs.assizemax.as_deref()),
            numeric_keyword("FILEPROCMAX", omvs.fileprocmax.as_deref()),
            numeric_keyword("PROCUSERMAX", omvs.procusermax.as_deref()),
            numeric_keyword("THREADSMAX", omvs.threadsmax.as_deref()),
            numeric_keyword("MMAPAREAMAX", omvs.mmapareamax.as_deref()),
        ],
    )
}

fn tso_clause(tso: &TsoAttributes) -> Option<String> {
    group_clause(
        "TSO",
        [
            keyword("ACCTNUM", tso.acctnum.as_deref()),
            keyword("DEST", tso.dest.as_deref()),
            keyword("HOLDCLASS", tso.holdclass.as_deref()),
            keyword("MSGCLASS", tso.msgclass.as_deref()),
            keyword("PROC", tso.logon_proc.as_deref()),
            numeric_keyword("SIZE", tso.size.as_deref()),
            numeric_keyword("MAXSIZE", tso.maxsize.as_deref()),
            keyword("SYSOUTCLASS", tso.sysoutclass.as_deref()),
            keyword("USERDATA", tso.userdata.as_deref()),
            quoted_keyword("COMMAND", tso.command.as_deref()),
        ],
    )
}

fn dfp_clause(dfp: &DfpAttributes) -> Option<String> {
    group_clause(
        "DFP",
        [
            keyword("DATAAPPL", dfp.dataappl.as_deref()),
            keyword("DATACLAS", dfp.dataclas.as_deref()),
            keyword("MGMTCLAS", dfp.mgmtclas.as_deref()),
            keyword("STORCLAS", dfp.storclas.as_deref()),
        ],
    )
}
