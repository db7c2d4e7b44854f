//! Core request types — resource kinds, desired states, segments, authority levels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three resource domains managed through RACF commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// A RACF user profile.
    User,
    /// A digital certificate (RACDCERT).
    Certificate,
    /// A key ring (RACDCERT ADDRING).
    KeyRing,
}

impl ResourceKind {
    /// Lowercase name used in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Certificate => "certificate",
            Self::KeyRing => "key ring",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Desired state of a resource, or a relation change on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesiredState {
    /// The resource must exist (created when missing).
    Present,
    /// The resource must not exist (deleted when found).
    Absent,
    /// Requested relations must exist; the resource itself must already exist.
    Connect,
    /// Requested relations must not exist; the resource itself must already exist.
    Remove,
}

impl fmt::Display for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => write!(f, "present"),
            Self::Absent => write!(f, "absent"),
            Self::Connect => write!(f, "connect"),
            Self::Remove => write!(f, "remove"),
        }
    }
}

impl FromStr for DesiredState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            "connect" => Ok(Self::Connect),
            "remove" => Ok(Self::Remove),
            other => Err(format!(
                "unknown state '{other}' (expected present, absent, connect or remove)"
            )),
        }
    }
}

/// Optional user segments that LISTUSER can be asked to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserSegment {
    Tso,
    Omvs,
    Cics,
    Dfp,
    Csdata,
}

impl UserSegment {
    /// Keyword used on the LU command and in the section header.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Tso => "TSO",
            Self::Omvs => "OMVS",
            Self::Cics => "CICS",
            Self::Dfp => "DFP",
            Self::Csdata => "CSDATA",
        }
    }
}

impl fmt::Display for UserSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for UserSegment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TSO" => Ok(Self::Tso),
            "OMVS" => Ok(Self::Omvs),
            "CICS" => Ok(Self::Cics),
            "DFP" => Ok(Self::Dfp),
            "CSDATA" => Ok(Self::Csdata),
            other => Err(format!("unknown user segment '{other}'")),
        }
    }
}

/// Group connect authority levels (ordered from least to most authority).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConnectAuthority {
    /// Can use the group's resources.
    Use = 0,
    /// Can create new resources under the group.
    Create = 1,
    /// Can connect other users to the group.
    Connect = 2,
    /// Can add new users to the group.
    Join = 3,
}

impl fmt::Display for ConnectAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Use => write!(f, "USE"),
            Self::Create => write!(f, "CREATE"),
            Self::Connect => write!(f, "CONNECT"),
            Self::Join => write!(f, "JOIN"),
        }
    }
}

impl FromStr for ConnectAuthority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USE" => Ok(Self::Use),
            "CREATE" => Ok(Self::Create),
            "CONNECT" => Ok(Self::Connect),
            "JOIN" => Ok(Self::Join),
            other => Err(format!("unknown connect authority '{other}'")),
        }
    }
}

/// Certificate trust status as reported by RACDCERT LIST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrustStatus {
    /// TRUST — certificate is valid and trusted.
    Trusted,
    /// NOTRUST — explicitly marked as not trusted.
    NotTrust,
    /// HIGHTRUST — elevated trust level.
    HiTrust,
}

impl fmt::Display for TrustStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trusted => write!(f, "TRUST"),
            Self::NotTrust => write!(f, "NOTRUST"),
            Self::HiTrust => write!(f, "HIGHTRUST"),
        }
    }
}

impl FromStr for TrustStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TRUST" => Ok(Self::Trusted),
            "NOTRUST" => Ok(Self::NotTrust),
            "HIGHTRUST" => Ok(Self::HiTrust),
            other => Err(format!("unknown trust status '{other}'")),
        }
    }
}
