//! Records parsed out of RACF listings.
//!
//! Records are rebuilt from command output on every query; none is cached or
//! mutated in place.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;

use crate::types::TrustStatus;

/// Whether a listing found its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListStatus {
    /// The listing parsed; it may still contain zero records.
    Listed,
    /// RACF reported that the resource does not exist.
    NotFound,
}

/// The parsed result of one list command.
#[derive(Debug, Clone, Serialize)]
pub struct Listing<T> {
    /// The list command that produced this result.
    pub command: String,
    /// Found / not-found marker.
    pub status: ListStatus,
    /// Parsed records, in listing order.
    pub records: Vec<T>,
}

impl<T> Listing<T> {
    /// A listing whose output carried a "does not exist" marker.
    pub fn not_found(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            status: ListStatus::NotFound,
            records: Vec::new(),
        }
    }

    /// A successfully parsed listing.
    pub fn listed(command: impl Into<String>, records: Vec<T>) -> Self {
        Self {
            command: command.into(),
            status: ListStatus::Listed,
            records,
        }
    }

    /// True when no record was returned, for either reason.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True when RACF explicitly reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        self.status == ListStatus::NotFound
    }

    /// The first record, if any.
    pub fn first(&self) -> Option<&T> {
        self.records.first()
    }
}

// ---------------------------------------------------------------------------
//  Certificates
// ---------------------------------------------------------------------------

/// A certificate as shown by `RACDCERT LIST`.
#[derive(Debug, Clone, Serialize)]
pub struct CertificateRecord {
    /// Certificate label.
    pub label: String,
    /// Owning user ID.
    pub user: String,
    /// RACF certificate ID.
    pub certificate_id: String,
    /// Issuer distinguished name, RACF dotted form (`CN=x.O=y`).
    pub issuers_name: String,
    /// Issuer common name, when the issuer name starts with `CN=`.
    pub common_name: Option<String>,
    /// Serial number (hex).
    pub serial_number: String,
    /// Start of the validity window (console locale, no timezone).
    pub start_date: NaiveDateTime,
    /// End of the validity window (console locale, no timezone).
    pub end_date: NaiveDateTime,
    /// Trust status.
    pub trust: TrustStatus,
    /// Key type (RSA, NISTECC, BPECC, DSA).
    pub key_type: String,
    /// Key size in bits.
    pub key_size: u32,
    /// Colon-delimited fingerprint.
    pub finger_print: String,
    /// Key rings the certificate is connected to.
    pub ring_associations: RingAssociations,
}

/// Key ring associations of a certificate.
///
/// RACF prints a marker line instead of an empty list when a certificate is
/// in no ring; that marker is kept as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RingAssociations {
    /// The "no rings associated" marker text.
    NoRings(String),
    /// Owner/name pairs, from the per-certificate follow-up listing.
    Rings(Vec<RingAssociation>),
}

impl RingAssociations {
    /// True when the certificate is in at least one ring.
    pub fn is_associated(&self) -> bool {
        matches!(self, Self::Rings(_))
    }

    /// The associated rings (empty for the marker).
    pub fn rings(&self) -> &[RingAssociation] {
        match self {
            Self::NoRings(_) => &[],
            Self::Rings(rings) => rings,
        }
    }
}

impl Serialize for RingAssociations {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::NoRings(marker) => {
                let mut seq = serializer.serialize_seq(Some(1))?;
                seq.serialize_element(marker)?;
                seq.end()
            }
            Self::Rings(rings) => rings.serialize(serializer),
        }
    }
}

/// One key ring a certificate is connected to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RingAssociation {
    /// Owner of the key ring.
    pub ring_owner: String,
    /// Key ring name.
    pub keyring: String,
}

// ---------------------------------------------------------------------------
//  Key rings
// ---------------------------------------------------------------------------

/// A key ring as shown by `RACDCERT LISTRING`.
#[derive(Debug, Clone, Serialize)]
pub struct KeyRingRecord {
    /// Key ring name.
    pub ring_name: String,
    /// Owning user ID.
    pub owner: String,
    /// Connected certificates, in listing order.
    pub certificates: Vec<ConnectedCertificate>,
    /// The listing text as captured.
    pub raw_text: String,
}

impl KeyRingRecord {
    /// Find a connected certificate by label.
    pub fn certificate(&self, label: &str) -> Option<&ConnectedCertificate> {
        self.certificates.iter().find(|c| c.cert_label == label.trim())
    }
}

/// One member row of a key ring listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectedCertificate {
    /// Certificate label.
    pub cert_label: String,
    /// Certificate owner, as printed (`ID(USERX)`, `CERTAUTH`, `SITE`).
    pub cert_owner: String,
    /// Usage in the ring (PERSONAL, CERTAUTH, SITE).
    pub cert_usage: String,
    /// Default flag as printed.
    pub cert_default: String,
}

impl ConnectedCertificate {
    /// Whether this is the ring's default certificate.
    pub fn is_default(&self) -> bool {
        self.cert_default.to_ascii_uppercase().starts_with('Y')
    }
}

// ---------------------------------------------------------------------------
//  Users
// ---------------------------------------------------------------------------

/// Field values of one user segment, keyed by lowercase field name.
pub type Segment = BTreeMap<String, String>;

/// A user profile as shown by `LISTUSER`.
#[derive(Debug, Clone, Serialize)]
pub struct UserRecord {
    /// User ID.
    pub user: String,
    /// NAME field.
    pub name_info: String,
    /// OWNER field.
    pub owner: String,
    /// DEFAULT-GROUP field.
    pub default_group: String,
    /// Group connections, in listing order.
    pub group_connects: Vec<GroupConnection>,
    /// TSO segment (empty when not requested or not shown).
    pub tso_segment: Segment,
    /// OMVS segment.
    pub omvs_segment: Segment,
    /// CICS segment.
    pub cics_segment: Segment,
    /// DFP segment.
    pub dfp_segment: Segment,
    /// CSDATA custom fields, in listing order.
    pub csdata_segment: Vec<SegmentField>,
    /// The listing text as captured.
    pub raw_text: String,
}

impl UserRecord {
    /// Whether the user is connected to `group` (case-insensitive).
    pub fn is_connected_to(&self, group: &str) -> bool {
        self.group_connects
            .iter()
            .any(|c| c.group_name.eq_ignore_ascii_case(group.trim()))
    }
}

/// One group connection of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupConnection {
    pub group_name: String,
    pub auth_level: String,
    pub connect_owner: String,
    pub attributes: String,
}

/// A key/value pair of a free-form segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentField {
    pub key: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_rings_serializes_as_marker_list() {
        let rings = RingAssociations::NoRings("*** No rings associated ***".into());
        assert_eq!(
            serde_json::to_string(&rings).unwrap(),
            r#"["*** No rings associated ***"]"#
        );
        assert!(!rings.is_associated());
        assert!(rings.rings().is_empty());
    }

    #[test]
    fn test_rings_serialize_as_objects() {
        let rings = RingAssociations::Rings(vec![RingAssociation {
            ring_owner: "USERX".into(),
            keyring: "MYRING".into(),
        }]);
        assert_eq!(
            serde_json::to_string(&rings).unwrap(),
            r#"[{"ring_owner":"USERX","keyring":"MYRING"}]"#
        );
    }

    #[test]
    fn test_listing_states() {
        let missing: Listing<u8> = Listing::not_found("LU BOB");
        assert!(missing.is_empty());
        assert!(missing.is_not_found());

        let empty: Listing<u8> = Listing::listed("RACDCERT LIST", Vec::new());
        assert!(empty.is_empty());
        assert!(!empty.is_not_found());
    }

    #[test]
    fn test_connected_certificate_default_flag() {
        let cert = ConnectedCertificate {
            cert_label: "a".into(),
            cert_owner: "ID(USERX)".into(),
            cert_usage: "PERSONAL".into(),
            cert_default: "YE".into(),
        };
        assert!(cert.is_default());
    }
}
