//! `RACDCERT LIST` output parser.
//!
//! A listing looks like:
//! ```text
//! Digital certificate information for user USERX:
//!
//!   Label: billtst
//!   Certificate ID: 2QXB1fDx54KJk5OjoqNA
//!   Status: TRUST
//!   Start Date: 2024/03/01 00:00:00
//!   End Date:   2025/03/01 23:59:59
//!   Serial Number:
//!        >00<
//!   Issuer's Name:
//!        >CN=billtst.<
//!   Subject's Name:
//!        >CN=billtst.<
//!   Signing Algorithm: sha256RSA
//!   Key Usage: HANDSHAKE, DATAENCRYPT, DOCSIGN
//!   Key Type: RSA
//!   Key Size: 2048
//!   Private Key: YES
//!   Ring Associations:
//!     *** No rings associated ***
//!   Certificate Fingerprint (SHA256):
//!     74:A7:50:CF:1A:B0:E5:8E:93:B5:D7:56:11:D6:90:2E:
//!     43:E0:39:17:4F:25:0E:D2:CB:18:9D:D9:F8:7B:55:3E
//! ```
//!
//! Certificates connected to rings print `Ring Owner:`/`Ring:` pairs under
//! `Ring Associations:` instead of the marker; those are read from a
//! per-certificate follow-up listing with [`parse_ring_associations`].

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

use super::{message_line, pair_blocks, RecordExtractor};
use crate::error::RacfAdminError;
use crate::record::{CertificateRecord, Listing, RingAssociation, RingAssociations};
use crate::types::TrustStatus;
use crate::Result;

const RESOURCE: &str = "certificate";

/// Marker RACF prints when no certificate matches.
pub const NOT_FOUND_MARKER: &str = "No certificate information";

/// Marker RACF prints for a certificate in no ring.
pub const NO_RINGS_MARKER: &str = "No rings";

/// Timestamp layout of `Start Date:` / `End Date:`.
pub const DATE_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

static EXTRACTOR: LazyLock<RecordExtractor> = LazyLock::new(|| {
    RecordExtractor::new(
        RESOURCE,
        &[
            ("label", r"(?m)Label:[ \t]*(.*)$"),
            ("certificate_id", r"(?m)Certificate ID:[ \t]*(.*)$"),
            ("issuers_name", r"Issuer's Name:\s*>(.*?)<"),
            ("start_date", r"(?m)Start Date:[ \t]*(.*)$"),
            ("end_date", r"(?m)End Date:[ \t]*(.*)$"),
            ("trust", r"(?m)Status:[ \t]*(.*)$"),
            ("key_type", r"(?m)Key Type:[ \t]*(.*)$"),
            ("key_size", r"(?m)Key Size:[ \t]*(.*)$"),
            ("serial_number", r"Serial Number:\s*>(.*?)<"),
            ("ring_associations", r"Ring Associations:\s*(.*)"),
        ],
    )
});

static OWNER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"for user ([^:\s]+):").expect("invalid owner pattern"));

static FINGERPRINT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9A-Fa-f:]{47,48}").expect("invalid fingerprint pattern")
});

static RING_OWNER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Ring Owner:\s*(\S+)").expect("invalid ring owner pattern"));

static RING_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Ring:\s*>(.*?)<").expect("invalid ring name pattern"));

/// Parse a `RACDCERT LIST` listing.
///
/// Certificates whose listing shows ring associations come back with
/// `RingAssociations::Rings(vec![])`; the caller fills them in from
/// [`parse_ring_associations`] on a per-certificate listing.
pub fn parse_listing(command: &str, text: &str) -> Result<Listing<CertificateRecord>> {
    if message_line(text, NOT_FOUND_MARKER).is_some() {
        return Ok(Listing::not_found(command));
    }

    let columns = EXTRACTOR.extract(text)?;
    if columns.is_empty() {
        return Ok(Listing::listed(command, Vec::new()));
    }

    let user = OWNER
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| RacfAdminError::format_mismatch(RESOURCE, "missing owning user header"))?;

    let blocks: Vec<String> = FINGERPRINT_BLOCK
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect();
    let fingerprints = pair_blocks(RESOURCE, &blocks)?;
    if fingerprints.len() != columns.len() {
        return Err(RacfAdminError::format_mismatch(
            RESOURCE,
            format!(
                "found {} certificates but {} fingerprints",
                columns.len(),
                fingerprints.len()
            ),
        ));
    }

    let mut records = Vec::with_capacity(columns.len());
    for (row, finger_print) in fingerprints.into_iter().enumerate() {
        let issuers_name = columns.get(row, "issuers_name")?.to_string();
        let rings = columns.get(row, "ring_associations")?;
        records.push(CertificateRecord {
            label: columns.get(row, "label")?.to_string(),
            user: user.clone(),
            certificate_id: columns.get(row, "certificate_id")?.to_string(),
            common_name: common_name(&issuers_name),
            issuers_name,
            serial_number: columns.get(row, "serial_number")?.to_string(),
            start_date: parse_date(columns.get(row, "start_date")?)?,
            end_date: parse_date(columns.get(row, "end_date")?)?,
            trust: columns
                .get(row, "trust")?
                .parse::<TrustStatus>()
                .map_err(|e| RacfAdminError::format_mismatch(RESOURCE, e))?,
            key_type: columns.get(row, "key_type")?.to_string(),
            key_size: parse_key_size(columns.get(row, "key_size")?)?,
            finger_print,
            ring_associations: if rings.contains(NO_RINGS_MARKER) {
                RingAssociations::NoRings(rings.to_string())
            } else {
                RingAssociations::Rings(Vec::new())
            },
        });
    }

    Ok(Listing::listed(command, records))
}

/// Parse the `Ring Owner:` / `Ring:` pairs of a single-certificate listing.
pub fn parse_ring_associations(text: &str) -> Result<Vec<RingAssociation>> {
    let owners: Vec<&str> = RING_OWNER
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect();
    let names: Vec<&str> = RING_NAME
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .collect();

    if owners.len() != names.len() {
        return Err(RacfAdminError::format_mismatch(
            RESOURCE,
            format!(
                "found {} ring owners but {} ring names",
                owners.len(),
                names.len()
            ),
        ));
    }

    Ok(owners
        .into_iter()
        .zip(names)
        .map(|(owner, name)| RingAssociation {
            ring_owner: owner.to_string(),
            keyring: name.to_string(),
        })
        .collect())
}

/// Common name of an issuer in RACF dotted form: `CN=` up to the first `.`.
fn common_name(issuer: &str) -> Option<String> {
    let rest = issuer.strip_prefix("CN=")?;
    let cn = rest.split('.').next().unwrap_or(rest).trim();
    (!cn.is_empty()).then(|| cn.to_string())
}

fn parse_date(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DATE_FORMAT).map_err(|e| {
        RacfAdminError::format_mismatch(RESOURCE, format!("bad timestamp '{value}': {e}"))
    })
}

fn parse_key_size(value: &str) -> Result<u32> {
    value.parse().map_err(|_| {
        RacfAdminError::format_mismatch(RESOURCE, format!("bad key size '{value}'"))
    })
}
