//! `RACDCERT LISTRING` output parser.
//!
//! Member rows are fixed-width; fields are cut at character offsets rather
//! than split on whitespace because labels may contain blanks:
//! ```text
//! RACDCERT LISTRING(MYRING)
//! Digital ring information for user USERX:
//!
//!   Ring:
//!        >MYRING<
//!   Certificate Label Name             Cert Owner     USAGE      DEFAULT
//!   --------------------------------   ------------   --------   -------
//!   Web Server Cert                    ID(USERX)      PERSONAL     YES
//! ```

use std::sync::LazyLock;

use regex::Regex;

use super::{column, message_line};
use crate::error::RacfAdminError;
use crate::record::{ConnectedCertificate, KeyRingRecord, Listing};
use crate::Result;

const RESOURCE: &str = "key ring";

/// Lines preceding the first member row (command echo and headings).
pub const HEADER_ROWS: usize = 7;

/// Half-open character ranges of the member row fields.
pub const LABEL_COLUMNS: (usize, usize) = (2, 34);
pub const OWNER_COLUMNS: (usize, usize) = (37, 49);
pub const USAGE_COLUMNS: (usize, usize) = (52, 61);
pub const DEFAULT_COLUMNS: (usize, usize) = (65, 67);

/// Marker RACF prints when the ring is unknown.
pub const NOT_FOUND_MARKER: &str = "does not exist";

/// Marker RACF prints for an empty ring.
pub const EMPTY_MARKER: &str = "No certificates connected";

static OWNER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"for user (\S+?):").expect("invalid ring owner pattern"));

static RING_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Ring:\s*>(.*?)<").expect("invalid ring name pattern"));

/// Parse a `RACDCERT LISTRING` listing.
///
/// `ring` and `owner_hint` are what the listing was requested for; they fill
/// in the record when the output omits its own headings.
pub fn parse_listing(
    command: &str,
    text: &str,
    ring: &str,
    owner_hint: Option<&str>,
) -> Result<Listing<KeyRingRecord>> {
    if message_line(text, NOT_FOUND_MARKER).is_some() {
        return Ok(Listing::not_found(command));
    }

    let owner = OWNER
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .or(owner_hint)
        .ok_or_else(|| RacfAdminError::format_mismatch(RESOURCE, "missing ring owner header"))?;

    let ring_name = RING_NAME
        .captures(text)
        .and_then(|c| c.get(1))
        .map_or(ring, |m| m.as_str())
        .trim();

    let certificates = if text.contains(EMPTY_MARKER) {
        Vec::new()
    } else {
        member_rows(text)?
    };

    Ok(Listing::listed(
        command,
        vec![KeyRingRecord {
            ring_name: ring_name.to_string(),
            owner: owner.to_string(),
            certificates,
            raw_text: text.to_string(),
        }],
    ))
}

fn member_rows(text: &str) -> Result<Vec<ConnectedCertificate>> {
    text.lines()
        .skip(HEADER_ROWS)
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(row, line)| {
            let field = |(start, end): (usize, usize)| column(line, start, end).trim().to_string();
            let cert_label = field(LABEL_COLUMNS);
            if cert_label.is_empty() {
                return Err(RacfAdminError::format_mismatch(
                    RESOURCE,
                    format!("member row {row} has no label: '{line}'"),
                ));
            }
            Ok(ConnectedCertificate {
                cert_label,
                cert_owner: field(OWNER_COLUMNS),
                cert_usage: field(USAGE_COLUMNS),
                cert_default: field(DEFAULT_COLUMNS),
            })
        })
        .collect()
}
