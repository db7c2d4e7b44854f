//! `LISTUSER` output parser.
//!
//! The base section carries `KEY=value` pairs several to a line and one
//! block per group connection. Optional segments follow, each introduced by
//! a `<SEGMENT> INFORMATION` heading and listing one `KEY= value` per line.

use std::sync::LazyLock;

use regex::Regex;

use super::message_line;
use crate::error::RacfAdminError;
use crate::record::{GroupConnection, Listing, Segment, SegmentField, UserRecord};
use crate::types::UserSegment;
use crate::Result;

const RESOURCE: &str = "user";

/// Marker RACF prints when the user ID is not defined.
pub const NOT_FOUND_MARKER: &str = "UNABLE TO LOCATE USER";

/// Listing keyword to record field name, per segment.
const TSO_FIELDS: &[(&str, &str)] = &[
    ("ACCTNUM", "acctnum"),
    ("DEST", "dest"),
    ("HOLDCLASS", "holdclass"),
    ("MSGCLASS", "msgclass"),
    ("PROC", "proc"),
    ("SIZE", "size"),
    ("MAXSIZE", "maxsize"),
    ("SYSOUTCLASS", "sysoutclass"),
    ("USERDATA", "userdata"),
    ("COMMAND", "command"),
];

const OMVS_FIELDS: &[(&str, &str)] = &[
    ("UID", "uid"),
    ("HOME", "home"),
    ("PROGRAM", "program"),
    ("CPUTIMEMAX", "cputimemax"),
    ("ASSIZEMAX", "assizemax"),
    ("FILEPROCMAX", "fileprocmax"),
    ("PROCUSERMAX", "procusermax"),
    ("THREADSMAX", "threadsmax"),
    ("MMAPAREAMAX", "mmapareamax"),
];

const CICS_FIELDS: &[(&str, &str)] = &[
    ("OPIDENT", "opident"),
    ("OPPRTY", "opprty"),
    ("TIMEOUT", "timeout"),
    ("XRFSOFF", "xrfsoff"),
];

const DFP_FIELDS: &[(&str, &str)] = &[
    ("MGMTCLAS", "mgmtclass"),
    ("STORCLAS", "storclass"),
    ("DATACLAS", "dataclass"),
    ("DATAAPPL", "dataappl"),
];

static USER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*USER=(\S+)").expect("invalid user pattern"));

static NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"NAME=(.*?)\s+OWNER=").expect("invalid name pattern"));

static OWNER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\sOWNER=(\S*)").expect("invalid owner pattern"));

static DEFAULT_GROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"DEFAULT-GROUP=(\S*)").expect("invalid default group pattern")
});

static CONNECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\sGROUP=(\S*)\s+AUTH=(\S*)\s+CONNECT-OWNER=(\S*)[\s\S]*?ATTRIBUTES=(\S*)",
    )
    .expect("invalid group connection pattern")
});

static SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*([A-Z]+) INFORMATION[ \t]*$").expect("invalid section pattern")
});

/// Parse a `LISTUSER` listing into at most one record.
pub fn parse_listing(command: &str, text: &str) -> Result<Listing<UserRecord>> {
    if message_line(text, NOT_FOUND_MARKER).is_some() {
        return Ok(Listing::not_found(command));
    }

    let sections = sections(text);
    let base = sections.first().map_or(text, |&(_, body)| body);

    let mut record = UserRecord {
        user: base_field(&USER, base, "USER")?,
        name_info: base_field(&NAME, base, "NAME")?,
        owner: base_field(&OWNER, base, "OWNER")?,
        default_group: base_field(&DEFAULT_GROUP, base, "DEFAULT-GROUP")?,
        group_connects: CONNECT
            .captures_iter(base)
            .map(|c| GroupConnection {
                group_name: c[1].to_string(),
                auth_level: c[2].to_string(),
                connect_owner: c[3].to_string(),
                attributes: c[4].to_string(),
            })
            .collect(),
        tso_segment: Segment::new(),
        omvs_segment: Segment::new(),
        cics_segment: Segment::new(),
        dfp_segment: Segment::new(),
        csdata_segment: Vec::new(),
        raw_text: text.to_string(),
    };

    for &(heading, body) in sections.iter().skip(1) {
        let Some(segment) = heading.and_then(|h| h.parse::<UserSegment>().ok()) else {
            continue;
        };
        match segment {
            UserSegment::Tso => record.tso_segment = declared_fields(body, TSO_FIELDS),
            UserSegment::Omvs => record.omvs_segment = declared_fields(body, OMVS_FIELDS),
            UserSegment::Cics => record.cics_segment = declared_fields(body, CICS_FIELDS),
            UserSegment::Dfp => record.dfp_segment = declared_fields(body, DFP_FIELDS),
            UserSegment::Csdata => record.csdata_segment = key_values(body).collect(),
        }
    }

    Ok(Listing::listed(command, vec![record]))
}

/// Split the listing at segment headings. The first entry is the base section.
fn sections(text: &str) -> Vec<(Option<&str>, &str)> {
    let mut sections = Vec::new();
    let mut heading = None;
    let mut start = 0;
    for caps in SECTION.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        sections.push((heading, &text[start..whole.start()]));
        heading = Some(name.as_str());
        start = whole.end();
    }
    sections.push((heading, &text[start..]));
    sections
}

fn base_field(regex: &Regex, base: &str, field: &str) -> Result<String> {
    regex
        .captures(base)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .ok_or_else(|| RacfAdminError::format_mismatch(RESOURCE, format!("missing {field} field")))
}

/// `KEY= value` lines of a segment body, in order.
fn key_values(body: &str) -> impl Iterator<Item = SegmentField> + '_ {
    body.lines().filter_map(|line| {
        let (key, value) = line.split_once('=')?;
        let key = key.trim();
        (!key.is_empty()).then(|| SegmentField {
            key: key.to_string(),
            value: value.trim().to_string(),
        })
    })
}

fn declared_fields(body: &str, table: &[(&str, &str)]) -> Segment {
    key_values(body)
        .filter_map(|field| {
            table
                .iter()
                .find(|(keyword, _)| field.key.eq_ignore_ascii_case(keyword))
                .map(|(_, name)| (name.to_string(), field.value))
        })
        .collect()
}
