//! Response parsers — RACF console text to typed records.
//!
//! Listings are free-form text. Each record kind declares its fields once in
//! a [`RecordExtractor`]; every field is searched independently over the
//! whole text and the resulting columns are assumed index-aligned (the Nth
//! label belongs with the Nth issuer, the Nth dates, ...). Columns of
//! different lengths mean the output layout changed, and extraction fails
//! with [`RacfAdminError::FormatMismatch`] rather than pairing values up
//! wrongly.

pub mod certificate;
pub mod keyring;
pub mod user;

use std::sync::LazyLock;

use regex::Regex;

use crate::error::RacfAdminError;
use crate::Result;

/// One field of a record kind: a name and a pattern whose first capture group is the value.
#[derive(Debug)]
pub struct FieldPattern {
    name: &'static str,
    regex: Regex,
}

/// Declared field list for one record kind.
#[derive(Debug)]
pub struct RecordExtractor {
    resource: &'static str,
    fields: Vec<FieldPattern>,
}

impl RecordExtractor {
    /// Build an extractor from `(field name, pattern)` pairs.
    ///
    /// # Panics
    ///
    /// Panics if a pattern does not compile; patterns are compile-time constants.
    pub fn new(resource: &'static str, fields: &[(&'static str, &str)]) -> Self {
        let fields = fields
            .iter()
            .map(|&(name, pattern)| FieldPattern {
                name,
                regex: Regex::new(pattern).expect("invalid listing field pattern"),
            })
            .collect();
        Self { resource, fields }
    }

    /// The resource kind named in errors.
    pub fn resource(&self) -> &'static str {
        self.resource
    }

    /// Extract every declared field as a column and check that all columns align.
    pub fn extract(&self, text: &str) -> Result<Columns> {
        let columns: Vec<(&'static str, Vec<String>)> = self
            .fields
            .iter()
            .map(|field| {
                let values = field
                    .regex
                    .captures_iter(text)
                    .filter_map(|c| c.get(1))
                    .map(|m| m.as_str().trim().to_string())
                    .collect();
                (field.name, values)
            })
            .collect();

        let rows = columns.first().map_or(0, |(_, v)| v.len());
        if let Some((name, values)) = columns.iter().find(|(_, v)| v.len() != rows) {
            let first = columns[0].0;
            return Err(RacfAdminError::format_mismatch(
                self.resource,
                format!(
                    "found {rows} '{first}' values but {} '{name}' values",
                    values.len()
                ),
            ));
        }

        Ok(Columns {
            resource: self.resource,
            rows,
            columns,
        })
    }
}

/// Index-aligned field columns extracted from one listing.
#[derive(Debug)]
pub struct Columns {
    resource: &'static str,
    rows: usize,
    columns: Vec<(&'static str, Vec<String>)>,
}

impl Columns {
    /// Number of records found.
    pub fn len(&self) -> usize {
        self.rows
    }

    /// True when no record was found.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Value of `field` for record `row`.
    pub fn get(&self, row: usize, field: &str) -> Result<&str> {
        self.columns
            .iter()
            .find(|(name, _)| *name == field)
            .and_then(|(_, values)| values.get(row))
            .map(String::as_str)
            .ok_or_else(|| {
                RacfAdminError::format_mismatch(
                    self.resource,
                    format!("no '{field}' value for record {row}"),
                )
            })
    }
}

static MESSAGE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:ICH|IKJ|IRR)[0-9A-Z]*[0-9][A-Z]\s").expect("invalid message id pattern")
});

/// The first RACF or TSO message line (`ICH30001I ...`) containing `phrase`, ignoring case.
///
/// Free text such as a user's NAME or installation data never starts with a
/// message ID, so it cannot trigger a match.
pub fn message_line<'a>(text: &'a str, phrase: &str) -> Option<&'a str> {
    let phrase = phrase.to_ascii_uppercase();
    text.lines()
        .filter(|line| MESSAGE_ID.is_match(line))
        .find(|line| line.to_ascii_uppercase().contains(&phrase))
        .map(str::trim)
}

/// Re-join a flat sequence of blocks pairwise: 1st+2nd, 3rd+4th, ...
pub fn pair_blocks(resource: &'static str, blocks: &[String]) -> Result<Vec<String>> {
    if blocks.len() % 2 != 0 {
        return Err(RacfAdminError::format_mismatch(
            resource,
            format!("odd number of fingerprint blocks ({})", blocks.len()),
        ));
    }
    Ok(blocks.chunks(2).map(|pair| pair.concat()).collect())
}

/// Slice `[start, end)` by character position; short lines yield short or empty slices.
pub fn column(line: &str, start: usize, end: usize) -> &str {
    let byte_at = |pos: usize| {
        line.char_indices()
            .nth(pos)
            .map_or(line.len(), |(idx, _)| idx)
    };
    let from = byte_at(start);
    let to = byte_at(end).max(from);
    &line[from..to]
}
