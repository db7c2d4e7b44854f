//! Command builders — structured intent to RACF/TSO command text.
//!
//! RACF commands follow the TSO operand form:
//! ```text
//! COMMAND positional KEYWORD(value) KEYWORD('quoted value') FLAG
//! ```
//!
//! Every optional attribute is sparse: it contributes a `KEYWORD(value)`
//! clause only when non-empty. No clause is ever emitted with an empty value
//! and no default is ever injected.
//!
//! Quoted values are wrapped in single quotes **without escaping**. A label
//! or name containing `'` produces a command RACF will reject or misread;
//! callers must not pass such values.

pub mod certificate;
pub mod keyring;
pub mod user;

use std::sync::LazyLock;

use regex::Regex;

use crate::config::AdminConfig;
use crate::error::RacfAdminError;
use crate::Result;

static PASSWORD_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(PASSWORD|PHRASE)\([^)]*\)").expect("invalid password clause pattern")
});

/// Wrap a value in single quotes. The value is not escaped.
pub fn quoted(value: &str) -> String {
    format!("'{value}'")
}

/// Trimmed value, or `None` when absent or blank.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// `NAME(value)` when `value` is non-empty.
pub fn keyword(name: &str, value: Option<&str>) -> Option<String> {
    non_empty(value).map(|v| format!("{name}({v})"))
}

/// `NAME('value')` when `value` is non-empty.
pub fn quoted_keyword(name: &str, value: Option<&str>) -> Option<String> {
    non_empty(value).map(|v| format!("{name}({})", quoted(v)))
}

/// `NAME(n)` for a numeric limit; empty values and the `NONE` sentinel emit nothing.
pub fn numeric_keyword(name: &str, value: Option<&str>) -> Option<String> {
    non_empty(value)
        .filter(|v| !v.eq_ignore_ascii_case("NONE"))
        .map(|v| format!("{name}({v})"))
}

/// `ID(owner)` unless the owner is the acting principal.
pub fn id_clause(config: &AdminConfig, owner: Option<&str>) -> Option<String> {
    keyword("ID", config.explicit_owner(owner))
}

/// Join the present clauses with single spaces.
pub fn join_clauses<I>(clauses: I) -> String
where
    I: IntoIterator<Item = Option<String>>,
{
    clauses.into_iter().flatten().collect::<Vec<_>>().join(" ")
}

/// A compound clause `NAME(sub1 sub2 ...)`, omitted when every sub-clause is empty.
pub fn group_clause<I>(name: &str, sub_clauses: I) -> Option<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    let inner = join_clauses(sub_clauses);
    if inner.is_empty() {
        None
    } else {
        Some(format!("{name}({inner})"))
    }
}

/// The mandatory identifying operand of a command.
pub(crate) fn required<'a>(
    value: Option<&'a str>,
    operation: &'static str,
    field: &'static str,
) -> Result<&'a str> {
    non_empty(value).ok_or(RacfAdminError::MandatoryFieldMissing { operation, field })
}

/// Mask password and pass phrase values in a command before it is logged or reported.
pub fn redact(command: &str) -> String {
    PASSWORD_CLAUSE
        .replace_all(command, "$1(********)")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_sparse() {
        assert_eq!(keyword("DFLTGRP", Some("SYS1")), Some("DFLTGRP(SYS1)".into()));
        assert_eq!(keyword("DFLTGRP", Some("  ")), None);
        assert_eq!(keyword("DFLTGRP", None), None);
    }

    #[test]
    fn test_quoted_keyword_does_not_escape() {
        assert_eq!(
            quoted_keyword("NAME", Some("O'BRIEN")),
            Some("NAME('O'BRIEN')".into())
        );
    }

    #[test]
    fn test_numeric_keyword_suppresses_none() {
        assert_eq!(numeric_keyword("SIZE", Some("NONE")), None);
        assert_eq!(numeric_keyword("SIZE", Some("none")), None);
        assert_eq!(numeric_keyword("SIZE", Some("")), None);
        assert_eq!(numeric_keyword("SIZE", Some("4096")), Some("SIZE(4096)".into()));
    }

    #[test]
    fn test_group_clause_omitted_when_empty() {
        assert_eq!(group_clause("DFP", [None, None]), None);
        assert_eq!(
            group_clause("DFP", [Some("MGMTCLAS(M1)".into()), None, Some("STORCLAS(S1)".into())]),
            Some("DFP(MGMTCLAS(M1) STORCLAS(S1))".into())
        );
    }

    #[test]
    fn test_id_clause_acting_principal() {
        let config = AdminConfig::for_user("USERX");
        assert_eq!(id_clause(&config, Some("USERX")), None);
        assert_eq!(id_clause(&config, None), None);
        assert_eq!(id_clause(&config, Some("WEBSRV")), Some("ID(WEBSRV)".into()));
    }

    #[test]
    fn test_required() {
        assert_eq!(required(Some(" BOB "), "list user", "user name").unwrap(), "BOB");
        let err = required(Some(""), "list user", "user name").unwrap_err();
        assert_eq!(err.to_string(), "user name is mandatory to list user");
    }

    #[test]
    fn test_redact() {
        assert_eq!(
            redact("AU BOB DFLTGRP(SYS1) PASSWORD(TOPSECR) OWNER(ADM)"),
            "AU BOB DFLTGRP(SYS1) PASSWORD(********) OWNER(ADM)"
        );
        assert_eq!(redact("AU BOB NOPASSWORD"), "AU BOB NOPASSWORD");
    }
}
