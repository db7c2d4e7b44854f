//! RACDCERT key ring commands — LISTRING, ADDRING, DELRING, CONNECT, REMOVE.

use super::{id_clause, join_clauses, keyword, non_empty, quoted, required};
use crate::config::AdminConfig;
use crate::Result;

/// `RACDCERT LISTRING(<ring>) [ID(owner)]`
pub fn list(config: &AdminConfig, ring: &str, owner: Option<&str>) -> Result<String> {
    ring_command(config, "LISTRING", "list a key ring", ring, owner)
}

/// `RACDCERT ADDRING(<ring>) [ID(owner)]`
pub fn create(config: &AdminConfig, ring: &str, owner: Option<&str>) -> Result<String> {
    ring_command(config, "ADDRING", "add a key ring", ring, owner)
}

/// `RACDCERT DELRING(<ring>) [ID(owner)]`
pub fn delete(config: &AdminConfig, ring: &str, owner: Option<&str>) -> Result<String> {
    ring_command(config, "DELRING", "delete a key ring", ring, owner)
}

/// `RACDCERT CONNECT(ID(certOwner) LABEL('certLabel') RING(<ring>)) [ID(owner)]`
pub fn connect(
    config: &AdminConfig,
    ring: &str,
    owner: Option<&str>,
    cert_owner: Option<&str>,
    cert_label: &str,
) -> Result<String> {
    membership_command(config, "CONNECT", "connect a certificate", ring, owner, cert_owner, cert_label)
}

/// `RACDCERT REMOVE(ID(certOwner) LABEL('certLabel') RING(<ring>)) [ID(owner)]`
pub fn remove(
    config: &AdminConfig,
    ring: &str,
    owner: Option<&str>,
    cert_owner: Option<&str>,
    cert_label: &str,
) -> Result<String> {
    membership_command(config, "REMOVE", "remove a certificate", ring, owner, cert_owner, cert_label)
}

fn ring_command(
    config: &AdminConfig,
    function: &str,
    operation: &'static str,
    ring: &str,
    owner: Option<&str>,
) -> Result<String> {
    let ring = required(Some(ring), operation, "key ring name")?;
    Ok(join_clauses([
        Some(format!("RACDCERT {function}({ring})")),
        id_clause(config, owner),
    ]))
}

fn membership_command(
    config: &AdminConfig,
    function: &str,
    operation: &'static str,
    ring: &str,
    owner: Option<&str>,
    cert_owner: Option<&str>,
    cert_label: &str,
) -> Result<String> {
    let ring = required(Some(ring), operation, "key ring name")?;
    let label = required(Some(cert_label), operation, "certificate label")?;
    // Certificate owner is explicit even when it is the acting principal.
    let inner = join_clauses([
        keyword("ID", non_empty(cert_owner)),
        Some(format!("LABEL({})", quoted(label))),
        Some(format!("RING({ring})")),
    ]);
    Ok(join_clauses([
        Some(format!("RACDCERT {function}({inner})")),
        id_clause(config, owner),
    ]))
}
