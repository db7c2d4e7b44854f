//! RACDCERT certificate commands — LIST, GENCERT, DELETE.

use serde::{Deserialize, Serialize};

use super::{id_clause, join_clauses, non_empty, quoted, quoted_keyword, required};
use crate::config::AdminConfig;
use crate::Result;

/// Subject distinguished name fields for GENCERT.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DistinguishedName {
    /// CN — common name. Mandatory for GENCERT.
    pub common_name: Option<String>,
    /// T — title.
    pub title: Option<String>,
    /// OU — organizational unit.
    pub organization_unit: Option<String>,
    /// O — organization.
    pub organization: Option<String>,
    /// L — locality.
    pub locality: Option<String>,
    /// C — country.
    pub country: Option<String>,
    /// SP — state or province.
    pub state: Option<String>,
}

impl DistinguishedName {
    /// A name with only the common name set.
    pub fn common_name(cn: impl Into<String>) -> Self {
        Self {
            common_name: Some(cn.into()),
            ..Self::default()
        }
    }
}

/// The label a certificate is addressed by: the explicit label, else the common name.
pub fn effective_label<'a>(label: Option<&'a str>, dn: &'a DistinguishedName) -> Option<&'a str> {
    non_empty(label).or_else(|| non_empty(dn.common_name.as_deref()))
}

/// `RACDCERT LIST[(LABEL('..'))] [ID(owner)]`
pub fn list(config: &AdminConfig, label: Option<&str>, owner: Option<&str>) -> String {
    let mut command = format!("RACDCERT LIST{}", label_suffix(label));
    if let Some(id) = id_clause(config, owner) {
        command.push(' ');
        command.push_str(&id);
    }
    command
}

/// `RACDCERT GENCERT SUBJECTSDN(..) WITHLABEL('..') [ID(owner)]`
pub fn create(
    config: &AdminConfig,
    dn: &DistinguishedName,
    label: Option<&str>,
    owner: Option<&str>,
) -> Result<String> {
    required(
        dn.common_name.as_deref(),
        "generate a certificate",
        "common name",
    )?;
    let label = required(
        effective_label(label, dn),
        "generate a certificate",
        "certificate label",
    )?;
    Ok(join_clauses([
        Some("RACDCERT GENCERT".to_string()),
        Some(subject_dn(dn)),
        Some(format!("WITHLABEL({})", quoted(label))),
        id_clause(config, owner),
    ]))
}

/// `RACDCERT DELETE(LABEL('..')) [ID(owner)]`
pub fn delete(config: &AdminConfig, label: Option<&str>, owner: Option<&str>) -> Result<String> {
    let label = required(label, "delete a certificate", "certificate label")?;
    let mut command = format!("RACDCERT DELETE{}", label_suffix(Some(label)));
    if let Some(id) = id_clause(config, owner) {
        command.push(' ');
        command.push_str(&id);
    }
    Ok(command)
}

/// `(LABEL('..'))`, attached directly to the function keyword.
fn label_suffix(label: Option<&str>) -> String {
    non_empty(label)
        .map(|l| format!("(LABEL({}))", quoted(l)))
        .unwrap_or_default()
}

/// `SUBJECTSDN(CN('..') T('..') OU('..') O('..') L('..') C('..') SP('..'))`
fn subject_dn(dn: &DistinguishedName) -> String {
    let fields = join_clauses([
        quoted_keyword("CN", dn.common_name.as_deref()),
        quoted_keyword("T", dn.title.as_deref()),
        quoted_keyword("OU", dn.organization_unit.as_deref()),
        quoted_keyword("O", dn.organization.as_deref()),
        quoted_keyword("L", dn.locality.as_deref()),
        quoted_keyword("C", dn.country.as_deref()),
        quoted_keyword("SP", dn.state.as_deref()),
    ]);
    format!("SUBJECTSDN({fields})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RacfAdminError;

    fn config() -> AdminConfig {
        AdminConfig::for_user("USERX")
    }

    #[test]
    fn test_list_all_for_acting_user() {
        assert_eq!(list(&config(), None, None), "RACDCERT LIST");
        assert_eq!(list(&config(), Some(""), Some("USERX")), "RACDCERT LIST");
    }

    #[test]
    fn test_list_label_and_owner() {
        assert_eq!(
            list(&config(), Some("billtst"), Some("WEBSRV")),
            "RACDCERT LIST(LABEL('billtst')) ID(WEBSRV)"
        );
        assert_eq!(
            list(&config(), None, Some("WEBSRV")),
            "RACDCERT LIST ID(WEBSRV)"
        );
    }

    #[test]
    fn test_create_common_name_only_uses_cn_as_label() {
        let cmd = create(&config(), &DistinguishedName::common_name("billtst"), None, None).unwrap();
        assert_eq!(
            cmd,
            "RACDCERT GENCERT SUBJECTSDN(CN('billtst')) WITHLABEL('billtst')"
        );
    }

    #[test]
    fn test_create_full_subject() {
        let dn = DistinguishedName {
            common_name: Some("web.example.com".into()),
            title: Some("Server".into()),
            organization_unit: Some("IT".into()),
            organization: Some("Acme".into()),
            locality: Some("Springfield".into()),
            country: Some("US".into()),
            state: Some("IL".into()),
        };
        let cmd = create(&config(), &dn, Some("WebCert"), Some("WEBSRV")).unwrap();
        assert_eq!(
            cmd,
            "RACDCERT GENCERT SUBJECTSDN(CN('web.example.com') T('Server') OU('IT') O('Acme') \
             L('Springfield') C('US') SP('IL')) WITHLABEL('WebCert') ID(WEBSRV)"
        );
    }

    #[test]
    fn test_create_requires_common_name() {
        let dn = DistinguishedName {
            organization: Some("Acme".into()),
            ..Default::default()
        };
        let err = create(&config(), &dn, Some("WebCert"), None).unwrap_err();
        assert!(matches!(
            err,
            RacfAdminError::MandatoryFieldMissing { field: "common name", .. }
        ));
    }

    #[test]
    fn test_delete() {
        assert_eq!(
            delete(&config(), Some("billtst"), Some("WEBSRV")).unwrap(),
            "RACDCERT DELETE(LABEL('billtst')) ID(WEBSRV)"
        );
        assert_eq!(
            delete(&config(), Some("billtst"), None).unwrap(),
            "RACDCERT DELETE(LABEL('billtst'))"
        );
    }

    #[test]
    fn test_delete_requires_label() {
        let err = delete(&config(), None, None).unwrap_err();
        assert!(matches!(
            err,
            RacfAdminError::MandatoryFieldMissing { field: "certificate label", .. }
        ));
    }

    #[test]
    fn test_effective_label() {
        let dn = DistinguishedName::common_name("cn1");
        assert_eq!(effective_label(Some("lbl"), &dn), Some("lbl"));
        assert_eq!(effective_label(Some(" "), &dn), Some("cn1"));
        assert_eq!(effective_label(None, &DistinguishedName::default()), None);
    }
}
