//! Administration settings — acting principal, command wrapper, and check mode.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RacfAdminError;

/// Top-level configuration threaded through every command builder and reconciler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminConfig {
    /// The user ID the privileged session runs as.
    ///
    /// Owners equal to this principal (or omitted) produce no `ID(...)` or
    /// `OWNER(...)` clause; RACF then defaults to the issuer.
    #[serde(default)]
    pub acting_user: Option<String>,
    /// How commands reach TSO.
    #[serde(default)]
    pub executor: ExecutorConfig,
    /// Plan only: report the commands that would be issued without running them.
    #[serde(default)]
    pub check_mode: bool,
}

/// TSO command wrapper settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Program that runs one TSO command passed as its single argument.
    #[serde(default = "default_program")]
    pub program: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
        }
    }
}

fn default_program() -> String {
    "tsocmd".to_string()
}

impl AdminConfig {
    /// Configuration acting as the given principal.
    pub fn for_user(acting_user: impl Into<String>) -> Self {
        Self {
            acting_user: Some(acting_user.into()),
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RacfAdminError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| RacfAdminError::Config {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        Self::from_toml(&content).map_err(|e| RacfAdminError::Config {
            message: format!("{}: {}", path.display(), e),
        })
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, RacfAdminError> {
        toml::from_str(content).map_err(|e| RacfAdminError::Config {
            message: e.to_string(),
        })
    }

    /// Whether `owner` names the acting principal (or nobody).
    pub fn is_acting_principal(&self, owner: Option<&str>) -> bool {
        match owner.map(str::trim).filter(|o| !o.is_empty()) {
            None => true,
            Some(owner) => self
                .acting_user
                .as_deref()
                .is_some_and(|me| me.trim().eq_ignore_ascii_case(owner)),
        }
    }

    /// The owner to place in an explicit clause, or `None` for the implicit principal.
    pub fn explicit_owner<'a>(&self, owner: Option<&'a str>) -> Option<&'a str> {
        if self.is_acting_principal(owner) {
            None
        } else {
            owner.map(str::trim)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AdminConfig::default();
        assert_eq!(config.executor.program, "tsocmd");
        assert!(config.acting_user.is_none());
        assert!(!config.check_mode);
    }

    #[test]
    fn test_from_toml_partial() {
        let config = AdminConfig::from_toml("acting_user = \"USERX\"\ncheck_mode = true\n").unwrap();
        assert_eq!(config.acting_user.as_deref(), Some("USERX"));
        assert!(config.check_mode);
        assert_eq!(config.executor.program, "tsocmd");
    }

    #[test]
    fn test_from_toml_invalid() {
        let err = AdminConfig::from_toml("check_mode = \"yes\"").unwrap_err();
        assert!(matches!(err, RacfAdminError::Config { .. }));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("racf-admin.toml");
        std::fs::write(&path, "[executor]\nprogram = \"/usr/lpp/bin/tsocmd\"\n").unwrap();
        let config = AdminConfig::from_file(&path).unwrap();
        assert_eq!(config.executor.program, "/usr/lpp/bin/tsocmd");
    }

    #[test]
    fn test_from_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = AdminConfig::from_file(dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn test_acting_principal() {
        let config = AdminConfig::for_user("USERX");
        assert!(config.is_acting_principal(None));
        assert!(config.is_acting_principal(Some("")));
        assert!(config.is_acting_principal(Some("userx")));
        assert!(!config.is_acting_principal(Some("OTHER")));
        assert_eq!(config.explicit_owner(Some("OTHER")), Some("OTHER"));
        assert_eq!(config.explicit_owner(Some("USERX")), None);
    }

    #[test]
    fn test_no_acting_user_keeps_explicit_owner() {
        let config = AdminConfig::default();
        assert_eq!(config.explicit_owner(Some("USERX")), Some("USERX"));
    }
}
