//! Persisted application configuration.
//!
//! Stored as TOML under the platform config directory. Holds the credential
//! produced by a successful login plus user defaults. Loading degrades to
//! defaults when the file is missing or unparseable; saving restricts the
//! file to the owner since it contains the access token.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub auth: StoredCredential,
    pub defaults: Defaults,
}

/// Credential written after a validated login.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoredCredential {
    pub access_token: String,
    pub user_uuid: String,
    pub public_user_uuid: String,
    pub user_name: String,
    pub email: String,
}

/// User-tunable defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Defaults {
    /// Servings to scale recipes to when adding them to a list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
    /// List UUID used when no `--list` flag is given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_list: Option<String>,
    /// Preferred catalog/translation locale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl AppConfig {
    /// Load from the default path; defaults if the file is missing or bad.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!(
                        "Failed to parse config at {}: {e} — using defaults",
                        path.display()
                    );
                    Self::default()
                }
            },
            Err(_) => {
                log::debug!("No config file at {} — using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Save to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save to an explicit path, creating parent directories and narrowing
    /// permissions to the owner.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        restrict_permissions(path)?;
        log::info!("Config saved to {}", path.display());
        Ok(())
    }

    /// Remove the config file. Idempotent.
    pub fn clear() -> Result<()> {
        Self::clear_at(&Self::config_path())
    }

    pub fn clear_at(path: &Path) -> Result<()> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// A credential is stored.
    pub fn is_logged_in(&self) -> bool {
        !self.auth.access_token.is_empty()
    }

    /// `<config-dir>/bringr/config.toml`
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("bringr").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AppConfig {
        AppConfig {
            auth: StoredCredential {
                access_token: "token".to_string(),
                user_uuid: "user".to_string(),
                public_user_uuid: "public".to_string(),
                user_name: "Tester".to_string(),
                email: "test@example.com".to_string(),
            },
            defaults: Defaults {
                servings: Some(3),
                default_list: Some("list-1".to_string()),
                locale: Some("en-US".to_string()),
            },
        }
    }

    #[test]
    fn test_default_config_not_logged_in() {
        let config = AppConfig::default();
        assert!(!config.is_logged_in());
        assert!(config.defaults.servings.is_none());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");

        sample().save_to(&path).expect("save should succeed");
        let loaded = AppConfig::load_from(&path);

        assert!(loaded.is_logged_in());
        assert_eq!(loaded.auth.access_token, "token");
        assert_eq!(loaded.auth.user_uuid, "user");
        assert_eq!(loaded.defaults.servings, Some(3));
        assert_eq!(loaded.defaults.default_list.as_deref(), Some("list-1"));
    }

    #[test]
    fn test_load_missing_file_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(!config.is_logged_in());
    }

    #[test]
    fn test_load_corrupt_file_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not [valid toml").unwrap();

        let config = AppConfig::load_from(&path);
        assert!(!config.is_logged_in());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");

        sample().save_to(&path).unwrap();
        AppConfig::clear_at(&path).expect("clear should succeed");
        assert!(!path.exists());
        AppConfig::clear_at(&path).expect("second clear is a no-op");
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        sample().save_to(&path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
