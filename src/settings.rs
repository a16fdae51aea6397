//! Connection settings persistence
//!
//! Settings are stored as JSON in the user data directory. Load failures
//! fall back to the stock DreamPi defaults silently; the installer must
//! stay usable on a machine that has never run it before.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_HOSTNAME, DEFAULT_PASSWORD, DEFAULT_SSH_PORT, DEFAULT_USERNAME, SETTINGS_FILE,
};

/// SSH connection details for the target Pi
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub hostname: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            hostname: DEFAULT_HOSTNAME.to_string(),
            port: DEFAULT_SSH_PORT,
            username: DEFAULT_USERNAME.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
        }
    }
}

impl ConnectionConfig {
    /// Validate the fields every workflow requires. Returns a user-facing
    /// message for the first problem found.
    pub fn validate(&self) -> Option<String> {
        if self.hostname.trim().is_empty() {
            return Some("Hostname cannot be empty".to_string());
        }
        if self.username.trim().is_empty() {
            return Some("Username cannot be empty".to_string());
        }
        if self.port == 0 {
            return Some("Port must be between 1 and 65535".to_string());
        }
        None
    }

    /// Web interface address once the service is installed
    pub fn portal_url(&self) -> String {
        format!("http://{}:{}", self.hostname.trim(), crate::constants::PORTAL_PORT)
    }
}

/// Which shortcuts to create after a successful install
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShortcutOptions {
    pub desktop: bool,
    pub start_menu: bool,
}

impl Default for ShortcutOptions {
    fn default() -> Self {
        Self {
            desktop: true,
            start_menu: true,
        }
    }
}

/// On-disk shape: connection fields at the top level for compatibility
/// with older settings files, shortcut options nested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct StoredSettings {
    #[serde(flatten)]
    connection: ConnectionConfig,
    #[serde(default)]
    shortcuts: ShortcutOptions,
}

/// Path of the settings file
pub fn settings_path() -> PathBuf {
    crate::constants::data_dir().join(SETTINGS_FILE)
}

/// Load settings, falling back to defaults on any failure
pub fn load() -> (ConnectionConfig, ShortcutOptions) {
    load_from(&settings_path())
}

fn load_from(path: &Path) -> (ConnectionConfig, ShortcutOptions) {
    let stored = match std::fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<StoredSettings>(&content) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!("Ignoring malformed settings file {}: {}", path.display(), e);
                StoredSettings::default()
            }
        },
        Err(_) => StoredSettings::default(),
    };
    (stored.connection, stored.shortcuts)
}

/// Save settings to the data directory
pub fn save(config: &ConnectionConfig, options: &ShortcutOptions) -> Result<()> {
    save_to(config, options, &settings_path())
}

fn save_to(config: &ConnectionConfig, options: &ShortcutOptions, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let stored = StoredSettings {
        connection: config.clone(),
        shortcuts: *options,
    };
    let json = serde_json::to_string_pretty(&stored)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write settings to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_stock_image() {
        let config = ConnectionConfig::default();
        assert_eq!(config.hostname, "dreampi.local");
        assert_eq!(config.port, 22);
        assert_eq!(config.username, "pi");
        assert_eq!(config.password, "raspberry");
    }

    #[test]
    fn test_portal_url() {
        let config = ConnectionConfig::default();
        assert_eq!(config.portal_url(), "http://dreampi.local:1999");
    }

    #[test]
    fn test_validate_rejects_empty_hostname() {
        let config = ConnectionConfig {
            hostname: "  ".to_string(),
            ..ConnectionConfig::default()
        };
        assert!(config.validate().is_some());
    }

    #[test]
    fn test_validate_rejects_empty_username() {
        let config = ConnectionConfig {
            username: String::new(),
            ..ConnectionConfig::default()
        };
        assert!(config.validate().is_some());
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(ConnectionConfig::default().validate().is_none());
    }

    #[test]
    fn test_validate_accepts_empty_password() {
        // Passwords are not validated; some images allow empty ones and
        // the SSH server is the authority either way.
        let config = ConnectionConfig {
            password: String::new(),
            ..ConnectionConfig::default()
        };
        assert!(config.validate().is_none());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let config = ConnectionConfig {
            hostname: "192.168.1.50".to_string(),
            port: 2222,
            username: "dreamcast".to_string(),
            password: "secret".to_string(),
        };
        let options = ShortcutOptions {
            desktop: false,
            start_menu: true,
        };
        save_to(&config, &options, &path).unwrap();
        assert_eq!(load_from(&path), (config, options));
    }

    #[test]
    fn test_load_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, options) = load_from(&dir.path().join("nope.json"));
        assert_eq!(config, ConnectionConfig::default());
        assert_eq!(options, ShortcutOptions::default());
    }

    #[test]
    fn test_load_malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(load_from(&path).0, ConnectionConfig::default());
    }

    #[test]
    fn test_load_settings_file_without_shortcut_options() {
        // Older settings files carry only the connection fields
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"hostname":"10.0.0.9","port":22,"username":"pi","password":"raspberry"}"#,
        )
        .unwrap();
        let (config, options) = load_from(&path);
        assert_eq!(config.hostname, "10.0.0.9");
        assert_eq!(options, ShortcutOptions::default());
    }
}
