//! Application state types and enums

use std::collections::VecDeque;

use crate::settings::{ConnectionConfig, ShortcutOptions};
use crate::workflow::steps;

/// Main menu items
pub const MAIN_MENU_ITEMS: &[&str] = &[
    "Install DreamPi Link Cable",
    "Uninstall from the Pi",
    "Test Pi connection",
    "Pi configuration",
    "Exit",
];

/// Application mode/screen
#[derive(Debug, Clone)]
pub enum AppMode {
    MainMenu { selected: usize },
    Configure(ConfigureState),
    Install(InstallState),
    Uninstall(UninstallState),
    TestConnection(TestState),
}

/// Which configuration row is currently active
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigField {
    Hostname,
    Port,
    Username,
    Password,
    ShowPassword,
    DesktopShortcut,
    StartMenuShortcut,
    Save,
    Reset,
}

impl ConfigField {
    pub const ORDER: &'static [ConfigField] = &[
        ConfigField::Hostname,
        ConfigField::Port,
        ConfigField::Username,
        ConfigField::Password,
        ConfigField::ShowPassword,
        ConfigField::DesktopShortcut,
        ConfigField::StartMenuShortcut,
        ConfigField::Save,
        ConfigField::Reset,
    ];

    pub fn is_text(&self) -> bool {
        matches!(
            self,
            ConfigField::Hostname
                | ConfigField::Port
                | ConfigField::Username
                | ConfigField::Password
        )
    }

    pub fn next(&self) -> ConfigField {
        let idx = Self::ORDER.iter().position(|f| f == self).unwrap_or(0);
        Self::ORDER[(idx + 1) % Self::ORDER.len()]
    }

    pub fn prev(&self) -> ConfigField {
        let idx = Self::ORDER.iter().position(|f| f == self).unwrap_or(0);
        Self::ORDER[(idx + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// Draft of the connection settings being edited. Nothing is persisted
/// until the Save row commits a valid draft.
#[derive(Debug, Clone)]
pub struct ConfigureState {
    pub hostname: String,
    pub port: String,
    pub username: String,
    pub password: String,
    pub show_password: bool,
    pub desktop_shortcut: bool,
    pub start_menu_shortcut: bool,
    pub active_field: ConfigField,
    pub error: Option<String>,
}

impl ConfigureState {
    pub fn from_settings(config: &ConnectionConfig, options: &ShortcutOptions) -> Self {
        Self {
            hostname: config.hostname.clone(),
            port: config.port.to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
            show_password: false,
            desktop_shortcut: options.desktop,
            start_menu_shortcut: options.start_menu,
            active_field: ConfigField::Hostname,
            error: None,
        }
    }

    /// Parse and validate the draft into persistable settings
    pub fn to_settings(&self) -> Result<(ConnectionConfig, ShortcutOptions), String> {
        let port: u16 = self
            .port
            .trim()
            .parse()
            .map_err(|_| "Port must be a number between 1 and 65535".to_string())?;
        if port == 0 {
            return Err("Port must be a number between 1 and 65535".to_string());
        }
        let config = ConnectionConfig {
            hostname: self.hostname.trim().to_string(),
            port,
            username: self.username.trim().to_string(),
            password: self.password.clone(),
        };
        if let Some(msg) = config.validate() {
            return Err(msg);
        }
        Ok((
            config,
            ShortcutOptions {
                desktop: self.desktop_shortcut,
                start_menu: self.start_menu_shortcut,
            },
        ))
    }

    pub fn reset_to_defaults(&mut self) {
        let defaults = ConnectionConfig::default();
        self.hostname = defaults.hostname;
        self.port = defaults.port.to_string();
        self.username = defaults.username;
        self.password = defaults.password;
        self.desktop_shortcut = true;
        self.start_menu_shortcut = true;
        self.error = None;
    }
}

/// Installation state machine
#[derive(Debug, Clone)]
pub enum InstallState {
    /// What-will-happen summary shown before anything runs
    Overview,
    Running {
        step: usize,
        steps: Vec<StepStatus>,
        output: VecDeque<String>,
    },
    Complete {
        success: bool,
        /// Web interface URL on success
        url: Option<String>,
        output: VecDeque<String>,
        /// None = auto-scroll, Some(n) = manual scroll at position n
        scroll_offset: Option<usize>,
    },
}

impl InstallState {
    pub fn new_running() -> Self {
        InstallState::Running {
            step: 0,
            steps: install_steps(),
            output: VecDeque::new(),
        }
    }
}

pub fn install_steps() -> Vec<StepStatus> {
    vec![
        StepStatus::new(steps::CONNECT, "Connect to the Pi"),
        StepStatus::new(steps::DOWNLOAD, "Download setup script"),
        StepStatus::new(steps::INSTALL, "Install on the Pi"),
        StepStatus::new(steps::VERIFY, "Verify web service"),
        StepStatus::new(steps::SHORTCUTS, "Create shortcuts"),
    ]
}

/// Uninstall state machine
#[derive(Debug, Clone)]
pub enum UninstallState {
    Confirm,
    Running {
        step: usize,
        steps: Vec<StepStatus>,
        output: VecDeque<String>,
    },
    Complete {
        success: bool,
        output: VecDeque<String>,
        /// None = auto-scroll, Some(n) = manual scroll at position n
        scroll_offset: Option<usize>,
    },
}

impl UninstallState {
    pub fn new_running() -> Self {
        UninstallState::Running {
            step: 0,
            steps: vec![StepStatus::new(
                steps::UNINSTALL,
                "Remove service from the Pi",
            )],
            output: VecDeque::new(),
        }
    }
}

/// Connection test state
#[derive(Debug, Clone)]
pub enum TestState {
    Running {
        output: VecDeque<String>,
    },
    Complete {
        success: bool,
        output: VecDeque<String>,
    },
}

impl TestState {
    pub fn new_running() -> Self {
        TestState::Running {
            output: VecDeque::new(),
        }
    }
}

/// Step progress status. The key ties UI rows to workflow messages so
/// matching never depends on display text.
#[derive(Debug, Clone)]
pub struct StepStatus {
    pub key: &'static str,
    pub name: String,
    pub status: StepState,
}

impl StepStatus {
    pub fn new(key: &'static str, name: &str) -> Self {
        Self {
            key,
            name: name.to_string(),
            status: StepState::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepState {
    Pending,
    Running,
    Complete,
    /// Completed, but with a caveat worth the user's attention
    Warning,
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_field_cycle() {
        let mut field = ConfigField::Hostname;
        for _ in 0..ConfigField::ORDER.len() {
            field = field.next();
        }
        assert_eq!(field, ConfigField::Hostname);
        assert_eq!(ConfigField::Hostname.prev(), ConfigField::Reset);
    }

    #[test]
    fn test_configure_rejects_bad_port() {
        let mut state = ConfigureState::from_settings(
            &ConnectionConfig::default(),
            &ShortcutOptions::default(),
        );
        state.port = "0".to_string();
        assert!(state.to_settings().is_err());
        state.port = "not-a-port".to_string();
        assert!(state.to_settings().is_err());
    }

    #[test]
    fn test_configure_round_trip() {
        let config = ConnectionConfig {
            hostname: "192.168.1.40".to_string(),
            port: 2222,
            username: "dc".to_string(),
            password: "secret".to_string(),
        };
        let options = ShortcutOptions {
            desktop: false,
            start_menu: true,
        };
        let state = ConfigureState::from_settings(&config, &options);
        let (parsed, parsed_options) = state.to_settings().unwrap();
        assert_eq!(parsed.hostname, config.hostname);
        assert_eq!(parsed.port, 2222);
        assert!(!parsed_options.desktop);
        assert!(parsed_options.start_menu);
    }

    #[test]
    fn test_reset_restores_stock_values() {
        let mut state = ConfigureState::from_settings(
            &ConnectionConfig {
                hostname: "elsewhere".to_string(),
                port: 2222,
                username: "x".to_string(),
                password: "y".to_string(),
            },
            &ShortcutOptions {
                desktop: false,
                start_menu: false,
            },
        );
        state.reset_to_defaults();
        assert_eq!(state.hostname, "dreampi.local");
        assert_eq!(state.port, "22");
        assert_eq!(state.username, "pi");
        assert!(state.desktop_shortcut);
    }

    #[test]
    fn test_install_steps_order() {
        let step_list = install_steps();
        let keys: Vec<_> = step_list.iter().map(|s| s.key).collect();
        assert_eq!(
            keys,
            vec![
                steps::CONNECT,
                steps::DOWNLOAD,
                steps::INSTALL,
                steps::VERIFY,
                steps::SHORTCUTS
            ]
        );
        assert!(step_list.iter().all(|s| s.status == StepState::Pending));
    }
}
