//! Application state management
//!
//! This module contains the core application state and is split into:
//! - `state.rs` - State type definitions (AppMode, InstallState, etc.)
//! - `handlers.rs` - Keyboard input handlers
//! - `messages.rs` - Workflow message handling

mod handlers;
mod messages;
pub mod state;

use anyhow::Result;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use tokio::sync::mpsc;

use crate::constants::SPINNER_TICK_MS;
use crate::settings::{self, ConnectionConfig, ShortcutOptions};
use crate::workflow::install::InstallContext;
use crate::workflow::{self, RunSlot, WorkflowMessage};

// Re-export commonly used types
pub use state::{
    AppMode, ConfigField, ConfigureState, InstallState, StepState, StepStatus, TestState,
    UninstallState, MAIN_MENU_ITEMS,
};

/// Main application state
pub struct App {
    pub mode: AppMode,
    pub should_quit: bool,
    pub show_exit_confirm: bool,
    pub spinner_state: usize,
    pub last_tick: Instant,
    /// Most recent error summary, shown in the footer
    pub error: Option<String>,
    /// Persisted connection settings; snapshotted by value when a run starts
    pub config: ConnectionConfig,
    pub options: ShortcutOptions,
    run_slot: RunSlot,
    pub(crate) msg_tx: Option<mpsc::Sender<WorkflowMessage>>,
    screen_log: Option<File>,
    pub screen_log_path: PathBuf,
}

impl App {
    pub fn new(initial_mode: AppMode) -> Self {
        // Set up screen log file
        let log_dir = crate::constants::data_dir();
        let _ = std::fs::create_dir_all(&log_dir);
        let screen_log_path = log_dir.join(crate::constants::SCREEN_LOG_FILE);

        // Open log file (truncate existing)
        let mut screen_log = match File::create(&screen_log_path) {
            Ok(file) => Some(file),
            Err(e) => {
                tracing::warn!("Failed to create screen log file: {}", e);
                None
            }
        };

        // Write header to log
        if let Some(ref mut file) = screen_log {
            let _ = writeln!(file, "=== DreamPi Installer Screen Log ===\n");
            let _ = file.flush();
        }

        let (config, options) = settings::load();

        Self {
            mode: initial_mode,
            should_quit: false,
            show_exit_confirm: false,
            spinner_state: 0,
            last_tick: Instant::now(),
            error: None,
            config,
            options,
            run_slot: RunSlot::new(),
            msg_tx: None,
            screen_log,
            screen_log_path,
        }
    }

    pub fn set_message_sender(&mut self, tx: mpsc::Sender<WorkflowMessage>) {
        self.msg_tx = Some(tx);
    }

    /// Write a timestamped line to the screen log file
    pub fn log_to_screen(&mut self, line: &str) {
        if let Some(ref mut file) = self.screen_log {
            let stamp = chrono::Local::now().format("%H:%M:%S");
            let _ = writeln!(file, "[{}] {}", stamp, line);
            let _ = file.flush();
        }
    }

    /// Called on each tick to update animations
    pub fn tick(&mut self) {
        if self.last_tick.elapsed().as_millis() >= SPINNER_TICK_MS {
            self.spinner_state = (self.spinner_state + 1) % 10;
            self.last_tick = Instant::now();
        }
    }

    /// Start the workflow if the initial mode requires one (CLI entry)
    pub fn start_initial_command(&mut self) -> Result<()> {
        match &self.mode {
            AppMode::Install(InstallState::Running { .. }) => self.launch_install(),
            AppMode::Uninstall(UninstallState::Running { .. }) => self.launch_uninstall(),
            AppMode::TestConnection(TestState::Running { .. }) => self.launch_connection_test(),
            _ => Ok(()),
        }
    }

    /// Spawn the install workflow against the current settings snapshot
    pub(super) fn launch_install(&mut self) -> Result<()> {
        let Some(tx) = self.msg_tx.clone() else {
            return Ok(());
        };
        let Some(token) = self.run_slot.try_acquire() else {
            self.reject_busy();
            return Ok(());
        };
        workflow::install::start_install(
            tx,
            self.config.clone(),
            self.options.clone(),
            InstallContext::live(),
            token,
        );
        Ok(())
    }

    pub(super) fn launch_uninstall(&mut self) -> Result<()> {
        let Some(tx) = self.msg_tx.clone() else {
            return Ok(());
        };
        let Some(token) = self.run_slot.try_acquire() else {
            self.reject_busy();
            return Ok(());
        };
        workflow::uninstall::start_uninstall(
            tx,
            self.config.clone(),
            workflow::uninstall::live_shell(),
            token,
        );
        Ok(())
    }

    pub(super) fn launch_connection_test(&mut self) -> Result<()> {
        let Some(tx) = self.msg_tx.clone() else {
            return Ok(());
        };
        workflow::start_connection_test(tx, self.config.clone())
    }

    pub(super) fn run_in_flight(&self) -> bool {
        self.run_slot.is_busy()
    }

    fn reject_busy(&mut self) {
        self.error = Some("An operation is already running".to_string());
        self.log_to_screen("Rejected: an operation is already running");
        self.mode = AppMode::MainMenu { selected: 0 };
    }
}

/// Open a URL in the default browser, best-effort
pub fn open_url(url: &str) {
    #[cfg(target_os = "macos")]
    let opener = "open";
    #[cfg(not(target_os = "macos"))]
    let opener = "xdg-open";

    match std::process::Command::new(opener)
        .arg(url)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
    {
        Ok(_) => tracing::info!("Opened {} in browser", url),
        Err(e) => tracing::warn!("Failed to open {}: {}", url, e),
    }
}
