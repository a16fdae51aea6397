//! Application-wide constants
//!
//! The remote contract constants (payload URL, portal port, service unit
//! name, install directory) are shared with the install payload running on
//! the Pi and must not change without a matching payload release.

use std::path::PathBuf;

// =============================================================================
// Remote contract
// =============================================================================

/// Well-known URL of the install payload
pub const INSTALL_SCRIPT_URL: &str =
    "https://raw.githubusercontent.com/eaudunord/taisen-web-ui/main/install.sh";

/// Port the web interface listens on after installation
pub const PORTAL_PORT: u16 = 1999;

/// systemd unit name of the installed service
pub const SERVICE_NAME: &str = "dreampi-linkcable";

/// Installation directory on the Pi
pub const INSTALL_DIR: &str = "/opt/dreampi-linkcable";

// =============================================================================
// Connection defaults
// =============================================================================

/// Default Pi hostname (stock DreamPi image)
pub const DEFAULT_HOSTNAME: &str = "dreampi.local";

/// Default SSH username
pub const DEFAULT_USERNAME: &str = "pi";

/// Default SSH password
pub const DEFAULT_PASSWORD: &str = "raspberry";

/// Default SSH port
pub const DEFAULT_SSH_PORT: u16 = 22;

// =============================================================================
// Timeouts
// =============================================================================

/// Probe timeout for the interactive connection test
pub const TEST_PROBE_TIMEOUT_SECS: u64 = 5;

/// Probe timeout for the pre-install connect step
pub const CONNECT_PROBE_TIMEOUT_SECS: u64 = 10;

/// HTTP timeout for downloading the install payload
pub const DOWNLOAD_TIMEOUT_SECS: u64 = 30;

/// Timeout for the remote install script
pub const INSTALL_TIMEOUT_SECS: u64 = 300;

/// Grace delay before post-install verification, giving the freshly
/// started service time to bind its port
pub const VERIFY_GRACE_SECS: u64 = 5;

/// Probe timeout for post-install verification (longest of the probe
/// timeouts; the service may still be initializing)
pub const VERIFY_PROBE_TIMEOUT_SECS: u64 = 15;

/// Timeout for the best-effort service status query when verification
/// cannot reach the portal port
pub const STATUS_QUERY_TIMEOUT_SECS: u64 = 30;

/// Timeout for the remote teardown script
pub const UNINSTALL_TIMEOUT_SECS: u64 = 120;

// =============================================================================
// UI / channel sizing
// =============================================================================

/// Maximum lines to retain in output buffer
pub const OUTPUT_BUFFER_SIZE: usize = 200;

/// Event poll timeout in milliseconds
pub const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Spinner animation interval in milliseconds
pub const SPINNER_TICK_MS: u128 = 100;

/// Channel buffer size for workflow messages
pub const WORKFLOW_CHANNEL_SIZE: usize = 100;

/// Maximum length for user text input (prevents memory exhaustion)
pub const MAX_INPUT_LENGTH: usize = 100;

// =============================================================================
// Local files
// =============================================================================

/// Settings file name inside the data directory
pub const SETTINGS_FILE: &str = "dreampi_installer_config.json";

/// Screen log file name inside the data directory
pub const SCREEN_LOG_FILE: &str = "last-run.log";

/// Data directory for settings and logs
pub fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("dreampi-installer"))
        .unwrap_or_else(|| PathBuf::from("/tmp/dreampi-installer"))
}
