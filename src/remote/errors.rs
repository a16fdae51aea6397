//! Remote failure parsing and categorization
//!
//! Parses stderr from failed ssh invocations and remote scripts and turns
//! it into user-friendly messages with actionable suggestions.

use regex::Regex;
use std::sync::LazyLock;

/// Parsed error with user-friendly information
#[derive(Debug, Clone)]
pub struct ParsedError {
    /// Short summary (one line)
    pub summary: String,
    /// Longer description if available
    pub detail: Option<String>,
    /// User-friendly suggestion
    pub suggestion: String,
}

/// Context about what operation was running
pub struct ErrorContext {
    pub operation: String,
}

impl ParsedError {
    /// Parse stderr output into a categorized error
    pub fn from_stderr(stderr: &str, context: ErrorContext) -> Self {
        if let Some(err) = parse_auth_error(stderr) {
            return err;
        }
        if let Some(err) = parse_connection_error(stderr) {
            return err;
        }
        if let Some(err) = parse_sshpass_error(stderr) {
            return err;
        }
        if let Some(err) = parse_systemd_error(stderr) {
            return err;
        }
        if let Some(err) = parse_sudo_error(stderr) {
            return err;
        }

        Self::generic(stderr, context)
    }

    fn generic(stderr: &str, context: ErrorContext) -> Self {
        let first_error = stderr
            .lines()
            .find(|line| line.to_lowercase().contains("error"))
            .or_else(|| stderr.lines().find(|line| !line.trim().is_empty()))
            .unwrap_or("Unknown error");

        let detail = first_error.trim().to_string();

        Self {
            summary: format!("{} failed", context.operation),
            detail: if detail.is_empty() { None } else { Some(detail) },
            suggestion: "Check the output above for details.".to_string(),
        }
    }
}

fn parse_auth_error(stderr: &str) -> Option<ParsedError> {
    let lower = stderr.to_lowercase();
    if lower.contains("permission denied") && lower.contains("password") {
        return Some(ParsedError {
            summary: "SSH authentication failed".to_string(),
            detail: None,
            suggestion:
                "Check the username and password in the Pi Configuration screen. \
                 The stock image uses pi/raspberry."
                    .to_string(),
        });
    }
    if lower.contains("host key verification failed") {
        return Some(ParsedError {
            summary: "Host key verification failed".to_string(),
            detail: None,
            suggestion: "Remove the stale entry from ~/.ssh/known_hosts and retry.".to_string(),
        });
    }
    None
}

// ssh prints "ssh: connect to host dreampi.local port 22: Connection refused"
static CONNECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"connect to host (\S+) port (\d+)").expect("connect regex is statically validated")
});

fn parse_connection_error(stderr: &str) -> Option<ParsedError> {
    let lower = stderr.to_lowercase();

    if lower.contains("could not resolve hostname") {
        return Some(ParsedError {
            summary: "Cannot resolve the Pi's hostname".to_string(),
            detail: None,
            suggestion:
                "Check the hostname/IP address, or use the Pi's IP address directly \
                 (find it with 'ip addr' on the Pi or in your router)."
                    .to_string(),
        });
    }

    let patterns = [
        ("connection refused", "SSH connection refused"),
        ("connection timed out", "SSH connection timed out"),
        ("network is unreachable", "Network unreachable"),
        ("no route to host", "Cannot reach the Pi"),
    ];
    for (pattern, summary) in patterns {
        if lower.contains(pattern) {
            let detail = CONNECT_RE
                .captures(stderr)
                .map(|c| format!("Target: {}:{}", &c[1], &c[2]));
            return Some(ParsedError {
                summary: summary.to_string(),
                detail,
                suggestion:
                    "Make sure the Pi is powered on, connected to the network, and SSH is \
                     enabled (sudo systemctl enable --now ssh)."
                        .to_string(),
            });
        }
    }
    None
}

fn parse_sshpass_error(stderr: &str) -> Option<ParsedError> {
    if stderr.to_lowercase().contains("sshpass: command not found") {
        return Some(ParsedError {
            summary: "sshpass is not installed".to_string(),
            detail: None,
            suggestion: "Install sshpass with your package manager and retry.".to_string(),
        });
    }
    None
}

// systemd prints "Unit dreampi-linkcable.service not found." or
// "Failed to start dreampi-linkcable.service: ..."
static UNIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:Unit|Failed to \w+) (\S+\.service)")
        .expect("unit regex is statically validated")
});

fn parse_systemd_error(stderr: &str) -> Option<ParsedError> {
    let lower = stderr.to_lowercase();
    if lower.contains(".service") && (lower.contains("failed") || lower.contains("not found")) {
        let unit = UNIT_RE
            .captures(stderr)
            .map(|c| format!("Unit: {}", &c[1]));
        return Some(ParsedError {
            summary: "Service operation failed on the Pi".to_string(),
            detail: unit,
            suggestion: format!(
                "Inspect the service on the Pi: sudo journalctl -u {} -n 50",
                crate::constants::SERVICE_NAME
            ),
        });
    }
    None
}

fn parse_sudo_error(stderr: &str) -> Option<ParsedError> {
    let lower = stderr.to_lowercase();
    if lower.contains("sudo") && (lower.contains("password is required") || lower.contains("a terminal is required")) {
        return Some(ParsedError {
            summary: "sudo on the Pi requires a password".to_string(),
            detail: None,
            suggestion:
                "The installer expects passwordless sudo for the Pi user (the stock image \
                 default). Configure NOPASSWD in sudoers or install manually."
                    .to_string(),
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(op: &str) -> ErrorContext {
        ErrorContext {
            operation: op.to_string(),
        }
    }

    #[test]
    fn test_auth_failure() {
        let err = ParsedError::from_stderr(
            "pi@dreampi.local: Permission denied (publickey,password).",
            ctx("Install"),
        );
        assert_eq!(err.summary, "SSH authentication failed");
        assert!(err.suggestion.contains("pi/raspberry"));
    }

    #[test]
    fn test_connection_refused_extracts_target() {
        let err = ParsedError::from_stderr(
            "ssh: connect to host dreampi.local port 22: Connection refused",
            ctx("Install"),
        );
        assert_eq!(err.summary, "SSH connection refused");
        assert_eq!(err.detail.as_deref(), Some("Target: dreampi.local:22"));
    }

    #[test]
    fn test_resolution_failure() {
        let err = ParsedError::from_stderr(
            "ssh: Could not resolve hostname dreampi.locl: Name or service not known",
            ctx("Install"),
        );
        assert_eq!(err.summary, "Cannot resolve the Pi's hostname");
    }

    #[test]
    fn test_systemd_unit_failure() {
        let err = ParsedError::from_stderr(
            "Failed to stop dreampi-linkcable.service: Unit dreampi-linkcable.service not loaded.",
            ctx("Uninstall"),
        );
        assert_eq!(err.summary, "Service operation failed on the Pi");
        assert_eq!(err.detail.as_deref(), Some("Unit: dreampi-linkcable.service"));
    }

    #[test]
    fn test_sudo_password_required() {
        let err = ParsedError::from_stderr(
            "sudo: a password is required",
            ctx("Uninstall"),
        );
        assert_eq!(err.summary, "sudo on the Pi requires a password");
    }

    #[test]
    fn test_generic_fallback_uses_operation() {
        let err = ParsedError::from_stderr("something odd happened", ctx("Download"));
        assert_eq!(err.summary, "Download failed");
        assert_eq!(err.detail.as_deref(), Some("something odd happened"));
    }

    #[test]
    fn test_generic_fallback_empty_stderr() {
        let err = ParsedError::from_stderr("", ctx("Install"));
        assert_eq!(err.summary, "Install failed");
        assert_eq!(err.detail.as_deref(), Some("Unknown error"));
    }
}
