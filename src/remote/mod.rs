//! Remote command execution over SSH
//!
//! Commands run through the system `ssh` binary with host-key verification
//! disabled and password authentication forced. This is a deliberate
//! simplification for a single-purpose installer talking to a freshly
//! imaged Pi, not a general SSH client policy. The command text may be an
//! entire multi-line shell script passed as the final argument; there is
//! no file transfer step.

pub mod errors;

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

use crate::settings::ConnectionConfig;

/// Outcome of one remote command invocation
#[derive(Debug, Clone, Default)]
pub struct ExecutionResult {
    /// Remote exit code; -1 when the command timed out
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    fn timed_out(timeout: Duration) -> Self {
        Self {
            exit_code: -1,
            stdout: String::new(),
            stderr: format!("SSH command timed out after {} seconds", timeout.as_secs()),
        }
    }
}

/// The SSH transport itself could not be started or driven. Kept distinct
/// from a remote command failing so callers can tell "ssh is broken on
/// this machine" apart from "the script on the Pi exited non-zero".
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to start ssh: {0}")]
    Spawn(String),
    #[error("ssh session error: {0}")]
    Session(String),
}

/// Executes a command on the target device
#[async_trait]
pub trait RemoteShell: Send + Sync {
    async fn execute(
        &self,
        config: &ConnectionConfig,
        command: &str,
        timeout: Duration,
    ) -> Result<ExecutionResult, TransportError>;
}

/// Production executor spawning the system `ssh` binary, with `sshpass`
/// for password entry when available.
pub struct SshExecutor;

/// Build the ssh argument vector (everything after the binary name).
/// Host keys are accepted blindly and key-based auth is rejected so a
/// reflashed Pi never triggers an interactive prompt.
fn build_ssh_args(config: &ConnectionConfig, command: &str, timeout: Duration) -> Vec<String> {
    let connect_timeout = timeout.as_secs().min(30);
    vec![
        "-o".to_string(),
        "StrictHostKeyChecking=no".to_string(),
        "-o".to_string(),
        "UserKnownHostsFile=/dev/null".to_string(),
        "-o".to_string(),
        "PreferredAuthentications=password".to_string(),
        "-o".to_string(),
        "PubkeyAuthentication=no".to_string(),
        "-o".to_string(),
        format!("ConnectTimeout={}", connect_timeout),
        "-p".to_string(),
        config.port.to_string(),
        format!("{}@{}", config.username.trim(), config.hostname.trim()),
        command.to_string(),
    ]
}

/// Check if a command exists on this machine
async fn command_exists(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false)
}

#[async_trait]
impl RemoteShell for SshExecutor {
    async fn execute(
        &self,
        config: &ConnectionConfig,
        command: &str,
        timeout: Duration,
    ) -> Result<ExecutionResult, TransportError> {
        let ssh_args = build_ssh_args(config, command, timeout);
        tracing::info!(
            "Running ssh to {}@{}:{} (timeout {}s)",
            config.username,
            config.hostname,
            config.port,
            timeout.as_secs()
        );

        let mut cmd = if command_exists("sshpass").await {
            let mut c = Command::new("sshpass");
            c.arg("-p").arg(&config.password).arg("ssh").args(&ssh_args);
            c
        } else {
            // Without sshpass, point SSH_ASKPASS at a no-op so ssh cannot
            // hang on an interactive password prompt.
            let mut c = Command::new("ssh");
            c.args(&ssh_args)
                .env("SSH_ASKPASS", "echo")
                .env("DISPLAY", "dummy:0");
            c
        };

        let mut child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| TransportError::Spawn(e.to_string()))?;

        let mut stdout_pipe = child
            .stdout
            .take()
            .ok_or_else(|| TransportError::Session("failed to capture stdout".to_string()))?;
        let mut stderr_pipe = child
            .stderr
            .take()
            .ok_or_else(|| TransportError::Session("failed to capture stderr".to_string()))?;

        // Drain both pipes concurrently with the wait; the expected output
        // is bounded (an install log of a few hundred lines), so full
        // buffering is fine.
        let stdout_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stdout_pipe.read_to_end(&mut buf).await;
            buf
        });
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr_pipe.read_to_end(&mut buf).await;
            buf
        });

        let status = match tokio::time::timeout(timeout, child.wait()).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => return Err(TransportError::Session(e.to_string())),
            Err(_) => {
                // Forced kill on expiry; timeout is a reportable outcome,
                // not a transport defect.
                let _ = child.start_kill();
                let _ = child.wait().await;
                stdout_task.abort();
                stderr_task.abort();
                tracing::warn!("ssh timed out after {}s", timeout.as_secs());
                return Ok(ExecutionResult::timed_out(timeout));
            }
        };

        let stdout = String::from_utf8_lossy(&stdout_task.await.unwrap_or_default()).to_string();
        let stderr = String::from_utf8_lossy(&stderr_task.await.unwrap_or_default()).to_string();
        let exit_code = status.code().unwrap_or(-1);

        tracing::info!("ssh completed with exit code {}", exit_code);
        Ok(ExecutionResult {
            exit_code,
            stdout,
            stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ConnectionConfig {
        ConnectionConfig::default()
    }

    #[test]
    fn test_ssh_args_disable_host_key_checks() {
        let args = build_ssh_args(&test_config(), "true", Duration::from_secs(60));
        let joined = args.join(" ");
        assert!(joined.contains("StrictHostKeyChecking=no"));
        assert!(joined.contains("UserKnownHostsFile=/dev/null"));
    }

    #[test]
    fn test_ssh_args_force_password_auth() {
        let args = build_ssh_args(&test_config(), "true", Duration::from_secs(60));
        let joined = args.join(" ");
        assert!(joined.contains("PreferredAuthentications=password"));
        assert!(joined.contains("PubkeyAuthentication=no"));
    }

    #[test]
    fn test_ssh_args_target_and_command() {
        let config = ConnectionConfig {
            hostname: "192.168.1.7".to_string(),
            port: 2222,
            username: "dc".to_string(),
            password: "x".to_string(),
        };
        let script = "#!/bin/bash\necho hello";
        let args = build_ssh_args(&config, script, Duration::from_secs(10));
        assert_eq!(args[args.len() - 2], "dc@192.168.1.7");
        // Whole script travels as the final single argument
        assert_eq!(args[args.len() - 1], script);
        let port_idx = args.iter().position(|a| a == "-p").unwrap();
        assert_eq!(args[port_idx + 1], "2222");
    }

    #[test]
    fn test_connect_timeout_capped_at_30() {
        let args = build_ssh_args(&test_config(), "true", Duration::from_secs(300));
        assert!(args.iter().any(|a| a == "ConnectTimeout=30"));

        let args = build_ssh_args(&test_config(), "true", Duration::from_secs(10));
        assert!(args.iter().any(|a| a == "ConnectTimeout=10"));
    }

    #[test]
    fn test_timed_out_result_shape() {
        let result = ExecutionResult::timed_out(Duration::from_secs(120));
        assert_eq!(result.exit_code, -1);
        assert!(!result.success());
        assert!(result.stderr.contains("timed out after 120 seconds"));
    }
}
