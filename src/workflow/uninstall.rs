//! Uninstall workflow
//!
//! A single remote step running the idempotent teardown script. Running
//! it against a Pi that never had the service installed still succeeds.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use super::{steps, Reporter, RunToken, WorkflowMessage};
use crate::constants::UNINSTALL_TIMEOUT_SECS;
use crate::remote::{RemoteShell, SshExecutor};
use crate::scripts::UNINSTALL_SCRIPT;
use crate::settings::ConnectionConfig;

/// Start the uninstall in the background. The token keeps the run slot
/// claimed until the task finishes.
pub fn start_uninstall(
    tx: mpsc::Sender<WorkflowMessage>,
    config: ConnectionConfig,
    shell: Arc<dyn RemoteShell>,
    token: RunToken,
) {
    tokio::spawn(async move {
        let _token = token;
        if let Err(e) = run_uninstall(&tx, &config, shell.as_ref()).await {
            tracing::error!("Uninstall workflow error: {:#}", e);
            let reporter = Reporter::new(&tx);
            reporter
                .step_failed(steps::UNINSTALL, &e.to_string(), "Uninstall")
                .await;
            reporter.done(false, None).await;
        }
    });
}

pub fn live_shell() -> Arc<dyn RemoteShell> {
    Arc::new(SshExecutor)
}

pub(crate) async fn run_uninstall(
    tx: &mpsc::Sender<WorkflowMessage>,
    config: &ConnectionConfig,
    shell: &dyn RemoteShell,
) -> Result<()> {
    let reporter = Reporter::new(tx);
    reporter.header("STARTING DREAMPI UNINSTALL").await;

    if let Some(msg) = config.validate() {
        reporter.err(&format!("ERROR: {}", msg)).await;
        reporter
            .step_failed(steps::UNINSTALL, &msg, "Uninstall")
            .await;
        reporter.done(false, None).await;
        return Ok(());
    }

    reporter.step_started(steps::UNINSTALL).await;
    reporter
        .out(&format!(
            "Removing the DreamPi Link Cable service from {}...",
            config.hostname.trim()
        ))
        .await;

    match shell
        .execute(
            config,
            UNINSTALL_SCRIPT,
            Duration::from_secs(UNINSTALL_TIMEOUT_SECS),
        )
        .await
    {
        Ok(result) => {
            reporter.remote_output(&result).await;
            if result.success() {
                reporter.step_complete(steps::UNINSTALL).await;
                reporter.header("UNINSTALL COMPLETED SUCCESSFULLY!").await;
                reporter
                    .out("The service and all installed files have been removed.")
                    .await;
                reporter
                    .out("Any local shortcuts can be deleted by hand.")
                    .await;
                reporter.done(true, None).await;
            } else {
                let msg = if result.stderr.trim().is_empty() {
                    format!("Uninstall failed with exit code {}", result.exit_code)
                } else {
                    result.stderr.clone()
                };
                reporter
                    .step_failed(steps::UNINSTALL, &msg, "Uninstall")
                    .await;
                reporter.done(false, None).await;
            }
        }
        Err(e) => {
            let msg = e.to_string();
            reporter.err(&format!("ERROR: {}", msg)).await;
            reporter
                .step_failed(steps::UNINSTALL, &msg, "Uninstall")
                .await;
            reporter.done(false, None).await;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::test_support::*;

    async fn run(shell: &FakeShell, config: &ConnectionConfig) -> Vec<WorkflowMessage> {
        let (tx, mut rx) = tokio::sync::mpsc::channel(256);
        run_uninstall(&tx, config, shell).await.unwrap();
        drop(tx);
        drain(&mut rx)
    }

    #[tokio::test]
    async fn test_uninstall_success() {
        let shell = FakeShell::new(vec![Ok(crate::remote::ExecutionResult {
            exit_code: 0,
            stdout: "=== Uninstall Complete ===".to_string(),
            stderr: String::new(),
        })]);

        let messages = run(&shell, &ConnectionConfig::default()).await;

        let (success, url) = final_done(&messages);
        assert!(success);
        assert!(url.is_none());
        assert_eq!(completed_steps(&messages), vec![steps::UNINSTALL]);
        assert!(shell.commands.lock().unwrap()[0].contains("Uninstaller"));
    }

    #[tokio::test]
    async fn test_uninstall_is_repeatable() {
        // The teardown script tolerates absent state, so a second run
        // against a clean Pi reports success too.
        let shell = FakeShell::new(vec![
            FakeShell::exit_ok(),
            Ok(crate::remote::ExecutionResult {
                exit_code: 0,
                stdout: "OK: Service was not running".to_string(),
                stderr: String::new(),
            }),
        ]);

        let first = run(&shell, &ConnectionConfig::default()).await;
        let second = run(&shell, &ConnectionConfig::default()).await;

        assert!(final_done(&first).0);
        assert!(final_done(&second).0);
        assert_eq!(shell.command_count(), 2);
    }

    #[tokio::test]
    async fn test_uninstall_script_failure() {
        let shell = FakeShell::new(vec![FakeShell::exit_code(1)]);

        let messages = run(&shell, &ConnectionConfig::default()).await;

        let (success, _) = final_done(&messages);
        assert!(!success);
        assert_eq!(failed_steps(&messages), vec![steps::UNINSTALL]);
    }

    #[tokio::test]
    async fn test_uninstall_rejects_invalid_config() {
        let shell = FakeShell::new(vec![]);
        let config = ConnectionConfig {
            hostname: "   ".to_string(),
            ..ConnectionConfig::default()
        };

        let messages = run(&shell, &config).await;

        let (success, _) = final_done(&messages);
        assert!(!success);
        assert_eq!(shell.command_count(), 0);
    }
}
