//! Install workflow
//!
//! Five ordered steps: check SSH reachability, download the published
//! install script, run the installation on the Pi, verify the web portal,
//! and create local shortcuts. The first three are fatal on failure;
//! verification and shortcuts degrade to warnings because a slow service
//! start or a missing desktop directory should not fail an otherwise
//! complete installation.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use super::fetch::{HttpPayloadSource, PayloadSource};
use super::{steps, Reporter, RunToken, WorkflowMessage};
use crate::constants::{
    CONNECT_PROBE_TIMEOUT_SECS, DOWNLOAD_TIMEOUT_SECS, INSTALL_TIMEOUT_SECS, PORTAL_PORT,
    STATUS_QUERY_TIMEOUT_SECS, VERIFY_GRACE_SECS, VERIFY_PROBE_TIMEOUT_SECS,
};
use crate::net::{ConnectivityProbe, ProbeOutcome, TcpProbe};
use crate::remote::{RemoteShell, SshExecutor};
use crate::scripts::{INSTALL_SCRIPT, SERVICE_STATUS_QUERY};
use crate::settings::{ConnectionConfig, ShortcutOptions};
use crate::shortcuts::{ShortcutCreator, UrlFileShortcuts};

/// Collaborators the install workflow runs against. Swapped for fakes in
/// tests; `verify_grace` exists so tests need not wait out the real
/// service settle delay.
pub struct InstallContext {
    pub probe: Arc<dyn ConnectivityProbe>,
    pub payload: Arc<dyn PayloadSource>,
    pub shell: Arc<dyn RemoteShell>,
    pub shortcuts: Arc<dyn ShortcutCreator>,
    pub verify_grace: Duration,
}

impl InstallContext {
    pub fn live() -> Self {
        Self {
            probe: Arc::new(TcpProbe),
            payload: Arc::new(HttpPayloadSource::new()),
            shell: Arc::new(SshExecutor),
            shortcuts: Arc::new(UrlFileShortcuts::new()),
            verify_grace: Duration::from_secs(VERIFY_GRACE_SECS),
        }
    }
}

/// Start the installation in the background. The token keeps the run
/// slot claimed until the task finishes.
pub fn start_install(
    tx: mpsc::Sender<WorkflowMessage>,
    config: ConnectionConfig,
    options: ShortcutOptions,
    ctx: InstallContext,
    token: RunToken,
) {
    tokio::spawn(async move {
        let _token = token;
        if let Err(e) = run_install(&tx, &config, &options, &ctx).await {
            tracing::error!("Install workflow error: {:#}", e);
            let reporter = Reporter::new(&tx);
            reporter
                .step_failed(steps::INSTALL, &e.to_string(), "Installation")
                .await;
            reporter.done(false, None).await;
        }
    });
}

pub(crate) async fn run_install(
    tx: &mpsc::Sender<WorkflowMessage>,
    config: &ConnectionConfig,
    options: &ShortcutOptions,
    ctx: &InstallContext,
) -> Result<()> {
    let reporter = Reporter::new(tx);
    reporter.header("STARTING DREAMPI INSTALLATION").await;

    if let Some(msg) = config.validate() {
        reporter.err(&format!("ERROR: {}", msg)).await;
        reporter
            .step_failed(steps::CONNECT, &msg, "Installation")
            .await;
        reporter.done(false, None).await;
        return Ok(());
    }

    if !step_connect(&reporter, config, ctx).await {
        return Ok(());
    }
    if !step_download(&reporter, ctx).await {
        return Ok(());
    }
    if !step_install(&reporter, config, ctx).await {
        return Ok(());
    }
    step_verify(&reporter, config, ctx).await;
    let (desktop_ok, menu_ok) = step_shortcuts(&reporter, config, options, ctx).await;

    let url = config.portal_url();
    reporter.header("INSTALLATION COMPLETED SUCCESSFULLY!").await;
    reporter
        .out("The DreamPi Link Cable service is now running on your Pi.")
        .await;
    reporter
        .out(&format!("Web interface: {}", url))
        .await;
    if options.desktop {
        reporter
            .out(if desktop_ok {
                "Desktop shortcut created."
            } else {
                "Desktop shortcut could not be created."
            })
            .await;
    }
    if options.start_menu {
        reporter
            .out(if menu_ok {
                "Start menu shortcut created."
            } else {
                "Start menu shortcut could not be created."
            })
            .await;
    }
    reporter.done(true, Some(url)).await;
    Ok(())
}

/// Step 1: the SSH port must answer before anything else is attempted.
async fn step_connect(
    reporter: &Reporter<'_>,
    config: &ConnectionConfig,
    ctx: &InstallContext,
) -> bool {
    reporter.step_started(steps::CONNECT).await;
    let hostname = config.hostname.trim();
    reporter
        .out(&format!(
            "Step 1: Connecting to {}:{}...",
            hostname, config.port
        ))
        .await;

    match ctx
        .probe
        .probe(
            hostname,
            config.port,
            Duration::from_secs(CONNECT_PROBE_TIMEOUT_SECS),
        )
        .await
    {
        ProbeOutcome::Reachable => {
            reporter.out("SSH connection available.").await;
            reporter.step_complete(steps::CONNECT).await;
            true
        }
        ProbeOutcome::Unreachable(reason) => {
            let msg = format!(
                "Cannot connect to {}:{} ({})",
                hostname, config.port, reason
            );
            reporter.err(&format!("ERROR: {}", msg)).await;
            reporter
                .step_failed(steps::CONNECT, &msg, "Connection")
                .await;
            reporter.done(false, None).await;
            false
        }
    }
}

/// Step 2: preflight download of the published install script.
async fn step_download(reporter: &Reporter<'_>, ctx: &InstallContext) -> bool {
    reporter.step_started(steps::DOWNLOAD).await;
    reporter
        .out("Step 2: Downloading installation script...")
        .await;

    match ctx
        .payload
        .fetch(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
        .await
    {
        Ok(body) => {
            reporter
                .out(&format!("Downloaded script ({} bytes).", body.len()))
                .await;
            reporter.step_complete(steps::DOWNLOAD).await;
            true
        }
        Err(e) => {
            let msg = format!("{:#}", e);
            reporter.err(&format!("ERROR: {}", msg)).await;
            reporter
                .step_failed(steps::DOWNLOAD, &msg, "Download")
                .await;
            reporter.done(false, None).await;
            false
        }
    }
}

/// Step 3: run the embedded install script on the Pi over ssh.
async fn step_install(
    reporter: &Reporter<'_>,
    config: &ConnectionConfig,
    ctx: &InstallContext,
) -> bool {
    reporter.step_started(steps::INSTALL).await;
    reporter
        .out("Step 3: Installing on the Pi (this may take several minutes)...")
        .await;

    match ctx
        .shell
        .execute(
            config,
            INSTALL_SCRIPT,
            Duration::from_secs(INSTALL_TIMEOUT_SECS),
        )
        .await
    {
        Ok(result) => {
            reporter.remote_output(&result).await;
            if result.success() {
                reporter.out("Installation script finished.").await;
                reporter.step_complete(steps::INSTALL).await;
                true
            } else {
                let msg = if result.stderr.trim().is_empty() {
                    format!("Installation failed with exit code {}", result.exit_code)
                } else {
                    result.stderr.clone()
                };
                reporter
                    .step_failed(steps::INSTALL, &msg, "Installation")
                    .await;
                reporter.done(false, None).await;
                false
            }
        }
        Err(e) => {
            let msg = e.to_string();
            reporter.err(&format!("ERROR: {}", msg)).await;
            reporter
                .step_failed(steps::INSTALL, &msg, "Installation")
                .await;
            reporter.done(false, None).await;
            false
        }
    }
}

/// Step 4: check the web portal answers. Never fatal; a slow service
/// start downgrades to a warning backed by a best-effort status query.
async fn step_verify(reporter: &Reporter<'_>, config: &ConnectionConfig, ctx: &InstallContext) {
    reporter.step_started(steps::VERIFY).await;
    reporter
        .out("Step 4: Verifying the web service...")
        .await;

    // Give the freshly installed service a moment to bind its port
    tokio::time::sleep(ctx.verify_grace).await;

    let hostname = config.hostname.trim();
    let outcome = ctx
        .probe
        .probe(
            hostname,
            PORTAL_PORT,
            Duration::from_secs(VERIFY_PROBE_TIMEOUT_SECS),
        )
        .await;

    match outcome {
        ProbeOutcome::Reachable => {
            reporter
                .out(&format!(
                    "SUCCESS: Web service responding at {}",
                    config.portal_url()
                ))
                .await;
            reporter.step_complete(steps::VERIFY).await;
        }
        ProbeOutcome::Unreachable(reason) => {
            reporter
                .out(&format!(
                    "WARNING: Web service not yet responding on port {} ({})",
                    PORTAL_PORT, reason
                ))
                .await;
            reporter
                .out("The service may still be starting. Checking its status...")
                .await;
            match ctx
                .shell
                .execute(
                    config,
                    SERVICE_STATUS_QUERY,
                    Duration::from_secs(STATUS_QUERY_TIMEOUT_SECS),
                )
                .await
            {
                Ok(result) => reporter.remote_output(&result).await,
                Err(e) => reporter.err(&format!("Status check failed: {}", e)).await,
            }
            reporter
                .step_warning(
                    steps::VERIFY,
                    "Web service not verified; it may still be starting. \
                     Try the web interface again in a minute.",
                )
                .await;
        }
    }
}

/// Step 5: create requested local shortcuts. Never fatal.
async fn step_shortcuts(
    reporter: &Reporter<'_>,
    config: &ConnectionConfig,
    options: &ShortcutOptions,
    ctx: &InstallContext,
) -> (bool, bool) {
    reporter.step_started(steps::SHORTCUTS).await;

    if !options.desktop && !options.start_menu {
        reporter.out("Step 5: Shortcut creation disabled.").await;
        reporter.step_complete(steps::SHORTCUTS).await;
        return (false, false);
    }

    reporter.out("Step 5: Creating shortcuts...").await;
    let url = config.portal_url();

    let desktop_ok = options.desktop && ctx.shortcuts.create_desktop_shortcut(&url);
    let menu_ok = options.start_menu && ctx.shortcuts.create_start_menu_shortcut(&url);

    let requested =
        usize::from(options.desktop) + usize::from(options.start_menu);
    let created = usize::from(desktop_ok) + usize::from(menu_ok);

    if created == requested {
        reporter
            .out(&format!("Created {} shortcut(s).", created))
            .await;
        reporter.step_complete(steps::SHORTCUTS).await;
    } else {
        reporter
            .out("WARNING: Some shortcuts could not be created.")
            .await;
        reporter
            .step_warning(
                steps::SHORTCUTS,
                "Some shortcuts could not be created. You can still open the \
                 web interface directly.",
            )
            .await;
    }
    (desktop_ok, menu_ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::UnreachableReason;
    use crate::remote::TransportError;
    use crate::workflow::test_support::*;

    fn test_ctx(
        probe: Arc<FakeProbe>,
        payload: Arc<FixedPayload>,
        shell: Arc<FakeShell>,
        shortcuts: Arc<FakeShortcuts>,
    ) -> InstallContext {
        InstallContext {
            probe,
            payload,
            shell,
            shortcuts,
            verify_grace: Duration::ZERO,
        }
    }

    struct FixedPayload {
        result: std::sync::Mutex<Option<anyhow::Result<String>>>,
    }

    impl FixedPayload {
        fn ok() -> Arc<Self> {
            Arc::new(Self {
                result: std::sync::Mutex::new(Some(Ok("#!/bin/bash\n".to_string()))),
            })
        }

        fn err(msg: &str) -> Arc<Self> {
            Arc::new(Self {
                result: std::sync::Mutex::new(Some(Err(anyhow::anyhow!(msg.to_string())))),
            })
        }
    }

    #[async_trait::async_trait]
    impl PayloadSource for FixedPayload {
        async fn fetch(&self, _timeout: Duration) -> anyhow::Result<String> {
            self.result
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok("#!/bin/bash\n".to_string()))
        }
    }

    async fn run(
        ctx: &InstallContext,
        config: &ConnectionConfig,
        options: &ShortcutOptions,
    ) -> Vec<WorkflowMessage> {
        let (tx, mut rx) = tokio::sync::mpsc::channel(256);
        run_install(&tx, config, options, ctx).await.unwrap();
        drop(tx);
        drain(&mut rx)
    }

    #[tokio::test]
    async fn test_unreachable_pi_fails_before_any_remote_work() {
        let probe = Arc::new(FakeProbe::new(vec![ProbeOutcome::Unreachable(
            UnreachableReason::PortClosed("connection refused".to_string()),
        )]));
        let shell = Arc::new(FakeShell::new(vec![]));
        let shortcuts = Arc::new(FakeShortcuts::new(true));
        let ctx = test_ctx(probe.clone(), FixedPayload::ok(), shell.clone(), shortcuts);

        let messages = run(
            &ctx,
            &ConnectionConfig::default(),
            &ShortcutOptions::default(),
        )
        .await;

        let (success, url) = final_done(&messages);
        assert!(!success);
        assert!(url.is_none());
        assert_eq!(failed_steps(&messages), vec![steps::CONNECT]);
        assert_eq!(shell.command_count(), 0);
        assert!(log_lines(&messages)
            .iter()
            .any(|l| l.contains("Cannot connect to dreampi.local:22")));
    }

    #[tokio::test]
    async fn test_download_failure_is_fatal() {
        let probe = Arc::new(FakeProbe::new(vec![ProbeOutcome::Reachable]));
        let shell = Arc::new(FakeShell::new(vec![]));
        let shortcuts = Arc::new(FakeShortcuts::new(true));
        let ctx = test_ctx(
            probe,
            FixedPayload::err("Downloaded script is empty"),
            shell.clone(),
            shortcuts,
        );

        let messages = run(
            &ctx,
            &ConnectionConfig::default(),
            &ShortcutOptions::default(),
        )
        .await;

        let (success, _) = final_done(&messages);
        assert!(!success);
        assert_eq!(failed_steps(&messages), vec![steps::DOWNLOAD]);
        assert_eq!(shell.command_count(), 0);
    }

    #[tokio::test]
    async fn test_remote_script_failure_is_fatal() {
        let probe = Arc::new(FakeProbe::new(vec![ProbeOutcome::Reachable]));
        let shell = Arc::new(FakeShell::new(vec![FakeShell::exit_code(1)]));
        let shortcuts = Arc::new(FakeShortcuts::new(true));
        let ctx = test_ctx(
            probe.clone(),
            FixedPayload::ok(),
            shell.clone(),
            shortcuts.clone(),
        );

        let messages = run(
            &ctx,
            &ConnectionConfig::default(),
            &ShortcutOptions::default(),
        )
        .await;

        let (success, _) = final_done(&messages);
        assert!(!success);
        assert_eq!(failed_steps(&messages), vec![steps::INSTALL]);
        // Verification never ran: only the connect probe fired
        assert_eq!(probe.call_count(), 1);
        assert_eq!(
            shortcuts.desktop_calls.load(std::sync::atomic::Ordering::SeqCst),
            0
        );
    }

    #[tokio::test]
    async fn test_transport_error_is_fatal() {
        let probe = Arc::new(FakeProbe::new(vec![ProbeOutcome::Reachable]));
        let shell = Arc::new(FakeShell::new(vec![Err(TransportError::Spawn(
            "No such file or directory".to_string(),
        ))]));
        let shortcuts = Arc::new(FakeShortcuts::new(true));
        let ctx = test_ctx(probe, FixedPayload::ok(), shell, shortcuts);

        let messages = run(
            &ctx,
            &ConnectionConfig::default(),
            &ShortcutOptions::default(),
        )
        .await;

        let (success, _) = final_done(&messages);
        assert!(!success);
        assert_eq!(failed_steps(&messages), vec![steps::INSTALL]);
    }

    #[tokio::test]
    async fn test_verify_failure_degrades_to_warning() {
        let probe = Arc::new(FakeProbe::new(vec![
            ProbeOutcome::Reachable,
            ProbeOutcome::Unreachable(UnreachableReason::TimedOut),
        ]));
        let shell = Arc::new(FakeShell::new(vec![
            FakeShell::exit_ok(),
            Ok(crate::remote::ExecutionResult {
                exit_code: 0,
                stdout: "activating".to_string(),
                stderr: String::new(),
            }),
        ]));
        let shortcuts = Arc::new(FakeShortcuts::new(true));
        let ctx = test_ctx(probe, FixedPayload::ok(), shell.clone(), shortcuts);

        let messages = run(
            &ctx,
            &ConnectionConfig::default(),
            &ShortcutOptions::default(),
        )
        .await;

        // Unverified service still counts as a successful install
        let (success, url) = final_done(&messages);
        assert!(success);
        assert_eq!(url.as_deref(), Some("http://dreampi.local:1999"));
        assert!(failed_steps(&messages).is_empty());
        assert!(messages.iter().any(|m| matches!(
            m,
            WorkflowMessage::StepWarning { step, .. } if step == steps::VERIFY
        )));
        // The fallback status query went out over ssh
        assert_eq!(shell.command_count(), 2);
        assert!(shell.commands.lock().unwrap()[1].contains("is-active"));
    }

    #[tokio::test]
    async fn test_full_success() {
        let probe = Arc::new(FakeProbe::new(vec![
            ProbeOutcome::Reachable,
            ProbeOutcome::Reachable,
        ]));
        let shell = Arc::new(FakeShell::new(vec![FakeShell::exit_ok()]));
        let shortcuts = Arc::new(FakeShortcuts::new(true));
        let ctx = test_ctx(
            probe.clone(),
            FixedPayload::ok(),
            shell.clone(),
            shortcuts.clone(),
        );

        let messages = run(
            &ctx,
            &ConnectionConfig::default(),
            &ShortcutOptions::default(),
        )
        .await;

        let (success, url) = final_done(&messages);
        assert!(success);
        assert_eq!(url.as_deref(), Some("http://dreampi.local:1999"));
        assert_eq!(
            completed_steps(&messages),
            vec![
                steps::CONNECT,
                steps::DOWNLOAD,
                steps::INSTALL,
                steps::VERIFY,
                steps::SHORTCUTS
            ]
        );
        assert_eq!(probe.call_count(), 2);
        assert_eq!(shell.command_count(), 1);
        assert_eq!(
            shortcuts.desktop_calls.load(std::sync::atomic::Ordering::SeqCst),
            1
        );
        assert_eq!(
            shortcuts.menu_calls.load(std::sync::atomic::Ordering::SeqCst),
            1
        );
    }

    #[tokio::test]
    async fn test_shortcut_failure_degrades_to_warning() {
        let probe = Arc::new(FakeProbe::new(vec![
            ProbeOutcome::Reachable,
            ProbeOutcome::Reachable,
        ]));
        let shell = Arc::new(FakeShell::new(vec![FakeShell::exit_ok()]));
        let shortcuts = Arc::new(FakeShortcuts::new(false));
        let ctx = test_ctx(probe, FixedPayload::ok(), shell, shortcuts);

        let messages = run(
            &ctx,
            &ConnectionConfig::default(),
            &ShortcutOptions::default(),
        )
        .await;

        let (success, _) = final_done(&messages);
        assert!(success);
        assert!(messages.iter().any(|m| matches!(
            m,
            WorkflowMessage::StepWarning { step, .. } if step == steps::SHORTCUTS
        )));
    }

    #[tokio::test]
    async fn test_shortcuts_disabled_skips_creation() {
        let probe = Arc::new(FakeProbe::new(vec![
            ProbeOutcome::Reachable,
            ProbeOutcome::Reachable,
        ]));
        let shell = Arc::new(FakeShell::new(vec![FakeShell::exit_ok()]));
        let shortcuts = Arc::new(FakeShortcuts::new(true));
        let ctx = test_ctx(probe, FixedPayload::ok(), shell, shortcuts.clone());
        let options = ShortcutOptions {
            desktop: false,
            start_menu: false,
        };

        let messages = run(&ctx, &ConnectionConfig::default(), &options).await;

        let (success, _) = final_done(&messages);
        assert!(success);
        assert_eq!(
            shortcuts.desktop_calls.load(std::sync::atomic::Ordering::SeqCst),
            0
        );
        assert_eq!(
            shortcuts.menu_calls.load(std::sync::atomic::Ordering::SeqCst),
            0
        );
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_before_probing() {
        let probe = Arc::new(FakeProbe::new(vec![]));
        let shell = Arc::new(FakeShell::new(vec![]));
        let shortcuts = Arc::new(FakeShortcuts::new(true));
        let ctx = test_ctx(probe.clone(), FixedPayload::ok(), shell, shortcuts);
        let config = ConnectionConfig {
            hostname: String::new(),
            ..ConnectionConfig::default()
        };

        let messages = run(&ctx, &config, &ShortcutOptions::default()).await;

        let (success, _) = final_done(&messages);
        assert!(!success);
        assert_eq!(probe.call_count(), 0);
    }
}
