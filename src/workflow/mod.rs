//! Workflow orchestration
//!
//! A workflow is an ordered, non-resumable sequence of steps executed once
//! per user-triggered run. Each run executes on its own spawned task and
//! reports back to the foreground through a message channel; the UI never
//! blocks on remote calls.

pub mod fetch;
pub mod install;
pub mod uninstall;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::constants::TEST_PROBE_TIMEOUT_SECS;
use crate::net::{ConnectivityProbe, ProbeOutcome, TcpProbe, UnreachableReason};
use crate::remote::errors::{ErrorContext, ParsedError};
use crate::remote::ExecutionResult;
use crate::settings::ConnectionConfig;

/// Standard step names for consistent messaging
pub mod steps {
    // Install steps
    pub const CONNECT: &str = "connect";
    pub const DOWNLOAD: &str = "download";
    pub const INSTALL: &str = "install";
    pub const VERIFY: &str = "verify";
    pub const SHORTCUTS: &str = "shortcuts";

    // Uninstall step
    pub const UNINSTALL: &str = "uninstall";
}

/// Messages sent from workflow tasks to the UI
#[derive(Debug, Clone)]
pub enum WorkflowMessage {
    /// Local log line
    Stdout(String),
    /// Local error log line
    Stderr(String),
    /// Step transitioned to Running
    StepStarted { step: String },
    /// Step completed successfully
    StepComplete { step: String },
    /// Step completed with a non-fatal warning
    StepWarning { step: String, message: String },
    /// Step failed with error
    StepFailed { step: String, error: ParsedError },
    /// Workflow fully completed; on success carries the portal URL
    Done {
        success: bool,
        portal_url: Option<String>,
    },
}

/// A helper for reporting step transitions and log output consistently
pub struct Reporter<'a> {
    tx: &'a mpsc::Sender<WorkflowMessage>,
}

impl<'a> Reporter<'a> {
    pub fn new(tx: &'a mpsc::Sender<WorkflowMessage>) -> Self {
        Self { tx }
    }

    /// Send a stdout log line
    pub async fn out(&self, msg: &str) {
        let _ = self.tx.send(WorkflowMessage::Stdout(msg.to_string())).await;
    }

    /// Send a stderr log line
    pub async fn err(&self, msg: &str) {
        let _ = self.tx.send(WorkflowMessage::Stderr(msg.to_string())).await;
    }

    /// Print a header with title
    pub async fn header(&self, title: &str) {
        self.out("").await;
        self.out("============================================================").await;
        self.out(title).await;
        self.out("============================================================").await;
    }

    pub async fn step_started(&self, step: &str) {
        let _ = self
            .tx
            .send(WorkflowMessage::StepStarted {
                step: step.to_string(),
            })
            .await;
    }

    pub async fn step_complete(&self, step: &str) {
        let _ = self
            .tx
            .send(WorkflowMessage::StepComplete {
                step: step.to_string(),
            })
            .await;
    }

    pub async fn step_warning(&self, step: &str, message: &str) {
        let _ = self
            .tx
            .send(WorkflowMessage::StepWarning {
                step: step.to_string(),
                message: message.to_string(),
            })
            .await;
    }

    pub async fn step_failed(&self, step: &str, error_msg: &str, operation: &str) {
        let _ = self
            .tx
            .send(WorkflowMessage::StepFailed {
                step: step.to_string(),
                error: ParsedError::from_stderr(
                    error_msg,
                    ErrorContext {
                        operation: operation.to_string(),
                    },
                ),
            })
            .await;
    }

    pub async fn done(&self, success: bool, portal_url: Option<String>) {
        let _ = self
            .tx
            .send(WorkflowMessage::Done {
                success,
                portal_url,
            })
            .await;
    }

    /// Forward buffered remote output line-by-line, prefixed so remote
    /// output is distinguishable from local log lines.
    pub async fn remote_output(&self, result: &ExecutionResult) {
        for line in result.stdout.lines() {
            if !line.trim().is_empty() {
                self.out(&format!("Pi: {}", line)).await;
            }
        }
        for line in result.stderr.lines() {
            if !line.trim().is_empty() {
                self.err(&format!("SSH Error: {}", line)).await;
            }
        }
    }
}

/// Single-slot run guard: at most one install or uninstall run may be in
/// flight per installer instance. A second invocation while busy is
/// rejected, never queued.
#[derive(Clone, Default)]
pub struct RunSlot {
    active: Arc<AtomicBool>,
}

impl RunSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot. Returns the token that keeps it claimed, or None
    /// if a run is already in flight.
    pub fn try_acquire(&self) -> Option<RunToken> {
        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            Some(RunToken {
                active: Arc::clone(&self.active),
            })
        } else {
            None
        }
    }

    pub fn is_busy(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// Releases the run slot when dropped, i.e. when the workflow task ends
/// for any reason.
pub struct RunToken {
    active: Arc<AtomicBool>,
}

impl Drop for RunToken {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
    }
}

/// Interactive connection test: resolve the hostname and check the SSH
/// port within a short timeout, reporting a verdict line.
pub fn start_connection_test(
    tx: mpsc::Sender<WorkflowMessage>,
    config: ConnectionConfig,
) -> anyhow::Result<()> {
    tokio::spawn(async move {
        run_connection_test(&tx, &config, &TcpProbe).await;
    });
    Ok(())
}

async fn run_connection_test(
    tx: &mpsc::Sender<WorkflowMessage>,
    config: &ConnectionConfig,
    probe: &dyn ConnectivityProbe,
) {
    let reporter = Reporter::new(tx);
    let hostname = config.hostname.trim();

    if let Some(msg) = config.validate() {
        reporter.err(&format!("ERROR: {}", msg)).await;
        reporter.done(false, None).await;
        return;
    }

    reporter
        .out(&format!("Testing connection to {}:{}...", hostname, config.port))
        .await;

    let outcome = probe
        .probe(
            hostname,
            config.port,
            Duration::from_secs(TEST_PROBE_TIMEOUT_SECS),
        )
        .await;

    match outcome {
        ProbeOutcome::Reachable => {
            reporter
                .out(&format!("SUCCESS: SSH port {} is accessible", config.port))
                .await;
            reporter
                .out("Your Pi is ready for installation.")
                .await;
            reporter.done(true, None).await;
        }
        ProbeOutcome::Unreachable(UnreachableReason::ResolutionFailed(_)) => {
            reporter
                .err(&format!("ERROR: Cannot resolve hostname '{}'", hostname))
                .await;
            reporter
                .err("Check the hostname/IP address is correct.")
                .await;
            reporter.done(false, None).await;
        }
        ProbeOutcome::Unreachable(reason) => {
            reporter
                .err(&format!(
                    "ERROR: SSH port {} not accessible ({})",
                    config.port, reason
                ))
                .await;
            reporter
                .err("Make sure SSH is enabled on your Pi.")
                .await;
            reporter.done(false, None).await;
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Fake collaborators shared by the workflow tests

    use super::*;
    use crate::net::ProbeOutcome;
    use crate::remote::{RemoteShell, TransportError};
    use crate::shortcuts::ShortcutCreator;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    pub struct FakeProbe {
        outcomes: Mutex<VecDeque<ProbeOutcome>>,
        pub calls: AtomicUsize,
    }

    impl FakeProbe {
        pub fn new(outcomes: Vec<ProbeOutcome>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ConnectivityProbe for FakeProbe {
        async fn probe(&self, _hostname: &str, _port: u16, _timeout: Duration) -> ProbeOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(ProbeOutcome::Reachable)
        }
    }

    pub struct FakeShell {
        results: Mutex<VecDeque<Result<ExecutionResult, TransportError>>>,
        pub commands: Mutex<Vec<String>>,
    }

    impl FakeShell {
        pub fn new(results: Vec<Result<ExecutionResult, TransportError>>) -> Self {
            Self {
                results: Mutex::new(results.into()),
                commands: Mutex::new(Vec::new()),
            }
        }

        pub fn exit_ok() -> Result<ExecutionResult, TransportError> {
            Ok(ExecutionResult {
                exit_code: 0,
                stdout: "=== Installation Complete ===".to_string(),
                stderr: String::new(),
            })
        }

        pub fn exit_code(code: i32) -> Result<ExecutionResult, TransportError> {
            Ok(ExecutionResult {
                exit_code: code,
                stdout: String::new(),
                stderr: format!("script failed with exit code {}", code),
            })
        }

        pub fn command_count(&self) -> usize {
            self.commands.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl RemoteShell for FakeShell {
        async fn execute(
            &self,
            _config: &ConnectionConfig,
            command: &str,
            _timeout: Duration,
        ) -> Result<ExecutionResult, TransportError> {
            self.commands.lock().unwrap().push(command.to_string());
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(FakeShell::exit_ok)
        }
    }

    pub struct FakeShortcuts {
        pub desktop_calls: AtomicUsize,
        pub menu_calls: AtomicUsize,
        pub succeed: bool,
    }

    impl FakeShortcuts {
        pub fn new(succeed: bool) -> Self {
            Self {
                desktop_calls: AtomicUsize::new(0),
                menu_calls: AtomicUsize::new(0),
                succeed,
            }
        }
    }

    impl ShortcutCreator for FakeShortcuts {
        fn create_desktop_shortcut(&self, _url: &str) -> bool {
            self.desktop_calls.fetch_add(1, Ordering::SeqCst);
            self.succeed
        }

        fn create_start_menu_shortcut(&self, _url: &str) -> bool {
            self.menu_calls.fetch_add(1, Ordering::SeqCst);
            self.succeed
        }
    }

    /// Drain every message the workflow produced
    pub fn drain(rx: &mut mpsc::Receiver<WorkflowMessage>) -> Vec<WorkflowMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Final Done message of a run
    pub fn final_done(messages: &[WorkflowMessage]) -> (bool, Option<String>) {
        match messages.last() {
            Some(WorkflowMessage::Done {
                success,
                portal_url,
            }) => (*success, portal_url.clone()),
            other => panic!("Expected Done as final message, got {:?}", other),
        }
    }

    pub fn failed_steps(messages: &[WorkflowMessage]) -> Vec<String> {
        messages
            .iter()
            .filter_map(|m| match m {
                WorkflowMessage::StepFailed { step, .. } => Some(step.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn completed_steps(messages: &[WorkflowMessage]) -> Vec<String> {
        messages
            .iter()
            .filter_map(|m| match m {
                WorkflowMessage::StepComplete { step, .. } => Some(step.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn log_lines(messages: &[WorkflowMessage]) -> Vec<String> {
        messages
            .iter()
            .filter_map(|m| match m {
                WorkflowMessage::Stdout(line) | WorkflowMessage::Stderr(line) => {
                    Some(line.clone())
                }
                _ => None,
            })
            .collect()
    }
}
