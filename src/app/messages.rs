//! Workflow message handling for the application

use anyhow::Result;
use regex::Regex;
use std::sync::LazyLock;

use super::state::{AppMode, InstallState, StepState, TestState, UninstallState};
use super::App;
use crate::constants::OUTPUT_BUFFER_SIZE;
use crate::remote::errors::ParsedError;
use crate::workflow::WorkflowMessage;

/// Regex to match ANSI escape codes.
static ANSI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*[a-zA-Z]").unwrap());

/// Strip ANSI escape codes from a string
fn strip_ansi_codes(s: &str) -> String {
    ANSI_RE.replace_all(s, "").to_string()
}

impl App {
    /// Handle messages from running workflows
    pub fn handle_workflow_message(&mut self, msg: WorkflowMessage) -> Result<()> {
        match msg {
            WorkflowMessage::Stdout(line) | WorkflowMessage::Stderr(line) => {
                self.append_output(&line);
            }
            WorkflowMessage::StepStarted { step } => {
                self.mark_step(&step, StepState::Running);
            }
            WorkflowMessage::StepComplete { step } => {
                self.log_to_screen(&format!("[✓] Step complete: {}", step));
                self.mark_step(&step, StepState::Complete);
            }
            WorkflowMessage::StepWarning { step, message } => {
                self.log_to_screen(&format!("[!] Step warning: {}: {}", step, message));
                self.append_output(&format!("WARNING: {}", message));
                self.mark_step(&step, StepState::Warning);
            }
            WorkflowMessage::StepFailed { step, error } => {
                self.handle_step_failed(&step, error);
            }
            WorkflowMessage::Done {
                success,
                portal_url,
            } => {
                self.handle_workflow_done(success, portal_url);
            }
        }
        Ok(())
    }

    fn append_output(&mut self, line: &str) {
        let clean_line = strip_ansi_codes(line);
        self.log_to_screen(&clean_line);

        match &mut self.mode {
            AppMode::Install(InstallState::Running { output, .. })
            | AppMode::Install(InstallState::Complete { output, .. })
            | AppMode::Uninstall(UninstallState::Running { output, .. })
            | AppMode::Uninstall(UninstallState::Complete { output, .. }) => {
                output.push_back(clean_line);
                while output.len() > OUTPUT_BUFFER_SIZE {
                    output.pop_front();
                }
            }
            AppMode::TestConnection(TestState::Running { output })
            | AppMode::TestConnection(TestState::Complete { output, .. }) => {
                output.push_back(clean_line);
            }
            _ => {}
        }
    }

    /// Update the named step's status. Steps are matched by key, so the
    /// display text can change freely.
    fn mark_step(&mut self, step_key: &str, status: StepState) {
        let running = status == StepState::Running;
        match &mut self.mode {
            AppMode::Install(InstallState::Running { steps, step, .. })
            | AppMode::Uninstall(UninstallState::Running { steps, step, .. }) => {
                if let Some(idx) = steps.iter().position(|s| s.key == step_key) {
                    steps[idx].status = status;
                    if running {
                        *step = idx;
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_step_failed(&mut self, step_key: &str, error: ParsedError) {
        // Log formatted error to screen
        self.log_to_screen(&format!("[✗] Step failed: {}", step_key));
        self.log_to_screen("");
        self.log_to_screen(&format!("  Error: {}", error.summary));
        if let Some(ref detail) = error.detail {
            for line in detail.lines() {
                self.log_to_screen(&format!("  {}", line));
            }
        }
        self.log_to_screen("");
        self.log_to_screen(&format!("  Suggestion: {}", error.suggestion));

        // Surface the error in the running log too
        self.append_output(&format!("ERROR: {}", error.summary));
        if let Some(ref detail) = error.detail {
            self.append_output(&format!("  {}", detail));
        }
        self.append_output(&format!("Suggestion: {}", error.suggestion));

        self.mark_step(step_key, StepState::Failed);
        self.error = Some(error.summary);
    }

    fn handle_workflow_done(&mut self, success: bool, portal_url: Option<String>) {
        self.log_to_screen(&format!(
            "\n=== Operation {} ===\n",
            if success { "COMPLETED" } else { "FAILED" }
        ));

        match &mut self.mode {
            AppMode::Install(InstallState::Running { output, .. }) => {
                self.mode = AppMode::Install(InstallState::Complete {
                    success,
                    url: portal_url,
                    output: output.clone(),
                    scroll_offset: None, // None = auto-scroll continues
                });
            }
            AppMode::Uninstall(UninstallState::Running { output, .. }) => {
                self.mode = AppMode::Uninstall(UninstallState::Complete {
                    success,
                    output: output.clone(),
                    scroll_offset: None, // None = auto-scroll continues
                });
            }
            AppMode::TestConnection(TestState::Running { output }) => {
                self.mode = AppMode::TestConnection(TestState::Complete {
                    success,
                    output: output.clone(),
                });
            }
            _ => {}
        }
    }
}
