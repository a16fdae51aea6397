//! Keyboard input handlers for the application

use anyhow::Result;
use crossterm::event::KeyCode;

use super::state::*;
use super::{open_url, App};
use crate::constants::MAX_INPUT_LENGTH;
use crate::settings;

impl App {
    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyCode) -> Result<()> {
        // Handle exit confirmation dialog
        if self.show_exit_confirm {
            match key {
                KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.should_quit = true;
                }
                KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                    self.show_exit_confirm = false;
                }
                _ => {}
            }
            return Ok(());
        }

        // Global quit from resting screens
        if matches!(key, KeyCode::Char('q') | KeyCode::Char('Q'))
            && matches!(
                self.mode,
                AppMode::MainMenu { .. }
                    | AppMode::Install(InstallState::Complete { .. })
                    | AppMode::Uninstall(UninstallState::Complete { .. })
                    | AppMode::TestConnection(TestState::Complete { .. })
            )
        {
            self.show_exit_confirm = true;
            return Ok(());
        }

        // Escape to go back (show confirm if on main menu)
        if key == KeyCode::Esc {
            if matches!(self.mode, AppMode::MainMenu { .. }) {
                self.show_exit_confirm = true;
                return Ok(());
            }
            self.handle_back();
            return Ok(());
        }

        match &self.mode {
            AppMode::MainMenu { selected } => {
                let selected = *selected;
                self.handle_main_menu_key(key, selected)?;
            }
            AppMode::Configure(_) => {
                self.handle_configure_key(key)?;
            }
            AppMode::Install(InstallState::Overview) => {
                if key == KeyCode::Enter {
                    self.mode = AppMode::Install(InstallState::new_running());
                    self.launch_install()?;
                }
            }
            AppMode::Install(InstallState::Complete { success, url, .. }) => {
                let url = url.clone();
                let success = *success;
                match key {
                    KeyCode::Enter => {
                        self.mode = AppMode::MainMenu { selected: 0 };
                    }
                    KeyCode::Char('o') | KeyCode::Char('O') => {
                        if success {
                            if let Some(url) = url {
                                open_url(&url);
                            }
                        }
                    }
                    KeyCode::Up | KeyCode::Down => self.handle_scroll(key),
                    _ => {}
                }
            }
            AppMode::Uninstall(UninstallState::Confirm) => match key {
                KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.mode = AppMode::Uninstall(UninstallState::new_running());
                    self.launch_uninstall()?;
                }
                KeyCode::Char('n') | KeyCode::Char('N') => {
                    self.mode = AppMode::MainMenu { selected: 1 };
                }
                _ => {}
            },
            AppMode::Uninstall(UninstallState::Complete { .. }) => match key {
                KeyCode::Enter => {
                    self.mode = AppMode::MainMenu { selected: 0 };
                }
                KeyCode::Up | KeyCode::Down => self.handle_scroll(key),
                _ => {}
            },
            AppMode::TestConnection(TestState::Complete { .. }) => {
                if key == KeyCode::Enter {
                    self.mode = AppMode::MainMenu { selected: 2 };
                }
            }
            // Running screens take no input; runs are not cancellable
            _ => {}
        }

        Ok(())
    }

    /// Go back one screen. Running workflows cannot be backed out of.
    fn handle_back(&mut self) {
        match &self.mode {
            AppMode::Configure(_) => {
                // Draft discarded
                self.mode = AppMode::MainMenu { selected: 3 };
            }
            AppMode::Install(InstallState::Overview) => {
                self.mode = AppMode::MainMenu { selected: 0 };
            }
            AppMode::Install(InstallState::Complete { .. }) => {
                self.mode = AppMode::MainMenu { selected: 0 };
            }
            AppMode::Uninstall(UninstallState::Confirm)
            | AppMode::Uninstall(UninstallState::Complete { .. }) => {
                self.mode = AppMode::MainMenu { selected: 1 };
            }
            AppMode::TestConnection(TestState::Complete { .. }) => {
                self.mode = AppMode::MainMenu { selected: 2 };
            }
            _ => {}
        }
    }

    fn handle_main_menu_key(&mut self, key: KeyCode, current_selected: usize) -> Result<()> {
        match key {
            KeyCode::Up | KeyCode::Char('k') => {
                if let AppMode::MainMenu { selected } = &mut self.mode {
                    *selected = selected.saturating_sub(1);
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if let AppMode::MainMenu { selected } = &mut self.mode {
                    *selected = (*selected + 1).min(MAIN_MENU_ITEMS.len() - 1);
                }
            }
            KeyCode::Enter => {
                self.handle_main_menu_select(current_selected)?;
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_main_menu_select(&mut self, selected: usize) -> Result<()> {
        match selected {
            0 => {
                if self.run_in_flight() {
                    self.error = Some("An operation is already running".to_string());
                    return Ok(());
                }
                self.error = None;
                self.mode = AppMode::Install(InstallState::Overview);
            }
            1 => {
                if self.run_in_flight() {
                    self.error = Some("An operation is already running".to_string());
                    return Ok(());
                }
                self.error = None;
                self.mode = AppMode::Uninstall(UninstallState::Confirm);
            }
            2 => {
                self.error = None;
                self.mode = AppMode::TestConnection(TestState::new_running());
                self.launch_connection_test()?;
            }
            3 => {
                self.error = None;
                self.mode = AppMode::Configure(ConfigureState::from_settings(
                    &self.config,
                    &self.options,
                ));
            }
            4 => {
                self.show_exit_confirm = true;
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_configure_key(&mut self, key: KeyCode) -> Result<()> {
        let AppMode::Configure(state) = &mut self.mode else {
            return Ok(());
        };

        match key {
            KeyCode::Tab | KeyCode::Down => {
                state.active_field = state.active_field.next();
            }
            KeyCode::BackTab | KeyCode::Up => {
                state.active_field = state.active_field.prev();
            }
            KeyCode::Backspace => {
                if let Some(field) = state_text_field(state) {
                    field.pop();
                }
                state.error = None;
            }
            KeyCode::Char(c) => {
                if state.active_field.is_text() {
                    let digits_only = state.active_field == ConfigField::Port;
                    if let Some(field) = state_text_field(state) {
                        if field.len() < MAX_INPUT_LENGTH && (!digits_only || c.is_ascii_digit())
                        {
                            field.push(c);
                        }
                    }
                    state.error = None;
                } else if c == ' ' {
                    toggle_field(state);
                }
            }
            KeyCode::Enter => match state.active_field {
                ConfigField::Save => {
                    match state.to_settings() {
                        Ok((config, options)) => {
                            if let Err(e) = settings::save(&config, &options) {
                                tracing::warn!("Failed to save settings: {}", e);
                            }
                            self.config = config;
                            self.options = options;
                            self.log_to_screen("Settings saved");
                            self.mode = AppMode::MainMenu { selected: 3 };
                        }
                        Err(msg) => {
                            state.error = Some(msg);
                        }
                    }
                }
                ConfigField::Reset => {
                    state.reset_to_defaults();
                }
                _ if state.active_field.is_text() => {
                    state.active_field = state.active_field.next();
                }
                _ => {
                    toggle_field(state);
                }
            },
            _ => {}
        }
        Ok(())
    }

    fn handle_scroll(&mut self, key: KeyCode) {
        let (len, scroll_offset) = match &mut self.mode {
            AppMode::Install(InstallState::Complete {
                output,
                scroll_offset,
                ..
            })
            | AppMode::Uninstall(UninstallState::Complete {
                output,
                scroll_offset,
                ..
            }) => (output.len(), scroll_offset),
            _ => return,
        };

        match key {
            KeyCode::Up => {
                let current = scroll_offset.unwrap_or(len);
                *scroll_offset = Some(current.saturating_sub(1));
            }
            KeyCode::Down => {
                let current = scroll_offset.unwrap_or(len);
                let next = current + 1;
                // Scrolling past the end re-enables auto-scroll
                *scroll_offset = if next >= len { None } else { Some(next) };
            }
            _ => {}
        }
    }
}

fn state_text_field(state: &mut ConfigureState) -> Option<&mut String> {
    match state.active_field {
        ConfigField::Hostname => Some(&mut state.hostname),
        ConfigField::Port => Some(&mut state.port),
        ConfigField::Username => Some(&mut state.username),
        ConfigField::Password => Some(&mut state.password),
        _ => None,
    }
}

fn toggle_field(state: &mut ConfigureState) {
    match state.active_field {
        ConfigField::ShowPassword => state.show_password = !state.show_password,
        ConfigField::DesktopShortcut => state.desktop_shortcut = !state.desktop_shortcut,
        ConfigField::StartMenuShortcut => {
            state.start_menu_shortcut = !state.start_menu_shortcut
        }
        _ => {}
    }
}
