//! UI rendering module

mod layout;
mod screens;
pub mod theme;
pub mod widgets;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppMode, InstallState, TestState, UninstallState};

/// Main draw function - dispatches to appropriate screen
pub fn draw(frame: &mut Frame, app: &App) {
    match &app.mode {
        AppMode::MainMenu { selected } => {
            screens::main_menu::draw(frame, *selected, app);
        }
        AppMode::Configure(state) => {
            screens::configure::draw(frame, state);
        }
        AppMode::Install(state) => match state {
            InstallState::Overview => {
                screens::install::draw_overview(frame, app);
            }
            InstallState::Running { steps, output, .. } => {
                // Convert VecDeque to Vec for UI rendering
                let output_vec: Vec<String> = output.iter().cloned().collect();
                screens::install::draw_running(frame, steps, &output_vec, app);
            }
            InstallState::Complete {
                success,
                url,
                output,
                scroll_offset,
            } => {
                let output_vec: Vec<String> = output.iter().cloned().collect();
                screens::install::draw_complete(
                    frame,
                    *success,
                    url.as_deref(),
                    &output_vec,
                    *scroll_offset,
                    app,
                );
            }
        },
        AppMode::Uninstall(state) => match state {
            UninstallState::Confirm => {
                screens::uninstall::draw_confirm(frame, app);
            }
            UninstallState::Running { steps, output, .. } => {
                let output_vec: Vec<String> = output.iter().cloned().collect();
                screens::uninstall::draw_running(frame, steps, &output_vec, app);
            }
            UninstallState::Complete {
                success,
                output,
                scroll_offset,
            } => {
                let output_vec: Vec<String> = output.iter().cloned().collect();
                screens::uninstall::draw_complete(
                    frame,
                    *success,
                    &output_vec,
                    *scroll_offset,
                    app,
                );
            }
        },
        AppMode::TestConnection(state) => match state {
            TestState::Running { output } => {
                let output_vec: Vec<String> = output.iter().cloned().collect();
                screens::test::draw_running(frame, &output_vec, app);
            }
            TestState::Complete { success, output } => {
                let output_vec: Vec<String> = output.iter().cloned().collect();
                screens::test::draw_complete(frame, *success, &output_vec, app);
            }
        },
    }

    // Render exit confirmation popup on top of any screen
    if app.show_exit_confirm {
        draw_exit_confirm(frame);
    }
}

/// Draw the exit confirmation popup centered on screen
fn draw_exit_confirm(frame: &mut Frame) {
    let area = frame.area();
    let popup_width = 40;
    let popup_height = 7;
    let x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(x, y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("Are you sure you want to exit?", theme::text())),
        Line::from(""),
        Line::from(vec![
            Span::styled("[", theme::dim()),
            Span::styled("Enter/Y", theme::key_hint()),
            Span::styled("] Yes  [", theme::dim()),
            Span::styled("Esc/N", theme::key_hint()),
            Span::styled("] No", theme::dim()),
        ]),
    ])
    .alignment(ratatui::layout::Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme::border_active())
            .title(Span::styled(" Exit ", theme::title())),
    );
    frame.render_widget(content, popup_area);
}
