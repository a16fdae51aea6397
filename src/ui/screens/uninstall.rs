//! Uninstall workflow screens

use ratatui::{
    layout::Alignment,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, StepStatus};
use crate::ui::layout::{centered_rect, main_layout, progress_layout};
use crate::ui::theme;
use crate::ui::widgets::{LogView, ProgressSteps};

pub fn draw_confirm(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let (header, content, footer) = main_layout(centered_rect(70, 80, area));

    let title = Paragraph::new(Line::from(Span::styled(
        "Uninstall DreamPi Link Cable",
        theme::title(),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(title, header);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "This will remove the DreamPi Link Cable service from {}:",
                app.config.hostname
            ),
            theme::text(),
        )),
        Line::from(""),
        Line::from(Span::styled("  - Stop and disable the service", theme::text())),
        Line::from(Span::styled("  - Remove the systemd unit file", theme::text())),
        Line::from(Span::styled("  - Delete all installed files", theme::text())),
        Line::from(""),
        Line::from(Span::styled(
            "Running this on a Pi without the service installed is harmless.",
            theme::dim(),
        )),
        Line::from(""),
        Line::from(Span::styled("Continue?", theme::warning())),
    ];

    let body = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme::warning())
            .title(Span::styled(" Confirm ", theme::warning())),
    );
    frame.render_widget(body, content);

    let hints = Paragraph::new(Line::from(vec![
        Span::styled("[", theme::dim()),
        Span::styled("Enter/Y", theme::key_hint()),
        Span::styled("] Uninstall  [", theme::dim()),
        Span::styled("Esc/N", theme::key_hint()),
        Span::styled("] Cancel", theme::dim()),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(hints, footer);
}

pub fn draw_running(frame: &mut Frame, steps: &[StepStatus], output: &[String], app: &App) {
    let area = frame.area();
    let (header, content, footer) = main_layout(area);

    let title = Paragraph::new(Line::from(Span::styled(
        format!("Uninstalling from {}", app.config.hostname),
        theme::title(),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(title, header);

    let (steps_area, output_area) = progress_layout(content);
    frame.render_widget(
        ProgressSteps::new(steps, app.spinner_state).title(" Progress "),
        steps_area,
    );
    frame.render_widget(LogView::new(output).title(" Output "), output_area);

    let hints = Paragraph::new(Line::from(Span::styled(
        "Uninstall in progress, please wait...",
        theme::dim(),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(hints, footer);
}

pub fn draw_complete(
    frame: &mut Frame,
    success: bool,
    output: &[String],
    scroll_offset: Option<usize>,
    app: &App,
) {
    let area = frame.area();
    let (header, content, footer) = main_layout(area);

    let (status, style) = if success {
        ("✓ Uninstall complete", theme::success())
    } else {
        ("✗ Uninstall failed", theme::error())
    };
    let mut header_lines = vec![Line::from(Span::styled(status, style))];
    if !success {
        if let Some(ref error) = app.error {
            header_lines.push(Line::from(Span::styled(error.as_str(), theme::error())));
        }
    }
    let title = Paragraph::new(header_lines).alignment(Alignment::Center);
    frame.render_widget(title, header);

    let mut log = LogView::new(output).title(" Output ");
    if let Some(offset) = scroll_offset {
        log = log.scroll_offset(offset);
    }
    frame.render_widget(log, content);

    let hints = Paragraph::new(Line::from(vec![
        Span::styled("[", theme::dim()),
        Span::styled("Enter", theme::key_hint()),
        Span::styled("] Main menu  [", theme::dim()),
        Span::styled("↑↓", theme::key_hint()),
        Span::styled("] Scroll  [", theme::dim()),
        Span::styled("q", theme::key_hint()),
        Span::styled("] Quit", theme::dim()),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(hints, footer);
}
