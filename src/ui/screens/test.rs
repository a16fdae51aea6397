//! Connection test screens

use ratatui::{
    layout::Alignment,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;
use crate::ui::layout::{centered_rect, main_layout};
use crate::ui::theme;
use crate::ui::widgets::{LogView, Spinner};

pub fn draw_running(frame: &mut Frame, output: &[String], app: &App) {
    let area = frame.area();
    let (header, content, footer) = main_layout(centered_rect(80, 80, area));

    let spinner = Spinner::new(app.spinner_state);
    let title = Paragraph::new(Line::from(vec![
        Span::styled(format!("{} ", spinner.char()), theme::info()),
        Span::styled(
            format!("Testing connection to {}...", app.config.hostname),
            theme::title(),
        ),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(title, header);

    frame.render_widget(LogView::new(output).title(" Connection Test "), content);

    let hints = Paragraph::new(Line::from(Span::styled(
        "Checking DNS resolution and the SSH port...",
        theme::dim(),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(hints, footer);
}

pub fn draw_complete(frame: &mut Frame, success: bool, output: &[String], _app: &App) {
    let area = frame.area();
    let (header, content, footer) = main_layout(centered_rect(80, 80, area));

    let (status, style) = if success {
        ("✓ Pi is reachable", theme::success())
    } else {
        ("✗ Pi is not reachable", theme::error())
    };
    let title =
        Paragraph::new(Line::from(Span::styled(status, style))).alignment(Alignment::Center);
    frame.render_widget(title, header);

    frame.render_widget(LogView::new(output).title(" Connection Test "), content);

    let hints = Paragraph::new(Line::from(vec![
        Span::styled("[", theme::dim()),
        Span::styled("Enter", theme::key_hint()),
        Span::styled("] Main menu  [", theme::dim()),
        Span::styled("q", theme::key_hint()),
        Span::styled("] Quit", theme::dim()),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(hints, footer);
}
