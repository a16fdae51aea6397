//! Install workflow screens

use ratatui::{
    layout::Alignment,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, StepStatus};
use crate::constants::PORTAL_PORT;
use crate::ui::layout::{centered_rect, main_layout, progress_layout};
use crate::ui::theme;
use crate::ui::widgets::{LogView, ProgressSteps};

/// Pre-install summary of what the installer is about to do
pub fn draw_overview(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let (header, content, footer) = main_layout(centered_rect(80, 90, area));

    let title = Paragraph::new(Line::from(Span::styled(
        "Install DreamPi Link Cable",
        theme::title(),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(title, header);

    let config = &app.config;
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "This will install the DreamPi Link Cable web server on your Raspberry Pi:",
            theme::text(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("  1. Connect to {}:{} over SSH", config.hostname, config.port),
            theme::text(),
        )),
        Line::from(Span::styled(
            "  2. Download the published setup script",
            theme::text(),
        )),
        Line::from(Span::styled(
            "  3. Run the installation on the Pi (several minutes)",
            theme::text(),
        )),
        Line::from(Span::styled(
            format!("  4. Verify the web service on port {}", PORTAL_PORT),
            theme::text(),
        )),
        Line::from(Span::styled(
            "  5. Create shortcuts to the web interface",
            theme::text(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("Logging in as '{}'. The Pi needs internet access.", config.username),
            theme::dim(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Use 'Test Pi connection' first if you are unsure the Pi is reachable.",
            theme::dim(),
        )),
    ];

    let overview = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme::border())
            .title(Span::styled(" Overview ", theme::title())),
    );
    frame.render_widget(overview, content);

    let hints = Paragraph::new(Line::from(vec![
        Span::styled("[", theme::dim()),
        Span::styled("Enter", theme::key_hint()),
        Span::styled("] Begin installation  [", theme::dim()),
        Span::styled("Esc", theme::key_hint()),
        Span::styled("] Back", theme::dim()),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(hints, footer);
}

pub fn draw_running(frame: &mut Frame, steps: &[StepStatus], output: &[String], app: &App) {
    let area = frame.area();
    let (header, content, footer) = main_layout(area);

    let title = Paragraph::new(Line::from(Span::styled(
        format!("Installing on {}", app.config.hostname),
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
        "Installation in progress, please wait...",
        theme::dim(),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(hints, footer);
}

pub fn draw_complete(
    frame: &mut Frame,
    success: bool,
    url: Option<&str>,
    output: &[String],
    scroll_offset: Option<usize>,
    app: &App,
) {
    let area = frame.area();
    let (header, content, footer) = main_layout(area);

    let (status, style) = if success {
        ("✓ Installation complete", theme::success())
    } else {
        ("✗ Installation failed", theme::error())
    };
    let mut header_lines = vec![Line::from(Span::styled(status, style))];
    if success {
        if let Some(url) = url {
            header_lines.push(Line::from(Span::styled(
                format!("Web interface: {}", url),
                theme::info(),
            )));
        }
    } else if let Some(ref error) = app.error {
        header_lines.push(Line::from(Span::styled(error.as_str(), theme::error())));
    }
    let title = Paragraph::new(header_lines).alignment(Alignment::Center);
    frame.render_widget(title, header);

    let mut log = LogView::new(output).title(" Output ");
    if let Some(offset) = scroll_offset {
        log = log.scroll_offset(offset);
    }
    frame.render_widget(log, content);

    let mut spans = vec![
        Span::styled("[", theme::dim()),
        Span::styled("Enter", theme::key_hint()),
        Span::styled("] Main menu  ", theme::dim()),
    ];
    if success && url.is_some() {
        spans.extend([
            Span::styled("[", theme::dim()),
            Span::styled("o", theme::key_hint()),
            Span::styled("] Open web interface  ", theme::dim()),
        ]);
    }
    spans.extend([
        Span::styled("[", theme::dim()),
        Span::styled("↑↓", theme::key_hint()),
        Span::styled("] Scroll  [", theme::dim()),
        Span::styled("q", theme::key_hint()),
        Span::styled("] Quit", theme::dim()),
    ]);
    let hints = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    frame.render_widget(hints, footer);
}
