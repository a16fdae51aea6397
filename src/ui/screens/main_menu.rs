//! Main menu screen

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, MAIN_MENU_ITEMS};
use crate::ui::layout::centered_rect;
use crate::ui::theme;
use crate::ui::widgets::MenuList;

/// ASCII logo (all lines padded to same width for proper centering)
const LOGO: &[&str] = &[
    r#" ____                            ____  _ "#,
    r#"|  _ \ _ __ ___  __ _ _ __ ___  |  _ \(_)"#,
    r#"| | | | '__/ _ \/ _` | '_ ` _ \ | |_) | |"#,
    r#"| |_| | | |  __/ (_| | | | | | ||  __/| |"#,
    r#"|____/|_|  \___|\__,_|_| |_| |_||_|   |_|"#,
];

pub fn draw(frame: &mut Frame, selected: usize, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9), // Header with logo
            Constraint::Min(8),    // Menu
            Constraint::Length(3), // Footer
        ])
        .split(centered_rect(80, 90, area));

    draw_header(frame, chunks[0], app);

    let menu = MenuList::new(MAIN_MENU_ITEMS.to_vec(), selected);
    frame.render_widget(menu, chunks[1]);

    draw_footer(frame, chunks[2], app);
}

fn draw_header(frame: &mut Frame, area: ratatui::layout::Rect, app: &App) {
    let mut lines: Vec<Line> = LOGO
        .iter()
        .map(|line| Line::from(Span::styled(*line, theme::title())))
        .collect();

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "DreamPi Link Cable Installer",
        theme::title(),
    )));
    lines.push(Line::from(Span::styled(
        format!(
            "Target: {}@{}:{}",
            app.config.username, app.config.hostname, app.config.port
        ),
        theme::dim(),
    )));

    let header = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(header, area);
}

fn draw_footer(frame: &mut Frame, area: ratatui::layout::Rect, app: &App) {
    let mut lines = Vec::new();
    if let Some(ref error) = app.error {
        lines.push(Line::from(Span::styled(error.as_str(), theme::error())));
    }
    lines.push(Line::from(vec![
        Span::styled("[", theme::dim()),
        Span::styled("↑↓", theme::key_hint()),
        Span::styled("] Navigate  [", theme::dim()),
        Span::styled("Enter", theme::key_hint()),
        Span::styled("] Select  [", theme::dim()),
        Span::styled("q", theme::key_hint()),
        Span::styled("] Quit", theme::dim()),
    ]));

    let footer = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(footer, area);
}
