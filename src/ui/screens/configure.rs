//! Pi configuration screen

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{ConfigField, ConfigureState};
use crate::ui::layout::centered_rect;
use crate::ui::theme;

pub fn draw(frame: &mut Frame, state: &ConfigureState) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Header
            Constraint::Min(14),    // Form
            Constraint::Length(3),  // Footer
        ])
        .split(centered_rect(70, 90, area));

    let header = Paragraph::new(Line::from(Span::styled(
        "Pi Configuration",
        theme::title(),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(header, chunks[0]);

    draw_form(frame, chunks[1], state);
    draw_footer(frame, chunks[2], state);
}

fn field_line<'a>(label: &'a str, value: String, active: bool) -> Line<'a> {
    let marker = if active { "> " } else { "  " };
    let value_style = if active { theme::selected() } else { theme::text() };
    Line::from(vec![
        Span::styled(marker, theme::info()),
        Span::styled(format!("{:<22}", label), theme::text()),
        Span::styled(value, value_style),
    ])
}

fn toggle_line<'a>(label: &'a str, on: bool, active: bool) -> Line<'a> {
    field_line(label, format!("[{}]", if on { "x" } else { " " }), active)
}

fn button_line(label: &str, active: bool) -> Line<'_> {
    let marker = if active { "> " } else { "  " };
    let style = if active { theme::selected() } else { theme::key_hint() };
    Line::from(vec![
        Span::styled(marker, theme::info()),
        Span::styled(label, style),
    ])
}

fn draw_form(frame: &mut Frame, area: Rect, state: &ConfigureState) {
    let active = state.active_field;

    let password_display = if state.show_password {
        state.password.clone()
    } else {
        "•".repeat(state.password.len())
    };

    let mut lines = vec![
        Line::from(""),
        field_line(
            "Hostname / IP",
            state.hostname.clone(),
            active == ConfigField::Hostname,
        ),
        field_line("SSH port", state.port.clone(), active == ConfigField::Port),
        field_line(
            "Username",
            state.username.clone(),
            active == ConfigField::Username,
        ),
        field_line(
            "Password",
            password_display,
            active == ConfigField::Password,
        ),
        Line::from(""),
        toggle_line(
            "Show password",
            state.show_password,
            active == ConfigField::ShowPassword,
        ),
        toggle_line(
            "Desktop shortcut",
            state.desktop_shortcut,
            active == ConfigField::DesktopShortcut,
        ),
        toggle_line(
            "Start menu shortcut",
            state.start_menu_shortcut,
            active == ConfigField::StartMenuShortcut,
        ),
        Line::from(""),
        button_line("Save", active == ConfigField::Save),
        button_line("Reset to defaults", active == ConfigField::Reset),
    ];

    if let Some(ref error) = state.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(error.as_str(), theme::error())));
    }

    let form = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme::border_active())
            .title(Span::styled(" Connection Settings ", theme::title())),
    );
    frame.render_widget(form, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, state: &ConfigureState) {
    let toggle_hint = !state.active_field.is_text();
    let mut spans = vec![
        Span::styled("[", theme::dim()),
        Span::styled("Tab/↑↓", theme::key_hint()),
        Span::styled("] Move  ", theme::dim()),
    ];
    if toggle_hint {
        spans.extend([
            Span::styled("[", theme::dim()),
            Span::styled("Space/Enter", theme::key_hint()),
            Span::styled("] Toggle/Select  ", theme::dim()),
        ]);
    } else {
        spans.extend([
            Span::styled("[", theme::dim()),
            Span::styled("Enter", theme::key_hint()),
            Span::styled("] Next field  ", theme::dim()),
        ]);
    }
    spans.extend([
        Span::styled("[", theme::dim()),
        Span::styled("Esc", theme::key_hint()),
        Span::styled("] Cancel", theme::dim()),
    ]);

    let footer = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    frame.render_widget(footer, area);
}
