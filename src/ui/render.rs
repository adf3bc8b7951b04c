use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, LoginFocus, Tab};
use crate::models::{NotifiedFilter, StatusFilter};

use super::styles;
use super::tabs::{chart, history, today};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(2), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }

    if matches!(app.state, AppState::LoggingIn) {
        render_login_overlay(frame, app);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, _app: &App, area: Rect) {
    let title = "  Rollcall";
    let help_hint = "[?] Help";

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(title.len() as u16 + help_hint.len() as u16 + 4)
                as usize,
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let tabs = [
        ("[1] Today", app.current_tab == Tab::Today),
        ("[2] History", app.current_tab == Tab::History),
        ("[3] Chart", app.current_tab == Tab::Chart),
    ];

    let mut spans = vec![Span::raw(" ")];
    for (i, (label, selected)) in tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        if *selected {
            spans.push(Span::styled(*label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(*label, styles::muted_style()));
        }
    }

    let line = Line::from(spans);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_tab {
        Tab::Today => today::render(frame, app, area),
        Tab::History => history::render(frame, app, area),
        Tab::Chart => chart::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left_text = if matches!(app.state, AppState::Searching) {
        format!(" /{}_", app.filter.name_query)
    } else if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else {
        format!(" Updated {} ", app.cache_ages.last_updated())
    };

    // Filter indicators only when they narrow something
    let mut filter_parts = Vec::new();
    if !app.filter.name_query.is_empty() && !matches!(app.state, AppState::Searching) {
        filter_parts.push(format!("name:{}", app.filter.name_query));
    }
    if app.filter.status != StatusFilter::All {
        filter_parts.push(format!("status:{}", app.filter.status.label()));
    }
    if app.filter.notified != NotifiedFilter::All {
        filter_parts.push(format!("notified:{}", app.filter.notified.label()));
    }
    let filter_text = if filter_parts.is_empty() {
        String::new()
    } else {
        format!("[{}] ", filter_parts.join(" "))
    };

    let shortcuts = "[/] search [s]tatus [n]otified [e]xport [u]pdate [q]uit ";
    let padding = (area.width as usize)
        .saturating_sub(left_text.len() + filter_text.len() + shortcuts.len());

    let line = Line::from(vec![
        Span::raw(left_text),
        Span::styled(filter_text, styles::search_style()),
        Span::raw(" ".repeat(padding)),
        Span::styled(shortcuts, styles::muted_style()),
    ]);

    let paragraph = Paragraph::new(line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Overlays
// ============================================================================

/// Centered rectangle helper for overlays
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect(46, 18, frame.area());
    frame.render_widget(Clear, area);

    let entries = [
        ("1/2/3", "Switch tab"),
        ("Tab", "Next tab"),
        ("j/k, Up/Down", "Move selection"),
        ("h/l, Left/Right", "Switch panel"),
        ("/", "Search by name"),
        ("s", "Cycle status filter"),
        ("n", "Cycle notified filter"),
        ("c", "Clear filters"),
        ("e", "Export CSV"),
        ("u", "Refresh data"),
        ("L", "Sign out"),
        ("?", "Toggle help"),
        ("q", "Quit"),
    ];

    let mut lines = vec![Line::from("")];
    for (key, desc) in entries {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(format!("{:<16}", key), styles::help_key_style()),
            Span::styled(desc, styles::help_desc_style()),
        ]));
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Help ")
            .title_style(styles::title_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(true)),
    );
    frame.render_widget(paragraph, area);
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect(50, 12, frame.area());
    frame.render_widget(Clear, area);

    let email_focused = app.login_focus == LoginFocus::Email;
    let password_focused = app.login_focus == LoginFocus::Password;
    let button_focused = app.login_focus == LoginFocus::Button;

    let masked: String = "*".repeat(app.login_password.len());

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Email:    ", styles::muted_style()),
            Span::styled(
                format!("{}{}", app.login_email, if email_focused { "_" } else { "" }),
                if email_focused {
                    styles::highlight_style()
                } else {
                    styles::list_item_style()
                },
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Password: ", styles::muted_style()),
            Span::styled(
                format!("{}{}", masked, if password_focused { "_" } else { "" }),
                if password_focused {
                    styles::highlight_style()
                } else {
                    styles::list_item_style()
                },
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(
                "[ Sign In ]",
                if button_focused {
                    styles::selected_style()
                } else {
                    styles::muted_style()
                },
            ),
        ]),
    ];

    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", error),
            styles::error_style(),
        )));
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Sign In ")
            .title_style(styles::title_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(true)),
    );
    frame.render_widget(paragraph, area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect(34, 5, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::raw("  Quit Rollcall? [y/n]")),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Confirm ")
            .title_style(styles::title_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(true)),
    );
    frame.render_widget(paragraph, area);
}
