use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::{App, Focus};
use crate::ui::styles;
use crate::ui::tabs::today::render_record_table;
use crate::utils::format_date;

/// Render the History tab - archived date list beside that day's records
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(22), Constraint::Min(40)])
        .split(area);

    render_date_list(frame, app, chunks[0]);
    render_day_records(frame, app, chunks[1]);
}

fn render_date_list(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::List);

    let items: Vec<ListItem> = app
        .archived_dates
        .iter()
        .map(|date| ListItem::new(format_date(date)))
        .collect();

    let title = format!(" Dates ({}) ", app.archived_dates.len());

    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(focused)),
        )
        .highlight_style(styles::selected_style());

    let mut state = ListState::default();
    if !app.archived_dates.is_empty() {
        state.select(Some(app.date_selection));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

fn render_day_records(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Detail);

    match app.selected_date() {
        Some(date) if app.day_records.contains_key(date) => {
            let records = app.filtered_day_records();
            let label = format!(" {} ", format_date(date));
            render_record_table(
                frame,
                app,
                &records,
                app.day_record_selection,
                &label,
                area,
                focused,
            );
        }
        Some(_) => {
            render_placeholder(frame, "Loading day...", focused, area);
        }
        None => {
            render_placeholder(frame, "No archived dates", focused, area);
        }
    }
}

fn render_placeholder(frame: &mut Frame, message: &str, focused: bool, area: Rect) {
    let paragraph = Paragraph::new(message).style(styles::muted_style()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_style(focused)),
    );
    frame.render_widget(paragraph, area);
}
