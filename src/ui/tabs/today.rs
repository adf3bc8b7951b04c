use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::{App, Focus};
use crate::models::AttendanceRecord;
use crate::summary::{aggregate, normalize_minutes};
use crate::ui::styles;
use crate::utils::{format_minutes, format_time};

/// Render the Today tab - record table beside the summary panel
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(area);

    let records = app.filtered_records();
    render_record_table(
        frame,
        app,
        &records,
        app.record_selection,
        " Today ",
        chunks[0],
        matches!(app.focus, Focus::List),
    );
    render_summary_panel(frame, app, &records, chunks[1]);
}

/// Record table shared by the Today and History tabs
pub fn render_record_table(
    frame: &mut Frame,
    app: &App,
    records: &[&AttendanceRecord],
    selection: usize,
    label: &str,
    area: Rect,
    focused: bool,
) {
    let header = Row::new([
        Cell::from("Name"),
        Cell::from("Status"),
        Cell::from("In"),
        Cell::from("Out"),
        Cell::from("Time"),
        Cell::from("Notified"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let style = if i == selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            let checkin = record
                .checkin_time
                .as_deref()
                .map(format_time)
                .unwrap_or_else(|| "-".to_string());
            let checkout = record
                .checkout_time
                .as_deref()
                .map(format_time)
                .unwrap_or_else(|| "-".to_string());
            let minutes = format_minutes(normalize_minutes(record.time_spent.as_ref()));
            let notified = if record.parent_notified { "Yes" } else { "No" };

            Row::new([
                Cell::from(record.student_name.clone()),
                Cell::from(record.status_display().to_string()),
                Cell::from(checkin),
                Cell::from(checkout),
                Cell::from(minutes),
                Cell::from(notified),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Percentage(34), // Name
        Constraint::Fill(2),        // Status
        Constraint::Length(6),      // In
        Constraint::Length(6),      // Out
        Constraint::Length(8),      // Time
        Constraint::Length(8),      // Notified
    ];

    let title = if app.filter.is_empty() {
        format!("{}({}) ", label, records.len())
    } else {
        format!("{}({}, filtered) ", label, records.len())
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(focused)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_summary_panel(
    frame: &mut Frame,
    app: &App,
    records: &[&AttendanceRecord],
    area: Rect,
) {
    let focused = matches!(app.focus, Focus::Detail);
    let (summary, _) = aggregate(records.iter().copied());

    let mut lines = vec![
        Line::from(Span::styled("Summary", styles::highlight_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("Checked In:  ", styles::muted_style()),
            Span::styled(summary.checked_in.to_string(), styles::success_style()),
        ]),
        Line::from(vec![
            Span::styled("Checked Out: ", styles::muted_style()),
            Span::raw(summary.checked_out.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Notified:    ", styles::muted_style()),
            Span::raw(summary.notified.to_string()),
        ]),
    ];

    // Selected record detail below the counters
    if let Some(record) = records.get(app.record_selection) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            record.student_name.clone(),
            styles::title_style(),
        )));
        lines.push(Line::from(vec![
            Span::styled("Status:   ", styles::muted_style()),
            Span::raw(record.status_display().to_string()),
        ]));
        lines.push(Line::from(vec![
            Span::styled("In:       ", styles::muted_style()),
            Span::raw(
                record
                    .checkin_time
                    .as_deref()
                    .map(format_time)
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Out:      ", styles::muted_style()),
            Span::raw(
                record
                    .checkout_time
                    .as_deref()
                    .map(format_time)
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Time:     ", styles::muted_style()),
            Span::raw(format_minutes(normalize_minutes(
                record.time_spent.as_ref(),
            ))),
        ]));
        let (notified, style) = if record.parent_notified {
            ("Yes", styles::success_style())
        } else {
            ("No", styles::muted_style())
        };
        lines.push(Line::from(vec![
            Span::styled("Notified: ", styles::muted_style()),
            Span::styled(notified, style),
        ]));
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Summary ")
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(focused)),
    );

    frame.render_widget(paragraph, area);
}
