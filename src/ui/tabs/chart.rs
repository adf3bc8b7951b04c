use ratatui::{
    layout::Rect,
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::summary::aggregate;
use crate::ui::styles;
use crate::utils::truncate;

/// Bar label width; first names mostly fit, longer names get an ellipsis
const BAR_WIDTH: u16 = 9;

/// Render the Chart tab - per-student time-spent bars for the filtered view.
/// The series is recomputed from the current record list on every frame, so
/// filter changes and refreshes show up immediately.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let records = app.filtered_records();
    let (_, points) = aggregate(records.iter().copied());

    let title = format!(" Time Spent Today ({} students) ", points.len());

    if points.is_empty() {
        let paragraph = Paragraph::new("No records to chart")
            .style(styles::muted_style())
            .block(
                Block::default()
                    .title(title)
                    .title_style(styles::muted_style())
                    .borders(Borders::ALL)
                    .border_style(styles::border_style(true)),
            );
        frame.render_widget(paragraph, area);
        return;
    }

    // Only as many bars as fit the width; the rest would render as zero-width
    let capacity = (area.width.saturating_sub(2) / (BAR_WIDTH + 1)) as usize;
    let bars: Vec<Bar> = points
        .iter()
        .take(capacity.max(1))
        .map(|point| {
            Bar::default()
                .label(truncate(&point.student_name, BAR_WIDTH as usize).into())
                .value(point.minutes)
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(BAR_WIDTH)
        .bar_gap(1)
        .bar_style(styles::chart_bar_style())
        .value_style(styles::highlight_style());

    frame.render_widget(chart, area);
}
