//! The active-signal table for one side, sorted by BB60 as delivered.

use ratatui::layout::{Constraint, Rect};
use ratatui::text::Span;
use ratatui::widgets::{Cell, Paragraph, Row, Table};
use ratatui::Frame;

use niftyscan_core::signals::VIEW_COLUMNS;

use crate::app::AppState;
use crate::theme;

const WIDTHS: [u16; 12] = [14, 7, 7, 7, 8, 7, 7, 7, 7, 7, 17, 12];

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let Some(view) = app.current_view() else {
        let text = if app.fetch.in_progress {
            "Fetching first cycle..."
        } else {
            "Waiting for the first refresh. Press [r] to refresh."
        };
        f.render_widget(Paragraph::new(Span::styled(text, theme::muted())), area);
        return;
    };

    if view.is_empty() {
        let text = format!("No active {} signals.", view.title);
        f.render_widget(Paragraph::new(Span::styled(text, theme::muted())), area);
        return;
    }

    let header = Row::new(VIEW_COLUMNS.iter().map(|name| Cell::from(*name)))
        .style(theme::accent_bold());

    let cursor = app.current_scroll();
    // Header takes one line; keep the cursor on screen.
    let visible = area.height.saturating_sub(1).max(1) as usize;
    let start = cursor.saturating_sub(visible - 1);

    let rows = view
        .rows
        .iter()
        .enumerate()
        .skip(start)
        .take(visible)
        .map(|(i, row)| {
            let style = if i == cursor {
                theme::selected_row()
            } else {
                theme::band_width(row.bb60)
            };
            Row::new(row.cells().map(Cell::from)).style(style)
        });

    let table = Table::new(rows, WIDTHS.map(Constraint::Length))
        .header(header)
        .column_spacing(1);
    f.render_widget(table, area);
}
