//! Error history popup, newest first.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let popup = super::centered_rect(80, 70, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::negative())
        .title(format!(" Errors ({}) [Esc] close ", app.error_history.len()));

    let lines: Vec<Line> = if app.error_history.is_empty() {
        vec![Line::from(Span::styled("No errors.", theme::muted()))]
    } else {
        app.error_history
            .iter()
            .rev()
            .map(|record| {
                Line::from(vec![
                    Span::styled(record.at.format("%H:%M:%S ").to_string(), theme::muted()),
                    Span::styled(format!("{:<8} ", record.category.label()), theme::warning()),
                    Span::styled(format!("{}: ", record.context), theme::accent()),
                    Span::raw(record.message.as_str()),
                ])
            })
            .collect()
    };

    f.render_widget(Paragraph::new(lines).block(block), popup);
}
