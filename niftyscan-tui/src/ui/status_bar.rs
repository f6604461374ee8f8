//! Bottom status bar: fetch progress or last refresh, then the status message.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{AppState, StatusLevel};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut spans: Vec<Span> = vec![Span::styled(
        " 1:CALL 2:PUT r:refresh j/k:scroll e:errors q:quit",
        theme::muted(),
    )];
    spans.push(Span::raw(" | "));

    if app.fetch.in_progress {
        let current = app.fetch.current_symbol.as_deref().unwrap_or("...");
        spans.push(Span::styled(
            format!("[{}/{}] {current}", app.fetch.done, app.fetch.total),
            theme::accent(),
        ));
        spans.push(Span::raw(" | "));
    } else if let Some(report) = &app.report {
        spans.push(Span::styled(
            format!("updated {}", report.completed_at.format("%H:%M:%S")),
            theme::muted(),
        ));
        spans.push(Span::raw(" | "));
    }

    if let Some((msg, level)) = &app.status_message {
        let style = match level {
            StatusLevel::Info => theme::accent(),
            StatusLevel::Warning => theme::warning(),
            StatusLevel::Error => theme::negative(),
        };
        spans.push(Span::styled(msg.as_str(), style));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
