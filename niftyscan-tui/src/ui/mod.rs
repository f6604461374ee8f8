//! Top-level UI layout: tab bar, signal table, caption, status bar.

pub mod error_overlay;
pub mod signal_table;
pub mod status_bar;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::{AppState, Tab};
use crate::theme;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_tabs(f, chunks[0], app);
    draw_table(f, chunks[1], app);
    draw_caption(f, chunks[2], app);
    status_bar::render(f, chunks[3], app);

    if app.show_errors {
        error_overlay::render(f, chunks[1], app);
    }
}

fn draw_tabs(f: &mut Frame, area: Rect, app: &AppState) {
    let mut spans = vec![Span::styled(" niftyscan ", theme::accent_bold())];
    for tab in Tab::ALL {
        let count = app
            .views
            .as_ref()
            .map(|views| views[tab.index()].len().to_string())
            .unwrap_or_else(|| "-".into());
        let label = format!(" [{}] {} ({count}) ", tab.index() + 1, tab.label());
        let style = if tab == app.active_tab {
            theme::side(tab.side()).patch(theme::selected_row())
        } else {
            theme::muted()
        };
        spans.push(Span::styled(label, style));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_table(f: &mut Frame, area: Rect, app: &AppState) {
    let tab = app.active_tab;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(true))
        .title(format!(" {} ", tab.label()))
        .title_style(theme::side(tab.side()));

    let inner = block.inner(area);
    f.render_widget(block, area);
    signal_table::render(f, inner, app);
}

fn draw_caption(f: &mut Frame, area: Rect, app: &AppState) {
    let text = app
        .current_view()
        .map(|view| view.caption.clone())
        .unwrap_or_default();
    f.render_widget(Paragraph::new(Span::styled(text, theme::muted())), area);
}

/// Compute a centered rect for overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
