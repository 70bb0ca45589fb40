// src/ui/layout.rs

use ratatui::layout::{Constraint, Flex, Layout, Rect};

/// Screen regions, computed once per frame.
pub struct AppLayout {
    pub input: Rect,
    pub report: Rect,
    pub summary: Rect,
    pub footer: Rect,
}

/// Input bar on top, one status line at the bottom, and between them the
/// analysis report beside a narrower summary column.
pub fn create_layout(frame_size: Rect) -> AppLayout {
    let [input, body, footer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(frame_size);

    let [report, summary] =
        Layout::horizontal([Constraint::Percentage(70), Constraint::Percentage(30)]).areas(body);

    AppLayout { input, report, summary, footer }
}

/// A box of `width`% by `height`% placed in the middle of `area`.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Percentage(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Percentage(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}
