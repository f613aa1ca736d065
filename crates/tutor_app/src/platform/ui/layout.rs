use ratatui::layout::{Constraint, Layout, Rect};

use super::constants::{FOOTER_HEIGHT, INPUT_HEIGHT, STATUS_ROW_HEIGHT};

/// Screen regions, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppLayout {
    pub status: Rect,
    pub chat: Rect,
    pub input: Rect,
    pub footer: Rect,
}

pub fn split(area: Rect) -> AppLayout {
    let [status, chat, input, footer] = Layout::vertical([
        Constraint::Length(STATUS_ROW_HEIGHT),
        Constraint::Min(3),
        Constraint::Length(INPUT_HEIGHT),
        Constraint::Length(FOOTER_HEIGHT),
    ])
    .areas(area);
    AppLayout {
        status,
        chat,
        input,
        footer,
    }
}
