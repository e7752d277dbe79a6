//! Grid status badge.

use crate::theme::{grid_status_color, ConsoleTheme};
use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use registrar_grid::GridStatus;

pub fn status_label(status: &GridStatus) -> &'static str {
    match status {
        GridStatus::Loading => "Loading…",
        GridStatus::Ready => "Ready",
        GridStatus::Errored(failure) if failure.is_retriable() => "Offline",
        GridStatus::Errored(_) => "Error",
    }
}

pub struct StatusIndicator<'a> {
    pub status: &'a GridStatus,
    pub theme: &'a ConsoleTheme,
}

impl<'a> StatusIndicator<'a> {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let paragraph = Paragraph::new(status_label(self.status))
            .alignment(Alignment::Center)
            .style(Style::default().fg(grid_status_color(self.status, self.theme)))
            .block(Block::default().title("Status").borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }
}
