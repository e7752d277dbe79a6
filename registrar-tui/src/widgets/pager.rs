//! Pager bar: page label, prev/next controls, and page size choices.

use crate::theme::{control_color, ConsoleTheme};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use registrar_grid::Pager;

pub struct PagerBar<'a> {
    pub pager: &'a Pager,
    pub theme: &'a ConsoleTheme,
}

impl<'a> PagerBar<'a> {
    pub fn spans(&self) -> Vec<Span<'static>> {
        let pager = self.pager;
        let mut spans = vec![
            Span::styled(
                "‹ prev [h]",
                Style::default().fg(control_color(pager.can_prev, self.theme)),
            ),
            Span::raw("  "),
            Span::styled(pager.label(), Style::default().fg(self.theme.text)),
            Span::raw("  "),
            Span::styled(
                "[l] next ›",
                Style::default().fg(control_color(pager.can_next, self.theme)),
            ),
            Span::styled("   Rows per page [s]:", Style::default().fg(self.theme.text_dim)),
        ];
        for size in &pager.page_sizes {
            let style = if *size == pager.page_size {
                Style::default()
                    .fg(self.theme.primary)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.text_dim)
            };
            spans.push(Span::styled(format!(" {}", size), style));
        }
        if let Some(total) = pager.total_count {
            spans.push(Span::styled(
                format!("   {} total", total),
                Style::default().fg(self.theme.text_dim),
            ));
        }
        spans
    }

    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let paragraph =
            Paragraph::new(Line::from(self.spans())).block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }
}
