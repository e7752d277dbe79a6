//! Filter bar and filter editor widgets.

use crate::state::FilterEditor;
use crate::theme::ConsoleTheme;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use registrar_grid::{FilterCell, FilterKind};

fn shown_value(kind: FilterKind, value: &str) -> String {
    match (kind, value.is_empty()) {
        (FilterKind::Select, true) => "all".to_string(),
        (FilterKind::Text, true) => "—".to_string(),
        (_, false) => value.to_string(),
    }
}

pub struct FilterBar<'a> {
    pub title: &'a str,
    pub cells: Vec<&'a FilterCell>,
    pub active_style: Style,
    pub inactive_style: Style,
}

impl<'a> FilterBar<'a> {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let spans: Vec<Span> = self
            .cells
            .iter()
            .map(|cell| {
                let style = if cell.value.is_empty() {
                    self.inactive_style
                } else {
                    self.active_style
                };
                Span::styled(
                    format!(" {}: {} ", cell.field, shown_value(cell.kind, &cell.value)),
                    style,
                )
            })
            .collect();

        let paragraph = Paragraph::new(Line::from(spans))
            .block(Block::default().title(self.title).borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }
}

/// Popup listing the fields being edited, the focused one highlighted.
pub struct FilterEditorPopup<'a> {
    pub editor: &'a FilterEditor,
    pub theme: &'a ConsoleTheme,
}

impl<'a> FilterEditorPopup<'a> {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = self
            .editor
            .fields
            .iter()
            .enumerate()
            .map(|(index, field)| {
                let focused = index == self.editor.focus;
                let label_style = if focused {
                    Style::default()
                        .fg(self.theme.primary)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(self.theme.text_dim)
                };
                let value = match field.binding.kind {
                    FilterKind::Text if focused => format!("{}▏", field.value),
                    FilterKind::Text => shown_value(FilterKind::Text, &field.value),
                    FilterKind::Select => {
                        format!("‹ {} ›", shown_value(FilterKind::Select, &field.value))
                    }
                };
                Line::from(vec![
                    Span::styled(format!("{:>14}: ", field.binding.field_name), label_style),
                    Span::styled(value, Style::default().fg(self.theme.text)),
                ])
            })
            .collect();
        lines.push(Line::from(Span::styled(
            "Enter apply • Esc cancel • Tab next field • ←/→ options",
            Style::default().fg(self.theme.text_muted),
        )));

        let widget = Paragraph::new(Text::from(lines)).block(
            Block::default()
                .title(self.editor.title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(self.theme.border_focus)),
        );
        f.render_widget(widget, area);
    }
}
