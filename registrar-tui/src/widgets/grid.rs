//! Data grid table widget.

use crate::theme::ConsoleTheme;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};
use registrar_grid::{GridBody, GridFrame};

const SKELETON_CELL: &str = "░░░░░░░░";

pub struct GridTable<'a> {
    pub title: &'a str,
    pub frame: &'a GridFrame,
    pub selected: Option<usize>,
    pub theme: &'a ConsoleTheme,
}

impl<'a> GridTable<'a> {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let border = if self.frame.is_loading {
            self.theme.border
        } else {
            self.theme.border_focus
        };
        let block = Block::default()
            .title(self.title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let (rows, message, message_style): (Vec<Row>, Option<String>, Style) = match &self.frame.body {
            GridBody::Skeleton { rows, columns } => {
                let skeleton = (0..*rows)
                    .map(|_| {
                        Row::new((0..*columns).map(|_| Cell::from(SKELETON_CELL)))
                            .style(Style::default().fg(self.theme.text_muted))
                    })
                    .collect();
                (skeleton, None, Style::default())
            }
            GridBody::Rows(rows) => (self.data_rows(rows), None, Style::default()),
            GridBody::Empty { message } => (
                Vec::new(),
                Some(message.clone()),
                Style::default().fg(self.theme.text_dim),
            ),
            GridBody::Failed {
                message,
                retriable,
                rows,
            } => {
                let text = if *retriable {
                    format!("{} (press r to retry)", message)
                } else {
                    message.clone()
                };
                let color = if *retriable {
                    self.theme.warning
                } else {
                    self.theme.error
                };
                (self.data_rows(rows), Some(text), Style::default().fg(color))
            }
        };

        let (table_area, message_area) = match message {
            Some(_) => {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(2)])
                    .split(inner);
                (chunks[0], Some(chunks[1]))
            }
            None => (inner, None),
        };

        let count = self.frame.headers.len().max(1) as u32;
        let widths: Vec<Constraint> = self
            .frame
            .headers
            .iter()
            .map(|_| Constraint::Ratio(1, count))
            .collect();
        let header = Row::new(self.frame.headers.iter().map(|h| Cell::from(h.clone()))).style(
            Style::default()
                .fg(self.theme.primary)
                .add_modifier(Modifier::BOLD),
        );
        let table = Table::new(rows, widths)
            .header(header)
            .highlight_style(Style::default().bg(self.theme.bg_highlight).fg(self.theme.text))
            .highlight_symbol("▶ ");

        let mut state = TableState::default();
        if matches!(self.frame.body, GridBody::Rows(_) | GridBody::Failed { .. }) {
            state.select(self.selected);
        }
        f.render_stateful_widget(table, table_area, &mut state);

        if let (Some(text), Some(area)) = (message, message_area) {
            let paragraph = Paragraph::new(text)
                .style(message_style)
                .wrap(Wrap { trim: true });
            f.render_widget(paragraph, area);
        }
    }

    fn data_rows(&self, rows: &[Vec<String>]) -> Vec<Row<'static>> {
        rows.iter()
            .map(|cells| {
                Row::new(cells.iter().map(|c| Cell::from(c.clone())))
                    .style(Style::default().fg(self.theme.text))
            })
            .collect()
    }
}
