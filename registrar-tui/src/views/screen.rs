//! Grid screen body: filter row, table, pager, and detail panel.

use crate::state::App;
use crate::widgets::{DetailPanel, FilterBar, GridTable, PagerBar};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let screen = app.screen();
    let frame = screen.grid.frame();

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(columns[0]);

    FilterBar {
        title: "Filters [f] • Search [/]",
        cells: frame.filter_cells().collect(),
        active_style: Style::default().fg(app.theme.primary),
        inactive_style: Style::default().fg(app.theme.text_dim),
    }
    .render(f, left[0]);

    GridTable {
        title: app.active_view.title(),
        frame: &frame,
        selected: screen.selected,
        theme: &app.theme,
    }
    .render(f, left[1]);

    PagerBar {
        pager: &frame.pager,
        theme: &app.theme,
    }
    .render(f, left[2]);

    let fields = app.selected_fields(&frame).unwrap_or_default();
    DetailPanel {
        title: "Details",
        fields,
        style: Style::default().fg(app.theme.secondary),
    }
    .render(f, columns[1]);
}
