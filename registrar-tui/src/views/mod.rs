//! Screens and view rendering dispatch.

pub mod batch;
pub mod course;
pub mod instructor;
pub mod screen;
pub mod student;

use crate::config::TuiConfig;
use crate::nav::View;
use crate::notifications::NotificationAction;
use crate::state::App;
use crate::theme::notification_color;
use crate::widgets::{FilterEditorPopup, StatusIndicator};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use registrar_grid::{
    BaseQuery, ColumnDescriptor, GridController, GridError, GridHandle, GridRow, GridSpec,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;

/// Row identifiers arrive as numbers from some endpoints and strings from others.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(i64),
    Text(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Number(n) => write!(f, "{}", n),
            EntityId::Text(s) => f.write_str(s),
        }
    }
}

pub(crate) fn full_name(first: &Option<String>, last: &Option<String>) -> Option<String> {
    let parts: Vec<&str> = [first, last]
        .into_iter()
        .flatten()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

fn default_resource(view: View) -> &'static str {
    match view {
        View::Instructors => instructor::RESOURCE,
        View::Courses => course::RESOURCE,
        View::Batches => batch::RESOURCE,
        View::Students => student::RESOURCE,
    }
}

fn default_base_query(view: View) -> &'static str {
    match view {
        View::Instructors => instructor::BASE_QUERY,
        View::Courses | View::Batches | View::Students => "",
    }
}

/// Resource path for a screen, honoring config overrides.
pub fn resource_path(config: &TuiConfig, view: View) -> String {
    config
        .resource(view)
        .and_then(|r| r.path.as_deref())
        .unwrap_or_else(|| default_resource(view))
        .trim()
        .trim_matches('/')
        .to_string()
}

pub fn base_query(config: &TuiConfig, view: View) -> BaseQuery {
    let query = config
        .resource(view)
        .and_then(|r| r.base_query.as_deref())
        .unwrap_or_else(|| default_base_query(view));
    BaseQuery::parse(query)
}

fn spec_for<T>(config: &TuiConfig, view: View, columns: Vec<ColumnDescriptor<T>>) -> GridSpec<T> {
    GridSpec::new(resource_path(config, view), columns)
        .with_base_query(base_query(config, view))
        .with_page_size(config.grid.default_page_size)
        .with_page_sizes(config.grid.page_sizes.iter().copied())
        .with_page_params(config.grid.page_params())
        .stale_while_error(config.grid.stale_while_error)
}

fn boxed<T>(spec: GridSpec<T>) -> Result<Box<dyn GridHandle>, GridError>
where
    T: GridRow + DeserializeOwned + 'static,
{
    Ok(Box::new(GridController::new(spec)?))
}

/// Build the grid backing `view`.
pub fn build_grid(config: &TuiConfig, view: View) -> Result<Box<dyn GridHandle>, GridError> {
    match view {
        View::Instructors => boxed(
            spec_for(config, view, instructor::columns()).with_search_field(instructor::SEARCH_FIELD),
        ),
        View::Courses => boxed(spec_for(config, view, course::columns())),
        View::Batches => boxed(spec_for(config, view, batch::columns())),
        View::Students => boxed(spec_for(config, view, student::columns())),
    }
}

pub fn render_view(f: &mut Frame<'_>, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.size());

    render_header(f, app, layout[0]);
    screen::render(f, app, layout[1]);
    render_footer(f, app, layout[2]);

    if let Some(editor) = &app.editor {
        let area = centered(f.size(), 60, (editor.fields.len() as u16) + 4);
        f.render_widget(Clear, area);
        FilterEditorPopup {
            editor,
            theme: &app.theme,
        }
        .render(f, area);
    } else if let Some(modal) = &app.modal {
        let area = centered(f.size(), 60, 14);
        f.render_widget(Clear, area);
        let widget = Paragraph::new(modal.message.clone())
            .block(
                Block::default()
                    .title(modal.title.as_str())
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(app.theme.border_focus)),
            )
            .wrap(Wrap { trim: false });
        f.render_widget(widget, area);
    }
}

fn render_header(f: &mut Frame<'_>, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(18)])
        .split(area);

    let mut tabs = Vec::new();
    for (index, view) in View::all().iter().enumerate() {
        let style = if *view == app.active_view {
            Style::default()
                .fg(app.theme.primary)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text_dim)
        };
        tabs.push(Span::styled(format!(" {} {} ", index + 1, view.title()), style));
    }
    let header = Paragraph::new(Line::from(tabs)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled("REGISTRAR", Style::default().fg(app.theme.secondary))),
    );
    f.render_widget(header, chunks[0]);

    StatusIndicator {
        status: app.screen().grid.status(),
        theme: &app.theme,
    }
    .render(f, chunks[1]);
}

fn render_footer(f: &mut Frame<'_>, app: &App, area: Rect) {
    let help = "j/k rows • h/l pages • s size • / search • f filters • c clear • r retry • ? help • q quit";
    let now = chrono::Utc::now();
    let (text, style) = match app.latest_notification(now) {
        Some(note) => {
            let hint = match note.action {
                Some(NotificationAction::Retry) => " [r] retry",
                None => "",
            };
            (
                format!("{}: {}{}", note.level.label(), note.message, hint),
                Style::default().fg(notification_color(note.level, &app.theme)),
            )
        }
        None => (help.to_string(), Style::default().fg(app.theme.text_dim)),
    };
    let footer = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .style(style);
    f.render_widget(footer, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
