//! Application state: screens, filter editor, notifications.

use crate::config::TuiConfig;
use crate::keys::{map_editor_key, map_key, Action, EditorAction};
use crate::nav::View;
use crate::notifications::{self, Notification, NotificationAction, NotificationLevel};
use crate::persistence::PersistedState;
use crate::theme::ConsoleTheme;
use crate::views;
use chrono::{DateTime, Utc};
use crossterm::event::KeyEvent;
use registrar_grid::{
    Commit, FetchDispatcher, FetchOutcome, FilterBinding, FilterController, FilterKind,
    GridBody, GridCommand, GridError, GridFrame, GridHandle, GridStatus,
};

const HELP: &str = "\
Tab / Shift-Tab   switch screen (or 1-4)
j / k             move row selection
h / l             previous / next page
s                 cycle rows per page
/                 edit search
f                 edit column filters
c                 clear all filters
r                 retry the current page
Ctrl-R            refresh
q                 quit";

/// One list screen and the grid behind it.
pub struct Screen {
    pub view: View,
    pub grid: Box<dyn GridHandle>,
    pub selected: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Modal {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorField {
    pub binding: FilterBinding,
    pub value: String,
}

/// In-progress edit of one or more filter fields. Nothing reaches the grid
/// until the edit is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterEditor {
    pub title: &'static str,
    pub fields: Vec<EditorField>,
    pub focus: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorOutcome {
    Editing,
    Apply(Vec<(String, String)>),
    Cancel,
}

impl FilterEditor {
    pub fn new(
        title: &'static str,
        bindings: Vec<FilterBinding>,
        filters: &FilterController,
    ) -> Option<Self> {
        if bindings.is_empty() {
            return None;
        }
        let fields = bindings
            .into_iter()
            .map(|binding| EditorField {
                value: filters.get(&binding.field_name).unwrap_or_default().to_string(),
                binding,
            })
            .collect();
        Some(Self {
            title,
            fields,
            focus: 0,
        })
    }

    pub fn handle(&mut self, action: EditorAction) -> EditorOutcome {
        let len = self.fields.len();
        match action {
            EditorAction::Apply => {
                return EditorOutcome::Apply(
                    self.fields
                        .iter()
                        .map(|f| (f.binding.field_name.clone(), f.value.clone()))
                        .collect(),
                )
            }
            EditorAction::Cancel => return EditorOutcome::Cancel,
            EditorAction::NextField => self.focus = (self.focus + 1) % len,
            EditorAction::PrevField => self.focus = (self.focus + len - 1) % len,
            EditorAction::Insert(c) => {
                if let Some(field) = self.text_field() {
                    field.value.push(c);
                }
            }
            EditorAction::Backspace => {
                if let Some(field) = self.text_field() {
                    field.value.pop();
                }
            }
            EditorAction::NextOption => self.cycle_option(true),
            EditorAction::PrevOption => self.cycle_option(false),
        }
        EditorOutcome::Editing
    }

    fn text_field(&mut self) -> Option<&mut EditorField> {
        self.fields
            .get_mut(self.focus)
            .filter(|f| f.binding.kind == FilterKind::Text)
    }

    /// Step through `["", options...]` so the empty choice means "all".
    fn cycle_option(&mut self, forward: bool) {
        let Some(field) = self
            .fields
            .get_mut(self.focus)
            .filter(|f| f.binding.kind == FilterKind::Select)
        else {
            return;
        };
        let mut choices = vec![String::new()];
        choices.extend(field.binding.options.iter().cloned());
        let current = choices.iter().position(|c| *c == field.value).unwrap_or(0);
        let next = if forward {
            (current + 1) % choices.len()
        } else {
            (current + choices.len() - 1) % choices.len()
        };
        field.value = choices[next].clone();
    }
}

pub struct App {
    pub config: TuiConfig,
    pub theme: ConsoleTheme,
    pub active_view: View,
    pub screens: Vec<Screen>,
    pub editor: Option<FilterEditor>,
    pub notifications: Vec<Notification>,
    pub modal: Option<Modal>,
}

impl App {
    pub fn new(config: TuiConfig) -> Result<Self, GridError> {
        let screens = View::all()
            .iter()
            .map(|view| {
                Ok(Screen {
                    view: *view,
                    grid: views::build_grid(&config, *view)?,
                    selected: None,
                })
            })
            .collect::<Result<Vec<_>, GridError>>()?;

        Ok(Self {
            config,
            theme: ConsoleTheme::standard(),
            active_view: View::Instructors,
            screens,
            editor: None,
            notifications: Vec::new(),
            modal: None,
        })
    }

    pub fn screen(&self) -> &Screen {
        &self.screens[self.active_view.index()]
    }

    pub fn screen_mut(&mut self) -> &mut Screen {
        let index = self.active_view.index();
        &mut self.screens[index]
    }

    pub fn restore(&mut self, state: &PersistedState) {
        self.active_view = state.active_view;
        for screen in &mut self.screens {
            let Some(size) = state.page_sizes.get(screen.view.key()) else {
                continue;
            };
            if let Err(err) = screen.grid.apply(GridCommand::SetPageSize(*size)) {
                tracing::warn!(view = screen.view.key(), error = %err, "ignoring persisted page size");
            }
        }
    }

    pub fn persisted(&self) -> PersistedState {
        PersistedState {
            active_view: self.active_view,
            page_sizes: self
                .screens
                .iter()
                .map(|s| (s.view.key().to_string(), s.grid.page_size()))
                .collect(),
        }
    }

    /// Issue a fetch for the visible screen if its query changed.
    pub fn pump(&mut self, dispatcher: &FetchDispatcher) {
        self.screen_mut().grid.pump(dispatcher);
    }

    /// Route a fetch outcome to the screen that issued it.
    pub fn complete(&mut self, outcome: FetchOutcome) {
        let resource = outcome.ticket.key.resource().to_string();
        let Some(screen) = self
            .screens
            .iter_mut()
            .find(|s| s.grid.resource() == resource)
        else {
            tracing::warn!(%resource, "outcome for unknown resource dropped");
            return;
        };
        if screen.grid.complete(outcome) == Commit::Discarded {
            return;
        }

        let rows = screen.grid.frame().body.row_count();
        screen.selected = clamp_selection(screen.selected, rows);

        let toast = match screen.grid.status() {
            GridStatus::Errored(failure) => {
                let note = Notification::new(
                    NotificationLevel::Error,
                    format!("{}: {}", screen.view.title(), failure),
                );
                Some(if failure.is_retriable() {
                    note.with_action(NotificationAction::Retry)
                } else {
                    note
                })
            }
            _ => None,
        };
        if let Some(toast) = toast {
            self.push_notification(toast);
        }
    }

    /// Returns true when the console should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if let Some(editor) = self.editor.as_mut() {
            if let Some(action) = map_editor_key(key) {
                match editor.handle(action) {
                    EditorOutcome::Editing => {}
                    EditorOutcome::Cancel => self.editor = None,
                    EditorOutcome::Apply(values) => {
                        self.editor = None;
                        self.apply_filters(values);
                    }
                }
            }
            return false;
        }
        match map_key(key) {
            Some(action) => self.handle_action(action),
            None => false,
        }
    }

    pub fn handle_action(&mut self, action: Action) -> bool {
        if self.modal.is_some() && action != Action::Quit {
            self.modal = None;
            return false;
        }
        match action {
            Action::Quit => return true,
            Action::NextView => self.active_view = self.active_view.next(),
            Action::PrevView => self.active_view = self.active_view.previous(),
            Action::SwitchView(index) => {
                if let Some(view) = View::from_index(index) {
                    self.active_view = view;
                }
            }
            Action::MoveDown => self.move_selection(1),
            Action::MoveUp => self.move_selection(-1),
            Action::PrevPage => self.command(GridCommand::PrevPage),
            Action::NextPage => self.command(GridCommand::NextPage),
            Action::CyclePageSize => self.command(GridCommand::CyclePageSize),
            Action::ClearFilters => self.command(GridCommand::ClearFilters),
            Action::Retry => self.command(GridCommand::Retry),
            Action::Refresh => self.command(GridCommand::Refresh),
            Action::OpenSearch => self.open_editor(true),
            Action::OpenFilters => self.open_editor(false),
            Action::OpenHelp => {
                self.modal = Some(Modal {
                    title: "Keybindings".to_string(),
                    message: HELP.to_string(),
                })
            }
            Action::Cancel => self.modal = None,
        }
        false
    }

    /// Apply a command to the visible grid. Misuse surfaces as a warning toast.
    pub fn command(&mut self, command: GridCommand) {
        let screen = self.screen_mut();
        match screen.grid.apply(command) {
            Ok(true) => screen.selected = None,
            Ok(false) => {}
            Err(err) => self.notify(NotificationLevel::Warning, err.to_string()),
        }
    }

    fn apply_filters(&mut self, values: Vec<(String, String)>) {
        for (field, value) in values {
            self.command(GridCommand::SetFilter { field, value });
        }
    }

    /// Open the filter editor. The search editor targets the grid's search
    /// field, or the first text filter on screens without one.
    fn open_editor(&mut self, search: bool) {
        let screen = self.screen();
        let frame = screen.grid.frame();
        let bindings = screen.grid.filter_bindings();
        let search_field = frame.search.as_ref().map(|c| c.field.clone());

        let (title, selected): (&'static str, Vec<FilterBinding>) = if search {
            let chosen = bindings
                .iter()
                .find(|b| Some(&b.field_name) == search_field.as_ref())
                .or_else(|| bindings.iter().find(|b| b.kind == FilterKind::Text))
                .cloned();
            ("Search", chosen.into_iter().collect())
        } else {
            let columns = bindings
                .into_iter()
                .filter(|b| Some(&b.field_name) != search_field.as_ref())
                .collect();
            ("Filters", columns)
        };

        match FilterEditor::new(title, selected, screen.grid.filters()) {
            Some(editor) => self.editor = Some(editor),
            None => self.notify(NotificationLevel::Info, "This screen has no filters"),
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let screen = self.screen_mut();
        let rows = screen.grid.frame().body.row_count();
        screen.selected = match (screen.selected, rows) {
            (_, 0) => None,
            (None, _) => Some(0),
            (Some(current), _) => {
                Some(current.saturating_add_signed(delta).min(rows - 1))
            }
        };
    }

    /// Header/value pairs of the selected row in `frame`.
    pub fn selected_fields(&self, frame: &GridFrame) -> Option<Vec<(String, String)>> {
        let index = self.screen().selected?;
        let rows = match &frame.body {
            GridBody::Rows(rows) | GridBody::Failed { rows, .. } => rows,
            GridBody::Skeleton { .. } | GridBody::Empty { .. } => return None,
        };
        let row = rows.get(index)?;
        Some(
            frame
                .headers
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect(),
        )
    }

    fn toast_ttl(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.config.toast_ttl_ms as i64)
    }

    pub fn latest_notification(&self, now: DateTime<Utc>) -> Option<&Notification> {
        notifications::latest_active(&self.notifications, now, self.toast_ttl())
    }

    /// Drop notifications whose TTL has passed.
    pub fn on_tick(&mut self, now: DateTime<Utc>) {
        let ttl = self.toast_ttl();
        self.notifications.retain(|n| !n.is_expired(now, ttl));
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.push_notification(Notification::new(level, message));
    }

    fn push_notification(&mut self, notification: Notification) {
        tracing::info!(level = notification.level.label(), message = %notification.message, "toast");
        self.notifications.push(notification);
    }
}

fn clamp_selection(selected: Option<usize>, rows: usize) -> Option<usize> {
    match (selected, rows) {
        (_, 0) => None,
        (Some(index), _) => Some(index.min(rows - 1)),
        (None, _) => None,
    }
}
