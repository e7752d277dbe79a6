//! Keybinding definitions for the console.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextView,
    PrevView,
    SwitchView(usize),
    MoveUp,
    MoveDown,
    PrevPage,
    NextPage,
    CyclePageSize,
    OpenSearch,
    OpenFilters,
    ClearFilters,
    Retry,
    Refresh,
    OpenHelp,
    Cancel,
}

/// Keys while the filter editor is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    Insert(char),
    Backspace,
    NextField,
    PrevField,
    PrevOption,
    NextOption,
    Apply,
    Cancel,
}

pub fn map_key(event: KeyEvent) -> Option<Action> {
    let KeyEvent { code, modifiers, .. } = event;

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Some(Action::Quit),
            KeyCode::Char('r') => Some(Action::Refresh),
            _ => None,
        };
    }

    match code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('?') => Some(Action::OpenHelp),
        KeyCode::Char('/') => Some(Action::OpenSearch),
        KeyCode::Char('f') => Some(Action::OpenFilters),
        KeyCode::Char('c') => Some(Action::ClearFilters),
        KeyCode::Char('r') => Some(Action::Retry),
        KeyCode::Char('s') => Some(Action::CyclePageSize),
        KeyCode::Esc => Some(Action::Cancel),
        KeyCode::Tab => Some(Action::NextView),
        KeyCode::BackTab => Some(Action::PrevView),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::MoveUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::MoveDown),
        KeyCode::Left | KeyCode::Char('h') => Some(Action::PrevPage),
        KeyCode::Right | KeyCode::Char('l') => Some(Action::NextPage),
        KeyCode::Char(c @ '1'..='9') => Some(Action::SwitchView(c as usize - '1' as usize)),
        _ => None,
    }
}

pub fn map_editor_key(event: KeyEvent) -> Option<EditorAction> {
    let KeyEvent { code, modifiers, .. } = event;

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Some(EditorAction::Cancel),
            _ => None,
        };
    }

    match code {
        KeyCode::Enter => Some(EditorAction::Apply),
        KeyCode::Esc => Some(EditorAction::Cancel),
        KeyCode::Tab | KeyCode::Down => Some(EditorAction::NextField),
        KeyCode::BackTab | KeyCode::Up => Some(EditorAction::PrevField),
        KeyCode::Left => Some(EditorAction::PrevOption),
        KeyCode::Right => Some(EditorAction::NextOption),
        KeyCode::Backspace => Some(EditorAction::Backspace),
        KeyCode::Char(c) => Some(EditorAction::Insert(c)),
        _ => None,
    }
}
