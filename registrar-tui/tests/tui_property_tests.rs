use chrono::{Duration as ChronoDuration, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use proptest::prelude::*;
use registrar_grid::{FetchDispatcher, FetchError, FetchOutcome, GridFailure, GridStatus};
use registrar_test_utils::fixtures;
use registrar_test_utils::{ScriptedSource, StaticSource};
use registrar_tui::config::{AuthConfig, GridConfig, ResourceConfig, TuiConfig};
use registrar_tui::keys::{map_editor_key, map_key, Action, EditorAction};
use registrar_tui::nav::View;
use registrar_tui::notifications::{NotificationAction, NotificationLevel};
use registrar_tui::persistence;
use registrar_tui::state::App;
use registrar_tui::theme::{control_color, grid_status_color, ConsoleTheme};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

fn base_config() -> TuiConfig {
    TuiConfig {
        api_base_url: "http://localhost:3001".to_string(),
        auth: AuthConfig {
            token: "test-token".to_string(),
            header: "x-access-token".to_string(),
        },
        request_timeout_ms: 5_000,
        refresh_interval_ms: 250,
        toast_ttl_ms: 4_000,
        persistence_path: "tmp/registrar-tui.json".into(),
        log_path: "tmp/registrar-tui.log".into(),
        grid: GridConfig {
            default_page_size: 10,
            page_sizes: vec![3, 5, 10],
            page_param: "page".to_string(),
            limit_param: "limit".to_string(),
            stale_while_error: false,
        },
        resources: BTreeMap::new(),
    }
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent {
        code,
        modifiers: KeyModifiers::NONE,
        kind: KeyEventKind::Press,
        state: KeyEventState::NONE,
    }
}

async fn next_outcome(rx: &mut UnboundedReceiver<FetchOutcome>) -> FetchOutcome {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for a fetch outcome")
        .expect("dispatcher closed")
}

fn is_ready(app: &App) -> bool {
    matches!(app.screen().grid.status(), GridStatus::Ready)
}

// ============================================================================
// CONFIG
// ============================================================================

#[test]
fn config_base_is_valid() {
    base_config().validate().unwrap();
}

#[test]
fn config_requires_http_base_url() {
    let mut config = base_config();
    config.api_base_url = "localhost:3001".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn config_requires_auth_token() {
    let mut config = base_config();
    config.auth.token = "  ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn config_default_page_size_must_be_allowed() {
    let mut config = base_config();
    config.grid.default_page_size = 25;
    assert!(config.validate().is_err());
}

#[test]
fn config_rejects_unknown_screen_override() {
    let mut config = base_config();
    config.resources.insert(
        "teachers".to_string(),
        ResourceConfig {
            path: Some("teachers".to_string()),
            base_query: None,
        },
    );
    assert!(config.validate().is_err());
}

#[test]
fn config_rejects_shared_resource_paths() {
    let mut config = base_config();
    config.resources.insert(
        "students".to_string(),
        ResourceConfig {
            path: Some("/courses/".to_string()),
            base_query: None,
        },
    );
    assert!(config.validate().is_err());
}

// ============================================================================
// KEYS
// ============================================================================

proptest! {
    #[test]
    fn digit_keys_switch_views(index in 0usize..9) {
        let c = char::from(b'1' + index as u8);
        prop_assert_eq!(map_key(key(KeyCode::Char(c))), Some(Action::SwitchView(index)));
    }

    #[test]
    fn editor_inserts_every_printable_char(c in proptest::char::range('!', '~')) {
        prop_assert_eq!(map_editor_key(key(KeyCode::Char(c))), Some(EditorAction::Insert(c)));
    }
}

#[test]
fn control_c_quits_and_control_r_refreshes() {
    let mut event = key(KeyCode::Char('c'));
    event.modifiers = KeyModifiers::CONTROL;
    assert_eq!(map_key(event), Some(Action::Quit));
    event.code = KeyCode::Char('r');
    assert_eq!(map_key(event), Some(Action::Refresh));
}

// ============================================================================
// APP
// ============================================================================

#[tokio::test]
async fn first_fetch_uses_base_query_and_default_page_size() {
    let source = Arc::new(StaticSource::new(fixtures::instructors(4)));
    let (dispatcher, mut rx) = FetchDispatcher::channel(source.clone());
    let mut app = App::new(base_config()).unwrap();

    app.pump(&dispatcher);
    app.complete(next_outcome(&mut rx).await);

    let calls = source.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].resource(), "api/users/list");
    assert_eq!(calls[0].query(), "user_group=instructor&page=1&limit=10");
    assert!(is_ready(&app));
    assert_eq!(app.screen().grid.frame().body.row_count(), 4);
}

#[tokio::test]
async fn outcomes_route_to_the_screen_that_issued_them() {
    let source = Arc::new(ScriptedSource::new());
    let (dispatcher, mut rx) = FetchDispatcher::channel(source.clone());
    let mut app = App::new(base_config()).unwrap();

    app.pump(&dispatcher);
    app.handle_action(Action::SwitchView(View::Courses.index()));
    app.pump(&dispatcher);
    source.wait_for_calls(2).await;

    let body = fixtures::paginated(fixtures::courses(3), 1);
    assert!(source.resolve("page=1&limit=10", Ok(registrar_grid::RawResponse::new(body))));
    app.complete(next_outcome(&mut rx).await);

    assert!(is_ready(&app));
    assert_eq!(app.screen().grid.frame().body.row_count(), 3);
    let instructors = &app.screens[View::Instructors.index()];
    assert!(instructors.grid.status().is_loading());
}

#[tokio::test]
async fn filter_editor_applies_typed_value() {
    let source = Arc::new(StaticSource::new(fixtures::courses(12)));
    let (dispatcher, mut rx) = FetchDispatcher::channel(source.clone());
    let mut app = App::new(base_config()).unwrap();
    app.handle_action(Action::SwitchView(View::Courses.index()));
    app.pump(&dispatcher);
    app.complete(next_outcome(&mut rx).await);

    app.handle_key(key(KeyCode::Char('f')));
    assert!(app.editor.is_some());
    for c in "Course 2".chars() {
        app.handle_key(key(KeyCode::Char(c)));
    }
    app.handle_key(key(KeyCode::Enter));
    assert!(app.editor.is_none());
    assert_eq!(app.screen().grid.filters().get("filter_name"), Some("Course 2"));

    app.pump(&dispatcher);
    app.complete(next_outcome(&mut rx).await);
    let last = source.calls().last().cloned().unwrap();
    assert_eq!(last.query(), "page=1&limit=10&filter_name=Course+2");
}

#[tokio::test]
async fn escape_discards_filter_edits() {
    let mut app = App::new(base_config()).unwrap();
    app.handle_action(Action::SwitchView(View::Courses.index()));
    app.handle_key(key(KeyCode::Char('/')));
    app.handle_key(key(KeyCode::Char('x')));
    app.handle_key(key(KeyCode::Esc));
    assert!(app.editor.is_none());
    assert_eq!(app.screen().grid.filters().get("filter_name"), Some(""));
}

#[tokio::test]
async fn failed_fetch_raises_retriable_notification() {
    let source = Arc::new(StaticSource::new(fixtures::instructors(2)));
    source.fail_with(Some(FetchError::Transient("connection refused".to_string())));
    let (dispatcher, mut rx) = FetchDispatcher::channel(source.clone());
    let mut app = App::new(base_config()).unwrap();

    app.pump(&dispatcher);
    app.complete(next_outcome(&mut rx).await);

    assert!(matches!(
        app.screen().grid.status(),
        GridStatus::Errored(GridFailure::Transient { .. })
    ));
    let note = app.latest_notification(Utc::now()).unwrap();
    assert_eq!(note.level, NotificationLevel::Error);
    assert_eq!(note.action, Some(NotificationAction::Retry));
    assert!(note.message.starts_with("Instructors: "));

    source.fail_with(None);
    app.handle_action(Action::Retry);
    app.pump(&dispatcher);
    app.complete(next_outcome(&mut rx).await);
    assert!(is_ready(&app));
    assert_eq!(source.calls().len(), 2);
}

#[tokio::test]
async fn selection_is_clamped_and_feeds_detail_fields() {
    let source = Arc::new(StaticSource::new(fixtures::instructors(3)));
    let (dispatcher, mut rx) = FetchDispatcher::channel(source.clone());
    let mut app = App::new(base_config()).unwrap();
    app.pump(&dispatcher);
    app.complete(next_outcome(&mut rx).await);

    for _ in 0..10 {
        app.handle_action(Action::MoveDown);
    }
    assert_eq!(app.screen().selected, Some(2));

    let frame = app.screen().grid.frame();
    let fields = app.selected_fields(&frame).unwrap();
    assert_eq!(fields[0], ("ID".to_string(), "3".to_string()));
    assert_eq!(fields[1], ("Name".to_string(), "First3 Last3".to_string()));

    app.handle_action(Action::CyclePageSize);
    assert_eq!(app.screen().selected, None);
}

#[tokio::test]
async fn cycling_a_single_page_size_keeps_selection() {
    let mut config = base_config();
    config.grid.page_sizes = vec![10];
    let source = Arc::new(StaticSource::new(fixtures::instructors(3)));
    let (dispatcher, mut rx) = FetchDispatcher::channel(source.clone());
    let mut app = App::new(config).unwrap();
    app.pump(&dispatcher);
    app.complete(next_outcome(&mut rx).await);

    app.handle_action(Action::MoveDown);
    app.handle_action(Action::CyclePageSize);
    assert_eq!(app.screen().selected, Some(0));
    app.pump(&dispatcher);
    assert_eq!(source.calls().len(), 1);
}

#[tokio::test]
async fn page_sizes_and_view_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    let mut app = App::new(base_config()).unwrap();
    app.handle_action(Action::CyclePageSize);
    app.handle_action(Action::NextView);
    let state = app.persisted();
    assert_eq!(state.active_view, View::Courses);
    assert_eq!(state.page_sizes.get("instructors"), Some(&3));
    persistence::save(&path, &state).unwrap();

    let loaded = persistence::load(&path).unwrap().unwrap();
    let mut restored = App::new(base_config()).unwrap();
    restored.restore(&loaded);
    assert_eq!(restored.active_view, View::Courses);
    assert_eq!(restored.screens[View::Instructors.index()].grid.page_size(), 3);
    assert_eq!(restored.screen().grid.page_size(), 10);
}

#[tokio::test]
async fn disallowed_persisted_page_size_is_ignored() {
    let mut state = App::new(base_config()).unwrap().persisted();
    state.page_sizes.insert("courses".to_string(), 7);
    let mut app = App::new(base_config()).unwrap();
    app.restore(&state);
    assert_eq!(app.screens[View::Courses.index()].grid.page_size(), 10);
}

#[tokio::test]
async fn help_modal_closes_on_next_key() {
    let mut app = App::new(base_config()).unwrap();
    assert!(!app.handle_key(key(KeyCode::Char('?'))));
    assert!(app.modal.is_some());
    assert!(!app.handle_key(key(KeyCode::Char('j'))));
    assert!(app.modal.is_none());
    assert!(app.handle_key(key(KeyCode::Char('q'))));
}

#[tokio::test]
async fn notifications_expire_after_ttl() {
    let mut app = App::new(base_config()).unwrap();
    app.notify(NotificationLevel::Info, "saved");
    let now = Utc::now();
    assert!(app.latest_notification(now).is_some());

    let later = now + ChronoDuration::milliseconds(5_000);
    assert!(app.latest_notification(later).is_none());
    app.on_tick(later);
    assert!(app.notifications.is_empty());
}

// ============================================================================
// THEME
// ============================================================================

#[test]
fn status_colors_follow_retriability() {
    let theme = ConsoleTheme::standard();
    let transient = GridStatus::Errored(GridFailure::Transient {
        message: "timeout".to_string(),
    });
    let rejected = GridStatus::Errored(GridFailure::Rejected {
        status: 401,
        message: "Token expired".to_string(),
    });
    assert_eq!(grid_status_color(&transient, &theme), theme.warning);
    assert_eq!(grid_status_color(&rejected, &theme), theme.error);
    assert_eq!(grid_status_color(&GridStatus::Ready, &theme), theme.success);
    assert_eq!(control_color(false, &theme), theme.text_muted);
}
