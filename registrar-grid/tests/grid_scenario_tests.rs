//! End-to-end grid scenarios driven through the fetch dispatcher.
//!
//! Each test mounts a grid over a test data source, pumps requests through a
//! real `FetchDispatcher`, and feeds the outcomes back the way a host loop
//! would.

use registrar_grid::{
    Commit, FetchDispatcher, FetchError, FetchOutcome, GridBody, GridController, GridStatus,
    RawResponse,
};
use registrar_test_utils::assertions::{
    assert_empty, assert_errored, assert_loading, assert_pager_label, assert_ready, assert_rows,
};
use registrar_test_utils::{fixtures, ScriptedSource, StaticSource};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

async fn next_outcome(outcomes: &mut UnboundedReceiver<FetchOutcome>) -> FetchOutcome {
    tokio::time::timeout(Duration::from_secs(5), outcomes.recv())
        .await
        .expect("outcome within five seconds")
        .expect("dispatcher channel open")
}

#[tokio::test]
async fn short_result_renders_single_page() {
    let source = Arc::new(StaticSource::new(fixtures::courses(3)));
    let (dispatcher, mut outcomes) = FetchDispatcher::channel(source.clone());
    let mut grid = GridController::new(fixtures::course_spec()).unwrap();

    let ticket = grid.pump(&dispatcher).expect("mount issues a fetch");
    assert_eq!(ticket.key.query(), "page=1&limit=10");
    assert_loading(&grid);
    assert!(matches!(grid.snapshot().frame().body, GridBody::Skeleton { rows: 6, columns: 3 }));

    assert_eq!(grid.complete(next_outcome(&mut outcomes).await), Commit::Applied);
    assert_ready(&grid);

    let frame = grid.snapshot().frame();
    assert_rows(&frame, 3);
    assert_pager_label(&frame, "Page 1 of 1");
    assert!(!frame.pager.can_prev);
    assert!(!frame.pager.can_next);
    assert_eq!(source.calls().len(), 1);
}

#[tokio::test]
async fn empty_result_shows_no_data() {
    let source = Arc::new(StaticSource::new(Vec::new()));
    let (dispatcher, mut outcomes) = FetchDispatcher::channel(source);
    let mut grid = GridController::new(fixtures::course_spec()).unwrap();

    grid.pump(&dispatcher);
    grid.complete(next_outcome(&mut outcomes).await);

    let frame = grid.snapshot().frame();
    assert_empty(&frame);
    assert_pager_label(&frame, "Page 1 of 1");
}

#[tokio::test]
async fn paging_and_filtering_issue_expected_queries() {
    let source = Arc::new(StaticSource::new(fixtures::courses(25)));
    let (dispatcher, mut outcomes) = FetchDispatcher::channel(source.clone());
    let mut grid = GridController::new(fixtures::course_spec().with_page_size(5)).unwrap();

    grid.pump(&dispatcher);
    grid.complete(next_outcome(&mut outcomes).await);
    assert_pager_label(&grid.snapshot().frame(), "Page 1 of 5");

    assert!(grid.next_page());
    grid.pump(&dispatcher);
    grid.complete(next_outcome(&mut outcomes).await);
    assert_pager_label(&grid.snapshot().frame(), "Page 2 of 5");

    grid.set_filter("name", "Course 2").unwrap();
    assert_eq!(grid.pagination().page(), 1);
    grid.pump(&dispatcher);
    grid.complete(next_outcome(&mut outcomes).await);

    let queries: Vec<String> = source.calls().iter().map(|k| k.query().to_string()).collect();
    assert_eq!(
        queries,
        vec![
            "page=1&limit=5",
            "page=2&limit=5",
            "page=1&limit=5&name=Course+2",
        ]
    );
    // "Course 2" and "Course 20".."Course 25"
    let frame = grid.snapshot().frame();
    assert_rows(&frame, 5);
    assert_pager_label(&frame, "Page 1 of 2");
}

#[tokio::test]
async fn late_response_for_previous_filter_is_discarded() {
    let source = Arc::new(ScriptedSource::new());
    let (dispatcher, mut outcomes) = FetchDispatcher::channel(source.clone());
    let mut grid = GridController::new(fixtures::course_spec()).unwrap();

    grid.pump(&dispatcher);
    source.wait_for_calls(1).await;
    source.resolve(
        "page=1&limit=10",
        Ok(RawResponse::new(fixtures::paginated(fixtures::courses(10), 3))),
    );
    grid.complete(next_outcome(&mut outcomes).await);

    grid.set_page(2);
    grid.pump(&dispatcher);
    source.wait_for_calls(2).await;

    grid.set_filter("name", "x").unwrap();
    let filtered = grid.pump(&dispatcher).unwrap();
    source.wait_for_calls(3).await;
    assert_eq!(filtered.key.query(), "page=1&limit=10&name=x");

    // The page-two reply lands first. Its task may already be aborted; if not,
    // the controller must still refuse it.
    source.resolve(
        "page=2&limit=10",
        Ok(RawResponse::new(fixtures::paginated(fixtures::courses(10), 3))),
    );
    source.resolve(
        "page=1&limit=10&name=x",
        Ok(RawResponse::new(fixtures::paginated(vec![fixtures::course(7)], 1))),
    );

    loop {
        let outcome = next_outcome(&mut outcomes).await;
        let current = outcome.ticket == filtered;
        let commit = grid.complete(outcome);
        if current {
            assert_eq!(commit, Commit::Applied);
            break;
        }
        assert_eq!(commit, Commit::Discarded);
        assert_loading(&grid);
    }

    let frame = grid.snapshot().frame();
    assert_rows(&frame, 1);
    assert_pager_label(&frame, "Page 1 of 1");
}

#[tokio::test]
async fn unrecognized_payload_errors_with_no_data() {
    let source = Arc::new(ScriptedSource::new());
    let (dispatcher, mut outcomes) = FetchDispatcher::channel(source.clone());
    let mut grid = GridController::new(fixtures::course_spec()).unwrap();

    grid.pump(&dispatcher);
    source.wait_for_calls(1).await;
    source.resolve_next(Ok(RawResponse::new(json!({ "status": "ok", "count": 3 }))));
    grid.complete(next_outcome(&mut outcomes).await);

    let failure = assert_errored(&grid);
    assert!(!failure.is_retriable());
    match grid.snapshot().frame().body {
        GridBody::Failed { message, rows, .. } => {
            assert_eq!(message, "No data found");
            assert!(rows.is_empty());
        }
        other => panic!("unexpected body {other:?}"),
    }
}

#[tokio::test]
async fn network_failure_then_retry_recovers() {
    let source = Arc::new(StaticSource::new(fixtures::courses(4)));
    let (dispatcher, mut outcomes) = FetchDispatcher::channel(source.clone());
    let mut grid = GridController::new(fixtures::course_spec().stale_while_error(true)).unwrap();

    grid.pump(&dispatcher);
    grid.complete(next_outcome(&mut outcomes).await);
    assert_ready(&grid);

    source.fail_with(Some(FetchError::Transient("connection refused".to_string())));
    grid.refresh();
    grid.pump(&dispatcher);
    grid.complete(next_outcome(&mut outcomes).await);

    let failure = assert_errored(&grid);
    assert!(failure.is_retriable());
    match grid.snapshot().frame().body {
        GridBody::Failed { message, retriable, rows } => {
            assert_eq!(message, "Network error: connection refused");
            assert!(retriable);
            assert_eq!(rows.len(), 4, "stale rows stay visible");
        }
        other => panic!("unexpected body {other:?}"),
    }

    source.fail_with(None);
    grid.retry();
    let ticket = grid.pump(&dispatcher).expect("retry re-issues");
    assert_eq!(ticket.key.query(), "page=1&limit=10");
    grid.complete(next_outcome(&mut outcomes).await);
    assert_ready(&grid);
    assert_eq!(source.calls().len(), 3);
}

#[tokio::test]
async fn rejected_request_shows_server_message() {
    let source = Arc::new(ScriptedSource::new());
    let (dispatcher, mut outcomes) = FetchDispatcher::channel(source.clone());
    let mut grid = GridController::new(fixtures::instructor_spec()).unwrap();

    let ticket = grid.pump(&dispatcher).unwrap();
    assert_eq!(ticket.key.resource(), "api/users/list");
    assert_eq!(ticket.key.query(), "user_group=instructor&page=1&limit=10");
    source.wait_for_calls(1).await;
    source.resolve_next(Err(FetchError::Rejected {
        status: 401,
        message: "Token expired".to_string(),
    }));
    grid.complete(next_outcome(&mut outcomes).await);

    match grid.status() {
        GridStatus::Errored(failure) => assert_eq!(failure.display_message(), "Token expired"),
        other => panic!("unexpected status {other:?}"),
    }
}

#[tokio::test]
async fn search_field_and_column_filter_combine() {
    let source = Arc::new(ScriptedSource::new());
    let (dispatcher, _outcomes) = FetchDispatcher::channel(source.clone());
    let mut grid = GridController::<Value>::new(fixtures::instructor_spec()).unwrap();

    grid.set_filter("filter_name", "ann").unwrap();
    grid.set_filter("email", "a@b.c").unwrap();
    let ticket = grid.pump(&dispatcher).unwrap();
    assert_eq!(
        ticket.key.query(),
        "user_group=instructor&page=1&limit=10&email=a%40b.c&filter_name=ann"
    );

    assert!(grid.clear_filters());
    let ticket = grid.pump(&dispatcher).unwrap();
    assert_eq!(ticket.key.query(), "user_group=instructor&page=1&limit=10");
    source.wait_for_calls(1).await;
}
