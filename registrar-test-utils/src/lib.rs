//! Registrar Test Utilities
//!
//! Shared test infrastructure for the registrar workspace:
//! - Scripted and static data sources
//! - Response payload fixtures for every supported shape
//! - Proptest generators for grid inputs
//! - Assertions over grid status and frames

pub use registrar_grid::{
    BaseQuery, ColumnDescriptor, Commit, FetchDispatcher, FetchError, FetchOutcome, FetchTicket,
    FilterBinding, GridBody, GridCommand, GridController, GridFailure, GridFrame, GridSpec,
    GridStatus, PageParams, QueryKey, RawResponse, RemoteDataSource,
};

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::{oneshot, Notify};
use url::form_urlencoded;

type Reply = Result<RawResponse, FetchError>;

// ============================================================================
// DATA SOURCES
// ============================================================================

#[derive(Default)]
struct Script {
    calls: Vec<QueryKey>,
    pending: Vec<(QueryKey, oneshot::Sender<Reply>)>,
}

/// Data source whose fetches block until the test resolves them.
///
/// Lets a test control the order in which responses arrive, which is what the
/// stale-response scenarios need.
#[derive(Default)]
pub struct ScriptedSource {
    script: Mutex<Script>,
    notify: Notify,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every key fetched so far, in call order.
    pub fn calls(&self) -> Vec<QueryKey> {
        self.lock().calls.clone()
    }

    /// Keys of fetches still waiting for a reply.
    pub fn pending(&self) -> Vec<QueryKey> {
        self.lock()
            .pending
            .iter()
            .filter(|(_, tx)| !tx.is_closed())
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Wait until at least `n` fetches have started. Panics after five seconds.
    pub async fn wait_for_calls(&self, n: usize) {
        loop {
            let notified = self.notify.notified();
            if self.lock().calls.len() >= n {
                return;
            }
            if tokio::time::timeout(Duration::from_secs(5), notified)
                .await
                .is_err()
            {
                panic!(
                    "timed out waiting for {} fetches, saw {}",
                    n,
                    self.lock().calls.len()
                );
            }
        }
    }

    /// Reply to the oldest pending fetch for `query`. Returns false when no
    /// such fetch is waiting or it was already cancelled.
    pub fn resolve(&self, query: &str, reply: Reply) -> bool {
        let sender = {
            let mut script = self.lock();
            let index = script.pending.iter().position(|(key, _)| key.query() == query);
            index.map(|i| script.pending.remove(i).1)
        };
        match sender {
            Some(tx) => tx.send(reply).is_ok(),
            None => false,
        }
    }

    /// Reply to the oldest pending fetch, whatever its key.
    pub fn resolve_next(&self, reply: Reply) -> Option<QueryKey> {
        let (key, tx) = {
            let mut script = self.lock();
            if script.pending.is_empty() {
                return None;
            }
            script.pending.remove(0)
        };
        let _ = tx.send(reply);
        Some(key)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl RemoteDataSource for ScriptedSource {
    async fn fetch(&self, key: &QueryKey) -> Result<RawResponse, FetchError> {
        let rx = {
            let mut script = self.lock();
            let (tx, rx) = oneshot::channel();
            script.calls.push(key.clone());
            script.pending.push((key.clone(), tx));
            rx
        };
        self.notify.notify_waiters();
        rx.await
            .unwrap_or_else(|_| Err(FetchError::Transient("scripted reply dropped".to_string())))
    }
}

/// Data source that pages through a fixed set of rows immediately.
///
/// Understands both `page`/`limit` and `_page`/`_limit`, applies substring
/// filters on any other query parameter that names a row field, and answers
/// in the `{data, pagination}` shape.
pub struct StaticSource {
    rows: Vec<Value>,
    calls: Mutex<Vec<QueryKey>>,
    failure: Mutex<Option<FetchError>>,
}

impl StaticSource {
    pub fn new(rows: Vec<Value>) -> Self {
        Self {
            rows,
            calls: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
        }
    }

    /// Fail every following fetch with `error` until cleared.
    pub fn fail_with(&self, error: Option<FetchError>) {
        *self.failure.lock().unwrap_or_else(|p| p.into_inner()) = error;
    }

    pub fn calls(&self) -> Vec<QueryKey> {
        self.calls.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    fn page(&self, key: &QueryKey) -> Value {
        let params: HashMap<String, String> = form_urlencoded::parse(key.query().as_bytes())
            .into_owned()
            .collect();
        let number = |names: [&str; 2], default: usize| {
            names
                .iter()
                .find_map(|n| params.get(*n).and_then(|v| v.parse::<usize>().ok()))
                .unwrap_or(default)
        };
        let page = number(["page", "_page"], 1).max(1);
        let limit = number(["limit", "_limit"], 10).max(1);

        let matching: Vec<&Value> = self
            .rows
            .iter()
            .filter(|row| {
                params.iter().all(|(field, wanted)| match row.get(field) {
                    Some(Value::String(s)) => s.to_lowercase().contains(&wanted.to_lowercase()),
                    Some(other) => other.to_string() == *wanted,
                    None => true,
                })
            })
            .collect();

        let total_pages = matching.len().div_ceil(limit);
        let data: Vec<Value> = matching
            .into_iter()
            .skip((page - 1) * limit)
            .take(limit)
            .cloned()
            .collect();
        fixtures::paginated(data, total_pages as u32)
    }
}

#[async_trait]
impl RemoteDataSource for StaticSource {
    async fn fetch(&self, key: &QueryKey) -> Result<RawResponse, FetchError> {
        self.calls
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(key.clone());
        if let Some(error) = self.failure.lock().unwrap_or_else(|p| p.into_inner()).clone() {
            return Err(error);
        }
        Ok(RawResponse::new(self.page(key)))
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built payloads and grid specs.

    use super::*;

    /// `{data: [...], pagination: {totalPages}}`
    pub fn paginated(rows: Vec<Value>, total_pages: u32) -> Value {
        json!({ "data": rows, "pagination": { "totalPages": total_pages } })
    }

    /// `{items: [...], totalPages}`
    pub fn items(rows: Vec<Value>, total_pages: u32) -> Value {
        json!({ "items": rows, "totalPages": total_pages })
    }

    /// `{datas: [...], totalCount}`
    pub fn counted(rows: Vec<Value>, total_count: u64) -> Value {
        json!({ "datas": rows, "totalCount": total_count })
    }

    /// Bare top-level array.
    pub fn listing(rows: Vec<Value>) -> Value {
        Value::Array(rows)
    }

    pub fn instructor(id: u64) -> Value {
        json!({
            "id": id,
            "first_name": format!("First{id}"),
            "last_name": format!("Last{id}"),
            "email": format!("instructor{id}@example.com"),
            "phone": format!("555-01{:02}", id % 100),
            "profile": "Teaches things",
        })
    }

    pub fn course(id: u64) -> Value {
        json!({
            "id": id,
            "name": format!("Course {id}"),
            "description": format!("Description of course {id}"),
        })
    }

    pub fn instructors(n: u64) -> Vec<Value> {
        (1..=n).map(instructor).collect()
    }

    pub fn courses(n: u64) -> Vec<Value> {
        (1..=n).map(course).collect()
    }

    /// Course grid over raw JSON rows, filterable by name.
    pub fn course_spec() -> GridSpec<Value> {
        GridSpec::new(
            "courses",
            vec![
                ColumnDescriptor::new("id", "ID"),
                ColumnDescriptor::new("name", "Name").with_filter(FilterBinding::text("name")),
                ColumnDescriptor::new("description", "Description"),
            ],
        )
    }

    /// Instructor grid with the admin base query and a grid-level search box.
    pub fn instructor_spec() -> GridSpec<Value> {
        GridSpec::new(
            "api/users/list",
            vec![
                ColumnDescriptor::new("id", "ID"),
                ColumnDescriptor::new("first_name", "First Name"),
                ColumnDescriptor::new("last_name", "Last Name"),
                ColumnDescriptor::new("email", "Email")
                    .with_filter(FilterBinding::text("email")),
                ColumnDescriptor::new("phone", "Phone"),
            ],
        )
        .with_base_query(BaseQuery::parse("user_group=instructor"))
        .with_search_field("filter_name")
    }

    pub fn ok(ticket: &FetchTicket, body: Value) -> FetchOutcome {
        FetchOutcome {
            ticket: ticket.clone(),
            result: Ok(RawResponse::new(body)),
        }
    }

    pub fn transient(ticket: &FetchTicket) -> FetchOutcome {
        FetchOutcome {
            ticket: ticket.clone(),
            result: Err(FetchError::Transient("connection reset by peer".to_string())),
        }
    }
}

// ============================================================================
// GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for grid inputs.

    use super::*;
    use proptest::prelude::*;

    /// One of the default page sizes.
    pub fn arb_page_size() -> impl Strategy<Value = u32> {
        prop::sample::select(vec![3u32, 5, 10])
    }

    /// Filter values, including empty ones and characters that need escaping.
    pub fn arb_filter_value() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::new()),
            "[a-z]{1,8}",
            "[a-zA-Z0-9 @&=+%]{1,12}",
        ]
    }

    /// A value for every field in `fields`.
    pub fn arb_filter_map(fields: Vec<&'static str>) -> impl Strategy<Value = Vec<(String, String)>> {
        let n = fields.len();
        prop::collection::vec(arb_filter_value(), n).prop_map(move |values| {
            fields
                .iter()
                .map(|f| f.to_string())
                .zip(values)
                .collect()
        })
    }

    pub fn arb_row() -> impl Strategy<Value = Value> {
        (1u64..10_000, "[A-Za-z ]{1,16}").prop_map(|(id, name)| json!({ "id": id, "name": name }))
    }

    pub fn arb_rows(max: usize) -> impl Strategy<Value = Vec<Value>> {
        prop::collection::vec(arb_row(), 0..=max)
    }

    /// A well-formed payload in any supported shape with the row count it
    /// carries and the total pages it reports.
    pub fn arb_payload(page_size: u32) -> impl Strategy<Value = (Value, usize, u32)> {
        let max = page_size as usize;
        (arb_rows(max), 0u32..20, 0u8..4).prop_map(move |(rows, pages, shape)| {
            let n = rows.len();
            match shape {
                0 => (fixtures::paginated(rows, pages), n, pages),
                1 => (fixtures::items(rows, pages), n, pages),
                2 => {
                    let count = u64::from(pages) * u64::from(page_size);
                    (fixtures::counted(rows, count), n, pages)
                }
                _ => (fixtures::listing(rows), n, 1),
            }
        })
    }

    /// Commands that only touch page, page size and the `name` filter.
    pub fn arb_command() -> impl Strategy<Value = GridCommand> {
        prop_oneof![
            (0u32..8).prop_map(GridCommand::SetPage),
            Just(GridCommand::NextPage),
            Just(GridCommand::PrevPage),
            arb_page_size().prop_map(GridCommand::SetPageSize),
            Just(GridCommand::CyclePageSize),
            arb_filter_value().prop_map(|value| GridCommand::SetFilter {
                field: "name".to_string(),
                value,
            }),
            Just(GridCommand::ClearFilters),
        ]
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over grid status and rendered frames.

    use super::*;

    pub fn assert_ready<T>(grid: &GridController<T>) {
        assert_eq!(grid.status(), &GridStatus::Ready, "Expected Ready, got {:?}", grid.status());
    }

    pub fn assert_loading<T>(grid: &GridController<T>) {
        assert!(grid.status().is_loading(), "Expected Loading, got {:?}", grid.status());
    }

    pub fn assert_errored<T>(grid: &GridController<T>) -> GridFailure {
        match grid.status() {
            GridStatus::Errored(failure) => failure.clone(),
            other => panic!("Expected Errored, got {:?}", other),
        }
    }

    pub fn assert_pager_label(frame: &GridFrame, expected: &str) {
        assert_eq!(frame.pager.label(), expected, "Wrong pager label");
    }

    pub fn assert_rows(frame: &GridFrame, expected: usize) {
        match &frame.body {
            GridBody::Rows(rows) => assert_eq!(rows.len(), expected, "Wrong row count"),
            other => panic!("Expected rows, got {:?}", other),
        }
    }

    pub fn assert_empty(frame: &GridFrame) {
        assert!(
            matches!(&frame.body, GridBody::Empty { message } if message == registrar_grid::NO_DATA),
            "Expected empty body, got {:?}",
            frame.body
        );
    }
}
