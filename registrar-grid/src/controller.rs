//! Grid controller: the state machine tying filters, pagination, fetching and
//! normalization together.
//!
//! ```text
//!   ┌─────────┐  complete(current, ok)   ┌───────┐
//!   │ Loading │ ───────────────────────▶ │ Ready │
//!   └─────────┘                          └───────┘
//!     ▲   │      complete(current, err)  ┌─────────┐
//!     │   └────────────────────────────▶ │ Errored │
//!     │                                  └─────────┘
//!     └──── reconcile() after any change to page, page size or filters
//! ```
//!
//! Every issued request carries a generation number. Only an outcome whose
//! generation matches the latest issued one is committed; anything older is
//! discarded no matter when it arrives.

use crate::column::{ColumnDescriptor, FilterBinding, GridRow};
use crate::dispatch::{FetchDispatcher, FetchOutcome, FetchTicket};
use crate::error::{GridError, GridFailure, GridResult};
use crate::filter::FilterController;
use crate::normalize::{normalize, Page};
use crate::pagination::{PaginationController, DEFAULT_PAGE_SIZES};
use crate::query::{BaseQuery, PageParams, QueryBuilder, QueryKey};
use crate::render::GridFrame;
use futures_util::future::AbortHandle;
use serde::de::DeserializeOwned;

/// Everything a page supplies when it mounts a grid.
#[derive(Debug, Clone)]
pub struct GridSpec<T> {
    pub resource: String,
    pub columns: Vec<ColumnDescriptor<T>>,
    pub base_query: BaseQuery,
    pub default_page_size: u32,
    pub page_sizes: Vec<u32>,
    pub page_params: PageParams,
    /// Grid-level search field that is not bound to a column.
    pub search_field: Option<String>,
    /// Initial filter values.
    pub initial_filters: Vec<(String, String)>,
    /// Keep the last rows visible when a fetch fails.
    pub stale_while_error: bool,
}

impl<T> GridSpec<T> {
    pub fn new(resource: impl Into<String>, columns: Vec<ColumnDescriptor<T>>) -> Self {
        Self {
            resource: resource.into(),
            columns,
            base_query: BaseQuery::default(),
            default_page_size: 10,
            page_sizes: DEFAULT_PAGE_SIZES.to_vec(),
            page_params: PageParams::default(),
            search_field: None,
            initial_filters: Vec::new(),
            stale_while_error: false,
        }
    }

    pub fn with_base_query(mut self, base_query: BaseQuery) -> Self {
        self.base_query = base_query;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.default_page_size = page_size;
        self
    }

    pub fn with_page_sizes(mut self, sizes: impl IntoIterator<Item = u32>) -> Self {
        self.page_sizes = sizes.into_iter().collect();
        self
    }

    pub fn with_page_params(mut self, params: PageParams) -> Self {
        self.page_params = params;
        self
    }

    pub fn with_search_field(mut self, field: impl Into<String>) -> Self {
        self.search_field = Some(field.into());
        self
    }

    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.initial_filters.push((field.into(), value.into()));
        self
    }

    pub fn stale_while_error(mut self, enabled: bool) -> Self {
        self.stale_while_error = enabled;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridStatus {
    Loading,
    Ready,
    Errored(GridFailure),
}

impl GridStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, GridStatus::Loading)
    }

    pub fn failure(&self) -> Option<&GridFailure> {
        match self {
            GridStatus::Errored(failure) => Some(failure),
            _ => None,
        }
    }
}

/// User intents the renderer hands back to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridCommand {
    SetPage(u32),
    NextPage,
    PrevPage,
    SetPageSize(u32),
    CyclePageSize,
    SetFilter { field: String, value: String },
    ClearFilter(String),
    ClearFilters,
    /// Re-issue the current query, e.g. after a network error.
    Retry,
    /// Re-issue the current query after the underlying data changed.
    Refresh,
}

/// What happened to a fetch outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    Applied,
    Discarded,
}

#[derive(Debug)]
struct InFlight {
    generation: u64,
    abort: Option<AbortHandle>,
}

/// Render-ready view of a grid.
#[derive(Debug)]
pub struct GridSnapshot<'a, T> {
    pub resource: &'a str,
    pub columns: &'a [ColumnDescriptor<T>],
    pub rows: &'a [T],
    pub page: u32,
    pub page_size: u32,
    pub page_sizes: &'a [u32],
    pub total_pages: Option<u32>,
    pub total_count: Option<u64>,
    pub is_loading: bool,
    pub can_prev: bool,
    pub can_next: bool,
    pub status: &'a GridStatus,
    pub filters: &'a FilterController,
    pub search_field: Option<&'a str>,
}

pub struct GridController<T> {
    resource: String,
    columns: Vec<ColumnDescriptor<T>>,
    search_field: Option<String>,
    query: QueryBuilder,
    filters: FilterController,
    pagination: PaginationController,
    status: GridStatus,
    page: Option<Page<T>>,
    generation: u64,
    active_key: Option<QueryKey>,
    in_flight: Option<InFlight>,
    force_reissue: bool,
    stale_while_error: bool,
}

impl<T> GridController<T> {
    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn status(&self) -> &GridStatus {
        &self.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn filters(&self) -> &FilterController {
        &self.filters
    }

    pub fn pagination(&self) -> &PaginationController {
        &self.pagination
    }

    pub fn columns(&self) -> &[ColumnDescriptor<T>] {
        &self.columns
    }

    /// Key of the most recently issued request.
    pub fn active_key(&self) -> Option<&QueryKey> {
        self.active_key.as_ref()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }
}

impl<T: GridRow + DeserializeOwned> GridController<T> {
    pub fn new(spec: GridSpec<T>) -> GridResult<Self> {
        if spec.resource.trim().is_empty() {
            return Err(GridError::InvalidSpec {
                reason: "resource must not be empty".to_string(),
            });
        }
        if spec.columns.is_empty() {
            return Err(GridError::InvalidSpec {
                reason: "at least one column is required".to_string(),
            });
        }

        let pagination =
            PaginationController::with_allowed(spec.default_page_size, spec.page_sizes)?;

        let fields = spec
            .columns
            .iter()
            .filter_map(|c| c.filter().map(|b| b.field_name.clone()))
            .chain(spec.search_field.clone());
        let filters = FilterController::new(fields);

        let mut grid = Self {
            resource: spec.resource,
            columns: spec.columns,
            search_field: spec.search_field,
            query: QueryBuilder::new(spec.base_query, spec.page_params),
            filters,
            pagination,
            status: GridStatus::Loading,
            page: None,
            generation: 0,
            active_key: None,
            in_flight: None,
            force_reissue: false,
            stale_while_error: spec.stale_while_error,
        };
        for (field, value) in spec.initial_filters {
            grid.set_filter(&field, value)?;
        }
        Ok(grid)
    }

    /// Key for the current page, page size and filters.
    pub fn current_key(&self) -> QueryKey {
        self.query.key(
            &self.resource,
            self.pagination.page(),
            self.pagination.page_size(),
            self.filters.values(),
        )
    }

    /// Bindings for every filter field, column filters first.
    pub fn filter_bindings(&self) -> Vec<FilterBinding> {
        self.columns
            .iter()
            .filter_map(|c| c.filter().cloned())
            .chain(self.search_field.iter().map(FilterBinding::text))
            .collect()
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Apply a command. Returns whether grid state changed.
    pub fn apply(&mut self, command: GridCommand) -> GridResult<bool> {
        match command {
            GridCommand::SetPage(n) => Ok(self.set_page(n)),
            GridCommand::NextPage => Ok(self.next_page()),
            GridCommand::PrevPage => Ok(self.prev_page()),
            GridCommand::SetPageSize(n) => self.set_page_size(n),
            GridCommand::CyclePageSize => Ok(self.pagination.cycle_page_size()),
            GridCommand::SetFilter { field, value } => self.set_filter(&field, value),
            GridCommand::ClearFilter(field) => self.clear_filter(&field),
            GridCommand::ClearFilters => Ok(self.clear_filters()),
            GridCommand::Retry => {
                self.retry();
                Ok(true)
            }
            GridCommand::Refresh => {
                self.refresh();
                Ok(true)
            }
        }
    }

    pub fn set_page(&mut self, n: u32) -> bool {
        self.pagination.set_page(n)
    }

    pub fn next_page(&mut self) -> bool {
        self.pagination.next_page()
    }

    pub fn prev_page(&mut self) -> bool {
        self.pagination.prev_page()
    }

    pub fn set_page_size(&mut self, n: u32) -> GridResult<bool> {
        self.pagination.set_page_size(n)
    }

    /// Set a filter value. A changed value moves the grid back to page 1.
    pub fn set_filter(&mut self, field: &str, value: impl Into<String>) -> GridResult<bool> {
        let value = value.into();
        if let Some(binding) = self
            .columns
            .iter()
            .filter_map(|c| c.filter())
            .find(|b| b.field_name == field)
        {
            if !binding.accepts(&value) {
                return Err(GridError::InvalidOption {
                    field: field.to_string(),
                    value,
                });
            }
        }

        let changed = self.filters.set_filter(field, value)?;
        if changed {
            self.pagination.restart();
        }
        Ok(changed)
    }

    pub fn clear_filter(&mut self, field: &str) -> GridResult<bool> {
        self.set_filter(field, "")
    }

    pub fn clear_filters(&mut self) -> bool {
        let changed = self.filters.clear_all();
        if changed {
            self.pagination.restart();
        }
        changed
    }

    /// Re-issue the current query on the next reconcile.
    pub fn retry(&mut self) {
        self.force_reissue = true;
    }

    pub fn refresh(&mut self) {
        self.force_reissue = true;
    }

    // ------------------------------------------------------------------------
    // Request lifecycle
    // ------------------------------------------------------------------------

    /// Decide whether a new request is needed.
    ///
    /// When the derived key differs from the last issued one (or a retry was
    /// requested), the in-flight request is cancelled, the generation bumps,
    /// the grid enters `Loading`, and a ticket for the new request is returned.
    pub fn reconcile(&mut self) -> Option<FetchTicket> {
        let key = self.current_key();
        if self.active_key.as_ref() == Some(&key) && !self.force_reissue {
            return None;
        }
        self.force_reissue = false;
        self.cancel_in_flight();

        self.generation += 1;
        self.status = GridStatus::Loading;
        self.active_key = Some(key.clone());
        self.in_flight = Some(InFlight {
            generation: self.generation,
            abort: None,
        });

        tracing::debug!(key = %key, generation = self.generation, "fetch issued");
        Some(FetchTicket {
            generation: self.generation,
            key,
        })
    }

    /// Associate a transport-level abort handle with an issued ticket.
    pub fn track(&mut self, generation: u64, abort: AbortHandle) {
        match self.in_flight.as_mut() {
            Some(in_flight) if in_flight.generation == generation => {
                in_flight.abort = Some(abort);
            }
            _ => abort.abort(),
        }
    }

    /// Reconcile and, if a request is needed, spawn it on `dispatcher`.
    pub fn pump(&mut self, dispatcher: &FetchDispatcher) -> Option<FetchTicket> {
        let ticket = self.reconcile()?;
        let abort = dispatcher.dispatch(ticket.clone());
        self.track(ticket.generation, abort);
        Some(ticket)
    }

    /// Commit a fetch outcome if it belongs to the current generation.
    pub fn complete(&mut self, outcome: FetchOutcome) -> Commit {
        let current = matches!(
            &self.in_flight,
            Some(in_flight) if in_flight.generation == outcome.ticket.generation
        );
        if !current {
            tracing::debug!(
                key = %outcome.ticket.key,
                generation = outcome.ticket.generation,
                current = self.generation,
                "stale response discarded"
            );
            return Commit::Discarded;
        }
        self.in_flight = None;

        let page_size = self.pagination.page_size();
        let result = outcome
            .result
            .map_err(GridFailure::from)
            .and_then(|raw| normalize::<T>(&raw, page_size).map_err(GridFailure::from));

        match result {
            Ok(page) => {
                tracing::debug!(
                    key = %outcome.ticket.key,
                    rows = page.len(),
                    total_pages = page.total_pages,
                    "page committed"
                );
                if self.pagination.set_total_pages(page.total_pages) {
                    tracing::debug!(
                        key = %outcome.ticket.key,
                        page = self.pagination.page(),
                        "page past reported total, moved to last page"
                    );
                }
                self.page = Some(page);
                self.status = GridStatus::Ready;
            }
            Err(failure) => {
                tracing::warn!(key = %outcome.ticket.key, error = %failure, "grid fetch failed");
                let keep_rows =
                    self.stale_while_error && !matches!(failure, GridFailure::Malformed(_));
                if !keep_rows {
                    self.page = None;
                }
                self.status = GridStatus::Errored(failure);
            }
        }
        Commit::Applied
    }

    fn cancel_in_flight(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            if let Some(abort) = in_flight.abort {
                abort.abort();
            }
            tracing::debug!(generation = in_flight.generation, "in-flight request superseded");
        }
    }

    // ------------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------------

    /// Rows to display: none while loading, stale rows on error only when
    /// enabled.
    pub fn rows(&self) -> &[T] {
        match (&self.status, &self.page) {
            (GridStatus::Loading, _) | (_, None) => &[],
            (_, Some(page)) => page.rows.as_slice(),
        }
    }

    pub fn snapshot(&self) -> GridSnapshot<'_, T> {
        GridSnapshot {
            resource: &self.resource,
            columns: &self.columns,
            rows: self.rows(),
            page: self.pagination.page(),
            page_size: self.pagination.page_size(),
            page_sizes: self.pagination.allowed_sizes(),
            total_pages: self.pagination.total_pages(),
            total_count: self.page.as_ref().and_then(|p| p.total_count),
            is_loading: self.status.is_loading(),
            can_prev: self.pagination.can_prev(),
            can_next: self.pagination.can_next(),
            status: &self.status,
            filters: &self.filters,
            search_field: self.search_field.as_deref(),
        }
    }
}

impl<T> Drop for GridController<T> {
    fn drop(&mut self) {
        if let Some(abort) = self.in_flight.take().and_then(|f| f.abort) {
            abort.abort();
        }
    }
}

impl<T> std::fmt::Debug for GridController<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridController")
            .field("resource", &self.resource)
            .field("status", &self.status)
            .field("generation", &self.generation)
            .field("active_key", &self.active_key)
            .field("pagination", &self.pagination)
            .field("filters", &self.filters)
            .finish_non_exhaustive()
    }
}

/// Object-safe handle so a host can keep grids over different row types
/// side by side.
pub trait GridHandle {
    fn resource(&self) -> &str;
    fn status(&self) -> &GridStatus;
    fn filters(&self) -> &FilterController;
    fn filter_bindings(&self) -> Vec<FilterBinding>;
    fn page_size(&self) -> u32;
    fn apply(&mut self, command: GridCommand) -> GridResult<bool>;
    fn pump(&mut self, dispatcher: &FetchDispatcher) -> Option<FetchTicket>;
    fn complete(&mut self, outcome: FetchOutcome) -> Commit;
    fn frame(&self) -> GridFrame;
}

impl<T: GridRow + DeserializeOwned> GridHandle for GridController<T> {
    fn resource(&self) -> &str {
        GridController::resource(self)
    }

    fn status(&self) -> &GridStatus {
        GridController::status(self)
    }

    fn filters(&self) -> &FilterController {
        GridController::filters(self)
    }

    fn filter_bindings(&self) -> Vec<FilterBinding> {
        GridController::filter_bindings(self)
    }

    fn page_size(&self) -> u32 {
        self.pagination.page_size()
    }

    fn apply(&mut self, command: GridCommand) -> GridResult<bool> {
        GridController::apply(self, command)
    }

    fn pump(&mut self, dispatcher: &FetchDispatcher) -> Option<FetchTicket> {
        GridController::pump(self, dispatcher)
    }

    fn complete(&mut self, outcome: FetchOutcome) -> Commit {
        GridController::complete(self, outcome)
    }

    fn frame(&self) -> GridFrame {
        self.snapshot().frame()
    }
}
