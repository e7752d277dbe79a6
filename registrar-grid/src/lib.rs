//! Registrar grid: a remote-backed, paginated, filterable data grid.
//!
//! A page supplies a [`GridSpec`] (resource, columns, base query) and a
//! [`RemoteDataSource`]. The [`GridController`] owns filter and pagination
//! state, derives the query key, issues fetches through a
//! [`FetchDispatcher`], discards stale responses, and normalizes whatever
//! shape the server returns into a [`Page`]. Hosts draw the resulting
//! [`GridFrame`].

pub mod column;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod pagination;
pub mod query;
pub mod render;
pub mod source;

pub use column::{CellRenderer, ColumnDescriptor, FilterBinding, FilterKind, GridRow};
pub use controller::{
    Commit, GridCommand, GridController, GridHandle, GridSnapshot, GridSpec, GridStatus,
};
pub use dispatch::{FetchDispatcher, FetchOutcome, FetchTicket};
pub use error::{FetchError, GridError, GridFailure, GridResult, MalformedResponse};
pub use filter::FilterController;
pub use normalize::{normalize, pages_for, Page, RawResponse, ResponseShape};
pub use pagination::{PaginationController, DEFAULT_PAGE_SIZES};
pub use query::{BaseQuery, PageParams, QueryBuilder, QueryKey};
pub use render::{FilterCell, GridBody, GridFrame, Pager, NO_DATA, SKELETON_ROWS};
pub use source::{ContextError, HttpDataSource, RemoteDataSource, RequestContext, TOTAL_COUNT_HEADER};
