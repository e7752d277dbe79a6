//! Reusable widget components.

pub mod detail;
pub mod filter;
pub mod grid;
pub mod pager;
pub mod status;

pub use detail::DetailPanel;
pub use filter::{FilterBar, FilterEditorPopup};
pub use grid::GridTable;
pub use pager::PagerBar;
pub use status::StatusIndicator;
