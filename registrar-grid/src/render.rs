//! Render model.
//!
//! Turns a [`GridSnapshot`] into plain strings and flags. No terminal or
//! widget types appear here; hosts draw a [`GridFrame`] however they like.

use crate::column::{FilterKind, GridRow};
use crate::controller::{GridSnapshot, GridStatus};

pub const NO_DATA: &str = "No data found";

/// Upper bound on placeholder rows shown while loading.
pub const SKELETON_ROWS: u32 = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCell {
    pub field: String,
    pub kind: FilterKind,
    pub value: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridBody {
    /// Placeholder grid while a page is loading.
    Skeleton { rows: usize, columns: usize },
    Rows(Vec<Vec<String>>),
    Empty { message: String },
    /// Inline error. `rows` holds stale rows when the grid keeps them on error.
    Failed {
        message: String,
        retriable: bool,
        rows: Vec<Vec<String>>,
    },
}

impl GridBody {
    pub fn row_count(&self) -> usize {
        match self {
            GridBody::Rows(rows) | GridBody::Failed { rows, .. } => rows.len(),
            GridBody::Skeleton { .. } | GridBody::Empty { .. } => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    pub page: u32,
    pub total_pages: Option<u32>,
    pub total_count: Option<u64>,
    pub page_size: u32,
    pub page_sizes: Vec<u32>,
    pub can_prev: bool,
    pub can_next: bool,
}

impl Pager {
    pub fn label(&self) -> String {
        match self.total_pages {
            Some(total) => format!("Page {} of {}", self.page, total.max(1)),
            None => format!("Page {}", self.page),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridFrame {
    pub headers: Vec<String>,
    /// One slot per column; `None` for columns without a filter binding.
    pub column_filters: Vec<Option<FilterCell>>,
    /// Grid-level search field not bound to a column.
    pub search: Option<FilterCell>,
    pub body: GridBody,
    pub pager: Pager,
    pub is_loading: bool,
}

impl GridFrame {
    /// Every filter cell, column filters first, then the search field.
    pub fn filter_cells(&self) -> impl Iterator<Item = &FilterCell> {
        self.column_filters.iter().flatten().chain(self.search.iter())
    }
}

impl<'a, T: GridRow> GridSnapshot<'a, T> {
    pub fn frame(&self) -> GridFrame {
        let headers: Vec<String> = self.columns.iter().map(|c| c.header().to_string()).collect();

        let column_filters = self
            .columns
            .iter()
            .map(|column| {
                column.filter().map(|binding| FilterCell {
                    field: binding.field_name.clone(),
                    kind: binding.kind,
                    value: self.filters.get(&binding.field_name).unwrap_or_default().to_string(),
                    options: binding.options.clone(),
                })
            })
            .collect();

        let search = self.search_field.map(|field| FilterCell {
            field: field.to_string(),
            kind: FilterKind::Text,
            value: self.filters.get(field).unwrap_or_default().to_string(),
            options: Vec::new(),
        });

        let rows = || -> Vec<Vec<String>> {
            self.rows
                .iter()
                .map(|row| self.columns.iter().map(|c| c.render_cell(row)).collect())
                .collect()
        };

        let body = match self.status {
            GridStatus::Loading => GridBody::Skeleton {
                rows: self.page_size.min(SKELETON_ROWS) as usize,
                columns: headers.len(),
            },
            GridStatus::Ready if self.rows.is_empty() => GridBody::Empty {
                message: NO_DATA.to_string(),
            },
            GridStatus::Ready => GridBody::Rows(rows()),
            GridStatus::Errored(failure) => GridBody::Failed {
                message: failure.display_message(),
                retriable: failure.is_retriable(),
                rows: rows(),
            },
        };

        GridFrame {
            headers,
            column_filters,
            search,
            body,
            pager: Pager {
                page: self.page,
                total_pages: self.total_pages,
                total_count: self.total_count,
                page_size: self.page_size,
                page_sizes: self.page_sizes.to_vec(),
                can_prev: self.can_prev,
                can_next: self.can_next,
            },
            is_loading: self.is_loading,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pager_label() {
        let mut pager = Pager {
            page: 1,
            total_pages: Some(1),
            total_count: Some(3),
            page_size: 10,
            page_sizes: vec![3, 5, 10],
            can_prev: false,
            can_next: false,
        };
        assert_eq!(pager.label(), "Page 1 of 1");
        pager.total_pages = Some(0);
        assert_eq!(pager.label(), "Page 1 of 1");
        pager.total_pages = None;
        assert_eq!(pager.label(), "Page 1");
    }

    #[test]
    fn test_body_row_count() {
        assert_eq!(GridBody::Skeleton { rows: 6, columns: 4 }.row_count(), 0);
        assert_eq!(
            GridBody::Rows(vec![vec!["1".into()], vec!["2".into()]]).row_count(),
            2
        );
    }
}
