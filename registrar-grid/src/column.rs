//! Column descriptors and row access.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Read access to a row's fields by column key.
pub trait GridRow {
    /// Text for the column `key`, or `None` when the row has no such field.
    fn field(&self, key: &str) -> Option<String>;
}

impl GridRow for Value {
    fn field(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Text,
    Select,
}

/// Association between a column and a filter field sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterBinding {
    pub field_name: String,
    pub kind: FilterKind,
    /// Allowed values for `Select` filters. The empty string always means "all".
    pub options: Vec<String>,
}

impl FilterBinding {
    pub fn text(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            kind: FilterKind::Text,
            options: Vec::new(),
        }
    }

    pub fn select<I, S>(field_name: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            field_name: field_name.into(),
            kind: FilterKind::Select,
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `value` may be assigned to this filter.
    pub fn accepts(&self, value: &str) -> bool {
        match self.kind {
            FilterKind::Text => true,
            FilterKind::Select => value.is_empty() || self.options.iter().any(|o| o == value),
        }
    }
}

pub type CellRenderer<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// One grid column. Immutable once the grid is built.
pub struct ColumnDescriptor<T> {
    key: String,
    header: String,
    cell: Option<CellRenderer<T>>,
    filter: Option<FilterBinding>,
}

impl<T> ColumnDescriptor<T> {
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            cell: None,
            filter: None,
        }
    }

    pub fn with_cell<F>(mut self, render: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.cell = Some(Arc::new(render));
        self
    }

    pub fn with_filter(mut self, binding: FilterBinding) -> Self {
        self.filter = Some(binding);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn filter(&self) -> Option<&FilterBinding> {
        self.filter.as_ref()
    }
}

impl<T: GridRow> ColumnDescriptor<T> {
    pub fn render_cell(&self, row: &T) -> String {
        match &self.cell {
            Some(render) => render(row),
            None => row.field(&self.key).unwrap_or_default(),
        }
    }
}

impl<T> Clone for ColumnDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            header: self.header.clone(),
            cell: self.cell.clone(),
            filter: self.filter.clone(),
        }
    }
}

impl<T> fmt::Debug for ColumnDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("custom_cell", &self.cell.is_some())
            .field("filter", &self.filter)
            .finish()
    }
}
