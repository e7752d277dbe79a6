//! Filter state.

use crate::error::{GridError, GridResult};
use std::collections::BTreeMap;

/// Current filter values keyed by field name.
///
/// The set of fields is fixed at construction. An empty value means the field
/// is unfiltered. This controller never touches pagination; resetting the page
/// when a value changes is the grid controller's job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterController {
    values: BTreeMap<String, String>,
}

impl FilterController {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: fields
                .into_iter()
                .map(|f| (f.into(), String::new()))
                .collect(),
        }
    }

    /// Replace the value of `field`. Returns whether the value changed.
    pub fn set_filter(&mut self, field: &str, value: impl Into<String>) -> GridResult<bool> {
        let slot = self
            .values
            .get_mut(field)
            .ok_or_else(|| GridError::UnknownFilter {
                field: field.to_string(),
            })?;
        let value = value.into();
        if *slot == value {
            return Ok(false);
        }
        *slot = value;
        Ok(true)
    }

    pub fn clear_filter(&mut self, field: &str) -> GridResult<bool> {
        self.set_filter(field, "")
    }

    /// Clear every field. Returns whether anything changed.
    pub fn clear_all(&mut self) -> bool {
        let mut changed = false;
        for value in self.values.values_mut() {
            if !value.is_empty() {
                value.clear();
                changed = true;
            }
        }
        changed
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Fields with a non-empty value.
    pub fn active(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_filtered(&self) -> bool {
        self.active().next().is_some()
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_clear() {
        let mut filters = FilterController::new(["filter_name", "email"]);
        assert!(!filters.is_filtered());

        assert!(filters.set_filter("filter_name", "ann").unwrap());
        assert!(!filters.set_filter("filter_name", "ann").unwrap());
        assert_eq!(filters.get("filter_name"), Some("ann"));
        assert_eq!(filters.active().collect::<Vec<_>>(), vec![("filter_name", "ann")]);

        assert!(filters.clear_filter("filter_name").unwrap());
        assert_eq!(filters.get("filter_name"), Some(""));
        assert!(!filters.is_filtered());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let mut filters = FilterController::new(["filter_name"]);
        let err = filters.set_filter("nope", "x").unwrap_err();
        assert_eq!(err, GridError::UnknownFilter { field: "nope".into() });
        assert!(!filters.contains("nope"));
    }

    #[test]
    fn test_clear_all() {
        let mut filters = FilterController::new(["a", "b"]);
        assert!(!filters.clear_all());
        filters.set_filter("b", "1").unwrap();
        assert!(filters.clear_all());
        assert_eq!(filters.fields().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
