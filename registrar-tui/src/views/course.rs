//! Courses screen.

use super::EntityId;
use registrar_grid::{ColumnDescriptor, FilterBinding, GridRow};
use serde::Deserialize;

pub const RESOURCE: &str = "courses";

#[derive(Debug, Clone, Deserialize)]
pub struct Course {
    pub id: EntityId,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl GridRow for Course {
    fn field(&self, key: &str) -> Option<String> {
        match key {
            "id" => Some(self.id.to_string()),
            "name" => self.name.clone(),
            "description" => self.description.clone(),
            _ => None,
        }
    }
}

pub fn columns() -> Vec<ColumnDescriptor<Course>> {
    vec![
        ColumnDescriptor::new("id", "ID"),
        ColumnDescriptor::new("name", "Name").with_filter(FilterBinding::text("filter_name")),
        ColumnDescriptor::new("description", "Description").with_cell(|course: &Course| {
            let text = course.description.clone().unwrap_or_default();
            match text.char_indices().nth(60) {
                Some((cut, _)) => format!("{}…", &text[..cut]),
                None => text,
            }
        }),
    ]
}
