//! Students screen.

use super::{full_name, EntityId};
use registrar_grid::{ColumnDescriptor, FilterBinding, GridRow};
use serde::Deserialize;

pub const RESOURCE: &str = "students";

#[derive(Debug, Clone, Deserialize)]
pub struct Student {
    pub id: EntityId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub batch_name: Option<String>,
}

impl GridRow for Student {
    fn field(&self, key: &str) -> Option<String> {
        match key {
            "id" => Some(self.id.to_string()),
            "name" => full_name(&self.first_name, &self.last_name),
            "email" => self.email.clone(),
            "phone" => self.phone.clone(),
            "batch_name" => self.batch_name.clone(),
            _ => None,
        }
    }
}

pub fn columns() -> Vec<ColumnDescriptor<Student>> {
    vec![
        ColumnDescriptor::new("id", "ID"),
        ColumnDescriptor::new("name", "Name").with_filter(FilterBinding::text("filter_name")),
        ColumnDescriptor::new("email", "Email").with_filter(FilterBinding::text("email")),
        ColumnDescriptor::new("batch_name", "Batch"),
        ColumnDescriptor::new("phone", "Phone"),
    ]
}
