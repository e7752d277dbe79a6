//! Batches screen.

use super::EntityId;
use registrar_grid::{ColumnDescriptor, FilterBinding, GridRow};
use serde::Deserialize;

pub const RESOURCE: &str = "batches";
pub const STATUS_OPTIONS: [&str; 2] = ["active", "inactive"];

#[derive(Debug, Clone, Deserialize)]
pub struct Batch {
    pub id: EntityId,
    pub name: Option<String>,
    pub course_name: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub start_time: Option<String>,
    pub location: Option<String>,
    pub instructor_first_name: Option<String>,
}

impl GridRow for Batch {
    fn field(&self, key: &str) -> Option<String> {
        match key {
            "id" => Some(self.id.to_string()),
            "name" => self.name.clone(),
            "course_name" => self.course_name.clone(),
            "status" => self.status.clone(),
            "start_date" => self.start_date.clone(),
            "start_time" => self.start_time.clone(),
            "location" => self.location.clone(),
            "instructor" => self.instructor_first_name.clone(),
            _ => None,
        }
    }
}

pub fn columns() -> Vec<ColumnDescriptor<Batch>> {
    vec![
        ColumnDescriptor::new("id", "ID"),
        ColumnDescriptor::new("name", "Name").with_filter(FilterBinding::text("filter_name")),
        ColumnDescriptor::new("course_name", "Course")
            .with_filter(FilterBinding::text("course_name")),
        ColumnDescriptor::new("status", "Status")
            .with_filter(FilterBinding::select("status", STATUS_OPTIONS)),
        ColumnDescriptor::new("start_date", "Start date").with_cell(|batch: &Batch| {
            // Dates arrive as ISO timestamps; the day is enough here.
            let date = batch.start_date.clone().unwrap_or_default();
            let day = date.split('T').next().unwrap_or_default().to_string();
            match &batch.start_time {
                Some(time) if !time.is_empty() => format!("{} {}", day, time),
                _ => day,
            }
        }),
    ]
}
