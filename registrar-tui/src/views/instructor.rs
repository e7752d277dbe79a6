//! Instructors screen.

use super::{full_name, EntityId};
use registrar_grid::{ColumnDescriptor, GridRow};
use serde::Deserialize;

pub const RESOURCE: &str = "api/users/list";
pub const BASE_QUERY: &str = "user_group=instructor";
pub const SEARCH_FIELD: &str = "filter_name";

#[derive(Debug, Clone, Deserialize)]
pub struct Instructor {
    pub id: EntityId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub profile: Option<String>,
}

impl GridRow for Instructor {
    fn field(&self, key: &str) -> Option<String> {
        match key {
            "id" => Some(self.id.to_string()),
            "name" => full_name(&self.first_name, &self.last_name),
            "first_name" => self.first_name.clone(),
            "last_name" => self.last_name.clone(),
            "email" => self.email.clone(),
            "phone" => self.phone.clone(),
            "profile" => self.profile.clone(),
            _ => None,
        }
    }
}

pub fn columns() -> Vec<ColumnDescriptor<Instructor>> {
    vec![
        ColumnDescriptor::new("id", "ID"),
        ColumnDescriptor::new("name", "Name"),
        ColumnDescriptor::new("email", "Email"),
        ColumnDescriptor::new("phone", "Phone"),
    ]
}
