//! Screen navigation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Instructors,
    Courses,
    Batches,
    Students,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::Instructors => "Instructors",
            View::Courses => "Courses",
            View::Batches => "Batches",
            View::Students => "Students",
        }
    }

    /// Stable key used in config tables and persisted state.
    pub fn key(&self) -> &'static str {
        match self {
            View::Instructors => "instructors",
            View::Courses => "courses",
            View::Batches => "batches",
            View::Students => "students",
        }
    }

    pub fn from_key(key: &str) -> Option<View> {
        Self::all().iter().copied().find(|v| v.key() == key)
    }

    pub fn all() -> &'static [View] {
        &[View::Instructors, View::Courses, View::Batches, View::Students]
    }

    pub fn index(&self) -> usize {
        Self::all().iter().position(|v| v == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<View> {
        Self::all().get(index).copied()
    }

    pub fn next(&self) -> View {
        let all = Self::all();
        all[(self.index() + 1) % all.len()]
    }

    pub fn previous(&self) -> View {
        let all = Self::all();
        let idx = self.index();
        let prev = if idx == 0 { all.len() - 1 } else { idx - 1 };
        all[prev]
    }
}
