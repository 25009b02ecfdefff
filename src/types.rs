//! Core types for the to-do server.

use serde::{Deserialize, Serialize};

/// Task identifier, assigned by the store on creation.
pub type TaskId = i64;

/// A to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub completed: bool,
}

/// Body of `POST /api/tasks`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTask {
    #[serde(default)]
    pub title: Option<String>,
}

/// Partial update applied by `PUT /api/tasks/{id}`.
///
/// Fields left as `None` keep their stored value. A title that is empty after
/// trimming is treated the same as an absent one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// The trimmed replacement title, if one was supplied and is non-empty.
    pub fn effective_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Apply this patch to a task in place.
    pub fn apply(&self, task: &mut Task) {
        if let Some(title) = self.effective_title() {
            task.title = title.to_string();
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}
