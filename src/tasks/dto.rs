use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::tasks::query::SortKey;
use crate::tasks::repo::Task;

/// Body for task creation. `bucket_custom` beats `bucket` when present
/// and non-blank; everything optional defaults per the data model.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub bucket: Option<String>,
    pub bucket_custom: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_at: Option<OffsetDateTime>,
    pub priority: Option<String>,
    pub tag: Option<String>,
    #[serde(default)]
    pub reminder_enabled: bool,
}

/// Body for full-field update.
#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub bucket: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_at: Option<OffsetDateTime>,
    pub priority: Option<String>,
    pub tag: Option<String>,
    #[serde(default)]
    pub reminder_enabled: bool,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub done: bool,
}

/// Structured ack for the toggle action, meant for incremental UI
/// updates rather than a page reload.
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub ok: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub bucket: Option<String>,
    pub sort: Option<String>,
}

/// Everything the view needs to render the main listing.
#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
    pub buckets: Vec<String>,
    pub active_bucket: String,
    pub active_sort: SortKey,
}

/// Trim free-text input; blank becomes absent.
pub fn normalize_text(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let v = v.trim().to_string();
        if v.is_empty() {
            None
        } else {
            Some(v)
        }
    })
}
