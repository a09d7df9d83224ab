use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::extractor::CurrentUser,
    error::ApiError,
    state::AppState,
    tasks::{
        buckets::{buckets_for, resolve_bucket},
        dto::{
            normalize_text, CreateTaskRequest, ListQuery, TaskListResponse, ToggleRequest,
            ToggleResponse, UpdateTaskRequest,
        },
        query::{order, SortKey},
        repo::{Priority, Task, TaskFields},
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/:id", put(update_task).delete(delete_task))
        .route("/tasks/:id/toggle", post(toggle_task))
}

/// "All" (or blank) means no bucket restriction.
fn bucket_filter(param: Option<&str>) -> Option<String> {
    match param.map(str::trim) {
        None | Some("") | Some("All") => None,
        Some(bucket) => Some(bucket.to_string()),
    }
}

#[instrument(skip(state, auth))]
async fn list_tasks(
    State(state): State<AppState>,
    auth: CurrentUser,
    Query(params): Query<ListQuery>,
) -> Result<Json<TaskListResponse>, ApiError> {
    let owner = auth.user.id;
    let filter = bucket_filter(params.bucket.as_deref());
    let sort = SortKey::from_param(params.sort.as_deref());

    let mut tasks = Task::list_by_owner(&state.db, owner, filter.as_deref()).await?;
    order(&mut tasks, sort);
    let buckets = buckets_for(&state.db, owner).await?;

    Ok(Json(TaskListResponse {
        tasks,
        buckets,
        active_bucket: filter.unwrap_or_else(|| "All".to_string()),
        active_sort: sort,
    }))
}

#[instrument(skip(state, auth, payload))]
async fn create_task(
    State(state): State<AppState>,
    auth: CurrentUser,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let title = payload.title.trim().to_string();
    if title.is_empty() {
        warn!("task creation without a title");
        return Err(ApiError::Validation("Title is required.".into()));
    }

    let fields = TaskFields {
        title,
        description: normalize_text(payload.description),
        bucket: resolve_bucket(
            payload.bucket_custom.as_deref(),
            payload.bucket.as_deref(),
        ),
        due_at: payload.due_at,
        priority: Priority::from_param(payload.priority.as_deref().unwrap_or("")),
        tag: normalize_text(payload.tag),
        reminder_enabled: payload.reminder_enabled,
        done: false,
    };

    let task = Task::create(&state.db, auth.user.id, &fields).await?;
    info!(task_id = task.id, bucket = %task.bucket, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

#[instrument(skip(state, auth, payload))]
async fn update_task(
    State(state): State<AppState>,
    auth: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTaskRequest>,
) -> Result<Json<Task>, ApiError> {
    let title = payload.title.trim().to_string();
    if title.is_empty() {
        return Err(ApiError::Validation("Title is required.".into()));
    }

    let fields = TaskFields {
        title,
        description: normalize_text(payload.description),
        bucket: resolve_bucket(None, payload.bucket.as_deref()),
        due_at: payload.due_at,
        priority: Priority::from_param(payload.priority.as_deref().unwrap_or("")),
        tag: normalize_text(payload.tag),
        reminder_enabled: payload.reminder_enabled,
        done: payload.done,
    };

    let task = Task::update(&state.db, auth.user.id, id, &fields).await?;
    info!(task_id = task.id, "task updated");
    Ok(Json(task))
}

/// Returns `{"ok": true}` / `{"ok": false}` rather than the usual error
/// body; the client patches the row in place and retries freely since
/// the operation is idempotent for a given desired state.
#[instrument(skip(state, auth, payload))]
async fn toggle_task(
    State(state): State<AppState>,
    auth: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>, (StatusCode, Json<ToggleResponse>)> {
    match Task::toggle_done(&state.db, auth.user.id, id, payload.done).await {
        Ok(()) => Ok(Json(ToggleResponse { ok: true })),
        Err(e) => {
            warn!(task_id = id, error = %e, "toggle failed");
            Err((e.status(), Json(ToggleResponse { ok: false })))
        }
    }
}

#[instrument(skip(state, auth))]
async fn delete_task(
    State(state): State<AppState>,
    auth: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    Task::delete(&state.db, auth.user.id, id).await?;
    info!(task_id = id, "task deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_and_blank_mean_no_filter() {
        assert_eq!(bucket_filter(None), None);
        assert_eq!(bucket_filter(Some("")), None);
        assert_eq!(bucket_filter(Some("   ")), None);
        assert_eq!(bucket_filter(Some("All")), None);
    }

    #[test]
    fn named_bucket_filters() {
        assert_eq!(bucket_filter(Some("Work")), Some("Work".to_string()));
        assert_eq!(bucket_filter(Some("  Travel ")), Some("Travel".to_string()));
    }
}
