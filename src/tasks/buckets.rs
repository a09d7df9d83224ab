use sqlx::PgPool;

use crate::error::ApiError;

/// Baseline buckets offered to every user, tasks or not.
pub const DEFAULT_BUCKETS: [&str; 3] = ["Life", "Work", "Daily"];

/// Bucket chosen for a new task, by explicit precedence: a non-blank
/// custom value wins over the selected one, which wins over the first
/// default. Whitespace-only custom values count as absent.
pub fn resolve_bucket(custom: Option<&str>, selected: Option<&str>) -> String {
    if let Some(custom) = custom {
        let custom = custom.trim();
        if !custom.is_empty() {
            return custom.to_string();
        }
    }
    if let Some(selected) = selected {
        let selected = selected.trim();
        if !selected.is_empty() {
            return selected.to_string();
        }
    }
    DEFAULT_BUCKETS[0].to_string()
}

/// Baseline buckets followed by the owner's own labels, deduplicated.
pub fn merge_buckets(dynamic: &[String]) -> Vec<String> {
    let mut buckets: Vec<String> = DEFAULT_BUCKETS.iter().map(|b| b.to_string()).collect();
    for bucket in dynamic {
        if !buckets.iter().any(|b| b == bucket) {
            buckets.push(bucket.clone());
        }
    }
    buckets
}

/// Bucket set for the owner: defaults unioned with the distinct labels
/// among their tasks.
pub async fn buckets_for(db: &PgPool, owner: i64) -> Result<Vec<String>, ApiError> {
    let dynamic: Vec<String> =
        sqlx::query_scalar("SELECT DISTINCT bucket FROM tasks WHERE user_id = $1 ORDER BY bucket")
            .bind(owner)
            .fetch_all(db)
            .await?;
    Ok(merge_buckets(&dynamic))
}
