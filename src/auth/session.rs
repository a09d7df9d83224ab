use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;

/// Identity bound to a live session, as handed to task-scoped handlers.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Identity {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Server-side session row. The token is the only thing clients hold;
/// everything else stays in the store.
///
/// Lifetime is fixed at creation (`now + ttl_days`), not sliding: a
/// session is valid for at most the configured window no matter how
/// active the client is.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub token: Uuid,
    pub user_id: i64,
    pub expires_at: OffsetDateTime,
}

impl Session {
    pub async fn start(db: &PgPool, user_id: i64, ttl_days: i64) -> Result<Session, ApiError> {
        let token = Uuid::new_v4();
        let expires_at = OffsetDateTime::now_utc() + Duration::days(ttl_days);
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (token, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING token, user_id, expires_at
            "#,
        )
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(db)
        .await?;
        debug!(user_id, "session started");
        Ok(session)
    }

    /// Look up the identity behind a token. Absent and expired sessions
    /// are both `None`; expired rows are left for `purge_expired`.
    pub async fn resolve(db: &PgPool, token: Uuid) -> Result<Option<Identity>, ApiError> {
        let identity = sqlx::query_as::<_, Identity>(
            r#"
            SELECT u.id, u.name, u.email
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token = $1 AND s.expires_at > now()
            "#,
        )
        .bind(token)
        .fetch_optional(db)
        .await?;
        Ok(identity)
    }

    /// Destroy the session immediately. `resolve` on the same token
    /// returns nothing afterwards.
    pub async fn end(db: &PgPool, token: Uuid) -> Result<(), ApiError> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Startup sweep for rows past their expiry.
    pub async fn purge_expired(db: &PgPool) -> Result<u64, ApiError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= now()")
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }
}
