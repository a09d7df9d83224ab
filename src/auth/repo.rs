use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl User {
    /// Find a user by normalized (lowercase) email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Insert a new user. Email uniqueness is arbitrated by the unique
    /// index, not a pre-check, so two concurrent registrations for the
    /// same address cannot both succeed.
    pub async fn create(
        db: &PgPool,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, ApiError> {
        let inserted = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash, created_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await;

        match inserted {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(ApiError::EmailTaken),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test]
    async fn second_registration_with_same_email_conflicts(db: PgPool) {
        User::create(&db, "Ada", "ada@example.com", "hash-a")
            .await
            .expect("first registration");
        let err = User::create(&db, "Imposter", "ada@example.com", "hash-b")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::EmailTaken));
    }

    #[sqlx::test]
    async fn concurrent_registrations_have_one_winner(db: PgPool) {
        let (a, b) = tokio::join!(
            User::create(&db, "Ada", "race@example.com", "hash-a"),
            User::create(&db, "Bob", "race@example.com", "hash-b"),
        );
        assert_eq!(
            [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(),
            1,
            "exactly one registration wins"
        );
        let loser = if a.is_err() { a } else { b };
        assert!(matches!(loser.unwrap_err(), ApiError::EmailTaken));
    }
}
