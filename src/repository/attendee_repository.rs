use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::Attendee,
    error::{AppError, Result},
    repository::{AttendeeRepository, Upserted},
};

#[derive(FromRow)]
struct AttendeeRow {
    id: String,
    event_id: String,
    user_id: String,
    name: String,
    email: String,
    barangay: String,
    checked_in_at: NaiveDateTime,
}

pub struct SqliteAttendeeRepository {
    pool: SqlitePool,
}

impl SqliteAttendeeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_attendee(row: AttendeeRow) -> Result<Attendee> {
        Ok(Attendee {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            event_id: Uuid::parse_str(&row.event_id).map_err(|e| AppError::Database(e.to_string()))?,
            user_id: row.user_id,
            name: row.name,
            email: row.email,
            barangay: row.barangay,
            checked_in_at: DateTime::from_naive_utc_and_offset(row.checked_in_at, Utc),
        })
    }
}

/// SQLite names the violated columns in the message, e.g.
/// `UNIQUE constraint failed: event_attendees.event_id, event_attendees.user_id`.
fn is_attendee_key_violation(message: &str) -> bool {
    message.contains("event_attendees.event_id") && message.contains("event_attendees.user_id")
}

/// Only a clash on the `(event_id, user_id)` key means "already checked in".
/// Any other constraint failure stays a database error.
fn map_insert_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() && is_attendee_key_violation(db.message()) => {
            AppError::DuplicateAttendee(db.message().to_string())
        }
        _ => AppError::from(err),
    }
}

#[async_trait]
impl AttendeeRepository for SqliteAttendeeRepository {
    async fn upsert(&self, event_id: Uuid, attendee: Attendee) -> Result<Upserted> {
        // The UNIQUE(event_id, user_id) constraint settles races between
        // concurrent check-ins; the loser sees zero rows affected.
        let result = sqlx::query(
            r#"
            INSERT INTO event_attendees (id, event_id, user_id, name, email, barangay, checked_in_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (event_id, user_id) DO NOTHING
            "#
        )
        .bind(attendee.id.to_string())
        .bind(event_id.to_string())
        .bind(&attendee.user_id)
        .bind(&attendee.name)
        .bind(&attendee.email)
        .bind(&attendee.barangay)
        .bind(attendee.checked_in_at.naive_utc())
        .execute(&self.pool)
        .await
        .map_err(map_insert_error)?;

        let inserted = result.rows_affected() > 0;
        let stored = self.find(event_id, &attendee.user_id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve attendee after check-in".to_string())
        })?;

        Ok(Upserted { attendee: stored, inserted })
    }

    async fn find(&self, event_id: Uuid, user_id: &str) -> Result<Option<Attendee>> {
        let row = sqlx::query_as::<_, AttendeeRow>(
            r#"
            SELECT id, event_id, user_id, name, email, barangay, checked_in_at
            FROM event_attendees
            WHERE event_id = ? AND user_id = ?
            "#
        )
        .bind(event_id.to_string())
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_attendee).transpose()
    }

    async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<Attendee>> {
        let rows = sqlx::query_as::<_, AttendeeRow>(
            r#"
            SELECT id, event_id, user_id, name, email, barangay, checked_in_at
            FROM event_attendees
            WHERE event_id = ?
            ORDER BY checked_in_at ASC, seq ASC
            "#
        )
        .bind(event_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_attendee)
            .collect()
    }
}
