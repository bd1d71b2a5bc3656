use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Event, EventStatus},
    error::{AppError, Result},
    repository::EventRepository,
};

#[derive(FromRow)]
struct EventRow {
    id: String,
    title: String,
    description: String,
    date: NaiveDate,
    start_time: String,
    end_time: String,
    location: String,
    status: String,
    visibility: String,
    barangay: String,
    image_url: Option<String>,
    archived: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

const EVENT_COLUMNS: &str = r#"
    id, title, description, date, start_time, end_time, location, status,
    visibility, barangay, image_url, archived, created_at, updated_at
"#;

pub struct SqliteEventRepository {
    pool: SqlitePool,
}

impl SqliteEventRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_event(row: EventRow) -> Result<Event> {
        Ok(Event {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            title: row.title,
            description: row.description,
            date: row.date,
            start_time: row.start_time,
            end_time: row.end_time,
            location: row.location,
            status: row.status.parse().map_err(AppError::Database)?,
            visibility: row.visibility.parse().map_err(AppError::Database)?,
            barangay: row.barangay,
            image_url: row.image_url,
            archived: row.archived != 0,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    async fn fetch_existing(&self, id: Uuid, what: &str) -> Result<Event> {
        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database(format!("Failed to retrieve {} event", what))
        })
    }
}

#[async_trait]
impl EventRepository for SqliteEventRepository {
    async fn create(&self, event: Event) -> Result<Event> {
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO events (
                id, title, description, date, start_time, end_time, location, status,
                visibility, barangay, image_url, archived, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(event.id.to_string())
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.date)
        .bind(&event.start_time)
        .bind(&event.end_time)
        .bind(&event.location)
        .bind(event.status.as_str())
        .bind(event.visibility.as_str())
        .bind(&event.barangay)
        .bind(&event.image_url)
        .bind(if event.archived { 1i32 } else { 0i32 })
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.fetch_existing(event.id, "created").await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {} FROM events WHERE id = ?",
            EVENT_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_event).transpose()
    }

    async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {} FROM events WHERE date = ? AND archived = 0 ORDER BY start_time ASC, created_at ASC",
            EVENT_COLUMNS
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_event)
            .collect()
    }

    async fn update(&self, id: Uuid, event: Event) -> Result<Event> {
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            UPDATE events
            SET title = ?, description = ?, date = ?, start_time = ?, end_time = ?,
                location = ?, visibility = ?, barangay = ?, image_url = ?, updated_at = ?
            WHERE id = ?
            "#
        )
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.date)
        .bind(&event.start_time)
        .bind(&event.end_time)
        .bind(&event.location)
        .bind(event.visibility.as_str())
        .bind(&event.barangay)
        .bind(&event.image_url)
        .bind(now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Event not found".to_string()));
        }

        self.fetch_existing(id, "updated").await
    }

    async fn set_status(&self, id: Uuid, status: EventStatus) -> Result<Event> {
        let result = sqlx::query("UPDATE events SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now().naive_utc())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Event not found".to_string()));
        }

        self.fetch_existing(id, "updated").await
    }

    async fn archive(&self, id: Uuid) -> Result<Event> {
        let result = sqlx::query("UPDATE events SET archived = 1, updated_at = ? WHERE id = ?")
            .bind(Utc::now().naive_utc())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Event not found".to_string()));
        }

        self.fetch_existing(id, "archived").await
    }
}
