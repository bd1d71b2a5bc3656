#![allow(dead_code)]

use barangay_events::domain::{CreateEventRequest, EventVisibility, Identity};
use chrono::NaiveDate;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

/// Fresh in-memory database. A single connection, since every `:memory:`
/// connection is its own database.
pub async fn memory_pool() -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await?;

    Ok(pool)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn event_request(date: NaiveDate, start: &str, end: &str) -> CreateEventRequest {
    CreateEventRequest {
        title: format!("Seminar {}-{}", start, end),
        description: "Quarterly assembly for registered solo parents".to_string(),
        date,
        start_time: start.to_string(),
        end_time: end.to_string(),
        location: "Barangay Hall".to_string(),
        visibility: EventVisibility::Beneficiaries,
        barangay: "Poblacion".to_string(),
        image_url: None,
    }
}

pub fn identity(user_id: &str, name: &str) -> Identity {
    Identity {
        user_id: user_id.to_string(),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        barangay: "Poblacion".to_string(),
    }
}
