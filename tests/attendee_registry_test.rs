mod common;

use std::sync::Arc;

use barangay_events::{
    domain::{Attendee, CheckIn, EventStatus},
    error::AppError,
    repository::{
        AttendeeRepository, IdentityLookup, SqliteAttendeeRepository, SqliteEventRepository,
        SqliteIdentityLookup,
    },
    service::{attendee_service::AttendeeService, event_service::EventService},
};
use chrono::{TimeZone, Utc};
use common::{date, event_request, identity, memory_pool};
use sqlx::SqlitePool;
use uuid::Uuid;

struct Harness {
    pool: SqlitePool,
    events: EventService,
    registry: AttendeeService,
}

async fn harness() -> anyhow::Result<Harness> {
    let pool = memory_pool().await?;
    let event_repo = Arc::new(SqliteEventRepository::new(pool.clone()));
    let attendee_repo = Arc::new(SqliteAttendeeRepository::new(pool.clone()));
    Ok(Harness {
        pool,
        events: EventService::new(event_repo.clone()),
        registry: AttendeeService::new(event_repo, attendee_repo),
    })
}

async fn ongoing_event(h: &Harness) -> anyhow::Result<Uuid> {
    let event = h.events
        .create_as_of(event_request(date(2025, 6, 10), "09:00", "12:00"), date(2025, 6, 9))
        .await?;
    h.events.transition(event.id, EventStatus::Ongoing).await?;
    Ok(event.id)
}

#[tokio::test]
async fn checking_in_twice_keeps_one_record() -> anyhow::Result<()> {
    let h = harness().await?;
    let event_id = ongoing_event(&h).await?;

    let first = h.registry.add(event_id, identity("42", "Maria Santos")).await?;
    let second = h.registry.add(event_id, identity("42", "Maria Santos")).await?;

    assert!(first.is_new());
    assert!(matches!(second, CheckIn::AlreadyPresent(_)));
    assert_eq!(first.attendee().id, second.attendee().id);
    assert_eq!(h.registry.list(event_id).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn simultaneous_check_ins_store_one_record() -> anyhow::Result<()> {
    let h = harness().await?;
    let event_id = ongoing_event(&h).await?;

    let (a, b) = tokio::join!(
        h.registry.add(event_id, identity("7", "Jose Rizal")),
        h.registry.add(event_id, identity("7", "Jose Rizal")),
    );
    let (a, b) = (a?, b?);

    assert_eq!([a.is_new(), b.is_new()].iter().filter(|n| **n).count(), 1);
    assert_eq!(h.registry.list(event_id).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn same_person_may_attend_different_events() -> anyhow::Result<()> {
    let h = harness().await?;
    let first = ongoing_event(&h).await?;
    let second = h.events
        .create_as_of(event_request(date(2025, 6, 11), "09:00", "12:00"), date(2025, 6, 9))
        .await?;
    h.events.transition(second.id, EventStatus::Active).await?;

    assert!(h.registry.add(first, identity("42", "Maria Santos")).await?.is_new());
    assert!(h.registry.add(second.id, identity("42", "Maria Santos")).await?.is_new());
    Ok(())
}

#[tokio::test]
async fn check_in_gated_by_event_status() -> anyhow::Result<()> {
    let h = harness().await?;
    let event = h.events
        .create_as_of(event_request(date(2025, 6, 10), "09:00", "12:00"), date(2025, 6, 9))
        .await?;

    let err = h.registry.add(event.id, identity("42", "Maria Santos")).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidStateTransition { status: EventStatus::Upcoming, .. }));

    h.events.transition(event.id, EventStatus::Ongoing).await?;
    h.registry.add(event.id, identity("42", "Maria Santos")).await?;
    h.events.transition(event.id, EventStatus::Completed).await?;

    let err = h.registry.add(event.id, identity("43", "Ana Cruz")).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidStateTransition { status: EventStatus::Completed, .. }));

    // Listing stays available after the event closes.
    assert_eq!(h.registry.list(event.id).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn listing_orders_by_check_in_time_then_insertion() -> anyhow::Result<()> {
    let h = harness().await?;
    let event_id = ongoing_event(&h).await?;
    let repo = SqliteAttendeeRepository::new(h.pool.clone());

    let noon = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
    let earlier = Utc.with_ymd_and_hms(2025, 6, 10, 11, 0, 0).unwrap();

    for (user, at) in [("b", noon), ("c", noon), ("a", earlier)] {
        let attendee = Attendee::from_identity(event_id, identity(user, user), at);
        assert!(repo.upsert(event_id, attendee).await?.inserted);
    }

    let order: Vec<_> = repo.list_by_event(event_id).await?
        .into_iter()
        .map(|a| a.user_id)
        .collect();
    assert_eq!(order, vec!["a", "b", "c"]);
    Ok(())
}

#[tokio::test]
async fn identity_lookup_only_resolves_verified_users() -> anyhow::Result<()> {
    let h = harness().await?;
    sqlx::query("INSERT INTO users (id, name, email, barangay, verified) VALUES ('42', 'Maria Santos', 'maria@example.com', 'Poblacion', 1)")
        .execute(&h.pool)
        .await?;
    sqlx::query("INSERT INTO users (id, name, email, barangay, verified) VALUES ('43', 'Ana Cruz', 'ana@example.com', 'Poblacion', 0)")
        .execute(&h.pool)
        .await?;

    let lookup = SqliteIdentityLookup::new(h.pool.clone());
    let maria = lookup.by_token("user:42").await?.expect("verified user resolves");
    assert_eq!(maria.name, "Maria Santos");
    assert!(lookup.by_token("user:43").await?.is_none());
    assert!(lookup.by_token("user:999").await?.is_none());
    assert!(lookup.by_token("garbage").await?.is_none());
    Ok(())
}
