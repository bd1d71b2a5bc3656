use barangay_events::{
    domain::{CreateEventRequest, EventStatus, EventVisibility},
    repository::SqliteEventRepository,
    service::event_service::EventService,
};
use chrono::{Duration, Local};
use clap::Parser;
use fake::{
    faker::{address::en::CityName, internet::en::SafeEmail, name::en::Name},
    Fake,
};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;

const BARANGAYS: [&str; 4] = ["Poblacion", "San Isidro", "Santa Cruz", "Bagong Silang"];
const TITLES: [&str; 5] = [
    "Solo Parent Orientation",
    "Livelihood Training",
    "Medical Mission",
    "Financial Literacy Seminar",
    "Family Day",
];
/// Slot starts that respect the one hour buffer around one hour events.
const SLOT_STARTS: [u32; 5] = [8, 10, 12, 14, 16];

#[derive(Parser, Debug)]
#[command(about = "Populate a development database with users and events")]
struct Args {
    #[arg(long, default_value = "sqlite:barangay_events.db?mode=rwc")]
    database_url: String,

    /// Number of events to schedule, starting tomorrow.
    #[arg(long, default_value_t = 8)]
    events: usize,

    /// Number of users to create; every third one is left unverified.
    #[arg(long, default_value_t = 12)]
    users: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    println!("🌱 Starting database seeding...");

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&args.database_url)
        .await?;

    println!("📋 Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    println!("👥 Creating users...");
    for i in 0..args.users {
        let name: String = Name().fake();
        let email: String = SafeEmail().fake();
        let barangay = BARANGAYS[i % BARANGAYS.len()];
        let verified = i % 3 != 2;

        sqlx::query(
            "INSERT OR IGNORE INTO users (id, name, email, barangay, verified) VALUES (?, ?, ?, ?, ?)"
        )
        .bind((i + 1).to_string())
        .bind(&name)
        .bind(&email)
        .bind(barangay)
        .bind(verified as i32)
        .execute(&db_pool)
        .await?;
    }
    println!("  ✅ Created {} users (QR tokens user:1 .. user:{})", args.users, args.users);

    println!("📅 Scheduling events...");
    let events = EventService::new(Arc::new(SqliteEventRepository::new(db_pool.clone())));
    let today = Local::now().date_naive();
    let mut first_event = None;

    for i in 0..args.events {
        let date = today + Duration::days(1 + (i / SLOT_STARTS.len()) as i64);
        let hour = SLOT_STARTS[i % SLOT_STARTS.len()];
        let city: String = CityName().fake();

        let request = CreateEventRequest {
            title: TITLES[i % TITLES.len()].to_string(),
            description: format!("Community gathering, venue sponsored by {}", city),
            date,
            start_time: format!("{:02}:00", hour),
            end_time: format!("{:02}:00", hour + 1),
            location: "Barangay Hall".to_string(),
            visibility: if i % 2 == 0 { EventVisibility::Everyone } else { EventVisibility::Beneficiaries },
            barangay: BARANGAYS[i % BARANGAYS.len()].to_string(),
            image_url: None,
        };

        match events.create_as_of(request, today).await {
            Ok(event) => {
                println!("  ✅ {} on {} {}-{}", event.title, event.date, event.start_time, event.end_time);
                first_event.get_or_insert(event.id);
            }
            Err(e) => println!("  ⚠️  Skipped event: {}", e),
        }
    }

    if let Some(id) = first_event {
        events.transition(id, EventStatus::Ongoing).await?;
        println!("  ▶️  Opened check-in for event {}", id);
    }

    println!("🎉 Seeding complete");
    Ok(())
}
