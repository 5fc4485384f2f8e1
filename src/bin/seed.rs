//! Loads a demo account with a realistic pipeline.
//!
//! `SEED_EMAIL` / `SEED_PASSWORD` pick the account; everything it already
//! owns is replaced in a single transaction.

use chrono::{DateTime, Duration, Utc};
use job_tracker_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    models::{
        application::{AppStatus, WorkSetup},
        calendar_event::{EventType, LocationMode},
    },
    services::pipeline::compute_next_event,
    utils::crypto::hash_password,
};
use sqlx::{Postgres, Transaction};
use tracing::info;
use uuid::Uuid;

const DEFAULT_EMAIL: &str = "demo@worktracker.dev";
const DEFAULT_PASSWORD: &str = "Password123!";

struct TimelineSeed {
    stage: AppStatus,
    detail: Option<&'static str>,
    mode: Option<LocationMode>,
    meet_link: Option<&'static str>,
    location: Option<&'static str>,
    notes: &'static str,
    /// Offset from now.
    at: Duration,
}

struct CalendarSeed {
    title: &'static str,
    event_type: EventType,
    start: Duration,
    minutes: i64,
    mode: LocationMode,
    meet_link: Option<&'static str>,
    place: Option<&'static str>,
    note: &'static str,
}

struct ApplicationSeed {
    company: &'static str,
    role: &'static str,
    location: &'static str,
    work_setup: WorkSetup,
    source: &'static str,
    job_link: &'static str,
    required_skills: &'static [&'static str],
    nice_to_have: &'static [&'static str],
    applied: Duration,
    timeline: Vec<TimelineSeed>,
    calendar: Vec<CalendarSeed>,
}

fn demo_applications() -> Vec<ApplicationSeed> {
    vec![
        ApplicationSeed {
            company: "Northwind Labs",
            role: "Backend Engineer",
            location: "Berlin",
            work_setup: WorkSetup::Hybrid,
            source: "LinkedIn",
            job_link: "https://jobs.example.com/northwind/backend",
            required_skills: &["Rust", "PostgreSQL", "HTTP APIs"],
            nice_to_have: &["Kubernetes"],
            applied: Duration::days(-12),
            timeline: vec![
                TimelineSeed {
                    stage: AppStatus::Screening,
                    detail: None,
                    mode: None,
                    meet_link: None,
                    location: None,
                    notes: "Recruiter replied",
                    at: Duration::days(-9),
                },
                TimelineSeed {
                    stage: AppStatus::Interview,
                    detail: Some("hr"),
                    mode: Some(LocationMode::Online),
                    meet_link: Some("https://meet.example.com/nwl-hr"),
                    location: None,
                    notes: "Salary band discussed",
                    at: Duration::days(-5),
                },
                TimelineSeed {
                    stage: AppStatus::TechnicalTest,
                    detail: Some("live_code"),
                    mode: Some(LocationMode::Online),
                    meet_link: Some("https://meet.example.com/nwl-live"),
                    location: None,
                    notes: "Pairing session with two engineers",
                    at: Duration::days(2) + Duration::hours(3),
                },
            ],
            calendar: vec![
                CalendarSeed {
                    title: "HR Interview · Northwind",
                    event_type: EventType::InterviewHr,
                    start: Duration::days(-5),
                    minutes: 45,
                    mode: LocationMode::Online,
                    meet_link: Some("https://meet.example.com/nwl-hr"),
                    place: None,
                    note: "Went well",
                },
                CalendarSeed {
                    title: "Live Coding · Northwind",
                    event_type: EventType::TechnicalTest,
                    start: Duration::days(2) + Duration::hours(3),
                    minutes: 90,
                    mode: LocationMode::Online,
                    meet_link: Some("https://meet.example.com/nwl-live"),
                    place: None,
                    note: "Review async Rust beforehand",
                },
            ],
        },
        ApplicationSeed {
            company: "Harbor Analytics",
            role: "Fullstack Developer",
            location: "Remote",
            work_setup: WorkSetup::Remote,
            source: "Company site",
            job_link: "https://harbor.example.com/careers/fullstack",
            required_skills: &["TypeScript", "SQL"],
            nice_to_have: &["Rust", "GraphQL"],
            applied: Duration::days(-6),
            timeline: vec![TimelineSeed {
                stage: AppStatus::Interview,
                detail: Some("user"),
                mode: Some(LocationMode::Offline),
                meet_link: None,
                location: Some("Harbor HQ, floor 4"),
                notes: "Meet the team lead",
                at: Duration::days(4),
            }],
            calendar: vec![CalendarSeed {
                title: "User Interview · Harbor",
                event_type: EventType::InterviewUser,
                start: Duration::days(4),
                minutes: 60,
                mode: LocationMode::Offline,
                meet_link: None,
                place: Some("Harbor HQ, floor 4"),
                note: "Bring portfolio",
            }],
        },
        ApplicationSeed {
            company: "Quietfield",
            role: "Platform Engineer",
            location: "Amsterdam",
            work_setup: WorkSetup::Onsite,
            source: "Referral",
            job_link: "https://quietfield.example.com/jobs/platform",
            required_skills: &["Linux", "Terraform"],
            nice_to_have: &[],
            applied: Duration::days(-30),
            timeline: vec![TimelineSeed {
                stage: AppStatus::Screening,
                detail: None,
                mode: None,
                meet_link: None,
                location: None,
                notes: "Phone screen, no news since",
                at: Duration::days(-25),
            }],
            calendar: vec![],
        },
        ApplicationSeed {
            company: "Bluebird Payments",
            role: "Software Engineer",
            location: "London",
            work_setup: WorkSetup::Hybrid,
            source: "Job board",
            job_link: "https://bluebird.example.com/jobs/swe",
            required_skills: &["Go", "Distributed systems"],
            nice_to_have: &["Rust"],
            applied: Duration::days(-40),
            timeline: vec![
                TimelineSeed {
                    stage: AppStatus::Offer,
                    detail: None,
                    mode: None,
                    meet_link: None,
                    location: None,
                    notes: "Verbal offer",
                    at: Duration::days(-10),
                },
                TimelineSeed {
                    stage: AppStatus::Hired,
                    detail: None,
                    mode: None,
                    meet_link: None,
                    location: None,
                    notes: "Signed",
                    at: Duration::days(-7),
                },
            ],
            calendar: vec![],
        },
        ApplicationSeed {
            company: "Lumen Studio",
            role: "Rust Developer",
            location: "Remote",
            work_setup: WorkSetup::Remote,
            source: "Newsletter",
            job_link: "https://lumen.example.com/jobs/rust",
            required_skills: &["Rust", "WebAssembly"],
            nice_to_have: &["Graphics"],
            applied: Duration::days(-2),
            timeline: vec![],
            calendar: vec![],
        },
    ]
}

async fn seed_application(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    now: DateTime<Utc>,
    app: &ApplicationSeed,
) -> anyhow::Result<()> {
    let applied_at = now + app.applied;
    let latest = app.timeline.iter().max_by_key(|t| t.at);
    let status = latest.map_or(AppStatus::Applied, |t| t.stage);
    let status_detail = latest.and_then(|t| t.detail);
    let last_update = latest.map_or(applied_at, |t| now + t.at);
    let next = latest.and_then(|t| compute_next_event(t.stage, t.detail, now + t.at, now));
    let required: Vec<String> = app.required_skills.iter().map(|s| s.to_string()).collect();
    let nice: Vec<String> = app.nice_to_have.iter().map(|s| s.to_string()).collect();

    let application_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO applications (
            user_id, company, role, location, work_setup, status, status_detail,
            source, job_link, notes, required_skills, nice_to_have,
            applied_at, last_update, next_event_at, next_event_title
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NULL, $10, $11, $12, $13, $14, $15)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(app.company)
    .bind(app.role)
    .bind(app.location)
    .bind(app.work_setup)
    .bind(status)
    .bind(status_detail)
    .bind(app.source)
    .bind(app.job_link)
    .bind(&required)
    .bind(&nice)
    .bind(applied_at)
    .bind(last_update)
    .bind(next.as_ref().map(|(at, _)| *at))
    .bind(next.as_ref().map(|(_, title)| title.clone()))
    .fetch_one(&mut **tx)
    .await?;

    for event in &app.timeline {
        sqlx::query(
            r#"
            INSERT INTO application_timeline_events
                (application_id, stage, detail, mode, meet_link, location, notes, at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(application_id)
        .bind(event.stage)
        .bind(event.detail)
        .bind(event.mode)
        .bind(event.meet_link)
        .bind(event.location)
        .bind(event.notes)
        .bind(now + event.at)
        .execute(&mut **tx)
        .await?;
    }

    for event in &app.calendar {
        let start_at = now + event.start;
        sqlx::query(
            r#"
            INSERT INTO calendar_events (
                user_id, application_id, title, event_type, company, start_at, end_at,
                location_type, meet_link, place, note
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(user_id)
        .bind(application_id)
        .bind(event.title)
        .bind(event.event_type)
        .bind(app.company)
        .bind(start_at)
        .bind(start_at + Duration::minutes(event.minutes))
        .bind(event.mode)
        .bind(event.meet_link)
        .bind(event.place)
        .bind(event.note)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config()?;
    let pool = create_pool(config).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let email = std::env::var("SEED_EMAIL")
        .map(|e| e.trim().to_lowercase())
        .unwrap_or_else(|_| DEFAULT_EMAIL.to_string());
    let password = std::env::var("SEED_PASSWORD").unwrap_or_else(|_| DEFAULT_PASSWORD.to_string());
    let password_hash = hash_password(&password)?;

    let user_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO users (email, password_hash)
        VALUES ($1, $2)
        ON CONFLICT (email) DO UPDATE SET password_hash = EXCLUDED.password_hash, updated_at = NOW()
        RETURNING id
        "#,
    )
    .bind(&email)
    .bind(&password_hash)
    .fetch_one(&pool)
    .await?;

    let now = Utc::now();
    let apps = demo_applications();

    let mut tx = pool.begin().await?;
    for table in ["calendar_events", "applications", "profiles"] {
        sqlx::query(&format!("DELETE FROM {} WHERE user_id = $1", table))
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
    }

    sqlx::query(
        r#"
        INSERT INTO profiles (user_id, name, headline, location, bio)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(user_id)
    .bind("Demo User")
    .bind("Backend engineer looking for the next role")
    .bind("Europe")
    .bind("Seeded account for trying out the tracker.")
    .execute(&mut *tx)
    .await?;

    for app in &apps {
        seed_application(&mut tx, user_id, now, app).await?;
    }
    tx.commit().await?;

    info!(%email, applications = apps.len(), "seed complete");
    Ok(())
}
