//! End-to-end flows against a real PostgreSQL database.
//!
//! Run with `DATABASE_URL=postgres://... cargo test -- --ignored`.

mod common;

use axum::{http::StatusCode, Router};
use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use common::*;
use job_tracker_backend::{
    build_router,
    config::Config,
    database::pool::create_pool,
    models::application::AppStatus,
    services::{application_service::ApplicationService, pipeline::is_stale},
    utils::time::FixedClock,
    AppState,
};
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

async fn live_pool() -> (PgPool, Config) {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for ignored tests");
    let config = Config::for_tests(&url, SECRET);
    let pool = create_pool(&config).await.expect("pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    (pool, config)
}

async fn live_app() -> Router {
    let (pool, config) = live_pool().await;
    build_router(AppState::new(pool, config))
}

async fn register(app: &Router) -> (String, JsonValue) {
    let email = format!("flow_{}@example.com", Uuid::new_v4());
    let (status, headers, body) = send(
        app,
        json_request(
            "POST",
            "/auth/register",
            None,
            &json!({ "name": "Flow Tester", "email": email, "password": "Password123!" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    (cookie_from(&headers).expect("session cookie"), body)
}

fn iso(at: chrono::DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[tokio::test]
#[ignore]
async fn register_login_and_me() {
    let app = live_app().await;
    let (cookie, registered) = register(&app).await;
    let email = registered["user"]["email"].as_str().unwrap().to_string();

    let (status, _, _) = send(
        &app,
        json_request(
            "POST",
            "/auth/register",
            None,
            &json!({ "name": "Again", "email": email, "password": "Password123!" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _, body) = send(
        &app,
        json_request("POST", "/auth/login", None, &json!({ "email": email, "password": "wrong-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, headers, _) = send(
        &app,
        json_request(
            "POST",
            "/auth/login",
            None,
            &json!({ "email": email.to_uppercase(), "password": "Password123!" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(cookie_from(&headers).is_some());

    let (status, _, body) = send(&app, get_request("/auth/me", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], email);
    assert_eq!(body["user"]["profile"]["name"], "Flow Tester");
}

#[tokio::test]
#[ignore]
async fn application_pipeline_and_ghosting() {
    let app = live_app().await;
    let (cookie, _) = register(&app).await;

    let (status, _, body) = send(
        &app,
        json_request(
            "POST",
            "/applications",
            Some(&cookie),
            &json!({
                "company": " Acme ",
                "role": "Backend Engineer",
                "location": "Remote",
                "workSetup": "Remote",
                "status": "screening",
                "appliedAt": Utc::now().format("%Y-%m-%d").to_string(),
                "requiredSkills": ["Rust", " ", "SQL"]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["application"]["id"].as_str().unwrap().to_string();

    let (status, _, body) = send(&app, get_request(&format!("/applications/{}", id), Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["application"]["company"], "Acme");
    assert_eq!(body["application"]["status"], "screening");
    assert_eq!(body["application"]["requiredSkills"], json!(["Rust", "SQL"]));
    assert_eq!(body["timeline"], json!([]));

    let at = Utc::now() + Duration::days(1);
    let (status, _, body) = send(
        &app,
        json_request(
            "POST",
            &format!("/applications/{}/timeline", id),
            Some(&cookie),
            &json!({
                "stage": "interview",
                "detail": "hr",
                "at": iso(at),
                "mode": "online",
                "meetLink": "https://meet.example.com/abc",
                "location": "ignored for online"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["application"]["status"], "interview");
    assert_eq!(body["application"]["statusDetail"], "hr");
    assert_eq!(body["application"]["nextEventTitle"], "HR Interview");
    assert_eq!(body["event"]["location"], JsonValue::Null);

    let (status, _, _) = send(
        &app,
        json_request(
            "POST",
            &format!("/applications/{}/timeline", Uuid::new_v4()),
            Some(&cookie),
            &json!({ "stage": "offer", "at": iso(Utc::now()) }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Applied long ago with nothing pending: the next list flips it.
    let (_, _, body) = send(
        &app,
        json_request(
            "POST",
            "/applications",
            Some(&cookie),
            &json!({
                "company": "Silent Co",
                "role": "Engineer",
                "location": "Paris",
                "workSetup": "Onsite",
                "status": "applied",
                "appliedAt": (Utc::now() - Duration::days(30)).format("%Y-%m-%d").to_string()
            }),
        ),
    )
    .await;
    let silent_id = body["application"]["id"].clone();

    let (status, _, body) = send(&app, get_request("/applications", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    let silent = items.iter().find(|i| i["id"] == silent_id).unwrap();
    assert_eq!(silent["status"], "ghosting");
    let active = items.iter().find(|i| i["id"] != silent_id).unwrap();
    assert_eq!(active["status"], "interview");

    let (status, _, body) = send(&app, get_request("/dashboard", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["active"], 1);
    assert_eq!(body["byStatus"]["ghosting"], 1);
    assert_eq!(body["upcoming"].as_array().unwrap().len(), 1);
}

#[tokio::test]
#[ignore]
async fn calendar_crud_with_ownership() {
    let app = live_app().await;
    let (cookie, _) = register(&app).await;
    let (other_cookie, _) = register(&app).await;

    let (_, _, body) = send(
        &app,
        json_request(
            "POST",
            "/applications",
            Some(&other_cookie),
            &json!({
                "company": "Theirs",
                "role": "Dev",
                "location": "Remote",
                "workSetup": "Remote",
                "status": "applied",
                "appliedAt": Utc::now().format("%Y-%m-%d").to_string()
            }),
        ),
    )
    .await;
    let foreign_app = body["application"]["id"].as_str().unwrap().to_string();

    let start = Utc::now() + Duration::days(2);
    let (status, _, body) = send(
        &app,
        json_request(
            "POST",
            "/calendar-events",
            Some(&cookie),
            &json!({
                "title": "Tech screen",
                "type": "technical_test",
                "startAt": iso(start),
                "applicationId": foreign_app
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Application not found / not yours");

    let (status, _, body) = send(
        &app,
        json_request(
            "POST",
            "/calendar-events",
            Some(&cookie),
            &json!({
                "title": "Tech screen",
                "type": "technical_test",
                "startAt": iso(start),
                "endAt": iso(start + Duration::hours(1)),
                "locationType": "offline",
                "place": "Office",
                "meetLink": "https://dropped.example.com"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let id = body["item"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["item"]["meetLink"], JsonValue::Null);
    assert_eq!(body["item"]["place"], "Office");

    let (status, _, body) = send(
        &app,
        json_request(
            "PATCH",
            &format!("/calendar-events/{}", id),
            Some(&cookie),
            &json!({ "endAt": null, "locationType": "online", "meetLink": "https://meet.example.com/x" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["item"]["endAt"], JsonValue::Null);
    assert_eq!(body["item"]["place"], JsonValue::Null);
    assert_eq!(body["item"]["meetLink"], "https://meet.example.com/x");
    assert_eq!(body["item"]["title"], "Tech screen");

    let (status, _, _) = send(&app, get_request(&format!("/calendar-events/{}", id), Some(&other_cookie))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let range = format!(
        "/calendar-events?start={}&end={}",
        iso(start - Duration::hours(1)).replace('+', "%2B"),
        iso(start + Duration::hours(1)).replace('+', "%2B")
    );
    let (status, _, body) = send(&app, get_request(&range, Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    let req = json_request("DELETE", &format!("/calendar-events/{}", id), Some(&cookie), &json!({}));
    let (status, _, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));

    let (status, _, body) = send(&app, get_request(&format!("/calendar-events/{}", id), Some(&cookie))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].is_string());

    let req = json_request("DELETE", &format!("/calendar-events/{}", id), Some(&cookie), &json!({}));
    let (status, _, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn profile_patch_truncates_and_clears() {
    let app = live_app().await;
    let (cookie, _) = register(&app).await;

    let (status, _, body) = send(
        &app,
        json_request(
            "PATCH",
            "/profile",
            Some(&cookie),
            &json!({ "headline": "h".repeat(200), "bio": "  ", "avatarUrl": "https://img.example.com/a.png" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    let profile = &body["user"]["profile"];
    assert_eq!(profile["name"], "Flow Tester");
    assert_eq!(profile["headline"].as_str().unwrap().chars().count(), 120);
    assert_eq!(profile["bio"], JsonValue::Null);
    assert_eq!(profile["avatarUrl"], "https://img.example.com/a.png");

    let (_, _, body) = send(
        &app,
        json_request("PATCH", "/profile", Some(&cookie), &json!({ "avatarUrl": null })),
    )
    .await;
    assert_eq!(body["user"]["profile"]["avatarUrl"], JsonValue::Null);
    assert_eq!(body["user"]["profile"]["name"], "Flow Tester");
}

async fn insert_user(pool: &PgPool) -> Uuid {
    sqlx::query_scalar("INSERT INTO users (email, password_hash) VALUES ($1, 'x') RETURNING id")
        .bind(format!("sweep_{}@example.com", Uuid::new_v4()))
        .fetch_one(pool)
        .await
        .expect("insert user")
}

async fn insert_backdated(
    pool: &PgPool,
    user_id: Uuid,
    status: AppStatus,
    last_update: DateTime<Utc>,
    next_event_at: Option<DateTime<Utc>>,
) -> Uuid {
    sqlx::query_scalar(
        r#"
        INSERT INTO applications
            (user_id, company, role, location, work_setup, status,
             applied_at, last_update, next_event_at, next_event_title)
        VALUES ($1, 'Sweep Co', 'Engineer', 'Remote', 'Remote', $2, $3, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(status)
    .bind(last_update)
    .bind(next_event_at)
    .bind(next_event_at.map(|_| "Follow-up".to_string()))
    .fetch_one(pool)
    .await
    .expect("insert application")
}

#[tokio::test]
#[ignore]
async fn ghosting_sweep_skips_terminal_and_pending_rows() {
    let (pool, _) = live_pool().await;
    // Whole seconds so the value survives the round trip through timestamptz.
    let now = Utc.timestamp_opt(Utc::now().timestamp(), 0).unwrap();
    let window = Duration::days(14);
    let service = ApplicationService::new(pool.clone(), Arc::new(FixedClock(now)), window);
    let user_id = insert_user(&pool).await;

    let rows = [
        (AppStatus::Hired, now - Duration::days(30), None),
        (AppStatus::Rejected, now - Duration::days(30), None),
        (AppStatus::Interview, now - Duration::days(30), Some(now + Duration::days(1))),
        (AppStatus::Applied, now - Duration::days(30), Some(now - Duration::days(2))),
        (AppStatus::Applied, now - Duration::days(13), None),
        (AppStatus::Screening, now - Duration::days(15), None),
    ];
    let expected_flips = [false, false, false, true, false, true];

    let mut seeded = Vec::new();
    for (status, last_update, next_event_at) in rows {
        let id = insert_backdated(&pool, user_id, status, last_update, next_event_at).await;
        seeded.push((id, status, last_update, next_event_at));
    }

    let listed = service.list(user_id).await.expect("list");
    assert_eq!(listed.len(), rows.len());

    for ((id, status, last_update, next_event_at), should_flip) in seeded.iter().zip(&expected_flips) {
        assert_eq!(
            is_stale(*status, *last_update, *next_event_at, now, window),
            *should_flip,
            "pure predicate disagrees for {:?}",
            status
        );
        let app = service.get_owned(user_id, *id).await.expect("get");
        if *should_flip {
            assert_eq!(app.status, AppStatus::Ghosting);
            assert_eq!(app.last_update, now);
            assert_eq!(app.next_event_at, None);
            assert_eq!(app.next_event_title, None);
        } else {
            assert_eq!(app.status, *status);
            assert_eq!(app.last_update, *last_update);
            assert_eq!(app.next_event_at, *next_event_at);
        }
    }

    // A second pass finds nothing left to flip for this user.
    assert_eq!(service.sweep_ghosting(user_id).await.expect("sweep"), 0);
}

#[tokio::test]
#[ignore]
async fn scheduled_sweep_covers_every_user() {
    let (pool, _) = live_pool().await;
    let now = Utc.timestamp_opt(Utc::now().timestamp(), 0).unwrap();
    let service = ApplicationService::new(pool.clone(), Arc::new(FixedClock(now)), Duration::days(14));

    let first = insert_user(&pool).await;
    let second = insert_user(&pool).await;
    let stale = insert_backdated(&pool, first, AppStatus::Offer, now - Duration::days(20), None).await;
    let other_stale = insert_backdated(&pool, second, AppStatus::TechnicalTest, now - Duration::days(40), None).await;
    let fresh = insert_backdated(&pool, second, AppStatus::Applied, now - Duration::days(1), None).await;
    let hired = insert_backdated(&pool, second, AppStatus::Hired, now - Duration::days(60), None).await;

    let flipped = service.sweep_ghosting_all().await.expect("sweep all");
    assert!(flipped >= 2);

    let app = service.get_owned(first, stale).await.expect("get");
    assert_eq!(app.status, AppStatus::Ghosting);
    assert_eq!(app.last_update, now);
    let app = service.get_owned(second, other_stale).await.expect("get");
    assert_eq!(app.status, AppStatus::Ghosting);
    let app = service.get_owned(second, fresh).await.expect("get");
    assert_eq!(app.status, AppStatus::Applied);
    let app = service.get_owned(second, hired).await.expect("get");
    assert_eq!(app.status, AppStatus::Hired);
}
