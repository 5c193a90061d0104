//! Integration tests for semester administration.
//!
//! Requires a PostgreSQL database reachable through TEST_DATABASE_URL.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::spawn_app;

fn semester_payload(name: &str) -> serde_json::Value {
    json!({
        "name": name,
        "school_year": "2024-2025",
        "start_date": "2024-09-01",
        "end_date": "2025-01-15",
    })
}

fn unique_name() -> String {
    format!("HK-{}", Uuid::new_v4())
}

#[tokio::test]
async fn test_create_semester() {
    let app = spawn_app().await;
    let (_, token) = app.create_user("admin").await;
    let name = unique_name();

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/admin/semesters",
            Some(&token),
            Some(semester_payload(&name)),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], name.as_str());
    assert_eq!(body["school_year"], "2024-2025");
    // New semesters start inactive
    assert_eq!(body["is_active"], false);
}

#[tokio::test]
async fn test_duplicate_semester_conflicts() {
    let app = spawn_app().await;
    let (_, token) = app.create_user("admin").await;
    let name = unique_name();

    let (first, _) = app
        .request(
            "POST",
            "/api/v1/admin/semesters",
            Some(&token),
            Some(semester_payload(&name)),
        )
        .await;
    let (second, body) = app
        .request(
            "POST",
            "/api/v1/admin/semesters",
            Some(&token),
            Some(semester_payload(&name)),
        )
        .await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(
        body["message"],
        format!("Semester {} already exists for 2024-2025", name)
    );
}

#[tokio::test]
async fn test_invalid_school_year_rejected() {
    let app = spawn_app().await;
    let (_, token) = app.create_user("admin").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/admin/semesters",
            Some(&token),
            Some(json!({
                "name": unique_name(),
                "school_year": "2024-2026",
                "start_date": "2024-09-01",
                "end_date": "2025-01-15",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_activation_is_exclusive() {
    let app = spawn_app().await;
    let (_, token) = app.create_user("admin").await;
    let first = app.create_semester().await;
    let second = app.create_semester().await;

    let (status, body) = app
        .request(
            "POST",
            &format!("/api/v1/admin/semesters/{}/activate", first.id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], true);

    let (status, body) = app
        .request(
            "POST",
            &format!("/api/v1/admin/semesters/{}/activate", second.id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], true);

    // Activating the second deactivated the first
    let (status, body) = app
        .request("GET", "/api/v1/admin/semesters", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().expect("expected an array");
    let first_row = list
        .iter()
        .find(|s| s["id"] == first.id.to_string())
        .expect("first semester missing");
    assert_eq!(first_row["is_active"], false);

    let active: Vec<_> = list.iter().filter(|s| s["is_active"] == true).collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["id"], second.id.to_string());
}

#[tokio::test]
async fn test_activate_unknown_semester_not_found() {
    let app = spawn_app().await;
    let (_, token) = app.create_user("admin").await;

    let (status, _) = app
        .request(
            "POST",
            &format!("/api/v1/admin/semesters/{}/activate", Uuid::new_v4()),
            Some(&token),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_student_cannot_manage_semesters() {
    let app = spawn_app().await;
    let (_, token) = app.create_student().await;

    let (status, _) = app
        .request(
            "POST",
            "/api/v1/admin/semesters",
            Some(&token),
            Some(semester_payload(&unique_name())),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}
