//! Integration tests for course administration.
//!
//! Requires a PostgreSQL database reachable through TEST_DATABASE_URL.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::{random_offering_code, spawn_app};

#[tokio::test]
async fn test_admin_creates_offering() {
    let app = spawn_app().await;
    let (_, admin_token) = app.create_user("admin").await;
    let (teacher, _) = app.create_user("teacher").await;
    let semester = app.create_semester().await;
    let code = random_offering_code();

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/admin/offerings",
            Some(&admin_token),
            Some(json!({
                "code": code,
                "course_name": "Data Structures",
                "semester_id": semester.id,
                "teacher_id": teacher.id,
                "capacity": 60,
                "day_of_week": 3,
                "period": 2,
                "room": "B1.204",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["code"], code.as_str());
    assert_eq!(body["course_name"], "Data Structures");
    assert_eq!(body["capacity"], 60);
}

#[tokio::test]
async fn test_duplicate_offering_code_conflicts() {
    let app = spawn_app().await;
    let (_, admin_token) = app.create_user("admin").await;
    let (teacher, _) = app.create_user("teacher").await;
    let semester = app.create_semester().await;
    let payload = json!({
        "code": random_offering_code(),
        "course_name": "Data Structures",
        "semester_id": semester.id,
        "teacher_id": teacher.id,
        "capacity": 60,
        "day_of_week": 3,
        "period": 2,
        "room": "B1.204",
    });

    let (first, _) = app
        .request("POST", "/api/v1/admin/offerings", Some(&admin_token), Some(payload.clone()))
        .await;
    let (second, body) = app
        .request("POST", "/api/v1/admin/offerings", Some(&admin_token), Some(payload))
        .await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(body["message"], "An offering with this code already exists");
}

#[tokio::test]
async fn test_create_offering_requires_teacher_role() {
    let app = spawn_app().await;
    let (_, admin_token) = app.create_user("admin").await;
    let (student, _) = app.create_student().await;
    let semester = app.create_semester().await;

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/admin/offerings",
            Some(&admin_token),
            Some(json!({
                "code": random_offering_code(),
                "course_name": "Data Structures",
                "semester_id": semester.id,
                "teacher_id": student.id,
                "capacity": 60,
                "day_of_week": 3,
                "period": 2,
                "room": "B1.204",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Assigned user is not a teacher");
}

#[tokio::test]
async fn test_create_offering_unknown_semester_not_found() {
    let app = spawn_app().await;
    let (_, admin_token) = app.create_user("admin").await;
    let (teacher, _) = app.create_user("teacher").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/admin/offerings",
            Some(&admin_token),
            Some(json!({
                "code": random_offering_code(),
                "course_name": "Data Structures",
                "semester_id": Uuid::new_v4(),
                "teacher_id": teacher.id,
                "capacity": 60,
                "day_of_week": 3,
                "period": 2,
                "room": "B1.204",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Semester not found");
}

#[tokio::test]
async fn test_staff_removes_student_registration() {
    let app = spawn_app().await;
    let (_, staff_token) = app.create_user("staff").await;
    let (student, student_token) = app.create_student().await;
    let offering = app.create_offering(30).await;
    let code = student.student_code.clone().unwrap();

    let (status, _) = app
        .request(
            "POST",
            "/api/v1/courses/register",
            Some(&student_token),
            Some(json!({ "offering_code": offering.code })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request(
            "DELETE",
            &format!(
                "/api/v1/admin/courses/{}/registrations/{}",
                offering.id, code
            ),
            Some(&staff_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Registration cancelled");

    // The student's list is empty again
    let (_, registrations) = app
        .request("GET", "/api/v1/courses/my-registrations", Some(&student_token), None)
        .await;
    assert!(registrations.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_remove_registration_unknown_student_not_found() {
    let app = spawn_app().await;
    let (_, staff_token) = app.create_user("staff").await;
    let offering = app.create_offering(30).await;

    let (status, body) = app
        .request(
            "DELETE",
            &format!(
                "/api/v1/admin/courses/{}/registrations/ZZ000000",
                offering.id
            ),
            Some(&staff_token),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Student not found");
}

#[tokio::test]
async fn test_student_cannot_remove_registrations() {
    let app = spawn_app().await;
    let (student, token) = app.create_student().await;
    let offering = app.create_offering(30).await;

    let (status, _) = app
        .request(
            "DELETE",
            &format!(
                "/api/v1/admin/courses/{}/registrations/{}",
                offering.id,
                student.student_code.clone().unwrap()
            ),
            Some(&token),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}
