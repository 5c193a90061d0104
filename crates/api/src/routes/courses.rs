//! Course registration routes for students.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::auth::AuthUser;
use crate::middleware::metrics::record_course_registration;
use domain::models::course::{
    CancelRegistrationResponse, RegisterCourseRequest, RegisterCourseResponse, RegistrationDetail,
};
use domain::models::OfferingSummary;
use domain::services::access::{ensure, Capability};
use persistence::repositories::{CourseRepository, RegisterOutcome, SemesterRepository};

/// POST /api/v1/courses/register
///
/// Register the authenticated student into an offering. The duplicate and
/// capacity checks run inside the repository under the offering row lock.
pub async fn register(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<RegisterCourseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ensure(auth.role, Capability::RegisterCourse)?;
    payload.validate()?;

    let repo = CourseRepository::new(state.pool.clone());

    let offering = repo
        .find_offering_by_code(&payload.offering_code)
        .await?
        .ok_or_else(|| ApiError::NotFound("Offering not found".to_string()))?;

    match repo.register_student(auth.user_id, offering.id).await? {
        RegisterOutcome::Registered(registration) => {
            record_course_registration();
            info!(
                student_id = %auth.user_id,
                offering_id = %offering.id,
                offering_code = %offering.code,
                "Student registered for course offering"
            );
            Ok((
                StatusCode::OK,
                Json(RegisterCourseResponse {
                    message: format!("Registered for {}", offering.code),
                    data: registration.into(),
                }),
            ))
        }
        RegisterOutcome::AlreadyRegistered => Err(ApiError::Conflict(
            "Already registered for this offering".to_string(),
        )),
        RegisterOutcome::Full => Err(ApiError::Conflict("Offering is full".to_string())),
    }
}

/// DELETE /api/v1/courses/registrations/{offering_id}
///
/// Cancel the authenticated student's own registration. Cancellation never
/// touches the ledger; rewards only exist for confirmed activity
/// participation.
pub async fn cancel_registration(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(offering_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    ensure(auth.role, Capability::CancelOwnRegistration)?;

    let repo = CourseRepository::new(state.pool.clone());
    let deleted = repo.cancel_registration(auth.user_id, offering_id).await?;

    if deleted == 0 {
        return Err(ApiError::NotFound("Registration not found".to_string()));
    }

    info!(
        student_id = %auth.user_id,
        offering_id = %offering_id,
        "Course registration cancelled"
    );

    Ok((
        StatusCode::OK,
        Json(CancelRegistrationResponse {
            message: "Registration cancelled".to_string(),
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ListOfferingsParams {
    pub semester_id: Option<Uuid>,
}

/// GET /api/v1/courses/offerings[?semester_id]
///
/// List offerings with live registration counts. Without an explicit
/// semester the active one is used; with no active semester the list is
/// empty rather than an error.
pub async fn list_offerings(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<ListOfferingsParams>,
) -> Result<impl IntoResponse, ApiError> {
    let semester_id = match params.semester_id {
        Some(id) => Some(id),
        None => SemesterRepository::new(state.pool.clone())
            .find_active()
            .await?
            .map(|s| s.id),
    };

    let offerings: Vec<OfferingSummary> = match semester_id {
        Some(id) => CourseRepository::new(state.pool.clone())
            .list_offerings(id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect(),
        None => Vec::new(),
    };

    Ok((StatusCode::OK, Json(offerings)))
}

/// GET /api/v1/courses/my-registrations
pub async fn my_registrations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    ensure(auth.role, Capability::ViewOwnRegistrations)?;

    let registrations: Vec<RegistrationDetail> = CourseRepository::new(state.pool.clone())
        .list_registrations_for_student(auth.user_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok((StatusCode::OK, Json(registrations)))
}
