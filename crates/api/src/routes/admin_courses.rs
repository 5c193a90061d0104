//! Course administration routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::auth::AuthUser;
use domain::models::course::{CancelRegistrationResponse, CreateOfferingRequest};
use domain::models::{CourseOffering, UserRole};
use domain::services::access::{ensure, Capability};
use persistence::repositories::{CourseRepository, SemesterRepository, UserRepository};

/// POST /api/v1/admin/offerings
pub async fn create_offering(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateOfferingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ensure(auth.role, Capability::ManageCatalog)?;
    payload.validate()?;

    SemesterRepository::new(state.pool.clone())
        .find_by_id(payload.semester_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Semester not found".to_string()))?;

    let teacher = UserRepository::new(state.pool.clone())
        .find_by_id(payload.teacher_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Teacher not found".to_string()))?;
    if teacher.role.parse::<UserRole>().ok() != Some(UserRole::Teacher) {
        return Err(ApiError::Validation(
            "Assigned user is not a teacher".to_string(),
        ));
    }

    let offering: CourseOffering = CourseRepository::new(state.pool.clone())
        .create_offering(
            &payload.code,
            &payload.course_name,
            payload.semester_id,
            payload.teacher_id,
            payload.capacity,
            payload.day_of_week,
            payload.period,
            &payload.room,
        )
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                ApiError::Conflict("An offering with this code already exists".to_string())
            }
            _ => e.into(),
        })?
        .into();

    info!(
        offering_id = %offering.id,
        code = %offering.code,
        capacity = offering.capacity,
        "Course offering created"
    );

    Ok((StatusCode::CREATED, Json(offering)))
}

/// DELETE /api/v1/admin/courses/{offering_id}/registrations/{student_code}
///
/// Staff-side cancellation of any student's registration.
pub async fn remove_registration(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((offering_id, student_code)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, ApiError> {
    ensure(auth.role, Capability::ManageRegistrations)?;

    let student = UserRepository::new(state.pool.clone())
        .find_by_student_code(&student_code)
        .await?
        .ok_or_else(|| ApiError::NotFound("Student not found".to_string()))?;

    let deleted = CourseRepository::new(state.pool.clone())
        .cancel_registration(student.id, offering_id)
        .await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("Registration not found".to_string()));
    }

    info!(
        offering_id = %offering_id,
        student_code = %student_code,
        removed_by = %auth.user_id,
        "Course registration removed by staff"
    );

    Ok((
        StatusCode::OK,
        Json(CancelRegistrationResponse {
            message: "Registration cancelled".to_string(),
        }),
    ))
}
