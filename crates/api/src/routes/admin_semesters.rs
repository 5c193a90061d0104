//! Semester administration routes.

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
use domain::models::semester::{CreateSemesterRequest, SemesterResponse};
use domain::services::access::{ensure, Capability};
use persistence::repositories::SemesterRepository;

/// POST /api/v1/admin/semesters
pub async fn create_semester(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateSemesterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ensure(auth.role, Capability::ManageSemesters)?;
    payload.validate()?;

    let semester = SemesterRepository::new(state.pool.clone())
        .create(
            &payload.name,
            &payload.school_year,
            payload.start_date,
            payload.end_date,
        )
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                ApiError::Conflict(format!(
                    "Semester {} already exists for {}",
                    payload.name, payload.school_year
                ))
            }
            _ => e.into(),
        })?;

    info!(
        semester_id = %semester.id,
        name = %semester.name,
        school_year = %semester.school_year,
        "Semester created"
    );

    Ok((
        StatusCode::CREATED,
        Json(SemesterResponse::from(domain::models::Semester::from(
            semester,
        ))),
    ))
}

/// GET /api/v1/admin/semesters
pub async fn list_semesters(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    ensure(auth.role, Capability::ManageSemesters)?;

    let semesters: Vec<SemesterResponse> = SemesterRepository::new(state.pool.clone())
        .list()
        .await?
        .into_iter()
        .map(|s| SemesterResponse::from(domain::models::Semester::from(s)))
        .collect();

    Ok((StatusCode::OK, Json(semesters)))
}

/// POST /api/v1/admin/semesters/{semester_id}/activate
///
/// Activate a semester. Whichever semester was active before is deactivated
/// in the same transaction, so exactly one semester is active afterwards.
pub async fn activate_semester(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(semester_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    ensure(auth.role, Capability::ManageSemesters)?;

    let activated = SemesterRepository::new(state.pool.clone())
        .activate(semester_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Semester not found".to_string()))?;

    info!(
        semester_id = %semester_id,
        name = %activated.name,
        school_year = %activated.school_year,
        "Semester activated"
    );

    Ok((
        StatusCode::OK,
        Json(SemesterResponse::from(domain::models::Semester::from(
            activated,
        ))),
    ))
}
