//! Activity listing and registration routes for students.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::auth::AuthUser;
use crate::middleware::metrics::record_activity_registration;
use domain::models::activity::{ActivityRegistrationResponse, ActivitySummary};
use domain::models::Activity;
use domain::services::access::{ensure, Capability};
use persistence::repositories::{ActivityRegisterOutcome, ActivityRepository};

/// GET /api/v1/activities
///
/// List all activities with their registration counts and the status
/// derived from the clock at read time.
pub async fn list_activities(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let now = Utc::now();
    let activities: Vec<ActivitySummary> = ActivityRepository::new(state.pool.clone())
        .list_with_counts()
        .await?
        .into_iter()
        .map(|entity| {
            let activity = Activity {
                id: entity.id,
                name: entity.name,
                description: entity.description,
                start_time: entity.start_time,
                end_time: entity.end_time,
                max_participants: entity.max_participants,
                reward_coin: entity.reward_coin,
                auto_approve: entity.auto_approve,
                created_at: entity.created_at,
            };
            let status = activity.status_at(now);
            ActivitySummary {
                id: activity.id,
                name: activity.name,
                description: activity.description,
                start_time: activity.start_time,
                end_time: activity.end_time,
                max_participants: activity.max_participants,
                reward_coin: activity.reward_coin,
                auto_approve: activity.auto_approve,
                status,
                registered_count: entity.registered_count,
                approved_count: entity.approved_count,
            }
        })
        .collect();

    Ok((StatusCode::OK, Json(activities)))
}

/// POST /api/v1/activities/{activity_id}/register
///
/// Register the authenticated student for an activity. Sign-ups are
/// uncapped for manual-approval activities; for auto-approve activities
/// approval happens here, so the approved cap binds immediately.
pub async fn register(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(activity_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    ensure(auth.role, Capability::RegisterActivity)?;

    let repo = ActivityRepository::new(state.pool.clone());

    let activity = repo
        .find_by_id(activity_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Activity not found".to_string()))?;

    match repo.register_student(activity_id, auth.user_id).await? {
        ActivityRegisterOutcome::Registered(registration) => {
            record_activity_registration();
            info!(
                student_id = %auth.user_id,
                activity_id = %activity_id,
                auto_approved = registration.is_approved,
                "Student registered for activity"
            );
            let message = if registration.is_approved {
                format!("Registered and approved for {}", activity.name)
            } else {
                format!("Registered for {}, awaiting approval", activity.name)
            };
            Ok((
                StatusCode::OK,
                Json(ActivityRegistrationResponse {
                    message,
                    data: registration.into(),
                }),
            ))
        }
        ActivityRegisterOutcome::AlreadyRegistered => Err(ApiError::Conflict(
            "Already registered for this activity".to_string(),
        )),
        ActivityRegisterOutcome::Full => {
            Err(ApiError::Conflict("Activity is full".to_string()))
        }
    }
}
