//! Activity administration routes: creation, rosters, approval and
//! participation confirmation.
//!
//! Confirmation is the only operation that pays a reward. The repository
//! commits the confirmation together with a pending transaction log; the
//! handler then settles that log against the ledger best effort, so a
//! ledger outage delays the payout but never blocks or unwinds the
//! confirmation.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::auth::AuthUser;
use crate::services::reward::RewardService;
use domain::models::activity::{CreateActivityRequest, ParticipationActionResponse};
use domain::models::{Activity, ActivityRegistration};
use domain::services::access::{ensure, Capability};
use persistence::entities::ParticipantEntity;
use persistence::repositories::{ActivityRepository, ApprovalOutcome, ConfirmOutcome};

/// POST /api/v1/admin/activities
pub async fn create_activity(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateActivityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ensure(auth.role, Capability::ManageCatalog)?;
    payload.validate()?;

    let activity: Activity = ActivityRepository::new(state.pool.clone())
        .create(
            &payload.name,
            payload.description.as_deref(),
            payload.start_time,
            payload.end_time,
            payload.max_participants,
            payload.reward_coin,
            payload.auto_approve,
        )
        .await?
        .into();

    info!(
        activity_id = %activity.id,
        name = %activity.name,
        reward_coin = activity.reward_coin,
        auto_approve = activity.auto_approve,
        "Activity created"
    );

    Ok((StatusCode::CREATED, Json(activity)))
}

/// Roster entry for staff: registration state plus student identity.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ParticipantResponse {
    pub student_id: Uuid,
    pub student_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_code: Option<String>,
    #[serde(flatten)]
    pub registration: ActivityRegistration,
}

impl From<ParticipantEntity> for ParticipantResponse {
    fn from(entity: ParticipantEntity) -> Self {
        ParticipantResponse {
            student_id: entity.student_id,
            student_name: entity.student_name,
            student_code: entity.student_code,
            registration: ActivityRegistration {
                activity_id: entity.activity_id,
                student_id: entity.student_id,
                registered_at: entity.registered_at,
                is_approved: entity.is_approved,
                approved_at: entity.approved_at,
                is_participation_confirmed: entity.is_participation_confirmed,
                participation_confirmed_at: entity.participation_confirmed_at,
            },
        }
    }
}

/// GET /api/v1/admin/activities/{activity_id}/participants
pub async fn list_participants(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(activity_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    ensure(auth.role, Capability::ManageRegistrations)?;

    let repo = ActivityRepository::new(state.pool.clone());
    repo.find_by_id(activity_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Activity not found".to_string()))?;

    let participants: Vec<ParticipantResponse> = repo
        .list_participants(activity_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok((StatusCode::OK, Json(participants)))
}

/// POST /api/v1/admin/activities/{activity_id}/approve/{student_code}
///
/// Approve a pending registration. The approved count is re-checked under
/// the activity row lock, so approvals can never exceed max_participants.
/// Approving twice is idempotent.
pub async fn approve_participant(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((activity_id, student_code)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, ApiError> {
    ensure(auth.role, Capability::ApproveParticipation)?;
    shared::validation::validate_student_code(&student_code)
        .map_err(|e| ApiError::Validation(e.message.unwrap_or_default().to_string()))?;

    let repo = ActivityRepository::new(state.pool.clone());
    repo.find_by_id(activity_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Activity not found".to_string()))?;

    match repo.approve(activity_id, &student_code).await? {
        ApprovalOutcome::Approved(registration) => {
            info!(
                activity_id = %activity_id,
                student_code = %student_code,
                approved_by = %auth.user_id,
                "Activity registration approved"
            );
            Ok((
                StatusCode::OK,
                Json(ParticipationActionResponse {
                    message: "Registration approved".to_string(),
                    data: registration.into(),
                }),
            ))
        }
        ApprovalOutcome::AlreadyApproved(registration) => Ok((
            StatusCode::OK,
            Json(ParticipationActionResponse {
                message: "Registration was already approved".to_string(),
                data: registration.into(),
            }),
        )),
        ApprovalOutcome::CapacityReached => Err(ApiError::Conflict(
            "Activity has reached its participant cap".to_string(),
        )),
        ApprovalOutcome::NotFound => {
            Err(ApiError::NotFound("Registration not found".to_string()))
        }
    }
}

/// POST /api/v1/admin/activities/{activity_id}/confirm-participation/{student_code}
///
/// Confirm participation and dispatch the reward. Confirming an unapproved
/// registration fails; confirming twice reports success without a second
/// reward.
pub async fn confirm_participation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((activity_id, student_code)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, ApiError> {
    ensure(auth.role, Capability::ConfirmParticipation)?;
    shared::validation::validate_student_code(&student_code)
        .map_err(|e| ApiError::Validation(e.message.unwrap_or_default().to_string()))?;

    let repo = ActivityRepository::new(state.pool.clone());
    repo.find_by_id(activity_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Activity not found".to_string()))?;

    match repo.confirm_participation(activity_id, &student_code).await? {
        ConfirmOutcome::Confirmed {
            registration,
            reward,
        } => {
            info!(
                activity_id = %activity_id,
                student_code = %student_code,
                confirmed_by = %auth.user_id,
                reward_promised = reward.is_some(),
                "Participation confirmed"
            );

            let message = match reward {
                Some(log) => {
                    let settled = RewardService::new(state.pool.clone(), state.ledger.clone())
                        .settle(&log)
                        .await;
                    if settled {
                        format!("Participation confirmed, {} coin rewarded", log.amount)
                    } else {
                        // The pending log stays behind for the reconciliation job
                        format!(
                            "Participation confirmed, {} coin reward queued",
                            log.amount
                        )
                    }
                }
                None => "Participation confirmed".to_string(),
            };

            Ok((
                StatusCode::OK,
                Json(ParticipationActionResponse {
                    message,
                    data: registration.into(),
                }),
            ))
        }
        ConfirmOutcome::AlreadyConfirmed(registration) => Ok((
            StatusCode::OK,
            Json(ParticipationActionResponse {
                message: "Participation was already confirmed".to_string(),
                data: registration.into(),
            }),
        )),
        ConfirmOutcome::NotApproved => Err(ApiError::Conflict(
            "Registration has not been approved".to_string(),
        )),
        ConfirmOutcome::NotFound => {
            Err(ApiError::NotFound("Registration not found".to_string()))
        }
    }
}
