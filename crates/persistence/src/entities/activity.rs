//! Activity and activity-registration entities (database row mappings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the activities table.
#[derive(Debug, Clone, FromRow)]
pub struct ActivityEntity {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_participants: i32,
    pub reward_coin: i64,
    pub auto_approve: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ActivityEntity> for domain::models::Activity {
    fn from(entity: ActivityEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            start_time: entity.start_time,
            end_time: entity.end_time,
            max_participants: entity.max_participants,
            reward_coin: entity.reward_coin,
            auto_approve: entity.auto_approve,
            created_at: entity.created_at,
        }
    }
}

/// Activity row joined with registration counts for listings.
#[derive(Debug, Clone, FromRow)]
pub struct ActivityWithCountsEntity {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_participants: i32,
    pub reward_coin: i64,
    pub auto_approve: bool,
    pub created_at: DateTime<Utc>,
    pub registered_count: i64,
    pub approved_count: i64,
}

/// Database row mapping for the activity_registrations table.
///
/// The table has a composite primary key of (activity_id, student_id).
#[derive(Debug, Clone, FromRow)]
pub struct ActivityRegistrationEntity {
    pub activity_id: Uuid,
    pub student_id: Uuid,
    pub registered_at: DateTime<Utc>,
    pub is_approved: bool,
    pub approved_at: Option<DateTime<Utc>>,
    pub is_participation_confirmed: bool,
    pub participation_confirmed_at: Option<DateTime<Utc>>,
}

impl From<ActivityRegistrationEntity> for domain::models::ActivityRegistration {
    fn from(entity: ActivityRegistrationEntity) -> Self {
        Self {
            activity_id: entity.activity_id,
            student_id: entity.student_id,
            registered_at: entity.registered_at,
            is_approved: entity.is_approved,
            approved_at: entity.approved_at,
            is_participation_confirmed: entity.is_participation_confirmed,
            participation_confirmed_at: entity.participation_confirmed_at,
        }
    }
}

/// Registration joined with student details for staff rosters.
#[derive(Debug, Clone, FromRow)]
pub struct ParticipantEntity {
    pub activity_id: Uuid,
    pub student_id: Uuid,
    pub student_name: String,
    pub student_code: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub is_approved: bool,
    pub approved_at: Option<DateTime<Utc>>,
    pub is_participation_confirmed: bool,
    pub participation_confirmed_at: Option<DateTime<Utc>>,
}
