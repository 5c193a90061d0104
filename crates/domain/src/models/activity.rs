//! Activity and activity-registration domain models.
//!
//! Registrations move through `Pending` -> `Approved` ->
//! `ParticipationConfirmed`. There is no rejected state; a registration that
//! is never approved simply stays pending. Confirmation is terminal and is
//! the only transition that pays out a reward.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Derived activity status, computed from the clock at read time, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    Upcoming,
    Ongoing,
    Ended,
}

/// An activity students can register for, with a reward paid on confirmed
/// participation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Activity {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Cap on *approved* registrations; sign-ups themselves are uncapped.
    pub max_participants: i32,
    pub reward_coin: i64,
    pub auto_approve: bool,
    pub created_at: DateTime<Utc>,
}

impl Activity {
    /// Status as a pure function of (now, start_time, end_time).
    pub fn status_at(&self, now: DateTime<Utc>) -> ActivityStatus {
        if now < self.start_time {
            ActivityStatus::Upcoming
        } else if now <= self.end_time {
            ActivityStatus::Ongoing
        } else {
            ActivityStatus::Ended
        }
    }
}

/// Progress of a registration through the approval state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationState {
    Pending,
    Approved,
    ParticipationConfirmed,
}

/// A student's registration for an activity, keyed on (activity, student).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ActivityRegistration {
    pub activity_id: Uuid,
    pub student_id: Uuid,
    pub registered_at: DateTime<Utc>,
    pub is_approved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    pub is_participation_confirmed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participation_confirmed_at: Option<DateTime<Utc>>,
}

impl ActivityRegistration {
    pub fn state(&self) -> RegistrationState {
        if self.is_participation_confirmed {
            RegistrationState::ParticipationConfirmed
        } else if self.is_approved {
            RegistrationState::Approved
        } else {
            RegistrationState::Pending
        }
    }
}

/// An activity with registration counts and its derived status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ActivitySummary {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_participants: i32,
    pub reward_coin: i64,
    pub auto_approve: bool,
    pub status: ActivityStatus,
    pub registered_count: i64,
    pub approved_count: i64,
}

/// Request to create an activity (admin).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
#[validate(schema(function = "validate_activity_window"))]
pub struct CreateActivityRequest {
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub name: String,
    #[validate(length(max = 2000, message = "description must be at most 2000 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[validate(range(min = 1, max = 10000, message = "max_participants must be 1-10000"))]
    pub max_participants: i32,
    #[validate(range(min = 0, message = "reward_coin must be non-negative"))]
    pub reward_coin: i64,
    #[serde(default)]
    pub auto_approve: bool,
}

fn validate_activity_window(
    request: &CreateActivityRequest,
) -> Result<(), validator::ValidationError> {
    if request.start_time < request.end_time {
        Ok(())
    } else {
        let mut err = validator::ValidationError::new("activity_window");
        err.message = Some("start_time must be before end_time".into());
        Err(err)
    }
}

/// Response for a successful activity registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ActivityRegistrationResponse {
    pub message: String,
    pub data: ActivityRegistration,
}

/// Response for approve / confirm-participation actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ParticipationActionResponse {
    pub message: String,
    pub data: ActivityRegistration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn activity(start_offset_mins: i64, end_offset_mins: i64) -> Activity {
        let now = Utc::now();
        Activity {
            id: Uuid::new_v4(),
            name: "Blood Donation Day".to_string(),
            description: None,
            start_time: now + Duration::minutes(start_offset_mins),
            end_time: now + Duration::minutes(end_offset_mins),
            max_participants: 100,
            reward_coin: 50,
            auto_approve: false,
            created_at: now,
        }
    }

    #[test]
    fn test_status_upcoming() {
        let a = activity(60, 120);
        assert_eq!(a.status_at(Utc::now()), ActivityStatus::Upcoming);
    }

    #[test]
    fn test_status_ongoing() {
        let a = activity(-30, 30);
        assert_eq!(a.status_at(Utc::now()), ActivityStatus::Ongoing);
    }

    #[test]
    fn test_status_ended() {
        let a = activity(-120, -60);
        assert_eq!(a.status_at(Utc::now()), ActivityStatus::Ended);
    }

    #[test]
    fn test_status_boundaries() {
        let a = activity(0, 60);
        // Exactly at start_time counts as ongoing; just before does not.
        assert_eq!(a.status_at(a.start_time), ActivityStatus::Ongoing);
        assert_eq!(
            a.status_at(a.start_time - Duration::seconds(1)),
            ActivityStatus::Upcoming
        );
        // Exactly at end_time is still ongoing; just after is ended.
        assert_eq!(a.status_at(a.end_time), ActivityStatus::Ongoing);
        assert_eq!(
            a.status_at(a.end_time + Duration::seconds(1)),
            ActivityStatus::Ended
        );
    }

    fn registration(approved: bool, confirmed: bool) -> ActivityRegistration {
        let now = Utc::now();
        ActivityRegistration {
            activity_id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            registered_at: now,
            is_approved: approved,
            approved_at: approved.then_some(now),
            is_participation_confirmed: confirmed,
            participation_confirmed_at: confirmed.then_some(now),
        }
    }

    #[test]
    fn test_registration_state_progression() {
        assert_eq!(registration(false, false).state(), RegistrationState::Pending);
        assert_eq!(registration(true, false).state(), RegistrationState::Approved);
        assert_eq!(
            registration(true, true).state(),
            RegistrationState::ParticipationConfirmed
        );
    }

    #[test]
    fn test_create_activity_request_valid() {
        let now = Utc::now();
        let request = CreateActivityRequest {
            name: "Campus Cleanup".to_string(),
            description: Some("Bring gloves".to_string()),
            start_time: now + Duration::days(1),
            end_time: now + Duration::days(1) + Duration::hours(4),
            max_participants: 30,
            reward_coin: 20,
            auto_approve: true,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_activity_request_inverted_window() {
        let now = Utc::now();
        let request = CreateActivityRequest {
            name: "Campus Cleanup".to_string(),
            description: None,
            start_time: now + Duration::days(2),
            end_time: now + Duration::days(1),
            max_participants: 30,
            reward_coin: 20,
            auto_approve: false,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_activity_request_negative_reward() {
        let now = Utc::now();
        let request = CreateActivityRequest {
            name: "Campus Cleanup".to_string(),
            description: None,
            start_time: now,
            end_time: now + Duration::hours(2),
            max_participants: 30,
            reward_coin: -1,
            auto_approve: false,
        };
        assert!(request.validate().is_err());
    }
}
