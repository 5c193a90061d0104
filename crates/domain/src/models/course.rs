//! Course offering and registration domain models.
//!
//! An offering is a scheduled instance of a course within a semester, with a
//! teacher, a capacity, and a weekly day/period/room slot. Registrations link
//! one student to one offering; at most one registration per (student,
//! offering) pair, enforced by a unique index.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A scheduled instance of a course within a semester.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CourseOffering {
    pub id: Uuid,
    pub code: String,
    pub course_name: String,
    pub semester_id: Uuid,
    pub teacher_id: Uuid,
    pub capacity: i32,
    /// ISO weekday, 1 = Monday through 7 = Sunday.
    pub day_of_week: i16,
    pub period: i16,
    pub room: String,
    pub created_at: DateTime<Utc>,
}

/// A student's registration into an offering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CourseRegistration {
    pub id: Uuid,
    pub student_id: Uuid,
    pub offering_id: Uuid,
    pub registered_at: DateTime<Utc>,
}

/// An offering with its live enrollment count, for the available-offerings list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OfferingSummary {
    pub id: Uuid,
    pub code: String,
    pub course_name: String,
    pub semester_id: Uuid,
    pub teacher_name: String,
    pub capacity: i32,
    pub registered_count: i64,
    pub day_of_week: i16,
    pub period: i16,
    pub room: String,
}

impl OfferingSummary {
    /// Remaining open slots, never negative.
    pub fn remaining_slots(&self) -> i64 {
        (self.capacity as i64 - self.registered_count).max(0)
    }

    pub fn is_full(&self) -> bool {
        self.registered_count >= self.capacity as i64
    }
}

/// A registration joined with its offering details, for my-registrations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RegistrationDetail {
    pub id: Uuid,
    pub offering_id: Uuid,
    pub offering_code: String,
    pub course_name: String,
    pub teacher_name: String,
    pub day_of_week: i16,
    pub period: i16,
    pub room: String,
    pub registered_at: DateTime<Utc>,
}

/// Request to register for a course offering.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct RegisterCourseRequest {
    #[validate(custom(function = "shared::validation::validate_offering_code"))]
    pub offering_code: String,
}

/// Response for a successful course registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RegisterCourseResponse {
    pub message: String,
    pub data: CourseRegistration,
}

/// Response for a successful cancellation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CancelRegistrationResponse {
    pub message: String,
}

/// Request to create a course offering (admin).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateOfferingRequest {
    #[validate(custom(function = "shared::validation::validate_offering_code"))]
    pub code: String,
    #[validate(length(min = 1, max = 200, message = "course_name must be 1-200 characters"))]
    pub course_name: String,
    pub semester_id: Uuid,
    pub teacher_id: Uuid,
    #[validate(range(min = 1, max = 500, message = "capacity must be between 1 and 500"))]
    pub capacity: i32,
    #[validate(range(min = 1, max = 7, message = "day_of_week must be between 1 and 7"))]
    pub day_of_week: i16,
    #[validate(range(min = 1, max = 12, message = "period must be between 1 and 12"))]
    pub period: i16,
    #[validate(length(min = 1, max = 50, message = "room must be 1-50 characters"))]
    pub room: String,
}
