//! Semester domain model.
//!
//! A semester is identified by its (name, school_year) pair; at most one
//! semester is active at any time. Activation is handled transactionally in
//! the persistence layer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Semester domain model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Semester {
    pub id: Uuid,
    pub name: String,
    pub school_year: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Request to create a new semester.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
#[validate(schema(function = "validate_semester_dates"))]
pub struct CreateSemesterRequest {
    #[validate(length(min = 1, max = 50, message = "name must be 1-50 characters"))]
    pub name: String,
    #[validate(custom(function = "shared::validation::validate_school_year"))]
    pub school_year: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

fn validate_semester_dates(
    request: &CreateSemesterRequest,
) -> Result<(), validator::ValidationError> {
    shared::validation::validate_date_range(request.start_date, request.end_date)
}

/// Response format for a semester.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SemesterResponse {
    pub id: Uuid,
    pub name: String,
    pub school_year: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Semester> for SemesterResponse {
    fn from(semester: Semester) -> Self {
        Self {
            id: semester.id,
            name: semester.name,
            school_year: semester.school_year,
            start_date: semester.start_date,
            end_date: semester.end_date,
            is_active: semester.is_active,
            created_at: semester.created_at,
        }
    }
}
