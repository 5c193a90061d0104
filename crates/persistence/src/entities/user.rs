//! User entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub student_code: Option<String>,
    pub teacher_code: Option<String>,
    pub major_id: Option<Uuid>,
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl From<UserEntity> for domain::models::User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            full_name: entity.full_name,
            email: entity.email,
            role: domain::models::UserRole::from_str(&entity.role)
                .unwrap_or(domain::models::UserRole::Student), // Default fallback
            student_code: entity.student_code,
            teacher_code: entity.teacher_code,
            major_id: entity.major_id,
            date_of_birth: entity.date_of_birth,
            created_at: entity.created_at,
        }
    }
}
