//! Semester entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the semesters table.
#[derive(Debug, Clone, FromRow)]
pub struct SemesterEntity {
    pub id: Uuid,
    pub name: String,
    pub school_year: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<SemesterEntity> for domain::models::Semester {
    fn from(entity: SemesterEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            school_year: entity.school_year,
            start_date: entity.start_date,
            end_date: entity.end_date,
            is_active: entity.is_active,
            created_at: entity.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semester_entity_to_domain() {
        let entity = SemesterEntity {
            id: Uuid::new_v4(),
            name: "Fall".to_string(),
            school_year: "2025-2026".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 20).unwrap(),
            is_active: true,
            created_at: Utc::now(),
        };
        let semester: domain::models::Semester = entity.clone().into();
        assert_eq!(semester.id, entity.id);
        assert_eq!(semester.school_year, "2025-2026");
        assert!(semester.is_active);
    }
}
