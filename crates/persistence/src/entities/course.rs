//! Course offering and registration entities (database row mappings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the course_offerings table.
#[derive(Debug, Clone, FromRow)]
pub struct CourseOfferingEntity {
    pub id: Uuid,
    pub code: String,
    pub course_name: String,
    pub semester_id: Uuid,
    pub teacher_id: Uuid,
    pub capacity: i32,
    pub day_of_week: i16,
    pub period: i16,
    pub room: String,
    pub created_at: DateTime<Utc>,
}

impl From<CourseOfferingEntity> for domain::models::CourseOffering {
    fn from(entity: CourseOfferingEntity) -> Self {
        Self {
            id: entity.id,
            code: entity.code,
            course_name: entity.course_name,
            semester_id: entity.semester_id,
            teacher_id: entity.teacher_id,
            capacity: entity.capacity,
            day_of_week: entity.day_of_week,
            period: entity.period,
            room: entity.room,
            created_at: entity.created_at,
        }
    }
}

/// Offering row joined with its registered count and teacher name for listings.
#[derive(Debug, Clone, FromRow)]
pub struct OfferingSummaryEntity {
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

impl From<OfferingSummaryEntity> for domain::models::OfferingSummary {
    fn from(entity: OfferingSummaryEntity) -> Self {
        Self {
            id: entity.id,
            code: entity.code,
            course_name: entity.course_name,
            semester_id: entity.semester_id,
            teacher_name: entity.teacher_name,
            capacity: entity.capacity,
            registered_count: entity.registered_count,
            day_of_week: entity.day_of_week,
            period: entity.period,
            room: entity.room,
        }
    }
}

/// Database row mapping for the course_registrations table.
#[derive(Debug, Clone, FromRow)]
pub struct CourseRegistrationEntity {
    pub id: Uuid,
    pub student_id: Uuid,
    pub offering_id: Uuid,
    pub registered_at: DateTime<Utc>,
}

impl From<CourseRegistrationEntity> for domain::models::CourseRegistration {
    fn from(entity: CourseRegistrationEntity) -> Self {
        Self {
            id: entity.id,
            student_id: entity.student_id,
            offering_id: entity.offering_id,
            registered_at: entity.registered_at,
        }
    }
}

/// Registration joined with its offering for a student's schedule view.
#[derive(Debug, Clone, FromRow)]
pub struct RegistrationDetailEntity {
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

impl From<RegistrationDetailEntity> for domain::models::course::RegistrationDetail {
    fn from(entity: RegistrationDetailEntity) -> Self {
        Self {
            id: entity.id,
            offering_id: entity.offering_id,
            offering_code: entity.offering_code,
            course_name: entity.course_name,
            teacher_name: entity.teacher_name,
            day_of_week: entity.day_of_week,
            period: entity.period,
            room: entity.room,
            registered_at: entity.registered_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offering_entity_to_domain() {
        let entity = CourseOfferingEntity {
            id: Uuid::new_v4(),
            code: "CS101-01".to_string(),
            course_name: "Intro to Programming".to_string(),
            semester_id: Uuid::new_v4(),
            teacher_id: Uuid::new_v4(),
            capacity: 40,
            day_of_week: 2,
            period: 3,
            room: "B2-104".to_string(),
            created_at: Utc::now(),
        };
        let offering: domain::models::CourseOffering = entity.clone().into();
        assert_eq!(offering.code, "CS101-01");
        assert_eq!(offering.capacity, 40);
    }

    #[test]
    fn test_summary_entity_to_domain() {
        let entity = OfferingSummaryEntity {
            id: Uuid::new_v4(),
            code: "MTH201-02".to_string(),
            course_name: "Linear Algebra".to_string(),
            semester_id: Uuid::new_v4(),
            teacher_name: "Dr. Pham".to_string(),
            capacity: 30,
            registered_count: 28,
            day_of_week: 4,
            period: 1,
            room: "A1-201".to_string(),
        };
        let summary: domain::models::OfferingSummary = entity.into();
        assert_eq!(summary.remaining_slots(), 2);
        assert!(!summary.is_full());
    }
}
