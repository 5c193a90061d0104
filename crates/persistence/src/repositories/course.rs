//! Course offering and registration repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{
    CourseOfferingEntity, CourseRegistrationEntity, OfferingSummaryEntity,
    RegistrationDetailEntity,
};
use crate::metrics::QueryTimer;

/// Outcome of a registration attempt, resolved under the offering row lock.
#[derive(Debug)]
pub enum RegisterOutcome {
    Registered(CourseRegistrationEntity),
    AlreadyRegistered,
    Full,
}

/// Repository for course offerings and registrations.
#[derive(Clone)]
pub struct CourseRepository {
    pool: PgPool,
}

impl CourseRepository {
    /// Creates a new CourseRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a course offering. A duplicate code surfaces as a unique
    /// violation.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_offering(
        &self,
        code: &str,
        course_name: &str,
        semester_id: Uuid,
        teacher_id: Uuid,
        capacity: i32,
        day_of_week: i16,
        period: i16,
        room: &str,
    ) -> Result<CourseOfferingEntity, sqlx::Error> {
        sqlx::query_as::<_, CourseOfferingEntity>(
            r#"
            INSERT INTO course_offerings (code, course_name, semester_id, teacher_id, capacity, day_of_week, period, room)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, code, course_name, semester_id, teacher_id, capacity, day_of_week, period, room, created_at
            "#,
        )
        .bind(code)
        .bind(course_name)
        .bind(semester_id)
        .bind(teacher_id)
        .bind(capacity)
        .bind(day_of_week)
        .bind(period)
        .bind(room)
        .fetch_one(&self.pool)
        .await
    }

    /// Find an offering by its code.
    pub async fn find_offering_by_code(
        &self,
        code: &str,
    ) -> Result<Option<CourseOfferingEntity>, sqlx::Error> {
        sqlx::query_as::<_, CourseOfferingEntity>(
            r#"
            SELECT id, code, course_name, semester_id, teacher_id, capacity,
                   day_of_week, period, room, created_at
            FROM course_offerings
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
    }

    /// Find an offering by id.
    pub async fn find_offering_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<CourseOfferingEntity>, sqlx::Error> {
        sqlx::query_as::<_, CourseOfferingEntity>(
            r#"
            SELECT id, code, course_name, semester_id, teacher_id, capacity,
                   day_of_week, period, room, created_at
            FROM course_offerings
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// List offerings for a semester with teacher names and live registration
    /// counts, ordered by code.
    pub async fn list_offerings(
        &self,
        semester_id: Uuid,
    ) -> Result<Vec<OfferingSummaryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_offerings");
        let result = sqlx::query_as::<_, OfferingSummaryEntity>(
            r#"
            SELECT o.id, o.code, o.course_name, o.semester_id,
                   u.full_name AS teacher_name,
                   o.capacity,
                   COUNT(r.id) AS registered_count,
                   o.day_of_week, o.period, o.room
            FROM course_offerings o
            JOIN users u ON u.id = o.teacher_id
            LEFT JOIN course_registrations r ON r.offering_id = o.id
            WHERE o.semester_id = $1
            GROUP BY o.id, u.full_name
            ORDER BY o.code
            "#,
        )
        .bind(semester_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Register a student into an offering, serialized per offering.
    ///
    /// The transaction takes `SELECT ... FOR UPDATE` on the offering row
    /// before the duplicate and capacity checks, so two concurrent requests
    /// for the last slot cannot both pass. The UNIQUE constraint on
    /// (student_id, offering_id) backstops duplicates. Returns
    /// `sqlx::Error::RowNotFound` when the offering id does not exist.
    pub async fn register_student(
        &self,
        student_id: Uuid,
        offering_id: Uuid,
    ) -> Result<RegisterOutcome, sqlx::Error> {
        let timer = QueryTimer::new("register_student");
        let mut tx = self.pool.begin().await?;

        let capacity: (i32,) = sqlx::query_as(
            r#"
            SELECT capacity
            FROM course_offerings
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(offering_id)
        .fetch_one(&mut *tx)
        .await?;

        // Duplicate check before the capacity check: an already-registered
        // student on a full offering still gets "already registered".
        let existing: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM course_registrations
            WHERE student_id = $1 AND offering_id = $2
            "#,
        )
        .bind(student_id)
        .bind(offering_id)
        .fetch_one(&mut *tx)
        .await?;
        if existing.0 > 0 {
            tx.rollback().await?;
            timer.record();
            return Ok(RegisterOutcome::AlreadyRegistered);
        }

        let registered: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM course_registrations
            WHERE offering_id = $1
            "#,
        )
        .bind(offering_id)
        .fetch_one(&mut *tx)
        .await?;

        if registered.0 >= capacity.0 as i64 {
            tx.rollback().await?;
            timer.record();
            return Ok(RegisterOutcome::Full);
        }

        let registration = sqlx::query_as::<_, CourseRegistrationEntity>(
            r#"
            INSERT INTO course_registrations (student_id, offering_id)
            VALUES ($1, $2)
            RETURNING id, student_id, offering_id, registered_at
            "#,
        )
        .bind(student_id)
        .bind(offering_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(RegisterOutcome::Registered(registration))
    }

    /// Find a student's registration for an offering.
    pub async fn find_registration(
        &self,
        student_id: Uuid,
        offering_id: Uuid,
    ) -> Result<Option<CourseRegistrationEntity>, sqlx::Error> {
        sqlx::query_as::<_, CourseRegistrationEntity>(
            r#"
            SELECT id, student_id, offering_id, registered_at
            FROM course_registrations
            WHERE student_id = $1 AND offering_id = $2
            "#,
        )
        .bind(student_id)
        .bind(offering_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Delete a student's registration for an offering.
    /// Returns the number of rows affected (0 if none existed).
    pub async fn cancel_registration(
        &self,
        student_id: Uuid,
        offering_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM course_registrations
            WHERE student_id = $1 AND offering_id = $2
            "#,
        )
        .bind(student_id)
        .bind(offering_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// List a student's registrations with offering details, newest first.
    pub async fn list_registrations_for_student(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<RegistrationDetailEntity>, sqlx::Error> {
        sqlx::query_as::<_, RegistrationDetailEntity>(
            r#"
            SELECT r.id, r.offering_id, o.code AS offering_code, o.course_name,
                   u.full_name AS teacher_name, o.day_of_week, o.period, o.room,
                   r.registered_at
            FROM course_registrations r
            JOIN course_offerings o ON o.id = r.offering_id
            JOIN users u ON u.id = o.teacher_id
            WHERE r.student_id = $1
            ORDER BY r.registered_at DESC
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Count registrations for one offering.
    pub async fn count_registrations(&self, offering_id: Uuid) -> Result<i64, sqlx::Error> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM course_registrations
            WHERE offering_id = $1
            "#,
        )
        .bind(offering_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count.0)
    }
}
