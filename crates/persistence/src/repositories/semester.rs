//! Semester repository for database operations.

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::SemesterEntity;

/// Repository for semester-related database operations.
#[derive(Clone)]
pub struct SemesterRepository {
    pool: PgPool,
}

impl SemesterRepository {
    /// Creates a new SemesterRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a semester. New semesters always start inactive.
    /// A duplicate (name, school_year) pair surfaces as a unique violation.
    pub async fn create(
        &self,
        name: &str,
        school_year: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<SemesterEntity, sqlx::Error> {
        sqlx::query_as::<_, SemesterEntity>(
            r#"
            INSERT INTO semesters (name, school_year, start_date, end_date, is_active)
            VALUES ($1, $2, $3, $4, false)
            RETURNING id, name, school_year, start_date, end_date, is_active, created_at
            "#,
        )
        .bind(name)
        .bind(school_year)
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&self.pool)
        .await
    }

    /// Find a semester by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<SemesterEntity>, sqlx::Error> {
        sqlx::query_as::<_, SemesterEntity>(
            r#"
            SELECT id, name, school_year, start_date, end_date, is_active, created_at
            FROM semesters
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Find the currently active semester, if any.
    pub async fn find_active(&self) -> Result<Option<SemesterEntity>, sqlx::Error> {
        sqlx::query_as::<_, SemesterEntity>(
            r#"
            SELECT id, name, school_year, start_date, end_date, is_active, created_at
            FROM semesters
            WHERE is_active = true
            "#,
        )
        .fetch_optional(&self.pool)
        .await
    }

    /// List all semesters, newest school year first.
    pub async fn list(&self) -> Result<Vec<SemesterEntity>, sqlx::Error> {
        sqlx::query_as::<_, SemesterEntity>(
            r#"
            SELECT id, name, school_year, start_date, end_date, is_active, created_at
            FROM semesters
            ORDER BY school_year DESC, start_date DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    /// Activate a semester, deactivating whichever one was active before.
    ///
    /// Both updates run in one transaction so there is never a moment with
    /// two active semesters. Returns the activated row, or None when the id
    /// does not exist.
    pub async fn activate(&self, id: Uuid) -> Result<Option<SemesterEntity>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE semesters
            SET is_active = false
            WHERE is_active = true AND id <> $1
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let activated = sqlx::query_as::<_, SemesterEntity>(
            r#"
            UPDATE semesters
            SET is_active = true
            WHERE id = $1
            RETURNING id, name, school_year, start_date, end_date, is_active, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        if activated.is_some() {
            tx.commit().await?;
        } else {
            tx.rollback().await?;
        }
        Ok(activated)
    }
}
