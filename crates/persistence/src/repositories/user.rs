//! User repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::UserEntity;

/// Repository for user-related database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserEntity>, sqlx::Error> {
        sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, full_name, email, role, student_code, teacher_code,
                   major_id, date_of_birth, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Find a user by email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, sqlx::Error> {
        sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, full_name, email, role, student_code, teacher_code,
                   major_id, date_of_birth, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    /// Find a student by their student code.
    pub async fn find_by_student_code(
        &self,
        student_code: &str,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, full_name, email, role, student_code, teacher_code,
                   major_id, date_of_birth, created_at
            FROM users
            WHERE student_code = $1
            "#,
        )
        .bind(student_code)
        .fetch_optional(&self.pool)
        .await
    }

    /// Create a user. Role is stored as lowercase text.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        full_name: &str,
        email: &str,
        role: &str,
        student_code: Option<&str>,
        teacher_code: Option<&str>,
        major_id: Option<Uuid>,
        date_of_birth: Option<chrono::NaiveDate>,
    ) -> Result<UserEntity, sqlx::Error> {
        sqlx::query_as::<_, UserEntity>(
            r#"
            INSERT INTO users (full_name, email, role, student_code, teacher_code, major_id, date_of_birth)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, full_name, email, role, student_code, teacher_code,
                      major_id, date_of_birth, created_at
            "#,
        )
        .bind(full_name)
        .bind(email)
        .bind(role)
        .bind(student_code)
        .bind(teacher_code)
        .bind(major_id)
        .bind(date_of_birth)
        .fetch_one(&self.pool)
        .await
    }

    /// Count users holding the student role.
    pub async fn count_students(&self) -> Result<i64, sqlx::Error> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) as count
            FROM users
            WHERE role = 'student'
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count.0)
    }
}
