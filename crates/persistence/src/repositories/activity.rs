//! Activity and participation repository for database operations.
//!
//! Approval and confirmation are keyed by (activity_id, student_code)
//! because staff work from scanned student cards, not user ids.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{
    ActivityEntity, ActivityRegistrationEntity, ActivityWithCountsEntity, ParticipantEntity,
    TransactionLogEntity,
};
use crate::metrics::QueryTimer;

/// Outcome of an activity registration attempt.
#[derive(Debug)]
pub enum ActivityRegisterOutcome {
    Registered(ActivityRegistrationEntity),
    AlreadyRegistered,
    /// Auto-approve activity already at its approved cap.
    Full,
}

/// Outcome of an approval attempt, resolved under the activity row lock.
#[derive(Debug)]
pub enum ApprovalOutcome {
    Approved(ActivityRegistrationEntity),
    AlreadyApproved(ActivityRegistrationEntity),
    CapacityReached,
    NotFound,
}

/// Outcome of a participation confirmation attempt.
#[derive(Debug)]
pub enum ConfirmOutcome {
    /// Newly confirmed. When the activity carries a reward, `reward` is the
    /// pending transaction log row committed alongside the confirmation; the
    /// caller owes the student a ledger transfer for it.
    Confirmed {
        registration: ActivityRegistrationEntity,
        reward: Option<TransactionLogEntity>,
    },
    /// Confirmed earlier; no second reward.
    AlreadyConfirmed(ActivityRegistrationEntity),
    NotApproved,
    NotFound,
}

/// Repository for activities and activity registrations.
#[derive(Clone)]
pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    /// Creates a new ActivityRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an activity.
    pub async fn create(
        &self,
        name: &str,
        description: Option<&str>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        max_participants: i32,
        reward_coin: i64,
        auto_approve: bool,
    ) -> Result<ActivityEntity, sqlx::Error> {
        sqlx::query_as::<_, ActivityEntity>(
            r#"
            INSERT INTO activities (name, description, start_time, end_time, max_participants, reward_coin, auto_approve)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, description, start_time, end_time, max_participants, reward_coin, auto_approve, created_at
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(start_time)
        .bind(end_time)
        .bind(max_participants)
        .bind(reward_coin)
        .bind(auto_approve)
        .fetch_one(&self.pool)
        .await
    }

    /// Find an activity by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ActivityEntity>, sqlx::Error> {
        sqlx::query_as::<_, ActivityEntity>(
            r#"
            SELECT id, name, description, start_time, end_time, max_participants,
                   reward_coin, auto_approve, created_at
            FROM activities
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// List all activities with registered and approved counts, soonest first.
    pub async fn list_with_counts(&self) -> Result<Vec<ActivityWithCountsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_activities");
        let result = sqlx::query_as::<_, ActivityWithCountsEntity>(
            r#"
            SELECT a.id, a.name, a.description, a.start_time, a.end_time,
                   a.max_participants, a.reward_coin, a.auto_approve, a.created_at,
                   COUNT(r.student_id) AS registered_count,
                   COUNT(r.student_id) FILTER (WHERE r.is_approved) AS approved_count
            FROM activities a
            LEFT JOIN activity_registrations r ON r.activity_id = a.id
            GROUP BY a.id
            ORDER BY a.start_time
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Register a student for an activity.
    ///
    /// Registration itself is uncapped; the cap applies to approvals. For
    /// auto-approve activities approval happens here, so the approved count
    /// is checked under the activity row lock and the cap is enforced now.
    /// Returns `sqlx::Error::RowNotFound` when the activity does not exist.
    pub async fn register_student(
        &self,
        activity_id: Uuid,
        student_id: Uuid,
    ) -> Result<ActivityRegisterOutcome, sqlx::Error> {
        let timer = QueryTimer::new("register_activity");
        let mut tx = self.pool.begin().await?;

        let activity: (bool, i32) = sqlx::query_as(
            r#"
            SELECT auto_approve, max_participants
            FROM activities
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(activity_id)
        .fetch_one(&mut *tx)
        .await?;
        let (auto_approve, max_participants) = activity;

        let existing: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM activity_registrations
            WHERE activity_id = $1 AND student_id = $2
            "#,
        )
        .bind(activity_id)
        .bind(student_id)
        .fetch_one(&mut *tx)
        .await?;
        if existing.0 > 0 {
            tx.rollback().await?;
            timer.record();
            return Ok(ActivityRegisterOutcome::AlreadyRegistered);
        }

        if auto_approve {
            let approved: (i64,) = sqlx::query_as(
                r#"
                SELECT COUNT(*) FROM activity_registrations
                WHERE activity_id = $1 AND is_approved = true
                "#,
            )
            .bind(activity_id)
            .fetch_one(&mut *tx)
            .await?;
            if approved.0 >= max_participants as i64 {
                tx.rollback().await?;
                timer.record();
                return Ok(ActivityRegisterOutcome::Full);
            }
        }

        let registration = sqlx::query_as::<_, ActivityRegistrationEntity>(
            r#"
            INSERT INTO activity_registrations
                (activity_id, student_id, is_approved, approved_at)
            VALUES ($1, $2, $3, CASE WHEN $3 THEN now() ELSE NULL END)
            RETURNING activity_id, student_id, registered_at, is_approved, approved_at,
                      is_participation_confirmed, participation_confirmed_at
            "#,
        )
        .bind(activity_id)
        .bind(student_id)
        .bind(auto_approve)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(ActivityRegisterOutcome::Registered(registration))
    }

    /// Approve a pending registration, identified by student code.
    ///
    /// The approved count is re-checked under the activity row lock so
    /// concurrent approvals cannot exceed max_participants. Approving an
    /// already-approved registration leaves its timestamp untouched.
    pub async fn approve(
        &self,
        activity_id: Uuid,
        student_code: &str,
    ) -> Result<ApprovalOutcome, sqlx::Error> {
        let timer = QueryTimer::new("approve_participation");
        let mut tx = self.pool.begin().await?;

        let Some(student_id) = self.resolve_student_code(&mut tx, student_code).await? else {
            tx.rollback().await?;
            timer.record();
            return Ok(ApprovalOutcome::NotFound);
        };

        let max_participants: (i32,) = sqlx::query_as(
            r#"
            SELECT max_participants
            FROM activities
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(activity_id)
        .fetch_one(&mut *tx)
        .await?;

        let registration = sqlx::query_as::<_, ActivityRegistrationEntity>(
            r#"
            SELECT activity_id, student_id, registered_at, is_approved, approved_at,
                   is_participation_confirmed, participation_confirmed_at
            FROM activity_registrations
            WHERE activity_id = $1 AND student_id = $2
            "#,
        )
        .bind(activity_id)
        .bind(student_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(registration) = registration else {
            tx.rollback().await?;
            timer.record();
            return Ok(ApprovalOutcome::NotFound);
        };
        if registration.is_approved {
            tx.rollback().await?;
            timer.record();
            return Ok(ApprovalOutcome::AlreadyApproved(registration));
        }

        let approved: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM activity_registrations
            WHERE activity_id = $1 AND is_approved = true
            "#,
        )
        .bind(activity_id)
        .fetch_one(&mut *tx)
        .await?;
        if approved.0 >= max_participants.0 as i64 {
            tx.rollback().await?;
            timer.record();
            return Ok(ApprovalOutcome::CapacityReached);
        }

        let approved_row = sqlx::query_as::<_, ActivityRegistrationEntity>(
            r#"
            UPDATE activity_registrations
            SET is_approved = true, approved_at = now()
            WHERE activity_id = $1 AND student_id = $2
            RETURNING activity_id, student_id, registered_at, is_approved, approved_at,
                      is_participation_confirmed, participation_confirmed_at
            "#,
        )
        .bind(activity_id)
        .bind(student_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(ApprovalOutcome::Approved(approved_row))
    }

    /// Confirm participation, identified by student code.
    ///
    /// Serialized on the registration row. A registration confirms at most
    /// once; re-invocations report `AlreadyConfirmed` so the caller never
    /// dispatches a second reward. For rewarded activities a pending
    /// transaction log row commits in the same transaction, so the promise
    /// of a reward survives a crash before the ledger transfer runs.
    pub async fn confirm_participation(
        &self,
        activity_id: Uuid,
        student_code: &str,
    ) -> Result<ConfirmOutcome, sqlx::Error> {
        let timer = QueryTimer::new("confirm_participation");
        let mut tx = self.pool.begin().await?;

        let Some(student_id) = self.resolve_student_code(&mut tx, student_code).await? else {
            tx.rollback().await?;
            timer.record();
            return Ok(ConfirmOutcome::NotFound);
        };

        let registration = sqlx::query_as::<_, ActivityRegistrationEntity>(
            r#"
            SELECT activity_id, student_id, registered_at, is_approved, approved_at,
                   is_participation_confirmed, participation_confirmed_at
            FROM activity_registrations
            WHERE activity_id = $1 AND student_id = $2
            FOR UPDATE
            "#,
        )
        .bind(activity_id)
        .bind(student_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(registration) = registration else {
            tx.rollback().await?;
            timer.record();
            return Ok(ConfirmOutcome::NotFound);
        };
        if registration.is_participation_confirmed {
            tx.rollback().await?;
            timer.record();
            return Ok(ConfirmOutcome::AlreadyConfirmed(registration));
        }
        if !registration.is_approved {
            tx.rollback().await?;
            timer.record();
            return Ok(ConfirmOutcome::NotApproved);
        }

        let confirmed = sqlx::query_as::<_, ActivityRegistrationEntity>(
            r#"
            UPDATE activity_registrations
            SET is_participation_confirmed = true, participation_confirmed_at = now()
            WHERE activity_id = $1 AND student_id = $2
            RETURNING activity_id, student_id, registered_at, is_approved, approved_at,
                      is_participation_confirmed, participation_confirmed_at
            "#,
        )
        .bind(activity_id)
        .bind(student_id)
        .fetch_one(&mut *tx)
        .await?;

        let activity: (String, i64) = sqlx::query_as(
            r#"
            SELECT name, reward_coin
            FROM activities
            WHERE id = $1
            "#,
        )
        .bind(activity_id)
        .fetch_one(&mut *tx)
        .await?;
        let (activity_name, reward_coin) = activity;

        let reward = if reward_coin > 0 {
            Some(
                sqlx::query_as::<_, TransactionLogEntity>(
                    r#"
                    INSERT INTO transaction_logs (user_id, tx_type, status, amount, description)
                    VALUES ($1, 'activity_reward', 'pending', $2, $3)
                    RETURNING id, user_id, tx_type, status, amount, description, tx_hash,
                              created_at, updated_at
                    "#,
                )
                .bind(student_id)
                .bind(reward_coin)
                .bind(format!("Reward for activity {}", activity_name))
                .fetch_one(&mut *tx)
                .await?,
            )
        } else {
            None
        };

        tx.commit().await?;
        timer.record();
        Ok(ConfirmOutcome::Confirmed {
            registration: confirmed,
            reward,
        })
    }

    /// List registrations for an activity with student details, staff roster
    /// view, pending first then by registration time.
    pub async fn list_participants(
        &self,
        activity_id: Uuid,
    ) -> Result<Vec<ParticipantEntity>, sqlx::Error> {
        sqlx::query_as::<_, ParticipantEntity>(
            r#"
            SELECT r.activity_id, r.student_id, u.full_name AS student_name,
                   u.student_code, r.registered_at, r.is_approved, r.approved_at,
                   r.is_participation_confirmed, r.participation_confirmed_at
            FROM activity_registrations r
            JOIN users u ON u.id = r.student_id
            WHERE r.activity_id = $1
            ORDER BY r.is_approved, r.registered_at
            "#,
        )
        .bind(activity_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Find a student's registration for an activity.
    pub async fn find_registration(
        &self,
        activity_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<ActivityRegistrationEntity>, sqlx::Error> {
        sqlx::query_as::<_, ActivityRegistrationEntity>(
            r#"
            SELECT activity_id, student_id, registered_at, is_approved, approved_at,
                   is_participation_confirmed, participation_confirmed_at
            FROM activity_registrations
            WHERE activity_id = $1 AND student_id = $2
            "#,
        )
        .bind(activity_id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn resolve_student_code(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        student_code: &str,
    ) -> Result<Option<Uuid>, sqlx::Error> {
        let row: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id FROM users
            WHERE student_code = $1
            "#,
        )
        .bind(student_code)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(row.map(|r| r.0))
    }
}
