//! Transaction log repository for database operations.
//!
//! Logs are append-only apart from the status and hash transitions the
//! dispatcher and reconciliation job drive.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{TransactionLogEntity, TransactionStatusDb};

/// Repository for wallet transaction logs.
#[derive(Clone)]
pub struct TransactionLogRepository {
    pool: PgPool,
}

impl TransactionLogRepository {
    /// Creates a new TransactionLogRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a log row in the given status.
    pub async fn insert(
        &self,
        user_id: Uuid,
        tx_type: &str,
        status: TransactionStatusDb,
        amount: i64,
        description: &str,
    ) -> Result<TransactionLogEntity, sqlx::Error> {
        sqlx::query_as::<_, TransactionLogEntity>(
            r#"
            INSERT INTO transaction_logs (user_id, tx_type, status, amount, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, tx_type, status, amount, description, tx_hash,
                      created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(tx_type)
        .bind(status)
        .bind(amount)
        .bind(description)
        .fetch_one(&self.pool)
        .await
    }

    /// Flip a log to confirmed with its ledger hash.
    pub async fn mark_confirmed(
        &self,
        id: Uuid,
        tx_hash: &str,
    ) -> Result<Option<TransactionLogEntity>, sqlx::Error> {
        sqlx::query_as::<_, TransactionLogEntity>(
            r#"
            UPDATE transaction_logs
            SET status = 'confirmed', tx_hash = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, user_id, tx_type, status, amount, description, tx_hash,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(tx_hash)
        .fetch_optional(&self.pool)
        .await
    }

    /// Flip a log to failed. The reconciliation job will pick it up again.
    pub async fn mark_failed(&self, id: Uuid) -> Result<Option<TransactionLogEntity>, sqlx::Error> {
        sqlx::query_as::<_, TransactionLogEntity>(
            r#"
            UPDATE transaction_logs
            SET status = 'failed', updated_at = now()
            WHERE id = $1
            RETURNING id, user_id, tx_type, status, amount, description, tx_hash,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Find a log by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<TransactionLogEntity>, sqlx::Error> {
        sqlx::query_as::<_, TransactionLogEntity>(
            r#"
            SELECT id, user_id, tx_type, status, amount, description, tx_hash,
                   created_at, updated_at
            FROM transaction_logs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Page through a user's transaction history, newest first.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TransactionLogEntity>, sqlx::Error> {
        sqlx::query_as::<_, TransactionLogEntity>(
            r#"
            SELECT id, user_id, tx_type, status, amount, description, tx_hash,
                   created_at, updated_at
            FROM transaction_logs
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    /// Count a user's transaction log rows.
    pub async fn count_for_user(&self, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM transaction_logs
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count.0)
    }

    /// Reward logs stuck in pending or failed, oldest first.
    ///
    /// `stuck_since` excludes rows a concurrent dispatch may still be
    /// working on; the reconciliation job passes a cutoff a few minutes in
    /// the past.
    pub async fn find_unsettled_rewards(
        &self,
        stuck_since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<TransactionLogEntity>, sqlx::Error> {
        sqlx::query_as::<_, TransactionLogEntity>(
            r#"
            SELECT id, user_id, tx_type, status, amount, description, tx_hash,
                   created_at, updated_at
            FROM transaction_logs
            WHERE tx_type = 'activity_reward'
              AND status IN ('pending', 'failed')
              AND updated_at < $1
            ORDER BY updated_at
            LIMIT $2
            "#,
        )
        .bind(stuck_since)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }
}
