//! Wallet repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::WalletEntity;

/// Repository for wallet-related database operations.
#[derive(Clone)]
pub struct WalletRepository {
    pool: PgPool,
}

impl WalletRepository {
    /// Creates a new WalletRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a wallet for a user. A second wallet for the same user
    /// surfaces as a unique violation.
    pub async fn create(
        &self,
        user_id: Uuid,
        address: &str,
        private_key: &str,
    ) -> Result<WalletEntity, sqlx::Error> {
        sqlx::query_as::<_, WalletEntity>(
            r#"
            INSERT INTO wallets (user_id, address, private_key, balance)
            VALUES ($1, $2, $3, 0)
            RETURNING id, user_id, address, private_key, balance, created_at, synced_at
            "#,
        )
        .bind(user_id)
        .bind(address)
        .bind(private_key)
        .fetch_one(&self.pool)
        .await
    }

    /// Find a user's wallet.
    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Option<WalletEntity>, sqlx::Error> {
        sqlx::query_as::<_, WalletEntity>(
            r#"
            SELECT id, user_id, address, private_key, balance, created_at, synced_at
            FROM wallets
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Find a wallet by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<WalletEntity>, sqlx::Error> {
        sqlx::query_as::<_, WalletEntity>(
            r#"
            SELECT id, user_id, address, private_key, balance, created_at, synced_at
            FROM wallets
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Mirror a ledger-reported balance into the cache column.
    ///
    /// Only the reward dispatcher and the reconciliation job call this; no
    /// other workflow writes the balance.
    pub async fn sync_balance(
        &self,
        wallet_id: Uuid,
        balance: i64,
    ) -> Result<Option<WalletEntity>, sqlx::Error> {
        sqlx::query_as::<_, WalletEntity>(
            r#"
            UPDATE wallets
            SET balance = $2, synced_at = now()
            WHERE id = $1
            RETURNING id, user_id, address, private_key, balance, created_at, synced_at
            "#,
        )
        .bind(wallet_id)
        .bind(balance)
        .fetch_optional(&self.pool)
        .await
    }
}
