//! Wallet and transaction-log entities (database row mappings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// Database enum for transaction settlement status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "transaction_status", rename_all = "lowercase")]
pub enum TransactionStatusDb {
    Pending,
    Confirmed,
    Failed,
}

impl From<TransactionStatusDb> for domain::models::TransactionStatus {
    fn from(status: TransactionStatusDb) -> Self {
        match status {
            TransactionStatusDb::Pending => domain::models::TransactionStatus::Pending,
            TransactionStatusDb::Confirmed => domain::models::TransactionStatus::Confirmed,
            TransactionStatusDb::Failed => domain::models::TransactionStatus::Failed,
        }
    }
}

impl From<domain::models::TransactionStatus> for TransactionStatusDb {
    fn from(status: domain::models::TransactionStatus) -> Self {
        match status {
            domain::models::TransactionStatus::Pending => TransactionStatusDb::Pending,
            domain::models::TransactionStatus::Confirmed => TransactionStatusDb::Confirmed,
            domain::models::TransactionStatus::Failed => TransactionStatusDb::Failed,
        }
    }
}

/// Database row mapping for the wallets table.
#[derive(Debug, Clone, FromRow)]
pub struct WalletEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub address: String,
    pub private_key: String,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
    pub synced_at: DateTime<Utc>,
}

impl From<WalletEntity> for domain::models::Wallet {
    fn from(entity: WalletEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            address: entity.address,
            private_key: entity.private_key,
            balance: entity.balance,
            created_at: entity.created_at,
            synced_at: entity.synced_at,
        }
    }
}

/// Database row mapping for the transaction_logs table.
#[derive(Debug, Clone, FromRow)]
pub struct TransactionLogEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tx_type: String,
    pub status: TransactionStatusDb,
    pub amount: i64,
    pub description: String,
    pub tx_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TransactionLogEntity> for domain::models::TransactionLog {
    fn from(entity: TransactionLogEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            tx_type: domain::models::TransactionType::from_str(&entity.tx_type)
                .unwrap_or(domain::models::TransactionType::ActivityReward), // Default fallback
            status: entity.status.into(),
            amount: entity.amount,
            description: entity.description,
            tx_hash: entity.tx_hash,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
