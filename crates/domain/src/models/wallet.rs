//! Wallet and transaction-log domain models.
//!
//! Each user gets at most one wallet, provisioned on request. The `balance`
//! column mirrors the ledger: every write stores a value read back from the
//! ledger rather than incrementing or decrementing locally.

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user's on-ledger wallet. The private key never leaves the backend;
/// it is excluded from serialization and redacted from debug output.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Wallet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub address: String,
    #[serde(skip_serializing)]
    #[serde(default)]
    pub private_key: String,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
    /// When `balance` was last mirrored from the ledger.
    pub synced_at: DateTime<Utc>,
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("address", &self.address)
            .field("private_key", &"[REDACTED]")
            .field("balance", &self.balance)
            .field("created_at", &self.created_at)
            .field("synced_at", &self.synced_at)
            .finish()
    }
}

/// A freshly generated keypair for a new wallet.
pub struct WalletKeypair {
    pub address: String,
    pub private_key: String,
}

/// Generates a new wallet keypair. The ledger uses hex-encoded 32-byte keys
/// and 20-byte addresses with an `0x` prefix.
pub fn generate_wallet_keypair() -> WalletKeypair {
    let mut rng = rand::thread_rng();
    let mut key_bytes = [0u8; 32];
    rng.fill_bytes(&mut key_bytes);
    let mut addr_bytes = [0u8; 20];
    rng.fill_bytes(&mut addr_bytes);
    WalletKeypair {
        address: format!("0x{}", hex::encode(addr_bytes)),
        private_key: hex::encode(key_bytes),
    }
}

/// What a logged transaction paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    ActivityReward,
    OrderPayment,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::ActivityReward => "activity_reward",
            TransactionType::OrderPayment => "order_payment",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = InvalidTransactionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "activity_reward" => Ok(TransactionType::ActivityReward),
            "order_payment" => Ok(TransactionType::OrderPayment),
            other => Err(InvalidTransactionType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid transaction type: {0}")]
pub struct InvalidTransactionType(pub String);

/// Settlement status of a logged transaction.
///
/// `Pending` rows mark transfers that were promised but not yet settled on
/// the ledger; the reconciliation job retries pending and failed rewards
/// until they confirm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Confirmed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Confirmed => "confirmed",
            TransactionStatus::Failed => "failed",
        }
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = InvalidTransactionStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TransactionStatus::Pending),
            "confirmed" => Ok(TransactionStatus::Confirmed),
            "failed" => Ok(TransactionStatus::Failed),
            other => Err(InvalidTransactionStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid transaction status: {0}")]
pub struct InvalidTransactionStatus(pub String);

/// An audit record of a wallet transaction. Append-only apart from the
/// status and hash transitions driven by the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TransactionLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tx_type: TransactionType,
    pub status: TransactionStatus,
    pub amount: i64,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Wallet as returned to the owning user. Never includes the private key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WalletResponse {
    pub id: Uuid,
    pub address: String,
    pub balance: i64,
    pub synced_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<Wallet> for WalletResponse {
    fn from(wallet: Wallet) -> Self {
        WalletResponse {
            id: wallet.id,
            address: wallet.address,
            balance: wallet.balance,
            synced_at: wallet.synced_at,
            created_at: wallet.created_at,
        }
    }
}

/// Paged transaction history for a wallet, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TransactionHistoryResponse {
    pub transactions: Vec<TransactionLog>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet() -> Wallet {
        let now = Utc::now();
        Wallet {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            address: "0x00112233445566778899aabbccddeeff00112233".to_string(),
            private_key: "deadbeef".repeat(8),
            balance: 150,
            created_at: now,
            synced_at: now,
        }
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let w = wallet();
        let debug = format!("{w:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("deadbeef"));
    }

    #[test]
    fn test_serialization_omits_private_key() {
        let w = wallet();
        let json = serde_json::to_string(&w).unwrap();
        assert!(!json.contains("private_key"));
        assert!(!json.contains("deadbeef"));
        assert!(json.contains("0x00112233"));
    }

    #[test]
    fn test_generate_wallet_keypair_format() {
        let kp = generate_wallet_keypair();
        assert!(kp.address.starts_with("0x"));
        assert_eq!(kp.address.len(), 42);
        assert_eq!(kp.private_key.len(), 64);
        assert!(kp.private_key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_wallet_keypair_unique() {
        let a = generate_wallet_keypair();
        let b = generate_wallet_keypair();
        assert_ne!(a.address, b.address);
        assert_ne!(a.private_key, b.private_key);
    }

    #[test]
    fn test_transaction_status_round_trip() {
        for status in [
            TransactionStatus::Pending,
            TransactionStatus::Confirmed,
            TransactionStatus::Failed,
        ] {
            let parsed: TransactionStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("settled".parse::<TransactionStatus>().is_err());
    }

    #[test]
    fn test_transaction_type_round_trip() {
        for tx_type in [TransactionType::ActivityReward, TransactionType::OrderPayment] {
            let parsed: TransactionType = tx_type.as_str().parse().unwrap();
            assert_eq!(parsed, tx_type);
        }
        assert!("refund".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_wallet_response_from_wallet() {
        let w = wallet();
        let resp = WalletResponse::from(w.clone());
        assert_eq!(resp.id, w.id);
        assert_eq!(resp.balance, 150);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(!json.contains("private_key"));
    }
}
