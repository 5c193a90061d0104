//! Reward settlement for confirmed activity participation.
//!
//! Confirming participation commits a pending transaction log in the same
//! database transaction as the confirmation itself. This service settles
//! that log against the coin ledger: it transfers the reward to the
//! student's wallet, flips the log to confirmed with the ledger hash, and
//! mirrors the resulting balance. Settlement is best effort; a failure
//! leaves the log for the reconciliation job and never unwinds the
//! participation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use domain::models::generate_wallet_keypair;
use persistence::entities::{TransactionLogEntity, WalletEntity};
use persistence::repositories::{TransactionLogRepository, WalletRepository};

use crate::middleware::metrics::record_reward_dispatched;
use crate::services::ledger::{LedgerError, LedgerService};

/// Errors that can occur while settling a reward.
#[derive(Debug, Error)]
pub enum RewardError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Service that moves promised rewards onto the ledger.
pub struct RewardService {
    pool: PgPool,
    ledger: Arc<dyn LedgerService>,
}

impl RewardService {
    /// Create a new reward service.
    pub fn new(pool: PgPool, ledger: Arc<dyn LedgerService>) -> Self {
        Self { pool, ledger }
    }

    /// Settle one reward log against the ledger. Returns whether it confirmed.
    ///
    /// On failure the log is flipped to failed so the reconciliation job
    /// picks it up again. The log id doubles as the ledger idempotency key,
    /// so a retry after a partial failure cannot credit the wallet twice.
    pub async fn settle(&self, log: &TransactionLogEntity) -> bool {
        match self.dispatch(log).await {
            Ok(()) => {
                record_reward_dispatched("confirmed");
                true
            }
            Err(e) => {
                warn!(
                    log_id = %log.id,
                    user_id = %log.user_id,
                    error = %e,
                    "Reward settlement failed"
                );
                record_reward_dispatched("failed");

                let log_repo = TransactionLogRepository::new(self.pool.clone());
                if let Err(db_err) = log_repo.mark_failed(log.id).await {
                    error!(
                        log_id = %log.id,
                        error = %db_err,
                        "Failed to mark reward log as failed"
                    );
                }
                false
            }
        }
    }

    /// Retry rewards stuck in pending or failed. Returns how many settled.
    pub async fn retry_unsettled(
        &self,
        stuck_since: DateTime<Utc>,
        batch_size: i64,
    ) -> Result<u32, sqlx::Error> {
        let log_repo = TransactionLogRepository::new(self.pool.clone());
        let stuck = log_repo
            .find_unsettled_rewards(stuck_since, batch_size)
            .await?;

        let mut settled = 0u32;
        for log in &stuck {
            if self.settle(log).await {
                settled += 1;
            }
        }

        if !stuck.is_empty() {
            info!(
                scanned = stuck.len(),
                settled = settled,
                "Retried unsettled rewards"
            );
        }

        Ok(settled)
    }

    async fn dispatch(&self, log: &TransactionLogEntity) -> Result<(), RewardError> {
        let wallet = self.wallet_for_user(log.user_id).await?;

        let tx_hash = self
            .ledger
            .transfer(&wallet.address, log.amount, log.id)
            .await?;

        let log_repo = TransactionLogRepository::new(self.pool.clone());
        log_repo.mark_confirmed(log.id, &tx_hash).await?;

        info!(
            log_id = %log.id,
            user_id = %log.user_id,
            amount = log.amount,
            tx_hash = %tx_hash,
            "Reward settled"
        );

        // Mirror the settled balance. A failure here is not fatal, the next
        // settlement or checkout overwrites it.
        match self.ledger.balance_of(&wallet.address).await {
            Ok(balance) => {
                let wallet_repo = WalletRepository::new(self.pool.clone());
                if let Err(e) = wallet_repo.sync_balance(wallet.id, balance).await {
                    warn!(wallet_id = %wallet.id, error = %e, "Failed to sync wallet balance");
                }
            }
            Err(e) => {
                warn!(
                    wallet_id = %wallet.id,
                    error = %e,
                    "Failed to read ledger balance after reward"
                );
            }
        }

        Ok(())
    }

    /// Find the user's wallet, provisioning one on first reward.
    async fn wallet_for_user(&self, user_id: Uuid) -> Result<WalletEntity, RewardError> {
        let wallet_repo = WalletRepository::new(self.pool.clone());

        if let Some(wallet) = wallet_repo.find_by_user(user_id).await? {
            return Ok(wallet);
        }

        let keypair = generate_wallet_keypair();
        match wallet_repo
            .create(user_id, &keypair.address, &keypair.private_key)
            .await
        {
            Ok(wallet) => {
                info!(
                    user_id = %user_id,
                    wallet_id = %wallet.id,
                    "Provisioned wallet for first reward"
                );
                Ok(wallet)
            }
            Err(e) => {
                // Lost a provisioning race, the concurrent writer's wallet wins
                if let Some(wallet) = wallet_repo.find_by_user(user_id).await? {
                    return Ok(wallet);
                }
                Err(e.into())
            }
        }
    }
}
