//! Reward reconciliation background job.
//!
//! Participation confirmation commits a pending transaction log even when
//! the ledger is down. This job sweeps logs stuck in pending or failed and
//! re-settles them, so every confirmed participation eventually pays out
//! exactly once (the log id is the ledger idempotency key).

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use tracing::info;

use crate::config::JobsConfig;
use crate::services::ledger::LedgerService;
use crate::services::reward::RewardService;

use super::scheduler::Job;

/// Background job that retries unsettled activity rewards.
pub struct RewardRetryJob {
    pool: PgPool,
    ledger: Arc<dyn LedgerService>,
    interval: Duration,
    batch_size: i64,
    stuck_after: chrono::Duration,
}

impl RewardRetryJob {
    pub fn new(pool: PgPool, ledger: Arc<dyn LedgerService>, config: &JobsConfig) -> Self {
        Self {
            pool,
            ledger,
            interval: Duration::from_secs(config.reward_retry_interval_secs),
            batch_size: config.reward_retry_batch_size as i64,
            stuck_after: chrono::Duration::seconds(config.reward_stuck_after_secs as i64),
        }
    }
}

#[async_trait::async_trait]
impl Job for RewardRetryJob {
    fn name(&self) -> &'static str {
        "reward_retry"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn execute(&self) -> Result<(), String> {
        // Rewards younger than the cutoff may still be held by an in-flight
        // confirmation handler; leave them for the next sweep
        let cutoff = Utc::now() - self.stuck_after;

        let settled = RewardService::new(self.pool.clone(), self.ledger.clone())
            .retry_unsettled(cutoff, self.batch_size)
            .await
            .map_err(|e| format!("Failed to sweep unsettled rewards: {}", e))?;

        if settled > 0 {
            info!(settled = settled, "Reward reconciliation settled rewards");
        }

        Ok(())
    }
}
