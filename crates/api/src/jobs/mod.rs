//! Background job scheduler and job implementations.

mod pool_metrics;
mod reward_retry;
mod scheduler;

pub use pool_metrics::PoolMetricsJob;
pub use reward_retry::RewardRetryJob;
pub use scheduler::{Job, JobScheduler};
