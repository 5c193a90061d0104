//! External service integrations.

pub mod ledger;
pub mod reward;

#[allow(unused_imports)] // Re-exports for downstream use
pub use ledger::{HttpLedgerService, InMemoryLedger, LedgerService};
#[allow(unused_imports)] // Re-exports for downstream use
pub use reward::RewardService;
