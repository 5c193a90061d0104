//! Repository implementations for database operations.

pub mod activity;
pub mod course;
pub mod dashboard;
pub mod order;
pub mod product;
pub mod semester;
pub mod transaction_log;
pub mod user;
pub mod wallet;

pub use activity::{
    ActivityRegisterOutcome, ActivityRepository, ApprovalOutcome, ConfirmOutcome,
};
pub use course::{CourseRepository, RegisterOutcome};
pub use dashboard::DashboardRepository;
pub use order::{OrderLine, OrderRepository};
pub use product::ProductRepository;
pub use semester::SemesterRepository;
pub use transaction_log::TransactionLogRepository;
pub use user::UserRepository;
pub use wallet::WalletRepository;
