//! Domain models for Campus Manager.

pub mod activity;
pub mod course;
pub mod dashboard;
pub mod semester;
pub mod shop;
pub mod user;
pub mod wallet;

pub use activity::{Activity, ActivityRegistration, ActivityStatus, RegistrationState};
pub use course::{CourseOffering, CourseRegistration, OfferingSummary};
pub use dashboard::{DailyRevenue, DashboardStats, StockBucketCount, TopProduct};
pub use semester::Semester;
pub use shop::{Order, OrderItem, Product, StockLevel};
pub use user::{User, UserRole};
pub use wallet::{
    generate_wallet_keypair, TransactionLog, TransactionStatus, TransactionType, Wallet,
    WalletKeypair,
};
