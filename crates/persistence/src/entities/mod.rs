//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod activity;
pub mod course;
pub mod semester;
pub mod shop;
pub mod user;
pub mod wallet;

pub use activity::{
    ActivityEntity, ActivityRegistrationEntity, ActivityWithCountsEntity, ParticipantEntity,
};
pub use course::{
    CourseOfferingEntity, CourseRegistrationEntity, OfferingSummaryEntity,
    RegistrationDetailEntity,
};
pub use semester::SemesterEntity;
pub use shop::{OrderEntity, OrderItemEntity, ProductEntity};
pub use user::UserEntity;
pub use wallet::{TransactionLogEntity, TransactionStatusDb, WalletEntity};
