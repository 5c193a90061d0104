//! Staff dashboard aggregates.
//!
//! Pure read-side payload: nothing here mutates state, and every series is
//! gap-free so charting clients never have to interpolate.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shop::StockLevel;

/// Revenue for a single calendar day (UTC). Days with no orders appear with
/// zero totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub total_amount: i64,
    pub order_count: i64,
}

/// A product ranked by units sold.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TopProduct {
    pub product_id: Uuid,
    pub name: String,
    pub units_sold: i64,
    pub revenue: i64,
}

/// Count of products in one stock bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StockBucketCount {
    pub level: StockLevel,
    pub count: i64,
}

/// Full dashboard payload for staff.
///
/// `revenue_stats` covers the trailing 7 days and `monthly_revenue_stats`
/// the trailing 30, both oldest first with exactly that many entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DashboardStats {
    pub total_products: i64,
    pub today_orders: i64,
    pub total_customers: i64,
    pub revenue_stats: Vec<DailyRevenue>,
    pub top_products: Vec<TopProduct>,
    pub stock_distribution: Vec<StockBucketCount>,
    pub monthly_revenue_stats: Vec<DailyRevenue>,
}
