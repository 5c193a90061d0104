//! Dashboard statistics repository for database operations.
//!
//! Pure read side: every query runs at read-committed isolation and nothing
//! here mutates state.

use chrono::{Duration, NaiveDate, NaiveTime};
use domain::models::{DailyRevenue, DashboardStats, StockBucketCount, StockLevel, TopProduct};
use domain::models::shop::LOW_STOCK_THRESHOLD;
use sqlx::{PgPool, Row};

/// Repository for staff dashboard statistics.
#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Compute the full dashboard payload as of `today` (UTC calendar date).
    pub async fn get_stats(&self, today: NaiveDate) -> Result<DashboardStats, sqlx::Error> {
        // Run all queries in parallel for performance
        let (counts, weekly, monthly, top_products, stock_distribution) = tokio::try_join!(
            self.get_counts(today),
            self.get_revenue_series(today, 7),
            self.get_revenue_series(today, 30),
            self.get_top_products(5),
            self.get_stock_distribution(),
        )?;
        let (total_products, today_orders, total_customers) = counts;

        Ok(DashboardStats {
            total_products,
            today_orders,
            total_customers,
            revenue_stats: weekly,
            top_products,
            stock_distribution,
            monthly_revenue_stats: monthly,
        })
    }

    /// Headline counts: product count, today's orders, distinct customers.
    async fn get_counts(&self, today: NaiveDate) -> Result<(i64, i64, i64), sqlx::Error> {
        let day_start = today.and_time(NaiveTime::MIN).and_utc();
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM products) as total_products,
                (SELECT COUNT(*) FROM orders WHERE created_at >= $1) as today_orders,
                (SELECT COUNT(DISTINCT user_id) FROM orders) as total_customers
            "#,
        )
        .bind(day_start)
        .fetch_one(&self.pool)
        .await?;

        Ok((
            row.get::<i64, _>("total_products"),
            row.get::<i64, _>("today_orders"),
            row.get::<i64, _>("total_customers"),
        ))
    }

    /// Per-day revenue for the trailing `days`-day window ending today,
    /// zero-filled and ordered oldest first.
    async fn get_revenue_series(
        &self,
        today: NaiveDate,
        days: i64,
    ) -> Result<Vec<DailyRevenue>, sqlx::Error> {
        let window_start = (today - Duration::days(days - 1))
            .and_time(NaiveTime::MIN)
            .and_utc();
        let rows = sqlx::query(
            r#"
            SELECT (created_at AT TIME ZONE 'UTC')::date as day,
                   COALESCE(SUM(total_amount), 0)::bigint as total_amount,
                   COUNT(*) as order_count
            FROM orders
            WHERE created_at >= $1
            GROUP BY day
            "#,
        )
        .bind(window_start)
        .fetch_all(&self.pool)
        .await?;

        let observed: Vec<DailyRevenue> = rows
            .iter()
            .map(|row| DailyRevenue {
                date: row.get::<NaiveDate, _>("day"),
                total_amount: row.get::<i64, _>("total_amount"),
                order_count: row.get::<i64, _>("order_count"),
            })
            .collect();

        Ok(fill_daily_series(today, days, observed))
    }

    /// Best sellers by summed quantity.
    async fn get_top_products(&self, limit: i64) -> Result<Vec<TopProduct>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT p.id, p.name,
                   SUM(i.quantity)::bigint as units_sold,
                   SUM(i.quantity * i.unit_price)::bigint as revenue
            FROM order_items i
            JOIN products p ON p.id = i.product_id
            GROUP BY p.id, p.name
            ORDER BY units_sold DESC, p.name
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| TopProduct {
                product_id: row.get("id"),
                name: row.get("name"),
                units_sold: row.get::<i64, _>("units_sold"),
                revenue: row.get::<i64, _>("revenue"),
            })
            .collect())
    }

    /// Product counts bucketed by stock level.
    async fn get_stock_distribution(&self) -> Result<Vec<StockBucketCount>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE stock_quantity <= 0) as out_of_stock,
                COUNT(*) FILTER (WHERE stock_quantity > 0 AND stock_quantity <= $1) as low,
                COUNT(*) FILTER (WHERE stock_quantity > $1) as in_stock
            FROM products
            "#,
        )
        .bind(LOW_STOCK_THRESHOLD)
        .fetch_one(&self.pool)
        .await?;

        Ok(vec![
            StockBucketCount {
                level: StockLevel::OutOfStock,
                count: row.get::<i64, _>("out_of_stock"),
            },
            StockBucketCount {
                level: StockLevel::Low,
                count: row.get::<i64, _>("low"),
            },
            StockBucketCount {
                level: StockLevel::InStock,
                count: row.get::<i64, _>("in_stock"),
            },
        ])
    }
}

/// Expand sparse per-day revenue rows into a gap-free series of exactly
/// `days` entries ending at `today`, oldest first.
fn fill_daily_series(today: NaiveDate, days: i64, observed: Vec<DailyRevenue>) -> Vec<DailyRevenue> {
    let start = today - Duration::days(days - 1);
    (0..days)
        .map(|offset| {
            let date = start + Duration::days(offset);
            observed
                .iter()
                .find(|day| day.date == date)
                .cloned()
                .unwrap_or(DailyRevenue {
                    date,
                    total_amount: 0,
                    order_count: 0,
                })
        })
        .collect()
}
