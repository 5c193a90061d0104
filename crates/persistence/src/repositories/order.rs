//! Order repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{OrderEntity, OrderItemEntity};
use crate::metrics::QueryTimer;

/// One line of an order being placed, with the unit price snapshotted at
/// checkout time.
#[derive(Debug, Clone)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: i64,
}

/// Repository for shop orders.
#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    /// Creates a new OrderRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a paid order: stock decrements, the order row, its items, the
    /// confirmed payment log and the wallet balance resync commit together.
    ///
    /// The caller has already settled the ledger debit; this is the local
    /// half of checkout. Stock rows are decremented with a guarded UPDATE
    /// (`stock_quantity >= quantity`), so a concurrent purchase that drained
    /// the shelf in the meantime rolls the whole order back; returns
    /// `Ok(None)` in that case and the caller reconciles the settled debit.
    ///
    /// `synced_balance` must be a value read back from the ledger; when the
    /// post-debit read failed the caller passes `None` and the cached
    /// balance keeps its last synced value.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_paid_order(
        &self,
        user_id: Uuid,
        wallet_id: Uuid,
        lines: &[OrderLine],
        total_amount: i64,
        tx_hash: &str,
        synced_balance: Option<i64>,
    ) -> Result<Option<(OrderEntity, Vec<OrderItemEntity>)>, sqlx::Error> {
        let timer = QueryTimer::new("create_paid_order");
        let mut tx = self.pool.begin().await?;

        for line in lines {
            let updated = sqlx::query(
                r#"
                UPDATE products
                SET stock_quantity = stock_quantity - $2
                WHERE id = $1 AND stock_quantity >= $2
                "#,
            )
            .bind(line.product_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
            if updated.rows_affected() == 0 {
                tx.rollback().await?;
                timer.record();
                return Ok(None);
            }
        }

        let order = sqlx::query_as::<_, OrderEntity>(
            r#"
            INSERT INTO orders (user_id, total_amount)
            VALUES ($1, $2)
            RETURNING id, user_id, total_amount, created_at
            "#,
        )
        .bind(user_id)
        .bind(total_amount)
        .fetch_one(&mut *tx)
        .await?;

        for line in lines {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, product_id, quantity, unit_price)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(order.id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO transaction_logs (user_id, tx_type, status, amount, description, tx_hash)
            VALUES ($1, 'order_payment', 'confirmed', $2, $3, $4)
            "#,
        )
        .bind(user_id)
        .bind(total_amount)
        .bind(format!("Payment for order {}", order.id))
        .bind(tx_hash)
        .execute(&mut *tx)
        .await?;

        if let Some(balance) = synced_balance {
            sqlx::query(
                r#"
                UPDATE wallets
                SET balance = $2, synced_at = now()
                WHERE id = $1
                "#,
            )
            .bind(wallet_id)
            .bind(balance)
            .execute(&mut *tx)
            .await?;
        }

        let items = sqlx::query_as::<_, OrderItemEntity>(
            r#"
            SELECT i.id, i.order_id, i.product_id, p.name AS product_name,
                   i.quantity, i.unit_price
            FROM order_items i
            JOIN products p ON p.id = i.product_id
            WHERE i.order_id = $1
            ORDER BY p.name
            "#,
        )
        .bind(order.id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(Some((order, items)))
    }

    /// Find an order by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<OrderEntity>, sqlx::Error> {
        sqlx::query_as::<_, OrderEntity>(
            r#"
            SELECT id, user_id, total_amount, created_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Items for one order with product names, for order detail views.
    pub async fn find_items(&self, order_id: Uuid) -> Result<Vec<OrderItemEntity>, sqlx::Error> {
        sqlx::query_as::<_, OrderItemEntity>(
            r#"
            SELECT i.id, i.order_id, i.product_id, p.name AS product_name,
                   i.quantity, i.unit_price
            FROM order_items i
            JOIN products p ON p.id = i.product_id
            WHERE i.order_id = $1
            ORDER BY p.name
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
    }
}
