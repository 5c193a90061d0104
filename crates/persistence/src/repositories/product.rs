//! Product repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::ProductEntity;

/// Repository for shop products.
#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    /// Creates a new ProductRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a product.
    pub async fn create(
        &self,
        name: &str,
        description: Option<&str>,
        price: i64,
        stock_quantity: i32,
    ) -> Result<ProductEntity, sqlx::Error> {
        sqlx::query_as::<_, ProductEntity>(
            r#"
            INSERT INTO products (name, description, price, stock_quantity)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, price, stock_quantity, created_at
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(stock_quantity)
        .fetch_one(&self.pool)
        .await
    }

    /// Find a product by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductEntity>, sqlx::Error> {
        sqlx::query_as::<_, ProductEntity>(
            r#"
            SELECT id, name, description, price, stock_quantity, created_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Fetch a set of products by id. Missing ids simply produce no row.
    pub async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<ProductEntity>, sqlx::Error> {
        sqlx::query_as::<_, ProductEntity>(
            r#"
            SELECT id, name, description, price, stock_quantity, created_at
            FROM products
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
    }

    /// List all products, alphabetical.
    pub async fn list(&self) -> Result<Vec<ProductEntity>, sqlx::Error> {
        sqlx::query_as::<_, ProductEntity>(
            r#"
            SELECT id, name, description, price, stock_quantity, created_at
            FROM products
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}
