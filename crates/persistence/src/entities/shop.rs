//! Shop entities: products, orders and order items (database row mappings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the products table.
#[derive(Debug, Clone, FromRow)]
pub struct ProductEntity {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub stock_quantity: i32,
    pub created_at: DateTime<Utc>,
}

impl From<ProductEntity> for domain::models::Product {
    fn from(entity: ProductEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            price: entity.price,
            stock_quantity: entity.stock_quantity,
            created_at: entity.created_at,
        }
    }
}

/// Database row mapping for the orders table.
#[derive(Debug, Clone, FromRow)]
pub struct OrderEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_amount: i64,
    pub created_at: DateTime<Utc>,
}

impl From<OrderEntity> for domain::models::Order {
    fn from(entity: OrderEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            total_amount: entity.total_amount,
            created_at: entity.created_at,
        }
    }
}

/// Order item joined with its product name for display.
#[derive(Debug, Clone, FromRow)]
pub struct OrderItemEntity {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: i64,
}

impl From<OrderItemEntity> for domain::models::OrderItem {
    fn from(entity: OrderItemEntity) -> Self {
        Self {
            id: entity.id,
            order_id: entity.order_id,
            product_id: entity.product_id,
            product_name: entity.product_name,
            quantity: entity.quantity,
            unit_price: entity.unit_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_entity_to_domain() {
        let entity = ProductEntity {
            id: Uuid::new_v4(),
            name: "Campus Mug".to_string(),
            description: None,
            price: 45,
            stock_quantity: 7,
            created_at: Utc::now(),
        };
        let product: domain::models::Product = entity.clone().into();
        assert_eq!(product.id, entity.id);
        assert_eq!(product.stock_level(), domain::models::StockLevel::Low);
    }

    #[test]
    fn test_order_entity_to_domain() {
        let entity = OrderEntity {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            total_amount: 90,
            created_at: Utc::now(),
        };
        let order: domain::models::Order = entity.clone().into();
        assert_eq!(order.total_amount, 90);
        assert_eq!(order.user_id, entity.user_id);
    }
}
