//! Campus shop domain models: products, orders and checkout requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Stock at or below this count is reported as low on the dashboard.
pub const LOW_STOCK_THRESHOLD: i32 = 10;

/// Stock bucket used by shop listings and the staff dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    OutOfStock,
    Low,
    InStock,
}

/// A product sold in the campus shop, priced in campus coin.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: i64,
    pub stock_quantity: i32,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn stock_level(&self) -> StockLevel {
        if self.stock_quantity <= 0 {
            StockLevel::OutOfStock
        } else if self.stock_quantity <= LOW_STOCK_THRESHOLD {
            StockLevel::Low
        } else {
            StockLevel::InStock
        }
    }
}

/// A completed shop order. Orders are only persisted once the wallet debit
/// has settled, so every stored order is paid in full.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_amount: i64,
    pub created_at: DateTime<Utc>,
}

/// A line item on an order, capturing the unit price at purchase time.
/// `product_name` is joined in at read time for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: i64,
}

impl OrderItem {
    pub fn line_total(&self) -> i64 {
        self.unit_price * self.quantity as i64
    }
}

/// One requested line in a checkout.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CheckoutItem {
    pub product_id: Uuid,
    #[validate(range(min = 1, max = 100, message = "quantity must be 1-100"))]
    pub quantity: i32,
}

/// Request to purchase a basket of products with wallet funds.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CheckoutRequest {
    #[validate(length(min = 1, max = 50, message = "order must contain 1-50 items"))]
    #[validate(nested)]
    pub items: Vec<CheckoutItem>,
}

impl CheckoutRequest {
    /// True when the same product appears in more than one line.
    pub fn has_duplicate_products(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.items.iter().any(|item| !seen.insert(item.product_id))
    }
}

/// An order with its line items, as returned by checkout and order history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Response for a successful checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CheckoutResponse {
    pub message: String,
    pub data: OrderDetail,
    pub new_balance: i64,
}

/// Request to create a product (admin).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub name: String,
    #[validate(length(max = 2000, message = "description must be at most 2000 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[validate(range(min = 1, message = "price must be positive"))]
    pub price: i64,
    #[validate(range(min = 0, message = "stock_quantity must be non-negative"))]
    pub stock_quantity: i32,
}

/// Product as listed to students, with the derived stock bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: i64,
    pub stock_quantity: i32,
    pub stock_level: StockLevel,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        let stock_level = product.stock_level();
        ProductResponse {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            stock_quantity: product.stock_quantity,
            stock_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock_quantity: i32) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Campus Hoodie".to_string(),
            description: None,
            price: 120,
            stock_quantity,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_stock_level_buckets() {
        assert_eq!(product(0).stock_level(), StockLevel::OutOfStock);
        assert_eq!(product(1).stock_level(), StockLevel::Low);
        assert_eq!(product(10).stock_level(), StockLevel::Low);
        assert_eq!(product(11).stock_level(), StockLevel::InStock);
    }

    #[test]
    fn test_order_item_line_total() {
        let item = OrderItem {
            id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            product_name: "Sticker Pack".to_string(),
            quantity: 3,
            unit_price: 15,
        };
        assert_eq!(item.line_total(), 45);
    }

    #[test]
    fn test_checkout_request_rejects_empty() {
        let request = CheckoutRequest { items: vec![] };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_checkout_request_rejects_zero_quantity() {
        let request = CheckoutRequest {
            items: vec![CheckoutItem {
                product_id: Uuid::new_v4(),
                quantity: 0,
            }],
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_checkout_request_detects_duplicates() {
        let product_id = Uuid::new_v4();
        let request = CheckoutRequest {
            items: vec![
                CheckoutItem { product_id, quantity: 1 },
                CheckoutItem { product_id, quantity: 2 },
            ],
        };
        assert!(request.validate().is_ok());
        assert!(request.has_duplicate_products());
    }

    #[test]
    fn test_product_response_includes_stock_level() {
        let resp = ProductResponse::from(product(5));
        assert_eq!(resp.stock_level, StockLevel::Low);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"stock_level\":\"low\""));
    }
}
