//! Product administration routes for the campus shop.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::auth::AuthUser;
use domain::models::shop::{CreateProductRequest, ProductResponse};
use domain::models::Product;
use domain::services::access::{ensure, Capability};
use persistence::repositories::ProductRepository;

/// POST /api/v1/admin/products
pub async fn create_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ensure(auth.role, Capability::ManageCatalog)?;
    payload.validate()?;

    let product: Product = ProductRepository::new(state.pool.clone())
        .create(
            &payload.name,
            payload.description.as_deref(),
            payload.price,
            payload.stock_quantity,
        )
        .await?
        .into();

    info!(
        product_id = %product.id,
        name = %product.name,
        price = product.price,
        stock = product.stock_quantity,
        "Product created"
    );

    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}
