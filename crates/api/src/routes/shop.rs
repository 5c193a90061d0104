//! Campus shop routes: product listing and wallet-funded checkout.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::auth::AuthUser;
use crate::middleware::metrics::record_order_completed;
use domain::models::shop::{CheckoutRequest, CheckoutResponse, OrderDetail, ProductResponse};
use domain::models::Product;
use domain::services::access::{ensure, Capability};
use persistence::repositories::{OrderLine, OrderRepository, ProductRepository, WalletRepository};

/// GET /api/v1/shop/products
pub async fn list_products(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let products: Vec<ProductResponse> = ProductRepository::new(state.pool.clone())
        .list()
        .await?
        .into_iter()
        .map(|p| ProductResponse::from(Product::from(p)))
        .collect();

    Ok((StatusCode::OK, Json(products)))
}

/// POST /api/v1/shop/checkout
///
/// Purchase a basket with wallet funds. The ledger debit settles first;
/// the order row, its items, the stock decrements, the payment log and the
/// balance resync then commit in one local transaction. A failed debit
/// fails the whole checkout with no partial order.
pub async fn checkout(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ensure(auth.role, Capability::Checkout)?;
    payload.validate()?;
    if payload.has_duplicate_products() {
        return Err(ApiError::Validation(
            "Order contains the same product more than once".to_string(),
        ));
    }

    // Price the basket from current catalog rows
    let product_ids: Vec<Uuid> = payload.items.iter().map(|i| i.product_id).collect();
    let products = ProductRepository::new(state.pool.clone())
        .find_many(&product_ids)
        .await?;

    let mut lines = Vec::with_capacity(payload.items.len());
    let mut total_amount = 0i64;
    for item in &payload.items {
        let product = products
            .iter()
            .find(|p| p.id == item.product_id)
            .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;
        if product.stock_quantity < item.quantity {
            return Err(ApiError::Conflict(format!(
                "Insufficient stock for {}",
                product.name
            )));
        }
        total_amount += product.price * item.quantity as i64;
        lines.push(OrderLine {
            product_id: product.id,
            quantity: item.quantity,
            unit_price: product.price,
        });
    }

    let wallet_repo = WalletRepository::new(state.pool.clone());
    let wallet = wallet_repo
        .find_by_user(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Wallet not found".to_string()))?;

    // Debit first: an order without payment is worse than no order. The
    // order id is not known yet, so a fresh key scopes the debit.
    let idempotency_key = Uuid::new_v4();
    let tx_hash = state
        .ledger
        .debit(&wallet.address, total_amount, idempotency_key)
        .await?;

    // Mirror the post-debit balance. If the read fails the cached value is
    // left at its last synced state; the next successful sync refreshes it.
    let synced_balance = match state.ledger.balance_of(&wallet.address).await {
        Ok(balance) => Some(balance),
        Err(e) => {
            warn!(
                user_id = %auth.user_id,
                error = %e,
                "Failed to read ledger balance after checkout debit"
            );
            None
        }
    };
    // The debit settled, so the cached value minus the total is the best
    // available estimate for the response when the read failed.
    let new_balance = synced_balance.unwrap_or(wallet.balance - total_amount);

    let created = OrderRepository::new(state.pool.clone())
        .create_paid_order(
            auth.user_id,
            wallet.id,
            &lines,
            total_amount,
            &tx_hash,
            synced_balance,
        )
        .await?;

    let Some((order, items)) = created else {
        // A concurrent purchase drained the shelf between pricing and
        // commit. The debit has settled; leave the hash for the operator.
        error!(
            user_id = %auth.user_id,
            tx_hash = %tx_hash,
            amount = total_amount,
            "Checkout rolled back after settled debit, manual reconcile needed"
        );
        return Err(ApiError::Conflict(
            "Insufficient stock, payment will be reconciled".to_string(),
        ));
    };

    record_order_completed(total_amount);
    info!(
        user_id = %auth.user_id,
        order_id = %order.id,
        total_amount = total_amount,
        tx_hash = %tx_hash,
        "Checkout completed"
    );

    Ok((
        StatusCode::OK,
        Json(CheckoutResponse {
            message: "Order placed".to_string(),
            data: OrderDetail {
                order: order.into(),
                items: items.into_iter().map(Into::into).collect(),
            },
            new_balance,
        }),
    ))
}
