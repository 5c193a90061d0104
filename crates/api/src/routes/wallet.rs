//! Wallet routes for students.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::auth::AuthUser;
use domain::models::wallet::{TransactionHistoryResponse, WalletResponse};
use domain::models::{generate_wallet_keypair, TransactionLog, Wallet};
use domain::services::access::{ensure, Capability};
use persistence::entities::WalletEntity;
use persistence::repositories::{TransactionLogRepository, WalletRepository};

/// GET /api/v1/wallet
///
/// Return the caller's wallet. The cached balance is refreshed from the
/// ledger on read; when the ledger is unreachable the cached value is
/// served as-is.
pub async fn get_wallet(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    ensure(auth.role, Capability::UseWallet)?;

    let repo = WalletRepository::new(state.pool.clone());
    let wallet = repo
        .find_by_user(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Wallet not found".to_string()))?;

    let wallet = refresh_balance(&state, &repo, wallet).await?;

    Ok((
        StatusCode::OK,
        Json(WalletResponse::from(Wallet::from(wallet))),
    ))
}

/// POST /api/v1/wallet
///
/// Provision a wallet for the caller. Each user holds at most one.
pub async fn create_wallet(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    ensure(auth.role, Capability::UseWallet)?;

    let repo = WalletRepository::new(state.pool.clone());
    if repo.find_by_user(auth.user_id).await?.is_some() {
        return Err(ApiError::Conflict("Wallet already exists".to_string()));
    }

    let keypair = generate_wallet_keypair();
    let wallet = repo
        .create(auth.user_id, &keypair.address, &keypair.private_key)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                ApiError::Conflict("Wallet already exists".to_string())
            }
            _ => e.into(),
        })?;

    info!(
        user_id = %auth.user_id,
        wallet_id = %wallet.id,
        address = %wallet.address,
        "Wallet provisioned"
    );

    Ok((
        StatusCode::CREATED,
        Json(WalletResponse::from(Wallet::from(wallet))),
    ))
}

#[derive(Debug, Deserialize)]
pub struct TransactionListParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}
fn default_per_page() -> u32 {
    20
}

/// GET /api/v1/wallet/transactions
pub async fn list_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<TransactionListParams>,
) -> Result<impl IntoResponse, ApiError> {
    ensure(auth.role, Capability::UseWallet)?;

    let page = params.page.max(1);
    let per_page = params.per_page.clamp(1, 100);
    let offset = (page as i64 - 1) * per_page as i64;

    let repo = TransactionLogRepository::new(state.pool.clone());
    let (entities, total) = tokio::try_join!(
        repo.list_for_user(auth.user_id, per_page as i64, offset),
        repo.count_for_user(auth.user_id),
    )?;

    let transactions: Vec<TransactionLog> = entities.into_iter().map(Into::into).collect();

    Ok((
        StatusCode::OK,
        Json(TransactionHistoryResponse {
            transactions,
            total,
            page,
            per_page,
        }),
    ))
}

/// Mirror the ledger balance into the cache column, serving the cached row
/// when the ledger call fails.
async fn refresh_balance(
    state: &AppState,
    repo: &WalletRepository,
    wallet: WalletEntity,
) -> Result<WalletEntity, ApiError> {
    match state.ledger.balance_of(&wallet.address).await {
        Ok(balance) if balance != wallet.balance => {
            Ok(repo.sync_balance(wallet.id, balance).await?.unwrap_or(wallet))
        }
        Ok(_) => Ok(wallet),
        Err(e) => {
            warn!(
                wallet_id = %wallet.id,
                error = %e,
                "Ledger balance refresh failed, serving cached balance"
            );
            Ok(wallet)
        }
    }
}
