//! Staff dashboard routes.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::auth::AuthUser;
use domain::services::access::{ensure, Capability};
use persistence::repositories::DashboardRepository;

/// GET /api/v1/staff/dashboard/stats
///
/// Read-only rollups over the shop: headline counts, trailing 7- and
/// 30-day revenue series (zero-filled), best sellers and stock buckets.
pub async fn get_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    ensure(auth.role, Capability::ViewDashboard)?;

    let stats = DashboardRepository::new(state.pool.clone())
        .get_stats(Utc::now().date_naive())
        .await?;

    Ok((StatusCode::OK, Json(stats)))
}
