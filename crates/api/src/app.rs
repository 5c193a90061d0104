use anyhow::Context;
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_auth,
    security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{
    activities, admin_activities, admin_courses, admin_products, admin_semesters, courses,
    dashboard, health, shop, wallet,
};
use crate::services::ledger::{HttpLedgerService, InMemoryLedger, LedgerService};
use shared::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
    pub ledger: Arc<dyn LedgerService>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

/// Choose the ledger backend from config.
///
/// With no ledger URL configured the in-memory ledger backs the coin flows,
/// which keeps local development self-contained.
pub fn build_ledger(config: &Config) -> Arc<dyn LedgerService> {
    if config.ledger.url.is_empty() {
        tracing::warn!("No ledger URL configured, coin flows run on the in-memory ledger");
        Arc::new(InMemoryLedger::new())
    } else {
        Arc::new(HttpLedgerService::new(&config.ledger))
    }
}

/// Build the application router, choosing the ledger backend from config.
pub fn create_app(config: Config, pool: PgPool) -> anyhow::Result<Router> {
    let ledger = build_ledger(&config);
    create_app_with_ledger(config, pool, ledger)
}

/// Build the application router against an explicit ledger backend.
pub fn create_app_with_ledger(
    config: Config,
    pool: PgPool,
    ledger: Arc<dyn LedgerService>,
) -> anyhow::Result<Router> {
    let config = Arc::new(config);

    // The identity provider's key material is parsed once at startup
    let jwt = Arc::new(
        JwtConfig::with_leeway(
            &config.jwt.private_key,
            &config.jwt.public_key,
            config.jwt.access_token_expiry_secs,
            config.jwt.leeway_secs,
        )
        .context("Failed to initialize JWT configuration")?,
    );

    // Create rate limiter if rate limiting is enabled (rate_limit_per_minute > 0)
    let rate_limiter = if config.security.rate_limit_per_minute > 0 {
        Some(Arc::new(RateLimiterState::new(
            config.security.rate_limit_per_minute,
        )))
    } else {
        None
    };

    let state = AppState {
        pool,
        config: config.clone(),
        jwt,
        ledger,
        rate_limiter,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Production: only allow specified origins
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Authenticated routes. Role checks happen in the handlers through the
    // domain access policy, so students, teachers, staff and admins share
    // one router.
    // Middleware order: auth runs first, then rate limiting (which needs the
    // authenticated user id)
    let protected_routes = Router::new()
        // Course registration (v1)
        .route("/api/v1/courses/register", post(courses::register))
        .route(
            "/api/v1/courses/registrations/:offering_id",
            delete(courses::cancel_registration),
        )
        .route("/api/v1/courses/offerings", get(courses::list_offerings))
        .route(
            "/api/v1/courses/my-registrations",
            get(courses::my_registrations),
        )
        // Activities (v1)
        .route("/api/v1/activities", get(activities::list_activities))
        .route(
            "/api/v1/activities/:activity_id/register",
            post(activities::register),
        )
        // Wallet (v1)
        .route(
            "/api/v1/wallet",
            get(wallet::get_wallet).post(wallet::create_wallet),
        )
        .route(
            "/api/v1/wallet/transactions",
            get(wallet::list_transactions),
        )
        // Campus shop (v1)
        .route("/api/v1/shop/products", get(shop::list_products))
        .route("/api/v1/shop/checkout", post(shop::checkout))
        // Staff dashboard (v1)
        .route("/api/v1/staff/dashboard/stats", get(dashboard::get_stats))
        // Activity administration (v1)
        .route(
            "/api/v1/admin/activities",
            post(admin_activities::create_activity),
        )
        .route(
            "/api/v1/admin/activities/:activity_id/participants",
            get(admin_activities::list_participants),
        )
        .route(
            "/api/v1/admin/activities/:activity_id/approve/:student_code",
            post(admin_activities::approve_participant),
        )
        .route(
            "/api/v1/admin/activities/:activity_id/confirm-participation/:student_code",
            post(admin_activities::confirm_participation),
        )
        // Course administration (v1)
        .route("/api/v1/admin/offerings", post(admin_courses::create_offering))
        .route(
            "/api/v1/admin/courses/:offering_id/registrations/:student_code",
            delete(admin_courses::remove_registration),
        )
        // Semester administration (v1)
        .route(
            "/api/v1/admin/semesters",
            post(admin_semesters::create_semester).get(admin_semesters::list_semesters),
        )
        .route(
            "/api/v1/admin/semesters/:semester_id/activate",
            post(admin_semesters::activate_semester),
        )
        // Product administration (v1)
        .route("/api/v1/admin/products", post(admin_products::create_product))
        // Rate limiting runs after auth (needs the user id from auth)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        // Auth runs first (outermost layer = runs first)
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Merge all routes
    let router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn(security_headers_middleware)) // Security headers
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware)) // Prometheus metrics
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id)) // Request ID and logging
        .layer(cors)
        .with_state(state);

    Ok(router)
}
