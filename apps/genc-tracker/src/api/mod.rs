//! # GenC Tracker HTTP API
//!
//! REST API over a shared [`Tracker`], built on axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check (never authenticated)
//! - `GET /status` - Record counts, GenCs per status, matrix totals
//! - `GET /skill-matrix[?gaps_only=true]` - Per-GenC skill gap report
//! - `GET /role-requirements-matrix` - Requirements grouped by role
//! - `GET /enums/{kind}` - Reference data (`{ KEY: label }`)
//! - `GET /enums/status-transitions` - The lifecycle table
//! - `POST /status-transitions/check` - Dry-run a status change
//! - `POST /gencs/{id}/status` - Change a GenC's status
//! - CRUD under `/accounts`, `/account-service-lines`, `/mentors`, `/skills`,
//!   `/gencs`, `/genc-skills`, `/role-skill-requirements`, `/genc-feedbacks`,
//!   `/application-users`, plus nested lookups
//!
//! ## Security Configuration (Environment Variables)
//!
//! - `GENC_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `GENC_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)
//! - `GENC_API_KEY`: If set, requires Bearer token authentication

mod auth;
mod error;
mod handlers;
mod middleware;
mod records;
mod types;

pub use auth::get_api_key_from_env;
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use middleware::create_rate_limiter;
pub use types::{
    HealthResponse, MatrixQuery, MessageResponse, PageQuery, StatusChangeRequest, StatusResponse,
    TransitionCheckRequest, TransitionCheckResponse,
};

use crate::config::ServerConfig;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use genc_core::{GencError, Tracker};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Largest accepted request body (2 MiB).
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state containing the tracker.
#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<RwLock<Tracker>>,
}

impl AppState {
    /// Create new app state around a tracker.
    #[must_use]
    pub fn new(tracker: Tracker) -> Self {
        Self {
            tracker: Arc::new(RwLock::new(tracker)),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

const ALLOWED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
];

/// Build the CORS layer.
///
/// - `Some("*")`: any origin (development only)
/// - `Some(list)`: the comma-separated origins that parse
/// - `None`, or a list with nothing valid: localhost only
fn build_cors_layer(origins: Option<&str>) -> CorsLayer {
    match origins {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins. This is insecure for production!");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods(ALLOWED_METHODS)
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            }
        }
        None => {
            tracing::info!("CORS: No origins configured, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .into_iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(ALLOWED_METHODS)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTES
// =============================================================================

fn routes() -> Router<AppState> {
    use records::{
        accounts, feedbacks, genc_skills, gencs, mentors, requirements, service_lines, skills,
        users,
    };

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        // Reports
        .route("/skill-matrix", get(handlers::skill_matrix_handler))
        .route(
            "/role-requirements-matrix",
            get(handlers::role_requirements_matrix_handler),
        )
        // Reference data
        .route("/enums/status", get(handlers::status_enum_handler))
        .route("/enums/location", get(handlers::location_enum_handler))
        .route("/enums/designation", get(handlers::designation_enum_handler))
        .route(
            "/enums/mentor-designation",
            get(handlers::mentor_designation_enum_handler),
        )
        .route("/enums/user-type", get(handlers::user_type_enum_handler))
        .route(
            "/enums/proficiency-level",
            get(handlers::proficiency_level_enum_handler),
        )
        .route(
            "/enums/status-transitions",
            get(handlers::status_transitions_handler),
        )
        .route(
            "/status-transitions/check",
            post(handlers::check_transition_handler),
        )
        // Accounts
        .route("/accounts", get(accounts::list).post(accounts::create))
        .route(
            "/accounts/{id}",
            get(accounts::get).put(accounts::update).delete(accounts::delete),
        )
        .route("/accounts/by-name/{name}", get(records::account_by_name))
        .route(
            "/accounts/{id}/service-lines",
            get(records::service_lines_for_account),
        )
        // Service lines
        .route(
            "/account-service-lines",
            get(service_lines::list).post(service_lines::create),
        )
        .route(
            "/account-service-lines/{id}",
            get(service_lines::get)
                .put(service_lines::update)
                .delete(service_lines::delete),
        )
        // Mentors
        .route("/mentors", get(mentors::list).post(mentors::create))
        .route(
            "/mentors/{id}",
            get(mentors::get).put(mentors::update).delete(mentors::delete),
        )
        .route(
            "/mentors/by-associate/{associate_id}",
            get(records::mentor_by_associate_id),
        )
        // Skills
        .route("/skills", get(skills::list).post(skills::create))
        .route(
            "/skills/{id}",
            get(skills::get).put(skills::update).delete(skills::delete),
        )
        .route("/skills/by-name/{name}", get(records::skill_by_name))
        .route("/skills/category/{category}", get(records::skills_by_category))
        .route("/skills/{id}/gencs", get(records::gencs_with_skill))
        // GenCs
        .route("/gencs", get(gencs::list).post(gencs::create))
        .route(
            "/gencs/{id}",
            get(gencs::get).put(gencs::update).delete(gencs::delete),
        )
        .route(
            "/gencs/by-associate/{associate_id}",
            get(records::genc_by_associate_id),
        )
        .route("/gencs/by-status/{status}", get(records::gencs_with_status))
        .route("/gencs/{id}/skills", get(records::skills_for_genc))
        .route("/gencs/{id}/feedbacks", get(records::feedback_for_genc))
        .route("/gencs/{id}/status", post(handlers::change_status_handler))
        // GenC skills
        .route(
            "/genc-skills",
            get(genc_skills::list).post(genc_skills::create),
        )
        .route(
            "/genc-skills/{id}",
            get(genc_skills::get)
                .put(genc_skills::update)
                .delete(genc_skills::delete),
        )
        // Role requirements
        .route(
            "/role-skill-requirements",
            get(requirements::list).post(requirements::create),
        )
        .route(
            "/role-skill-requirements/{id}",
            get(requirements::get)
                .put(requirements::update)
                .delete(requirements::delete),
        )
        .route("/roles/{role}/requirements", get(records::requirements_for_role))
        // Feedback
        .route(
            "/genc-feedbacks",
            get(feedbacks::list).post(feedbacks::create),
        )
        .route(
            "/genc-feedbacks/{id}",
            get(feedbacks::get)
                .put(feedbacks::update)
                .delete(feedbacks::delete),
        )
        // Users
        .route(
            "/application-users",
            get(users::list).post(users::create),
        )
        .route(
            "/application-users/{id}",
            get(users::get).put(users::update).delete(users::delete),
        )
        .route(
            "/application-users/by-associate/{assoc_id}",
            get(records::user_by_assoc_id),
        )
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the router from environment configuration alone.
pub fn create_router(state: AppState) -> Router {
    create_router_with(state, &ServerConfig::from_env(), get_api_key_from_env())
}

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
/// 4. Rate Limiting (if enabled)
/// 5. Authentication (if a key is given)
pub fn create_router_with(
    state: AppState,
    config: &ServerConfig,
    api_key: Option<String>,
) -> Router {
    let mut router = routes();

    // Innermost, so rejected requests never reach a handler.
    match api_key {
        Some(key) => {
            tracing::info!("API key authentication enabled");
            router = router.layer(axum_middleware::from_fn_with_state(
                auth::ApiKey::from(key),
                auth::api_key_auth_middleware,
            ));
        }
        None => tracing::warn!(
            "API key authentication DISABLED - all endpoints are publicly accessible! \
             Set GENC_API_KEY to enable authentication."
        ),
    }

    if config.rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", config.rate_limit);
        router = router.layer(axum_middleware::from_fn_with_state(
            create_rate_limiter(config.rate_limit),
            middleware::rate_limit_middleware,
        ));
    } else {
        tracing::info!("Rate limiting disabled");
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer(config.cors_origins.as_deref()))
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server and run until Ctrl-C.
pub async fn run_server(config: &ServerConfig, tracker: Tracker) -> Result<(), GencError> {
    let state = AppState::new(tracker);
    let router = create_router_with(state, config, get_api_key_from_env());

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| GencError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("GenC tracker HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| GencError::IoError(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
