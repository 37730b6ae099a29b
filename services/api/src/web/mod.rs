pub mod auth;
pub mod calendar;
pub mod middleware;
pub mod rest;
pub mod state;

use crate::error::ApiError;
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use middleware::load_calendar_session;
pub use rest::ApiDoc;
pub use state::AppState;

/// Builds the complete application router: API routes, calendar routes behind
/// the session middleware, CORS for the frontend, and the Swagger UI.
pub fn router(app_state: Arc<AppState>) -> Result<Router, ApiError> {
    let origin = HeaderValue::from_str(&app_state.config.frontend_origin).map_err(|e| {
        ApiError::Internal(format!(
            "Invalid frontend origin '{}': {}",
            app_state.config.frontend_origin, e
        ))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // Users, matching and groups
    let api_routes = Router::new()
        .route("/", get(rest::root_handler))
        .route("/api/health", get(rest::health_handler))
        .route(
            "/api/users",
            get(rest::list_users_handler).post(auth::signup_handler),
        )
        .route("/api/login", post(auth::login_handler))
        .route("/api/match", post(rest::match_handler))
        .route("/api/groups", get(rest::groups_handler));

    // Calendar routes (session cookie resolved by middleware)
    let calendar_routes = Router::new()
        .route("/auth/google", get(calendar::google_auth_handler))
        .route("/auth/google/callback", get(calendar::google_callback_handler))
        .route(
            "/api/calendar/events",
            get(calendar::list_events_handler).post(calendar::create_event_handler),
        )
        .route("/api/calendar/disconnect", post(calendar::disconnect_handler))
        .route("/api/debug/session", get(calendar::debug_session_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            load_calendar_session,
        ));

    let app = Router::new()
        .merge(api_routes)
        .merge(calendar_routes)
        .layer(cors)
        .with_state(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    Ok(app)
}
