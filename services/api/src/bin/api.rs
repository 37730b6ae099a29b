//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{GoogleCalendarAdapter, JsonFileStore, MemorySessionStore},
    config::Config,
    error::ApiError,
    web::{self, state::AppState},
};
use std::sync::Arc;
use study_buddy_core::ports::CalendarService;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Open the User Store ---
    info!("Using user store at {}", config.data_path.display());
    let store = Arc::new(JsonFileStore::new(config.data_path.clone()));
    store
        .ensure_exists()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    // --- 3. Initialize the Calendar Adapter ---
    let calendar: Option<Arc<dyn CalendarService>> = match &config.google {
        Some(google) => Some(Arc::new(GoogleCalendarAdapter::new(
            reqwest::Client::new(),
            google.clone(),
            config.calendar_time_zone.clone(),
        ))),
        None => {
            warn!("GOOGLE_CLIENT_ID not set; calendar endpoints are disabled");
            None
        }
    };

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        users: store,
        calendar,
        sessions: Arc::new(MemorySessionStore::new()),
        config: config.clone(),
    });

    // --- 5. Create the Web Router ---
    let app = web::router(app_state)?;

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
