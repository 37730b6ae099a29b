//! services/api/src/web/calendar.rs
//!
//! Google Calendar endpoints: the OAuth2 round trip, listing and creating
//! events, and dropping the connection. Every handler here runs behind
//! `load_calendar_session`.

use crate::error::HandlerError;
use crate::web::middleware::{clear_session_cookie, session_cookie, CalendarSession};
use crate::web::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::header,
    response::{IntoResponse, Redirect},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use study_buddy_core::domain::NewCalendarEvent;
use study_buddy_core::ports::PortError;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateEventRequest {
    pub summary: Option<String>,
    /// RFC 3339 date-time.
    pub start: Option<String>,
    /// RFC 3339 date-time.
    pub end: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Serialize, ToSchema)]
pub struct SessionDebugResponse {
    #[serde(rename = "hasTokens")]
    pub has_tokens: bool,
    pub scope: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub expiry_date: Option<i64>,
}

/// Maps a calendar port failure onto a response. A rejected token means the
/// user has to reconnect; anything else is reported generically.
fn calendar_error(message: &'static str) -> impl Fn(PortError) -> HandlerError {
    move |e| match e {
        PortError::Unauthorized => HandlerError::NotConnected,
        other => {
            error!("{}: {:?}", message, other);
            HandlerError::Upstream(message)
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /auth/google - Redirect to Google's consent page
#[utoipa::path(
    get,
    path = "/auth/google",
    responses(
        (status = 303, description = "Redirect to Google"),
        (status = 503, description = "Calendar integration is not configured")
    )
)]
pub async fn google_auth_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<CalendarSession>,
) -> Result<impl IntoResponse, HandlerError> {
    let calendar = state.calendar()?;
    let id = session.id.unwrap_or_else(|| Uuid::new_v4().to_string());

    Ok((
        [(header::SET_COOKIE, session_cookie(&id, &state.config))],
        Redirect::to(&calendar.authorization_url()),
    ))
}

/// GET /auth/google/callback - Finish the OAuth2 exchange
#[utoipa::path(
    get,
    path = "/auth/google/callback",
    params(("code" = String, Query, description = "Authorization code from Google.")),
    responses(
        (status = 303, description = "Connected; redirect back to the frontend"),
        (status = 500, description = "Auth error")
    )
)]
pub async fn google_callback_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<CalendarSession>,
    Query(query): Query<CallbackQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let calendar = state.calendar()?;

    let code = query.code.filter(|c| !c.is_empty()).ok_or_else(|| {
        error!("OAuth callback without a code (error: {:?})", query.error);
        HandlerError::Upstream("Auth error")
    })?;

    let token = calendar
        .exchange_code(&code)
        .await
        .map_err(|e| {
            error!("OAuth callback error: {:?}", e);
            HandlerError::Upstream("Auth error")
        })?;

    let id = session.id.unwrap_or_else(|| Uuid::new_v4().to_string());
    state.sessions.put_token(&id, token).await?;
    info!("Calendar connected for session {}", id);

    let target = format!("{}/", state.config.frontend_origin.trim_end_matches('/'));
    Ok((
        [(header::SET_COOKIE, session_cookie(&id, &state.config))],
        Redirect::to(&target),
    ))
}

/// GET /api/calendar/events - Upcoming events on the primary calendar
#[utoipa::path(
    get,
    path = "/api/calendar/events",
    responses(
        (status = 200, description = "Up to ten upcoming events, as returned by Google"),
        (status = 401, description = "Not connected"),
        (status = 500, description = "Google error")
    )
)]
pub async fn list_events_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<CalendarSession>,
) -> Result<impl IntoResponse, HandlerError> {
    let calendar = state.calendar()?;
    let (Some(id), Some(token)) = (session.id, session.token) else {
        return Err(HandlerError::NotConnected);
    };

    let events = calendar
        .list_upcoming_events(&token)
        .await
        .map_err(calendar_error("Google error"))?;

    if let Some(refreshed) = events.refreshed {
        state.sessions.put_token(&id, refreshed).await?;
    }

    Ok(Json(events.items))
}

/// POST /api/calendar/events - Create an event on the primary calendar
#[utoipa::path(
    post,
    path = "/api/calendar/events",
    request_body = CreateEventRequest,
    responses(
        (status = 200, description = "The created event, as returned by Google"),
        (status = 400, description = "Missing summary/start/end"),
        (status = 401, description = "Not connected"),
        (status = 500, description = "Failed to create event")
    )
)]
pub async fn create_event_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<CalendarSession>,
    payload: Result<Json<CreateEventRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let calendar = state.calendar()?;
    let (Some(id), Some(token)) = (session.id, session.token) else {
        return Err(HandlerError::NotConnected);
    };
    let Json(req) = payload?;

    let non_empty = |field: Option<String>| field.filter(|v| !v.trim().is_empty());
    let (Some(summary), Some(start), Some(end)) =
        (non_empty(req.summary), non_empty(req.start), non_empty(req.end))
    else {
        return Err(HandlerError::Validation("Missing summary/start/end".to_string()));
    };

    let created = calendar
        .create_event(&token, &NewCalendarEvent { summary, start, end })
        .await
        .map_err(calendar_error("Failed to create event"))?;

    if let Some(refreshed) = created.refreshed {
        state.sessions.put_token(&id, refreshed).await?;
    }

    Ok(Json(created.event))
}

/// POST /api/calendar/disconnect - Forget the calendar token
#[utoipa::path(
    post,
    path = "/api/calendar/disconnect",
    responses((status = 200, description = "Disconnected", body = OkResponse))
)]
pub async fn disconnect_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<CalendarSession>,
) -> Result<impl IntoResponse, HandlerError> {
    if let Some(id) = &session.id {
        state.sessions.remove(id).await?;
        info!("Calendar disconnected for session {}", id);
    }

    Ok((
        [(header::SET_COOKIE, clear_session_cookie(&state.config))],
        Json(OkResponse { ok: true }),
    ))
}

/// GET /api/debug/session - What the current session holds, without the secrets
#[utoipa::path(
    get,
    path = "/api/debug/session",
    responses((status = 200, description = "Session summary", body = SessionDebugResponse))
)]
pub async fn debug_session_handler(
    Extension(session): Extension<CalendarSession>,
) -> Json<SessionDebugResponse> {
    let token = session.token.unwrap_or_default();
    Json(SessionDebugResponse {
        has_tokens: token.has_credentials(),
        scope: token.scope,
        expiry_date: token.expiry_date.map(|expiry| expiry.timestamp_millis()),
    })
}
