//! services/api/src/web/middleware.rs
//!
//! Calendar session middleware and the `sb_sess` cookie helpers.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use study_buddy_core::domain::CalendarToken;
use tracing::error;

use crate::config::Config;
use crate::web::state::AppState;

pub const SESSION_COOKIE: &str = "sb_sess";
const SESSION_MAX_AGE_SECS: i64 = 30 * 24 * 60 * 60;

/// The calendar session attached to the current request.
#[derive(Clone, Debug, Default)]
pub struct CalendarSession {
    /// The cookie value, when the browser sent one.
    pub id: Option<String>,
    pub token: Option<CalendarToken>,
}

/// Middleware that resolves the `sb_sess` cookie to a stored calendar token.
///
/// Always inserts a `CalendarSession` into the request extensions; a missing
/// or unknown cookie yields an empty one. Handlers decide whether that is an error.
pub async fn load_calendar_session(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let id = session_id(req.headers());

    let token = match &id {
        Some(id) => state.sessions.get_token(id).await.map_err(|e| {
            error!("Failed to load calendar session: {:?}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?,
        None => None,
    };

    req.extensions_mut().insert(CalendarSession { id, token });
    Ok(next.run(req).await)
}

/// Parses the session id out of the `Cookie` header.
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    let prefix = format!("{}=", SESSION_COOKIE);
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|c| c.trim().strip_prefix(prefix.as_str()).map(str::to_string))
        .filter(|id| !id.is_empty())
}

pub fn session_cookie(id: &str, config: &Config) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}{}",
        SESSION_COOKIE,
        id,
        SESSION_MAX_AGE_SECS,
        secure_attribute(config)
    )
}

pub fn clear_session_cookie(config: &Config) -> String {
    format!(
        "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0{}",
        SESSION_COOKIE,
        secure_attribute(config)
    )
}

fn secure_attribute(config: &Config) -> &'static str {
    if config.cookie_secure {
        "; Secure"
    } else {
        ""
    }
}
