//! services/api/src/adapters/google_calendar.rs
//!
//! This module contains the adapter for Google OAuth2 and the Calendar v3 API.
//! It implements the `CalendarService` port from the `core` crate. Event
//! payloads are passed through untouched.

use crate::config::GoogleConfig;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use study_buddy_core::domain::{
    CalendarEvents, CalendarToken, CreatedCalendarEvent, NewCalendarEvent,
};
use study_buddy_core::ports::{CalendarService, PortError, PortResult};
use tracing::{debug, error};

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const EVENTS_URL: &str = "https://www.googleapis.com/calendar/v3/calendars/primary/events";
const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
const MAX_EVENTS: &str = "10";

/// The token endpoint's response body.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    scope: Option<String>,
    token_type: Option<String>,
    expires_in: Option<i64>,
}

impl TokenResponse {
    fn to_domain(self) -> CalendarToken {
        CalendarToken {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            scope: self.scope,
            token_type: self.token_type,
            expiry_date: self.expires_in.map(|secs| Utc::now() + Duration::seconds(secs)),
        }
    }
}

/// Where the adapter sends its requests.
#[derive(Debug, Clone)]
pub struct GoogleEndpoints {
    pub auth_url: String,
    pub token_url: String,
    /// The `primary` calendar's events collection.
    pub events_url: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            auth_url: AUTH_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            events_url: EVENTS_URL.to_string(),
        }
    }
}

/// An adapter that implements `CalendarService` using Google's REST endpoints.
#[derive(Clone)]
pub struct GoogleCalendarAdapter {
    http: Client,
    config: GoogleConfig,
    time_zone: String,
    endpoints: GoogleEndpoints,
}

impl GoogleCalendarAdapter {
    /// Creates a new `GoogleCalendarAdapter` talking to Google.
    pub fn new(http: Client, config: GoogleConfig, time_zone: String) -> Self {
        Self {
            http,
            config,
            time_zone,
            endpoints: GoogleEndpoints::default(),
        }
    }

    /// Points the adapter at other endpoints, e.g. a local stand-in server.
    pub fn with_endpoints(mut self, endpoints: GoogleEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> PortResult<CalendarToken> {
        let response = self
            .http
            .post(&self.endpoints.token_url)
            .form(params)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("Token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Google token endpoint returned {}: {}", status, body);
            return Err(match status {
                StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => PortError::Unauthorized,
                _ => PortError::Unexpected(format!("Token endpoint returned {}", status)),
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(format!("Unreadable token response: {}", e)))?;
        Ok(token.to_domain())
    }

    async fn refresh(&self, token: &CalendarToken) -> PortResult<CalendarToken> {
        let refresh_token = token.refresh_token.as_deref().ok_or(PortError::Unauthorized)?;
        debug!("Refreshing expired calendar token");
        let fresh = self
            .request_token(&[
                ("refresh_token", refresh_token),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .await?;
        Ok(token.clone().merge(fresh))
    }

    /// Returns a usable token, plus the refreshed token when a refresh happened.
    async fn active_token(
        &self,
        token: &CalendarToken,
    ) -> PortResult<(CalendarToken, Option<CalendarToken>)> {
        if token.is_expired(Utc::now()) && token.refresh_token.is_some() {
            let fresh = self.refresh(token).await?;
            Ok((fresh.clone(), Some(fresh)))
        } else {
            Ok((token.clone(), None))
        }
    }
}

/// Maps a non-success Calendar API response onto a port error.
async fn check_response(response: reqwest::Response) -> PortResult<Value> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(PortError::Unauthorized);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!("Google Calendar returned {}: {}", status, body);
        return Err(PortError::Unexpected(format!("Calendar API returned {}", status)));
    }
    response
        .json()
        .await
        .map_err(|e| PortError::Unexpected(format!("Unreadable calendar response: {}", e)))
}

//=========================================================================================
// `CalendarService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CalendarService for GoogleCalendarAdapter {
    fn authorization_url(&self) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", self.config.client_id.as_str())
            .append_pair("redirect_uri", self.config.redirect_uri.as_str())
            .append_pair("response_type", "code")
            .append_pair("scope", CALENDAR_SCOPE)
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent")
            .append_pair("include_granted_scopes", "true")
            .finish();
        format!("{}?{}", self.endpoints.auth_url, query)
    }

    async fn exchange_code(&self, code: &str) -> PortResult<CalendarToken> {
        self.request_token(&[
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .await
    }

    async fn list_upcoming_events(&self, token: &CalendarToken) -> PortResult<CalendarEvents> {
        let (active, refreshed) = self.active_token(token).await?;
        let access_token = active.access_token.as_deref().ok_or(PortError::Unauthorized)?;

        let time_min = Utc::now().to_rfc3339();
        let response = self
            .http
            .get(&self.endpoints.events_url)
            .bearer_auth(access_token)
            .query(&[
                ("timeMin", time_min.as_str()),
                ("maxResults", MAX_EVENTS),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ])
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("Calendar request failed: {}", e)))?;

        let body = check_response(response).await?;
        let items = body
            .get("items")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        Ok(CalendarEvents { items, refreshed })
    }

    async fn create_event(
        &self,
        token: &CalendarToken,
        event: &NewCalendarEvent,
    ) -> PortResult<CreatedCalendarEvent> {
        let (active, refreshed) = self.active_token(token).await?;
        let access_token = active.access_token.as_deref().ok_or(PortError::Unauthorized)?;

        let body = json!({
            "summary": event.summary,
            "start": { "dateTime": event.start, "timeZone": self.time_zone },
            "end": { "dateTime": event.end, "timeZone": self.time_zone },
        });

        let response = self
            .http
            .post(&self.endpoints.events_url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("Calendar request failed: {}", e)))?;

        let created = check_response(response).await?;
        Ok(CreatedCalendarEvent {
            event: created,
            refreshed,
        })
    }
}
