//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the user, match and group endpoints, the
//! JSON views shared by every handler, and the master definition for the
//! OpenAPI specification.

use crate::error::HandlerError;
use crate::web::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use study_buddy_core::domain::{format_time, Group, Slot, TimeWindow, User};
use study_buddy_core::{find_matches, group_by_class};
use tracing::debug;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        list_users_handler,
        match_handler,
        groups_handler,
        crate::web::auth::signup_handler,
        crate::web::auth::login_handler,
        crate::web::calendar::google_auth_handler,
        crate::web::calendar::google_callback_handler,
        crate::web::calendar::list_events_handler,
        crate::web::calendar::create_event_handler,
        crate::web::calendar::disconnect_handler,
        crate::web::calendar::debug_session_handler,
    ),
    components(
        schemas(
            HealthResponse,
            UserView,
            SlotView,
            MatchRequest,
            MatchResponse,
            GroupView,
            MemberView,
            GroupsResponse,
            crate::web::auth::SignupRequest,
            crate::web::auth::LoginRequest,
            crate::web::auth::AuthResponse,
            crate::web::calendar::CreateEventRequest,
            crate::web::calendar::OkResponse,
            crate::web::calendar::SessionDebugResponse,
        )
    ),
    tags(
        (name = "Study Buddy API", description = "Find classmates with overlapping free time.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub ok: bool,
}

/// One availability slot as sent over the wire, e.g. `{"day":"Mon","start":"15:00","end":"16:00"}`.
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct SlotView {
    pub day: String,
    pub start: String,
    pub end: String,
}

impl From<&Slot> for SlotView {
    fn from(slot: &Slot) -> Self {
        Self {
            day: slot.day.to_string(),
            start: format_time(slot.start),
            end: format_time(slot.end),
        }
    }
}

/// The public view of a user. The password hash is never included.
#[derive(Serialize, Debug, ToSchema)]
pub struct UserView {
    pub email: String,
    pub classes: Vec<String>,
    pub availability: Vec<SlotView>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            classes: user.classes.iter().map(str::to_string).collect(),
            availability: user.availability.iter().map(SlotView::from).collect(),
        }
    }
}

/// Either `day`/`start`/`end` or a `timeSlot` such as `"Mon 15:00-16:00"`.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    pub class_name: Option<String>,
    pub day: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub time_slot: Option<String>,
}

impl MatchRequest {
    fn window(&self) -> Result<TimeWindow, HandlerError> {
        let parsed = match (&self.time_slot, &self.day, &self.start, &self.end) {
            (Some(slot), _, _, _) => slot.parse::<TimeWindow>(),
            (None, Some(day), Some(start), Some(end)) => TimeWindow::from_parts(day, start, end),
            _ => {
                return Err(HandlerError::Validation(
                    "day, start and end are required.".to_string(),
                ))
            }
        };
        parsed.map_err(|e| HandlerError::Validation(e.to_string()))
    }
}

#[derive(Serialize, ToSchema)]
pub struct MatchResponse {
    pub matches: Vec<UserView>,
}

#[derive(Serialize, ToSchema)]
pub struct MemberView {
    pub email: String,
    pub availability: Vec<SlotView>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupView {
    pub class_name: String,
    pub members: Vec<MemberView>,
}

impl From<Group> for GroupView {
    fn from(group: Group) -> Self {
        Self {
            class_name: group.class_name,
            members: group
                .members
                .iter()
                .map(|m| MemberView {
                    email: m.email.clone(),
                    availability: m.availability.iter().map(SlotView::from).collect(),
                })
                .collect(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct GroupsResponse {
    pub groups: Vec<GroupView>,
}

#[derive(Deserialize)]
pub struct GroupsQuery {
    pub email: Option<String>,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

pub async fn root_handler() -> &'static str {
    "Study Buddy API is running. Try /api/health"
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

/// List every registered user.
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All users", body = [UserView]),
        (status = 500, description = "User store unavailable")
    )
)]
pub async fn list_users_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HandlerError> {
    let users = state.users.list_users().await?;
    let views: Vec<UserView> = users.iter().map(UserView::from).collect();
    Ok(Json(views))
}

/// Find classmates whose availability overlaps a time window.
#[utoipa::path(
    post,
    path = "/api/match",
    request_body = MatchRequest,
    responses(
        (status = 200, description = "Matching users", body = MatchResponse),
        (status = 400, description = "Missing class name or unreadable window"),
        (status = 500, description = "User store unavailable")
    )
)]
pub async fn match_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MatchRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let Json(req) = payload?;
    let class_name = req
        .class_name
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| HandlerError::Validation("className is required.".to_string()))?;
    let window = req.window()?;

    let users = state.users.list_users().await?;
    let matches: Vec<UserView> = find_matches(&users, class_name, &window)
        .into_iter()
        .map(UserView::from)
        .collect();
    debug!("{} matches for {} on {:?}", matches.len(), class_name, window);

    Ok(Json(MatchResponse { matches }))
}

/// Group all users by class code, optionally only the groups of one user.
#[utoipa::path(
    get,
    path = "/api/groups",
    params(
        ("email" = Option<String>, Query, description = "Only return groups containing this member.")
    ),
    responses(
        (status = 200, description = "Class groups", body = GroupsResponse),
        (status = 500, description = "User store unavailable")
    )
)]
pub async fn groups_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GroupsQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let users = state.users.list_users().await?;
    let groups = group_by_class(&users, query.email.as_deref())
        .into_iter()
        .map(GroupView::from)
        .collect();
    Ok(Json(GroupsResponse { groups }))
}
