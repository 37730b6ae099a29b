//! services/api/src/web/auth.rs
//!
//! Sign-up and login endpoints.

use crate::error::HandlerError;
use crate::web::rest::{SlotView, UserView};
use crate::web::state::AppState;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use study_buddy_core::domain::{parse_availability, ClassList, Slot, User};
use study_buddy_core::ports::PortError;
use tracing::{error, info, warn};
use utoipa::ToSchema;

//=========================================================================================
// Request/Response Types
//=========================================================================================

/// `classes` may be a list or a comma-joined string. Anything else is
/// accepted here and rejected with a readable message by the handler.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum ClassesInput {
    List(Vec<Value>),
    Joined(String),
    Other(Value),
}

/// `availability` may be a list of slots or text like `"Mon 15:00-16:00, Wed 18:00-19:00"`.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum AvailabilityInput {
    Slots(Vec<Value>),
    Text(String),
    Other(Value),
}

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    #[schema(value_type = Object)]
    pub classes: Option<ClassesInput>,
    #[schema(value_type = Object)]
    pub availability: Option<AvailabilityInput>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserView,
}

impl ClassesInput {
    fn to_domain(&self) -> Result<ClassList, HandlerError> {
        match self {
            ClassesInput::List(codes) => codes
                .iter()
                .map(|code| {
                    code.as_str().ok_or_else(|| {
                        HandlerError::Validation(format!(
                            "Invalid classes: {} is not a class code",
                            code
                        ))
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(ClassList::new),
            ClassesInput::Joined(joined) => Ok(ClassList::parse(joined)),
            ClassesInput::Other(other) => Err(HandlerError::Validation(format!(
                "Invalid classes: expected a list or a comma-separated string, got {}",
                other
            ))),
        }
    }
}

fn invalid_availability(reason: impl std::fmt::Display) -> HandlerError {
    HandlerError::Validation(format!("Invalid availability: {}", reason))
}

impl AvailabilityInput {
    fn to_domain(&self) -> Result<Vec<Slot>, HandlerError> {
        match self {
            AvailabilityInput::Slots(slots) => slots
                .iter()
                .map(|item| {
                    let slot: SlotView =
                        serde_json::from_value(item.clone()).map_err(invalid_availability)?;
                    Slot::from_parts(&slot.day, &slot.start, &slot.end)
                        .map_err(invalid_availability)
                })
                .collect(),
            AvailabilityInput::Text(text) => {
                parse_availability(text).map_err(invalid_availability)
            }
            AvailabilityInput::Other(other) => Err(invalid_availability(format!(
                "expected a list of slots or text, got {}",
                other
            ))),
        }
    }
}

/// Verified against when the email is unknown or the stored password is not a
/// hash, so every failed login costs one Argon2 run. Same parameters as
/// `Argon2::default()`.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Checks `password` against a stored PHC string. A missing or unreadable
/// hash still runs a full verification and then fails.
fn password_matches(password: &str, stored: Option<&str>) -> bool {
    let parsed = stored.and_then(|hash| PasswordHash::new(hash).ok());
    let usable = parsed.is_some();
    let hash = match parsed.map_or_else(|| PasswordHash::new(DUMMY_HASH), Ok) {
        Ok(hash) => hash,
        Err(e) => {
            error!("Dummy password hash is unreadable: {:?}", e);
            return false;
        }
    };
    let verified = Argon2::default()
        .verify_password(password.as_bytes(), &hash)
        .is_ok();
    usable && verified
}

/// Returns the field when it is present and not blank.
fn required(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.trim().is_empty())
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/users - Create a new user account
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Missing fields, bad availability, or email already registered"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let Json(req) = payload?;
    let (Some(email), Some(password)) = (required(req.email), required(req.password)) else {
        return Err(HandlerError::Validation("Email and password required.".to_string()));
    };

    let classes = match &req.classes {
        Some(input) => input.to_domain()?,
        None => ClassList::default(),
    };
    let availability = match &req.availability {
        Some(input) => input.to_domain()?,
        None => Vec::new(),
    };

    // 1. Hash the password
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            HandlerError::Internal(PortError::Unexpected("Failed to hash password".to_string()))
        })?
        .to_string();

    // 2. Store the user
    let user = state
        .users
        .create_user(User {
            email,
            password_hash,
            classes,
            availability,
        })
        .await
        .map_err(|e| match e {
            PortError::Conflict(_) => HandlerError::Validation("User already exists.".to_string()),
            other => HandlerError::Internal(other),
        })?;
    info!("New user signed up: {}", user.email);

    let response = AuthResponse {
        message: "User added successfully!".to_string(),
        user: UserView::from(&user),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/login - Check credentials
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let Json(req) = payload?;
    let (Some(email), Some(password)) = (req.email, req.password) else {
        return Err(HandlerError::InvalidCredentials);
    };

    // 1. Get user by email
    let user = match state.users.get_user(&email).await {
        Ok(user) => Some(user),
        Err(PortError::NotFound(_)) => None,
        Err(other) => return Err(HandlerError::Internal(other)),
    };

    // 2. Verify password, against the dummy hash when there is no user
    if let Some(user) = &user {
        if PasswordHash::new(&user.password_hash).is_err() {
            warn!("Stored password for {} is not a valid hash", user.email);
        }
    }
    let stored = user.as_ref().map(|u| u.password_hash.as_str());
    if !password_matches(&password, stored) {
        return Err(HandlerError::InvalidCredentials);
    }
    let Some(user) = user else {
        return Err(HandlerError::InvalidCredentials);
    };

    let response = AuthResponse {
        message: "Login successful".to_string(),
        user: UserView::from(&user),
    };
    Ok((StatusCode::OK, Json(response)))
}
