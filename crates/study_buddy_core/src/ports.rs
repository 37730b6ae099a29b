//! crates/study_buddy_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like the user file
//! or the Google APIs.

use crate::domain::{
    CalendarEvents, CalendarToken, CreatedCalendarEvent, NewCalendarEvent, User,
};
use async_trait::async_trait;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., file system, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Item already exists: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Every user, in the order they signed up.
    async fn list_users(&self) -> PortResult<Vec<User>>;

    async fn get_user(&self, email: &str) -> PortResult<User>;

    /// Persists a new user. Fails with `PortError::Conflict` when the email is taken.
    async fn create_user(&self, user: User) -> PortResult<User>;
}

#[async_trait]
pub trait CalendarService: Send + Sync {
    /// The consent page the browser is redirected to.
    fn authorization_url(&self) -> String;

    /// Trades an authorization code for a token.
    async fn exchange_code(&self, code: &str) -> PortResult<CalendarToken>;

    /// Upcoming events on the primary calendar, refreshing the token if it expired.
    async fn list_upcoming_events(&self, token: &CalendarToken) -> PortResult<CalendarEvents>;

    /// Inserts an event on the primary calendar and returns the created
    /// resource, refreshing the token first if it expired.
    async fn create_event(
        &self,
        token: &CalendarToken,
        event: &NewCalendarEvent,
    ) -> PortResult<CreatedCalendarEvent>;
}

#[async_trait]
pub trait CalendarSessionStore: Send + Sync {
    async fn get_token(&self, session_id: &str) -> PortResult<Option<CalendarToken>>;

    async fn put_token(&self, session_id: &str, token: CalendarToken) -> PortResult<()>;

    async fn remove(&self, session_id: &str) -> PortResult<()>;
}
