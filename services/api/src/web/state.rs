//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::error::HandlerError;
use std::sync::Arc;
use study_buddy_core::ports::{CalendarService, CalendarSessionStore, UserRepository};

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    /// `None` when no Google client is configured.
    pub calendar: Option<Arc<dyn CalendarService>>,
    pub sessions: Arc<dyn CalendarSessionStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn calendar(&self) -> Result<&Arc<dyn CalendarService>, HandlerError> {
        self.calendar.as_ref().ok_or(HandlerError::CalendarDisabled)
    }
}
