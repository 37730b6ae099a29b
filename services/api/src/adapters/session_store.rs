//! services/api/src/adapters/session_store.rs
//!
//! In-memory implementation of the `CalendarSessionStore` port. Tokens are
//! lost on restart; users simply reconnect their calendar.

use async_trait::async_trait;
use std::collections::HashMap;
use study_buddy_core::domain::CalendarToken;
use study_buddy_core::ports::{CalendarSessionStore, PortResult};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, CalendarToken>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CalendarSessionStore for MemorySessionStore {
    async fn get_token(&self, session_id: &str) -> PortResult<Option<CalendarToken>> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn put_token(&self, session_id: &str, token: CalendarToken) -> PortResult<()> {
        self.sessions
            .write()
            .await
            .insert(session_id.to_string(), token);
        Ok(())
    }

    async fn remove(&self, session_id: &str) -> PortResult<()> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }
}
