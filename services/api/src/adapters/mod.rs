pub mod google_calendar;
pub mod json_store;
pub mod session_store;

pub use google_calendar::{GoogleCalendarAdapter, GoogleEndpoints};
pub use json_store::JsonFileStore;
pub use session_store::MemorySessionStore;
