//! crates/study_buddy_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any storage or wire format; adapters map
//! their own records onto them.

use chrono::{DateTime, NaiveTime, Timelike, Utc, Weekday};
use std::str::FromStr;

//=========================================================================================
// Parse Errors
//=========================================================================================

/// Raised when an availability slot or a match window cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotParseError {
    #[error("'{0}' is not a weekday")]
    InvalidDay(String),
    #[error("'{0}' is not a time of day (expected HH:MM)")]
    InvalidTime(String),
    #[error("'{0}' is not of the form 'Mon 15:00-16:00'")]
    Malformed(String),
}

//=========================================================================================
// Class Lists
//=========================================================================================

/// The normalized set of class codes a user is enrolled in.
///
/// Codes are trimmed, empty codes are dropped and repeats collapse onto the
/// first occurrence. Comparison is exact: `MTH121` and `mth121` are different
/// classes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList(Vec<String>);

impl ClassList {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for code in codes {
            let code = code.as_ref().trim();
            if code.is_empty() || normalized.iter().any(|c| c == code) {
                continue;
            }
            normalized.push(code.to_string());
        }
        Self(normalized)
    }

    /// Parses a comma-joined list such as `"MTH121, BEM329"`.
    pub fn parse(joined: &str) -> Self {
        Self::new(joined.split(','))
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.iter().any(|c| c == code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

//=========================================================================================
// Slots and Windows
//=========================================================================================

/// A single weekly availability interval belonging to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub day: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// A query interval used to look for study partners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub day: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Slot {
    pub fn new(day: Weekday, start: NaiveTime, end: NaiveTime) -> Self {
        Self { day, start, end }
    }

    /// Builds a slot from its three textual fields, e.g. `("Mon", "15:00", "16:00")`.
    pub fn from_parts(day: &str, start: &str, end: &str) -> Result<Self, SlotParseError> {
        Ok(Self::new(parse_weekday(day)?, parse_time(start)?, parse_time(end)?))
    }

    /// Half-open intersection on the same day. Touching endpoints do not overlap.
    pub fn overlaps(&self, window: &TimeWindow) -> bool {
        self.day == window.day && !(self.end <= window.start || self.start >= window.end)
    }
}

impl TimeWindow {
    pub fn new(day: Weekday, start: NaiveTime, end: NaiveTime) -> Self {
        Self { day, start, end }
    }

    pub fn from_parts(day: &str, start: &str, end: &str) -> Result<Self, SlotParseError> {
        Ok(Self::new(parse_weekday(day)?, parse_time(start)?, parse_time(end)?))
    }
}

impl FromStr for Slot {
    type Err = SlotParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (day, start, end) = split_interval(s)?;
        Self::from_parts(day, start, end)
    }
}

impl FromStr for TimeWindow {
    type Err = SlotParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (day, start, end) = split_interval(s)?;
        Self::from_parts(day, start, end)
    }
}

/// Splits `"Mon 15:00-16:00"` into its day, start and end parts.
fn split_interval(s: &str) -> Result<(&str, &str, &str), SlotParseError> {
    let malformed = || SlotParseError::Malformed(s.trim().to_string());
    let (day, range) = s.trim().split_once(char::is_whitespace).ok_or_else(malformed)?;
    let (start, end) = range.trim().split_once('-').ok_or_else(malformed)?;
    Ok((day, start, end))
}

/// Parses a comma-separated availability string such as
/// `"Mon 15:00-16:00, Wed 18:00-19:00"`. Empty entries are skipped.
pub fn parse_availability(text: &str) -> Result<Vec<Slot>, SlotParseError> {
    text.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::parse)
        .collect()
}

/// Accepts short or long weekday names in any case (`Mon`, `monday`).
pub fn parse_weekday(s: &str) -> Result<Weekday, SlotParseError> {
    s.trim()
        .parse::<Weekday>()
        .map_err(|_| SlotParseError::InvalidDay(s.trim().to_string()))
}

/// Accepts `HH:MM` or `HH:MM:SS`.
pub fn parse_time(s: &str) -> Result<NaiveTime, SlotParseError> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| SlotParseError::InvalidTime(s.to_string()))
}

/// Renders a time as `HH:MM`, keeping seconds only when they are set.
pub fn format_time(time: NaiveTime) -> String {
    if time.second() == 0 {
        time.format("%H:%M").to_string()
    } else {
        time.format("%H:%M:%S").to_string()
    }
}

//=========================================================================================
// Users and Groups
//=========================================================================================

/// Represents a registered student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub email: String,
    /// PHC-formatted password hash. Never leaves the service.
    pub password_hash: String,
    pub classes: ClassList,
    pub availability: Vec<Slot>,
}

/// A member entry inside a class bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMember {
    pub email: String,
    pub availability: Vec<Slot>,
}

/// All users sharing a class code. Derived on every request, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub class_name: String,
    pub members: Vec<GroupMember>,
}

//=========================================================================================
// Calendar
//=========================================================================================

/// The OAuth2 credentials for a user's Google Calendar.
/// Opaque to everything except the calendar adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarToken {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
    pub token_type: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
}

impl CalendarToken {
    pub fn has_credentials(&self) -> bool {
        self.access_token.is_some() || self.refresh_token.is_some()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date.is_some_and(|expiry| expiry <= now)
    }

    /// Overlays the fields present in `newer`. Google omits the refresh token
    /// on refresh responses, so the old one must survive.
    pub fn merge(self, newer: CalendarToken) -> CalendarToken {
        CalendarToken {
            access_token: newer.access_token.or(self.access_token),
            refresh_token: newer.refresh_token.or(self.refresh_token),
            scope: newer.scope.or(self.scope),
            token_type: newer.token_type.or(self.token_type),
            expiry_date: newer.expiry_date.or(self.expiry_date),
        }
    }
}

/// A request to create an event on the user's primary calendar.
/// `start` and `end` are RFC 3339 date-times, passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCalendarEvent {
    pub summary: String,
    pub start: String,
    pub end: String,
}

/// Upcoming events plus the token that produced them, if it had to be refreshed.
#[derive(Debug, Clone)]
pub struct CalendarEvents {
    pub items: Vec<serde_json::Value>,
    pub refreshed: Option<CalendarToken>,
}

/// A created event as returned by the provider, plus the refreshed token if
/// one was needed to create it.
#[derive(Debug, Clone)]
pub struct CreatedCalendarEvent {
    pub event: serde_json::Value,
    pub refreshed: Option<CalendarToken>,
}
