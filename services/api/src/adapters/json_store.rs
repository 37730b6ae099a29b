//! services/api/src/adapters/json_store.rs
//!
//! This module contains the storage adapter, the concrete implementation of the
//! `UserRepository` port from the `core` crate. All users live in one JSON
//! document of the form `{"users": [...]}` which is read whole and written whole.
//!
//! Records are kept exactly as they were found on disk; only the domain view is
//! normalized. That keeps untouched users byte-stable across writes even when
//! an older client stored `classes` as a comma-joined string, a `null`, or an
//! email that is not a string at all.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use study_buddy_core::domain::{format_time, parse_availability, ClassList, Slot, User};
use study_buddy_core::ports::{PortError, PortResult, UserRepository};
use tokio::sync::Mutex;
use tracing::{info, warn};

//=========================================================================================
// Errors
//=========================================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on user store: {0}")]
    Io(#[from] std::io::Error),
    #[error("User store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<StoreError> for PortError {
    fn from(e: StoreError) -> Self {
        PortError::Unexpected(e.to_string())
    }
}

//=========================================================================================
// "Impure" Document Record Structs
//=========================================================================================

/// The whole persisted document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(default)]
    pub users: Vec<UserRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A user exactly as stored.
///
/// `None` means the key was absent; an explicit `null` is kept as a value so
/// it is written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub email: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub password: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub classes: Option<ClassesField>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub availability: Option<AvailabilityField>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Deserializes a key that is present, `null` included, as `Some`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// `classes` has been written both as an array and as `"MTH121, BEM329"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassesField {
    List(Vec<Value>),
    Joined(String),
    Other(Value),
}

/// `availability` is normally an array of `{day, start, end}` objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AvailabilityField {
    Slots(Vec<Value>),
    Text(String),
    Other(Value),
}

#[derive(Debug, Serialize, Deserialize)]
struct SlotRecord {
    day: String,
    start: String,
    end: String,
}

impl ClassesField {
    fn to_domain(&self) -> ClassList {
        match self {
            ClassesField::List(items) => ClassList::new(items.iter().filter_map(Value::as_str)),
            ClassesField::Joined(joined) => ClassList::parse(joined),
            ClassesField::Other(_) => ClassList::default(),
        }
    }
}

impl AvailabilityField {
    fn to_domain(&self, email: &str) -> Vec<Slot> {
        match self {
            AvailabilityField::Slots(items) => items
                .iter()
                .filter_map(|item| {
                    let parsed = serde_json::from_value::<SlotRecord>(item.clone())
                        .map_err(|e| e.to_string())
                        .and_then(|r| {
                            Slot::from_parts(&r.day, &r.start, &r.end).map_err(|e| e.to_string())
                        });
                    match parsed {
                        Ok(slot) => Some(slot),
                        Err(e) => {
                            warn!("Skipping unreadable slot {} for {}: {}", item, email, e);
                            None
                        }
                    }
                })
                .collect(),
            AvailabilityField::Text(text) => parse_availability(text).unwrap_or_else(|e| {
                warn!("Ignoring unreadable availability for {}: {}", email, e);
                Vec::new()
            }),
            AvailabilityField::Other(_) => Vec::new(),
        }
    }
}

impl UserRecord {
    /// The stored email, when it is a string.
    fn email(&self) -> Option<&str> {
        self.email.as_ref().and_then(Value::as_str)
    }

    /// The domain view of this record. Records without a string email
    /// cannot be addressed and are left out.
    fn to_domain(&self) -> Option<User> {
        let Some(email) = self.email() else {
            warn!("Skipping stored user without a string email: {:?}", self.email);
            return None;
        };
        Some(User {
            email: email.to_string(),
            password_hash: self
                .password
                .as_ref()
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            classes: self
                .classes
                .as_ref()
                .map(ClassesField::to_domain)
                .unwrap_or_default(),
            availability: self
                .availability
                .as_ref()
                .map(|a| a.to_domain(email))
                .unwrap_or_default(),
        })
    }

    fn from_domain(user: &User) -> Result<Self, StoreError> {
        let slots = user
            .availability
            .iter()
            .map(|slot| {
                serde_json::to_value(SlotRecord {
                    day: slot.day.to_string(),
                    start: format_time(slot.start),
                    end: format_time(slot.end),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            email: Some(Value::String(user.email.clone())),
            password: Some(Value::String(user.password_hash.clone())),
            classes: Some(ClassesField::List(
                user.classes.iter().map(|c| Value::String(c.to_string())).collect(),
            )),
            availability: Some(AvailabilityField::Slots(slots)),
            extra: Map::new(),
        })
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A file-backed user store that implements the `UserRepository` port.
pub struct JsonFileStore {
    path: PathBuf,
    /// Held across every load-modify-save so concurrent sign-ups cannot lose
    /// each other's writes.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Creates a new `JsonFileStore`. Nothing is touched on disk until the
    /// first operation.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes an empty document when none exists yet. Run once at startup.
    pub async fn ensure_exists(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        if tokio::fs::try_exists(&self.path).await? {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        info!("No user store at {}, creating an empty one", self.path.display());
        self.save(&UserDocument::default()).await
    }

    /// Reads and parses the whole document.
    pub async fn load(&self) -> Result<UserDocument, StoreError> {
        let contents = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Replaces the document on disk. The new contents are written to a
    /// sibling temp file and renamed into place.
    pub async fn save(&self, document: &UserDocument) -> Result<(), StoreError> {
        let contents = serde_json::to_string_pretty(document)?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomically(&path, contents.as_bytes()))
            .await
            .map_err(|e| StoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
    }
}

fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

//=========================================================================================
// `UserRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl UserRepository for JsonFileStore {
    async fn list_users(&self) -> PortResult<Vec<User>> {
        let document = self.load().await?;
        Ok(document.users.iter().filter_map(UserRecord::to_domain).collect())
    }

    async fn get_user(&self, email: &str) -> PortResult<User> {
        let document = self.load().await?;
        document
            .users
            .iter()
            .find(|record| record.email() == Some(email))
            .and_then(UserRecord::to_domain)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", email)))
    }

    async fn create_user(&self, user: User) -> PortResult<User> {
        let _guard = self.write_lock.lock().await;

        let mut document = self.load().await?;
        let taken = document
            .users
            .iter()
            .any(|record| record.email() == Some(user.email.as_str()));
        if taken {
            return Err(PortError::Conflict(format!("User {} already exists", user.email)));
        }

        document.users.push(UserRecord::from_domain(&user)?);
        self.save(&document).await?;
        info!("Stored user {} ({} users total)", user.email, document.users.len());

        Ok(user)
    }
}
