// SPDX-License-Identifier: MIT

//! Session-scoped check-in collection and its persistence capability.
//!
//! The collection is the only mutable shared state in the system. Readers
//! take an `Arc` snapshot; the single writer replaces the vector atomically
//! (copy-on-write), so analytics consumers never observe a partial write.

use crate::models::check_in::CheckIn;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Fixed storage key for the check-in collection.
pub const CHECK_INS_KEY: &str = "gym-pulse.check-ins";
/// Fixed storage key for the stable per-client user id.
pub const USER_ID_KEY: &str = "gym-pulse.user-id";

/// Check-ins older than this are dropped when the session loads.
pub const RETENTION_MS: i64 = 24 * 60 * 60 * 1000;

/// Persistence capability for session state, keyed by the fixed keys above.
pub trait SessionStore: Send + Sync {
    fn load_check_ins(&self) -> Result<Vec<CheckIn>, StoreError>;
    fn save_check_ins(&self, check_ins: &[CheckIn]) -> Result<(), StoreError>;
    fn load_user_id(&self) -> Result<Option<String>, StoreError>;
    fn save_user_id(&self, user_id: &str) -> Result<(), StoreError>;
}

/// Errors from the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to read store: {0}")]
    Read(String),

    #[error("Failed to write store: {0}")]
    Write(String),

    #[error("Corrupt store contents: {0}")]
    Corrupt(String),
}

// ─── Session ─────────────────────────────────────────────────

/// The client session's check-in collection plus its stable user id.
pub struct CheckInSession {
    store: Arc<dyn SessionStore>,
    check_ins: RwLock<Arc<Vec<CheckIn>>>,
    user_id: String,
}

impl CheckInSession {
    /// Load session state from the store.
    ///
    /// Check-ins older than 24 hours are discarded before use. A user id is
    /// generated and persisted on first load.
    pub fn load(store: Arc<dyn SessionStore>, now_ms: i64) -> Result<Self, StoreError> {
        let mut check_ins = store.load_check_ins()?;
        let before = check_ins.len();
        check_ins.retain(|c| now_ms - c.timestamp <= RETENTION_MS);
        if check_ins.len() != before {
            tracing::debug!(
                dropped = before - check_ins.len(),
                "Pruned expired check-ins on load"
            );
            store.save_check_ins(&check_ins)?;
        }

        let user_id = match store.load_user_id()? {
            Some(id) => id,
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                store.save_user_id(&id)?;
                tracing::info!("Generated new client user id");
                id
            }
        };

        Ok(Self {
            store,
            check_ins: RwLock::new(Arc::new(check_ins)),
            user_id,
        })
    }

    /// The stable pseudo-anonymous client id.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Current snapshot of the collection. Cheap to clone, never mutated.
    pub fn snapshot(&self) -> Arc<Vec<CheckIn>> {
        self.check_ins
            .read()
            .expect("check-in collection lock poisoned")
            .clone()
    }

    /// Append one check-in and persist the updated collection.
    pub fn append(&self, check_in: CheckIn) -> Result<(), StoreError> {
        let mut guard = self
            .check_ins
            .write()
            .expect("check-in collection lock poisoned");
        let mut updated: Vec<CheckIn> = guard.as_ref().clone();
        updated.push(check_in);
        self.store.save_check_ins(&updated)?;
        *guard = Arc::new(updated);
        Ok(())
    }
}

// ─── File-backed store ───────────────────────────────────────

/// JSON-file-backed store: one object holding both fixed keys.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    fn read_document(&self) -> Result<Value, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|e| StoreError::Corrupt(e.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(json!({})),
            Err(e) => Err(StoreError::Read(e.to_string())),
        }
    }

    fn write_document(&self, document: &Value) -> Result<(), StoreError> {
        let contents =
            serde_json::to_string_pretty(document).map_err(|e| StoreError::Write(e.to_string()))?;
        fs::write(&self.path, contents).map_err(|e| StoreError::Write(e.to_string()))
    }

    fn update_key(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut document = self.read_document()?;
        if !document.is_object() {
            return Err(StoreError::Corrupt(
                "store root must be a JSON object".to_string(),
            ));
        }
        document[key] = value;
        self.write_document(&document)
    }
}

impl SessionStore for JsonFileStore {
    fn load_check_ins(&self) -> Result<Vec<CheckIn>, StoreError> {
        let document = self.read_document()?;
        match document.get(CHECK_INS_KEY) {
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| StoreError::Corrupt(e.to_string())),
            None => Ok(Vec::new()),
        }
    }

    fn save_check_ins(&self, check_ins: &[CheckIn]) -> Result<(), StoreError> {
        let value =
            serde_json::to_value(check_ins).map_err(|e| StoreError::Write(e.to_string()))?;
        self.update_key(CHECK_INS_KEY, value)
    }

    fn load_user_id(&self) -> Result<Option<String>, StoreError> {
        let document = self.read_document()?;
        Ok(document
            .get(USER_ID_KEY)
            .and_then(|v| v.as_str())
            .map(String::from))
    }

    fn save_user_id(&self, user_id: &str) -> Result<(), StoreError> {
        self.update_key(USER_ID_KEY, json!(user_id))
    }
}

// ─── In-memory store ─────────────────────────────────────────

/// In-memory store for tests and offline demos.
#[derive(Default)]
pub struct MemoryStore {
    check_ins: RwLock<Vec<CheckIn>>,
    user_id: RwLock<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed the collection (e.g., with aged entries for pruning tests).
    pub fn with_check_ins(check_ins: Vec<CheckIn>) -> Self {
        Self {
            check_ins: RwLock::new(check_ins),
            user_id: RwLock::new(None),
        }
    }
}

impl SessionStore for MemoryStore {
    fn load_check_ins(&self) -> Result<Vec<CheckIn>, StoreError> {
        Ok(self.check_ins.read().expect("store lock poisoned").clone())
    }

    fn save_check_ins(&self, check_ins: &[CheckIn]) -> Result<(), StoreError> {
        *self.check_ins.write().expect("store lock poisoned") = check_ins.to_vec();
        Ok(())
    }

    fn load_user_id(&self) -> Result<Option<String>, StoreError> {
        Ok(self.user_id.read().expect("store lock poisoned").clone())
    }

    fn save_user_id(&self, user_id: &str) -> Result<(), StoreError> {
        *self.user_id.write().expect("store lock poisoned") = Some(user_id.to_string());
        Ok(())
    }
}
