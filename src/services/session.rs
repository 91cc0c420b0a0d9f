//! Editing-session persistence.
//!
//! The working layout is stashed under a single key in a [`SessionStore`] so an
//! interrupted session can be restored. These operations never fail: backend
//! errors are logged and the operation becomes a no-op.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::constants::SESSION_STORAGE_KEY;
use crate::models::Layout;
use crate::services::layouts::{export_layout, parse_layout, write_atomic};

/// Key-value backend holding serialized sessions.
pub trait SessionStore {
    /// Reads the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>>;
    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    /// Deletes `key`; deleting a missing key succeeds.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Session store keeping one `<key>.json` file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    /// Creates a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the session files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .with_context(|| format!("Failed to read session file: {}", path.display()))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        write_atomic(&self.path_for(key), value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove session file: {}", path.display()))?;
        }
        Ok(())
    }
}

/// In-memory session store.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    entries: HashMap<String, String>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Stores `layout` as the current session. Returns false if it could not be saved.
pub fn save_to_session<S: SessionStore + ?Sized>(store: &mut S, layout: &Layout) -> bool {
    let result = export_layout(layout).and_then(|json| store.set(SESSION_STORAGE_KEY, &json));
    match result {
        Ok(()) => {
            debug!("Saved session for '{}'", layout.name);
            true
        }
        Err(e) => {
            warn!("Failed to save session: {e:#}");
            false
        }
    }
}

/// Restores the stored session.
///
/// A stored session that no longer parses or validates is cleared and `None`
/// is returned.
pub fn load_from_session<S: SessionStore + ?Sized>(store: &mut S) -> Option<Layout> {
    let json = match store.get(SESSION_STORAGE_KEY) {
        Ok(Some(json)) => json,
        Ok(None) => return None,
        Err(e) => {
            warn!("Failed to read session: {e:#}");
            return None;
        }
    };

    match parse_layout(&json) {
        Ok(parsed) if parsed.is_valid() => parsed.layout,
        Ok(parsed) => {
            warn!(
                "Discarding invalid session:\n{}",
                parsed.report.format_message()
            );
            clear_session(store);
            None
        }
        Err(e) => {
            warn!("Discarding unreadable session: {e:#}");
            clear_session(store);
            None
        }
    }
}

/// Deletes the stored session.
pub fn clear_session<S: SessionStore + ?Sized>(store: &mut S) {
    if let Err(e) = store.remove(SESSION_STORAGE_KEY) {
        warn!("Failed to clear session: {e:#}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DeviceCategory, DeviceType, Face, PlacedDevice, Rack};
    use tempfile::TempDir;

    struct FailingStore;

    impl SessionStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            anyhow::bail!("storage unavailable")
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            anyhow::bail!("quota exceeded")
        }

        fn remove(&mut self, _key: &str) -> Result<()> {
            anyhow::bail!("storage unavailable")
        }
    }

    fn sample() -> Layout {
        let mut layout = Layout::new("Session", Rack::new("Main", 12).unwrap());
        layout
            .add_device_type(DeviceType::new("ups", 2.0, DeviceCategory::Power).unwrap())
            .unwrap();
        layout
            .rack
            .devices
            .push(PlacedDevice::new("ups", 1, Face::Both));
        layout
    }

    #[test]
    fn test_memory_round_trip() {
        let mut store = MemorySessionStore::new();
        let layout = sample();

        assert!(save_to_session(&mut store, &layout));
        assert_eq!(load_from_session(&mut store), Some(layout));
    }

    #[test]
    fn test_empty_store_loads_nothing() {
        let mut store = MemorySessionStore::new();
        assert_eq!(load_from_session(&mut store), None);
    }

    #[test]
    fn test_invalid_session_is_cleared() {
        let mut store = MemorySessionStore::new();
        store
            .set(SESSION_STORAGE_KEY, r#"{ "version": "0.2.0", "name": 3 }"#)
            .unwrap();

        assert_eq!(load_from_session(&mut store), None);
        assert_eq!(store.get(SESSION_STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn test_malformed_session_is_cleared() {
        let mut store = MemorySessionStore::new();
        store.set(SESSION_STORAGE_KEY, "{ truncated").unwrap();

        assert_eq!(load_from_session(&mut store), None);
        assert_eq!(store.get(SESSION_STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn test_session_with_rule_violation_is_cleared() {
        let mut layout = sample();
        layout
            .rack
            .devices
            .push(PlacedDevice::new("ups", 2, Face::Rear));
        let mut store = MemorySessionStore::new();
        assert!(save_to_session(&mut store, &layout));

        assert_eq!(load_from_session(&mut store), None);
        assert_eq!(store.get(SESSION_STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn test_failing_backend_is_noop() {
        let mut store = FailingStore;
        assert!(!save_to_session(&mut store, &sample()));
        assert_eq!(load_from_session(&mut store), None);
        clear_session(&mut store);
    }

    #[test]
    fn test_file_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileSessionStore::new(temp_dir.path().join("session"));
        let layout = sample();

        assert!(save_to_session(&mut store, &layout));
        assert!(store.dir().join("rackplan-session.json").exists());
        assert_eq!(load_from_session(&mut store), Some(layout));

        clear_session(&mut store);
        assert!(!store.dir().join("rackplan-session.json").exists());
        assert_eq!(load_from_session(&mut store), None);
    }

    #[test]
    fn test_clear_missing_session_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileSessionStore::new(temp_dir.path());
        assert!(store.remove(SESSION_STORAGE_KEY).is_ok());
    }
}
