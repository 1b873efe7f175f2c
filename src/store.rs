use chrono::{Local, NaiveDateTime};
use log::{debug, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::error::{AgentError, Result};
use crate::session::SessionRecord;

/// Holds zero or one session record.
pub trait SessionStore {
    /// Replace whatever is stored with a fresh session starting at `now`.
    fn create_at(
        &self,
        request: &str,
        duration_minutes: i64,
        now: NaiveDateTime,
    ) -> Result<SessionRecord>;

    /// Unreadable or malformed state is reported as no session.
    fn load(&self) -> Option<SessionRecord>;

    /// Returns whether a record existed.
    fn clear(&self) -> Result<bool>;

    fn create(&self, request: &str, duration_minutes: i64) -> Result<SessionRecord> {
        self.create_at(request, duration_minutes, Local::now().naive_local())
    }
}

/// JSON file backed store. Writes go through a sibling temp file and a rename.
///
/// There is no locking between processes; concurrent writers race and the last
/// rename wins.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path =
            AppDirs::state_path().unwrap_or_else(|| PathBuf::from("omni_agent_state.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomic(&self, data: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(AgentError::io("create directory", parent))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data).map_err(AgentError::io("write", &tmp))?;
        fs::rename(&tmp, &self.path).map_err(AgentError::io("replace", &self.path))
    }
}

impl Default for FileSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for FileSessionStore {
    fn create_at(
        &self,
        request: &str,
        duration_minutes: i64,
        now: NaiveDateTime,
    ) -> Result<SessionRecord> {
        let record = SessionRecord::new(request, duration_minutes, now)?;
        let data = serde_json::to_vec_pretty(&record)?;
        self.write_atomic(&data)?;
        debug!(
            "session saved to {} (deadline {})",
            self.path.display(),
            record.deadline
        );
        Ok(record)
    }

    fn load(&self) -> Option<SessionRecord> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("ignoring unreadable state file {}: {e}", self.path.display());
                return None;
            }
        };
        match serde_json::from_slice::<SessionRecord>(&bytes) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("ignoring malformed state file {}: {e}", self.path.display());
                None
            }
        }
    }

    fn clear(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("session cleared at {}", self.path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AgentError::io("remove", &self.path)(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn jan1(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn roundtrip_created_session() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::with_path(dir.path().join("state.json"));

        let created = store.create("write tests", 25).unwrap();
        let loaded = store.load().expect("session should load");

        assert_eq!(created, loaded);
        assert_eq!(loaded.request, "write tests");
        assert_eq!(loaded.duration_minutes, 25);
        assert_eq!((loaded.deadline - loaded.started_at).num_seconds(), 25 * 60);
    }

    #[test]
    fn create_makes_missing_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("state.json");
        let store = FileSessionStore::with_path(&path);

        store.create_at("x", 1, jan1(0, 0, 0)).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn second_create_replaces_first() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::with_path(dir.path().join("state.json"));

        store.create_at("first", 10, jan1(0, 0, 0)).unwrap();
        let second = store.create_at("second", 3, jan1(5, 0, 0)).unwrap();

        assert_eq!(store.load(), Some(second));
    }

    #[test]
    fn invalid_duration_leaves_existing_session_alone() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::with_path(dir.path().join("state.json"));
        let existing = store.create_at("keep me", 10, jan1(0, 0, 0)).unwrap();

        assert_matches!(
            store.create("replace me", 0),
            Err(AgentError::InvalidDuration(0))
        );
        assert_eq!(store.load(), Some(existing));
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::with_path(dir.path().join("state.json"));
        assert_eq!(store.load(), None);
    }

    #[test]
    fn garbage_file_loads_as_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, b"\x00\xffnot json at all{").unwrap();

        let store = FileSessionStore::with_path(&path);
        assert_eq!(store.load(), None);
    }

    #[test]
    fn wrong_shape_loads_as_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        let store = FileSessionStore::with_path(&path);

        fs::write(&path, r#"{"request": "r", "duration_minutes": 5}"#).unwrap();
        assert_eq!(store.load(), None);

        fs::write(
            &path,
            r#"{"request": "r", "duration_minutes": "5", "started_at": "2024-01-01T00:00:00", "deadline": "2024-01-01T00:05:00"}"#,
        )
        .unwrap();
        assert_eq!(store.load(), None);

        fs::write(&path, "[]").unwrap();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn negative_duration_on_disk_is_passed_through() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(
            &path,
            r#"{"request": "r", "duration_minutes": -3, "started_at": "2024-01-01T00:00:00", "deadline": "2024-01-01T00:05:00"}"#,
        )
        .unwrap();

        let record = FileSessionStore::with_path(&path).load().unwrap();
        assert_eq!(record.duration_minutes, -3);
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        let store = FileSessionStore::with_path(&path);
        store.create("x", 5).unwrap();

        assert!(store.clear().unwrap());
        assert!(!path.exists());
        assert!(!store.clear().unwrap());
        assert_eq!(store.load(), None);
    }

    #[test]
    fn clear_without_session_is_not_an_error() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::with_path(dir.path().join("never").join("state.json"));
        assert!(!store.clear().unwrap());
    }

    #[test]
    fn clear_removes_even_a_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "garbage").unwrap();

        let store = FileSessionStore::with_path(&path);
        assert!(store.clear().unwrap());
        assert!(!path.exists());
    }
}
