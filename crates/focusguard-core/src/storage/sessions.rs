//! JSON-file session storage.
//!
//! One document per completed session at
//! `<data_dir>/sessions/<uuid>.json`, using the wire schema
//! `{id, startTime, endTime, events: [...]}`. A corrupt file is
//! skipped with a warning during loads, never an abort.

use std::path::{Path, PathBuf};

use tracing::warn;
use uuid::Uuid;

use super::data_dir;
use crate::coordinator::SessionStore;
use crate::error::StorageError;
use crate::session::CompletedSession;

/// Directory-backed implementation of [`SessionStore`].
#[derive(Debug, Clone)]
pub struct SessionDir {
    dir: PathBuf,
}

impl SessionDir {
    /// Use an explicit directory (tests, alternate roots).
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| StorageError::DataDir {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// Open `<data_dir>/sessions/`.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn open_default() -> Result<Self, StorageError> {
        Self::new(data_dir()?.join("sessions"))
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    fn file_for(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Load one session by id.
    ///
    /// # Errors
    /// `NotFound` if no such file exists, `ParseFailed` on a corrupt
    /// document.
    pub fn load(&self, id: Uuid) -> Result<CompletedSession, StorageError> {
        let path = self.file_for(id);
        let text = std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(id)
            } else {
                StorageError::LoadFailed {
                    path: path.clone(),
                    source: e,
                }
            }
        })?;
        serde_json::from_str(&text).map_err(|e| StorageError::ParseFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Delete every stored session. Returns how many were removed.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be read or a file
    /// cannot be removed.
    pub fn clear(&self) -> Result<usize, StorageError> {
        let mut removed = 0;
        for entry in self.read_entries()? {
            std::fs::remove_file(&entry).map_err(|source| StorageError::LoadFailed {
                path: entry.clone(),
                source,
            })?;
            removed += 1;
        }
        Ok(removed)
    }

    fn read_entries(&self) -> Result<Vec<PathBuf>, StorageError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|source| StorageError::LoadFailed {
            path: self.dir.clone(),
            source,
        })?;
        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StorageError::LoadFailed {
                path: self.dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "json") {
                paths.push(path);
            }
        }
        Ok(paths)
    }
}

impl SessionStore for SessionDir {
    fn save(&mut self, session: &CompletedSession) -> Result<(), StorageError> {
        let path = self.file_for(session.id);
        let json = serde_json::to_string_pretty(session).map_err(|e| {
            StorageError::ParseFailed {
                path: path.clone(),
                message: e.to_string(),
            }
        })?;
        std::fs::write(&path, json).map_err(|source| StorageError::SaveFailed { path, source })
    }

    /// All stored sessions, most recent start first.
    fn load_all(&self) -> Result<Vec<CompletedSession>, StorageError> {
        let mut sessions = Vec::new();
        for path in self.read_entries()? {
            let text = match std::fs::read_to_string(&path) {
                Ok(text) => text,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable session file");
                    continue;
                }
            };
            match serde_json::from_str::<CompletedSession>(&text) {
                Ok(session) => sessions.push(session),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping corrupt session file");
                }
            }
        }
        sessions.sort_by(|a, b| b.start.cmp(&a.start));
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone, Utc};

    use crate::session::{AttentionState, StateInterval};

    fn session(start_secs: i64) -> CompletedSession {
        let start = Utc.timestamp_opt(1_700_000_000 + start_secs, 0).unwrap();
        let end = start + TimeDelta::seconds(60);
        CompletedSession {
            id: Uuid::new_v4(),
            start,
            end,
            events: vec![StateInterval {
                id: Uuid::new_v4(),
                state: AttentionState::Awake,
                start,
                end,
            }],
        }
    }

    #[test]
    fn save_load_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = SessionDir::new(tmp.path().join("sessions")).unwrap();
        let session = session(0);
        store.save(&session).unwrap();
        assert_eq!(store.load(session.id).unwrap(), session);
    }

    #[test]
    fn load_all_sorts_most_recent_first() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = SessionDir::new(tmp.path()).unwrap();
        let older = session(0);
        let newer = session(1000);
        store.save(&older).unwrap();
        store.save(&newer).unwrap();
        let all = store.load_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, newer.id);
        assert_eq!(all[1].id, older.id);
    }

    #[test]
    fn corrupt_file_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = SessionDir::new(tmp.path()).unwrap();
        store.save(&session(0)).unwrap();
        std::fs::write(tmp.path().join("garbage.json"), "{not json").unwrap();
        assert_eq!(store.load_all().unwrap().len(), 1);
    }

    #[test]
    fn missing_id_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SessionDir::new(tmp.path()).unwrap();
        let err = store.load(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[test]
    fn clear_removes_everything() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = SessionDir::new(tmp.path()).unwrap();
        store.save(&session(0)).unwrap();
        store.save(&session(10)).unwrap();
        assert_eq!(store.clear().unwrap(), 2);
        assert!(store.load_all().unwrap().is_empty());
    }
}
