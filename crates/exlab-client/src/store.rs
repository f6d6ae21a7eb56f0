use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::errors::ClientError;

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
struct SessionState {
    #[serde(default)]
    credential: Option<String>,
    #[serde(default)]
    dataset_id: Option<String>,
}

struct StoreInner {
    path: Option<PathBuf>,
    state: Mutex<SessionState>,
}

/// Durable slot for the bearer credential and the active dataset identifier.
///
/// This is an explicit, injected session context: every component reads
/// through a cloned handle instead of ambient global state, so tests can
/// instantiate isolated sessions. Writes go to a JSON file so both values
/// survive process restarts; persistence failures are logged, never fatal.
///
/// Tokens are opaque pass-through; the store never inspects their contents.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

impl SessionStore {
    /// Opens a store backed by the given file, loading existing state.
    ///
    /// A missing file starts empty; an unreadable or malformed file also
    /// starts empty, with a warning, so a corrupt slot never locks the user
    /// out.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let state = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "session slot unreadable, starting empty");
                SessionState::default()
            }),
            Err(_) => SessionState::default(),
        };
        Self {
            inner: Arc::new(StoreInner {
                path: Some(path),
                state: Mutex::new(state),
            }),
        }
    }

    /// Creates an ephemeral store with no backing file.
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(StoreInner {
                path: None,
                state: Mutex::new(SessionState::default()),
            }),
        }
    }

    /// Stores the bearer credential.
    pub fn set_credential(&self, token: impl Into<String>) {
        self.mutate(|state| state.credential = Some(token.into()));
    }

    /// Returns the stored credential, if any.
    pub fn credential(&self) -> Option<String> {
        self.lock().credential.clone()
    }

    /// Removes the credential. Idempotent.
    pub fn clear_credential(&self) {
        self.mutate(|state| state.credential = None);
    }

    /// Stores the active dataset identifier, replacing any previous one.
    pub fn set_dataset_id(&self, dataset_id: impl Into<String>) {
        self.mutate(|state| state.dataset_id = Some(dataset_id.into()));
    }

    /// Returns the active dataset identifier, if any.
    pub fn dataset_id(&self) -> Option<String> {
        self.lock().dataset_id.clone()
    }

    /// Clears both the credential and the dataset identifier. Idempotent.
    pub fn clear(&self) {
        self.mutate(|state| *state = SessionState::default());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn mutate(&self, f: impl FnOnce(&mut SessionState)) {
        let snapshot = {
            let mut state = self.lock();
            f(&mut state);
            state.clone()
        };
        if let Err(e) = self.persist(&snapshot) {
            warn!(error = %e, "failed to persist session slot");
        }
    }

    fn persist(&self, state: &SessionState) -> Result<(), ClientError> {
        let Some(path) = self.inner.path.as_ref() else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::Config(format!("session dir: {e}")))?;
        }
        let raw = serde_json::to_string_pretty(state)
            .map_err(|e| ClientError::Config(format!("session encode: {e}")))?;
        std::fs::write(path, raw).map_err(|e| ClientError::Config(format!("session write: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_and_dataset_round_trip_through_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");

        let store = SessionStore::open(&path);
        store.set_credential("tok-123");
        store.set_dataset_id("d1");

        let reopened = SessionStore::open(&path);
        assert_eq!(reopened.credential().as_deref(), Some("tok-123"));
        assert_eq!(reopened.dataset_id().as_deref(), Some("d1"));
    }

    #[test]
    fn clear_credential_is_idempotent() {
        let store = SessionStore::in_memory();
        store.set_credential("tok");
        store.clear_credential();
        store.clear_credential();
        assert_eq!(store.credential(), None);
    }

    #[test]
    fn malformed_slot_file_starts_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").expect("write");

        let store = SessionStore::open(&path);
        assert_eq!(store.credential(), None);
        assert_eq!(store.dataset_id(), None);
    }

    #[test]
    fn new_upload_replaces_dataset_id() {
        let store = SessionStore::in_memory();
        store.set_dataset_id("d1");
        store.set_dataset_id("d2");
        assert_eq!(store.dataset_id().as_deref(), Some("d2"));
    }
}
