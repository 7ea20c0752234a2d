use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Quiet period after the last edit before a draft is written out.
pub const DEBOUNCE: Duration = Duration::from_millis(1000);

/// Draft keys in use, one per input surface.
pub const TASKS_DRAFT: &str = "tasks";
pub const DRAFT_KEYS: &[&str] = &[TASKS_DRAFT];

/// Keyed storage for in-progress input. Implementations swallow storage
/// errors (logged, never surfaced) so a failed write cannot interrupt
/// whoever is typing. Whitespace-only text is treated as nothing to save,
/// not as a clear.
pub trait DraftStore: Send + Sync {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&self, key: &str, text: &str);
    fn clear(&self, key: &str);
}

fn valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// One file per key under `<data_dir>/drafts/`.
pub struct FileDraftStore {
    dir: PathBuf,
}

impl FileDraftStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.txt"))
    }
}

impl DraftStore for FileDraftStore {
    fn load(&self, key: &str) -> Option<String> {
        if !valid_key(key) {
            return None;
        }
        let text = std::fs::read_to_string(self.path_for(key)).ok()?;
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn save(&self, key: &str, text: &str) {
        if !valid_key(key) {
            tracing::warn!(key, "refusing to save draft under invalid key");
            return;
        }
        if text.trim().is_empty() {
            return;
        }
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            tracing::warn!(key, error = %e, "could not create drafts directory");
            return;
        }
        if let Err(e) = std::fs::write(self.path_for(key), text) {
            tracing::warn!(key, error = %e, "could not save draft");
        }
    }

    fn clear(&self, key: &str) {
        if !valid_key(key) {
            return;
        }
        let path = self.path_for(key);
        if path.exists() {
            if let Err(e) = std::fs::remove_file(&path) {
                tracing::warn!(key, error = %e, "could not clear draft");
            }
        }
    }
}

/// In-memory substitute for tests; counts writes so debounce coalescing can
/// be asserted.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryDraftStore {
    drafts: std::sync::Mutex<std::collections::HashMap<String, String>>,
    saves: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MemoryDraftStore {
    pub fn save_count(&self) -> usize {
        self.saves.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl DraftStore for MemoryDraftStore {
    fn load(&self, key: &str) -> Option<String> {
        self.drafts.lock().unwrap().get(key).cloned()
    }

    fn save(&self, key: &str, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        self.drafts
            .lock()
            .unwrap()
            .insert(key.to_string(), text.to_string());
        self.saves
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }

    fn clear(&self, key: &str) {
        self.drafts.lock().unwrap().remove(key);
    }
}

/// Debounced writer for one draft key. Every `update` replaces the pending
/// save, so the write lands once the text has been quiet for the full
/// debounce interval. Dropping the saver cancels an undelivered write.
pub struct DraftSaver {
    store: Arc<dyn DraftStore>,
    key: String,
    pending: Option<JoinHandle<()>>,
}

impl DraftSaver {
    pub fn new(store: Arc<dyn DraftStore>, key: &str) -> Self {
        Self {
            store,
            key: key.to_string(),
            pending: None,
        }
    }

    /// Record the latest text. Whitespace-only text schedules nothing; a
    /// previously persisted draft stays put until submit or cancel clears it.
    pub fn update(&mut self, text: &str) {
        self.cancel();
        if text.trim().is_empty() {
            return;
        }
        let store = Arc::clone(&self.store);
        let key = self.key.clone();
        let text = text.to_string();
        // The abort lands at the sleep; a task already past it writes in
        // full, so a draft file is never torn.
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(DEBOUNCE).await;
            store.save(&key, &text);
        }));
    }

    /// Drop any scheduled write; called when the input surface closes.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for DraftSaver {
    fn drop(&mut self) {
        self.cancel();
    }
}
