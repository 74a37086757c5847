//! Application state for the web layer.

use std::sync::{Arc, Mutex};

use tracing::{debug, error};

use crate::cache::BoardCache;
use crate::config::ServerConfig;
use crate::schedule::DayClassifier;
use crate::store::MemoryStore;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Schedule catalog
    pub store: Arc<MemoryStore>,

    /// Cached location boards
    pub boards: Arc<BoardCache>,

    /// Day classifier used by every lookup
    pub classifier: Arc<DayClassifier>,

    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Serializes snapshot writes so saves land in commit order
    snapshot_lock: Arc<Mutex<()>>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(store: MemoryStore, config: ServerConfig) -> Self {
        let boards = BoardCache::new(&config.board_cache);
        Self {
            store: Arc::new(store),
            boards: Arc::new(boards),
            classifier: Arc::new(DayClassifier::new()),
            config: Arc::new(config),
            snapshot_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Record that the catalog changed.
    ///
    /// Drops cached boards and rewrites the snapshot, if one is configured.
    /// The write has already been applied in memory, so a failed save is
    /// logged and the request still succeeds.
    pub fn committed(&self) {
        self.boards.invalidate_all();
        let Some(path) = &self.config.snapshot else {
            return;
        };

        let _guard = self
            .snapshot_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match self.store.save_snapshot(path) {
            Ok(()) => debug!(path = %path.display(), "Saved snapshot"),
            Err(e) => error!(path = %path.display(), error = %e, "Failed to save snapshot"),
        }
    }
}
