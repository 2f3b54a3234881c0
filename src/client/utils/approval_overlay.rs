use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, warn};

use crate::client::utils::local_store::LocalStore;

/// Key under which the approved ids are persisted, as a JSON array.
pub const OVERLAY_KEY: &str = "approvedWallpapers";

/// Ids this client considers approved, independent of what the server says.
///
/// Storage problems never fail the caller: reads degrade to an empty set and
/// failed writes only cost persistence across restarts. Both are logged.
pub struct ApprovalOverlay {
    store: Arc<dyn LocalStore>,
    // read-modify-write of the persisted list
    write_lock: Mutex<()>,
}

impl ApprovalOverlay {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store, write_lock: Mutex::new(()) }
    }

    /// Persisted ids in insertion order.
    pub fn ids(&self) -> Vec<String> {
        let raw = match self.store.get(OVERLAY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Error loading approved wallpapers from storage: {}", e);
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(ids) => ids,
            Err(e) => {
                warn!("Ignoring corrupt approval overlay: {}", e);
                Vec::new()
            }
        }
    }

    /// Adds `id` if absent. Returns whether the overlay on disk now holds it.
    pub fn add(&self, id: &str) -> bool {
        let _g = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut ids = self.ids();
        if ids.iter().any(|existing| existing == id) {
            debug!("Wallpaper {} already in approval overlay", id);
            return true;
        }
        ids.push(id.to_string());
        let encoded = match serde_json::to_string(&ids) {
            Ok(s) => s,
            Err(e) => {
                warn!("Error encoding approval overlay: {}", e);
                return false;
            }
        };
        match self.store.set(OVERLAY_KEY, &encoded) {
            Ok(()) => true,
            Err(e) => {
                warn!("Error saving approval to storage, it will not survive a restart: {}", e);
                false
            }
        }
    }
}
