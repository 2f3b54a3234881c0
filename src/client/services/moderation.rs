//! Wallpaper moderation state.
//!
//! [`ModerationReconciler`] holds the item list fetched from the backend,
//! overlays the locally persisted approvals on top of it, and tracks which
//! items have an approval request outstanding.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures_util::future::join_all;
use log::{debug, error, info};

use crate::client::models::wallpaper::{Counts, FilterStatus, Wallpaper};
use crate::client::utils::approval_overlay::ApprovalOverlay;
use crate::client::utils::local_store::LocalStore;
use crate::common::errors::{ConsoleError, Result};

/// Remote side of moderation: list and approve endpoints.
#[async_trait]
pub trait WallpaperSource: Send + Sync {
    async fn list_items(&self) -> Result<Vec<Wallpaper>>;
    async fn approve_item(&self, id: &str) -> Result<()>;
}

/// Forces `is_approved` on every remote item whose id is in the overlay.
/// Other items, and the order, are left untouched.
pub fn merge(remote: Vec<Wallpaper>, overlay: &HashSet<String>) -> Vec<Wallpaper> {
    remote
        .into_iter()
        .map(|mut w| {
            if overlay.contains(&w.id) {
                w.is_approved = true;
            }
            w
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub counts: Counts,
    /// Overlay ids the server no longer returned. Kept in the overlay.
    pub stale_overlay_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApproveOutcome {
    Approved,
    /// Another approval for the same id was still outstanding; nothing sent.
    AlreadyInFlight,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears the in-flight flag however the approval ends (ok, error, dropped future).
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<String>>,
    id: String,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(set: &'a Mutex<HashSet<String>>, id: &str) -> Option<Self> {
        if lock(set).insert(id.to_string()) {
            Some(Self { set, id: id.to_string() })
        } else {
            None
        }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        lock(self.set).remove(&self.id);
    }
}

struct LoadingFlag<'a>(&'a AtomicBool);

impl Drop for LoadingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct ModerationReconciler<S: WallpaperSource> {
    source: S,
    overlay: ApprovalOverlay,
    items: Mutex<Vec<Wallpaper>>,
    in_flight: Mutex<HashSet<String>>,
    loading: AtomicBool,
}

impl<S: WallpaperSource> ModerationReconciler<S> {
    pub fn new(source: S, store: Arc<dyn LocalStore>) -> Self {
        Self {
            source,
            overlay: ApprovalOverlay::new(store),
            items: Mutex::new(Vec::new()),
            in_flight: Mutex::new(HashSet::new()),
            loading: AtomicBool::new(false),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetches the list and replaces the held items with the merged result.
    /// On failure the held items stay as they were.
    pub async fn load(&self) -> Result<LoadReport> {
        self.loading.store(true, Ordering::SeqCst);
        let _loading = LoadingFlag(&self.loading);

        let remote = self.source.list_items().await.map_err(|e| {
            error!("Error fetching wallpapers: {}", e);
            e
        })?;

        // items and overlay only change together under this lock (see approve_id)
        let mut items = lock(&self.items);
        let overlay_ids = self.overlay.ids();
        let remote_ids: HashSet<&str> = remote.iter().map(|w| w.id.as_str()).collect();
        let stale_overlay_ids: Vec<String> =
            overlay_ids.iter().filter(|id| !remote_ids.contains(id.as_str())).cloned().collect();
        if !stale_overlay_ids.is_empty() {
            debug!("{} approved ids not returned by the server: {:?}", stale_overlay_ids.len(), stale_overlay_ids);
        }

        let merged = merge(remote, &overlay_ids.into_iter().collect());
        let counts = Counts::of(&merged);
        *items = merged;
        drop(items);

        info!("Loaded {} wallpapers ({} pending, {} approved)", counts.all, counts.pending, counts.approved);
        Ok(LoadReport { counts, stale_overlay_ids })
    }

    pub async fn approve(&self, item: &Wallpaper) -> Result<ApproveOutcome> {
        self.approve_id(&item.id).await
    }

    pub async fn approve_id(&self, id: &str) -> Result<ApproveOutcome> {
        if id.is_empty() {
            return Err(ConsoleError::Validation("missing wallpaper identifier".to_string()));
        }
        let Some(_flight) = InFlightGuard::acquire(&self.in_flight, id) else {
            debug!("Approval for {} already in flight, skipping", id);
            return Ok(ApproveOutcome::AlreadyInFlight);
        };

        if let Err(e) = self.source.approve_item(id).await {
            error!("Error approving wallpaper {}: {}", id, e);
            return Err(e);
        }

        {
            let mut items = lock(&self.items);
            for w in items.iter_mut().filter(|w| w.id == id) {
                w.is_approved = true;
            }
            self.overlay.add(id);
        }
        info!("Wallpaper {} approved", id);
        Ok(ApproveOutcome::Approved)
    }

    /// Approves several ids concurrently. Results come back in input order.
    pub async fn approve_many(&self, ids: &[String]) -> Vec<(String, Result<ApproveOutcome>)> {
        let results = join_all(ids.iter().map(|id| self.approve_id(id))).await;
        ids.iter().cloned().zip(results).collect()
    }

    pub fn filtered_view(&self, status: FilterStatus) -> Vec<Wallpaper> {
        lock(&self.items).iter().filter(|w| status.matches(w)).cloned().collect()
    }

    pub fn counts(&self) -> Counts {
        Counts::of(&lock(&self.items))
    }

    pub fn is_approving(&self, id: &str) -> bool {
        lock(&self.in_flight).contains(id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn items(&self) -> Vec<Wallpaper> {
        lock(&self.items).clone()
    }

    pub fn overlay_ids(&self) -> Vec<String> {
        self.overlay.ids()
    }
}
