//! Asset gallery synchronization.
//!
//! Keeps a local cached copy of the user's generated assets. Each refresh
//! fully supersedes the prior list, so no dedup or merge logic is needed.

use std::sync::Arc;

use atelier_core::asset::{Asset, CinemaPlaylist};
use atelier_core::backend::ChatBackend;
use atelier_core::error::Result;
use tokio::sync::{Mutex, RwLock};

/// Cached view of the backend's generated-asset list.
pub struct AssetGallerySync {
    backend: Arc<dyn ChatBackend>,
    /// Most-recent-first asset list from the last successful refresh
    cache: RwLock<Vec<Asset>>,
    /// Held for the duration of a refresh; concurrent callers short-circuit
    refresh_gate: Mutex<()>,
    limit: usize,
}

impl AssetGallerySync {
    /// Creates a gallery sync with an empty cache.
    ///
    /// # Arguments
    ///
    /// * `backend` - The backend to fetch assets from
    /// * `limit` - Hard cap on the number of assets per fetch
    pub fn new(backend: Arc<dyn ChatBackend>, limit: usize) -> Self {
        Self {
            backend,
            cache: RwLock::new(Vec::new()),
            refresh_gate: Mutex::new(()),
            limit,
        }
    }

    /// Returns a snapshot of the cached asset list.
    pub async fn assets(&self) -> Vec<Asset> {
        self.cache.read().await.clone()
    }

    /// Fetches the asset list and replaces the cache wholesale.
    ///
    /// A refresh already in flight causes this call to short-circuit rather
    /// than issue a duplicate request. On failure the previous cache is
    /// retained: stale-but-available wins over empty.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the fetch fails. The cache is unchanged
    /// in that case.
    pub async fn refresh(&self) -> Result<()> {
        let Ok(_guard) = self.refresh_gate.try_lock() else {
            tracing::debug!("asset refresh already in flight, skipping");
            return Ok(());
        };

        match self.backend.get_assets(self.limit).await {
            Ok(assets) => {
                tracing::debug!(count = assets.len(), "asset cache refreshed");
                *self.cache.write().await = assets;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "asset refresh failed, keeping cached list");
                Err(err.into())
            }
        }
    }

    /// Fetches a fresh playlist for cinema mode.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the fetch fails.
    pub async fn load_cinema(&self) -> Result<CinemaPlaylist> {
        self.backend.get_cinema_data().await.map_err(Into::into)
    }
}
