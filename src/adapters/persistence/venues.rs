//! Venue Store - Atomic JSON Venue Registry
//!
//! Keeps the registered venues in memory and mirrors them to
//! `venues.json` with atomic writes (write to tmp file, then rename),
//! so the file is always either the old or the new list.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::domain::{StoreError, Venue};
use crate::ports::VenueRepository;

/// File-backed venue registry.
pub struct VenueStore {
    /// Path to venues.json.
    path: PathBuf,
    /// Temporary path for atomic writes.
    tmp_path: PathBuf,
    /// In-memory copy; the write lock also serializes file updates.
    venues: RwLock<Vec<Venue>>,
}

impl VenueStore {
    /// Open the store in `data_dir`, loading `venues.json` if present.
    #[instrument]
    pub async fn open(data_dir: &str) -> Result<Self, StoreError> {
        let dir = Path::new(data_dir);
        fs::create_dir_all(dir).await?;

        let path = dir.join("venues.json");
        let venues = if fs::try_exists(&path).await? {
            let json = fs::read_to_string(&path).await?;
            serde_json::from_str::<Vec<Venue>>(&json)?
        } else {
            info!("No venues file found, starting with an empty registry");
            Vec::new()
        };

        info!(count = venues.len(), path = %path.display(), "Venue registry loaded");

        Ok(Self {
            tmp_path: dir.join("venues.json.tmp"),
            path,
            venues: RwLock::new(venues),
        })
    }

    async fn persist(&self, venues: &[Venue]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(venues)?;
        fs::write(&self.tmp_path, json).await?;
        fs::rename(&self.tmp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl VenueRepository for VenueStore {
    async fn list(&self) -> Result<Vec<Venue>, StoreError> {
        Ok(self.venues.read().await.clone())
    }

    async fn contains_pool(&self, pool_address: &str) -> Result<bool, StoreError> {
        Ok(self.venues.read().await.iter().any(|v| v.has_pool(pool_address)))
    }

    #[instrument(skip(self, venue), fields(dex = %venue.dex_name, pool = %venue.pool_address))]
    async fn insert(&self, venue: &Venue) -> Result<(), StoreError> {
        let mut venues = self.venues.write().await;
        if venues.iter().any(|v| v.has_pool(&venue.pool_address)) {
            return Err(StoreError::DuplicateVenue(venue.pool_address.clone()));
        }

        venues.push(venue.clone());
        if let Err(e) = self.persist(&venues).await {
            venues.pop();
            warn!(error = %e, "Failed to persist venue registry, insert rolled back");
            return Err(e);
        }

        info!(count = venues.len(), "Venue persisted");
        Ok(())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.venues.read().await.len())
    }
}
