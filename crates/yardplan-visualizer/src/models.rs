//! Model cache and background STL loading.
//!
//! Loads run on the tokio blocking pool and report back over an mpsc
//! channel. Nothing here touches the scene; the owner drains outcomes once
//! per frame and attaches them itself.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::mesh::{load_stl, Mesh};
use yardplan_core::AssetError;
use yardplan_designer::Season;

/// Identifies one loadable model.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModelKey {
    /// Seasonal catalog model of a plant species.
    Species { species: String, season: Season },
    /// Arbitrary model file referenced by an element.
    File(PathBuf),
}

/// State of one cache slot.
#[derive(Debug, Clone)]
pub enum CacheEntry {
    Pending,
    Ready(Arc<Mesh>),
    /// Load failed; the element keeps its placeholder and the load is not
    /// retried until the cache is cleared.
    Failed,
}

#[derive(Debug, Default)]
pub struct ModelCache {
    entries: HashMap<ModelKey, CacheEntry>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &ModelKey) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    pub fn ready(&self, key: &ModelKey) -> Option<Arc<Mesh>> {
        match self.entries.get(key) {
            Some(CacheEntry::Ready(mesh)) => Some(mesh.clone()),
            _ => None,
        }
    }

    pub fn mark_pending(&mut self, key: ModelKey) {
        self.entries.insert(key, CacheEntry::Pending);
    }

    pub fn insert(&mut self, key: ModelKey, mesh: Arc<Mesh>) {
        self.entries.insert(key, CacheEntry::Ready(mesh));
    }

    pub fn mark_failed(&mut self, key: ModelKey) {
        self.entries.insert(key, CacheEntry::Failed);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of successfully loaded models.
    pub fn ready_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| matches!(e, CacheEntry::Ready(_)))
            .count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Result of one background load.
#[derive(Debug)]
pub struct LoadOutcome {
    pub key: ModelKey,
    pub path: PathBuf,
    pub result: Result<Mesh, AssetError>,
}

/// Spawns STL loads on a tokio runtime and collects their outcomes.
#[derive(Debug)]
pub struct ModelLoader {
    handle: Handle,
    tx: mpsc::UnboundedSender<LoadOutcome>,
    rx: mpsc::UnboundedReceiver<LoadOutcome>,
    in_flight: usize,
}

impl ModelLoader {
    pub fn new(handle: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            handle,
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Loader on the runtime of the calling context, if there is one.
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }

    /// Starts loading `path` in the background.
    pub fn request(&mut self, key: ModelKey, path: PathBuf) {
        tracing::debug!("Loading model {:?} from {}", key, path.display());
        self.in_flight += 1;
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            let load_path = path.clone();
            let result = match tokio::task::spawn_blocking(move || load_stl(&load_path)).await {
                Ok(result) => result,
                Err(join_err) => Err(AssetError::Parse {
                    path: path.display().to_string(),
                    reason: join_err.to_string(),
                }),
            };
            if tx.send(LoadOutcome { key, path, result }).is_err() {
                tracing::debug!("Model loader dropped before load finished");
            }
        });
    }

    /// Number of loads requested but not yet received.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// A finished load, without waiting.
    pub fn try_next(&mut self) -> Option<LoadOutcome> {
        let outcome = self.rx.try_recv().ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(outcome)
    }

    /// Waits for the next finished load. Returns `None` when nothing is in
    /// flight.
    pub async fn next(&mut self) -> Option<LoadOutcome> {
        if self.in_flight == 0 {
            return None;
        }
        let outcome = self.rx.recv().await?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_reports_failure() {
        let mut loader = ModelLoader::new(Handle::current());
        let key = ModelKey::File(PathBuf::from("/nonexistent/gazebo.stl"));
        loader.request(key.clone(), PathBuf::from("/nonexistent/gazebo.stl"));
        assert_eq!(loader.in_flight(), 1);

        let outcome = loader.next().await.unwrap();
        assert_eq!(outcome.key, key);
        assert!(matches!(outcome.result, Err(AssetError::Io { .. })));
        assert_eq!(loader.in_flight(), 0);
        assert!(loader.next().await.is_none());
    }

    #[test]
    fn test_cache_states() {
        let mut cache = ModelCache::new();
        let key = ModelKey::Species {
            species: "red-maple".into(),
            season: Season::Autumn,
        };
        cache.mark_pending(key.clone());
        assert!(cache.ready(&key).is_none());
        cache.insert(key.clone(), Arc::new(Mesh::footprint_box(1.0, 1.0, 1.0)));
        assert!(cache.ready(&key).is_some());
        assert_eq!(cache.ready_count(), 1);
        cache.mark_failed(key.clone());
        assert!(matches!(cache.get(&key), Some(CacheEntry::Failed)));
    }
}
