//! Layer caching
//!
//! Referenced layers are opened once and shared. The [`LayerCache`] indexes
//! opened stages by both a sequential [`LayerId`] and their file path, so a
//! layer referenced by many prims is read from disk a single time.
//!
//! # Example
//!
//! ```ignore
//! let mut cache = LayerCache::new();
//! let handle = cache.load("output/MySphere.ron")?;
//! let stage: Arc<Stage> = cache.get(&handle).unwrap();
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::StageError;
use crate::stage::Stage;

/// Unique identifier for a cached layer.
///
/// IDs are assigned sequentially starting from 1; 0 is never assigned.
pub type LayerId = u64;

/// A lightweight handle to a cached layer.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct LayerHandle {
    id: LayerId,
    path: PathBuf,
}

impl LayerHandle {
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// The path this layer was loaded from or registered under
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A cache of opened layers keyed by path.
pub struct LayerCache {
    /// Stages indexed by ID
    layers: HashMap<LayerId, Arc<Stage>>,
    /// Reverse index from file path to layer ID (for deduplication)
    path_index: HashMap<PathBuf, LayerId>,
    next_id: LayerId,
}

impl Default for LayerCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self {
            layers: HashMap::new(),
            path_index: HashMap::new(),
            next_id: 1,
        }
    }

    /// Open the layer at `path`, or return the cached handle if already open.
    ///
    /// # Errors
    ///
    /// Returns a [`StageError`] if the file cannot be read or parsed.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<LayerHandle, StageError> {
        let path = path.as_ref().to_path_buf();

        if let Some(&id) = self.path_index.get(&path) {
            return Ok(LayerHandle { id, path });
        }

        let stage = Stage::open(&path)?;
        log::debug!("Opened layer {}", path.display());
        Ok(self.store(path, Arc::new(stage)))
    }

    /// Register an in-memory stage under `path`, replacing any cached layer there.
    ///
    /// Used to resolve references against layers that were just authored
    /// (or are about to be exported) without reading them back from disk.
    pub fn insert(&mut self, path: impl Into<PathBuf>, stage: Arc<Stage>) -> LayerHandle {
        let path = path.into();
        if let Some(id) = self.path_index.remove(&path) {
            self.layers.remove(&id);
        }
        self.store(path, stage)
    }

    fn store(&mut self, path: PathBuf, stage: Arc<Stage>) -> LayerHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.layers.insert(id, stage);
        self.path_index.insert(path.clone(), id);
        LayerHandle { id, path }
    }

    /// Retrieve a cached layer by its handle.
    pub fn get(&self, handle: &LayerHandle) -> Option<Arc<Stage>> {
        self.layers.get(&handle.id).cloned()
    }

    /// Drop the cached layer for `path` so the next load re-reads the file.
    ///
    /// Returns whether a layer was evicted.
    pub fn invalidate(&mut self, path: impl AsRef<Path>) -> bool {
        match self.path_index.remove(path.as_ref()) {
            Some(id) => self.layers.remove(&id).is_some(),
            None => false,
        }
    }

    pub fn contains(&self, handle: &LayerHandle) -> bool {
        self.layers.contains_key(&handle.id)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::WritePolicy;
    use tempfile::TempDir;

    fn write_layer(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(format!("{}.ron", name));
        Stage::new(name).export(&path, WritePolicy::Overwrite).unwrap();
        path
    }

    #[test]
    fn test_new_cache_is_empty() {
        let cache = LayerCache::new();
        assert_eq!(cache.layer_count(), 0);
    }

    #[test]
    fn test_load_and_get() {
        let dir = TempDir::new().unwrap();
        let path = write_layer(dir.path(), "MySphere");

        let mut cache = LayerCache::new();
        let handle = cache.load(&path).unwrap();
        assert_eq!(handle.id(), 1);
        assert_eq!(handle.path(), path.as_path());

        let stage = cache.get(&handle).unwrap();
        assert_eq!(stage.identifier(), "MySphere");
    }

    #[test]
    fn test_load_deduplicates_by_path() {
        let dir = TempDir::new().unwrap();
        let path = write_layer(dir.path(), "MyCube");

        let mut cache = LayerCache::new();
        let a = cache.load(&path).unwrap();
        let b = cache.load(&path).unwrap();
        assert_eq!(a, b);
        assert_eq!(cache.layer_count(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let mut cache = LayerCache::new();
        let result = cache.load("/nonexistent/layer.ron");
        assert!(matches!(result, Err(StageError::Io(_))));
        assert_eq!(cache.layer_count(), 0);
    }

    #[test]
    fn test_insert_replaces_cached_layer() {
        let mut cache = LayerCache::new();
        let first = cache.insert("MySphere.ron", Arc::new(Stage::new("first")));
        let second = cache.insert("MySphere.ron", Arc::new(Stage::new("second")));

        assert!(!cache.contains(&first));
        assert_eq!(cache.get(&second).unwrap().identifier(), "second");
        assert_eq!(cache.layer_count(), 1);
    }

    #[test]
    fn test_invalidate() {
        let mut cache = LayerCache::new();
        let handle = cache.insert("a.ron", Arc::new(Stage::new("a")));
        assert!(cache.invalidate("a.ron"));
        assert!(!cache.contains(&handle));
        assert!(!cache.invalidate("a.ron"));
    }
}
