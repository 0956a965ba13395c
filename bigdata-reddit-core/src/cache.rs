use {
    std::{
        collections::{HashMap, hash_map::DefaultHasher},
        hash::Hasher,
        path::{Path, PathBuf},
        sync::{Arc, Mutex},
    },
    tracing::info,
    crate::{
        error::Result,
        store::Dataset,
    },
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceKey {
    Path(PathBuf),
    Content(u64),
}

/// Memoized dataset loads, keyed by where the data came from. There is no
/// staleness check: a changed file keeps its old dataset until `invalidate`.
///
/// Owned by whoever drives the pipeline (usually one per process) and shared
/// by reference; datasets come out as `Arc`s and are never mutated.
#[derive(Default)]
pub struct DatasetCache {
    entries: Mutex<HashMap<SourceKey, Arc<Dataset>>>,
}

impl SourceKey {
    pub fn for_path(path: &Path) -> Self {
        Self::Path(path.canonicalize().unwrap_or_else(|_| path.to_path_buf()))
    }

    pub fn for_content(data: &[u8]) -> Self {
        let mut hasher = DefaultHasher::new();
        hasher.write(data);
        Self::Content(hasher.finish())
    }
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(&self, path: impl AsRef<Path>) -> Result<Arc<Dataset>> {
        let path = path.as_ref();
        self.get_or_insert_with(SourceKey::for_path(path), || Dataset::load(path))
    }

    pub fn get_or_parse(&self, source_name: &str, data: &[u8]) -> Result<Arc<Dataset>> {
        self.get_or_insert_with(SourceKey::for_content(data), || Dataset::from_bytes(source_name, data))
    }

    pub fn invalidate(&self, key: &SourceKey) -> bool {
        self.lock().remove(key).is_some()
    }

    pub fn invalidate_path(&self, path: impl AsRef<Path>) -> bool {
        self.invalidate(&SourceKey::for_path(path.as_ref()))
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_or_insert_with(&self, key: SourceKey, load: impl FnOnce() -> Result<Dataset>) -> Result<Arc<Dataset>> {
        if let Some(dataset) = self.lock().get(&key) {
            return Ok(dataset.clone());
        }

        // loaded outside the lock; a racing load of the same source keeps the first result
        let dataset = Arc::new(load()?);
        info!("cached dataset for {:?}", key);

        Ok(self.lock().entry(key).or_insert(dataset).clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<SourceKey, Arc<Dataset>>> {
        // entries are only ever inserted whole, so a poisoned map is still consistent
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
