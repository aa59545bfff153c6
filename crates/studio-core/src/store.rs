//! Record persistence
//!
//! [`RecordStore`] is the seam to the persistence collaborator. A failed call
//! never touches the caller's in-memory record, so resubmitting is safe.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use studio_record::{Record, RecordError, RecordLoader};
use tokio::io::AsyncWriteExt;

/// Persistence collaborator
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a new record under its id
    async fn create(&self, record: &Record) -> Result<Record, StoreError>;

    /// Replace the record stored under `id`
    async fn update(&self, id: &str, record: &Record) -> Result<Record, StoreError>;

    /// Fetch a record; `None` if absent
    async fn get(&self, id: &str) -> Result<Option<Record>, StoreError>;
}

/// Persistence errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// `create` for an id already stored
    #[error("record '{0}' already exists")]
    AlreadyExists(String),

    /// `update` for an id never stored
    #[error("record '{0}' not found")]
    NotFound(String),

    /// Id cannot name a stored record
    #[error("invalid record id: '{0}'")]
    InvalidId(String),

    /// Filesystem failure
    #[error("i/o error at {}: {source}", path.display())]
    Io {
        /// Path involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Stored or outgoing JSON is not a record
    #[error("record encoding: {0}")]
    Encoding(#[from] RecordError),

    /// Backend temporarily unreachable
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Check if resubmitting may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Unavailable(_))
    }

    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// In-process store backed by a concurrent map
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<String, Record>,
}

impl MemoryStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if nothing is stored
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait::async_trait]
impl RecordStore for MemoryStore {
    async fn create(&self, record: &Record) -> Result<Record, StoreError> {
        match self.records.entry(record.id.clone()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists(record.id.clone())),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(record.clone())
            }
        }
    }

    async fn update(&self, id: &str, record: &Record) -> Result<Record, StoreError> {
        let mut stored = self
            .records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        *stored = record.clone();
        Ok(record.clone())
    }

    async fn get(&self, id: &str) -> Result<Option<Record>, StoreError> {
        Ok(self.records.get(id).map(|entry| entry.value().clone()))
    }
}

/// One pretty-printed JSON file per record id
///
/// Reads go through [`RecordLoader`], so files written by older tools with
/// double-encoded fields load cleanly.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Store rooted at `root`; the directory is created on first write
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File holding the record with `id`
    ///
    /// # Errors
    /// [`StoreError::InvalidId`] for blank ids or ids containing path separators
    pub fn path_for(&self, id: &str) -> Result<PathBuf, StoreError> {
        let id = id.trim();
        if id.is_empty() || id.contains(|c| c == '/' || c == '\\') || id.starts_with('.') {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        Ok(self.root.join(format!("{id}.json")))
    }

    /// Write `record` to a sibling temp file, then rename it over `path`
    ///
    /// A failed write leaves any previous file at `path` intact.
    async fn write(&self, path: &Path, record: &Record, create_new: bool) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StoreError::io(&self.root, e))?;

        let json = record.to_json_pretty()?;
        let tmp = Self::temp_path(path);
        if let Err(err) = Self::write_temp(&tmp, json.as_bytes()).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(err);
        }

        if create_new
            && tokio::fs::try_exists(path)
                .await
                .map_err(|e| StoreError::io(path, e))?
        {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StoreError::AlreadyExists(record.id.clone()));
        }

        tokio::fs::rename(&tmp, path).await.map_err(|e| StoreError::io(path, e))
    }

    async fn write_temp(tmp: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        let mut file = tokio::fs::File::create(tmp)
            .await
            .map_err(|e| StoreError::io(tmp, e))?;
        file.write_all(bytes).await.map_err(|e| StoreError::io(tmp, e))?;
        file.sync_all().await.map_err(|e| StoreError::io(tmp, e))
    }

    // Leading dot: `path_for` never hands out such names, so no id can collide.
    fn temp_path(path: &Path) -> PathBuf {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        path.with_file_name(format!(".{name}.tmp"))
    }
}

#[async_trait::async_trait]
impl RecordStore for FileStore {
    async fn create(&self, record: &Record) -> Result<Record, StoreError> {
        let path = self.path_for(&record.id)?;
        self.write(&path, record, true).await?;
        tracing::debug!(path = %path.display(), "record created");
        Ok(record.clone())
    }

    async fn update(&self, id: &str, record: &Record) -> Result<Record, StoreError> {
        let path = self.path_for(id)?;
        if !tokio::fs::try_exists(&path)
            .await
            .map_err(|e| StoreError::io(&path, e))?
        {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.write(&path, record, false).await?;
        tracing::debug!(path = %path.display(), "record updated");
        Ok(record.clone())
    }

    async fn get(&self, id: &str) -> Result<Option<Record>, StoreError> {
        let path = self.path_for(id)?;
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(&path, e)),
        };
        Ok(Some(RecordLoader::new().load_str(&text)?))
    }
}
