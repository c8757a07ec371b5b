use std::{
    path::{Component, Path, PathBuf},
    sync::{
        Arc, LazyLock,
        atomic::{AtomicU64, Ordering},
    },
};

use async_trait::async_trait;
use courier_common::{Submission, internal};
use dashmap::DashMap;
use serde::Deserialize;
use tokio::{fs, sync::Mutex};

use crate::{MessageStore, StoreError};

/// One writer lock per document, shared by every store in the process.
static DOCUMENT_LOCKS: LazyLock<DashMap<PathBuf, Arc<Mutex<()>>>> = LazyLock::new(DashMap::new);

/// Distinguishes concurrent temporary files for the same document.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

fn document_lock(path: &Path) -> Arc<Mutex<()>> {
    let key = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    DOCUMENT_LOCKS.entry(key).or_default().clone()
}

/// File-based backing store.
///
/// Every submission lives in one pretty-printed JSON array. An append reads
/// the whole array, adds one record and writes the whole array back.
///
/// # Atomicity
/// The new array is written to a `.tmp_` sibling and renamed over the
/// document, so a crash mid-write leaves the previous version intact.
///
/// # Concurrency
/// The read-modify-write cycle runs under an async mutex keyed by the
/// document's absolute path. Two stores pointed at the same file share the
/// lock; separate processes do not.
#[derive(Debug, Clone)]
pub struct FileBackingStore {
    path: PathBuf,
}

impl Default for FileBackingStore {
    fn default() -> Self {
        Self {
            path: PathBuf::from("messages/messages.json"),
        }
    }
}

impl<'de> Deserialize<'de> for FileBackingStore {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct FileBackingStoreHelper {
            path: PathBuf,
        }

        let helper = FileBackingStoreHelper::deserialize(deserializer)?;
        Self::validate_path(&helper.path).map_err(serde::de::Error::custom)?;

        Ok(Self { path: helper.path })
    }
}

impl FileBackingStore {
    /// Validate a document path
    ///
    /// # Security Checks
    /// - Rejects paths containing `..` (directory traversal)
    /// - Rejects paths into sensitive system directories
    /// - Requires a file name
    ///
    /// # Errors
    /// Returns an error if the path is invalid or potentially dangerous
    fn validate_path(path: &Path) -> crate::Result<()> {
        if path.components().any(|c| c == Component::ParentDir) {
            return Err(StoreError::InvalidPath(format!(
                "Store path cannot contain '..' components: {}",
                path.display()
            )));
        }

        if path.file_name().is_none() {
            return Err(StoreError::InvalidPath(format!(
                "Store path must name a file: {}",
                path.display()
            )));
        }

        let sensitive_prefixes = [
            "/etc",
            "/bin",
            "/sbin",
            "/usr/bin",
            "/usr/sbin",
            "/boot",
            "/sys",
            "/proc",
            "/dev",
        ];

        if let Some(prefix) = sensitive_prefixes.iter().find(|p| path.starts_with(p)) {
            return Err(StoreError::InvalidPath(format!(
                "Store path cannot be in system directory {prefix}: {}",
                path.display()
            )));
        }

        Ok(())
    }

    #[must_use]
    pub fn builder() -> FileBackingStoreBuilder {
        FileBackingStoreBuilder::default()
    }

    /// The JSON document this store reads and writes.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Prepare the document's directory.
    ///
    /// Creates the parent directory if needed. The document itself is only
    /// created by the first append.
    ///
    /// # Errors
    /// - If the parent directory cannot be created
    /// - If the path exists but is a directory
    pub async fn init(&self) -> crate::Result<()> {
        internal!("Initialising store at {}", self.path.display());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty())
            && !fs::try_exists(parent).await?
        {
            internal!("{} does not exist, creating...", parent.display());
            fs::create_dir_all(parent).await?;
        }

        if fs::metadata(&self.path).await.is_ok_and(|m| m.is_dir()) {
            return Err(StoreError::InvalidPath(format!(
                "Expected {} to be a file, but it is a directory",
                self.path.display()
            )));
        }

        self.remove_orphaned_temp_files().await
    }

    /// Remove `.tmp_` siblings of the document left by an interrupted write.
    ///
    /// Runs under the writer lock so an in-flight persist in this process is
    /// never touched.
    async fn remove_orphaned_temp_files(&self) -> crate::Result<()> {
        let Some(file_name) = self.path.file_name().map(|n| n.to_string_lossy().into_owned())
        else {
            return Ok(());
        };
        let directory = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let suffix = format!("_{file_name}");

        let lock = document_lock(&self.path);
        let _guard = lock.lock().await;

        let mut entries = fs::read_dir(&directory).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let name = name.to_string_lossy();

            if name.starts_with(".tmp_") && name.ends_with(&suffix) {
                internal!(
                    level = WARN,
                    "Removing incomplete write {}",
                    entry.path().display()
                );
                fs::remove_file(entry.path()).await?;
            }
        }

        Ok(())
    }

    /// Read the full document without taking the writer lock.
    ///
    /// A missing or empty document is an empty record.
    ///
    /// # Errors
    /// If the document cannot be read or is not a JSON array of submissions
    pub async fn load(&self) -> crate::Result<Vec<Submission>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Replace the full document without taking the writer lock.
    ///
    /// # Errors
    /// If the temporary file cannot be written or renamed into place
    pub async fn persist(&self, submissions: &[Submission]) -> crate::Result<()> {
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| StoreError::InvalidPath(self.path.display().to_string()))?;

        let temp_path = self.path.with_file_name(format!(
            ".tmp_{}_{}",
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed),
            file_name.to_string_lossy()
        ));

        let contents = serde_json::to_vec_pretty(submissions)?;

        let written = match fs::write(&temp_path, &contents).await {
            Ok(()) => fs::rename(&temp_path, &self.path).await,
            Err(e) => Err(e),
        };

        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(())
    }
}

#[async_trait]
impl MessageStore for FileBackingStore {
    #[tracing::instrument(level = "debug", skip_all, fields(path = %self.path.display()))]
    async fn append(&self, submission: &Submission) -> crate::Result<()> {
        let lock = document_lock(&self.path);
        let _guard = lock.lock().await;

        let mut submissions = self.load().await?;
        submissions.push(submission.clone());
        self.persist(&submissions).await?;

        internal!(
            level = DEBUG,
            "Stored submission from {} ({} total)",
            submission.email(),
            submissions.len()
        );

        Ok(())
    }

    #[tracing::instrument(level = "debug", skip_all, fields(path = %self.path.display()))]
    async fn list(&self) -> crate::Result<Vec<Submission>> {
        let lock = document_lock(&self.path);
        let _guard = lock.lock().await;

        self.load().await
    }
}

/// Builder for `FileBackingStore`
#[derive(Debug, Default)]
pub struct FileBackingStoreBuilder {
    path: PathBuf,
}

impl FileBackingStoreBuilder {
    /// Set the document path
    #[must_use]
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Build the final `FileBackingStore`
    ///
    /// # Errors
    /// Returns an error if the path is invalid or potentially dangerous
    pub fn build(self) -> crate::Result<FileBackingStore> {
        FileBackingStore::validate_path(&self.path)?;
        Ok(FileBackingStore { path: self.path })
    }
}
