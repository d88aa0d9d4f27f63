// Persistent key-value slot holding the serialized list

use eyre::{Context, Result, eyre};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default slot name
pub const DEFAULT_KEY: &str = "todos";

/// A single named slot that holds the whole list
///
/// `read` returns `None` when nothing has been written yet. `write` replaces
/// the slot's contents in full.
pub trait Storage {
    fn read(&self) -> Result<Option<String>>;

    fn write(&mut self, contents: &str) -> Result<()>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn read(&self) -> Result<Option<String>> {
        (**self).read()
    }

    fn write(&mut self, contents: &str) -> Result<()> {
        (**self).write(contents)
    }
}

/// In-process slot, mostly for tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    contents: Option<String>,
    writes: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with something already in the slot
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Some(contents.into()),
            writes: 0,
        }
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }

    /// Number of writes since creation
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Storage for MemoryStorage {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.contents.clone())
    }

    fn write(&mut self, contents: &str) -> Result<()> {
        self.contents = Some(contents.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// Slot stored as `{dir}/{key}.json`
///
/// Writes happen under an exclusive lock on `{dir}/{key}.lock` and land via
/// a rename, so a reader never sees a half-written list.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    key: String,
}

impl FileStorage {
    pub fn open<P: AsRef<Path>>(dir: P, key: &str) -> Result<Self> {
        validate_key(key)?;

        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create store directory: {}", dir.display()))?;

        Ok(Self {
            dir,
            key: key.to_string(),
        })
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.key))
    }

    fn lock_path(&self) -> PathBuf {
        self.dir.join(format!("{}.lock", self.key))
    }

    fn lock_file(&self) -> Result<File> {
        OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())
            .context("Failed to open lock file")
    }
}

impl Storage for FileStorage {
    fn read(&self) -> Result<Option<String>> {
        let path = self.path();

        let lock = self.lock_file()?;
        lock.lock_shared().context("Failed to acquire shared lock")?;

        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read slot file: {}", path.display())),
        }
    }

    fn write(&mut self, contents: &str) -> Result<()> {
        let path = self.path();
        let tmp_path = self.dir.join(format!("{}.json.tmp", self.key));

        let lock = self.lock_file()?;
        lock.lock_exclusive().context("Failed to acquire file lock")?;

        let written = write_synced(&tmp_path, contents).and_then(|()| {
            fs::rename(&tmp_path, &path).with_context(|| format!("Failed to replace slot file: {}", path.display()))
        });
        if written.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        written?;
        debug!(path = ?path, bytes = contents.len(), "Wrote slot file");

        // Lock is released when `lock` is dropped
        Ok(())
    }
}

fn write_synced(path: &Path, contents: &str) -> Result<()> {
    let mut file = File::create(path).context("Failed to create temporary slot file")?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("Failed to write temporary slot file: {}", path.display()))?;
    // Ensure data is flushed to disk
    file.sync_all()
        .with_context(|| format!("Failed to sync temporary slot file: {}", path.display()))
}

/// Slot keys end up in filenames and table rows
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(eyre!("Storage key cannot be empty"));
    }
    if key.len() > 64 {
        return Err(eyre!("Storage key too long: {} (max 64 chars)", key));
    }
    if !key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return Err(eyre!("Invalid storage key: {} (must be alphanumeric with _/-)", key));
    }
    Ok(())
}
