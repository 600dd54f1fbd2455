// Key-value storage backends

use async_trait::async_trait;
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

const LOCK_FILE: &str = ".notestore.lock";
const MAX_KEY_LEN: usize = 128;

/// Failure reported by a key-value backend
#[derive(Debug, Error)]
pub enum KvError {
    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("I/O error on key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("storage task failed: {0}")]
    Task(String),

    /// Backend is unavailable for environment reasons (quota, permissions, ...)
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Asynchronous byte store keyed by string
///
/// Every call either fully applies or fails; callers assume no partial writes.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError>;

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), KvError>;

    /// Delete the key; deleting an absent key succeeds
    async fn remove(&self, key: &str) -> Result<(), KvError>;
}

/// In-process store, lost at exit
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains_key(&self, key: &str) -> bool {
        self.entries.lock().await.contains_key(key)
    }
}

#[async_trait]
impl KeyValueStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), KvError> {
        self.entries.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), KvError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

/// One file per key inside a directory
///
/// Writes land in a temp file under an exclusive lock and are renamed into
/// place, so readers see either the old or the new value.
#[derive(Debug, Clone)]
pub struct FileKv {
    dir: PathBuf,
}

impl FileKv {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, KvError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| KvError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, KvError> {
        validate_key(key)?;
        Ok(self.dir.join(key))
    }

    async fn run_blocking<T, F>(f: F) -> Result<T, KvError>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, KvError> + Send + 'static,
    {
        tokio::task::spawn_blocking(f)
            .await
            .map_err(|e| KvError::Task(e.to_string()))?
    }
}

#[async_trait]
impl KeyValueStore for FileKv {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(KvError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), KvError> {
        let path = self.path_for(key)?;
        let dir = self.dir.clone();
        let key = key.to_string();

        Self::run_blocking(move || {
            let io_err = |source| KvError::Io { key: key.clone(), source };
            let _lock = acquire_lock(&dir).map_err(io_err)?;

            let tmp_path = dir.join(format!(".{}.tmp", key));
            if let Err(e) = write_then_rename(&tmp_path, &path, &value) {
                let _ = fs::remove_file(&tmp_path);
                return Err(io_err(e));
            }
            debug!(key = %key, bytes = value.len(), "FileKv::set: written");
            Ok(())
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<(), KvError> {
        let path = self.path_for(key)?;
        let dir = self.dir.clone();
        let key = key.to_string();

        Self::run_blocking(move || {
            let io_err = |source| KvError::Io { key: key.clone(), source };
            let _lock = acquire_lock(&dir).map_err(io_err)?;

            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!(key = %key, "FileKv::remove: removed");
                    Ok(())
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(source) => Err(io_err(source)),
            }
        })
        .await
    }
}

fn write_then_rename(tmp_path: &Path, path: &Path, value: &[u8]) -> io::Result<()> {
    let mut tmp = fs::File::create(tmp_path)?;
    tmp.write_all(value)?;
    tmp.sync_all()?;
    drop(tmp);
    fs::rename(tmp_path, path)
}

/// Exclusive lock on the directory's lock file, released on drop
fn acquire_lock(dir: &Path) -> io::Result<fs::File> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(dir.join(LOCK_FILE))?;
    file.lock_exclusive()?;
    Ok(file)
}

fn validate_key(key: &str) -> Result<(), KvError> {
    if key.is_empty() {
        return Err(KvError::InvalidKey("key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(KvError::InvalidKey(format!(
            "key too long: {} chars (max {})",
            key.len(),
            MAX_KEY_LEN
        )));
    }
    if !key.starts_with(|c: char| c.is_ascii_alphanumeric()) {
        return Err(KvError::InvalidKey(format!("{} (must start with a letter or digit)", key)));
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err(KvError::InvalidKey(format!("{} (must be alphanumeric with _/-/.)", key)));
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_memory_kv_get_set_remove() {
        let kv = MemoryKv::new();
        assert_eq!(kv.get("k").await.unwrap(), None);

        kv.set("k", b"value".to_vec()).await.unwrap();
        assert_eq!(kv.get("k").await.unwrap(), Some(b"value".to_vec()));
        assert!(kv.contains_key("k").await);

        kv.remove("k").await.unwrap();
        assert!(!kv.contains_key("k").await);
        kv.remove("k").await.unwrap();
    }

    #[tokio::test]
    async fn test_file_kv_open_creates_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("nested/notes");

        let kv = FileKv::open(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(kv.dir(), dir.as_path());
    }

    #[tokio::test]
    async fn test_file_kv_round_trip() {
        let temp = TempDir::new().unwrap();
        let kv = FileKv::open(temp.path()).unwrap();

        assert_eq!(kv.get("anotacoes_do_app").await.unwrap(), None);

        kv.set("anotacoes_do_app", b"[1]".to_vec()).await.unwrap();
        kv.set("anotacoes_do_app", b"[1,2]".to_vec()).await.unwrap();
        assert_eq!(kv.get("anotacoes_do_app").await.unwrap(), Some(b"[1,2]".to_vec()));

        // No temp file left behind
        assert!(!temp.path().join(".anotacoes_do_app.tmp").exists());
    }

    #[tokio::test]
    async fn test_file_kv_failed_set_leaves_no_temp_file() {
        let temp = TempDir::new().unwrap();
        let kv = FileKv::open(temp.path()).unwrap();

        // A directory in the key's place makes the rename fail
        fs::create_dir(temp.path().join("blocked")).unwrap();

        let result = kv.set("blocked", b"[]".to_vec()).await;
        assert!(matches!(result, Err(KvError::Io { .. })));
        assert!(!temp.path().join(".blocked.tmp").exists());
        assert!(temp.path().join("blocked").is_dir());
    }

    #[tokio::test]
    async fn test_file_kv_remove() {
        let temp = TempDir::new().unwrap();
        let kv = FileKv::open(temp.path()).unwrap();

        kv.set("notes", b"[]".to_vec()).await.unwrap();
        assert!(temp.path().join("notes").exists());

        kv.remove("notes").await.unwrap();
        assert!(!temp.path().join("notes").exists());
        assert_eq!(kv.get("notes").await.unwrap(), None);

        // Removing again is not an error
        kv.remove("notes").await.unwrap();
    }

    #[tokio::test]
    async fn test_file_kv_rejects_bad_keys() {
        let temp = TempDir::new().unwrap();
        let kv = FileKv::open(temp.path()).unwrap();

        assert!(matches!(kv.get("").await, Err(KvError::InvalidKey(_))));
        assert!(matches!(kv.get("../escape").await, Err(KvError::InvalidKey(_))));
        assert!(matches!(kv.set(".hidden", vec![]).await, Err(KvError::InvalidKey(_))));
        assert!(matches!(kv.remove("a/b").await, Err(KvError::InvalidKey(_))));
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("anotacoes_do_app").is_ok());
        assert!(validate_key("anotacoes_do_app.corrupt").is_ok());
        assert!(validate_key("with-dash").is_ok());
        assert!(validate_key(&"a".repeat(129)).is_err());
        assert!(validate_key("space key").is_err());
    }
}
