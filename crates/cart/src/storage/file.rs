//! Filesystem storage backend.
//!
//! Each key is stored as one JSON file under a base directory. Writes go to
//! a sibling temporary file first and are then renamed over the target, so a
//! crash mid-write never leaves a truncated cart behind.

use std::fmt::Write as _;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::{KeyValueStore, StorageError};

/// Storage backed by files in a directory.
///
/// Assumes a single writer per key, which is what the cart store's
/// background writer guarantees.
#[derive(Debug, Clone)]
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Create a file store rooted at `base_path`.
    ///
    /// The directory is created lazily on the first write.
    #[must_use]
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Returns the directory holding the stored values.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path of the file holding `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", encode_key(key)))
    }
}

/// Map a key onto a portable file name.
///
/// ASCII alphanumerics, `-`, `_` and `.` pass through; every other byte is
/// percent-encoded. The mapping is injective, so distinct keys never share
/// a file.
fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.') {
            encoded.push(char::from(byte));
        } else {
            let _ = write!(encoded, "%{byte:02X}");
        }
    }
    encoded
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.base_path).await?;

        let path = self.path_for(key);
        let tmp_path = path.with_extension("json.tmp");

        tokio::fs::write(&tmp_path, value).await?;
        tokio::fs::rename(&tmp_path, &path).await?;

        debug!(path = %path.display(), bytes = value.len(), "Wrote value");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_key_passthrough() {
        assert_eq!(encode_key("cart-v1_products.bak"), "cart-v1_products.bak");
    }

    #[test]
    fn test_encode_key_escapes_separators() {
        assert_eq!(encode_key("@GoMarketplace:products"), "%40GoMarketplace%3Aproducts");
        assert_eq!(encode_key("../etc"), "..%2Fetc");
    }

    #[test]
    fn test_encode_key_is_injective_for_lookalikes() {
        assert_ne!(encode_key("a:b"), encode_key("a_b"));
        assert_ne!(encode_key("a%3Ab"), encode_key("a:b"));
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("not-created-yet"));

        assert_eq!(store.get("@GoMarketplace:products").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        store.set("@GoMarketplace:products", "[]").await.unwrap();
        store.set("@GoMarketplace:products", "[1]").await.unwrap();

        assert_eq!(
            store.get("@GoMarketplace:products").await.unwrap().as_deref(),
            Some("[1]")
        );
        assert!(store.path_for("@GoMarketplace:products").exists());
        assert!(!store.path_for("@GoMarketplace:products").with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_new_handle_sees_existing_data() {
        let dir = tempfile::tempdir().unwrap();
        FileStore::new(dir.path()).set("k", "v").await.unwrap();

        let reopened = FileStore::new(dir.path());
        assert_eq!(reopened.get("k").await.unwrap().as_deref(), Some("v"));
    }
}
