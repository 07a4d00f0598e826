// src/storage/mod.rs
mod memory;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::models::ExtractionResult;
use crate::utils::error::StorageError;

pub use memory::MemoryStore;

/// Document storage used by the extractors: a lookup by link and a save.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_by_link(&self, link: &str) -> Result<Option<ExtractionResult>, StorageError>;

    async fn save(&self, record: &ExtractionResult) -> Result<(), StorageError>;
}

/// Stores one JSON document per link under a base directory.
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    /// Creates a new FileStore with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of the document holding `link`.
    fn document_path(&self, link: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", document_key(link)))
    }
}

/// Longest escaped key used as a file name before falling back to a digest.
const MAX_READABLE_KEY: usize = 128;

/// Leading part of an over-long escaped key kept in front of its digest.
const DIGEST_PREFIX_LEN: usize = 48;

/// Maps a link to a file name. Alphanumerics, '.' and '-' are kept, every other
/// byte becomes `_XX` (hex), so distinct links never share a file. Keys longer
/// than `MAX_READABLE_KEY` become a readable prefix plus the SHA-256 of the link,
/// which keeps every name well under NAME_MAX.
fn document_key(link: &str) -> String {
    let mut key = String::with_capacity(link.len());
    for byte in link.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'.' | b'-' => key.push(byte as char),
            _ => key.push_str(&format!("_{:02X}", byte)),
        }
    }

    if key.len() <= MAX_READABLE_KEY {
        return key;
    }

    let mut hasher = Sha256::new();
    hasher.update(link.as_bytes());
    // Escaped keys are ASCII, so any byte offset is a char boundary.
    format!("{}-{:x}", &key[..DIGEST_PREFIX_LEN], hasher.finalize())
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn find_by_link(&self, link: &str) -> Result<Option<ExtractionResult>, StorageError> {
        let path = self.document_path(link);
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::IoError(e)),
        };

        let record: ExtractionResult = serde_json::from_slice(&raw)?;
        Ok(Some(record))
    }

    async fn save(&self, record: &ExtractionResult) -> Result<(), StorageError> {
        let path = self.document_path(&record.link);
        let body = serde_json::to_vec_pretty(record)?;

        // One temp file per save, renamed over the target once fully written.
        let base_dir = self.base_dir.clone();
        let target = path.clone();
        tokio::task::spawn_blocking(move || -> Result<(), StorageError> {
            let mut tmp = tempfile::Builder::new()
                .prefix(".saving-")
                .suffix(".tmp")
                .tempfile_in(&base_dir)?;
            tmp.write_all(&body)?;
            tmp.persist(&target).map_err(|e| StorageError::IoError(e.error))?;
            Ok(())
        })
        .await
        .map_err(|e| StorageError::Backend(format!("save task failed: {}", e)))??;

        tracing::debug!(link = %record.link, path = %path.display(), "Saved document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentPayload, ExtractionContext};
    use std::sync::Arc;

    fn sample(link: &str) -> ExtractionResult {
        ExtractionResult::new(
            link,
            Some("widget".to_string()),
            ContentPayload::Text("hello".to_string()),
            "github",
            &ExtractionContext::new("u-1", "Ada Lovelace"),
        )
    }

    #[test]
    fn test_document_key_is_filesystem_safe() {
        let key = document_key("https://github.com/acme/widget");
        assert!(!key.contains('/'));
        assert!(!key.contains(':'));
        assert_ne!(document_key("a-b"), document_key("a_b"));
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("docs")).unwrap();

        assert!(store.find_by_link("https://github.com/acme/widget").await.unwrap().is_none());

        let record = sample("https://github.com/acme/widget");
        store.save(&record).await.unwrap();

        let found = store.find_by_link("https://github.com/acme/widget").await.unwrap();
        assert_eq!(found, Some(record));
        assert!(store.find_by_link("https://github.com/acme/other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        store.save(&sample("https://example.com/post")).await.unwrap();

        let names: Vec<String> = fs::read_dir(store.base_dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].ends_with(".json"));
    }

    #[test]
    fn test_long_links_get_bounded_keys() {
        let base = "https://medium.com/@ada/notes-on-the-analytical-engine-3f9a2c1d";
        let long_a = format!("{}?utm_source=newsletter&utm_medium=email&utm_campaign={}&a=1", base, "x".repeat(120));
        let long_b = format!("{}?utm_source=newsletter&utm_medium=email&utm_campaign={}&a=2", base, "x".repeat(120));

        let key_a = document_key(&long_a);
        assert!(key_a.len() <= MAX_READABLE_KEY + 1 + 64);
        assert!(key_a.starts_with("https_3A_2F_2Fmedium.com"));
        assert_ne!(key_a, document_key(&long_b));
        assert_eq!(key_a, document_key(&long_a));

        assert_eq!(document_key("https://x.test/a"), "https_3A_2F_2Fx.test_2Fa");
    }

    #[tokio::test]
    async fn test_file_store_saves_links_longer_than_a_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        let link = format!(
            "https://medium.com/@ada/notes-on-the-analytical-engine-3f9a2c1d?utm_source=newsletter&utm_medium=email&utm_campaign={}",
            "spring-digest-".repeat(15)
        );
        assert!(link.len() > 250);

        assert!(store.find_by_link(&link).await.unwrap().is_none());
        let record = sample(&link);
        store.save(&record).await.unwrap();
        assert_eq!(store.find_by_link(&link).await.unwrap(), Some(record));

        for entry in fs::read_dir(store.base_dir()).unwrap() {
            assert!(entry.unwrap().file_name().len() < 255);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_saves_of_one_link_both_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileStore::new(dir.path()).unwrap());
        let link = "https://x.test/a";

        for _ in 0..50 {
            let first = {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.save(&sample(link)).await })
            };
            let second = {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.save(&sample(link)).await })
            };
            first.await.unwrap().unwrap();
            second.await.unwrap().unwrap();
        }

        let names: Vec<String> = fs::read_dir(store.base_dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![format!("{}.json", document_key(link))]);
        assert_eq!(store.find_by_link(link).await.unwrap().unwrap().link, link);
    }

    #[tokio::test]
    async fn test_corrupt_document_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        let link = "https://example.com/broken";
        fs::write(store.document_path(link), b"{not json").unwrap();

        let err = store.find_by_link(link).await.unwrap_err();
        assert!(matches!(err, StorageError::SerializationError(_)));
    }
}
