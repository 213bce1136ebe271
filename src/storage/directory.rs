//! Directory-backed object storage
//!
//! Containers are subdirectories of a root directory and objects are the
//! regular files inside them.

use super::ObjectStore;
use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Object store rooted at a local directory
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn container_path(&self, container: &str) -> Result<PathBuf> {
        validate_name("container", container)?;
        Ok(self.root.join(container))
    }

    fn object_path(&self, container: &str, name: &str) -> Result<PathBuf> {
        validate_name("object", name)?;
        Ok(self.container_path(container)?.join(name))
    }
}

fn validate_name(kind: &str, name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(PipelineError::Config(format!(
            "invalid {} name '{}'",
            kind, name
        )));
    }
    Ok(())
}

/// Flush a directory entry so a rename into it survives a crash
///
/// Only unix can open and fsync a directory; elsewhere this is a no-op.
pub(crate) fn sync_dir(dir: &Path) -> Result<()> {
    #[cfg(unix)]
    std::fs::File::open(dir)
        .and_then(|d| d.sync_all())
        .map_err(|e| PipelineError::io(dir, e))?;
    #[cfg(not(unix))]
    let _ = dir;
    Ok(())
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn list_objects(&self, container: &str, prefix: &str) -> Result<Vec<String>> {
        let dir = self.container_path(container)?;
        if !dir.exists() {
            log::debug!("Container {} does not exist", dir.display());
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&dir).map_err(|e| PipelineError::io(&dir, e))? {
            let entry = entry.map_err(|e| PipelineError::io(&dir, e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            // Skip in-flight temporary files
            if name.starts_with('.') {
                continue;
            }
            if name.starts_with(prefix) {
                names.push(name.to_string());
            }
        }
        names.sort();

        Ok(names)
    }

    async fn read_object(&self, container: &str, name: &str) -> Result<Vec<u8>> {
        let path = self.object_path(container, name)?;
        match std::fs::read(&path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(PipelineError::ObjectNotFound {
                container: container.to_string(),
                name: name.to_string(),
            }),
            Err(e) => Err(PipelineError::io(path, e)),
        }
    }

    async fn ensure_container(&self, container: &str) -> Result<()> {
        let dir = self.container_path(container)?;
        std::fs::create_dir_all(&dir).map_err(|e| PipelineError::io(&dir, e))
    }

    async fn write_object(&self, container: &str, name: &str, data: Vec<u8>) -> Result<()> {
        let path = self.object_path(container, name)?;
        let dir = self.container_path(container)?;
        let tmp = dir.join(format!(".{}.tmp", name));

        let mut file = std::fs::File::create(&tmp).map_err(|e| PipelineError::io(&tmp, e))?;
        file.write_all(&data)
            .and_then(|_| file.sync_all())
            .map_err(|e| PipelineError::io(&tmp, e))?;
        drop(file);

        std::fs::rename(&tmp, &path).map_err(|e| PipelineError::io(&path, e))?;
        sync_dir(&dir)?;
        log::debug!("Wrote {} byte(s) to {}", data.len(), path.display());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_list_read() {
        let temp = TempDir::new().unwrap();
        let store = LocalObjectStore::new(temp.path());

        store.ensure_container("raw").await.unwrap();
        store
            .write_object("raw", "task_events_2.json", b"[]".to_vec())
            .await
            .unwrap();
        store
            .write_object("raw", "task_events_1.json", b"[1]".to_vec())
            .await
            .unwrap();
        store
            .write_object("raw", "other.json", b"{}".to_vec())
            .await
            .unwrap();

        let names = store.list_objects("raw", "task_events").await.unwrap();
        assert_eq!(names, vec!["task_events_1.json", "task_events_2.json"]);

        let data = store.read_object("raw", "task_events_1.json").await.unwrap();
        assert_eq!(data, b"[1]");
    }

    #[tokio::test]
    async fn test_ensure_container_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let store = LocalObjectStore::new(temp.path());

        store.ensure_container("processed").await.unwrap();
        store.ensure_container("processed").await.unwrap();
        assert!(temp.path().join("processed").is_dir());
    }

    #[tokio::test]
    async fn test_write_overwrites() {
        let temp = TempDir::new().unwrap();
        let store = LocalObjectStore::new(temp.path());
        store.ensure_container("processed").await.unwrap();

        store
            .write_object("processed", "silver.parquet", b"old".to_vec())
            .await
            .unwrap();
        store
            .write_object("processed", "silver.parquet", b"new".to_vec())
            .await
            .unwrap();

        let data = store.read_object("processed", "silver.parquet").await.unwrap();
        assert_eq!(data, b"new");
        assert_eq!(
            store.list_objects("processed", "").await.unwrap(),
            vec!["silver.parquet"]
        );
    }

    #[tokio::test]
    async fn test_missing_container_lists_nothing() {
        let temp = TempDir::new().unwrap();
        let store = LocalObjectStore::new(temp.path());
        assert!(store.list_objects("raw", "").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_object() {
        let temp = TempDir::new().unwrap();
        let store = LocalObjectStore::new(temp.path());
        let err = store.read_object("processed", "nope").await.unwrap_err();
        assert!(matches!(err, PipelineError::ObjectNotFound { .. }));
    }

    #[test]
    fn test_sync_dir() {
        let temp = TempDir::new().unwrap();
        sync_dir(temp.path()).unwrap();

        #[cfg(unix)]
        assert!(matches!(
            sync_dir(&temp.path().join("missing")).unwrap_err(),
            PipelineError::Io { .. }
        ));
    }

    #[tokio::test]
    async fn test_write_leaves_no_temp_file() {
        let temp = TempDir::new().unwrap();
        let store = LocalObjectStore::new(temp.path());
        store.ensure_container("processed").await.unwrap();

        store
            .write_object("processed", "silver.parquet", b"data".to_vec())
            .await
            .unwrap();

        let entries: Vec<_> = std::fs::read_dir(temp.path().join("processed"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("silver.parquet")]);
    }

    #[tokio::test]
    async fn test_rejects_traversal() {
        let temp = TempDir::new().unwrap();
        let store = LocalObjectStore::new(temp.path());
        assert!(store.read_object("..", "passwd").await.is_err());
        assert!(store.read_object("raw", "../x").await.is_err());
    }
}
