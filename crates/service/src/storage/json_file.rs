use std::{marker::PhantomData, path::{Path, PathBuf}};

use serde::{de::DeserializeOwned, Serialize};
use tokio::{fs, io::AsyncWriteExt};
use uuid::Uuid;

use crate::errors::ServiceError;

/// A JSON array of records persisted as one file.
///
/// Writes never touch the live file in place: the new contents go to a
/// sibling temp file which is synced and then renamed over the target, so a
/// concurrent `load` sees either the previous or the new collection. Callers
/// that read-modify-write must serialize those cycles themselves.
#[derive(Debug)]
pub struct JsonFile<T> {
    path: PathBuf,
    _record: PhantomData<fn() -> T>,
}

impl<T> JsonFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into(), _record: PhantomData }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file if missing. Contents come from `seed` when given,
    /// otherwise an empty array. An existing file is left alone.
    pub async fn ensure_initialized(&self, seed: Option<&Path>) -> Result<(), ServiceError> {
        if let Some(parent) = self.parent_dir() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ServiceError::io(format!("create {}", parent.display()), e))?;
        }

        match fs::metadata(&self.path).await {
            Ok(_) => return Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(ServiceError::io(format!("stat {}", self.path.display()), e)),
        }

        let records: Vec<T> = match seed {
            Some(seed) => {
                let bytes = fs::read(seed)
                    .await
                    .map_err(|e| ServiceError::io(format!("read seed {}", seed.display()), e))?;
                serde_json::from_slice(&bytes).map_err(|e| {
                    ServiceError::CorruptStore(format!("seed {}: {e}", seed.display()))
                })?
            }
            None => Vec::new(),
        };
        self.persist(&records).await
    }

    /// Read and parse the whole collection.
    pub async fn load(&self) -> Result<Vec<T>, ServiceError> {
        let bytes = fs::read(&self.path)
            .await
            .map_err(|e| ServiceError::io(format!("read {}", self.path.display()), e))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ServiceError::CorruptStore(format!("{}: {e}", self.path.display())))
    }

    /// Replace the collection atomically (temp file, fsync, rename).
    /// Dropping the future mid-write skips the temp cleanup, so run it to completion.
    pub async fn persist(&self, records: &[T]) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(records)
            .map_err(|e| ServiceError::StorageIo(format!("serialize: {e}")))?;
        let tmp_path = self.tmp_path();

        if let Err(e) = self.write_and_swap(&tmp_path, &data).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e);
        }

        // Persist the rename itself; not every platform can open a directory.
        if let Some(parent) = self.parent_dir() {
            if let Ok(dir) = fs::File::open(parent).await {
                let _ = dir.sync_all().await;
            }
        }
        Ok(())
    }

    async fn write_and_swap(&self, tmp_path: &Path, data: &[u8]) -> Result<(), ServiceError> {
        let mut tmp = fs::File::create(tmp_path)
            .await
            .map_err(|e| ServiceError::io(format!("create {}", tmp_path.display()), e))?;
        tmp.write_all(data)
            .await
            .map_err(|e| ServiceError::io(format!("write {}", tmp_path.display()), e))?;
        tmp.sync_all()
            .await
            .map_err(|e| ServiceError::io(format!("sync {}", tmp_path.display()), e))?;
        drop(tmp);

        fs::rename(tmp_path, &self.path).await.map_err(|e| {
            ServiceError::io(
                format!("rename {} -> {}", tmp_path.display(), self.path.display()),
                e,
            )
        })
    }

    fn tmp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "store".to_string());
        self.path.with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4().simple()))
    }

    fn parent_dir(&self) -> Option<&Path> {
        self.path.parent().filter(|p| !p.as_os_str().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Rec {
        id: u64,
        name: String,
    }

    fn tmp_file(tag: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("json_file_{tag}_{}", Uuid::new_v4()))
            .join("records.json")
    }

    #[tokio::test]
    async fn initializes_empty_array_and_persists() -> Result<(), anyhow::Error> {
        let path = tmp_file("init");
        let file = JsonFile::<Rec>::new(&path);
        file.ensure_initialized(None).await?;
        assert!(file.load().await?.is_empty());

        let recs = vec![Rec { id: 1, name: "a".into() }, Rec { id: 2, name: "b".into() }];
        file.persist(&recs).await?;
        assert_eq!(file.load().await?, recs);

        // pretty printed, human readable
        let raw = tokio::fs::read_to_string(&path).await?;
        assert!(raw.contains("\n  {"));

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test]
    async fn initialize_keeps_existing_file() -> Result<(), anyhow::Error> {
        let path = tmp_file("keep");
        let file = JsonFile::<Rec>::new(&path);
        file.ensure_initialized(None).await?;
        file.persist(&[Rec { id: 4, name: "d".into() }]).await?;
        file.ensure_initialized(None).await?;
        assert_eq!(file.load().await?.len(), 1);
        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test]
    async fn initializes_from_seed() -> Result<(), anyhow::Error> {
        let path = tmp_file("seed");
        let seed = path.with_file_name("seed.json");
        tokio::fs::create_dir_all(path.parent().unwrap()).await?;
        tokio::fs::write(&seed, br#"[{"id": 1, "name": "seeded"}]"#).await?;

        let file = JsonFile::<Rec>::new(&path);
        file.ensure_initialized(Some(&seed)).await?;
        assert_eq!(file.load().await?, vec![Rec { id: 1, name: "seeded".into() }]);
        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test]
    async fn unparseable_file_is_corrupt_not_io() -> Result<(), anyhow::Error> {
        let path = tmp_file("corrupt");
        tokio::fs::create_dir_all(path.parent().unwrap()).await?;
        tokio::fs::write(&path, b"[{\"id\": 1,").await?;
        let file = JsonFile::<Rec>::new(&path);
        assert!(matches!(file.load().await, Err(ServiceError::CorruptStore(_))));

        // the damaged file is not rewritten by initialization
        file.ensure_initialized(None).await?;
        assert_eq!(tokio::fs::read(&path).await?, b"[{\"id\": 1,");
        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let file = JsonFile::<Rec>::new(tmp_file("missing"));
        assert!(matches!(file.load().await, Err(ServiceError::StorageIo(_))));
    }

    #[tokio::test]
    async fn failed_write_leaves_previous_state() -> Result<(), anyhow::Error> {
        let path = tmp_file("fail");
        let file = JsonFile::<Rec>::new(&path);
        file.ensure_initialized(None).await?;
        file.persist(&[Rec { id: 1, name: "a".into() }]).await?;

        // a directory squatting on the target makes the rename fail
        let blocked = JsonFile::<Rec>::new(path.parent().unwrap());
        assert!(matches!(
            blocked.persist(&[Rec { id: 2, name: "b".into() }]).await,
            Err(ServiceError::StorageIo(_))
        ));

        assert_eq!(file.load().await?, vec![Rec { id: 1, name: "a".into() }]);
        let mut dir = tokio::fs::read_dir(path.parent().unwrap()).await?;
        while let Some(entry) = dir.next_entry().await? {
            assert!(!entry.file_name().to_string_lossy().ends_with(".tmp"));
        }
        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }
}
