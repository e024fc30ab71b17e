use std::{path::{Path, PathBuf}, sync::Arc};

use async_trait::async_trait;
use models::item::{self, Item, ItemFields};
use tokio::sync::Mutex;
use tracing::debug;

use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};
use crate::repository::ItemRepository;
use crate::storage::json_file::JsonFile;

/// File-backed item collection.
///
/// Every mutation runs read -> apply -> write under `write_lock` on its own
/// task, so concurrent callers cannot lose each other's updates and a caller
/// that gives up mid-write cannot leave a half-finished write behind. Reads
/// take no lock and rely on the atomic swap in [`JsonFile::persist`] to never
/// observe a half-written file. The backing file must not be shared with
/// another store instance.
pub struct ItemStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    file: JsonFile<Item>,
    write_lock: Mutex<()>,
}

impl StoreInner {
    async fn load(&self) -> Result<Vec<Item>, ServiceError> {
        let items = self.file.load().await?;
        item::validate_collection(&items)?;
        Ok(items)
    }
}

async fn exists(path: &Path) -> Result<bool, ServiceError> {
    tokio::fs::try_exists(path)
        .await
        .map_err(|e| ServiceError::io(format!("stat {}", path.display()), e))
}

impl ItemStore {
    /// Open the store at `path`, creating an empty collection if missing.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        Self::with_seed(path, None::<PathBuf>).await
    }

    /// Like [`ItemStore::new`], but a missing file is initialized from `seed`.
    /// The seed is not read at all once the data file exists.
    pub async fn with_seed<P, S>(path: P, seed: Option<S>) -> Result<Arc<Self>, ServiceError>
    where
        P: Into<PathBuf>,
        S: AsRef<Path>,
    {
        let file = JsonFile::new(path);
        let data_exists = exists(file.path()).await?;
        let seed = match seed.as_ref().map(|s| s.as_ref()) {
            Some(_) if data_exists => None,
            Some(seed) => {
                if exists(seed).await? {
                    // seeded records go through the same integrity checks as the live file
                    let seeded = JsonFile::<Item>::new(seed).load().await?;
                    item::validate_collection(&seeded)?;
                    Some(seed)
                } else {
                    debug!(seed = %seed.display(), "seed missing, starting empty");
                    None
                }
            }
            None => None,
        };
        file.ensure_initialized(seed).await?;
        let inner = StoreInner { file, write_lock: Mutex::new(()) };
        Ok(Arc::new(Self { inner: Arc::new(inner) }))
    }

    pub fn path(&self) -> &Path {
        self.inner.file.path()
    }

    /// Apply a mutation to the collection and persist it as one critical section.
    /// Nothing is written when `f` fails. The section runs on a spawned task and
    /// completes even if the returned future is dropped.
    async fn mutate<F, R>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut Vec<Item>) -> Result<R, ServiceError> + Send + 'static,
        R: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            let _guard = inner.write_lock.lock().await;
            let mut items = inner.load().await?;
            let out = f(&mut items)?;
            inner.file.persist(&items).await?;
            Ok::<_, ServiceError>(out)
        });
        task.await
            .map_err(|e| ServiceError::StorageIo(format!("write task failed: {e}")))?
    }

    /// Assign the next id, append and persist.
    pub async fn create(&self, fields: ItemFields) -> Result<Item, ServiceError> {
        let created = self
            .mutate(move |items| {
                let rec = Item::new(item::next_id(items)?, fields);
                items.push(rec.clone());
                Ok(rec)
            })
            .await?;
        debug!(id = created.id, "item created");
        Ok(created)
    }

    /// All items in insertion order.
    pub async fn list(&self) -> Result<Vec<Item>, ServiceError> {
        self.inner.load().await
    }

    pub async fn list_page(&self, pagination: Pagination) -> Result<Page<Item>, ServiceError> {
        Ok(pagination.apply(self.inner.load().await?))
    }

    pub async fn get(&self, id: u64) -> Result<Item, ServiceError> {
        self.inner
            .load()
            .await?
            .into_iter()
            .find(|i| i.id == id)
            .ok_or_else(|| ServiceError::not_found("item"))
    }

    /// Shallow-merge `patch` onto the item; a patched `id` is ignored.
    pub async fn update(&self, id: u64, patch: ItemFields) -> Result<Item, ServiceError> {
        let updated = self
            .mutate(move |items| {
                let existing = items
                    .iter_mut()
                    .find(|i| i.id == id)
                    .ok_or_else(|| ServiceError::not_found("item"))?;
                existing.merge(patch);
                Ok(existing.clone())
            })
            .await?;
        debug!(id, "item updated");
        Ok(updated)
    }

    /// Remove the item in place, keeping the order of the rest.
    pub async fn delete(&self, id: u64) -> Result<Item, ServiceError> {
        let removed = self
            .mutate(move |items| {
                let idx = items
                    .iter()
                    .position(|i| i.id == id)
                    .ok_or_else(|| ServiceError::not_found("item"))?;
                Ok(items.remove(idx))
            })
            .await?;
        debug!(id, "item deleted");
        Ok(removed)
    }
}

#[async_trait]
impl ItemRepository for ItemStore {
    async fn create(&self, fields: ItemFields) -> Result<Item, ServiceError> { self.create(fields).await }
    async fn list(&self) -> Result<Vec<Item>, ServiceError> { self.list().await }
    async fn list_page(&self, pagination: Pagination) -> Result<Page<Item>, ServiceError> { self.list_page(pagination).await }
    async fn get(&self, id: u64) -> Result<Item, ServiceError> { self.get(id).await }
    async fn update(&self, id: u64, patch: ItemFields) -> Result<Item, ServiceError> { self.update(id, patch).await }
    async fn delete(&self, id: u64) -> Result<Item, ServiceError> { self.delete(id).await }
}
