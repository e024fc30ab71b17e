use async_trait::async_trait;
use models::{Item, ItemFields};

use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};

/// Trait abstraction for item storage.
/// HTTP handlers hold an `Arc<dyn ItemRepository>`; the file-backed
/// `ItemStore` is the production implementation.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn create(&self, fields: ItemFields) -> Result<Item, ServiceError>;
    async fn list(&self) -> Result<Vec<Item>, ServiceError>;
    async fn list_page(&self, pagination: Pagination) -> Result<Page<Item>, ServiceError>;
    async fn get(&self, id: u64) -> Result<Item, ServiceError>;
    async fn update(&self, id: u64, patch: ItemFields) -> Result<Item, ServiceError>;
    /// Returns the removed record.
    async fn delete(&self, id: u64) -> Result<Item, ServiceError>;
}
