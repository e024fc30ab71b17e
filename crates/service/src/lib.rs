//! Service layer for the item store.
//! - `storage` owns the atomic JSON file primitive.
//! - `file` builds the lock-guarded item store on top of it.
//! - `repository` is the seam HTTP handlers depend on.

pub mod errors;
pub mod runtime;
pub mod storage;
pub mod file;
pub mod repository;
pub mod pagination;
