//! Remote object-store client abstraction and implementations.
//!
//! The backing store is a key/value byte store whose per-object metadata is
//! fixed at write time. Everything above this seam (the catalog) simulates
//! mutable metadata on top of it. Implementations:
//!
//! - **S3**: AWS S3 and S3-compatible services (MinIO, Ceph RGW, etc.)
//! - **Memory**: in-memory store for tests and local demo mode

mod memory;
mod s3;

pub use memory::MemoryStore;
pub use s3::{S3Store, S3StoreConfig};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;

/// Head data for a stored object: everything but the body.
#[derive(Debug, Clone)]
pub struct HeadObject {
    /// Content type recorded when the object was written.
    pub content_type: String,
    /// Size in bytes.
    pub size: u64,
    /// Store-assigned last-modified timestamp.
    pub last_modified: DateTime<Utc>,
    /// The user metadata map attached at write time.
    pub metadata: HashMap<String, String>,
}

/// One entry from a full-container enumeration. Carries only what the list
/// call itself returns; user metadata requires a separate `head`.
#[derive(Debug, Clone)]
pub struct ObjectSummary {
    pub key: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object `{0}` not found")]
    NotFound(String),
    #[error("{0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Client interface to the remote object store.
///
/// `put` and `rewrite` are the only writes. The store cannot edit metadata
/// in place; `rewrite` replaces the whole object with identical content and
/// a replacement metadata map, which is how the catalog layer simulates
/// partial metadata updates.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Fetch an object's head without its body. `Ok(None)` means the key
    /// does not exist; callers branch on it rather than treating it as an
    /// error.
    async fn head(&self, key: &str) -> StoreResult<Option<HeadObject>>;

    /// Fetch the full object body.
    async fn get(&self, key: &str) -> StoreResult<Bytes>;

    /// Write an object with its content type and metadata map in one atomic
    /// store write. Overwrites silently if the key exists; existence guards
    /// live above this seam.
    async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
        metadata: &HashMap<String, String>,
    ) -> StoreResult<()>;

    /// Replace an existing object's metadata map and content type while
    /// preserving its content bytes exactly. Fails `NotFound` if the key
    /// does not exist.
    async fn rewrite(
        &self,
        key: &str,
        content_type: &str,
        metadata: &HashMap<String, String>,
    ) -> StoreResult<()>;

    /// Delete an object unconditionally.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Enumerate every key in the container in a single pass.
    async fn list_keys(&self) -> StoreResult<Vec<ObjectSummary>>;
}
