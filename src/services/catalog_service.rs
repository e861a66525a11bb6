//! src/services/catalog_service.rs
//!
//! CatalogService — the document catalog built on a remote object store
//! whose per-object metadata is fixed at write time. The service simulates
//! mutable metadata with a read-merge-rewrite protocol and layers the
//! derived operations (existence-guarded upload, filtered listing, download,
//! delete, usage accounting) on top of it. All state lives in the store;
//! the service itself holds nothing but the client handle.

use crate::models::document::{DocumentEntry, DocumentMetadata};
use crate::store::{HeadObject, ObjectSummary, StorageBackend, StoreError};
use bytes::Bytes;
use futures::{StreamExt, TryStreamExt, stream};
use serde::Serialize;
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tracing::debug;

const MAX_KEY_LEN: usize = 1024;

/// Bounded fan-out width for the per-key head calls issued while listing.
const LIST_HEAD_CONCURRENCY: usize = 8;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("storage service not available; configure store credentials")]
    Unavailable,
    #[error("document `{0}` not found")]
    NotFound(String),
    #[error("document `{0}` already exists")]
    AlreadyExists(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("invalid document key")]
    InvalidKey,
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(key) => CatalogError::NotFound(key),
            StoreError::Backend(message) => CatalogError::Backend(message),
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// A new document handed to `upload`.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub filename: String,
    pub folder: String,
    pub pin: String,
    pub owner_email: String,
    pub owner_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Confirmation returned by `upload`: the key the document landed under and
/// the sidecar it was written with.
#[derive(Debug, Clone, Serialize)]
pub struct UploadOutcome {
    pub key: String,
    pub metadata: DocumentMetadata,
}

/// Filters accepted by the listing operation.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    /// Exact folder match; `None` or empty means no folder filter.
    pub folder: Option<String>,
    /// Trash flag to match exactly as a string; `None` defaults to `"false"`.
    pub trashed: Option<String>,
}

/// A downloaded document: body plus the headers the caller needs.
#[derive(Debug, Clone)]
pub struct DownloadedDocument {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Aggregate storage usage across the whole container.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StorageUsage {
    pub total_bytes: u64,
    pub file_count: usize,
}

/// Returns true for a well-formed access PIN: 4 or 6 ASCII digits.
pub fn is_valid_pin(pin: &str) -> bool {
    matches!(pin.len(), 4 | 6) && pin.bytes().all(|b| b.is_ascii_digit())
}

/// CatalogService provides the document operations:
/// - Upload a document (existence-guarded, one atomic store write)
/// - List documents (folder/trash filtered, per-key metadata fan-out)
/// - Download / delete a document
/// - Rewrite a document's metadata sidecar (read-merge-rewrite)
/// - Aggregate storage usage
///
/// The store handle is fixed at construction. `None` means the store client
/// could not be built (missing credentials): write paths then surface
/// `Unavailable` while the read paths degrade to empty, successful results.
#[derive(Clone)]
pub struct CatalogService {
    store: Option<Arc<dyn StorageBackend>>,
}

impl CatalogService {
    pub fn new(store: Option<Arc<dyn StorageBackend>>) -> Self {
        Self { store }
    }

    /// Whether the store client was constructed at startup.
    pub fn is_available(&self) -> bool {
        self.store.is_some()
    }

    fn backend(&self) -> CatalogResult<&Arc<dyn StorageBackend>> {
        self.store.as_ref().ok_or(CatalogError::Unavailable)
    }

    /// Basic key validation to avoid trivial path traversal vectors.
    ///
    /// Rejects empty or oversized keys, keys that begin with `/` or contain
    /// `..`, and keys carrying control bytes or backslashes.
    fn ensure_key_safe(key: &str) -> CatalogResult<()> {
        if key.is_empty() || key.len() > MAX_KEY_LEN {
            return Err(CatalogError::InvalidKey);
        }
        if key.starts_with('/') || key.contains("..") {
            return Err(CatalogError::InvalidKey);
        }
        if key
            .bytes()
            .any(|b| b.is_ascii_control() || b == b'\\' || b == b'\0')
        {
            return Err(CatalogError::InvalidKey);
        }
        Ok(())
    }

    /// Fetch a document's current head (sidecar map, content type, size).
    ///
    /// `Ok(None)` means the key does not exist — a valid outcome callers
    /// branch on, not an error.
    pub async fn read_metadata(&self, key: &str) -> CatalogResult<Option<HeadObject>> {
        let backend = self.backend()?;
        Ok(backend.head(key).await?)
    }

    /// Merge `patch` into a document's sidecar and rewrite the object.
    ///
    /// The store fixes metadata at creation, so the update reads the current
    /// map, overlays the patch (patch keys win, everything else is
    /// retained), normalizes sidecar defaults, and replaces the object with
    /// identical content under the merged map. There is no compare-and-swap:
    /// concurrent rewrites of the same key race and the last write wins.
    pub async fn rewrite_metadata(
        &self,
        key: &str,
        patch: HashMap<String, String>,
    ) -> CatalogResult<DocumentMetadata> {
        let backend = self.backend()?;
        let head = self
            .read_metadata(key)
            .await?
            .ok_or_else(|| CatalogError::NotFound(key.to_string()))?;

        let mut merged = head.metadata;
        merged.extend(patch);
        let merged = DocumentMetadata::ensure_defaults(merged);

        backend.rewrite(key, &head.content_type, &merged).await?;
        debug!(key, "rewrote document metadata");

        Ok(DocumentMetadata::from_map(&merged))
    }

    /// Create a document under `{folder}/{filename}` with its full sidecar.
    ///
    /// Fails `AlreadyExists` if the key is taken; never overwrites. The
    /// existence check and the store write are separate round trips, so two
    /// concurrent uploads of the same key can both pass the guard — the
    /// source behaved the same way and the window is kept for compatibility.
    pub async fn upload(&self, request: UploadRequest) -> CatalogResult<UploadOutcome> {
        let backend = self.backend()?;

        // Flatten any client-supplied path down to its final segment.
        let filename = request
            .filename
            .split(['/', '\\'])
            .next_back()
            .unwrap_or_default()
            .trim()
            .to_string();
        if filename.is_empty() {
            return Err(CatalogError::InvalidInput("empty filename".into()));
        }
        if !request.pin.is_empty() && !is_valid_pin(&request.pin) {
            return Err(CatalogError::InvalidInput(
                "PIN must be 4 or 6 digits".into(),
            ));
        }

        let key = if request.folder.is_empty() {
            filename.clone()
        } else {
            format!("{}/{}", request.folder, filename)
        };
        Self::ensure_key_safe(&key)?;

        if self.read_metadata(&key).await?.is_some() {
            return Err(CatalogError::AlreadyExists(key));
        }

        let metadata = DocumentMetadata {
            folder: request.folder,
            is_trashed: "false".to_string(),
            pin: request.pin,
            owner_email: request.owner_email,
            owner_name: request.owner_name,
        };

        backend
            .put(
                &key,
                request.data,
                &request.content_type,
                &metadata.clone().into_map(),
            )
            .await?;
        debug!(key, "uploaded document");

        Ok(UploadOutcome { key, metadata })
    }

    /// List documents matching the folder/trash filters.
    ///
    /// Enumerates every key once, then fetches each key's head — one round
    /// trip per key, the dominant cost of the system. The heads are fetched
    /// through a bounded concurrent stream; filtering is unaffected by
    /// completion order. Keys that vanish between enumeration and head
    /// (concurrent delete) are skipped. With no store configured the listing
    /// degrades to an empty, successful result.
    pub async fn list_documents(&self, filter: ListFilter) -> CatalogResult<Vec<DocumentEntry>> {
        let Some(backend) = &self.store else {
            return Ok(Vec::new());
        };

        let trashed = filter.trashed.unwrap_or_else(|| "false".to_string());
        let folder_filter = filter.folder.filter(|f| !f.is_empty());

        let summaries = backend.list_keys().await?;
        let described: Vec<(ObjectSummary, Option<HeadObject>)> =
            stream::iter(summaries)
                .map(|summary| {
                    let backend = Arc::clone(backend);
                    async move {
                        let head = backend.head(&summary.key).await?;
                        Ok::<_, StoreError>((summary, head))
                    }
                })
                .buffered(LIST_HEAD_CONCURRENCY)
                .try_collect()
                .await?;

        let mut files = Vec::new();
        for (summary, head) in described {
            let Some(head) = head else { continue };
            let meta = DocumentMetadata::from_map(&head.metadata);

            if meta.is_trashed != trashed {
                continue;
            }
            if let Some(folder) = &folder_filter {
                if meta.folder != *folder {
                    continue;
                }
            }

            let name = summary
                .key
                .split('/')
                .next_back()
                .unwrap_or(&summary.key)
                .to_string();
            files.push(DocumentEntry {
                name,
                key: summary.key,
                size: summary.size,
                last_modified: summary.last_modified,
                kind: "file".to_string(),
                folder: meta.folder,
                is_trashed: meta.is_trashed,
                owner_email: meta.owner_email,
                owner_name: meta.owner_name,
                pin: !meta.pin.is_empty(),
                content_type: head.content_type,
            });
        }

        Ok(files)
    }

    /// Fetch a document's full content for download.
    ///
    /// Reads the head first for the stored content type, then the body.
    /// No range or partial download support.
    pub async fn download(&self, key: &str) -> CatalogResult<DownloadedDocument> {
        let backend = self.backend()?;
        Self::ensure_key_safe(key)?;

        let head = self
            .read_metadata(key)
            .await?
            .ok_or_else(|| CatalogError::NotFound(key.to_string()))?;
        let data = backend.get(key).await?;

        let filename = key.split('/').next_back().unwrap_or(key).to_string();
        Ok(DownloadedDocument {
            filename,
            content_type: head.content_type,
            data,
        })
    }

    /// Hard-delete a document. Guarded by a head so a missing key surfaces
    /// as `NotFound` rather than a silent no-op.
    pub async fn delete(&self, key: &str) -> CatalogResult<()> {
        let backend = self.backend()?;
        Self::ensure_key_safe(key)?;

        if self.read_metadata(key).await?.is_none() {
            return Err(CatalogError::NotFound(key.to_string()));
        }
        backend.delete(key).await?;
        debug!(key, "deleted document");
        Ok(())
    }

    /// Sum object sizes across the whole container, trash included.
    ///
    /// Uses the enumeration sizes alone — no per-key heads. Degrades to
    /// zeros when no store is configured.
    pub async fn storage_usage(&self) -> CatalogResult<StorageUsage> {
        let Some(backend) = &self.store else {
            return Ok(StorageUsage::default());
        };

        let summaries = backend.list_keys().await?;
        Ok(StorageUsage {
            total_bytes: summaries.iter().map(|s| s.size).sum(),
            file_count: summaries.len(),
        })
    }

    /// Cheap store round trip for the readiness probe: a head of a key that
    /// is allowed not to exist.
    pub async fn probe_store(&self) -> CatalogResult<()> {
        let backend = self.backend()?;
        backend.head(".readyz-probe").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn catalog() -> CatalogService {
        CatalogService::new(Some(Arc::new(MemoryStore::new()) as Arc<dyn StorageBackend>))
    }

    fn request(filename: &str, folder: &str, pin: &str) -> UploadRequest {
        UploadRequest {
            filename: filename.to_string(),
            folder: folder.to_string(),
            pin: pin.to_string(),
            owner_email: "owner@example.com".to_string(),
            owner_name: "Owner".to_string(),
            content_type: "application/pdf".to_string(),
            data: Bytes::from_static(b"%PDF-1.4 content"),
        }
    }

    fn patch(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn upload_round_trip() {
        let catalog = catalog();
        let outcome = catalog.upload(request("report.pdf", "docs", "1234")).await.unwrap();
        assert_eq!(outcome.key, "docs/report.pdf");

        let head = catalog.read_metadata("docs/report.pdf").await.unwrap().unwrap();
        let meta = DocumentMetadata::from_map(&head.metadata);
        assert_eq!(meta.folder, "docs");
        assert_eq!(meta.is_trashed, "false");
        assert_eq!(meta.pin, "1234");
        assert_eq!(meta.owner_email, "owner@example.com");
        assert_eq!(head.content_type, "application/pdf");

        let doc = catalog.download("docs/report.pdf").await.unwrap();
        assert_eq!(doc.data, Bytes::from_static(b"%PDF-1.4 content"));
        assert_eq!(doc.filename, "report.pdf");
        assert_eq!(doc.content_type, "application/pdf");
    }

    #[tokio::test]
    async fn duplicate_upload_is_rejected_and_first_object_untouched() {
        let catalog = catalog();
        catalog.upload(request("a.txt", "", "")).await.unwrap();

        let mut second = request("a.txt", "", "");
        second.data = Bytes::from_static(b"other content");
        second.owner_name = "Intruder".to_string();
        let err = catalog.upload(second).await;
        assert!(matches!(err, Err(CatalogError::AlreadyExists(ref k)) if k == "a.txt"));

        let doc = catalog.download("a.txt").await.unwrap();
        assert_eq!(doc.data, Bytes::from_static(b"%PDF-1.4 content"));
        let head = catalog.read_metadata("a.txt").await.unwrap().unwrap();
        assert_eq!(
            DocumentMetadata::from_map(&head.metadata).owner_name,
            "Owner"
        );
    }

    #[tokio::test]
    async fn rewrite_changes_only_patched_fields() {
        let catalog = catalog();
        catalog.upload(request("a.txt", "docs", "1234")).await.unwrap();

        let meta = catalog
            .rewrite_metadata("docs/a.txt", patch(&[("folder", "archive")]))
            .await
            .unwrap();
        assert_eq!(meta.folder, "archive");
        assert_eq!(meta.is_trashed, "false");
        assert_eq!(meta.pin, "1234");
        assert_eq!(meta.owner_email, "owner@example.com");
        assert_eq!(meta.owner_name, "Owner");

        // Content and content type survive the rewrite.
        let doc = catalog.download("docs/a.txt").await.unwrap();
        assert_eq!(doc.data, Bytes::from_static(b"%PDF-1.4 content"));
        assert_eq!(doc.content_type, "application/pdf");
    }

    #[tokio::test]
    async fn rewrite_missing_key_is_not_found() {
        let catalog = catalog();
        let err = catalog.rewrite_metadata("nope", patch(&[])).await;
        assert!(matches!(err, Err(CatalogError::NotFound(_))));
    }

    #[tokio::test]
    async fn listing_filters_by_folder_and_trash_flag() {
        let catalog = catalog();
        catalog.upload(request("a.pdf", "docs", "1234")).await.unwrap();
        catalog.upload(request("b.pdf", "docs", "")).await.unwrap();
        catalog.upload(request("c.pdf", "pics", "")).await.unwrap();
        catalog.upload(request("d.pdf", "", "")).await.unwrap();
        catalog
            .rewrite_metadata("docs/b.pdf", patch(&[("is_trashed", "true")]))
            .await
            .unwrap();

        let docs = catalog
            .list_documents(ListFilter {
                folder: Some("docs".to_string()),
                trashed: None,
            })
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].name, "a.pdf");
        assert_eq!(docs[0].key, "docs/a.pdf");
        assert!(docs[0].pin);
        assert_eq!(docs[0].content_type, "application/pdf");

        let trashed = catalog
            .list_documents(ListFilter {
                folder: Some("docs".to_string()),
                trashed: Some("true".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(trashed.len(), 1);
        assert_eq!(trashed[0].name, "b.pdf");
        assert!(!trashed[0].pin);

        // No folder filter: everything non-trashed, regardless of folder.
        let all = catalog.list_documents(ListFilter::default()).await.unwrap();
        let mut names: Vec<&str> = all.iter().map(|e| e.name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["a.pdf", "c.pdf", "d.pdf"]);
    }

    #[tokio::test]
    async fn usage_counts_every_object_regardless_of_state() {
        let catalog = catalog();
        catalog.upload(request("a.pdf", "docs", "")).await.unwrap();
        catalog.upload(request("b.pdf", "", "")).await.unwrap();
        catalog
            .rewrite_metadata("docs/a.pdf", patch(&[("is_trashed", "true")]))
            .await
            .unwrap();

        let usage = catalog.storage_usage().await.unwrap();
        assert_eq!(usage.file_count, 2);
        assert_eq!(usage.total_bytes, 2 * b"%PDF-1.4 content".len() as u64);
    }

    #[tokio::test]
    async fn gate_closed_write_paths_fail_read_paths_degrade() {
        let catalog = CatalogService::new(None);

        assert!(matches!(
            catalog.upload(request("a.txt", "", "")).await,
            Err(CatalogError::Unavailable)
        ));
        assert!(matches!(
            catalog.download("a.txt").await,
            Err(CatalogError::Unavailable)
        ));
        assert!(matches!(
            catalog.delete("a.txt").await,
            Err(CatalogError::Unavailable)
        ));
        assert!(matches!(
            catalog.rewrite_metadata("a.txt", patch(&[])).await,
            Err(CatalogError::Unavailable)
        ));

        let files = catalog.list_documents(ListFilter::default()).await.unwrap();
        assert!(files.is_empty());
        let usage = catalog.storage_usage().await.unwrap();
        assert_eq!(usage.total_bytes, 0);
        assert_eq!(usage.file_count, 0);
    }

    #[tokio::test]
    async fn invalid_inputs_are_rejected() {
        let catalog = catalog();

        let err = catalog.upload(request("", "", "")).await;
        assert!(matches!(err, Err(CatalogError::InvalidInput(_))));

        let err = catalog.upload(request("a.txt", "", "12345")).await;
        assert!(matches!(err, Err(CatalogError::InvalidInput(_))));

        let err = catalog.upload(request("a.txt", "../escape", "")).await;
        assert!(matches!(err, Err(CatalogError::InvalidKey)));

        let err = catalog.download("../../etc/passwd").await;
        assert!(matches!(err, Err(CatalogError::InvalidKey)));
    }

    #[tokio::test]
    async fn delete_then_operations_report_not_found() {
        let catalog = catalog();
        catalog.upload(request("a.txt", "", "")).await.unwrap();

        catalog.delete("a.txt").await.unwrap();
        assert!(matches!(
            catalog.delete("a.txt").await,
            Err(CatalogError::NotFound(_))
        ));
        assert!(matches!(
            catalog.download("a.txt").await,
            Err(CatalogError::NotFound(_))
        ));
        assert!(catalog.read_metadata("a.txt").await.unwrap().is_none());

        let files = catalog.list_documents(ListFilter::default()).await.unwrap();
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn pdf_in_folder_scenario() {
        // Upload docs/report.pdf with a pin, list it, rename the owner,
        // re-list and check the pin survived only as a boolean.
        let catalog = catalog();
        catalog.upload(request("report.pdf", "docs", "1234")).await.unwrap();

        let docs = catalog
            .list_documents(ListFilter {
                folder: Some("docs".to_string()),
                trashed: Some("false".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].name, "report.pdf");
        assert!(docs[0].pin);

        catalog
            .rewrite_metadata("docs/report.pdf", patch(&[("owner_name", "Alice")]))
            .await
            .unwrap();

        let docs = catalog
            .list_documents(ListFilter {
                folder: Some("docs".to_string()),
                trashed: Some("false".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].owner_name, "Alice");
        assert!(docs[0].pin);
    }

    #[test]
    fn pin_validation() {
        assert!(is_valid_pin("1234"));
        assert!(is_valid_pin("123456"));
        assert!(!is_valid_pin(""));
        assert!(!is_valid_pin("12345"));
        assert!(!is_valid_pin("12ab"));
        assert!(!is_valid_pin("1234567"));
    }
}
