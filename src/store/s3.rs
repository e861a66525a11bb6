//! S3-compatible store backend using `object_store`.

use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path;
use object_store::{
    Attribute, Attributes, GetOptions, ObjectStore, PutOptions, PutPayload,
};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::{HeadObject, ObjectSummary, StorageBackend, StoreError, StoreResult};

/// Connection settings for the S3 backend.
#[derive(Debug, Clone)]
pub struct S3StoreConfig {
    /// Bucket acting as the single container for all documents.
    pub bucket: String,
    /// AWS region.
    pub region: String,
    /// Custom endpoint for S3-compatible services like MinIO.
    pub endpoint: Option<String>,
    /// Access key ID.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Allow HTTP (insecure) connections, for local endpoints.
    pub allow_http: bool,
}

/// Remote S3 client.
///
/// User metadata rides along as `Attribute::Metadata` attributes so each
/// object carries its sidecar map. The store fixes attributes at write time;
/// `rewrite` therefore fetches the body and re-puts it under the replacement
/// attribute set, which preserves content exactly and swaps the map in one
/// store write.
pub struct S3Store {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl S3Store {
    pub fn new(config: S3StoreConfig) -> StoreResult<Self> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&config.bucket)
            .with_region(&config.region)
            .with_access_key_id(&config.access_key_id)
            .with_secret_access_key(&config.secret_access_key);

        if let Some(endpoint) = &config.endpoint {
            builder = builder.with_endpoint(endpoint);
            // Custom endpoints generally need path-style addressing.
            builder = builder.with_virtual_hosted_style_request(false);
        }

        if config.allow_http {
            builder = builder.with_allow_http(true);
        }

        let store = builder
            .build()
            .map_err(|err| StoreError::Backend(format!("failed to create S3 client: {err}")))?;

        info!(bucket = %config.bucket, "created S3 store client");

        Ok(Self {
            store: Arc::new(store),
            bucket: config.bucket,
        })
    }

    fn attributes(content_type: &str, metadata: &HashMap<String, String>) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        for (key, value) in metadata {
            attributes.insert(
                Attribute::Metadata(Cow::Owned(key.clone())),
                value.clone().into(),
            );
        }
        attributes
    }
}

#[async_trait]
impl StorageBackend for S3Store {
    async fn head(&self, key: &str) -> StoreResult<Option<HeadObject>> {
        let path = Path::from(key);
        let options = GetOptions {
            head: true,
            ..Default::default()
        };
        let result = match self.store.get_opts(&path, options).await {
            Ok(result) => result,
            Err(object_store::Error::NotFound { .. }) => return Ok(None),
            Err(err) => return Err(StoreError::Backend(format!("HEAD `{key}` failed: {err}"))),
        };

        let mut content_type = "application/octet-stream".to_string();
        let mut metadata = HashMap::new();
        for (attr, value) in result.attributes.iter() {
            match attr {
                Attribute::ContentType => content_type = value.to_string(),
                Attribute::Metadata(name) => {
                    metadata.insert(name.to_string(), value.to_string());
                }
                _ => {}
            }
        }

        Ok(Some(HeadObject {
            content_type,
            size: result.meta.size as u64,
            last_modified: result.meta.last_modified,
            metadata,
        }))
    }

    async fn get(&self, key: &str) -> StoreResult<Bytes> {
        let path = Path::from(key);
        let result = self.store.get(&path).await.map_err(|err| match err {
            object_store::Error::NotFound { .. } => StoreError::NotFound(key.to_string()),
            other => StoreError::Backend(format!("GET `{key}` failed: {other}")),
        })?;

        result
            .bytes()
            .await
            .map_err(|err| StoreError::Backend(format!("reading `{key}` body failed: {err}")))
    }

    async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
        metadata: &HashMap<String, String>,
    ) -> StoreResult<()> {
        let path = Path::from(key);
        let options = PutOptions {
            attributes: Self::attributes(content_type, metadata),
            ..Default::default()
        };
        self.store
            .put_opts(&path, PutPayload::from_bytes(data), options)
            .await
            .map_err(|err| StoreError::Backend(format!("PUT `{key}` failed: {err}")))?;
        debug!(bucket = %self.bucket, key, "stored object");
        Ok(())
    }

    async fn rewrite(
        &self,
        key: &str,
        content_type: &str,
        metadata: &HashMap<String, String>,
    ) -> StoreResult<()> {
        // The S3 API cannot edit attributes in place and object_store does
        // not expose copy-with-metadata-replace, so the rewrite fetches the
        // body and re-puts it with the new attribute set. Content bytes are
        // preserved exactly; last write wins under concurrent rewrites.
        let body = self.get(key).await?;
        self.put(key, body, content_type, metadata).await?;
        debug!(bucket = %self.bucket, key, "rewrote object metadata");
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let path = Path::from(key);
        self.store.delete(&path).await.map_err(|err| match err {
            object_store::Error::NotFound { .. } => StoreError::NotFound(key.to_string()),
            other => StoreError::Backend(format!("DELETE `{key}` failed: {other}")),
        })
    }

    async fn list_keys(&self) -> StoreResult<Vec<ObjectSummary>> {
        use futures::StreamExt;

        let mut stream = self.store.list(None);
        let mut summaries = Vec::new();
        while let Some(entry) = stream.next().await {
            let meta = entry
                .map_err(|err| StoreError::Backend(format!("LIST failed: {err}")))?;
            summaries.push(ObjectSummary {
                key: meta.location.to_string(),
                size: meta.size as u64,
                last_modified: meta.last_modified,
            });
        }
        Ok(summaries)
    }
}
