//! AttachmentStore: where uploaded idea files live.
//!
//! Backed by any `object_store` implementation, selected by `IDEABOX_UPLOAD_URL`:
//!
//! ```text
//! # Local directory (default ./uploads)
//! IDEABOX_UPLOAD_URL=/var/lib/ideabox/uploads
//! IDEABOX_UPLOAD_URL=file:///var/lib/ideabox/uploads
//!
//! # S3 / MinIO
//! IDEABOX_UPLOAD_URL=s3://my-bucket?endpoint=http://minio:9000&region=us-east-1
//!
//! # In-memory (tests)
//! IDEABOX_UPLOAD_URL=memory://
//! ```
//!
//! Stored files are addressed publicly as `/uploads/<key>`.

use std::sync::Arc;

use anyhow::{Context, Result};
use bytes::Bytes;
use object_store::{path::Path, ObjectStore};

/// Public route prefix recorded on ideas.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Longest extension kept from the uploaded file name.
const MAX_EXTENSION_LEN: usize = 10;

pub struct AttachmentStore {
    store: Arc<dyn ObjectStore>,
}

impl AttachmentStore {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(object_store::memory::InMemory::new()))
    }

    pub fn from_url(url: &str) -> Result<Self> {
        let store = build_object_store(url)?;
        tracing::info!(url = %url, "attachment store ready");
        Ok(Self::new(Arc::from(store)))
    }

    /// Store `data` and return the public path to record on the idea.
    pub async fn put(&self, original_name: Option<&str>, data: Bytes) -> Result<String> {
        let key = object_key(chrono::Utc::now().timestamp_millis(), original_name);
        let path = Path::from(key.as_str());
        let size = data.len();

        self.store
            .put(&path, data.into())
            .await
            .context("failed to write attachment")?;

        tracing::debug!(key = %key, size_bytes = size, "attachment stored");
        Ok(format!("{}/{}", PUBLIC_PREFIX, key))
    }

    /// Fetch an attachment by key. `Ok(None)` if it does not exist.
    pub async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        let path = parse_key(key).context("invalid attachment key")?;
        match self.store.get(&path).await {
            Ok(result) => {
                let bytes = result.bytes().await.context("failed to read attachment bytes")?;
                Ok(Some(bytes))
            }
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(e).context("failed to get attachment"),
        }
    }
}

/// Validate a client-supplied key; rejects empty, `.` and `..` segments.
pub fn parse_key(key: &str) -> Result<Path> {
    if key.is_empty() || key.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..") {
        anyhow::bail!("malformed attachment key: {}", key);
    }
    Path::parse(key).map_err(|e| anyhow::anyhow!("malformed attachment key {}: {}", key, e))
}

/// `<unix-millis>-<8 hex><.ext>`; the extension survives only if short and alphanumeric.
fn object_key(millis: i64, original_name: Option<&str>) -> String {
    let suffix = hex::encode(rand::random::<[u8; 4]>());
    let ext = original_name
        .and_then(|n| std::path::Path::new(n).extension())
        .and_then(|e| e.to_str())
        .filter(|e| {
            !e.is_empty() && e.len() <= MAX_EXTENSION_LEN && e.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();
    format!("{}-{}{}", millis, suffix, ext)
}

/// Content type from the key's extension; defaults to octet-stream.
pub fn content_type_for(key: &str) -> &'static str {
    let ext = key.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain; charset=utf-8",
        Some("csv") => "text/csv",
        Some("json") => "application/json",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some("pptx") => {
            "application/vnd.openxmlformats-officedocument.presentationml.presentation"
        }
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
}

/// Parse an `IDEABOX_UPLOAD_URL` into an `ObjectStore` implementation.
fn build_object_store(url: &str) -> Result<Box<dyn ObjectStore>> {
    if url.starts_with("memory://") {
        return Ok(Box::new(object_store::memory::InMemory::new()));
    }

    if url.starts_with("s3://") {
        let without_scheme = url.trim_start_matches("s3://");
        let bucket = without_scheme.split('?').next().unwrap_or(without_scheme);

        let endpoint = parse_query_param(url, "endpoint");
        let region = parse_query_param(url, "region").unwrap_or_else(|| "us-east-1".to_string());

        let mut builder = object_store::aws::AmazonS3Builder::new()
            .with_bucket_name(bucket)
            .with_region(&region);

        if let Some(ep) = endpoint {
            builder = builder.with_endpoint(&ep).with_allow_http(true);
        }

        // Credentials from env: AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY
        if let (Ok(key), Ok(secret)) = (
            std::env::var("AWS_ACCESS_KEY_ID"),
            std::env::var("AWS_SECRET_ACCESS_KEY"),
        ) {
            builder = builder.with_access_key_id(key).with_secret_access_key(secret);
        }

        let store = builder.build().context("failed to build S3 object store")?;
        return Ok(Box::new(store));
    }

    if url.contains("://") && !url.starts_with("file://") {
        anyhow::bail!("unsupported IDEABOX_UPLOAD_URL scheme: {}", url);
    }

    // LocalFileSystem canonicalizes the prefix, so it has to exist first.
    let dir = url.trim_start_matches("file://");
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create upload directory {}", dir))?;
    let store = object_store::local::LocalFileSystem::new_with_prefix(dir)
        .context("failed to create local file system object store")?;
    Ok(Box::new(store))
}

fn parse_query_param(url: &str, key: &str) -> Option<String> {
    let query = url.split('?').nth(1)?;
    for part in query.split('&') {
        let mut kv = part.splitn(2, '=');
        if kv.next() == Some(key) {
            return kv.next().map(|v| urlencoding::decode(v).unwrap_or_default().into_owned());
        }
    }
    None
}
