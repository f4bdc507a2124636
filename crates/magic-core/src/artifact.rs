//! Decoded artifacts and the transient object URLs that expose them.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use tracing::trace;

use crate::error::ClientError;

pub const PNG_MIME: &str = "image/png";

/// One of the three images returned by the conversion service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    Worksheet,
    Preview,
    Labels,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::Worksheet,
        ArtifactKind::Preview,
        ArtifactKind::Labels,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            ArtifactKind::Worksheet => "worksheet.png",
            ArtifactKind::Preview => "preview.png",
            ArtifactKind::Labels => "labels.png",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ArtifactKind::Worksheet => "worksheet",
            ArtifactKind::Preview => "preview",
            ArtifactKind::Labels => "labels",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn decode_base64(payload: &str) -> Result<Vec<u8>, ClientError> {
    Ok(STANDARD.decode(payload.trim())?)
}

#[derive(Debug, Clone)]
struct Blob {
    mime: String,
    bytes: Arc<[u8]>,
}

#[derive(Debug, Default)]
struct StoreInner {
    next_id: AtomicU64,
    blobs: Mutex<HashMap<u64, Blob>>,
}

/// Registry of live object URLs. Cloning shares the registry.
#[derive(Debug, Clone, Default)]
pub struct BlobStore {
    inner: Arc<StoreInner>,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_object_url(&self, bytes: Vec<u8>, mime: &str) -> ObjectUrl {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let bytes: Arc<[u8]> = bytes.into();
        self.blobs().insert(
            id,
            Blob {
                mime: mime.to_string(),
                bytes: bytes.clone(),
            },
        );
        let url = format!("blob:magic/{id}");
        trace!(%url, len = bytes.len(), "object URL created");
        ObjectUrl {
            id,
            url,
            mime: mime.to_string(),
            bytes,
            store: self.clone(),
        }
    }

    /// Resolves a URL produced by [`BlobStore::create_object_url`] while it is still live.
    pub fn resolve(&self, url: &str) -> Option<(String, Arc<[u8]>)> {
        let id = url.strip_prefix("blob:magic/")?.parse::<u64>().ok()?;
        self.blobs()
            .get(&id)
            .map(|blob| (blob.mime.clone(), blob.bytes.clone()))
    }

    /// Number of object URLs not yet revoked.
    pub fn live_count(&self) -> usize {
        self.blobs().len()
    }

    fn revoke(&self, id: u64) {
        if self.blobs().remove(&id).is_some() {
            trace!(url = %format!("blob:magic/{id}"), "object URL revoked");
        }
    }

    fn blobs(&self) -> MutexGuard<'_, HashMap<u64, Blob>> {
        self.inner
            .blobs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Addressable reference to decoded bytes. Revoked when dropped.
#[derive(Debug)]
pub struct ObjectUrl {
    id: u64,
    url: String,
    mime: String,
    bytes: Arc<[u8]>,
    store: BlobStore,
}

impl ObjectUrl {
    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        self.store.revoke(self.id);
    }
}

/// Decodes `payload` and registers the bytes under a fresh object URL.
pub fn decode_and_offer(
    store: &BlobStore,
    payload: &str,
    mime: &str,
) -> Result<ObjectUrl, ClientError> {
    let bytes = decode_base64(payload)?;
    Ok(store.create_object_url(bytes, mime))
}

/// Displayable image source for a decoded artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSource {
    mime: String,
    bytes: Arc<[u8]>,
}

impl ImageSource {
    pub fn new(mime: &str, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.to_string(),
            bytes: bytes.into(),
        }
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

/// Receives the object URL of a download and persists it somewhere.
pub trait DownloadTarget {
    /// Returns a description of where the file went (a path, a URL, ...).
    fn download(&mut self, file_name: &str, object: &ObjectUrl) -> Result<String, ClientError>;
}

/// Action a host attaches to its download control.
///
/// Each trigger materializes a new object URL, hands it to the target and
/// revokes it before returning, whether or not the target succeeded.
#[derive(Debug, Clone)]
pub struct DownloadAction {
    kind: ArtifactKind,
    payload: Arc<str>,
    mime: &'static str,
    store: BlobStore,
}

impl DownloadAction {
    pub(crate) fn new(kind: ArtifactKind, payload: Arc<str>, store: BlobStore) -> Self {
        Self {
            kind,
            payload,
            mime: PNG_MIME,
            store,
        }
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    pub fn file_name(&self) -> &'static str {
        self.kind.file_name()
    }

    pub fn trigger<T: DownloadTarget + ?Sized>(
        &self,
        target: &mut T,
    ) -> Result<String, ClientError> {
        let object = decode_and_offer(&self.store, &self.payload, self.mime)?;
        target.download(self.file_name(), &object)
    }
}
