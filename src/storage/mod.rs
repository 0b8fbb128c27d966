//! Cloud storage for recording uploads.

mod gcs;

pub use gcs::GcsStore;

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// A stored object and its public location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedObject {
    /// Bucket the object lives in.
    pub bucket: String,
    /// Object name within the bucket.
    pub name: String,
    /// Publicly reachable URL of the object.
    pub public_url: String,
}

/// Uploads local files and returns their public URL.
///
/// Failures are explicit: callers never receive a URL for an object that
/// was not actually stored.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload a local file into `bucket`, making it publicly readable.
    async fn upload(&self, path: &Path, bucket: &str) -> Result<UploadedObject>;
}
