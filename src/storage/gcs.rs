//! Google Cloud Storage implementation.

use super::{ObjectStore, UploadedObject};
use crate::config::StorageSettings;
use crate::error::{FortellError, Result};
use async_trait::async_trait;
use gcp_auth::{CustomServiceAccount, TokenProvider};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

/// OAuth scope for object writes.
const STORAGE_SCOPE: &str = "https://www.googleapis.com/auth/devstorage.read_write";

/// Upload timeout. Screen recordings can run to hundreds of megabytes.
const UPLOAD_TIMEOUT_SECS: u64 = 600;

/// Google Cloud Storage uploader using the JSON API media upload.
pub struct GcsStore {
    http: reqwest::Client,
    auth: Arc<dyn TokenProvider>,
    endpoint: String,
}

impl GcsStore {
    /// Create a store with an explicit token provider and endpoint.
    pub fn new(auth: Arc<dyn TokenProvider>, endpoint: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            auth,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a store from `GOOGLE_APPLICATION_CREDENTIALS` service-account
    /// credentials and the configured endpoint.
    pub fn from_env(settings: &StorageSettings) -> Result<Self> {
        let auth = create_auth_provider()?;
        Self::new(auth, &settings.endpoint)
    }
}

fn create_auth_provider() -> Result<Arc<dyn TokenProvider>> {
    let service_account = CustomServiceAccount::from_env()
        .map_err(|e| FortellError::Upload(format!("failed to load service account: {}", e)))?;

    match service_account {
        Some(sa) => Ok(Arc::new(sa)),
        None => Err(FortellError::Upload(
            "GOOGLE_APPLICATION_CREDENTIALS not set. \
             Set it to the path of your service account JSON file."
                .to_string(),
        )),
    }
}

/// Content type for common screen-recording containers.
fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("webm") => "video/webm",
        Some("mkv") => "video/x-matroska",
        _ => "application/octet-stream",
    }
}

/// Public URL for an uploaded object, with the object name encoded.
fn public_url(endpoint: &str, bucket: &str, object: &str) -> Result<String> {
    let base = Url::parse(&format!("{}/", endpoint))
        .map_err(|e| FortellError::Upload(format!("invalid storage endpoint: {}", e)))?;
    let joined = base
        .join(&format!("{}/{}", bucket, object))
        .map_err(|e| FortellError::Upload(format!("cannot build object URL: {}", e)))?;
    Ok(joined.to_string())
}

#[async_trait]
impl ObjectStore for GcsStore {
    #[instrument(skip(self), fields(path = %path.display(), bucket = %bucket))]
    async fn upload(&self, path: &Path, bucket: &str) -> Result<UploadedObject> {
        if !path.exists() {
            return Err(FortellError::InvalidInput(format!(
                "file not found: {}",
                path.display()
            )));
        }

        let object = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                FortellError::InvalidInput(format!(
                    "cannot derive an object name from: {}",
                    path.display()
                ))
            })?
            .to_string();

        let token = self
            .auth
            .token(&[STORAGE_SCOPE])
            .await
            .map_err(|e| FortellError::Upload(format!("failed to obtain auth token: {}", e)))?;

        let bytes = tokio::fs::read(path).await?;
        info!(
            "Uploading {} bytes to gs://{}/{}",
            bytes.len(),
            bucket,
            object
        );

        let response = self
            .http
            .post(format!("{}/upload/storage/v1/b/{}/o", self.endpoint, bucket))
            .query(&[
                ("uploadType", "media"),
                ("name", object.as_str()),
                ("predefinedAcl", "publicRead"),
            ])
            .bearer_auth(token.as_str())
            .header(reqwest::header::CONTENT_TYPE, content_type_for(path))
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FortellError::Upload(format!(
                "storage API returned {}: {}",
                status, body
            )));
        }

        let public_url = public_url(&self.endpoint, bucket, &object)?;
        info!("Upload complete: {}", public_url);

        Ok(UploadedObject {
            bucket: bucket.to_string(),
            name: object,
            public_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_content_type_for_common_containers() {
        assert_eq!(content_type_for(Path::new("rec.mp4")), "video/mp4");
        assert_eq!(content_type_for(Path::new("rec.mov")), "video/quicktime");
        assert_eq!(content_type_for(Path::new("rec.webm")), "video/webm");
        assert_eq!(
            content_type_for(Path::new("rec.unknown")),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_public_url_encodes_object_name() {
        let url = public_url(
            "https://storage.googleapis.com",
            "demo-bucket",
            "screen recording.mp4",
        )
        .unwrap();
        assert_eq!(
            url,
            "https://storage.googleapis.com/demo-bucket/screen%20recording.mp4"
        );
    }

    #[test]
    fn test_public_url_plain_name_is_untouched() {
        let url = public_url("https://storage.googleapis.com", "demo-bucket", "rec.mp4").unwrap();
        assert_eq!(url, "https://storage.googleapis.com/demo-bucket/rec.mp4");
    }

    #[test]
    fn test_object_name_comes_from_basename() {
        let path = PathBuf::from("/tmp/captures/demo.mp4");
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some("demo.mp4")
        );
    }
}
