//! Remote asset store client (Cloudinary upload API).
//!
//! Uploads go to `https://api.cloudinary.com/v1_1/{cloud}/image/upload` as
//! signed multipart requests; the store answers with a canonical HTTPS URL
//! that is persisted on the owning record. Deletion is keyed by a public id
//! derived structurally from that URL's path, so the extraction lives in one
//! tested function ([`public_id_from_url`]) rather than per call site.

use crate::traits::{AssetStore, StorageError, StorageResult, UploadTarget};
use async_trait::async_trait;
use autocat_core::config::RemoteStoreConfig;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Host substring identifying URLs issued by the remote store.
pub const REMOTE_HOST_MARKER: &str = "res.cloudinary.com";

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

/// Client for the remote asset store. Constructed once at process start from
/// [`RemoteStoreConfig`] and shared by reference; holds no mutable state.
#[derive(Clone)]
pub struct RemoteStore {
    client: reqwest::Client,
    config: RemoteStoreConfig,
}

impl RemoteStore {
    pub fn new(config: RemoteStoreConfig) -> StorageResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| StorageError::Config(e.to_string()))?;

        Ok(RemoteStore { client, config })
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/{}/image/{}", API_BASE, self.config.cloud_name, action)
    }

    /// Sign request parameters: sorted `k=v` pairs joined with `&`, the API
    /// secret appended, SHA-256, hex.
    fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut sorted: Vec<_> = params.to_vec();
        sorted.sort_by_key(|(name, _)| *name);

        let mut to_sign = sorted
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("&");
        to_sign.push_str(&self.config.api_secret);

        hex::encode(Sha256::digest(to_sign.as_bytes()))
    }

    fn unix_now() -> (u64, u128) {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        (now.as_secs(), now.as_millis())
    }
}

/// Derive the remote store's public id from a URL it issued.
///
/// URL layout: `https://res.cloudinary.com/{cloud}/image/upload/
/// [{transformations}/][v{version}/]{folder}/{name}.{ext}`. Everything after
/// the `upload` segment is taken, leading transformation chains and the
/// version segment are skipped, and the file extension is stripped. Returns
/// `None` for URLs the store did not issue or whose path has no id part.
pub fn public_id_from_url(url: &str) -> Option<String> {
    if !url.contains(REMOTE_HOST_MARKER) {
        return None;
    }

    // Path only: drop query string and fragment.
    let path = url.split(['?', '#']).next()?;
    let after_host = path.split_once(REMOTE_HOST_MARKER)?.1;

    let mut segments = after_host
        .split('/')
        .filter(|s| !s.is_empty())
        .skip_while(|s| *s != "upload");

    // Skip the "upload" delivery segment itself.
    segments.next()?;

    let mut rest: Vec<&str> = segments.collect();

    // Transformation chains (e.g. "w_100,c_fill") sit between "upload" and
    // the version segment. The legacy site never generated them, but URLs
    // copied out of the store's console can carry them.
    while rest.first().is_some_and(|s| s.contains(',')) {
        rest.remove(0);
    }

    if rest
        .first()
        .is_some_and(|s| s.len() > 1 && s.starts_with('v') && s[1..].bytes().all(|b| b.is_ascii_digit()))
    {
        rest.remove(0);
    }

    let last = rest.pop()?;
    let stem = match last.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem,
        _ => last,
    };
    rest.push(stem);

    let joined = rest.join("/");
    let decoded = urlencoding::decode(&joined).ok()?;
    Some(decoded.into_owned())
}

#[async_trait]
impl AssetStore for RemoteStore {
    async fn upload(
        &self,
        data: Vec<u8>,
        original_name: &str,
        target: &UploadTarget,
    ) -> StorageResult<String> {
        if data.is_empty() {
            return Err(StorageError::EmptyUpload);
        }

        let size = data.len();
        let folder = target.category.folder().to_string();
        let (timestamp, millis) = Self::unix_now();
        // Category + time token keeps names unique across concurrent
        // unrelated uploads without coordinating with the store.
        let public_id = match target.record_id {
            Some(id) => format!("{}-{}-{}", target.category.as_str(), id, millis),
            None => format!("{}-{}", target.category.as_str(), millis),
        };
        let timestamp_str = timestamp.to_string();

        // Ask the store to optimize quality on delivery.
        let transformation = "q_auto";
        let signature = self.sign(&[
            ("folder", &folder),
            ("public_id", &public_id),
            ("timestamp", &timestamp_str),
            ("transformation", transformation),
        ]);

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(data).file_name(original_name.to_string()),
            )
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp_str)
            .text("folder", folder.clone())
            .text("public_id", public_id.clone())
            .text("transformation", transformation)
            .text("signature", signature);

        let start = std::time::Instant::now();

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::UploadFailed(format!(
                "remote store answered {}: {}",
                status, body
            )));
        }

        let parsed: UploadResponse = response
            .json()
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        tracing::info!(
            folder = %folder,
            public_id = %public_id,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Remote upload successful"
        );

        Ok(parsed.secure_url)
    }

    async fn delete(&self, reference: &str) -> bool {
        let Some(public_id) = public_id_from_url(reference) else {
            return false;
        };

        let (timestamp, _) = Self::unix_now();
        let timestamp_str = timestamp.to_string();
        let signature = self.sign(&[("public_id", &public_id), ("timestamp", &timestamp_str)]);

        let form = reqwest::multipart::Form::new()
            .text("public_id", public_id.clone())
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp_str)
            .text("signature", signature);

        let result = self
            .client
            .post(self.endpoint("destroy"))
            .multipart(form)
            .send()
            .await;

        match result {
            Ok(response) => match response.json::<DestroyResponse>().await {
                Ok(parsed) if parsed.result == "ok" => {
                    tracing::info!(public_id = %public_id, "Remote delete successful");
                    true
                }
                Ok(parsed) => {
                    tracing::warn!(
                        public_id = %public_id,
                        result = %parsed.result,
                        "Remote store did not confirm delete"
                    );
                    false
                }
                Err(e) => {
                    tracing::warn!(public_id = %public_id, error = %e, "Remote delete response unreadable");
                    false
                }
            },
            Err(e) => {
                tracing::warn!(public_id = %public_id, error = %e, "Remote delete request failed");
                false
            }
        }
    }

    fn owns(&self, reference: &str) -> bool {
        reference.contains(REMOTE_HOST_MARKER)
    }
}
