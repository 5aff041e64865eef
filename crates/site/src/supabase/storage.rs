//! Object storage calls for the listing-images bucket.
//!
//! Uploads go to owner-scoped paths (`<owner_id>/<uuid>.<ext>`); public URLs
//! are issued per object and stored on the listing row. Deletes resolve those
//! public URLs back to object keys.

use tracing::instrument;

use super::{SupabaseClient, SupabaseError, error_for_response};

/// Bucket holding all listing images.
pub const LISTING_IMAGES_BUCKET: &str = "listing-images";

/// Path segment that precedes `bucket/key` in a public object URL.
const PUBLIC_OBJECT_SEGMENT: &str = "/object/public/";

/// Cache lifetime requested for uploaded objects, in seconds.
const OBJECT_CACHE_CONTROL: &str = "3600";

impl SupabaseClient {
    fn object_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{LISTING_IMAGES_BUCKET}/{path}",
            self.base_url()
        )
    }

    /// Upload an object to the listing-images bucket, overwriting any
    /// existing object at the same path.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload is rejected or the request fails.
    #[instrument(skip(self, access_token, bytes), fields(path = %path, size = bytes.len()))]
    pub async fn upload_object(
        &self,
        access_token: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), SupabaseError> {
        let mut request = self
            .http()
            .post(self.object_url(path))
            .header("Authorization", self.bearer(Some(access_token)))
            .header("x-upsert", "true")
            .header("cache-control", OBJECT_CACHE_CONTROL)
            .body(bytes);

        if let Some(content_type) = content_type {
            request = request.header("Content-Type", content_type.to_string());
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(error_for_response(response).await);
        }
        Ok(())
    }

    /// Public URL for an object in the listing-images bucket.
    #[must_use]
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1{PUBLIC_OBJECT_SEGMENT}{LISTING_IMAGES_BUCKET}/{path}",
            self.base_url()
        )
    }

    /// Batch-remove objects from the listing-images bucket.
    ///
    /// Keys are bucket-relative (no `listing-images/` prefix).
    ///
    /// # Errors
    ///
    /// Returns an error if the remove is rejected or the request fails.
    /// Callers treat cleanup as best effort.
    #[instrument(skip(self, access_token, keys), fields(count = keys.len()))]
    pub async fn remove_objects(
        &self,
        access_token: &str,
        keys: &[String],
    ) -> Result<(), SupabaseError> {
        if keys.is_empty() {
            return Ok(());
        }

        let response = self
            .http()
            .delete(format!(
                "{}/storage/v1/object/{LISTING_IMAGES_BUCKET}",
                self.base_url()
            ))
            .header("Authorization", self.bearer(Some(access_token)))
            .json(&serde_json::json!({ "prefixes": keys }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_for_response(response).await);
        }
        Ok(())
    }
}

/// Resolve a public object URL back to its `bucket/key` form.
///
/// Returns `None` for URLs that are not public storage URLs (e.g., an
/// external placeholder).
#[must_use]
pub fn object_key_from_url(url: &str) -> Option<&str> {
    let idx = url.find(PUBLIC_OBJECT_SEGMENT)?;
    Some(&url[idx + PUBLIC_OBJECT_SEGMENT.len()..])
}

/// Strip the listing-images bucket prefix from a `bucket/key` value.
///
/// Returns `None` for keys that live in a different bucket; those must never
/// be deleted by listing cleanup.
#[must_use]
pub fn bucket_object_key(bucket_and_key: &str) -> Option<&str> {
    bucket_and_key
        .strip_prefix(LISTING_IMAGES_BUCKET)
        .and_then(|rest| rest.strip_prefix('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SupabaseConfig;

    fn client() -> SupabaseClient {
        SupabaseClient::new(&SupabaseConfig {
            url: "https://test-project.supabase.co".to_string(),
            anon_key: "anon".to_string(),
        })
        .expect("client")
    }

    #[test]
    fn test_public_url_contains_bucket_and_path() {
        let url = client().public_url("owner-1/photo.jpg");
        assert_eq!(
            url,
            "https://test-project.supabase.co/storage/v1/object/public/listing-images/owner-1/photo.jpg"
        );
    }

    #[test]
    fn test_object_key_roundtrip() {
        let url = client().public_url("owner-1/photo.jpg");
        let key = object_key_from_url(&url).expect("key");
        assert_eq!(key, "listing-images/owner-1/photo.jpg");
        assert_eq!(bucket_object_key(key), Some("owner-1/photo.jpg"));
    }

    #[test]
    fn test_object_key_from_external_url() {
        assert_eq!(
            object_key_from_url("https://images.unsplash.com/photo-1500530855697"),
            None
        );
    }

    #[test]
    fn test_foreign_bucket_keys_are_skipped() {
        assert_eq!(bucket_object_key("avatars/owner-1/photo.jpg"), None);
    }
}
