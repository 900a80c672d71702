//! Batched photo upload into the blob store and the camera-roll document.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::UploadConfig;
use crate::models::{GeoPoint, PhotoRecord};
use crate::storage::{SocialStore, StorageError};

/// Error from the blob-store side of an upload.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The object store rejected or failed the write
    #[error("Upload to {path} failed: {reason}")]
    Object { path: String, reason: String },

    /// Camera-roll append failed after the blob landed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Opaque blob store holding the photo bytes.
///
/// `upload` returns the public download URL of the stored object.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    async fn upload(
        &self,
        path: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, UploadError>;
}

/// A photo picked for upload, with its capture metadata.
#[derive(Debug, Clone)]
pub struct PendingPhoto {
    pub bytes: Bytes,
    pub taken_at: DateTime<Utc>,
    pub location: Option<GeoPoint>,
}

/// Outcome of one batch upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadSummary {
    /// Photos whose blob landed and whose record was appended
    pub uploaded: usize,
    /// Photos that failed at either step
    pub failed: usize,
}

/// Uploads photo batches with bounded concurrency.
///
/// Each photo is stored under `photos/{user}/{uuid}.jpg`; once the blob is
/// confirmed, a record with its URL and capture metadata is appended to the
/// user's camera-roll document. One photo failing is logged and counted,
/// never aborting the rest of the batch.
pub struct PhotoUploader {
    store: Arc<dyn SocialStore>,
    objects: Arc<dyn ObjectStore>,
    concurrency: usize,
}

impl PhotoUploader {
    /// Create an uploader over a social store and a blob store.
    pub fn new(
        store: Arc<dyn SocialStore>,
        objects: Arc<dyn ObjectStore>,
        config: &UploadConfig,
    ) -> Self {
        Self {
            store,
            objects,
            concurrency: config.concurrency.max(1),
        }
    }

    /// Upload a batch of photos for `user`.
    pub async fn upload_batch(&self, user: &str, photos: Vec<PendingPhoto>) -> UploadSummary {
        let total = photos.len();
        let outcomes = stream::iter(photos)
            .map(|photo| self.upload_one(user, photo))
            .buffer_unordered(self.concurrency)
            .collect::<Vec<bool>>()
            .await;

        let uploaded = outcomes.iter().filter(|ok| **ok).count();
        let summary = UploadSummary {
            uploaded,
            failed: total - uploaded,
        };
        info!(
            user,
            uploaded = summary.uploaded,
            failed = summary.failed,
            "photo batch finished"
        );
        summary
    }

    async fn upload_one(&self, user: &str, photo: PendingPhoto) -> bool {
        let path = format!("photos/{user}/{}.jpg", Uuid::new_v4());
        let url = match self
            .objects
            .upload(&path, photo.bytes, "image/jpeg")
            .await
        {
            Ok(url) => url,
            Err(e) => {
                warn!(user, path, error = %e, "photo upload failed");
                return false;
            }
        };

        let record = PhotoRecord {
            url,
            taken_at: photo.taken_at,
            location: photo.location,
        };
        if let Err(e) = self.store.append_photo(user, record).await {
            warn!(user, path, error = %e, "camera-roll append failed");
            return false;
        }
        true
    }
}

impl std::fmt::Debug for PhotoUploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoUploader")
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::storage::{CameraRollStore, InMemoryStore, UserStore};

    fn photo(bytes: &'static [u8]) -> PendingPhoto {
        PendingPhoto {
            bytes: Bytes::from_static(bytes),
            taken_at: Utc::now(),
            location: None,
        }
    }

    async fn social_store() -> Arc<dyn SocialStore> {
        let store = InMemoryStore::new();
        store.create_user(User::new("u1", "Uma")).await.unwrap();
        Arc::new(store)
    }

    #[tokio::test]
    async fn batch_uploads_every_photo_and_appends_records() {
        let store = social_store().await;
        let mut objects = MockObjectStore::new();
        objects
            .expect_upload()
            .times(3)
            .returning(|path, _, _| Ok(format!("https://cdn.example.com/{path}")));

        let uploader = PhotoUploader::new(
            Arc::clone(&store),
            Arc::new(objects),
            &UploadConfig::default(),
        );
        let summary = uploader
            .upload_batch("u1", vec![photo(b"a"), photo(b"b"), photo(b"c")])
            .await;

        assert_eq!(summary, UploadSummary { uploaded: 3, failed: 0 });
        let roll = store.get_camera_roll("u1").await.unwrap().unwrap();
        assert_eq!(roll.photos.len(), 3);
        assert!(roll.photos.iter().all(|p| p.url.contains("photos/u1/")));
    }

    #[tokio::test]
    async fn one_failure_does_not_abort_the_batch() {
        let store = social_store().await;
        let mut objects = MockObjectStore::new();
        objects.expect_upload().returning(|path, bytes, _| {
            if bytes.as_ref() == b"bad" {
                Err(UploadError::Object {
                    path: path.to_string(),
                    reason: "simulated outage".to_string(),
                })
            } else {
                Ok(format!("https://cdn.example.com/{path}"))
            }
        });

        let uploader = PhotoUploader::new(
            Arc::clone(&store),
            Arc::new(objects),
            &UploadConfig::default(),
        );
        let summary = uploader
            .upload_batch("u1", vec![photo(b"good"), photo(b"bad"), photo(b"fine")])
            .await;

        assert_eq!(summary, UploadSummary { uploaded: 2, failed: 1 });
        let roll = store.get_camera_roll("u1").await.unwrap().unwrap();
        assert_eq!(roll.photos.len(), 2);
    }

    #[tokio::test]
    async fn empty_batch_is_a_no_op() {
        let store = social_store().await;
        let objects = MockObjectStore::new();

        let uploader =
            PhotoUploader::new(Arc::clone(&store), Arc::new(objects), &UploadConfig::default());
        let summary = uploader.upload_batch("u1", Vec::new()).await;

        assert_eq!(summary, UploadSummary::default());
        assert!(store.get_camera_roll("u1").await.unwrap().is_none());
    }
}
