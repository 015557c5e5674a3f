use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::error::GalleryError;
use super::model::{Gallery, Image, NewImage};

/// How long a resolved confirmation prompt is remembered
const PROMPT_CLAIM_TTL_SECS: i64 = 24 * 60 * 60;

/// Document-level primitives a backend must provide.
///
/// Every write is conditional so that `GalleryStore` can build
/// read-modify-write on top without losing concurrent updates.
#[async_trait]
pub trait GalleryDocuments: Send + Sync {
    /// Strongly consistent read of one gallery document
    async fn load(&self, name: &str) -> Result<Option<Gallery>, GalleryError>;

    /// Write a new document; `false` if one with that name already exists
    async fn insert(&self, gallery: &Gallery) -> Result<bool, GalleryError>;

    /// Overwrite the document only if its stored version is `expected_version`;
    /// `false` on a version mismatch or if the document vanished
    async fn replace(&self, gallery: &Gallery, expected_version: u64)
        -> Result<bool, GalleryError>;

    /// Delete the document and its images; `false` if it did not exist
    async fn remove(&self, name: &str) -> Result<bool, GalleryError>;

    async fn names(&self) -> Result<Vec<String>, GalleryError>;

    /// Record `key` once; `false` if it was already recorded
    async fn claim(&self, key: &str, expires_at: i64) -> Result<bool, GalleryError>;
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: Duration::from_millis(25),
        }
    }
}

/// Gallery CRUD over any document backend
#[derive(Clone)]
pub struct GalleryStore {
    docs: Arc<dyn GalleryDocuments>,
    retry: RetryPolicy,
}

/// Validate a user-supplied image number against a gallery length
pub fn image_index(index: i64, len: usize) -> Result<usize, GalleryError> {
    usize::try_from(index)
        .ok()
        .filter(|i| *i < len)
        .ok_or(GalleryError::IndexOutOfRange { index, len })
}

impl GalleryStore {
    pub fn new(docs: Arc<dyn GalleryDocuments>) -> Self {
        Self {
            docs,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub async fn exists(&self, name: &str) -> Result<bool, GalleryError> {
        Ok(self.docs.load(name).await?.is_some())
    }

    pub async fn get(&self, name: &str) -> Result<Gallery, GalleryError> {
        self.docs
            .load(name)
            .await?
            .ok_or_else(|| GalleryError::not_found(name))
    }

    pub async fn create(&self, name: &str) -> Result<Gallery, GalleryError> {
        let gallery = Gallery::new(name);
        if !self.docs.insert(&gallery).await? {
            return Err(GalleryError::AlreadyExists {
                name: name.to_string(),
            });
        }
        tracing::info!(gallery = name, "created gallery");
        Ok(gallery)
    }

    pub async fn delete(&self, name: &str) -> Result<(), GalleryError> {
        if !self.docs.remove(name).await? {
            return Err(GalleryError::not_found(name));
        }
        tracing::info!(gallery = name, "deleted gallery");
        Ok(())
    }

    /// Unordered; callers sort if they care
    pub async fn list_names(&self) -> Result<Vec<String>, GalleryError> {
        self.docs.names().await
    }

    pub async fn get_images(&self, name: &str) -> Result<Vec<Image>, GalleryError> {
        Ok(self.get(name).await?.images)
    }

    /// Append and return the new image with its index
    pub async fn append_image(
        &self,
        name: &str,
        image: NewImage,
    ) -> Result<(usize, Image), GalleryError> {
        let appended = self
            .modify(name, |gallery| {
                let stored = Image {
                    seq: gallery.next_seq,
                    url: image.url.clone(),
                    author_id: image.author_id.clone(),
                    created_at: image.created_at,
                };
                gallery.next_seq += 1;
                gallery.images.push(stored.clone());
                Ok((gallery.images.len() - 1, stored))
            })
            .await?;
        tracing::debug!(gallery = name, index = appended.0, url = %appended.1.url, "image added to gallery");
        Ok(appended)
    }

    /// Remove the image at `index`; later images shift down by one
    pub async fn remove_image_at(&self, name: &str, index: i64) -> Result<Image, GalleryError> {
        let removed = self
            .modify(name, |gallery| {
                let i = image_index(index, gallery.images.len())?;
                Ok(gallery.images.remove(i))
            })
            .await?;
        tracing::debug!(gallery = name, index, "image removed from gallery");
        Ok(removed)
    }

    /// Remove the image carrying `seq` wherever it now sits; returns the
    /// index it held at removal
    pub async fn remove_image_by_seq(
        &self,
        name: &str,
        seq: u64,
    ) -> Result<(usize, Image), GalleryError> {
        let removed = self
            .modify(name, |gallery| {
                let i = gallery
                    .images
                    .iter()
                    .position(|img| img.seq == seq)
                    .ok_or_else(|| GalleryError::ImageNotFound {
                        name: gallery.gallery_name.clone(),
                        seq,
                    })?;
                Ok((i, gallery.images.remove(i)))
            })
            .await?;
        tracing::debug!(gallery = name, index = removed.0, seq, "image removed from gallery");
        Ok(removed)
    }

    /// First caller for a prompt id gets `true`
    pub async fn claim_prompt(&self, prompt_id: &str) -> Result<bool, GalleryError> {
        let expires_at = chrono::Utc::now().timestamp() + PROMPT_CLAIM_TTL_SECS;
        self.docs.claim(prompt_id, expires_at).await
    }

    /// Optimistic read-modify-write: re-read and retry when another writer
    /// bumped the version between our read and our write.
    async fn modify<T, F>(&self, name: &str, mutate: F) -> Result<T, GalleryError>
    where
        T: Send,
        F: Fn(&mut Gallery) -> Result<T, GalleryError> + Send + Sync,
    {
        let attempts = self.retry.max_attempts.max(1);
        for attempt in 1..=attempts {
            let mut gallery = self.get(name).await?;
            let expected = gallery.version;
            let outcome = mutate(&mut gallery)?;
            gallery.version = expected + 1;

            if self.docs.replace(&gallery, expected).await? {
                return Ok(outcome);
            }

            tracing::debug!(gallery = name, attempt, "conditional write lost a race, retrying");
            if attempt < attempts {
                tokio::time::sleep(self.retry.backoff * attempt).await;
            }
        }

        tracing::warn!(gallery = name, attempts, "giving up on contended gallery");
        Err(GalleryError::Contended {
            name: name.to_string(),
            attempts,
        })
    }
}
