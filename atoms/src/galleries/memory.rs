use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::error::{GalleryError, StoreOperation};
use super::model::Gallery;
use super::store::GalleryDocuments;

/// In-process document backend with the same conditional-write contract
/// as the DynamoDB one. Used by tests and local runs.
#[derive(Default)]
pub struct MemoryDocuments {
    galleries: Mutex<HashMap<String, Gallery>>,
    claims: Mutex<HashSet<String>>,
}

fn lock<T>(mutex: &Mutex<T>, operation: StoreOperation) -> Result<MutexGuard<'_, T>, GalleryError> {
    mutex
        .lock()
        .map_err(|_| GalleryError::unavailable(operation, "memory store lock poisoned"))
}

#[async_trait]
impl GalleryDocuments for MemoryDocuments {
    async fn load(&self, name: &str) -> Result<Option<Gallery>, GalleryError> {
        let snapshot = lock(&self.galleries, StoreOperation::Read)?.get(name).cloned();
        // Suspend like a network read would, so concurrent writers interleave
        tokio::task::yield_now().await;
        Ok(snapshot)
    }

    async fn insert(&self, gallery: &Gallery) -> Result<bool, GalleryError> {
        let mut galleries = lock(&self.galleries, StoreOperation::Create)?;
        if galleries.contains_key(&gallery.gallery_name) {
            return Ok(false);
        }
        galleries.insert(gallery.gallery_name.clone(), gallery.clone());
        Ok(true)
    }

    async fn replace(&self, gallery: &Gallery, expected_version: u64) -> Result<bool, GalleryError> {
        let mut galleries = lock(&self.galleries, StoreOperation::Write)?;
        match galleries.get_mut(&gallery.gallery_name) {
            Some(stored) if stored.version == expected_version => {
                *stored = gallery.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn remove(&self, name: &str) -> Result<bool, GalleryError> {
        Ok(lock(&self.galleries, StoreOperation::Delete)?
            .remove(name)
            .is_some())
    }

    async fn names(&self) -> Result<Vec<String>, GalleryError> {
        Ok(lock(&self.galleries, StoreOperation::List)?
            .keys()
            .cloned()
            .collect())
    }

    async fn claim(&self, key: &str, _expires_at: i64) -> Result<bool, GalleryError> {
        Ok(lock(&self.claims, StoreOperation::Claim)?.insert(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replace_requires_matching_version() {
        let docs = MemoryDocuments::default();
        let mut gallery = Gallery::new("cats");
        assert!(docs.insert(&gallery).await.expect("insert"));

        gallery.version = 1;
        assert!(!docs.replace(&gallery, 7).await.expect("stale replace"));
        assert!(docs.replace(&gallery, 0).await.expect("fresh replace"));
        assert!(!docs.replace(&gallery, 0).await.expect("replayed replace"));

        let stored = docs.load("cats").await.expect("load").expect("present");
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn replace_of_removed_gallery_fails() {
        let docs = MemoryDocuments::default();
        let gallery = Gallery::new("cats");
        docs.insert(&gallery).await.expect("insert");
        assert!(docs.remove("cats").await.expect("remove"));
        assert!(!docs.replace(&gallery, 0).await.expect("replace"));
        assert!(docs.load("cats").await.expect("load").is_none());
    }
}
