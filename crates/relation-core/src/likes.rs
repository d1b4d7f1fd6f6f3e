//! Likes between profiles.

use crate::error::{Error, Result};
use relation_store::RelationStore;
use serde::Serialize;
use tracing::debug;

/// Result of toggling a like.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LikeState {
    /// Liking profile
    pub liker_id: String,
    /// Liked profile
    pub likee_id: String,
    /// Whether the like now exists
    pub liked: bool,
}

/// Like service.
#[derive(Clone)]
pub struct Likes {
    store: RelationStore,
}

impl Likes {
    /// Create the service.
    pub fn new(store: RelationStore) -> Self {
        Self { store }
    }

    /// Profiles liked by `liker_id`.
    pub async fn liked_by(&self, liker_id: &str) -> Result<Vec<String>> {
        if liker_id.trim().is_empty() {
            return Err(Error::Validation("missing liker id".to_string()));
        }
        Ok(self.store.liked_by(liker_id).await?)
    }

    /// Add (`on`) or remove a like. Both directions are idempotent.
    pub async fn set_like(&self, liker_id: &str, likee_id: &str, on: bool) -> Result<LikeState> {
        if on {
            self.store.add_like(liker_id, likee_id).await?;
        } else {
            let removed = self.store.remove_like(liker_id, likee_id).await?;
            debug!(liker_id, likee_id, removed, "Like removed");
        }
        Ok(LikeState {
            liker_id: liker_id.to_string(),
            likee_id: likee_id.to_string(),
            liked: on,
        })
    }
}
