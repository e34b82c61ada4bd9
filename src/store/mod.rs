//! Catalog storage backends.
//!
//! Two backends implement the same [`ArtifactStore`] contract: a JSON
//! document store (one document per catalog) and a relational Postgres
//! store. A deployment picks exactly one; the two are never synchronized.

pub mod document;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::artifact::{Artifact, ArtifactKind};

/// Listing filter. Unset dimensions pass everything through.
#[derive(Debug, Clone, Default)]
pub struct ArtifactFilter {
    /// Exact match on the kind-specific type tag
    pub artifact_type: Option<String>,
    /// Subset test: every given tag must be present on the artifact
    pub tags: Option<Vec<String>>,
    /// Exact match on the creator (the "my items" listing)
    pub creator: Option<String>,
    /// Restrict to published artifacts
    pub public_only: bool,
}

impl ArtifactFilter {
    pub fn matches(&self, artifact: &Artifact) -> bool {
        if let Some(ty) = &self.artifact_type {
            if artifact.artifact_type != *ty {
                return false;
            }
        }
        if let Some(tags) = &self.tags {
            if !tags.iter().all(|t| artifact.tags.contains(t)) {
                return false;
            }
        }
        if let Some(creator) = &self.creator {
            if artifact.creator != *creator {
                return false;
            }
        }
        if self.public_only && !artifact.public {
            return false;
        }
        true
    }
}

/// Full replacement of an artifact's mutable fields.
///
/// `id`, `creator`, `version`, `created_at`, `downloads`, `rating`, and
/// `reviews` are immutable to this operation.
#[derive(Debug, Clone)]
pub struct ArtifactUpdate {
    pub name: String,
    pub description: String,
    pub artifact_type: String,
    pub tags: Vec<String>,
    pub price: String,
    pub public: bool,
    pub integration: Option<String>,
    pub required_models: Vec<String>,
}

/// Partial publish/monetization update: only provided URL fields change.
#[derive(Debug, Clone)]
pub struct PublishUpdate {
    pub public: bool,
    pub apple_store_url: Option<String>,
    pub google_play_url: Option<String>,
    pub custom_payment_url: Option<String>,
}

/// Review to append
#[derive(Debug, Clone)]
pub struct NewReview {
    pub username: String,
    pub rating: f64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Artifact storage contract shared by the document and relational backends.
///
/// Every mutation is all-or-nothing: it either fully commits or fails
/// before touching any field. Backends serialize mutations per catalog, so
/// at most one mutation is in flight for a given artifact id.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Insert a new artifact. Fails `Conflict` when the id is taken.
    async fn insert(&self, artifact: Artifact) -> Result<Artifact>;

    /// Fetch one artifact. Read-only.
    async fn get(&self, kind: ArtifactKind, id: &str) -> Result<Option<Artifact>>;

    /// List artifacts matching the filter, in the backing store's order.
    async fn list(&self, kind: ArtifactKind, filter: &ArtifactFilter) -> Result<Vec<Artifact>>;

    /// Replace the mutable fields. Fails `NotFound` / `Authorization`.
    async fn update(
        &self,
        kind: ArtifactKind,
        id: &str,
        caller: &str,
        changes: ArtifactUpdate,
    ) -> Result<Artifact>;

    /// Set visibility and any provided monetization URLs.
    async fn publish(
        &self,
        kind: ArtifactKind,
        id: &str,
        caller: &str,
        publish: PublishUpdate,
    ) -> Result<Artifact>;

    /// Remove an artifact. Fails `NotFound` / `Authorization`.
    async fn delete(&self, kind: ArtifactKind, id: &str, caller: &str) -> Result<()>;

    /// Increment the download counter; any caller may trigger this.
    /// Returns the new count.
    async fn record_download(&self, kind: ArtifactKind, id: &str) -> Result<i64>;

    /// Append a review and recompute the mean rating.
    async fn add_review(&self, kind: ArtifactKind, id: &str, review: NewReview)
        -> Result<Artifact>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(tags: &[&str], artifact_type: &str, creator: &str, public: bool) -> Artifact {
        Artifact {
            id: "a1".into(),
            kind: ArtifactKind::Model,
            name: "a1".into(),
            description: String::new(),
            creator: creator.into(),
            artifact_type: artifact_type.into(),
            version: "1.0.0".into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            required_models: Vec::new(),
            created_at: Utc::now(),
            downloads: 0,
            rating: 0.0,
            reviews: Vec::new(),
            public,
            price: "Free".into(),
            apple_store_url: None,
            google_play_url: None,
            custom_payment_url: None,
            integration: None,
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let f = ArtifactFilter::default();
        assert!(f.matches(&artifact(&["a"], "llm", "alice", false)));
    }

    #[test]
    fn tag_filter_is_a_subset_test() {
        let f = ArtifactFilter {
            tags: Some(vec!["a".into(), "b".into()]),
            ..Default::default()
        };
        assert!(f.matches(&artifact(&["a", "b", "c"], "llm", "alice", false)));
        assert!(!f.matches(&artifact(&["a"], "llm", "alice", false)));
    }

    #[test]
    fn type_and_creator_filters_are_exact() {
        let f = ArtifactFilter {
            artifact_type: Some("llm".into()),
            creator: Some("alice".into()),
            ..Default::default()
        };
        assert!(f.matches(&artifact(&[], "llm", "alice", false)));
        assert!(!f.matches(&artifact(&[], "vision", "alice", false)));
        assert!(!f.matches(&artifact(&[], "llm", "bob", false)));
    }

    #[test]
    fn public_only_excludes_private() {
        let f = ArtifactFilter {
            public_only: true,
            ..Default::default()
        };
        assert!(f.matches(&artifact(&[], "llm", "alice", true)));
        assert!(!f.matches(&artifact(&[], "llm", "alice", false)));
    }
}
