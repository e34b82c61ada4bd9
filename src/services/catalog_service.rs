//! Artifact catalog service.
//!
//! One instance per artifact kind (models, agents) wrapping the configured
//! storage backend. Adds the cross-store rules the backends cannot see:
//! the creator of a new artifact must be a registered user.

use std::sync::Arc;

use chrono::Utc;

use crate::error::{AppError, Result};
use crate::models::artifact::{Artifact, ArtifactKind};
use crate::services::auth_service::UserDirectory;
use crate::store::{ArtifactFilter, ArtifactStore, ArtifactUpdate, NewReview, PublishUpdate};

/// Request to publish a new artifact into the catalog
#[derive(Debug, Clone)]
pub struct NewArtifact {
    /// Caller-supplied id, unique within the catalog
    pub id: String,
    pub name: String,
    pub description: String,
    pub artifact_type: String,
    pub tags: Vec<String>,
    /// Defaults to "1.0.0"
    pub version: Option<String>,
    /// Defaults to "Free"
    pub price: Option<String>,
    pub public: bool,
    pub integration: Option<String>,
    /// Agent-only dependency list; discarded for models
    pub required_models: Vec<String>,
    pub apple_store_url: Option<String>,
    pub google_play_url: Option<String>,
    pub custom_payment_url: Option<String>,
}

/// Catalog of one artifact kind
pub struct ArtifactCatalog {
    kind: ArtifactKind,
    store: Arc<dyn ArtifactStore>,
    users: Arc<dyn UserDirectory>,
}

impl ArtifactCatalog {
    pub fn new(
        kind: ArtifactKind,
        store: Arc<dyn ArtifactStore>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self { kind, store, users }
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// Create a new artifact owned by `creator`.
    pub async fn create(&self, creator: &str, req: NewArtifact) -> Result<Artifact> {
        if !self.users.exists(creator).await? {
            return Err(AppError::Validation(format!(
                "creator '{}' is not a registered user",
                creator
            )));
        }

        let artifact = Artifact {
            id: req.id,
            kind: self.kind,
            name: req.name,
            description: req.description,
            creator: creator.to_string(),
            artifact_type: req.artifact_type,
            version: req.version.unwrap_or_else(|| "1.0.0".to_string()),
            tags: req.tags,
            // Model dependency lists only make sense on agents
            required_models: match self.kind {
                ArtifactKind::Model => Vec::new(),
                ArtifactKind::Agent => req.required_models,
            },
            created_at: Utc::now(),
            downloads: 0,
            rating: 0.0,
            reviews: Vec::new(),
            public: req.public,
            price: req.price.unwrap_or_else(|| "Free".to_string()),
            apple_store_url: req.apple_store_url,
            google_play_url: req.google_play_url,
            custom_payment_url: req.custom_payment_url,
            integration: req.integration,
        };

        let artifact = self.store.insert(artifact).await?;
        tracing::info!(kind = %self.kind, id = %artifact.id, creator, "created artifact");
        Ok(artifact)
    }

    pub async fn get(&self, id: &str) -> Result<Artifact> {
        self.store
            .get(self.kind, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} '{}' not found", self.kind, id)))
    }

    pub async fn list(&self, filter: ArtifactFilter) -> Result<Vec<Artifact>> {
        self.store.list(self.kind, &filter).await
    }

    /// The only listing a non-owner may use to discover someone else's work.
    pub async fn list_public(&self) -> Result<Vec<Artifact>> {
        let filter = ArtifactFilter {
            public_only: true,
            ..Default::default()
        };
        self.store.list(self.kind, &filter).await
    }

    pub async fn update(&self, id: &str, caller: &str, mut changes: ArtifactUpdate) -> Result<Artifact> {
        if self.kind == ArtifactKind::Model {
            changes.required_models = Vec::new();
        }
        self.store.update(self.kind, id, caller, changes).await
    }

    pub async fn publish(&self, id: &str, caller: &str, publish: PublishUpdate) -> Result<Artifact> {
        let artifact = self.store.publish(self.kind, id, caller, publish).await?;
        tracing::info!(kind = %self.kind, id, public = artifact.public, "changed artifact visibility");
        Ok(artifact)
    }

    pub async fn delete(&self, id: &str, caller: &str) -> Result<()> {
        self.store.delete(self.kind, id, caller).await?;
        tracing::info!(kind = %self.kind, id, "deleted artifact");
        Ok(())
    }

    /// Count a purchase/install event. No ownership check.
    pub async fn record_download(&self, id: &str) -> Result<i64> {
        self.store.record_download(self.kind, id).await
    }

    pub async fn add_review(
        &self,
        id: &str,
        username: &str,
        rating: f64,
        comment: &str,
    ) -> Result<Artifact> {
        let review = NewReview {
            username: username.to_string(),
            rating,
            comment: comment.to_string(),
            created_at: Utc::now(),
        };
        self.store.add_review(self.kind, id, review).await
    }
}
