//! Common test utilities.
//!
//! Builds the full service stack against the document backend in a
//! temporary directory, so tests run in-process with no external services.

#![allow(dead_code)]

use std::sync::Arc;

use tempfile::TempDir;

use model_foundry_backend::models::artifact::ArtifactKind;
use model_foundry_backend::services::auth_service::IdentityService;
use model_foundry_backend::services::catalog_service::{ArtifactCatalog, NewArtifact};
use model_foundry_backend::services::garden_service::GardenService;
use model_foundry_backend::services::project_service::ProjectService;
use model_foundry_backend::store::document::DocumentArtifactStore;
use model_foundry_backend::store::ArtifactStore;

pub const TEST_JWT_SECRET: &str = "test-signing-secret";
pub const TEST_PASSWORD: &str = "correct horse battery staple";

/// Full service stack over one scratch directory
pub struct Harness {
    pub identity: Arc<IdentityService>,
    pub store: Arc<dyn ArtifactStore>,
    pub models: ArtifactCatalog,
    pub agents: ArtifactCatalog,
    pub garden: GardenService,
    pub projects: ProjectService,
    _dir: TempDir,
}

impl Harness {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let identity = Arc::new(
            IdentityService::open(dir.path(), TEST_JWT_SECRET)
                .await
                .expect("failed to open identity store"),
        );
        let store: Arc<dyn ArtifactStore> = Arc::new(
            DocumentArtifactStore::open(dir.path())
                .await
                .expect("failed to open artifact store"),
        );
        let models = ArtifactCatalog::new(ArtifactKind::Model, store.clone(), identity.clone());
        let agents = ArtifactCatalog::new(ArtifactKind::Agent, store.clone(), identity.clone());
        let garden = GardenService::open(dir.path())
            .await
            .expect("failed to open garden store");
        let projects = ProjectService::open(dir.path(), store.clone())
            .await
            .expect("failed to open project store");

        Self {
            identity,
            store,
            models,
            agents,
            garden,
            projects,
            _dir: dir,
        }
    }

    /// Register a user with the shared test password.
    pub async fn register(&self, username: &str) {
        self.identity
            .register(username, &format!("{username}@example.com"), TEST_PASSWORD)
            .await
            .expect("registration failed");
    }
}

/// Minimal creation request for an artifact with the given id
pub fn new_artifact(id: &str) -> NewArtifact {
    NewArtifact {
        id: id.to_string(),
        name: format!("{id} name"),
        description: format!("{id} description"),
        artifact_type: "llm".to_string(),
        tags: vec!["nlp".to_string()],
        version: None,
        price: None,
        public: false,
        integration: None,
        required_models: Vec::new(),
        apple_store_url: None,
        google_play_url: None,
        custom_payment_url: None,
    }
}
