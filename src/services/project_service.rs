//! Project service.
//!
//! Projects group a user's models and agents under a name with a
//! storage-budget label. Membership holds ids only; deleting an artifact
//! does not cascade into projects that reference it.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::artifact::ArtifactKind;
use crate::models::project::Project;
use crate::store::document::JsonDocument;
use crate::store::ArtifactStore;

type ProjectDoc = BTreeMap<String, Project>;

/// Request to create or replace project fields
#[derive(Debug, Clone)]
pub struct ProjectFields {
    pub name: String,
    pub description: String,
    pub storage_space_required: String,
}

/// Project service backed by a `projects.json` document
pub struct ProjectService {
    doc: JsonDocument<ProjectDoc>,
    /// Used only to verify member artifacts exist; references stay non-owning
    artifacts: Arc<dyn ArtifactStore>,
}

impl ProjectService {
    pub async fn open(data_dir: impl AsRef<Path>, artifacts: Arc<dyn ArtifactStore>) -> Result<Self> {
        Ok(Self {
            doc: JsonDocument::open(data_dir.as_ref().join("projects.json")).await?,
            artifacts,
        })
    }

    /// Create a project with a server-generated UUID id.
    pub async fn create(&self, owner: &str, fields: ProjectFields) -> Result<Project> {
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4().to_string(),
            name: fields.name,
            description: fields.description,
            owner: owner.to_string(),
            storage_space_required: fields.storage_space_required,
            created_at: now,
            updated_at: now,
            models: Vec::new(),
            agents: Vec::new(),
        };

        let project = self
            .doc
            .mutate(move |projects| {
                projects.insert(project.id.clone(), project.clone());
                Ok(project)
            })
            .await?;

        tracing::info!(id = %project.id, owner, "created project");
        Ok(project)
    }

    pub async fn list(&self, owner: &str) -> Result<Vec<Project>> {
        Ok(self
            .doc
            .read(|projects| {
                projects
                    .values()
                    .filter(|p| p.owner == owner)
                    .cloned()
                    .collect()
            })
            .await)
    }

    /// Fetch one project. Another owner's project reads as `NotFound` so
    /// existence is not leaked across accounts.
    pub async fn get(&self, id: &str, owner: &str) -> Result<Project> {
        self.doc
            .read(|projects| {
                projects
                    .get(id)
                    .filter(|p| p.owner == owner)
                    .cloned()
            })
            .await
            .ok_or_else(|| AppError::NotFound(format!("project '{}' not found", id)))
    }

    pub async fn update(&self, id: &str, owner: &str, fields: ProjectFields) -> Result<Project> {
        self.doc
            .mutate(|projects| {
                let project = owned_project(projects, id, owner)?;
                project.name = fields.name;
                project.description = fields.description;
                project.storage_space_required = fields.storage_space_required;
                project.updated_at = Utc::now();
                Ok(project.clone())
            })
            .await
    }

    pub async fn delete(&self, id: &str, owner: &str) -> Result<()> {
        self.doc
            .mutate(|projects| {
                owned_project(projects, id, owner)?;
                projects.remove(id);
                Ok(())
            })
            .await?;
        tracing::info!(id, "deleted project");
        Ok(())
    }

    /// Add an artifact to the project's membership set. The artifact must
    /// exist in its catalog, but the caller need not own it.
    pub async fn add_member(
        &self,
        project_id: &str,
        owner: &str,
        kind: ArtifactKind,
        artifact_id: &str,
    ) -> Result<Project> {
        self.require_artifact(kind, artifact_id).await?;

        self.doc
            .mutate(|projects| {
                let project = owned_project(projects, project_id, owner)?;
                let members = members_mut(project, kind);
                if members.iter().any(|m| m == artifact_id) {
                    return Err(AppError::Conflict(format!(
                        "{} '{}' is already in project '{}'",
                        kind, artifact_id, project_id
                    )));
                }
                members.push(artifact_id.to_string());
                project.updated_at = Utc::now();
                Ok(project.clone())
            })
            .await
    }

    /// Remove an artifact from the membership set. Fails when it is not a
    /// member.
    pub async fn remove_member(
        &self,
        project_id: &str,
        owner: &str,
        kind: ArtifactKind,
        artifact_id: &str,
    ) -> Result<Project> {
        self.require_artifact(kind, artifact_id).await?;

        self.doc
            .mutate(|projects| {
                let project = owned_project(projects, project_id, owner)?;
                let members = members_mut(project, kind);
                let position = members.iter().position(|m| m == artifact_id).ok_or_else(|| {
                    AppError::Validation(format!(
                        "{} '{}' is not in project '{}'",
                        kind, artifact_id, project_id
                    ))
                })?;
                members.remove(position);
                project.updated_at = Utc::now();
                Ok(project.clone())
            })
            .await
    }

    async fn require_artifact(&self, kind: ArtifactKind, artifact_id: &str) -> Result<()> {
        if self.artifacts.get(kind, artifact_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "{} '{}' not found",
                kind, artifact_id
            )));
        }
        Ok(())
    }
}

/// Look up a project scoped to its owner; misses and cross-owner access
/// both read as `NotFound`.
fn owned_project<'a>(projects: &'a mut ProjectDoc, id: &str, owner: &str) -> Result<&'a mut Project> {
    projects
        .get_mut(id)
        .filter(|p| p.owner == owner)
        .ok_or_else(|| AppError::NotFound(format!("project '{}' not found", id)))
}

fn members_mut(project: &mut Project, kind: ArtifactKind) -> &mut Vec<String> {
    match kind {
        ArtifactKind::Model => &mut project.models,
        ArtifactKind::Agent => &mut project.agents,
    }
}
