//! JSON document storage backend.
//!
//! Each catalog persists as a single JSON document on disk, keyed by record
//! id. A per-document async mutex serializes mutations; a mutation runs
//! against a copy of the state and is committed to memory only after the
//! copy has been persisted, so a failed operation leaves nothing behind.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tokio::sync::Mutex;

use super::{ArtifactFilter, ArtifactStore, ArtifactUpdate, NewReview, PublishUpdate};
use crate::error::{AppError, Result};
use crate::models::artifact::{mean_rating, Artifact, ArtifactKind, Review};

/// A JSON file holding one catalog's entire state.
pub struct JsonDocument<T> {
    path: PathBuf,
    state: Mutex<T>,
}

impl<T> JsonDocument<T>
where
    T: Clone + Default + Serialize + DeserializeOwned,
{
    /// Open (or initialize) the document at `path`.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let state = match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => T::default(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    /// Run a read-only closure against the current state.
    pub async fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.state.lock().await;
        f(&guard)
    }

    /// Run a mutation. The closure operates on a copy; on success the copy
    /// is written to disk and then swapped in. On any error the stored
    /// state is untouched.
    pub async fn mutate<R>(&self, f: impl FnOnce(&mut T) -> Result<R>) -> Result<R> {
        let mut guard = self.state.lock().await;
        let mut next = guard.clone();
        let out = f(&mut next)?;
        let bytes = serde_json::to_vec_pretty(&next)?;
        fs::write(&self.path, bytes)
            .await
            .map_err(|e| AppError::Storage(format!("failed to write {}: {}", self.path.display(), e)))?;
        *guard = next;
        Ok(out)
    }
}

type CatalogDoc = BTreeMap<String, Artifact>;

/// Document-store implementation of [`ArtifactStore`]: `models.json` and
/// `agents.json` under the data directory.
pub struct DocumentArtifactStore {
    models: JsonDocument<CatalogDoc>,
    agents: JsonDocument<CatalogDoc>,
}

impl DocumentArtifactStore {
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        Ok(Self {
            models: JsonDocument::open(data_dir.join("models.json")).await?,
            agents: JsonDocument::open(data_dir.join("agents.json")).await?,
        })
    }

    fn doc(&self, kind: ArtifactKind) -> &JsonDocument<CatalogDoc> {
        match kind {
            ArtifactKind::Model => &self.models,
            ArtifactKind::Agent => &self.agents,
        }
    }
}

fn missing(kind: ArtifactKind, id: &str) -> AppError {
    AppError::NotFound(format!("{} '{}' not found", kind, id))
}

/// Look up a record and enforce that `caller` created it.
fn owned_entry<'a>(
    doc: &'a mut CatalogDoc,
    kind: ArtifactKind,
    id: &str,
    caller: &str,
) -> Result<&'a mut Artifact> {
    let artifact = doc.get_mut(id).ok_or_else(|| missing(kind, id))?;
    if artifact.creator != caller {
        return Err(AppError::Authorization(format!(
            "only '{}' may modify {} '{}'",
            artifact.creator, kind, id
        )));
    }
    Ok(artifact)
}

#[async_trait]
impl ArtifactStore for DocumentArtifactStore {
    async fn insert(&self, artifact: Artifact) -> Result<Artifact> {
        let kind = artifact.kind;
        self.doc(kind)
            .mutate(move |doc| {
                if doc.contains_key(&artifact.id) {
                    return Err(AppError::Conflict(format!(
                        "{} id '{}' already exists",
                        kind, artifact.id
                    )));
                }
                doc.insert(artifact.id.clone(), artifact.clone());
                Ok(artifact)
            })
            .await
    }

    async fn get(&self, kind: ArtifactKind, id: &str) -> Result<Option<Artifact>> {
        Ok(self.doc(kind).read(|doc| doc.get(id).cloned()).await)
    }

    async fn list(&self, kind: ArtifactKind, filter: &ArtifactFilter) -> Result<Vec<Artifact>> {
        Ok(self
            .doc(kind)
            .read(|doc| {
                doc.values()
                    .filter(|a| filter.matches(a))
                    .cloned()
                    .collect()
            })
            .await)
    }

    async fn update(
        &self,
        kind: ArtifactKind,
        id: &str,
        caller: &str,
        changes: ArtifactUpdate,
    ) -> Result<Artifact> {
        self.doc(kind)
            .mutate(|doc| {
                let artifact = owned_entry(doc, kind, id, caller)?;
                artifact.name = changes.name;
                artifact.description = changes.description;
                artifact.artifact_type = changes.artifact_type;
                artifact.tags = changes.tags;
                artifact.price = changes.price;
                artifact.public = changes.public;
                artifact.integration = changes.integration;
                artifact.required_models = changes.required_models;
                Ok(artifact.clone())
            })
            .await
    }

    async fn publish(
        &self,
        kind: ArtifactKind,
        id: &str,
        caller: &str,
        publish: PublishUpdate,
    ) -> Result<Artifact> {
        self.doc(kind)
            .mutate(|doc| {
                let artifact = owned_entry(doc, kind, id, caller)?;
                artifact.public = publish.public;
                if let Some(url) = publish.apple_store_url {
                    artifact.apple_store_url = Some(url);
                }
                if let Some(url) = publish.google_play_url {
                    artifact.google_play_url = Some(url);
                }
                if let Some(url) = publish.custom_payment_url {
                    artifact.custom_payment_url = Some(url);
                }
                Ok(artifact.clone())
            })
            .await
    }

    async fn delete(&self, kind: ArtifactKind, id: &str, caller: &str) -> Result<()> {
        self.doc(kind)
            .mutate(|doc| {
                owned_entry(doc, kind, id, caller)?;
                doc.remove(id);
                Ok(())
            })
            .await
    }

    async fn record_download(&self, kind: ArtifactKind, id: &str) -> Result<i64> {
        self.doc(kind)
            .mutate(|doc| {
                let artifact = doc.get_mut(id).ok_or_else(|| missing(kind, id))?;
                artifact.downloads += 1;
                Ok(artifact.downloads)
            })
            .await
    }

    async fn add_review(
        &self,
        kind: ArtifactKind,
        id: &str,
        review: NewReview,
    ) -> Result<Artifact> {
        self.doc(kind)
            .mutate(|doc| {
                let artifact = doc.get_mut(id).ok_or_else(|| missing(kind, id))?;
                artifact.reviews.push(Review {
                    username: review.username,
                    rating: review.rating,
                    comment: review.comment,
                    created_at: review.created_at,
                });
                artifact.rating = mean_rating(&artifact.reviews);
                Ok(artifact.clone())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn document_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");

        let doc: JsonDocument<BTreeMap<String, i64>> =
            JsonDocument::open(&path).await.unwrap();
        doc.mutate(|m| {
            m.insert("k".into(), 7);
            Ok(())
        })
        .await
        .unwrap();
        drop(doc);

        let doc: JsonDocument<BTreeMap<String, i64>> =
            JsonDocument::open(&path).await.unwrap();
        assert_eq!(doc.read(|m| m.get("k").copied()).await, Some(7));
    }

    #[tokio::test]
    async fn failed_mutation_leaves_state_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let doc: JsonDocument<BTreeMap<String, i64>> =
            JsonDocument::open(dir.path().join("doc.json")).await.unwrap();

        doc.mutate(|m| {
            m.insert("k".into(), 1);
            Ok(())
        })
        .await
        .unwrap();

        // Mutation that writes and then fails must not commit.
        let err = doc
            .mutate(|m| -> Result<()> {
                m.insert("k".into(), 99);
                Err(AppError::Validation("boom".into()))
            })
            .await;
        assert!(err.is_err());
        assert_eq!(doc.read(|m| m.get("k").copied()).await, Some(1));
    }
}
