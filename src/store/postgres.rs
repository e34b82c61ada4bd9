//! Relational storage backend (Postgres via sqlx).
//!
//! Schema lives under `migrations/`. Queries use the runtime API so the
//! crate builds without a live database. Every mutation runs inside a
//! transaction with the target row locked, which serializes concurrent
//! mutations per artifact id.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use super::{ArtifactFilter, ArtifactStore, ArtifactUpdate, NewReview, PublishUpdate};
use crate::error::{AppError, Result};
use crate::models::artifact::{Artifact, ArtifactKind, Review};

const ARTIFACT_COLUMNS: &str = "id, kind, name, description, creator, artifact_type, version, \
     tags, required_models, created_at, downloads, rating, is_public, price, \
     apple_store_url, google_play_url, custom_payment_url, integration";

#[derive(Debug, FromRow)]
struct ArtifactRow {
    id: String,
    kind: String,
    name: String,
    description: String,
    creator: String,
    artifact_type: String,
    version: String,
    tags: Vec<String>,
    required_models: Vec<String>,
    created_at: DateTime<Utc>,
    downloads: i64,
    rating: f64,
    is_public: bool,
    price: String,
    apple_store_url: Option<String>,
    google_play_url: Option<String>,
    custom_payment_url: Option<String>,
    integration: Option<String>,
}

#[derive(Debug, FromRow)]
struct ReviewRow {
    artifact_id: String,
    username: String,
    rating: f64,
    comment: String,
    created_at: DateTime<Utc>,
}

impl ReviewRow {
    fn into_review(self) -> Review {
        Review {
            username: self.username,
            rating: self.rating,
            comment: self.comment,
            created_at: self.created_at,
        }
    }
}

impl ArtifactRow {
    fn into_artifact(self, reviews: Vec<Review>) -> Result<Artifact> {
        let kind = self
            .kind
            .parse::<ArtifactKind>()
            .map_err(AppError::Internal)?;
        Ok(Artifact {
            id: self.id,
            kind,
            name: self.name,
            description: self.description,
            creator: self.creator,
            artifact_type: self.artifact_type,
            version: self.version,
            tags: self.tags,
            required_models: self.required_models,
            created_at: self.created_at,
            downloads: self.downloads,
            rating: self.rating,
            reviews,
            public: self.is_public,
            price: self.price,
            apple_store_url: self.apple_store_url,
            google_play_url: self.google_play_url,
            custom_payment_url: self.custom_payment_url,
            integration: self.integration,
        })
    }
}

/// Postgres implementation of [`ArtifactStore`]
pub struct PgArtifactStore {
    db: PgPool,
}

impl PgArtifactStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Lock the target row and verify the caller owns it.
    async fn lock_owned(
        tx: &mut Transaction<'_, Postgres>,
        kind: ArtifactKind,
        id: &str,
        caller: &str,
    ) -> Result<()> {
        let creator: Option<String> = sqlx::query_scalar(
            "SELECT creator FROM artifacts WHERE kind = $1 AND id = $2 FOR UPDATE",
        )
        .bind(kind.as_str())
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        match creator {
            None => Err(AppError::NotFound(format!("{} '{}' not found", kind, id))),
            Some(creator) if creator != caller => Err(AppError::Authorization(format!(
                "only '{}' may modify {} '{}'",
                creator, kind, id
            ))),
            Some(_) => Ok(()),
        }
    }

    async fn fetch_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        kind: ArtifactKind,
        id: &str,
    ) -> Result<Artifact> {
        let row = sqlx::query_as::<_, ArtifactRow>(&format!(
            "SELECT {ARTIFACT_COLUMNS} FROM artifacts WHERE kind = $1 AND id = $2"
        ))
        .bind(kind.as_str())
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} '{}' not found", kind, id)))?;

        let reviews = sqlx::query_as::<_, ReviewRow>(
            "SELECT artifact_id, username, rating, comment, created_at \
             FROM artifact_reviews \
             WHERE artifact_kind = $1 AND artifact_id = $2 \
             ORDER BY id",
        )
        .bind(kind.as_str())
        .bind(id)
        .fetch_all(&mut **tx)
        .await?
        .into_iter()
        .map(ReviewRow::into_review)
        .collect();

        row.into_artifact(reviews)
    }
}

#[async_trait]
impl ArtifactStore for PgArtifactStore {
    async fn insert(&self, artifact: Artifact) -> Result<Artifact> {
        let result = sqlx::query(
            "INSERT INTO artifacts \
             (id, kind, name, description, creator, artifact_type, version, tags, \
              required_models, created_at, downloads, rating, is_public, price, \
              apple_store_url, google_play_url, custom_payment_url, integration) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18) \
             ON CONFLICT (kind, id) DO NOTHING",
        )
        .bind(&artifact.id)
        .bind(artifact.kind.as_str())
        .bind(&artifact.name)
        .bind(&artifact.description)
        .bind(&artifact.creator)
        .bind(&artifact.artifact_type)
        .bind(&artifact.version)
        .bind(&artifact.tags)
        .bind(&artifact.required_models)
        .bind(artifact.created_at)
        .bind(artifact.downloads)
        .bind(artifact.rating)
        .bind(artifact.public)
        .bind(&artifact.price)
        .bind(&artifact.apple_store_url)
        .bind(&artifact.google_play_url)
        .bind(&artifact.custom_payment_url)
        .bind(&artifact.integration)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "{} id '{}' already exists",
                artifact.kind, artifact.id
            )));
        }
        Ok(artifact)
    }

    async fn get(&self, kind: ArtifactKind, id: &str) -> Result<Option<Artifact>> {
        let mut tx = self.db.begin().await?;
        let artifact = match Self::fetch_in_tx(&mut tx, kind, id).await {
            Ok(artifact) => Some(artifact),
            Err(AppError::NotFound(_)) => None,
            Err(e) => return Err(e),
        };
        tx.commit().await?;
        Ok(artifact)
    }

    async fn list(&self, kind: ArtifactKind, filter: &ArtifactFilter) -> Result<Vec<Artifact>> {
        let rows = sqlx::query_as::<_, ArtifactRow>(&format!(
            "SELECT {ARTIFACT_COLUMNS} FROM artifacts \
             WHERE kind = $1 \
               AND ($2::text IS NULL OR artifact_type = $2) \
               AND ($3::text[] IS NULL OR tags @> $3) \
               AND ($4::text IS NULL OR creator = $4) \
               AND ($5 = false OR is_public) \
             ORDER BY created_at, id"
        ))
        .bind(kind.as_str())
        .bind(&filter.artifact_type)
        .bind(&filter.tags)
        .bind(&filter.creator)
        .bind(filter.public_only)
        .fetch_all(&self.db)
        .await?;

        let mut reviews_by_id: HashMap<String, Vec<Review>> = HashMap::new();
        let review_rows = sqlx::query_as::<_, ReviewRow>(
            "SELECT artifact_id, username, rating, comment, created_at \
             FROM artifact_reviews WHERE artifact_kind = $1 ORDER BY id",
        )
        .bind(kind.as_str())
        .fetch_all(&self.db)
        .await?;
        for row in review_rows {
            reviews_by_id
                .entry(row.artifact_id.clone())
                .or_default()
                .push(row.into_review());
        }

        rows.into_iter()
            .map(|row| {
                let reviews = reviews_by_id.remove(&row.id).unwrap_or_default();
                row.into_artifact(reviews)
            })
            .collect()
    }

    async fn update(
        &self,
        kind: ArtifactKind,
        id: &str,
        caller: &str,
        changes: ArtifactUpdate,
    ) -> Result<Artifact> {
        let mut tx = self.db.begin().await?;
        Self::lock_owned(&mut tx, kind, id, caller).await?;

        sqlx::query(
            "UPDATE artifacts SET name = $3, description = $4, artifact_type = $5, \
             tags = $6, price = $7, is_public = $8, integration = $9, required_models = $10 \
             WHERE kind = $1 AND id = $2",
        )
        .bind(kind.as_str())
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(&changes.artifact_type)
        .bind(&changes.tags)
        .bind(&changes.price)
        .bind(changes.public)
        .bind(&changes.integration)
        .bind(&changes.required_models)
        .execute(&mut *tx)
        .await?;

        let artifact = Self::fetch_in_tx(&mut tx, kind, id).await?;
        tx.commit().await?;
        Ok(artifact)
    }

    async fn publish(
        &self,
        kind: ArtifactKind,
        id: &str,
        caller: &str,
        publish: PublishUpdate,
    ) -> Result<Artifact> {
        let mut tx = self.db.begin().await?;
        Self::lock_owned(&mut tx, kind, id, caller).await?;

        sqlx::query(
            "UPDATE artifacts SET is_public = $3, \
             apple_store_url = COALESCE($4, apple_store_url), \
             google_play_url = COALESCE($5, google_play_url), \
             custom_payment_url = COALESCE($6, custom_payment_url) \
             WHERE kind = $1 AND id = $2",
        )
        .bind(kind.as_str())
        .bind(id)
        .bind(publish.public)
        .bind(&publish.apple_store_url)
        .bind(&publish.google_play_url)
        .bind(&publish.custom_payment_url)
        .execute(&mut *tx)
        .await?;

        let artifact = Self::fetch_in_tx(&mut tx, kind, id).await?;
        tx.commit().await?;
        Ok(artifact)
    }

    async fn delete(&self, kind: ArtifactKind, id: &str, caller: &str) -> Result<()> {
        let mut tx = self.db.begin().await?;
        Self::lock_owned(&mut tx, kind, id, caller).await?;

        sqlx::query("DELETE FROM artifacts WHERE kind = $1 AND id = $2")
            .bind(kind.as_str())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn record_download(&self, kind: ArtifactKind, id: &str) -> Result<i64> {
        let downloads: Option<i64> = sqlx::query_scalar(
            "UPDATE artifacts SET downloads = downloads + 1 \
             WHERE kind = $1 AND id = $2 RETURNING downloads",
        )
        .bind(kind.as_str())
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        downloads.ok_or_else(|| AppError::NotFound(format!("{} '{}' not found", kind, id)))
    }

    async fn add_review(
        &self,
        kind: ArtifactKind,
        id: &str,
        review: NewReview,
    ) -> Result<Artifact> {
        let mut tx = self.db.begin().await?;

        // Lock the artifact row (existence check, no ownership requirement)
        let exists: Option<String> =
            sqlx::query_scalar("SELECT id FROM artifacts WHERE kind = $1 AND id = $2 FOR UPDATE")
                .bind(kind.as_str())
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Err(AppError::NotFound(format!("{} '{}' not found", kind, id)));
        }

        sqlx::query(
            "INSERT INTO artifact_reviews (artifact_kind, artifact_id, username, rating, comment, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(kind.as_str())
        .bind(id)
        .bind(&review.username)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE artifacts SET rating = \
             (SELECT AVG(rating) FROM artifact_reviews WHERE artifact_kind = $1 AND artifact_id = $2) \
             WHERE kind = $1 AND id = $2",
        )
        .bind(kind.as_str())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let artifact = Self::fetch_in_tx(&mut tx, kind, id).await?;
        tx.commit().await?;
        Ok(artifact)
    }
}
