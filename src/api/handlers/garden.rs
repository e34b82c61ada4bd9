//! Garden handlers: collections and exhibits.

use axum::{
    extract::{Extension, Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::parse_tags;
use crate::api::middleware::auth::AuthExtension;
use crate::api::AppState;
use crate::error::Result;
use crate::models::collection::{Collection, Exhibit};
use crate::services::garden_service::{CollectionFilter, ExhibitFilter, NewCollection, NewExhibit};

/// Create garden routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/collections", post(create_collection).get(list_collections))
        .route("/collections/:id", get(get_collection))
        .route("/collections/:id/artifacts", post(add_artifact))
        .route("/exhibits", post(create_exhibit).get(list_exhibits))
        .route("/exhibits/:id", get(get_exhibit))
        .route("/exhibits/:id/comments", post(add_comment))
        .route("/exhibits/:id/visit", post(record_visit))
}

#[derive(Debug, Deserialize)]
pub struct CreateCollectionRequest {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub public: bool,
}

#[derive(Debug, Deserialize)]
pub struct AddArtifactRequest {
    pub artifact_id: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateExhibitRequest {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub collection_id: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub comment: String,
}

#[derive(Debug, Deserialize)]
pub struct ListCollectionsQuery {
    pub curator: Option<String>,
    /// Comma-separated tag list; all must be present
    pub tags: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListExhibitsQuery {
    pub collection_id: Option<String>,
    pub curator: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VisitResponse {
    pub id: String,
    pub visitors: i64,
}

/// Create a collection curated by the caller
pub async fn create_collection(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthExtension>,
    Json(payload): Json<CreateCollectionRequest>,
) -> Result<Json<Collection>> {
    let collection = state
        .garden
        .create_collection(
            &auth.username,
            NewCollection {
                id: payload.id,
                name: payload.name,
                description: payload.description,
                tags: payload.tags,
                public: payload.public,
            },
        )
        .await?;
    Ok(Json(collection))
}

/// List collections with optional filtering
pub async fn list_collections(
    State(state): State<AppState>,
    Query(query): Query<ListCollectionsQuery>,
) -> Result<Json<Vec<Collection>>> {
    let collections = state
        .garden
        .list_collections(CollectionFilter {
            curator: query.curator,
            tags: parse_tags(&query.tags),
        })
        .await?;
    Ok(Json(collections))
}

/// Fetch one collection
pub async fn get_collection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Collection>> {
    let collection = state.garden.get_collection(&id).await?;
    Ok(Json(collection))
}

/// Add an artifact entry to a collection (curator only)
pub async fn add_artifact(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<String>,
    Json(payload): Json<AddArtifactRequest>,
) -> Result<Json<Collection>> {
    let collection = state
        .garden
        .add_artifact_to_collection(&id, &auth.username, &payload.artifact_id, &payload.description)
        .await?;
    Ok(Json(collection))
}

/// Create an exhibit inside an existing collection (curator only)
pub async fn create_exhibit(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthExtension>,
    Json(payload): Json<CreateExhibitRequest>,
) -> Result<Json<Exhibit>> {
    let exhibit = state
        .garden
        .create_exhibit(
            &auth.username,
            NewExhibit {
                id: payload.id,
                name: payload.name,
                description: payload.description,
                collection_id: payload.collection_id,
                start_date: payload.start_date,
                end_date: payload.end_date,
            },
        )
        .await?;
    Ok(Json(exhibit))
}

/// List exhibits with optional filtering
pub async fn list_exhibits(
    State(state): State<AppState>,
    Query(query): Query<ListExhibitsQuery>,
) -> Result<Json<Vec<Exhibit>>> {
    let exhibits = state
        .garden
        .list_exhibits(ExhibitFilter {
            collection_id: query.collection_id,
            curator: query.curator,
        })
        .await?;
    Ok(Json(exhibits))
}

/// Fetch one exhibit
pub async fn get_exhibit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Exhibit>> {
    let exhibit = state.garden.get_exhibit(&id).await?;
    Ok(Json(exhibit))
}

/// Append a visitor comment
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<String>,
    Json(payload): Json<CommentRequest>,
) -> Result<Json<Exhibit>> {
    let exhibit = state
        .garden
        .add_comment(&id, &auth.username, &payload.comment)
        .await?;
    Ok(Json(exhibit))
}

/// Count a visit
pub async fn record_visit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<VisitResponse>> {
    let visitors = state.garden.record_visit(&id).await?;
    Ok(Json(VisitResponse { id, visitors }))
}
