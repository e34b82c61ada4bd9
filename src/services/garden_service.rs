//! Garden service: curated collections and time-boxed exhibits.
//!
//! Collections and exhibits live in one document so exhibit creation can
//! validate its parent collection and attach itself atomically.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::collection::{Collection, CollectionEntry, Exhibit, ExhibitComment};
use crate::store::document::JsonDocument;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GardenState {
    collections: BTreeMap<String, Collection>,
    exhibits: BTreeMap<String, Exhibit>,
}

/// Request to create a collection
#[derive(Debug, Clone)]
pub struct NewCollection {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub public: bool,
}

/// Request to create an exhibit
#[derive(Debug, Clone)]
pub struct NewExhibit {
    pub id: String,
    pub name: String,
    pub description: String,
    pub collection_id: String,
    pub start_date: String,
    pub end_date: String,
}

/// Listing filter for collections
#[derive(Debug, Clone, Default)]
pub struct CollectionFilter {
    pub curator: Option<String>,
    /// Subset test, like the artifact tag filter
    pub tags: Option<Vec<String>>,
}

/// Listing filter for exhibits
#[derive(Debug, Clone, Default)]
pub struct ExhibitFilter {
    pub collection_id: Option<String>,
    pub curator: Option<String>,
}

/// Garden service backed by a `garden.json` document
pub struct GardenService {
    doc: JsonDocument<GardenState>,
}

impl GardenService {
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            doc: JsonDocument::open(data_dir.as_ref().join("garden.json")).await?,
        })
    }

    /// Create a collection curated by `curator`.
    pub async fn create_collection(&self, curator: &str, req: NewCollection) -> Result<Collection> {
        let collection = Collection {
            id: req.id,
            name: req.name,
            description: req.description,
            curator: curator.to_string(),
            tags: req.tags,
            created_at: Utc::now(),
            artifacts: Vec::new(),
            exhibits: Vec::new(),
            public: req.public,
        };

        let collection = self
            .doc
            .mutate(move |garden| {
                if garden.collections.contains_key(&collection.id) {
                    return Err(AppError::Conflict(format!(
                        "collection id '{}' already exists",
                        collection.id
                    )));
                }
                garden
                    .collections
                    .insert(collection.id.clone(), collection.clone());
                Ok(collection)
            })
            .await?;

        tracing::info!(id = %collection.id, curator, "created collection");
        Ok(collection)
    }

    /// Append an artifact membership entry to a collection. Only the
    /// curator may do this.
    pub async fn add_artifact_to_collection(
        &self,
        collection_id: &str,
        caller: &str,
        artifact_id: &str,
        description: &str,
    ) -> Result<Collection> {
        let entry = CollectionEntry {
            artifact_id: artifact_id.to_string(),
            description: description.to_string(),
            added_at: Utc::now(),
        };
        self.doc
            .mutate(|garden| {
                let collection = curated_collection(garden, collection_id, caller)?;
                collection.artifacts.push(entry);
                Ok(collection.clone())
            })
            .await
    }

    /// Create an exhibit inside an existing collection. The exhibit record
    /// and the parent collection's exhibit list commit together or not at
    /// all.
    pub async fn create_exhibit(&self, curator: &str, req: NewExhibit) -> Result<Exhibit> {
        let exhibit = Exhibit {
            id: req.id,
            name: req.name,
            description: req.description,
            curator: curator.to_string(),
            collection_id: req.collection_id,
            start_date: req.start_date,
            end_date: req.end_date,
            created_at: Utc::now(),
            visitors: 0,
            comments: Vec::new(),
        };

        let exhibit = self
            .doc
            .mutate(move |garden| {
                if garden.exhibits.contains_key(&exhibit.id) {
                    return Err(AppError::Conflict(format!(
                        "exhibit id '{}' already exists",
                        exhibit.id
                    )));
                }
                let collection = curated_collection(garden, &exhibit.collection_id, &exhibit.curator)?;
                collection.exhibits.push(exhibit.id.clone());
                garden.exhibits.insert(exhibit.id.clone(), exhibit.clone());
                Ok(exhibit)
            })
            .await?;

        tracing::info!(id = %exhibit.id, collection = %exhibit.collection_id, "created exhibit");
        Ok(exhibit)
    }

    pub async fn get_collection(&self, id: &str) -> Result<Collection> {
        self.doc
            .read(|garden| garden.collections.get(id).cloned())
            .await
            .ok_or_else(|| AppError::NotFound(format!("collection '{}' not found", id)))
    }

    pub async fn get_exhibit(&self, id: &str) -> Result<Exhibit> {
        self.doc
            .read(|garden| garden.exhibits.get(id).cloned())
            .await
            .ok_or_else(|| AppError::NotFound(format!("exhibit '{}' not found", id)))
    }

    pub async fn list_collections(&self, filter: CollectionFilter) -> Result<Vec<Collection>> {
        Ok(self
            .doc
            .read(|garden| {
                garden
                    .collections
                    .values()
                    .filter(|c| {
                        if let Some(curator) = &filter.curator {
                            if c.curator != *curator {
                                return false;
                            }
                        }
                        if let Some(tags) = &filter.tags {
                            if !tags.iter().all(|t| c.tags.contains(t)) {
                                return false;
                            }
                        }
                        true
                    })
                    .cloned()
                    .collect()
            })
            .await)
    }

    pub async fn list_exhibits(&self, filter: ExhibitFilter) -> Result<Vec<Exhibit>> {
        Ok(self
            .doc
            .read(|garden| {
                garden
                    .exhibits
                    .values()
                    .filter(|e| {
                        if let Some(collection_id) = &filter.collection_id {
                            if e.collection_id != *collection_id {
                                return false;
                            }
                        }
                        if let Some(curator) = &filter.curator {
                            if e.curator != *curator {
                                return false;
                            }
                        }
                        true
                    })
                    .cloned()
                    .collect()
            })
            .await)
    }

    /// Append a visitor comment. Open to any authenticated user.
    pub async fn add_comment(
        &self,
        exhibit_id: &str,
        username: &str,
        comment: &str,
    ) -> Result<Exhibit> {
        let entry = ExhibitComment {
            username: username.to_string(),
            comment: comment.to_string(),
            created_at: Utc::now(),
        };
        self.doc
            .mutate(|garden| {
                let exhibit = garden.exhibits.get_mut(exhibit_id).ok_or_else(|| {
                    AppError::NotFound(format!("exhibit '{}' not found", exhibit_id))
                })?;
                exhibit.comments.push(entry);
                Ok(exhibit.clone())
            })
            .await
    }

    /// Count a visit. Open to any authenticated user. Returns the new count.
    pub async fn record_visit(&self, exhibit_id: &str) -> Result<i64> {
        self.doc
            .mutate(|garden| {
                let exhibit = garden.exhibits.get_mut(exhibit_id).ok_or_else(|| {
                    AppError::NotFound(format!("exhibit '{}' not found", exhibit_id))
                })?;
                exhibit.visitors += 1;
                Ok(exhibit.visitors)
            })
            .await
    }
}

/// Look up a collection and enforce that `caller` curates it.
fn curated_collection<'a>(
    garden: &'a mut GardenState,
    collection_id: &str,
    caller: &str,
) -> Result<&'a mut Collection> {
    let collection = garden
        .collections
        .get_mut(collection_id)
        .ok_or_else(|| AppError::NotFound(format!("collection '{}' not found", collection_id)))?;
    if collection.curator != caller {
        return Err(AppError::Authorization(format!(
            "only '{}' may modify collection '{}'",
            collection.curator, collection_id
        )));
    }
    Ok(collection)
}
