//! Garden models: curated collections and time-boxed exhibits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Membership entry tying an artifact into a collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionEntry {
    pub artifact_id: String,
    pub description: String,
    pub added_at: DateTime<Utc>,
}

/// Curated collection of artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Username of the creating user; the only actor allowed to mutate
    /// the collection.
    pub curator: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub artifacts: Vec<CollectionEntry>,
    /// Ids of exhibits owned by this collection
    pub exhibits: Vec<String>,
    #[serde(default)]
    pub public: bool,
}

/// Visitor comment on an exhibit. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExhibitComment {
    pub username: String,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Time-boxed showcase of one collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exhibit {
    pub id: String,
    pub name: String,
    pub description: String,
    pub curator: String,
    /// Must reference an existing collection at creation time
    pub collection_id: String,
    /// Opaque date strings; never parsed or compared
    pub start_date: String,
    pub end_date: String,
    pub created_at: DateTime<Utc>,
    pub visitors: i64,
    pub comments: Vec<ExhibitComment>,
}
