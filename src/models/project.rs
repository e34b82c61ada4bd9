//! Project model: a user's named grouping of models and agents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Project entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Server-generated UUIDv4, never caller-supplied
    pub id: String,
    pub name: String,
    pub description: String,
    /// Owning username; projects are invisible to everyone else
    pub owner: String,
    /// Opaque storage-budget label, e.g. "1GB"
    pub storage_space_required: String,
    pub created_at: DateTime<Utc>,
    /// Bumped on every mutating operation
    pub updated_at: DateTime<Utc>,
    /// Member model ids (set semantics, non-owning references)
    pub models: Vec<String>,
    /// Member agent ids (set semantics, non-owning references)
    pub agents: Vec<String>,
}
