//! Artifact model: a published Model or Agent record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two artifact kinds the marketplace publishes. Each kind has its own
/// catalog; ids are unique within a kind, not across kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Model,
    Agent,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Model => "model",
            ArtifactKind::Agent => "agent",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "model" => Ok(ArtifactKind::Model),
            "agent" => Ok(ArtifactKind::Agent),
            other => Err(format!("unknown artifact kind '{}'", other)),
        }
    }
}

/// A user review. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub username: String,
    pub rating: f64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Published artifact entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub id: String,
    pub kind: ArtifactKind,
    pub name: String,
    pub description: String,
    /// Username of the publisher. Set once at creation; the only actor
    /// allowed to mutate, delete, publish, or delist the record.
    pub creator: String,
    /// Kind-specific type tag (model_type / agent_type in the wire shapes)
    pub artifact_type: String,
    pub version: String,
    pub tags: Vec<String>,
    /// Model ids this agent depends on. The catalog clears this for models,
    /// so it is always empty there. The references are not validated against
    /// the model catalog.
    #[serde(default)]
    pub required_models: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub downloads: i64,
    /// Arithmetic mean of all review ratings (IEEE-754 double, no rounding).
    pub rating: f64,
    pub reviews: Vec<Review>,
    pub public: bool,
    pub price: String,
    pub apple_store_url: Option<String>,
    pub google_play_url: Option<String>,
    pub custom_payment_url: Option<String>,
    /// Third-party provider tag, e.g. "openai" or "vertexai"
    pub integration: Option<String>,
}

/// Mean of all review ratings, 0.0 when there are none.
pub fn mean_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    reviews.iter().map(|r| r.rating).sum::<f64>() / reviews.len() as f64
}
