//! User model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User role. Advisory only: no catalog operation checks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Role {
    Admin,
    Developer,
    #[default]
    Viewer,
}

/// Informational workspace entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// User entity as persisted.
///
/// The full record (hash included) is what the identity store serializes;
/// it must never cross the API boundary — handlers return [`UserProfile`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub email: String,
    /// bcrypt hash; absent for OAuth-only accounts
    pub password_hash: Option<String>,
    #[serde(default)]
    pub role: Role,
    pub oauth_provider: Option<String>,
    pub oauth_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub workspaces: Vec<Workspace>,
}

/// Public profile shape returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub workspaces: Vec<Workspace>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at,
            workspaces: user.workspaces.clone(),
        }
    }
}
