//! Identity service.
//!
//! Owns user records, password hashing, and bearer-token issuance and
//! verification. Every catalog resolves its acting user through this
//! service.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::user::{User, UserProfile, Workspace};
use crate::store::document::JsonDocument;

/// Token lifetime. Fixed at 24 hours, not configurable per call.
const TOKEN_TTL_HOURS: i64 = 24;

/// Uniform failure message: must not distinguish an unknown username from a
/// wrong password, to avoid username enumeration.
const INVALID_CREDENTIALS: &str = "invalid username or password";

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Issued bearer token
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Lookup capability the artifact catalogs use to validate creators.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn exists(&self, username: &str) -> Result<bool>;
}

type UserDoc = BTreeMap<String, User>;

/// Identity service backed by a `users.json` document
pub struct IdentityService {
    users: JsonDocument<UserDoc>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl IdentityService {
    /// Open the user document under `data_dir` with the given signing secret.
    pub async fn open(data_dir: impl AsRef<Path>, jwt_secret: &str) -> Result<Self> {
        Ok(Self {
            users: JsonDocument::open(data_dir.as_ref().join("users.json")).await?,
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
        })
    }

    /// Register a new local user with a hashed password.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile> {
        let password_hash = hash(password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("password hashing failed: {}", e)))?;
        let user = User {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: Some(password_hash),
            role: Default::default(),
            oauth_provider: None,
            oauth_id: None,
            created_at: Utc::now(),
            workspaces: Vec::new(),
        };

        let profile = self
            .users
            .mutate(move |users| {
                if users.contains_key(&user.username) {
                    return Err(AppError::Conflict(format!(
                        "username '{}' already exists",
                        user.username
                    )));
                }
                require_unused_email(users, &user.email)?;
                let profile = UserProfile::from(&user);
                users.insert(user.username.clone(), user);
                Ok(profile)
            })
            .await?;

        tracing::info!(username, "registered user");
        Ok(profile)
    }

    /// Register or update a user via OAuth. Idempotent upsert: when the
    /// username exists, only the OAuth linkage changes.
    pub async fn register_oauth(
        &self,
        username: &str,
        email: &str,
        provider: &str,
        provider_id: &str,
    ) -> Result<UserProfile> {
        let username = username.to_string();
        let email = email.to_string();
        let provider = provider.to_string();
        let provider_id = provider_id.to_string();

        self.users
            .mutate(move |users| {
                if let Some(user) = users.get_mut(&username) {
                    user.oauth_provider = Some(provider);
                    user.oauth_id = Some(provider_id);
                    return Ok(UserProfile::from(&*user));
                }
                require_unused_email(users, &email)?;
                let user = User {
                    username: username.clone(),
                    email,
                    password_hash: None,
                    role: Default::default(),
                    oauth_provider: Some(provider),
                    oauth_id: Some(provider_id),
                    created_at: Utc::now(),
                    workspaces: Vec::new(),
                };
                let profile = UserProfile::from(&user);
                users.insert(username, user);
                Ok(profile)
            })
            .await
    }

    /// Authenticate with username and password, returning a bearer token.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<TokenResponse> {
        let password_hash = self
            .users
            .read(|users| users.get(username).and_then(|u| u.password_hash.clone()))
            .await
            .ok_or_else(|| AppError::Authentication(INVALID_CREDENTIALS.into()))?;

        if !verify(password, &password_hash)
            .map_err(|e| AppError::Internal(format!("password verification failed: {}", e)))?
        {
            return Err(AppError::Authentication(INVALID_CREDENTIALS.into()));
        }

        self.issue_token(username)
    }

    /// Issue a token for an OAuth identity already verified upstream.
    pub async fn authenticate_oauth(&self, username: &str) -> Result<TokenResponse> {
        let known = self.exists(username).await?;
        if !known {
            return Err(AppError::Authentication(INVALID_CREDENTIALS.into()));
        }
        self.issue_token(username)
    }

    /// Verify a bearer token and return the embedded username.
    pub fn verify(&self, token: &str) -> Result<String> {
        let data = decode::<Claims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|_| AppError::Authentication("invalid or expired token".into()))?;
        Ok(data.claims.sub)
    }

    /// Append an informational workspace record.
    pub async fn create_workspace(&self, username: &str, name: &str) -> Result<Workspace> {
        let username = username.to_string();
        let workspace = Workspace {
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.users
            .mutate(move |users| {
                let user = users
                    .get_mut(&username)
                    .ok_or_else(|| AppError::NotFound(format!("user '{}' not found", username)))?;
                user.workspaces.push(workspace.clone());
                Ok(workspace)
            })
            .await
    }

    /// Fetch a user's public profile.
    pub async fn get_user(&self, username: &str) -> Result<UserProfile> {
        self.users
            .read(|users| users.get(username).map(UserProfile::from))
            .await
            .ok_or_else(|| AppError::NotFound(format!("user '{}' not found", username)))
    }

    fn issue_token(&self, username: &str) -> Result<TokenResponse> {
        let now = Utc::now();
        let exp = now + Duration::hours(TOKEN_TTL_HOURS);
        let claims = Claims {
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };
        let access_token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("token encoding failed: {}", e)))?;
        Ok(TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: (TOKEN_TTL_HOURS * 3600) as u64,
        })
    }
}

/// Emails are unique across all accounts, matching the relational contract.
fn require_unused_email(users: &UserDoc, email: &str) -> Result<()> {
    if users.values().any(|u| u.email == email) {
        return Err(AppError::Conflict(format!(
            "email '{}' is already registered",
            email
        )));
    }
    Ok(())
}

#[async_trait]
impl UserDirectory for IdentityService {
    async fn exists(&self, username: &str) -> Result<bool> {
        Ok(self.users.read(|users| users.contains_key(username)).await)
    }
}
