//! Authentication middleware.
//!
//! Extracts the `Authorization: Bearer <token>` header, verifies it against
//! the identity service, and injects the resolved username as an extension.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::AppState;
use crate::error::AppError;

/// Extension holding the authenticated caller
#[derive(Debug, Clone)]
pub struct AuthExtension {
    pub username: String,
}

/// Reject the request unless it carries a valid bearer token.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_owned);

    let Some(token) = token else {
        return AppError::Authentication("authentication required".into()).into_response();
    };

    match state.identity.verify(&token) {
        Ok(username) => {
            request.extensions_mut().insert(AuthExtension { username });
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}
