//! Authenticated-caller extractor.
//!
//! Resolves `Authorization: Bearer <token>` to an active user through the
//! storage backend.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use feedkeeper_persistence::core::FeedStorage;
use feedkeeper_persistence::types::User;
use tracing::debug;

use crate::error::RestError;
use crate::state::AppState;

/// The caller of an authenticated route.
///
/// # Example
///
/// ```rust,ignore
/// use feedkeeper_rest::extractors::AuthenticatedUser;
///
/// async fn handler(AuthenticatedUser(user): AuthenticatedUser) {
///     println!("caller: {}", user.id);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl AuthenticatedUser {
    /// Returns the caller.
    pub fn user(&self) -> &User {
        &self.0
    }
}

/// Extracts the token from a `Bearer` authorization header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl<S> FromRequestParts<AppState<S>> for AuthenticatedUser
where
    S: FeedStorage,
{
    type Rejection = RestError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(|| RestError::Unauthorized {
            message: "Authentication credentials were not provided".to_string(),
        })?;

        match state.storage().user_for_token(token).await? {
            Some(user) => {
                debug!(user_id = user.id, "Authenticated request");
                Ok(AuthenticatedUser(user))
            }
            None => Err(RestError::Unauthorized {
                message: "Invalid token".to_string(),
            }),
        }
    }
}
