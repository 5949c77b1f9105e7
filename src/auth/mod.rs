// src/auth/mod.rs

//! Authentication gateway.
//!
//! Tokens are issued by an external identity provider. An [`IdentityProvider`]
//! turns a bearer token into a [`ProviderIdentity`]; the middleware then mirrors
//! that identity into the local `users` table and hands the stored [`User`] to
//! handlers through request extensions.

pub mod jwt;
pub mod remote;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    config::AuthConfig,
    error::AppError,
    models::user::{NewUser, User},
    storage::{Storage, StorageError},
};

pub use jwt::JwtIdentityProvider;
pub use remote::RemoteIdentityProvider;

/// Who the provider says the caller is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderIdentity {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
}

impl From<ProviderIdentity> for NewUser {
    fn from(identity: ProviderIdentity) -> Self {
        NewUser {
            id: identity.id,
            email: identity.email,
            username: identity.username,
        }
    }
}

/// Free-form profile data the provider attaches to a user.
#[derive(Debug, Default, Clone, Deserialize, serde::Serialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing or malformed authorization header")]
    MissingToken,

    #[error("token rejected: {0}")]
    InvalidToken(String),

    #[error("identity provider unavailable: {0}")]
    Provider(String),

    #[error("failed to sync user: {0}")]
    Storage(#[from] StorageError),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify_token(&self, token: &str) -> Result<ProviderIdentity, AuthError>;
}

/// Builds the provider selected by configuration.
pub fn identity_provider(config: &AuthConfig) -> Result<Arc<dyn IdentityProvider>, AuthError> {
    let provider: Arc<dyn IdentityProvider> = match config {
        AuthConfig::Jwt { secret, audience } => {
            Arc::new(JwtIdentityProvider::new(secret, audience.clone()))
        }
        AuthConfig::Remote { base_url, api_key } => {
            Arc::new(RemoteIdentityProvider::new(base_url, api_key.clone())?)
        }
    };
    Ok(provider)
}

/// Extracts the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Verifies the request's bearer token and returns the synced local user.
pub async fn authenticate(
    identity: &dyn IdentityProvider,
    storage: &dyn Storage,
    headers: &HeaderMap,
) -> Result<User, AuthError> {
    let token = bearer_token(headers).ok_or(AuthError::MissingToken)?;
    let provider_identity = identity.verify_token(token).await?;
    let user = storage.sync_user(provider_identity.into()).await?;
    Ok(user)
}

/// Axum Middleware: Authentication.
///
/// Every token failure produces the same 401 body so callers cannot tell a
/// missing header from an expired or forged token. On success the stored
/// `User` is injected into the request extensions.
pub async fn auth_middleware(
    State(identity): State<Arc<dyn IdentityProvider>>,
    State(storage): State<Arc<dyn Storage>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let result = authenticate(identity.as_ref(), storage.as_ref(), req.headers()).await;

    match result {
        Ok(user) => {
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e @ AuthError::Storage(_)) => {
            tracing::error!("Failed to sync authenticated user: {:?}", e);
            Err(AppError::from(e))
        }
        Err(e) => {
            tracing::debug!("Authentication failed: {}", e);
            Err(AppError::from(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_requires_scheme() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(&headers("Token abc.def")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn identity_becomes_new_user() {
        let id = Uuid::new_v4();
        let user: NewUser = ProviderIdentity {
            id,
            email: "ada@example.com".to_string(),
            username: Some("ada".to_string()),
        }
        .into();

        assert_eq!(user.id, id);
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.username.as_deref(), Some("ada"));
    }
}
