// src/auth/remote.rs

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;
use uuid::Uuid;

use super::{AuthError, IdentityProvider, ProviderIdentity, UserMetadata};
use crate::utils::endpoint;

/// Asks the identity provider who owns a token: `GET {base}/auth/v1/user`.
pub struct RemoteIdentityProvider {
    client: reqwest::Client,
    user_endpoint: Url,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct RemoteUser {
    id: Uuid,
    email: Option<String>,
    #[serde(default)]
    user_metadata: UserMetadata,
}

impl RemoteIdentityProvider {
    pub fn new(base_url: &Url, api_key: String) -> Result<Self, AuthError> {
        let user_endpoint = endpoint::as_base(base_url.clone())
            .join("auth/v1/user")
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        Ok(Self {
            client: reqwest::Client::new(),
            user_endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl IdentityProvider for RemoteIdentityProvider {
    async fn verify_token(&self, token: &str) -> Result<ProviderIdentity, AuthError> {
        let response = self
            .client
            .get(self.user_endpoint.clone())
            .bearer_auth(token)
            .header("apikey", &self.api_key)
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(AuthError::InvalidToken("rejected by provider".to_string()));
            }
            status => {
                tracing::warn!("Identity provider answered {}", status);
                return Err(AuthError::Provider(format!("unexpected status {}", status)));
            }
        }

        let user: RemoteUser = response
            .json()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        let email = user
            .email
            .ok_or_else(|| AuthError::InvalidToken("provider user has no email".to_string()))?;

        Ok(ProviderIdentity {
            id: user.id,
            email,
            username: user.user_metadata.username,
        })
    }
}
