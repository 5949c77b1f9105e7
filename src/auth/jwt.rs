// src/auth/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuthError, IdentityProvider, ProviderIdentity, UserMetadata};

/// Claims carried by provider-issued access tokens.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderClaims {
    /// Subject - the provider's user id.
    pub sub: String,
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

/// Verifies HS256 tokens locally with the provider's shared secret.
pub struct JwtIdentityProvider {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityProvider {
    pub fn new(secret: &str, audience: Option<String>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        match audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and checks signature, expiry and audience.
    pub fn verify_claims(&self, token: &str) -> Result<ProviderClaims, AuthError> {
        decode::<ProviderClaims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn verify_token(&self, token: &str) -> Result<ProviderIdentity, AuthError> {
        let claims = self.verify_claims(token)?;

        let id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AuthError::InvalidToken("subject is not a user id".to_string()))?;
        let email = claims
            .email
            .ok_or_else(|| AuthError::InvalidToken("token carries no email".to_string()))?;

        Ok(ProviderIdentity {
            id,
            email,
            username: claims.user_metadata.username,
        })
    }
}

/// Signs a token shaped like the provider's access tokens.
///
/// Used by local tooling and tests; production tokens come from the provider.
pub fn sign_token(
    identity: &ProviderIdentity,
    secret: &str,
    audience: Option<&str>,
    expiration_seconds: u64,
) -> Result<String, AuthError> {
    // Calculate expiration: current time + expiration_seconds
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AuthError::Provider(e.to_string()))?
        .as_secs() as usize
        + expiration_seconds as usize;

    let claims = ProviderClaims {
        sub: identity.id.to_string(),
        email: Some(identity.email.clone()),
        user_metadata: UserMetadata {
            username: identity.username.clone(),
        },
        aud: audience.map(str::to_owned),
        exp: expiration,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Provider(e.to_string()))
}
