//! Identity provider seam.
//!
//! The portal never owns identities: it asks a provider who is calling, reads
//! the session, and forwards profile-metadata patches.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;

use crate::jwt::JwtValidator;
use crate::{MetadataPatch, Principal, PrincipalId, Session, UserMetadata};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Identity provider contract.
///
/// `token` is the raw bearer credential, if the caller presented one.
/// A missing credential is `Ok(None)`, never an error.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_user(&self, token: Option<&str>) -> Result<Option<Principal>, IdentityError>;

    async fn session(&self, token: Option<&str>) -> Result<Option<Session>, IdentityError>;

    async fn update_user(
        &self,
        principal: &Principal,
        patch: MetadataPatch,
    ) -> Result<Principal, IdentityError>;
}

#[async_trait]
impl<P> IdentityProvider for Arc<P>
where
    P: IdentityProvider + ?Sized,
{
    async fn current_user(&self, token: Option<&str>) -> Result<Option<Principal>, IdentityError> {
        (**self).current_user(token).await
    }

    async fn session(&self, token: Option<&str>) -> Result<Option<Session>, IdentityError> {
        (**self).session(token).await
    }

    async fn update_user(
        &self,
        principal: &Principal,
        patch: MetadataPatch,
    ) -> Result<Principal, IdentityError> {
        (**self).update_user(principal, patch).await
    }
}

/// Bearer-token identity provider.
///
/// Identities come from verified JWT claims. Metadata updates are kept in an
/// in-process overlay that takes precedence over the metadata baked into
/// tokens issued before the update.
pub struct TokenIdentityProvider<V> {
    validator: V,
    overlay: RwLock<HashMap<PrincipalId, UserMetadata>>,
}

impl<V: JwtValidator> TokenIdentityProvider<V> {
    pub fn new(validator: V) -> Self {
        Self {
            validator,
            overlay: RwLock::new(HashMap::new()),
        }
    }

    fn metadata_for(&self, id: &PrincipalId, issued: UserMetadata) -> UserMetadata {
        match self.overlay.read() {
            Ok(map) => map.get(id).cloned().unwrap_or(issued),
            Err(_) => issued,
        }
    }
}

#[async_trait]
impl<V: JwtValidator> IdentityProvider for TokenIdentityProvider<V> {
    async fn current_user(&self, token: Option<&str>) -> Result<Option<Principal>, IdentityError> {
        let Some(token) = token else {
            return Ok(None);
        };

        let claims = self
            .validator
            .validate(token, Utc::now())
            .map_err(|e| IdentityError::InvalidCredentials(e.to_string()))?;

        let metadata = self.metadata_for(&claims.sub, claims.user_metadata);
        Ok(Some(Principal {
            id: claims.sub,
            email: claims.email,
            metadata,
        }))
    }

    async fn session(&self, token: Option<&str>) -> Result<Option<Session>, IdentityError> {
        let Some(token) = token else {
            return Ok(None);
        };

        let claims = self
            .validator
            .validate(token, Utc::now())
            .map_err(|e| IdentityError::InvalidCredentials(e.to_string()))?;

        Ok(Some(Session {
            principal_id: claims.sub,
            issued_at: claims.issued_at,
            expires_at: claims.expires_at,
        }))
    }

    async fn update_user(
        &self,
        principal: &Principal,
        patch: MetadataPatch,
    ) -> Result<Principal, IdentityError> {
        let mut map = self
            .overlay
            .write()
            .map_err(|_| IdentityError::Unavailable("metadata overlay poisoned".to_string()))?;

        let metadata = map
            .entry(principal.id)
            .or_insert_with(|| principal.metadata.clone());
        metadata.merge(patch);

        tracing::info!(principal_id = %principal.id, "user metadata updated");

        Ok(Principal {
            id: principal.id,
            email: principal.email.clone(),
            metadata: metadata.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Hs256JwtValidator, JwtClaims};
    use chrono::Duration;

    fn provider() -> TokenIdentityProvider<Hs256JwtValidator> {
        TokenIdentityProvider::new(Hs256JwtValidator::new(b"test-secret".to_vec()))
    }

    fn token_for(provider: &TokenIdentityProvider<Hs256JwtValidator>, sub: PrincipalId) -> String {
        let now = Utc::now();
        provider
            .validator
            .sign(&JwtClaims {
                sub,
                email: Some("ravi@example.in".to_string()),
                user_metadata: UserMetadata {
                    full_name: Some("Ravi Kumar".to_string()),
                    ..Default::default()
                },
                issued_at: now - Duration::seconds(1),
                expires_at: now + Duration::minutes(5),
            })
            .unwrap()
    }

    #[tokio::test]
    async fn missing_token_is_no_principal() {
        let provider = provider();
        assert_eq!(provider.current_user(None).await, Ok(None));
        assert_eq!(provider.session(None).await, Ok(None));
    }

    #[tokio::test]
    async fn garbage_token_is_an_error() {
        let provider = provider();
        let err = provider.current_user(Some("not-a-jwt")).await.unwrap_err();
        assert!(matches!(err, IdentityError::InvalidCredentials(_)));
    }

    #[tokio::test]
    async fn valid_token_yields_principal_and_session() {
        let provider = provider();
        let sub = PrincipalId::new();
        let token = token_for(&provider, sub);

        let principal = provider.current_user(Some(&token)).await.unwrap().unwrap();
        assert_eq!(principal.id, sub);
        assert_eq!(principal.metadata.full_name.as_deref(), Some("Ravi Kumar"));

        let session = provider.session(Some(&token)).await.unwrap().unwrap();
        assert_eq!(session.principal_id, sub);
        assert!(session.expires_at > session.issued_at);
    }

    #[tokio::test]
    async fn metadata_update_outlives_the_token_claims() {
        let provider = provider();
        let sub = PrincipalId::new();
        let token = token_for(&provider, sub);
        let principal = provider.current_user(Some(&token)).await.unwrap().unwrap();

        provider
            .update_user(
                &principal,
                MetadataPatch {
                    phone: Some("90000 12345".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let again = provider.current_user(Some(&token)).await.unwrap().unwrap();
        assert_eq!(again.metadata.full_name.as_deref(), Some("Ravi Kumar"));
        assert_eq!(again.metadata.phone.as_deref(), Some("90000 12345"));
    }
}
