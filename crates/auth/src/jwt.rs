//! Bearer token verification (HS256).

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::claims::{JwtClaims, TokenValidationError, validate_claims};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JwtError {
    #[error("malformed or unsigned token: {0}")]
    Malformed(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Verifies a raw bearer token and yields its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError>;
}

/// Shared-secret HS256 validator.
pub struct Hs256JwtValidator {
    decoding: DecodingKey,
    encoding: EncodingKey,
}

impl Hs256JwtValidator {
    pub fn new(secret: Vec<u8>) -> Self {
        Self {
            decoding: DecodingKey::from_secret(&secret),
            encoding: EncodingKey::from_secret(&secret),
        }
    }

    /// Sign claims with the same secret (dev tooling and tests).
    pub fn sign(&self, claims: &JwtClaims) -> Result<String, JwtError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| JwtError::Malformed(e.to_string()))
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError> {
        // Time checks go through `validate_claims` so they use the caller's clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &validation)
            .map_err(|e| JwtError::Malformed(e.to_string()))?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}
