use super::config::JwtConfig;
use super::identity::Identity;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// User id as a 24-character hex ObjectId
    pub id: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token rejected: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("token subject is not an ObjectId: {0}")]
    MalformedSubject(String),
}

/// Issues and verifies HS256 access tokens. Cheap to clone.
#[derive(Clone)]
pub struct JwtAuth {
    keys: Arc<Keys>,
    ttl: chrono::Duration,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtAuth {
    pub fn new(config: &JwtConfig) -> Self {
        let ttl = chrono::Duration::from_std(config.ttl).unwrap_or(chrono::Duration::days(2));
        Self {
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(config.secret.as_bytes()),
                decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            }),
            ttl,
        }
    }

    /// Sign a token for `identity`, valid from now for the configured TTL
    pub fn issue(&self, identity: &Identity) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = JwtClaims {
            id: identity.id.to_hex(),
            email: identity.email.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.keys.encoding,
        )?)
    }

    /// Check signature and expiry and return the claims
    pub fn verify(&self, token: &str) -> Result<JwtClaims, TokenError> {
        let data = decode::<JwtClaims>(
            token,
            &self.keys.decoding,
            &Validation::new(Algorithm::HS256),
        )?;
        Ok(data.claims)
    }

    /// [`verify`](Self::verify) and convert the claims into an [`Identity`]
    pub fn authenticate(&self, token: &str) -> Result<Identity, TokenError> {
        let claims = self.verify(token)?;
        let id = ObjectId::parse_str(&claims.id)
            .map_err(|_| TokenError::MalformedSubject(claims.id.clone()))?;
        Ok(Identity {
            id,
            email: claims.email,
        })
    }
}
