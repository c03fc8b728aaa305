//! Stateless signed credentials.
//!
//! A credential is an HS256-signed token. The signing key is the SHA-256
//! digest of the configured secret, so secrets of any length yield a
//! uniform 32-byte key. Verification checks the signature, the expiry, and
//! the issuer; nothing else is consulted, so the service holds no per-token
//! state.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use ladle_core::{now_millis, UserId};

use crate::error::CredentialError;

/// Configuration for the credential service.
#[derive(Debug, Clone)]
pub struct CredentialConfig {
    /// Signing secret. Digested to a 32-byte key before use.
    pub secret: String,
    /// Credential lifetime in milliseconds.
    pub ttl_ms: i64,
    /// Issuer claim stamped on every credential and required on validation.
    pub issuer: String,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            ttl_ms: 24 * 60 * 60 * 1000,
            issuer: "ladle".to_string(),
        }
    }
}

/// The claim set carried by a credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the identity's email.
    pub sub: String,
    /// The identity's id.
    pub user_id: i64,
    /// Issuer.
    pub iss: String,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: u64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: u64,
}

impl Claims {
    pub fn user_id(&self) -> UserId {
        UserId::new(self.user_id)
    }

    pub fn email(&self) -> &str {
        &self.sub
    }
}

/// Issues and validates signed credentials.
#[derive(Clone)]
pub struct CredentialService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_ms: i64,
    issuer: String,
}

impl CredentialService {
    pub fn new(config: &CredentialConfig) -> Result<Self, CredentialError> {
        if config.secret.is_empty() {
            return Err(CredentialError::Config("empty signing secret".into()));
        }
        if config.ttl_ms <= 0 {
            return Err(CredentialError::Config(format!(
                "non-positive ttl: {}",
                config.ttl_ms
            )));
        }
        let key = Sha256::digest(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        // No leeway: a credential past its exp instant is expired, full stop.
        validation.leeway = 0;
        validation.set_issuer(&[&config.issuer]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(key.as_slice()),
            decoding_key: DecodingKey::from_secret(key.as_slice()),
            validation,
            ttl_ms: config.ttl_ms,
            issuer: config.issuer.clone(),
        })
    }

    /// Issue a credential for the identity.
    pub fn issue(&self, user_id: UserId, email: &str) -> Result<String, CredentialError> {
        let now_ms = now_millis();
        let claims = Claims {
            sub: email.to_string(),
            user_id: user_id.get(),
            iss: self.issuer.clone(),
            iat: (now_ms / 1000) as u64,
            exp: ((now_ms + self.ttl_ms) / 1000) as u64,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| CredentialError::Malformed(e.to_string()))
    }

    /// Validate a credential and return its claims.
    ///
    /// Expiry is reported distinctly from every other defect; a forged or
    /// garbled token never surfaces as "expired".
    pub fn validate(&self, token: &str) -> Result<Claims, CredentialError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => CredentialError::Expired,
                _ => CredentialError::Malformed(e.to_string()),
            })
    }
}

/// Extract the raw token from an Authorization header value.
///
/// Accepts both `Bearer <token>` and a bare token.
pub fn extract_bearer(header_value: &str) -> &str {
    header_value
        .strip_prefix("Bearer ")
        .unwrap_or(header_value)
        .trim()
}
