use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::auth::Role;
use crate::services::ids::UserId;

// Errors returned by token issuance / verification.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("empty token")]
    Empty,
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// Claims carried by an identity token.
///
/// `exp` is only present when the service was built with a TTL.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TokenClaims {
    id: UserId,
    role: Role,
    iat: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<u64>,
}

/// What a verified token asserts. Middleware still re-resolves the subject
/// against the user store before trusting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedToken {
    pub user_id: UserId,
    pub role: Role,
}

/// HS256 issuer/verifier bound to a single shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: Option<u64>,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenService")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl TokenService {
    pub fn new(secret: &[u8], ttl_seconds: Option<u64>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // `exp` is optional; when present it is still checked.
        validation.required_spec_claims.clear();
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl_seconds,
        }
    }

    pub fn issue(&self, user_id: UserId, role: Role) -> Result<String, TokenError> {
        self.issue_at(user_id, role, jsonwebtoken::get_current_timestamp())
    }

    fn issue_at(&self, user_id: UserId, role: Role, now: u64) -> Result<String, TokenError> {
        let claims = TokenClaims {
            id: user_id,
            role,
            iat: now,
            exp: self.ttl_seconds.map(|ttl| now.saturating_add(ttl)),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        if token.trim().is_empty() {
            return Err(TokenError::Empty);
        }

        let data =
            jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &self.validation)?;

        Ok(VerifiedToken {
            user_id: data.claims.id,
            role: data.claims.role,
        })
    }
}
