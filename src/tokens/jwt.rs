//! Signed bearer tokens
//!
//! Tokens are stateless HS256 JWTs carrying the username, role and expiry.
//! Nothing is persisted, so a token stays valid until it expires: there is no
//! revocation, and rotating the signing key invalidates every outstanding
//! token at once.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::models::Role;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,
    #[error("Token lifetime is out of range")]
    ExpiryOutOfRange,
    #[error("Token signature is invalid")]
    Invalid,
    #[error("Malformed token: {0}")]
    Malformed(String),
    #[error("Failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Expiry as a unix timestamp (seconds)
    pub exp: i64,
    pub role: Role,
    pub username: String,
}

/// Who a validated token speaks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub role: Role,
    pub username: String,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            role: claims.role,
            username: claims.username,
        }
    }
}

#[derive(Clone)]
pub struct TokenService {
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            encoding_key: EncodingKey::from_secret(secret),
            validation,
        }
    }

    /// Sign a token for `username` that expires `ttl` from now
    pub fn issue(&self, username: &str, role: Role, ttl: Duration) -> Result<String, TokenError> {
        let exp = Utc::now()
            .checked_add_signed(ttl)
            .ok_or(TokenError::ExpiryOutOfRange)?;
        let claims = Claims {
            exp: exp.timestamp(),
            role,
            username: username.to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)?;

        tracing::debug!(username = %username, role = %role, exp = claims.exp, "Issued token");
        Ok(token)
    }

    pub fn validate(&self, token: &str) -> Result<Identity, TokenError> {
        let decoded =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    ErrorKind::InvalidSignature => TokenError::Invalid,
                    _ => TokenError::Malformed(e.to_string()),
                }
            })?;

        Ok(decoded.claims.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(b"test-secret-key-12345")
    }

    #[test]
    fn test_issue_and_validate() {
        let tokens = service();
        let token = tokens
            .issue("alice", Role::Admin, Duration::hours(24))
            .unwrap();

        let identity = tokens.validate(&token).unwrap();
        assert_eq!(identity.username, "alice");
        assert_eq!(identity.role, Role::Admin);
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = service();
        let token = tokens
            .issue("alice", Role::User, Duration::seconds(-30))
            .unwrap();

        assert!(matches!(tokens.validate(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_unrepresentable_expiry_is_an_error() {
        let tokens = service();
        let result = tokens.issue("alice", Role::User, Duration::seconds(10_000_000_000_000));
        assert!(matches!(result, Err(TokenError::ExpiryOutOfRange)));
    }

    #[test]
    fn test_different_secret_rejected() {
        let issuer = TokenService::new(b"secret1");
        let verifier = TokenService::new(b"secret2");
        let token = issuer.issue("alice", Role::User, Duration::hours(1)).unwrap();

        assert!(matches!(verifier.validate(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let tokens = service();
        assert!(matches!(
            tokens.validate("invalid.token.here"),
            Err(TokenError::Malformed(_))
        ));
        assert!(matches!(tokens.validate(""), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let tokens = service();
        let user_token = tokens.issue("mallory", Role::User, Duration::hours(1)).unwrap();
        let admin_token = tokens.issue("mallory", Role::Admin, Duration::hours(1)).unwrap();

        // Graft the admin payload onto the user signature
        let user_parts: Vec<&str> = user_token.split('.').collect();
        let admin_parts: Vec<&str> = admin_token.split('.').collect();
        let forged = format!("{}.{}.{}", user_parts[0], admin_parts[1], user_parts[2]);

        assert!(matches!(tokens.validate(&forged), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_claims_carry_expiry() {
        let tokens = service();
        let before = Utc::now().timestamp();
        let token = tokens.issue("bob", Role::User, Duration::hours(2)).unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let claims = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"test-secret-key-12345"),
            &validation,
        )
        .unwrap()
        .claims;

        assert_eq!(claims.username, "bob");
        assert!(claims.exp >= before + 2 * 3600);
        assert!(claims.exp <= Utc::now().timestamp() + 2 * 3600);
    }
}
