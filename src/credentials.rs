//! Credential Service
//!
//! Argon2id password hashing and HS256 session token issue/verification.
//! Keys and hashing parameters are derived once from [`AuthConfig`].

use crate::config::AuthConfig;
use crate::error::{AuthError, TokenError};
use crate::models::{IssuedToken, SessionClaims};

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use std::sync::Arc;
use uuid::Uuid;

/// Password hasher and token signer
#[derive(Clone)]
pub struct Credentials {
    params: Params,
    issuer: String,
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
    /// Digest checked when no account matches, so misses cost as much as hits
    decoy_hash: Arc<String>,
}

impl Credentials {
    /// Build from configuration
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let params = Params::new(
            config.argon2_memory_cost,
            config.argon2_time_cost,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| AuthError::Config(format!("Invalid Argon2 parameters: {}", e)))?;

        let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.set_issuer(&[&config.jwt_issuer]);
        validation.validate_aud = false;
        validation.leeway = 0;

        let mut credentials = Self {
            params,
            issuer: config.jwt_issuer.clone(),
            encoding_key: Arc::new(EncodingKey::from_secret(config.jwt_secret.as_bytes())),
            decoding_key: Arc::new(DecodingKey::from_secret(config.jwt_secret.as_bytes())),
            validation: Arc::new(validation),
            decoy_hash: Arc::default(),
        };
        credentials.decoy_hash = Arc::new(credentials.hash_password("rustpress-session-decoy")?);

        Ok(credentials)
    }

    /// Argon2id digest under the configured parameters that no account owns
    pub fn decoy_hash(&self) -> &str {
        &self.decoy_hash
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    // ============================================
    // Password Hashing
    // ============================================

    /// Hash a password using Argon2id with a fresh random salt
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)?
            .to_string();

        Ok(hash)
    }

    /// Verify a password against a stored hash
    ///
    /// The parameters embedded in the hash are used, so digests produced
    /// under older settings still verify. A malformed hash never matches.
    pub fn verify_password(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Stored password hash is malformed: {}", e);
                return false;
            }
        };

        self.argon2()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    // ============================================
    // Session Tokens
    // ============================================

    /// Sign a session token for `account_id` valid for `expires_in` seconds
    pub fn issue_token(&self, account_id: Uuid, expires_in: i64) -> Result<IssuedToken, AuthError> {
        let now = Utc::now();
        let expires_at = Duration::try_seconds(expires_in)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                tracing::error!(expires_in, "Session token lifetime out of range");
                AuthError::Internal
            })?;

        let claims = SessionClaims {
            sub: account_id,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.issuer.clone(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to sign session token: {:?}", e);
            AuthError::Internal
        })?;

        Ok(IssuedToken {
            token,
            expires_in,
            expires_at,
        })
    }

    /// Verify signature, issuer and expiry of a session token
    pub fn verify_token(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(secret: &str) -> AuthConfig {
        AuthConfig {
            argon2_memory_cost: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
            ..AuthConfig::with_secret(secret)
        }
    }

    fn credentials() -> Credentials {
        Credentials::new(&test_config("test-secret-key-that-is-long-enough-1")).unwrap()
    }

    #[test]
    fn test_decoy_hash_uses_configured_params() {
        let creds = credentials();
        let parsed = PasswordHash::new(creds.decoy_hash()).unwrap();

        assert_eq!(parsed.algorithm.as_str(), "argon2id");
        assert_eq!(Params::try_from(&parsed).unwrap().m_cost(), 1024);
        assert!(!creds.verify_password("secret1", creds.decoy_hash()));
    }

    #[test]
    fn test_issue_token_lifetime_out_of_range() {
        let creds = credentials();

        for expires_in in [i64::MAX, i64::MIN] {
            assert!(matches!(
                creds.issue_token(Uuid::new_v4(), expires_in),
                Err(AuthError::Internal)
            ));
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let creds = credentials();
        let hash = creds.hash_password("secret1").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(creds.verify_password("secret1", &hash));
        assert!(!creds.verify_password("secret2", &hash));
        assert!(!creds.verify_password("Secret1", &hash));
    }

    #[test]
    fn test_hash_is_salted() {
        let creds = credentials();
        let first = creds.hash_password("secret1").unwrap();
        let second = creds.hash_password("secret1").unwrap();

        assert_ne!(first, second);
        assert!(creds.verify_password("secret1", &second));
    }

    #[test]
    fn test_verify_malformed_hash() {
        assert!(!credentials().verify_password("secret1", "not-a-phc-string"));
    }

    #[test]
    fn test_issue_and_verify_token() {
        let creds = credentials();
        let account_id = Uuid::new_v4();

        let issued = creds.issue_token(account_id, 1800).unwrap();
        assert_eq!(issued.expires_in, 1800);

        let claims = creds.verify_token(&issued.token).unwrap();
        assert_eq!(claims.sub, account_id);
        assert_eq!(claims.iss, "rustpress-session");
        assert_eq!(claims.exp - claims.iat, 1800);
    }

    #[test]
    fn test_expired_token() {
        let creds = credentials();
        let issued = creds.issue_token(Uuid::new_v4(), -60).unwrap();

        assert_eq!(creds.verify_token(&issued.token), Err(TokenError::Expired));
    }

    #[test]
    fn test_foreign_signature() {
        let other = Credentials::new(&test_config("another-secret-key-that-is-long-enough")).unwrap();
        let issued = other.issue_token(Uuid::new_v4(), 1800).unwrap();

        assert_eq!(
            credentials().verify_token(&issued.token),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_malformed_token() {
        let creds = credentials();

        assert_eq!(creds.verify_token("garbage"), Err(TokenError::Malformed));
        assert_eq!(creds.verify_token(""), Err(TokenError::Malformed));
        assert_eq!(
            creds.verify_token("aaa.bbb.ccc"),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn test_foreign_issuer_is_malformed() {
        let other = Credentials::new(&AuthConfig {
            jwt_issuer: "someone-else".into(),
            ..test_config("test-secret-key-that-is-long-enough-1")
        })
        .unwrap();
        let issued = other.issue_token(Uuid::new_v4(), 1800).unwrap();

        assert_eq!(
            credentials().verify_token(&issued.token),
            Err(TokenError::Malformed)
        );
    }
}
