//! JWT service for access token issuance and verification
//!
//! Tokens are signed with a server-held HMAC secret and carry the username,
//! the user id and an absolute expiry. There is no refresh token: once a
//! token expires the client has to log in again. Verification is stateless
//! and runs on every protected request.

use anyhow::Result;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::middleware::AuthUser;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret used to sign and verify tokens
    pub secret: String,
    /// Signing algorithm, restricted to the HMAC family
    pub algorithm: Algorithm,
    /// Access token lifetime in seconds (default: 20 minutes)
    pub access_token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `AUTH_SECRET_KEY`: Signing secret (required)
    /// - `AUTH_ALGORITHM`: HS256, HS384 or HS512 (default: HS256)
    /// - `ACCESS_TOKEN_EXPIRE_MINUTES`: Token lifetime in minutes (default: 20)
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("AUTH_SECRET_KEY")
            .map_err(|_| anyhow::anyhow!("AUTH_SECRET_KEY environment variable not set"))?;

        if secret.is_empty() {
            anyhow::bail!("AUTH_SECRET_KEY must not be empty");
        }

        let algorithm =
            std::env::var("AUTH_ALGORITHM").unwrap_or_else(|_| "HS256".to_string());
        let algorithm = parse_algorithm(&algorithm)?;

        let expire_minutes: u64 = std::env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
            .unwrap_or_else(|_| "20".to_string())
            .parse()
            .unwrap_or(20);

        Ok(JwtConfig {
            secret,
            algorithm,
            access_token_expiry: expire_minutes * 60,
        })
    }
}

/// Parse an algorithm name, accepting only secret-based algorithms
fn parse_algorithm(name: &str) -> Result<Algorithm> {
    let algorithm = Algorithm::from_str(name.trim())
        .map_err(|_| anyhow::anyhow!("Unknown AUTH_ALGORITHM: {}", name))?;

    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => Err(anyhow::anyhow!(
            "AUTH_ALGORITHM {:?} is not supported, use HS256, HS384 or HS512",
            other
        )),
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Username
    pub sub: String,
    /// User ID
    pub id: Uuid,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// Token issuance and verification failures
#[derive(Debug, Error)]
pub enum TokenError {
    /// Token could not be signed
    #[error("Failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    /// Token failed to decode, has a bad signature or misses a claim
    #[error("Invalid token: {0}")]
    Invalid(String),

    /// Token expiry has elapsed
    #[error("Token expired")]
    Expired,

    /// System clock is before the Unix epoch
    #[error("Failed to get current time")]
    Clock,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        // Expiry is checked against an explicit clock in `verify_at`
        let mut validation = Validation::new(config.algorithm);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        JwtService {
            encoding_key,
            decoding_key,
            validation,
            config,
        }
    }

    /// Issue an access token for a user
    pub fn issue(&self, username: &str, user_id: Uuid) -> Result<String, TokenError> {
        self.issue_at(username, user_id, now()?)
    }

    /// Issue an access token as if the current time were `issued_at`
    pub fn issue_at(
        &self,
        username: &str,
        user_id: Uuid,
        issued_at: u64,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: username.to_string(),
            id: user_id,
            iat: issued_at,
            exp: issued_at + self.config.access_token_expiry,
        };

        encode(&Header::new(self.config.algorithm), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)
    }

    /// Verify a token and resolve the caller identity
    pub fn verify(&self, token: &str) -> Result<AuthUser, TokenError> {
        self.verify_at(token, now()?)
    }

    /// Verify a token against the given current time
    pub fn verify_at(&self, token: &str, now: u64) -> Result<AuthUser, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?
            .claims;

        if claims.sub.is_empty() {
            return Err(TokenError::Invalid("empty subject".to_string()));
        }

        if claims.exp <= now {
            debug!(exp = claims.exp, now, "Rejecting expired token");
            return Err(TokenError::Expired);
        }

        Ok(AuthUser {
            username: claims.sub,
            user_id: claims.id,
        })
    }

    /// Get the access token expiry time in seconds
    pub fn access_token_expiry(&self) -> u64 {
        self.config.access_token_expiry
    }
}

fn now() -> Result<u64, TokenError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| TokenError::Clock)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const TTL: u64 = 20 * 60;

    fn service_with(secret: &str, algorithm: Algorithm) -> JwtService {
        JwtService::new(JwtConfig {
            secret: secret.to_string(),
            algorithm,
            access_token_expiry: TTL,
        })
    }

    fn service() -> JwtService {
        service_with("test-secret", Algorithm::HS256)
    }

    #[test]
    fn issued_token_resolves_to_the_same_identity() {
        let service = service();
        let user_id = Uuid::new_v4();

        let token = service.issue("alice", user_id).unwrap();
        let user = service.verify(&token).unwrap();

        assert_eq!(user.username, "alice");
        assert_eq!(user.user_id, user_id);
    }

    #[test]
    fn token_is_accepted_before_expiry_and_rejected_after() {
        let service = service();
        let issued_at = 1_700_000_000;
        let token = service.issue_at("alice", Uuid::new_v4(), issued_at).unwrap();

        assert!(service.verify_at(&token, issued_at + TTL - 1).is_ok());
        assert!(matches!(
            service.verify_at(&token, issued_at + TTL + 1),
            Err(TokenError::Expired)
        ));
        assert!(matches!(
            service.verify_at(&token, issued_at + TTL),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let service = service();
        let token = service.issue("alice", Uuid::new_v4()).unwrap();

        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let forged = service.issue("mallory", Uuid::new_v4()).unwrap();
        parts[1] = forged.split('.').nth(1).unwrap().to_string();
        let tampered = parts.join(".");

        assert!(matches!(
            service.verify(&tampered),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let token = service_with("other-secret", Algorithm::HS256)
            .issue("alice", Uuid::new_v4())
            .unwrap();

        assert!(matches!(service().verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn token_signed_with_another_algorithm_is_rejected() {
        let token = service_with("test-secret", Algorithm::HS512)
            .issue("alice", Uuid::new_v4())
            .unwrap();

        assert!(service().verify(&token).is_err());
    }

    #[test]
    fn token_without_user_id_claim_is_rejected() {
        #[derive(Serialize)]
        struct PartialClaims {
            sub: String,
            exp: u64,
        }

        let exp = now().unwrap() + 600;
        let token = encode(
            &Header::new(Algorithm::HS256),
            &PartialClaims {
                sub: "alice".to_string(),
                exp,
            },
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(matches!(service().verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(service().verify("invalid.token.here").is_err());
        assert!(service().verify("").is_err());
    }

    #[test]
    fn only_hmac_algorithms_are_accepted() {
        assert_eq!(parse_algorithm("HS384").unwrap(), Algorithm::HS384);
        assert!(parse_algorithm("RS256").is_err());
        assert!(parse_algorithm("none").is_err());
    }

    #[test]
    #[serial]
    fn test_jwt_config_from_env() {
        unsafe {
            std::env::set_var("AUTH_SECRET_KEY", "from-env");
            std::env::remove_var("AUTH_ALGORITHM");
            std::env::set_var("ACCESS_TOKEN_EXPIRE_MINUTES", "30");
        }

        let config = JwtConfig::from_env().unwrap();
        assert_eq!(config.secret, "from-env");
        assert_eq!(config.algorithm, Algorithm::HS256);
        assert_eq!(config.access_token_expiry, 1800);

        unsafe {
            std::env::remove_var("AUTH_SECRET_KEY");
            std::env::remove_var("ACCESS_TOKEN_EXPIRE_MINUTES");
        }
    }

    #[test]
    #[serial]
    fn test_jwt_config_requires_secret() {
        unsafe {
            std::env::remove_var("AUTH_SECRET_KEY");
        }

        assert!(JwtConfig::from_env().is_err());
    }
}
