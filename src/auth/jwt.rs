//! JWT access/refresh token handling
//!
//! - Tokens are signed with HS256 (HMAC-SHA256)
//! - Access and refresh tokens share the secret and differ by `token_type`
//! - A refresh token can only be exchanged for a new access token, never
//!   used as one

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::IdeagramError;

/// Kind of token carried in the `token_type` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Payload stored in JWT token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub user_id: String,
    /// Access or refresh
    pub token_type: TokenType,
    /// Unique token id
    pub jti: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Access/refresh pair returned on login and registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub refresh: String,
    pub access: String,
}

/// Result of token validation
#[derive(Debug)]
pub struct TokenValidationResult {
    pub valid: bool,
    pub claims: Option<Claims>,
    pub error: Option<String>,
}

impl TokenValidationResult {
    pub fn valid(claims: Claims) -> Self {
        Self {
            valid: true,
            claims: Some(claims),
            error: None,
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            claims: None,
            error: Some(error.into()),
        }
    }
}

/// JWT validator and generator
#[derive(Clone)]
pub struct JwtValidator {
    secret: String,
    access_expiry_seconds: u64,
    refresh_expiry_seconds: u64,
}

fn now_secs() -> Result<u64, IdeagramError> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| IdeagramError::Auth(format!("System time error: {}", e)))?
        .as_secs())
}

impl JwtValidator {
    /// Create a new JWT validator
    ///
    /// Returns an error if the secret is empty or too short
    pub fn new(
        secret: String,
        access_expiry_seconds: u64,
        refresh_expiry_seconds: u64,
    ) -> Result<Self, IdeagramError> {
        if secret.is_empty() {
            return Err(IdeagramError::Config(
                "JWT_SECRET is required in production mode".into(),
            ));
        }

        if secret.len() < 32 {
            return Err(IdeagramError::Config(
                "JWT_SECRET must be at least 32 characters".into(),
            ));
        }

        Ok(Self {
            secret,
            access_expiry_seconds,
            refresh_expiry_seconds,
        })
    }

    /// Create a validator for dev mode and tests
    pub fn new_dev() -> Self {
        Self {
            secret: "dev-mode-secret-not-for-production-use-123456".into(),
            access_expiry_seconds: 3600,
            refresh_expiry_seconds: 7 * 24 * 60 * 60,
        }
    }

    fn sign(&self, user_id: &str, token_type: TokenType, lifetime: u64) -> Result<String, IdeagramError> {
        let now = now_secs()?;
        let claims = Claims {
            user_id: user_id.to_string(),
            token_type,
            jti: uuid::Uuid::new_v4().simple().to_string(),
            iat: now,
            exp: now + lifetime,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| IdeagramError::Auth(format!("Failed to generate token: {}", e)))
    }

    /// Generate an access token for a user
    pub fn generate_token(&self, user_id: &str) -> Result<String, IdeagramError> {
        self.sign(user_id, TokenType::Access, self.access_expiry_seconds)
    }

    /// Generate a refresh token with the longer lifetime
    pub fn generate_refresh_token(&self, user_id: &str) -> Result<String, IdeagramError> {
        self.sign(user_id, TokenType::Refresh, self.refresh_expiry_seconds)
    }

    /// Generate an access/refresh pair
    pub fn generate_pair(&self, user_id: &str) -> Result<TokenPair, IdeagramError> {
        Ok(TokenPair {
            refresh: self.generate_refresh_token(user_id)?,
            access: self.generate_token(user_id)?,
        })
    }

    /// Verify and decode a JWT token of any type
    pub fn verify_token(&self, token: &str) -> TokenValidationResult {
        let validation = Validation::default();

        match decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        ) {
            Ok(token_data) => TokenValidationResult::valid(token_data.claims),
            Err(err) => {
                use jsonwebtoken::errors::ErrorKind;
                let error_msg = match err.kind() {
                    ErrorKind::ExpiredSignature => "Token expired",
                    ErrorKind::InvalidToken => "Invalid token",
                    ErrorKind::InvalidSignature => "Invalid signature",
                    _ => "Token validation failed",
                };
                TokenValidationResult::invalid(error_msg)
            }
        }
    }

    /// Verify a token and require a specific type
    pub fn verify_typed(&self, token: &str, expected: TokenType) -> Result<Claims, IdeagramError> {
        let result = self.verify_token(token);
        let claims = result.claims.ok_or_else(|| {
            IdeagramError::Unauthorized(
                result.error.unwrap_or_else(|| "Token is invalid or expired".into()),
            )
        })?;

        if claims.token_type != expected {
            return Err(IdeagramError::Unauthorized("Token has wrong type".into()));
        }
        Ok(claims)
    }

    /// Exchange a refresh token for a fresh access token
    pub fn refresh_access_token(&self, refresh_token: &str) -> Result<String, IdeagramError> {
        let claims = self.verify_typed(refresh_token, TokenType::Refresh)?;
        self.generate_token(&claims.user_id)
    }
}

/// Extract token from Authorization header.
/// Supports "Bearer <token>" format and raw tokens.
pub fn extract_token_from_header(auth_header: Option<&str>) -> Option<&str> {
    let header = auth_header?;

    if let Some(token) = header.strip_prefix("Bearer ") {
        let token = token.trim();
        if !token.is_empty() {
            return Some(token);
        }
    }

    if !header.contains(' ') {
        let token = header.trim();
        if !token.is_empty() {
            return Some(token);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_validator() -> JwtValidator {
        JwtValidator::new(
            "test-secret-that-is-at-least-32-characters-long".into(),
            3600,
            7200,
        )
        .unwrap()
    }

    #[test]
    fn test_short_secret_rejected() {
        assert!(JwtValidator::new("short".into(), 60, 120).is_err());
        assert!(JwtValidator::new(String::new(), 60, 120).is_err());
    }

    #[test]
    fn test_generate_and_verify_pair() {
        let validator = test_validator();
        let pair = validator.generate_pair("user-1").unwrap();

        let access = validator.verify_typed(&pair.access, TokenType::Access).unwrap();
        assert_eq!(access.user_id, "user-1");
        assert_eq!(access.exp - access.iat, 3600);

        let refresh = validator.verify_typed(&pair.refresh, TokenType::Refresh).unwrap();
        assert_eq!(refresh.exp - refresh.iat, 7200);
    }

    #[test]
    fn test_refresh_not_usable_as_access() {
        let validator = test_validator();
        let pair = validator.generate_pair("user-1").unwrap();
        assert!(validator.verify_typed(&pair.refresh, TokenType::Access).is_err());
        assert!(validator.refresh_access_token(&pair.access).is_err());
    }

    #[test]
    fn test_refresh_issues_access() {
        let validator = test_validator();
        let pair = validator.generate_pair("user-9").unwrap();
        let access = validator.refresh_access_token(&pair.refresh).unwrap();
        let claims = validator.verify_typed(&access, TokenType::Access).unwrap();
        assert_eq!(claims.user_id, "user-9");
    }

    #[test]
    fn test_wrong_secret() {
        let other = JwtValidator::new(
            "different-secret-that-is-at-least-32-characters".into(),
            3600,
            7200,
        )
        .unwrap();
        let token = test_validator().generate_token("user-1").unwrap();
        assert!(!other.verify_token(&token).valid);
    }

    #[test]
    fn test_invalid_token() {
        let result = test_validator().verify_token("invalid-token");
        assert!(!result.valid);
        assert!(result.error.is_some());
    }

    #[test]
    fn test_extract_token_from_header() {
        assert_eq!(extract_token_from_header(Some("Bearer abc123")), Some("abc123"));
        assert_eq!(extract_token_from_header(Some("abc123")), Some("abc123"));
        assert_eq!(extract_token_from_header(Some("Bearer ")), None);
        assert_eq!(extract_token_from_header(None), None);
    }
}
