/// JWT token management for user authentication
///
/// Tokens are signed with HS256. Access tokens carry the user's vendor
/// binding and role so handlers can authorize without a database lookup;
/// refresh tokens carry the same claims but are only accepted by the
/// token-refresh endpoint.
///
/// # Claims
///
/// | Claim        | Type           | Meaning                                |
/// |--------------|----------------|----------------------------------------|
/// | `sub`        | `Uuid`         | User id                                |
/// | `iss`        | `String`       | Always `"storefront"`                  |
/// | `vendor_id`  | `Option<Uuid>` | Vendor the user belongs to, if any     |
/// | `role`       | `UserRole`     | Role within the vendor                 |
/// | `username`   | `String`       | Login name, for logging and display    |
/// | `token_type` | `TokenType`    | `Access` or `Refresh`                  |

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserRole;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to encode token
    #[error("Failed to encode token: {0}")]
    EncodingError(String),

    /// Failed to decode token
    #[error("Failed to decode token: {0}")]
    DecodingError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token is not valid yet
    #[error("Token is not valid yet")]
    NotYetValid,

    /// Invalid token signature or structure
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Wrong token type for this operation
    #[error("Expected {expected} token, got {actual}")]
    WrongTokenType { expected: String, actual: String },
}

/// Distinguishes short-lived access tokens from long-lived refresh tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Short-lived token for API access (24 hours)
    Access,
    /// Long-lived token for obtaining new access tokens (30 days)
    Refresh,
}

impl TokenType {
    /// Token lifetime
    pub fn lifetime(&self) -> Duration {
        match self {
            TokenType::Access => Duration::hours(24),
            TokenType::Refresh => Duration::days(30),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// JWT claims embedded in every issued token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: Uuid,
    /// Issuer, always "storefront"
    pub iss: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    /// Not valid before (Unix timestamp)
    pub nbf: i64,
    /// Vendor the user belongs to, None for platform-level users
    pub vendor_id: Option<Uuid>,
    /// Role within the vendor
    pub role: UserRole,
    /// Login name
    pub username: String,
    /// Access or refresh
    pub token_type: TokenType,
}

impl Claims {
    /// Creates claims for a user with the standard lifetime for the token type
    pub fn new(
        user_id: Uuid,
        vendor_id: Option<Uuid>,
        role: UserRole,
        username: String,
        token_type: TokenType,
    ) -> Self {
        let now = Utc::now();
        let expires = now + token_type.lifetime();

        Self {
            sub: user_id,
            iss: "storefront".to_string(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
            nbf: now.timestamp(),
            vendor_id,
            role,
            username,
            token_type,
        }
    }

    /// Returns true if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Encodes claims into a signed JWT string
///
/// # Errors
///
/// Returns `JwtError::EncodingError` if signing fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key).map_err(|e| JwtError::EncodingError(e.to_string()))
}

/// Decodes and validates a JWT, checking signature, expiry, and issuer
///
/// # Errors
///
/// Returns `JwtError::Expired` for expired tokens, `JwtError::NotYetValid`
/// for tokens used before their `nbf`, and `JwtError::InvalidToken` for
/// signature or structural failures
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&["storefront"]);
    validation.validate_nbf = true;

    match decode::<Claims>(token, &key, &validation) {
        Ok(data) => Ok(data.claims),
        Err(e) => match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => Err(JwtError::Expired),
            jsonwebtoken::errors::ErrorKind::ImmatureSignature => Err(JwtError::NotYetValid),
            _ => Err(JwtError::InvalidToken(e.to_string())),
        },
    }
}

/// Validates a token and additionally requires it to be an access token
///
/// Refresh tokens are rejected here so they cannot be used for API calls.
pub fn validate_access_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let claims = validate_token(token, secret)?;

    if claims.token_type != TokenType::Access {
        return Err(JwtError::WrongTokenType {
            expected: TokenType::Access.to_string(),
            actual: claims.token_type.to_string(),
        });
    }

    Ok(claims)
}

/// Validates a token and additionally requires it to be a refresh token
pub fn validate_refresh_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let claims = validate_token(token, secret)?;

    if claims.token_type != TokenType::Refresh {
        return Err(JwtError::WrongTokenType {
            expected: TokenType::Refresh.to_string(),
            actual: claims.token_type.to_string(),
        });
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-chars-long";

    fn sample_claims(token_type: TokenType) -> Claims {
        Claims::new(
            Uuid::new_v4(),
            Some(Uuid::new_v4()),
            UserRole::Staff,
            "testuser".to_string(),
            token_type,
        )
    }

    #[test]
    fn test_create_and_validate_token() {
        let claims = sample_claims(TokenType::Access);
        let token = create_token(&claims, SECRET).unwrap();

        let decoded = validate_token(&token, SECRET).unwrap();
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.vendor_id, claims.vendor_id);
        assert_eq!(decoded.role, UserRole::Staff);
        assert_eq!(decoded.username, "testuser");
        assert_eq!(decoded.token_type, TokenType::Access);
        assert_eq!(decoded.iss, "storefront");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let claims = sample_claims(TokenType::Access);
        let token = create_token(&claims, SECRET).unwrap();

        let result = validate_token(&token, "a-different-secret-that-is-long-enough");
        assert!(matches!(result, Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn test_access_token_lifetime() {
        let claims = sample_claims(TokenType::Access);
        let lifetime = claims.exp - claims.iat;
        assert_eq!(lifetime, 24 * 60 * 60);
    }

    #[test]
    fn test_refresh_token_lifetime() {
        let claims = sample_claims(TokenType::Refresh);
        let lifetime = claims.exp - claims.iat;
        assert_eq!(lifetime, 30 * 24 * 60 * 60);
    }

    #[test]
    fn test_refresh_token_rejected_for_access() {
        let claims = sample_claims(TokenType::Refresh);
        let token = create_token(&claims, SECRET).unwrap();

        assert!(matches!(
            validate_access_token(&token, SECRET),
            Err(JwtError::WrongTokenType { .. })
        ));
    }

    #[test]
    fn test_access_token_rejected_for_refresh() {
        let claims = sample_claims(TokenType::Access);
        let token = create_token(&claims, SECRET).unwrap();

        assert!(matches!(
            validate_refresh_token(&token, SECRET),
            Err(JwtError::WrongTokenType { .. })
        ));
    }

    #[test]
    fn test_expired_token() {
        let mut claims = sample_claims(TokenType::Access);
        claims.iat = Utc::now().timestamp() - 7200;
        claims.nbf = claims.iat;
        claims.exp = Utc::now().timestamp() - 3600;

        let token = create_token(&claims, SECRET).unwrap();
        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::Expired)));
    }

    #[test]
    fn test_platform_user_without_vendor() {
        let claims = Claims::new(
            Uuid::new_v4(),
            None,
            UserRole::Owner,
            "admin".to_string(),
            TokenType::Access,
        );
        let token = create_token(&claims, SECRET).unwrap();

        let decoded = validate_token(&token, SECRET).unwrap();
        assert!(decoded.vendor_id.is_none());
    }
}
