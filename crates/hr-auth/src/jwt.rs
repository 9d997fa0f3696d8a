//! JWT access tokens

use chrono::Utc;
use hr_core::traits::Id;
use hr_models::{Role, UserProfile};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub role: Role,
    pub approved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Server-side session backing this token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn user_id(&self) -> Result<Id, JwtError> {
        self.sub
            .parse()
            .map_err(|_| JwtError::Invalid("Invalid user ID in token".to_string()))
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Token is expired")]
    Expired,
    #[error("Invalid token: {0}")]
    Invalid(String),
    #[error("Missing token")]
    Missing,
    #[error("Token encoding failed: {0}")]
    EncodingFailed(String),
}

impl From<JwtError> for hr_core::error::HrError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::EncodingFailed(message) => hr_core::error::HrError::Internal(message),
            other => hr_core::error::HrError::Unauthorized {
                message: other.to_string(),
            },
        }
    }
}

/// Creates and validates HS256 tokens
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expires_in_seconds: i64,
}

impl JwtService {
    pub fn new(secret: &[u8], expires_in_seconds: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            expires_in_seconds,
        }
    }

    pub fn expires_in_seconds(&self) -> i64 {
        self.expires_in_seconds
    }

    /// Token for `profile`, bound to session `sid`
    pub fn create_token(&self, profile: &UserProfile, sid: Option<String>) -> Result<String, JwtError> {
        let now = Utc::now().timestamp().max(0) as usize;
        let claims = Claims {
            sub: profile.id.to_string(),
            role: profile.role,
            approved: profile.approved,
            branch: profile.branch_scope().map(str::to_string),
            sid,
            exp: now + self.expires_in_seconds.max(0) as usize,
            iat: now,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(e.to_string()),
            })?;

        Ok(token_data.claims)
    }
}

/// Extract bearer token from an Authorization header value
pub fn extract_bearer_token(authorization: &str) -> Option<&str> {
    let (scheme, token) = authorization.trim().split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() {
        Some(token.trim())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        let mut profile = UserProfile::registered("ap@example.com", None, String::new());
        profile.role = Role::Approver;
        profile.approved = true;
        profile.branch_id = Some("Bole".into());
        profile
    }

    #[test]
    fn test_create_and_validate_token() {
        let service = JwtService::new(b"test-secret-key-at-least-32-bytes", 3600);
        let profile = profile();

        let token = service.create_token(&profile, Some("sid-1".into())).unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), profile.id);
        assert_eq!(claims.role, Role::Approver);
        assert!(claims.approved);
        assert_eq!(claims.branch.as_deref(), Some("Bole"));
        assert_eq!(claims.sid.as_deref(), Some("sid-1"));
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = JwtService::new(b"first-secret-key-of-enough-length", 3600)
            .create_token(&profile(), None)
            .unwrap();
        let err = JwtService::new(b"other-secret-key-of-enough-length", 3600)
            .validate_token(&token)
            .unwrap_err();
        assert!(matches!(err, JwtError::Invalid(_)));
    }

    #[test]
    fn test_expired_token() {
        // Past the default 60s leeway
        let service = JwtService::new(b"test-secret-key-at-least-32-bytes", 0);
        let mut claims = service
            .validate_token(&service.create_token(&profile(), None).unwrap())
            .unwrap();
        claims.exp = claims.iat.saturating_sub(600);
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret-key-at-least-32-bytes"),
        )
        .unwrap();
        assert!(matches!(service.validate_token(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("Basic abc123"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
    }
}
