use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::models::{AuthenticatedUser, Claims};
use crate::error::AppError;

/// Name of the http-only session cookie.
pub const SESSION_COOKIE: &str = "token";

/// Issues and verifies HS256 session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, user: &AuthenticatedUser) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            user_name: user.user_name.clone(),
            role: user.role,
            iat: now.timestamp() as usize,
            exp: (now + self.ttl).timestamp() as usize,
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {e}")))
    }

    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims.into())
            .map_err(|_| AppError::Auth("Unauthorised user!".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Role;

    fn user() -> AuthenticatedUser {
        AuthenticatedUser {
            id: "64b7f0c2a1b2c3d4e5f60718".into(),
            user_name: "ada".into(),
            email: "ada@example.com".into(),
            role: Role::Admin,
        }
    }

    #[test]
    fn test_issue_then_verify() {
        let tokens = TokenService::new("secret", 60);
        let token = tokens.issue(&user()).unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), user());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = TokenService::new("secret", 60).issue(&user()).unwrap();
        let result = TokenService::new("other", 60).verify(&token);
        assert!(matches!(result, Err(AppError::Auth(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = TokenService::new("secret", -10);
        let token = tokens.issue(&user()).unwrap();
        assert!(tokens.verify(&token).is_err());
    }
}
