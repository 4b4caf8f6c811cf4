use axum::extract::{FromRef, FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::CookieJar;

use crate::app::AppState;
use crate::auth::models::AuthenticatedUser;
use crate::auth::token::{TokenService, SESSION_COOKIE};
use crate::error::AppError;

/// Pull the session token from the `token` cookie, falling back to a Bearer header.
pub fn token_from_parts(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
}

/// Resolve the caller, or fail with 401.
pub fn authenticate(parts: &Parts, tokens: &TokenService) -> Result<AuthenticatedUser, AppError> {
    let token =
        token_from_parts(parts).ok_or_else(|| AppError::Auth("Unauthorised user!".into()))?;
    tokens.verify(&token)
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Set by `require_admin` when it already ran.
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(user.clone());
        }
        let state = AppState::from_ref(state);
        authenticate(parts, &state.tokens)
    }
}

/// Route layer for `/api/admin`: 401 without a session, 403 for non-admins.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = request.into_parts();
    let user = authenticate(&parts, &state.tokens)?;

    if !user.role.is_admin() {
        tracing::warn!(user_id = %user.id, path = %parts.uri.path(), "non-admin hit admin route");
        return Err(AppError::Forbidden("Admin access required".into()));
    }

    parts.extensions.insert(user);
    Ok(next.run(Request::from_parts(parts, body)).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;

    fn parts(header: (&str, &str)) -> Parts {
        let (parts, _) = HttpRequest::builder()
            .uri("/api/admin/services/get")
            .header(header.0, header.1)
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[test]
    fn test_token_from_cookie() {
        let p = parts(("cookie", "theme=dark; token=abc.def.ghi"));
        assert_eq!(token_from_parts(&p).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_token_from_bearer() {
        let p = parts(("authorization", "Bearer abc.def.ghi"));
        assert_eq!(token_from_parts(&p).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_missing_token_is_unauthorized() {
        let p = parts(("accept", "application/json"));
        let tokens = TokenService::new("secret", 60);
        assert!(matches!(
            authenticate(&p, &tokens),
            Err(AppError::Auth(_))
        ));
    }
}
