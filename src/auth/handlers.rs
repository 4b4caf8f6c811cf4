use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::envelope::{json_body, Envelope};
use crate::app::AppState;
use crate::auth::models::{AuthenticatedUser, Role};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::SESSION_COOKIE;
use crate::db::models::{new_id, required, User};
use crate::db::repository::UserRepository;
use crate::error::AppError;

const MIN_PASSWORD_LEN: usize = 8;

/// Register request body.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login request body.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

fn to_authenticated(user: &User) -> AuthenticatedUser {
    AuthenticatedUser {
        id: user.id.clone(),
        user_name: user.user_name.clone(),
        email: user.email.clone(),
        role: user.role,
    }
}

/// Create an account with the given role.
pub async fn register_user(
    users: &dyn UserRepository,
    request: RegisterRequest,
    role: Role,
) -> Result<AuthenticatedUser, AppError> {
    let user_name = required(request.user_name, "userName")?;
    let email = required(request.email, "email")?.trim().to_lowercase();
    let password = required(request.password, "password")?;

    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if users.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict(
            "User already exists with the same email".into(),
        ));
    }

    let user = users
        .insert_user(User {
            id: new_id(),
            user_name,
            email,
            password_hash: hash_password(&password)?,
            role,
            created_at: Utc::now(),
        })
        .await?;

    tracing::info!(user_id = %user.id, role = %user.role, "user registered");
    Ok(to_authenticated(&user))
}

/// Check credentials. Unknown email and wrong password are indistinguishable to the caller.
pub async fn login_user(
    users: &dyn UserRepository,
    request: LoginRequest,
) -> Result<AuthenticatedUser, AppError> {
    let email = required(request.email, "email")?.trim().to_lowercase();
    let password = required(request.password, "password")?;

    let user = users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::Auth("Invalid email or password".into()))?;

    if !verify_password(&password, &user.password_hash)? {
        return Err(AppError::Auth("Invalid email or password".into()));
    }

    Ok(to_authenticated(&user))
}

/// Create the bootstrap admin account unless the email is already taken.
pub async fn ensure_admin(
    users: &dyn UserRepository,
    email: &str,
    password: &str,
) -> Result<(), AppError> {
    if users.find_by_email(&email.to_lowercase()).await?.is_some() {
        tracing::info!("Admin account '{}' already exists, skipping.", email);
        return Ok(());
    }

    register_user(
        users,
        RegisterRequest {
            user_name: Some("admin".into()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        },
        Role::Admin,
    )
    .await?;
    Ok(())
}

fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    let max_age = time::Duration::seconds(state.tokens.ttl().num_seconds());
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(state.config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .build()
}

/// `POST /api/auth/register`
pub async fn register_handler(
    State(state): State<AppState>,
    body: Result<axum::Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, axum::Json<Envelope<AuthenticatedUser>>), AppError> {
    let user = register_user(state.users.as_ref(), json_body(body)?, Role::User).await?;
    Ok((StatusCode::CREATED, axum::Json(Envelope::data(user))))
}

/// `POST /api/auth/login`
///
/// On success, sets the http-only `token` cookie and returns the user info.
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<axum::Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, axum::Json<Envelope<AuthenticatedUser>>), AppError> {
    let user = login_user(state.users.as_ref(), json_body(body)?).await?;
    let token = state.tokens.issue(&user)?;

    tracing::info!(user_id = %user.id, "login");
    let jar = jar.add(session_cookie(&state, token));
    Ok((jar, axum::Json(Envelope::data(user))))
}

/// `POST /api/auth/logout` clears the session cookie.
pub async fn logout_handler(jar: CookieJar) -> (CookieJar, axum::Json<Envelope<()>>) {
    let cookie = Cookie::build((SESSION_COOKIE, "")).path("/").removal().build();
    (
        jar.remove(cookie),
        axum::Json(Envelope::message("Logged out successfully")),
    )
}

/// `GET /api/auth/check-auth` returns the user behind the current session.
pub async fn check_auth_handler(user: AuthenticatedUser) -> axum::Json<Envelope<AuthenticatedUser>> {
    axum::Json(Envelope::data(user))
}
