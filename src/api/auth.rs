//! Authentication gate and account endpoints.
//!
//! A request is authenticated when it carries a session cookie whose token
//! resolves to a live session. Handlers that take [`AuthenticatedUser`] are
//! unreachable otherwise and answer 401.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::app::App;
use crate::config::ServerConfig;
use crate::managers::session_manager::{SessionManager, SessionManagerTrait};
use crate::managers::user_manager::{UserManager, UserManagerTrait};
use crate::services::crypto_service::CryptoServiceTrait;
use crate::types::errors::{CryptoError, UserError};
use crate::types::session::SESSION_COOKIE;
use crate::types::user::{normalize_email, LoginRequest, SignupRequest, UserProfile};

/// The user behind a valid session cookie.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

impl FromRequestParts<App> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, app: &App) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty())
            .ok_or_else(ApiError::unauthorized)?;

        let session = app.with_db(|conn| SessionManager::new(conn, &app.crypto).resolve(&token))?;

        Ok(AuthenticatedUser {
            user_id: session.user_id,
        })
    }
}

fn session_cookie(token: String, config: &ServerConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies)
        .build()
}

fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

/// Runs password hashing work off the async workers.
///
/// Callers must not hold the database lock while this runs.
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {}", e)))?
}

fn crypto_failure(err: CryptoError) -> ApiError {
    UserError::CryptoError(err.to_string()).into()
}

fn login_rejected() -> ApiError {
    tracing::warn!("login rejected");
    UserError::InvalidCredentials.into()
}

/// `POST /api/auth/signup`: creates an account and logs it in.
pub async fn signup(
    State(app): State<App>,
    jar: CookieJar,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, CookieJar, Json<UserProfile>), ApiError> {
    let Json(request) = payload?;
    let account = request.validate().map_err(ApiError::Validation)?;

    // Skip the hash for an email that is already registered
    let existing =
        app.with_db(|conn| UserManager::new(conn, &app.crypto).find_by_email(&account.email))?;
    if existing.is_some() {
        return Err(UserError::EmailTaken(account.email).into());
    }

    let crypto = Arc::clone(&app.crypto);
    let password = request.password;
    let password_hash =
        run_blocking(move || crypto.hash_password(&password).map_err(crypto_failure)).await?;

    let (profile, token) = app.with_db(|conn| -> Result<_, ApiError> {
        let user = UserManager::new(conn, &app.crypto).create_user(&account, &password_hash)?;
        let (token, _) = SessionManager::new(conn, &app.crypto)
            .create_session(&user.id, app.config.session_ttl_secs)?;
        Ok((user.profile(), token))
    })?;

    tracing::info!(user_id = %profile.id, "account created");
    let jar = jar.add(session_cookie(token, &app.config));
    Ok((StatusCode::CREATED, jar, Json(profile)))
}

/// `POST /api/auth/login`: checks credentials and starts a session.
pub async fn login(
    State(app): State<App>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<UserProfile>), ApiError> {
    let Json(request) = payload?;
    let email = normalize_email(&request.email).map_err(|_| login_rejected())?;

    let user = app
        .with_db(|conn| UserManager::new(conn, &app.crypto).find_by_email(&email))?
        .ok_or_else(login_rejected)?;

    let crypto = Arc::clone(&app.crypto);
    let encoded = user.password_hash.clone();
    let password = request.password;
    let valid = run_blocking(move || {
        crypto
            .verify_password(&encoded, &password)
            .map_err(crypto_failure)
    })
    .await?;
    if !valid {
        return Err(login_rejected());
    }

    let token = app.with_db(|conn| -> Result<_, ApiError> {
        let mut sessions = SessionManager::new(conn, &app.crypto);
        let purged = sessions.purge_expired()?;
        if purged > 0 {
            tracing::debug!(purged, "removed expired sessions");
        }
        let (token, _) = sessions.create_session(&user.id, app.config.session_ttl_secs)?;
        Ok(token)
    })?;

    tracing::info!(user_id = %user.id, "logged in");
    let jar = jar.add(session_cookie(token, &app.config));
    Ok((jar, Json(user.profile())))
}

/// `POST /api/auth/logout`: revokes the current session, if any, and clears the cookie.
pub async fn logout(
    State(app): State<App>,
    jar: CookieJar,
) -> Result<(StatusCode, CookieJar), ApiError> {
    if let Some(token) = jar.get(SESSION_COOKIE).map(|c| c.value().to_string()) {
        let revoked =
            app.with_db(|conn| SessionManager::new(conn, &app.crypto).revoke(&token))?;
        if revoked {
            tracing::info!("logged out");
        }
    }
    Ok((StatusCode::NO_CONTENT, jar.remove(removal_cookie())))
}

/// `GET /api/auth/me`: profile of the logged-in user.
pub async fn me(
    State(app): State<App>,
    user: AuthenticatedUser,
) -> Result<Json<UserProfile>, ApiError> {
    let found = app.with_db(|conn| UserManager::new(conn, &app.crypto).get_user(&user.user_id))?;
    Ok(Json(found.profile()))
}
