//! Authentication: signup, login, logout, and the request extractor that
//! resolves the current user from the session cookie.
//!
//! Failure responses are intentionally generic. Login returns one message
//! for unknown email and wrong password, and every token problem collapses
//! to the same 401, so responses cannot be used to enumerate accounts.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, HeaderName, StatusCode},
    Json,
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;

use crate::api::error::{ApiError, ErrorCode};
use crate::api::token;
use crate::config::AuthConfig;
use crate::db::{users, LoginRequest, MessageResponse, SignupRequest};
use crate::AppState;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "token";

const MIN_PASSWORD_LEN: usize = 6;

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

fn session_cookie(token: &str, auth: &AuthConfig) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        auth.token_ttl_secs
    );
    if auth.secure_cookies {
        cookie.push_str("; Secure");
    }
    cookie
}

/// An expired, empty value. Advisory to the browser only: copies of a
/// still-valid token held elsewhere keep working until they expire.
fn clear_session_cookie(auth: &AuthConfig) -> String {
    let mut cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if auth.secure_cookies {
        cookie.push_str("; Secure");
    }
    cookie
}

fn invalid_credentials() -> ApiError {
    ApiError::unauthorized("Invalid credentials")
}

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    if request.email.is_empty() || request.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(
            "Email and a password of at least 6 characters are required",
        ));
    }

    let password_hash = hash_password(&request.password).map_err(|err| {
        tracing::error!(error = %err, "Password hashing failed");
        ApiError::internal("An internal server error occurred")
    })?;

    // The UNIQUE constraint on users.email decides the duplicate case, so a
    // concurrent signup with the same address cannot slip past a pre-check
    let user = users::create(&state.db, &request.email, &password_hash)
        .await
        .map_err(|err| {
            let api: ApiError = err.into();
            if api.code() == ErrorCode::Conflict {
                ApiError::conflict("User already exists")
            } else {
                api
            }
        })?;

    tracing::info!(user_id = user.id, "User created");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User created successfully")),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<([(HeaderName, String); 1], Json<MessageResponse>), ApiError> {
    if request.email.is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    // Unknown email and wrong password must be indistinguishable
    let user = users::find_by_email(&state.db, &request.email)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !verify_password(&request.password, &user.password_hash) {
        return Err(invalid_credentials());
    }

    let token = token::issue(
        &state.config.auth.token_secret,
        user.id,
        state.config.auth.token_ttl_secs,
    )
    .map_err(|err| {
        tracing::error!(error = %err, "Session token issuance failed");
        ApiError::internal("An internal server error occurred")
    })?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok((
        [(header::SET_COOKIE, session_cookie(&token, &state.config.auth))],
        Json(MessageResponse::new("Login successful")),
    ))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
) -> ([(HeaderName, String); 1], Json<MessageResponse>) {
    (
        [(header::SET_COOKIE, clear_session_cookie(&state.config.auth))],
        Json(MessageResponse::new("Logout successful")),
    )
}

/// The authenticated user id, resolved from the session cookie.
///
/// This extractor is the single authorization enforcement point: protected
/// handlers take a `CurrentUser` and never accept a caller-supplied user id.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub i64);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_owned())
            .ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

        let user_id = token::verify(&state.config.auth.token_secret, &token)
            .ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

        Ok(CurrentUser(user_id))
    }
}
