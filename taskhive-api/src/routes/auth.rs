/// Authentication endpoints
///
/// - `POST /v1/auth/register` - Register a new manager
/// - `POST /v1/auth/login` - Verify credentials and open a session
///
/// Login answers with the session token in the body for API clients and in
/// an `HttpOnly` cookie for browsers. Both are accepted by the session
/// middleware.

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::State,
    http::{header, StatusCode},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskhive_shared::models::user::{RegisterRequest, UserInfo};

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Session token (JWT)
    pub token: String,

    pub expires_at: DateTime<Utc>,

    pub user_info: UserInfo,
}

/// Register a new manager
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/register
/// Content-Type: application/json
///
/// {
///   "email": "pm@example.com",
///   "password": "pw1",
///   "first_name": "Ada",
///   "last_name": "Lovelace"
/// }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `409 Conflict`: Email already registered
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserInfo>)> {
    let user = state.services.users.register(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Login endpoint
///
/// # Response
///
/// ```text
/// Set-Cookie: taskhive_session=eyJ...; HttpOnly; Path=/; SameSite=Lax; Max-Age=86400
///
/// { "token": "eyJ...", "expires_at": "...", "user_info": { ... } }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or wrong password, indistinguishably
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<([(header::HeaderName, String); 1], Json<LoginResponse>)> {
    let credentials = &state.services.credentials;
    let (user_info, session) = credentials.login(&req.email, &req.password).await?;

    let cookie = session_cookie(
        &state.session.cookie_name,
        &session.token,
        credentials.session_ttl().num_seconds(),
        state.config.api.production,
    );

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            token: session.token,
            expires_at: session.expires_at,
            user_info,
        }),
    ))
}

/// Formats the `Set-Cookie` value for a session token
pub fn session_cookie(name: &str, token: &str, max_age_seconds: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        name, token, max_age_seconds
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_format() {
        assert_eq!(
            session_cookie("taskhive_session", "abc", 3600, false),
            "taskhive_session=abc; HttpOnly; Path=/; SameSite=Lax; Max-Age=3600"
        );
        assert!(session_cookie("s", "abc", 60, true).ends_with("; Secure"));
    }
}
