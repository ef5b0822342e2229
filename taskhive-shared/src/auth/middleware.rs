/// Session authentication middleware for Axum
///
/// The middleware reads the session token from the `Authorization: Bearer`
/// header or, failing that, from the session cookie. After validation it
/// attaches the caller's [`IdentityContext`] to the request extensions, once,
/// before any handler runs. Handlers take `IdentityContext` as an extractor.
///
/// # Example
///
/// ```no_run
/// use axum::{Router, routing::get, middleware};
/// use taskhive_shared::auth::context::IdentityContext;
/// use taskhive_shared::auth::middleware::{session_auth_middleware, SessionSettings};
///
/// async fn whoami(identity: IdentityContext) -> String {
///     format!("{} ({})", identity.user_id, identity.role)
/// }
///
/// let app: Router = Router::new()
///     .route("/whoami", get(whoami))
///     .layer(middleware::from_fn_with_state(SessionSettings::new("secret"), session_auth_middleware));
/// ```

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::context::{IdentityContext, RequestScope};
use super::jwt::{read_session, JwtError};

/// Default name of the session cookie
pub const DEFAULT_COOKIE_NAME: &str = "taskhive_session";

/// Token validation settings shared by the middleware and the login route
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// JWT signing secret
    pub secret: String,

    /// Cookie carrying the token for browser clients
    pub cookie_name: String,
}

impl SessionSettings {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
        }
    }

    pub fn with_cookie_name(mut self, cookie_name: impl Into<String>) -> Self {
        self.cookie_name = cookie_name.into();
        self
    }
}

/// Error type for authentication middleware
#[derive(Debug)]
pub enum AuthError {
    /// No bearer token and no session cookie
    MissingCredentials,

    /// Invalid authorization header format
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),
}

/// Rejections use the same `{error, message}` JSON body as the API's own
/// errors.
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AuthError::MissingCredentials => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Missing credentials".to_string(),
            ),
            AuthError::InvalidFormat(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
        };

        (status, Json(json!({ "error": error, "message": message }))).into_response()
    }
}

/// Extracts the raw session token from a request's headers
///
/// The `Authorization` header wins over the cookie when both are present.
pub fn extract_token<'a>(headers: &'a HeaderMap, cookie_name: &str) -> Result<&'a str, AuthError> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let value = value
            .to_str()
            .map_err(|_| AuthError::InvalidFormat("Invalid authorization header".to_string()))?;
        return value
            .strip_prefix("Bearer ")
            .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()));
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
        .ok_or(AuthError::MissingCredentials)
}

/// Validates the request's session token and returns the caller's identity
pub fn authenticate_headers(
    headers: &HeaderMap,
    settings: &SessionSettings,
) -> Result<IdentityContext, AuthError> {
    let token = extract_token(headers, &settings.cookie_name)?;

    read_session(token, &settings.secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer { .. } => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken("Invalid token".to_string()),
    })
}

/// Session authentication middleware
///
/// # Errors
///
/// Returns 401 Unauthorized if:
/// - Neither a bearer token nor a session cookie is present
/// - Token validation fails or the token has expired
///
/// Returns 400 Bad Request if the Authorization header is not a Bearer token.
pub async fn session_auth_middleware(
    State(settings): State<SessionSettings>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let identity = authenticate_headers(req.headers(), &settings)?;

    let scope = req
        .extensions()
        .get::<RequestScope>()
        .cloned()
        .unwrap_or_default()
        .attach(identity);
    req.extensions_mut().insert(scope);

    Ok(next.run(req).await)
}

/// Handlers receive the identity attached by the middleware
///
/// A missing identity means the route was mounted without the session
/// middleware; the request is refused rather than served anonymously.
#[async_trait]
impl<S> FromRequestParts<S> for IdentityContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestScope>()
            .and_then(RequestScope::try_identity)
            .ok_or(AuthError::MissingCredentials)
    }
}
