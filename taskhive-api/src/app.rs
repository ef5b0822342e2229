/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskhive_api::{app::AppState, config::Config};
/// use taskhive_shared::services::{credentials::TokenSettings, ServiceDeps, Services};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let services = Services::build(ServiceDeps::postgres(
///     pool.clone(),
///     TokenSettings::new(config.session.secret.clone()),
/// ));
/// let state = AppState::new(pool, config, services);
/// let app = taskhive_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskhive_shared::{
    auth::middleware::{session_auth_middleware, SessionSettings},
    services::Services,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Domain services
    pub services: Services,

    /// Session token verification settings
    pub session: SessionSettings,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, services: Services) -> Self {
        let session = SessionSettings::new(config.session.secret.clone())
            .with_cookie_name(config.session.cookie_name.clone());

        Self {
            db,
            config: Arc::new(config),
            services,
            session,
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                   # Health check (public)
/// └── /v1/
///     ├── /auth/                # Public
///     │   ├── POST /register
///     │   └── POST /login
///     ├── /users/               # Session required
///     │   ├── POST   /devs
///     │   ├── GET    /devs
///     │   └── DELETE /:id
///     ├── /projects/            # Session required
///     │   ├── POST   /
///     │   ├── GET    /          (?scope=assigned for a worker's own projects)
///     │   ├── GET    /:id
///     │   ├── DELETE /:id
///     │   ├── POST   /:id/devs
///     │   └── GET    /:id/devs
///     └── /holidays/            # Session required
///         ├── POST   /
///         ├── GET    /
///         └── DELETE /:id
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Session authentication (protected routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    let user_routes = Router::new()
        .route(
            "/devs",
            post(routes::users::create_dev).get(routes::users::list_devs),
        )
        .route("/:id", delete(routes::users::delete_user));

    let project_routes = Router::new()
        .route(
            "/",
            post(routes::projects::create_project).get(routes::projects::list_projects),
        )
        .route(
            "/:id",
            get(routes::projects::get_project).delete(routes::projects::delete_project),
        )
        .route(
            "/:id/devs",
            post(routes::projects::assign_devs).get(routes::projects::list_project_devs),
        );

    let holiday_routes = Router::new()
        .route(
            "/",
            post(routes::holidays::create_holiday).get(routes::holidays::list_holidays),
        )
        .route("/:id", delete(routes::holidays::delete_holiday));

    let protected_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/projects", project_routes)
        .nest("/holidays", holiday_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.session.clone(),
            session_auth_middleware,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(protected_routes);

    // Configure CORS based on environment
    let cors = if state.config.allows_any_origin() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}
