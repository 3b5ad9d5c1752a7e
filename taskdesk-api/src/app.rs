/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskdesk_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = taskdesk_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskdesk_shared::auth::middleware::authenticate;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Room for multipart boundaries and headers on top of the avatar itself
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

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
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Secret used to sign and verify session tokens
    pub fn token_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET    /health                 # Health check (public)
/// ├── /users
/// │   ├── POST   /                   # Sign up (public)
/// │   ├── POST   /login              # Log in (public)
/// │   ├── GET    /:id/avatar         # Avatar image (public)
/// │   ├── POST   /logout             # bearer
/// │   ├── POST   /logoutAll          # bearer
/// │   ├── GET|PATCH|DELETE /me       # bearer
/// │   └── POST|DELETE /me/avatar     # bearer
/// └── /tasks                         # bearer
///     ├── POST   /
///     ├── GET    /
///     └── GET|PATCH|DELETE /:id
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Authentication (`route_layer` on protected routes only, so unknown
///    paths still 404)
/// 2. Logging (tower-http TraceLayer)
/// 3. CORS (tower-http CorsLayer)
/// 4. Security headers
pub fn build_router(state: AppState) -> Router {
    use crate::routes::{health, tasks, users};

    let avatar_body_limit =
        DefaultBodyLimit::max(state.config.avatar.max_bytes + MULTIPART_OVERHEAD_BYTES);

    // Public routes (no auth)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/users", post(users::signup))
        .route("/users/login", post(users::login))
        .route("/users/:id/avatar", get(users::get_avatar));

    // Protected routes (bearer token required)
    let protected_routes = Router::new()
        .route("/users/logout", post(users::logout))
        .route("/users/logoutAll", post(users::logout_all))
        .route(
            "/users/me",
            get(users::me)
                .patch(users::update_me)
                .delete(users::delete_me),
        )
        .route(
            "/users/me/avatar",
            post(users::upload_avatar)
                .delete(users::delete_avatar)
                .layer(avatar_body_limit),
        )
        .route("/tasks", post(tasks::create_task).get(tasks::list_tasks))
        .route(
            "/tasks/:id",
            get(tasks::get_task)
                .patch(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_layer));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        // Development mode: permissive CORS
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
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Bearer authentication layer
///
/// Resolves the token to a user and injects `AuthContext` into request
/// extensions. Every failure is a 401 "Please authenticate.".
async fn auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = authenticate(&state.db, state.token_secret(), req.headers()).await?;

    tracing::debug!(user_id = %auth.user.id, "Request authenticated");
    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}
