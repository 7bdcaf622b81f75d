//! Clientes Backend
//!
//! REST backend for a client-roster application: validated registration,
//! roster CRUD, spreadsheet exports and remote sheet sync, with
//! authentication delegated to an external identity provider.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod export;
mod models;
mod sheets;
mod validation;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use auth::{IdentityProvider, SessionStore};
use config::Config;
use db::Repository;
use sheets::SheetsSync;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub sheets: Arc<SheetsSync>,
    pub sessions: Arc<SessionStore>,
    pub identity: Option<Arc<IdentityProvider>>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Clientes Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if the identity provider is not configured
    if config.auth_api_key.is_none() {
        tracing::warn!(
            "No identity provider key configured (CLIENTES_AUTH_API_KEY). Authentication is disabled!"
        );
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    // Create application state
    let state = build_state(repo, config);

    // Build router
    let app = create_router(state.clone());

    // Start server
    let listener = tokio::net::TcpListener::bind(&state.config.bind_addr).await?;
    tracing::info!("Server listening on {}", state.config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Assemble shared state from a repository and configuration.
pub fn build_state(repo: Arc<Repository>, config: Config) -> AppState {
    let sheets = Arc::new(SheetsSync::new(
        config.sheets_api_base.clone(),
        config.sheets_view_base.clone(),
    ));

    let identity = config
        .auth_api_key
        .clone()
        .map(|key| Arc::new(IdentityProvider::new(config.auth_api_base.clone(), key)));

    AppState {
        repo,
        sheets,
        sessions: Arc::new(SessionStore::new()),
        identity,
        config: Arc::new(config),
    }
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone session state for the auth layer
    let sessions = state.sessions.clone();
    let auth_enabled = state.identity.is_some();

    // Session-guarded API routes
    let api_routes = Router::new()
        // Datastore
        .route("/datastore", get(api::get_datastore))
        .route("/datastore/revision", get(api::get_revision))
        // Clients
        .route("/clients", get(api::list_clients))
        .route("/clients", post(api::create_client))
        .route("/clients/export/csv", get(api::export_csv))
        .route("/clients/export/xlsx", get(api::export_xlsx))
        .route("/clients/{id}", get(api::get_client))
        .route("/clients/{id}", put(api::update_client))
        .route("/clients/{id}", delete(api::delete_client))
        // Spreadsheet sync
        .route("/sheets/status", get(api::sheets_status))
        .route("/sheets/connect", post(api::sheets_connect))
        .route("/sheets/sync", post(api::sheets_sync))
        .route("/sheets/disconnect", post(api::sheets_disconnect))
        // Apply session auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::session_auth_layer(sessions.clone(), auth_enabled, req, next)
        }));

    // Auth routes manage their own sessions (no guard)
    let auth_routes = Router::new()
        .route("/auth/signup", post(api::signup))
        .route("/auth/login", post(api::login))
        .route("/auth/reset", post(api::reset_password))
        .route("/auth/logout", post(api::logout))
        .route("/auth/me", get(api::me));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes.merge(auth_routes))
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
