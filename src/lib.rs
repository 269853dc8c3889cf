//! DevForge - content API, admin tooling and typed client for a
//! student-project agency site

pub mod admin;
pub mod client;
pub mod config;
pub mod contact;
pub mod db;
pub mod display;
pub mod envelope;
pub mod errors;
pub mod logging;
pub mod models;
pub mod notify;
pub mod routes;
pub mod state;
pub mod store;
pub mod validation;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    services::ServeDir, trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::models::{PortfolioItem, TeamMember, Template};
use crate::state::AppState;
use crate::store::Stores;

/// Request body cap: the 5 MB image limit plus multipart framing.
pub const MAX_BODY_SIZE: usize = 6 * 1024 * 1024;

/// Origins that are not valid header values are skipped with a warning.
pub fn cors_origins(allowed: &[String]) -> Vec<HeaderValue> {
    allowed
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect()
}

pub fn configure_cors(config: &AppConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(cors_origins(&config.allowed_origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/verify", get(routes::auth::verify))
        .route("/admin/stats", get(routes::admin::stats))
        .merge(routes::admin::collection_routes::<Template>())
        .merge(routes::admin::collection_routes::<PortfolioItem>())
        .merge(routes::admin::collection_routes::<TeamMember>())
        .route("/admin/contacts", get(routes::admin::list_contacts))
        .route("/admin/contacts/{id}", delete(routes::admin::delete_contact))
        .route("/admin/contacts/{id}/read", put(routes::admin::mark_contact_read))
        .route(
            "/admin/upload",
            post(routes::upload::upload_image).layer(DefaultBodyLimit::max(MAX_BODY_SIZE)),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            routes::auth::require_admin,
        ))
}

/// Create and configure the application router.
pub fn create_app(state: AppState) -> Router {
    let cors = configure_cors(&state.config);
    let uploads = ServeDir::new(&state.config.upload_dir);

    Router::new()
        .route("/", get(routes::public::banner))
        .route("/api/templates", get(routes::public::list::<Template>))
        .route("/api/templates/{id}", get(routes::public::get_template))
        .route("/api/portfolio", get(routes::public::list::<PortfolioItem>))
        .route("/api/team", get(routes::public::list::<TeamMember>))
        .route("/api/contact", post(routes::public::submit_contact))
        .route("/health", get(routes::health::health_ping))
        .route("/health/detailed", get(routes::health::health_detailed))
        .route("/health/ready", get(routes::health::health_ready))
        .merge(admin_routes(&state))
        .nest_service("/uploads", uploads)
        .with_state(state)
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(cors)
}

/// Picks the content store: Postgres when `DATABASE_URL` is set, in-memory
/// otherwise. Outside production an unreachable database also falls back to
/// memory so local development keeps working.
pub async fn build_stores(config: &AppConfig) -> anyhow::Result<Stores> {
    let Some(url) = config.database_url.clone() else {
        tracing::info!("DATABASE_URL not set. Using the in-memory store.");
        return Ok(Stores::in_memory());
    };

    let db_config = db::DbConfig {
        url,
        ..db::DbConfig::default()
    };

    let pool = match db::init_pool(&db_config).await {
        Ok(pool) => pool,
        Err(e) if !config.is_production() => {
            tracing::warn!(
                "Failed to initialize database pool: {}. Continuing with the in-memory store.",
                e
            );
            return Ok(Stores::in_memory());
        }
        Err(e) => return Err(e).context("failed to connect to the database"),
    };

    db::run_migrations(&pool)
        .await
        .context("failed to run database migrations")?;

    Ok(db::stores(pool))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Run the server (used by main).
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("invalid configuration")?;

    // Guards must live until the server stops or buffered log lines are lost.
    let _log_guards = logging::init(&config.logging);

    routes::health::init_start_time();
    config.check()?;

    let stores = build_stores(&config).await?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid HOST/PORT: {}:{}", config.host, config.port))?;

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("failed to create {}", config.upload_dir.display()))?;

    let state = AppState::new(config, stores);
    tracing::info!(provider = state.notifier.provider_name(), "Contact notifications configured");
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Starting server on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    Ok(())
}
