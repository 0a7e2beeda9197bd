use std::net::SocketAddr;
use std::time::Duration;

use axum::middleware;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hospital_locator::{
    config::Config,
    db,
    middleware::rate_limit::{create_global_governor, log_request},
    routes, session, AppError, AppResult, AppState, Catalog, DirectionsProvider,
};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hospital_locator=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Starting server at {}", config.server_addr());

    let catalog = load_catalog(&config).await?;
    if catalog.is_empty() {
        tracing::warn!("Facility catalog is empty, every search will come back empty");
    } else {
        tracing::info!(facilities = catalog.len(), "Facility catalog loaded");
    }

    let directions = DirectionsProvider::from_config(&config)?;
    if !directions.is_enabled() {
        tracing::warn!("DIRECTIONS_API_KEY not set, routes to the nearest hospital are disabled");
    }

    let state = AppState::new(config.clone(), catalog, directions);
    tokio::spawn(session::run_sweeper(
        state.sessions.clone(),
        SESSION_SWEEP_INTERVAL,
    ));

    // Create router with middleware
    let app = routes::create_router(state)
        .layer(middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(create_global_governor()?);

    // Start server with socket address for rate limiting
    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .map_err(|e| AppError::Internal(format!("Invalid address: {}", e)))?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind to address: {}", e)))?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| AppError::Internal(format!("Server error: {}", e)))
}

/// Pick the catalog source: a JSON file wins over the database, and the
/// built-in list is used when neither is configured.
async fn load_catalog(config: &Config) -> AppResult<Catalog> {
    if let Some(path) = &config.catalog_path {
        tracing::info!(path = %path.display(), "Loading facility catalog from file");
        return Ok(Catalog::from_json_file(path)?);
    }

    if let Some(database_url) = &config.database_url {
        let db = db::connect_and_migrate(database_url).await?;
        return Ok(Catalog::from_database(&db).await?);
    }

    tracing::info!("Using built-in facility catalog");
    Ok(Catalog::builtin())
}
