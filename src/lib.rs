pub mod catalog;
pub mod config;
pub mod db;
pub mod directions;
pub mod entities;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod proximity;
pub mod routes;
pub mod session;
pub mod utils;

use std::sync::Arc;

pub use catalog::Catalog;
pub use config::Config;
pub use directions::DirectionsProvider;
pub use error::{AppError, AppResult};

use session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub catalog: Arc<Catalog>,
    pub sessions: Arc<SessionStore>,
    pub directions: DirectionsProvider,
}

impl AppState {
    pub fn new(config: Config, catalog: Catalog, directions: DirectionsProvider) -> Self {
        let sessions = SessionStore::new(
            config.default_radius_km,
            chrono::Duration::minutes(config.session_ttl_minutes),
        );

        Self {
            config,
            catalog: Arc::new(catalog),
            sessions: Arc::new(sessions),
            directions,
        }
    }
}
