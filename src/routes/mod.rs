use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers::{home, hospitals, sessions};
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Catalog and stateless proximity queries
    let hospital_routes = Router::new()
        .route("/", get(hospitals::list_hospitals))
        .route("/nearby", get(hospitals::nearby))
        .route("/nearest", get(hospitals::nearest));

    // Per-session "view location" flow
    let session_routes = Router::new()
        .route("/", post(sessions::create_session))
        .route(
            "/{id}",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route("/{id}/location", put(sessions::update_location))
        .route("/{id}/radius", put(sessions::update_radius))
        .route("/{id}/mode", put(sessions::update_mode))
        .route("/{id}/mode/toggle", post(sessions::toggle_mode))
        .route("/{id}/view", get(sessions::view));

    Router::new()
        .route("/api/health", get(home::health))
        .route("/api/home", get(home::home))
        .nest("/api/hospitals", hospital_routes)
        .nest("/api/sessions", session_routes)
        .with_state(state)
}
