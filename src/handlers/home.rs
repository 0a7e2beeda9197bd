use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub hospitals: usize,
    pub directions_enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub title: &'static str,
    pub tagline: &'static str,
    pub links: Vec<NavLink>,
}

#[derive(Debug, Serialize)]
pub struct NavLink {
    pub label: &'static str,
    pub path: &'static str,
    /// Hint for the client on how prominently to render the entry
    pub style: &'static str,
}

/// Liveness check
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        hospitals: state.catalog.len(),
        directions_enabled: state.directions.is_enabled(),
    })
}

/// Landing page content and navigation
pub async fn home() -> Json<HomeResponse> {
    Json(HomeResponse {
        title: "HealthNet",
        tagline: "jo pasine se nhayega vo itihas rachega",
        links: vec![
            NavLink {
                label: "Sign Up",
                path: "/signup",
                style: "secondary",
            },
            NavLink {
                label: "Sign In",
                path: "/signin",
                style: "primary",
            },
            NavLink {
                label: "Emergency",
                path: "/view-location",
                style: "danger",
            },
        ],
    })
}
