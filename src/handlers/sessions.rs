use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::directions::{DirectionsError, Route};
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::handlers::hospitals::HospitalInfo;
use crate::proximity::Facility;
use crate::session::{GeolocationFailure, GeolocationOutcome, SearchMode, SearchState, SessionView};
use crate::utils::geo::Coordinate;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    #[serde(flatten)]
    pub state: SearchState,
}

#[derive(Debug, Deserialize)]
pub struct RadiusRequest {
    pub radius_km: f64,
}

#[derive(Debug, Deserialize)]
pub struct ModeRequest {
    pub mode: SearchMode,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ViewResponse {
    Locating,
    Error {
        reason: GeolocationFailure,
        message: String,
    },
    Ready {
        origin: Coordinate,
        radius_km: f64,
        mode: SearchMode,
        hospitals: Vec<HospitalInfo>,
        nearest: Option<HospitalInfo>,
        route: Option<Route>,
        #[serde(skip_serializing_if = "Option::is_none")]
        route_error: Option<String>,
    },
}

fn session_not_found() -> AppError {
    AppError::NotFound("Session not found".to_string())
}

/// Start a new search session with default settings
pub async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionResponse>) {
    let (id, search) = state.sessions.create().await;
    tracing::debug!(session_id = %id, "Session created");

    (StatusCode::CREATED, Json(SessionResponse { id, state: search }))
}

/// Get the current search settings of a session
pub async fn get_session(
    State(state): State<AppState>,
    AppPath(session_id): AppPath<Uuid>,
) -> AppResult<Json<SessionResponse>> {
    let search = state
        .sessions
        .snapshot(session_id)
        .await
        .ok_or_else(session_not_found)?;

    Ok(Json(SessionResponse {
        id: session_id,
        state: search,
    }))
}

/// End a session
pub async fn delete_session(
    State(state): State<AppState>,
    AppPath(session_id): AppPath<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    if !state.sessions.remove(session_id).await {
        return Err(session_not_found());
    }

    Ok(Json(serde_json::json!({ "message": "Session ended" })))
}

/// Record the result of the browser's geolocation request
pub async fn update_location(
    State(state): State<AppState>,
    AppPath(session_id): AppPath<Uuid>,
    AppJson(outcome): AppJson<GeolocationOutcome>,
) -> AppResult<Json<SessionResponse>> {
    let search = state
        .sessions
        .update(session_id, |search| {
            search.apply_location(outcome).map(|_| search.clone())
        })
        .await
        .ok_or_else(session_not_found)??;

    if let GeolocationOutcome::Failed { reason } = outcome {
        tracing::info!(session_id = %session_id, ?reason, "Geolocation failed");
    }

    Ok(Json(SessionResponse {
        id: session_id,
        state: search,
    }))
}

/// Change the search radius
pub async fn update_radius(
    State(state): State<AppState>,
    AppPath(session_id): AppPath<Uuid>,
    AppJson(payload): AppJson<RadiusRequest>,
) -> AppResult<Json<SessionResponse>> {
    let radius_km = state.config.check_radius(payload.radius_km)?;

    let search = state
        .sessions
        .update(session_id, |search| {
            search.set_radius(radius_km).map(|_| search.clone())
        })
        .await
        .ok_or_else(session_not_found)??;

    Ok(Json(SessionResponse {
        id: session_id,
        state: search,
    }))
}

/// Switch between listing all hospitals in range and only the nearest one
pub async fn update_mode(
    State(state): State<AppState>,
    AppPath(session_id): AppPath<Uuid>,
    AppJson(payload): AppJson<ModeRequest>,
) -> AppResult<Json<SessionResponse>> {
    let search = state
        .sessions
        .update(session_id, |search| {
            search.mode = payload.mode;
            search.clone()
        })
        .await
        .ok_or_else(session_not_found)?;

    Ok(Json(SessionResponse {
        id: session_id,
        state: search,
    }))
}

/// Flip the display mode
pub async fn toggle_mode(
    State(state): State<AppState>,
    AppPath(session_id): AppPath<Uuid>,
) -> AppResult<Json<SessionResponse>> {
    let search = state
        .sessions
        .update(session_id, |search| {
            search.mode = search.mode.toggled();
            search.clone()
        })
        .await
        .ok_or_else(session_not_found)?;

    Ok(Json(SessionResponse {
        id: session_id,
        state: search,
    }))
}

/// What the "view location" screen should show right now
pub async fn view(
    State(state): State<AppState>,
    AppPath(session_id): AppPath<Uuid>,
) -> AppResult<Json<ViewResponse>> {
    let search = state
        .sessions
        .snapshot(session_id)
        .await
        .ok_or_else(session_not_found)?;

    let response = match search.view(&state.catalog)? {
        SessionView::Locating => ViewResponse::Locating,
        SessionView::Error { reason, message } => ViewResponse::Error {
            reason,
            message: message.to_string(),
        },
        SessionView::Ready {
            origin,
            radius_km,
            mode,
            hospitals,
            nearest,
        } => {
            let (route, route_error) = match &nearest {
                Some(found) => route_to(&state, session_id, origin, found.facility).await,
                None => (None, None),
            };

            ViewResponse::Ready {
                origin,
                radius_km,
                mode,
                hospitals: hospitals.into_iter().map(HospitalInfo::from).collect(),
                nearest: nearest.map(HospitalInfo::from),
                route,
                route_error,
            }
        }
    };

    Ok(Json(response))
}

/// Driving route to `destination`, reusing the session's last route when
/// neither endpoint has moved. Failures are reported but never cached.
async fn route_to(
    state: &AppState,
    session_id: Uuid,
    origin: Coordinate,
    destination: &Facility,
) -> (Option<Route>, Option<String>) {
    let target = destination.coordinate();
    if let Some(route) = state.sessions.cached_route(session_id, origin, target).await {
        return (Some(route), None);
    }

    match state.directions.route(origin, target).await {
        Ok(route) => {
            state
                .sessions
                .store_route(session_id, origin, target, route.clone())
                .await;
            (Some(route), None)
        }
        Err(e) => {
            if !matches!(e, DirectionsError::NotConfigured) {
                tracing::warn!(
                    session_id = %session_id,
                    destination = destination.name(),
                    error = %e,
                    "Directions request failed"
                );
            }
            (None, Some(e.to_string()))
        }
    }
}
