//! Per-session search state for the "view location" screen.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::directions::Route;
use crate::proximity::{
    filter_within_radius, nearest_within_radius, validate_radius, FacilityDistance, ProximityError,
};
use crate::utils::geo::{Coordinate, GeoError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Every hospital within range
    #[default]
    All,
    /// Only the nearest in-range hospital, with a route to it
    Nearest,
}

impl SearchMode {
    pub fn toggled(self) -> Self {
        match self {
            SearchMode::All => SearchMode::Nearest,
            SearchMode::Nearest => SearchMode::All,
        }
    }
}

/// Why the browser could not produce a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeolocationFailure {
    PermissionDenied,
    Unsupported,
    Timeout,
    Unavailable,
}

impl GeolocationFailure {
    pub fn message(self) -> &'static str {
        match self {
            GeolocationFailure::Unsupported => "Geolocation is not supported by this browser.",
            _ => "Unable to retrieve your location.",
        }
    }
}

/// Outcome of one geolocation attempt, as reported by the client.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GeolocationOutcome {
    Resolved { lat: f64, lng: f64 },
    Failed { reason: GeolocationFailure },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchState {
    pub origin: Option<Coordinate>,
    pub location_error: Option<GeolocationFailure>,
    pub radius_km: f64,
    pub mode: SearchMode,
}

impl SearchState {
    pub fn new(radius_km: f64) -> Self {
        Self {
            origin: None,
            location_error: None,
            radius_km,
            mode: SearchMode::default(),
        }
    }

    /// Record a geolocation outcome. An out-of-bounds fix is rejected and
    /// leaves the state untouched.
    pub fn apply_location(&mut self, outcome: GeolocationOutcome) -> Result<(), GeoError> {
        match outcome {
            GeolocationOutcome::Resolved { lat, lng } => {
                self.origin = Some(Coordinate::new(lat, lng)?);
                self.location_error = None;
            }
            GeolocationOutcome::Failed { reason } => {
                self.origin = None;
                self.location_error = Some(reason);
            }
        }
        Ok(())
    }

    pub fn set_radius(&mut self, radius_km: f64) -> Result<(), ProximityError> {
        self.radius_km = validate_radius(radius_km)?;
        Ok(())
    }

    /// Compute what the screen should show for this state. Nothing is
    /// cached: every call filters the catalog again.
    pub fn view<'a>(&self, catalog: &'a Catalog) -> Result<SessionView<'a>, ProximityError> {
        if let Some(reason) = self.location_error {
            return Ok(SessionView::Error {
                reason,
                message: reason.message(),
            });
        }

        let Some(origin) = self.origin else {
            return Ok(SessionView::Locating);
        };

        let (hospitals, nearest) = match self.mode {
            SearchMode::All => (
                filter_within_radius(origin, catalog.facilities(), self.radius_km)?,
                None,
            ),
            SearchMode::Nearest => (
                Vec::new(),
                nearest_within_radius(origin, catalog.facilities(), self.radius_km)?,
            ),
        };

        Ok(SessionView::Ready {
            origin,
            radius_km: self.radius_km,
            mode: self.mode,
            hospitals,
            nearest,
        })
    }
}

/// What the "view location" screen shows for one state.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionView<'a> {
    Locating,
    Error {
        reason: GeolocationFailure,
        message: &'static str,
    },
    Ready {
        origin: Coordinate,
        radius_km: f64,
        mode: SearchMode,
        hospitals: Vec<FacilityDistance<'a>>,
        nearest: Option<FacilityDistance<'a>>,
    },
}

struct SessionEntry {
    state: SearchState,
    last_touched: DateTime<Utc>,
    route: Option<CachedRoute>,
}

/// Last route fetched for a session, keyed by both endpoints.
struct CachedRoute {
    origin: Coordinate,
    destination: Coordinate,
    route: Route,
}

/// In-memory sessions, one `SearchState` each. Sessions are independent and
/// vanish on delete or after sitting idle longer than the TTL.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
    default_radius_km: f64,
    ttl: chrono::Duration,
}

impl SessionStore {
    pub fn new(default_radius_km: f64, ttl: chrono::Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            default_radius_km,
            ttl,
        }
    }

    pub async fn create(&self) -> (Uuid, SearchState) {
        let id = Uuid::new_v4();
        let state = SearchState::new(self.default_radius_km);

        self.sessions.write().await.insert(
            id,
            SessionEntry {
                state: state.clone(),
                last_touched: Utc::now(),
                route: None,
            },
        );

        (id, state)
    }

    /// Run `f` against the session under the lock and touch it.
    /// Returns `None` if the session does not exist.
    pub async fn update<T>(&self, id: Uuid, f: impl FnOnce(&mut SearchState) -> T) -> Option<T> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_touched = Utc::now();
        Some(f(&mut entry.state))
    }

    /// A consistent copy of the session's state.
    pub async fn snapshot(&self, id: Uuid) -> Option<SearchState> {
        self.update(id, |state| state.clone()).await
    }

    /// The route fetched earlier for exactly this origin and destination.
    pub async fn cached_route(
        &self,
        id: Uuid,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Option<Route> {
        let sessions = self.sessions.read().await;
        let cached = sessions.get(&id)?.route.as_ref()?;
        (cached.origin == origin && cached.destination == destination)
            .then(|| cached.route.clone())
    }

    /// Remember `route` for the session, replacing any earlier one.
    pub async fn store_route(
        &self,
        id: Uuid,
        origin: Coordinate,
        destination: Coordinate,
        route: Route,
    ) {
        if let Some(entry) = self.sessions.write().await.get_mut(&id) {
            entry.route = Some(CachedRoute {
                origin,
                destination,
                route,
            });
        }
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    /// Drop sessions idle for longer than the TTL as of `now`.
    pub async fn evict_idle(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| now - entry.last_touched <= self.ttl);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Periodically evict idle sessions. Runs until the process exits.
pub async fn run_sweeper(store: Arc<SessionStore>, every: Duration) {
    let mut interval = tokio::time::interval(every);
    loop {
        interval.tick().await;
        let evicted = store.evict_idle(Utc::now()).await;
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted idle sessions");
        }
    }
}
