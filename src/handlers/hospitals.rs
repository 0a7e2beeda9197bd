use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::extract::AppQuery;
use crate::proximity::{filter_within_radius, nearest_within_radius, Facility, FacilityDistance};
use crate::utils::geo::Coordinate;
use crate::AppState;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HospitalInfo {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl From<&Facility> for HospitalInfo {
    fn from(facility: &Facility) -> Self {
        let coordinate = facility.coordinate();
        Self {
            name: facility.name().to_string(),
            lat: coordinate.lat(),
            lng: coordinate.lng(),
            distance_km: None,
        }
    }
}

impl From<FacilityDistance<'_>> for HospitalInfo {
    fn from(found: FacilityDistance<'_>) -> Self {
        Self {
            distance_km: Some(found.distance_km),
            ..HospitalInfo::from(found.facility)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProximityQuery {
    pub lat: f64,
    pub lng: f64,
    pub radius_km: Option<f64>,
}

impl ProximityQuery {
    /// Validated origin and radius, falling back to the configured default radius.
    fn resolve(&self, state: &AppState) -> AppResult<(Coordinate, f64)> {
        let origin = Coordinate::new(self.lat, self.lng)?;
        let radius_km = state
            .config
            .check_radius(self.radius_km.unwrap_or(state.config.default_radius_km))?;
        Ok((origin, radius_km))
    }
}

#[derive(Debug, Serialize)]
pub struct NearbyResponse {
    pub origin: Coordinate,
    pub radius_km: f64,
    pub hospitals: Vec<HospitalInfo>,
}

#[derive(Debug, Serialize)]
pub struct NearestResponse {
    pub origin: Coordinate,
    pub radius_km: f64,
    pub hospital: Option<HospitalInfo>,
}

/// List every hospital in the catalog
pub async fn list_hospitals(State(state): State<AppState>) -> Json<Vec<HospitalInfo>> {
    Json(
        state
            .catalog
            .facilities()
            .iter()
            .map(HospitalInfo::from)
            .collect(),
    )
}

/// Hospitals within range of a point, in catalog order
pub async fn nearby(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ProximityQuery>,
) -> AppResult<Json<NearbyResponse>> {
    let (origin, radius_km) = query.resolve(&state)?;

    let hospitals: Vec<HospitalInfo> =
        filter_within_radius(origin, state.catalog.facilities(), radius_km)?
            .into_iter()
            .map(HospitalInfo::from)
            .collect();

    tracing::debug!(radius_km, found = hospitals.len(), "Nearby hospital lookup");

    Ok(Json(NearbyResponse {
        origin,
        radius_km,
        hospitals,
    }))
}

/// Nearest hospital within range of a point, if any
pub async fn nearest(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ProximityQuery>,
) -> AppResult<Json<NearestResponse>> {
    let (origin, radius_km) = query.resolve(&state)?;

    let hospital =
        nearest_within_radius(origin, state.catalog.facilities(), radius_km)?.map(HospitalInfo::from);

    Ok(Json(NearestResponse {
        origin,
        radius_km,
        hospital,
    }))
}
