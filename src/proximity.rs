//! Radius filtering and nearest-facility selection over a facility list.
//!
//! Everything here is pure and synchronous: functions only read their
//! arguments, so they can be called from any number of tasks at once.

use thiserror::Error;

use crate::utils::geo::{distance_km, Coordinate};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProximityError {
    #[error("radius must be a positive number of kilometers, got {0}")]
    InvalidRadius(f64),
    #[error("facility name must not be empty")]
    EmptyFacilityName,
}

/// A named point of interest, e.g. a hospital.
#[derive(Debug, Clone, PartialEq)]
pub struct Facility {
    name: String,
    coordinate: Coordinate,
}

impl Facility {
    pub fn new(name: impl Into<String>, coordinate: Coordinate) -> Result<Self, ProximityError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ProximityError::EmptyFacilityName);
        }
        Ok(Self { name, coordinate })
    }

    /// For compile-time tables whose names are known to be non-blank.
    pub(crate) fn new_unchecked(name: &str, coordinate: Coordinate) -> Self {
        Self {
            name: name.to_string(),
            coordinate,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }
}

/// A facility paired with its distance from the query origin.
#[derive(Debug, Clone, PartialEq)]
pub struct FacilityDistance<'a> {
    pub facility: &'a Facility,
    pub distance_km: f64,
}

pub fn validate_radius(radius_km: f64) -> Result<f64, ProximityError> {
    if radius_km.is_finite() && radius_km > 0.0 {
        Ok(radius_km)
    } else {
        Err(ProximityError::InvalidRadius(radius_km))
    }
}

/// Every facility within `radius_km` of `origin` (boundary inclusive),
/// in the order they appear in `facilities`.
pub fn filter_within_radius<'a>(
    origin: Coordinate,
    facilities: &'a [Facility],
    radius_km: f64,
) -> Result<Vec<FacilityDistance<'a>>, ProximityError> {
    let radius_km = validate_radius(radius_km)?;

    Ok(facilities
        .iter()
        .map(|facility| FacilityDistance {
            facility,
            distance_km: distance_km(origin, facility.coordinate),
        })
        .filter(|candidate| candidate.distance_km <= radius_km)
        .collect())
}

/// The facility closest to `origin`. Equidistant candidates resolve to the
/// first one yielded, so repeated calls on the same input agree.
pub fn nearest<'a, I>(origin: Coordinate, facilities: I) -> Option<FacilityDistance<'a>>
where
    I: IntoIterator<Item = &'a Facility>,
{
    let mut best: Option<FacilityDistance<'a>> = None;

    for facility in facilities {
        let distance = distance_km(origin, facility.coordinate);
        match &best {
            Some(current) if distance >= current.distance_km => {}
            _ => {
                best = Some(FacilityDistance {
                    facility,
                    distance_km: distance,
                })
            }
        }
    }

    best
}

/// Nearest facility among those inside the radius only. A facility just
/// outside the radius is never returned, even when it is the closest overall.
pub fn nearest_within_radius<'a>(
    origin: Coordinate,
    facilities: &'a [Facility],
    radius_km: f64,
) -> Result<Option<FacilityDistance<'a>>, ProximityError> {
    let in_range = filter_within_radius(origin, facilities, radius_km)?;
    Ok(nearest(origin, in_range.iter().map(|candidate| candidate.facility)))
}
