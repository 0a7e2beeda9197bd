use std::path::{Path, PathBuf};

use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use serde::Deserialize;
use thiserror::Error;

use crate::entities::facility;
use crate::proximity::{Facility, ProximityError};
use crate::utils::geo::{Coordinate, GeoError};

/// The seeded `facility` rows double as the built-in catalog, so both sources
/// always list the same hospitals in the same order.
const BUILTIN_HOSPITALS: &[(&str, f64, f64)] = migration::SEEDED_HOSPITALS;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse catalog: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to load catalog from database: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("catalog entry {index} has invalid coordinates: {source}")]
    InvalidCoordinate { index: usize, source: GeoError },
    #[error("catalog entry {index}: {source}")]
    InvalidFacility {
        index: usize,
        source: ProximityError,
    },
}

/// One facility as it appears in a catalog file.
#[derive(Debug, Clone, Deserialize)]
pub struct FacilityRecord {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

/// The read-only, ordered list of facilities every query runs against.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    facilities: Vec<Facility>,
}

impl Catalog {
    pub fn new(facilities: Vec<Facility>) -> Self {
        Self { facilities }
    }

    pub fn builtin() -> Self {
        let facilities = BUILTIN_HOSPITALS
            .iter()
            .map(|&(name, lat, lng)| {
                Facility::new_unchecked(name, Coordinate::new_unchecked(lat, lng))
            })
            .collect();

        Self { facilities }
    }

    /// Validate raw records, keeping their order.
    pub fn from_records<I>(records: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = FacilityRecord>,
    {
        let facilities = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                let coordinate = Coordinate::new(record.lat, record.lng)
                    .map_err(|source| CatalogError::InvalidCoordinate { index, source })?;
                Facility::new(record.name, coordinate)
                    .map_err(|source| CatalogError::InvalidFacility { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { facilities })
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let records: Vec<FacilityRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub async fn from_database(db: &DatabaseConnection) -> Result<Self, CatalogError> {
        let rows = facility::Entity::find()
            .order_by_asc(facility::Column::Position)
            .all(db)
            .await?;

        Self::from_records(rows.into_iter().map(|row| FacilityRecord {
            name: row.name,
            lat: row.lat,
            lng: row.lng,
        }))
    }

    pub fn facilities(&self) -> &[Facility] {
        &self.facilities
    }

    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_entries_are_all_valid() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), BUILTIN_HOSPITALS.len());

        for (facility, &(name, lat, lng)) in catalog.facilities().iter().zip(BUILTIN_HOSPITALS) {
            assert_eq!(facility.name(), name);
            assert!(Facility::new(name, Coordinate::new(lat, lng).unwrap()).is_ok(), "{name}");
        }
        assert_eq!(catalog.facilities()[0].name(), "Susheela Tiwari Government Hospital");
    }

    #[test]
    fn test_builtin_matches_records_path() {
        let records = BUILTIN_HOSPITALS.iter().map(|&(name, lat, lng)| FacilityRecord {
            name: name.to_string(),
            lat,
            lng,
        });
        let validated = Catalog::from_records(records).unwrap();

        assert_eq!(validated.facilities(), Catalog::builtin().facilities());
    }

    #[test]
    fn test_from_json_keeps_order() {
        let catalog = Catalog::from_json_str(
            r#"[
                {"name": "B", "lat": 1.0, "lng": 2.0},
                {"name": "A", "lat": -1.0, "lng": -2.0}
            ]"#,
        )
        .unwrap();

        let names: Vec<&str> = catalog.facilities().iter().map(Facility::name).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_from_json_rejects_bad_coordinates() {
        let err = Catalog::from_json_str(
            r#"[
                {"name": "Fine", "lat": 1.0, "lng": 2.0},
                {"name": "Broken", "lat": 91.0, "lng": 2.0}
            ]"#,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            CatalogError::InvalidCoordinate {
                index: 1,
                source: GeoError::InvalidLatitude(_)
            }
        ));
    }

    #[test]
    fn test_from_json_rejects_blank_name() {
        let err = Catalog::from_json_str(r#"[{"name": " ", "lat": 1.0, "lng": 2.0}]"#).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidFacility { index: 0, .. }));
    }

    #[test]
    fn test_empty_catalog_is_allowed() {
        let catalog = Catalog::from_json_str("[]").unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = Catalog::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
