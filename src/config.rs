use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{AppError, AppResult};

#[derive(Clone, Debug)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    /// Radius a new search session starts with
    pub default_radius_km: f64,
    /// Smallest radius a client may ask for
    pub min_radius_km: f64,
    pub catalog_path: Option<PathBuf>,
    pub database_url: Option<String>,
    pub directions_api_key: Option<String>,
    pub directions_base_url: String,
    pub directions_timeout_secs: u64,
    pub session_ttl_minutes: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            default_radius_km: 5.0,
            min_radius_km: 1.0,
            catalog_path: None,
            database_url: None,
            directions_api_key: None,
            directions_base_url: "https://maps.googleapis.com".to_string(),
            directions_timeout_secs: 10,
            session_ttl_minutes: 30,
        }
    }
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let config = Self {
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_var("SERVER_PORT", defaults.server_port)?,
            default_radius_km: parse_var("DEFAULT_RADIUS_KM", defaults.default_radius_km)?,
            min_radius_km: parse_var("MIN_RADIUS_KM", defaults.min_radius_km)?,
            catalog_path: optional_var("CATALOG_PATH").map(PathBuf::from),
            database_url: optional_var("DATABASE_URL"),
            directions_api_key: optional_var("DIRECTIONS_API_KEY"),
            directions_base_url: env::var("DIRECTIONS_BASE_URL")
                .unwrap_or(defaults.directions_base_url),
            directions_timeout_secs: parse_var(
                "DIRECTIONS_TIMEOUT_SECS",
                defaults.directions_timeout_secs,
            )?,
            session_ttl_minutes: parse_var("SESSION_TTL_MINUTES", defaults.session_ttl_minutes)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        if !(self.min_radius_km.is_finite() && self.min_radius_km > 0.0) {
            return Err(AppError::Internal(
                "MIN_RADIUS_KM must be a positive number".to_string(),
            ));
        }
        if !(self.default_radius_km.is_finite() && self.default_radius_km >= self.min_radius_km) {
            return Err(AppError::Internal(format!(
                "DEFAULT_RADIUS_KM must be at least MIN_RADIUS_KM ({})",
                self.min_radius_km
            )));
        }
        if self.session_ttl_minutes <= 0 {
            return Err(AppError::Internal(
                "SESSION_TTL_MINUTES must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Check a radius coming from a client against the configured minimum.
    pub fn check_radius(&self, radius_km: f64) -> AppResult<f64> {
        if radius_km.is_finite() && radius_km >= self.min_radius_km {
            Ok(radius_km)
        } else {
            Err(AppError::BadRequest(format!(
                "Range must be a number of at least {} km",
                self.min_radius_km
            )))
        }
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_var<T: FromStr>(name: &str, default: T) -> AppResult<T> {
    match optional_var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Internal(format!("{} must be a number, got {:?}", name, raw))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_radius_km, 5.0);
        assert_eq!(config.server_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_default_radius_below_minimum_is_rejected() {
        let config = Config {
            default_radius_km: 0.5,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_check_radius() {
        let config = Config::default();
        assert_eq!(config.check_radius(1.0).unwrap(), 1.0);
        assert_eq!(config.check_radius(12.5).unwrap(), 12.5);
        assert!(config.check_radius(0.99).is_err());
        assert!(config.check_radius(0.0).is_err());
        assert!(config.check_radius(-3.0).is_err());
        assert!(config.check_radius(f64::NAN).is_err());
    }
}
