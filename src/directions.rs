//! Client for the external driving-directions service.
//!
//! Only the route summary is fetched here; drawing it is the client's job.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use crate::utils::geo::Coordinate;

#[derive(Debug, Error)]
pub enum DirectionsError {
    #[error("directions provider is not configured")]
    NotConfigured,
    #[error("directions request failed: {0}")]
    Transport(reqwest::Error),
    #[error("directions request failed due to: {0}")]
    Status(String),
    #[error("directions response contained no route")]
    NoRoute,
}

impl From<reqwest::Error> for DirectionsError {
    /// The request URL carries the API key, so it never survives into the error.
    fn from(e: reqwest::Error) -> Self {
        DirectionsError::Transport(e.without_url())
    }
}

/// A driving route between two points, as reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub summary: String,
    pub distance_m: u64,
    pub distance_text: String,
    pub duration_s: u64,
    pub duration_text: String,
    /// Encoded polyline of the whole route, ready for a map overlay
    pub polyline: String,
}

#[derive(Clone)]
pub enum DirectionsProvider {
    Google(GoogleDirections),
    Disabled,
}

impl DirectionsProvider {
    pub fn from_config(config: &Config) -> Result<Self, DirectionsError> {
        match &config.directions_api_key {
            Some(api_key) => {
                let client = Client::builder()
                    .timeout(Duration::from_secs(config.directions_timeout_secs))
                    .build()?;
                Ok(Self::Google(GoogleDirections {
                    client,
                    base_url: config.directions_base_url.trim_end_matches('/').to_string(),
                    api_key: api_key.clone(),
                }))
            }
            None => Ok(Self::Disabled),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Google(_))
    }

    pub async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Route, DirectionsError> {
        match self {
            Self::Google(google) => google.route(origin, destination).await,
            Self::Disabled => Err(DirectionsError::NotConfigured),
        }
    }
}

#[derive(Clone)]
pub struct GoogleDirections {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GoogleDirections {
    async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Route, DirectionsError> {
        let url = format!("{}/maps/api/directions/json", self.base_url);

        tracing::debug!(
            origin = %format_point(origin),
            destination = %format_point(destination),
            "Requesting driving directions"
        );

        let response: DirectionsResponse = self
            .client
            .get(url)
            .query(&[
                ("origin", format_point(origin)),
                ("destination", format_point(destination)),
                ("mode", "driving".to_string()),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response.into_route()
    }
}

fn format_point(point: Coordinate) -> String {
    format!("{},{}", point.lat(), point.lng())
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<RouteBody>,
}

#[derive(Debug, Deserialize)]
struct RouteBody {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    legs: Vec<Leg>,
    overview_polyline: Polyline,
}

#[derive(Debug, Deserialize)]
struct Leg {
    distance: TextValue,
    duration: TextValue,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    text: String,
    value: u64,
}

#[derive(Debug, Deserialize)]
struct Polyline {
    points: String,
}

impl DirectionsResponse {
    fn into_route(self) -> Result<Route, DirectionsError> {
        if self.status != "OK" {
            return Err(DirectionsError::Status(match self.error_message {
                Some(message) => format!("{} ({})", self.status, message),
                None => self.status,
            }));
        }

        let route = self.routes.into_iter().next().ok_or(DirectionsError::NoRoute)?;
        let leg = route.legs.into_iter().next().ok_or(DirectionsError::NoRoute)?;

        Ok(Route {
            summary: route.summary,
            distance_m: leg.distance.value,
            distance_text: leg.distance.text,
            duration_s: leg.duration.value,
            duration_text: leg.duration.text,
            polyline: route.overview_polyline.points,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Query, State},
        http::StatusCode,
        routing::get,
        Router,
    };

    use super::*;

    const API_KEY: &str = "SECRET-KEY-123";

    const OK_BODY: &str = r#"{
        "status": "OK",
        "routes": [{
            "summary": "Nainital Rd",
            "legs": [{
                "distance": {"text": "1.2 km", "value": 1187},
                "duration": {"text": "4 mins", "value": 236}
            }],
            "overview_polyline": {"points": "a~l~Fjk~uOwHJy@P"}
        }]
    }"#;

    type Received = Arc<Mutex<Vec<HashMap<String, String>>>>;

    /// Serve a fixed directions reply on a local port, recording each query.
    async fn serve_directions(status: StatusCode, body: &'static str) -> (String, Received) {
        let received = Received::default();
        let app = Router::new()
            .route(
                "/maps/api/directions/json",
                get(
                    move |State(received): State<Received>,
                          Query(params): Query<HashMap<String, String>>| async move {
                        received.lock().unwrap().push(params);
                        (status, [("content-type", "application/json")], body)
                    },
                ),
            )
            .with_state(received.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        (format!("http://{addr}"), received)
    }

    fn google_at(base_url: &str) -> DirectionsProvider {
        DirectionsProvider::from_config(&Config {
            directions_api_key: Some(API_KEY.to_string()),
            directions_base_url: base_url.to_string(),
            ..Config::default()
        })
        .unwrap()
    }

    fn endpoints() -> (Coordinate, Coordinate) {
        (
            Coordinate::new(29.2075, 79.508).unwrap(),
            Coordinate::new(29.2122, 79.5059).unwrap(),
        )
    }

    fn parse(json: &str) -> Result<Route, DirectionsError> {
        serde_json::from_str::<DirectionsResponse>(json)
            .unwrap()
            .into_route()
    }

    #[test]
    fn test_parses_first_route_and_leg() {
        let route = parse(
            r#"{
                "status": "OK",
                "routes": [{
                    "summary": "Nainital Rd",
                    "legs": [{
                        "distance": {"text": "1.2 km", "value": 1187},
                        "duration": {"text": "4 mins", "value": 236},
                        "steps": []
                    }],
                    "overview_polyline": {"points": "a~l~Fjk~uOwHJy@P"}
                }, {
                    "summary": "Other",
                    "legs": [{
                        "distance": {"text": "9 km", "value": 9000},
                        "duration": {"text": "20 mins", "value": 1200}
                    }],
                    "overview_polyline": {"points": "zz"}
                }],
                "geocoded_waypoints": []
            }"#,
        )
        .unwrap();

        assert_eq!(
            route,
            Route {
                summary: "Nainital Rd".to_string(),
                distance_m: 1187,
                distance_text: "1.2 km".to_string(),
                duration_s: 236,
                duration_text: "4 mins".to_string(),
                polyline: "a~l~Fjk~uOwHJy@P".to_string(),
            }
        );
    }

    #[test]
    fn test_non_ok_status_is_an_error() {
        let err = parse(r#"{"status": "ZERO_RESULTS", "routes": []}"#).unwrap_err();
        assert!(matches!(err, DirectionsError::Status(ref s) if s == "ZERO_RESULTS"));

        let err = parse(
            r#"{"status": "REQUEST_DENIED", "error_message": "The provided API key is invalid."}"#,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "directions request failed due to: REQUEST_DENIED (The provided API key is invalid.)"
        );
    }

    #[test]
    fn test_ok_without_routes_is_no_route() {
        let err = parse(r#"{"status": "OK", "routes": []}"#).unwrap_err();
        assert!(matches!(err, DirectionsError::NoRoute));
    }

    #[tokio::test]
    async fn test_disabled_provider_reports_not_configured() {
        let provider = DirectionsProvider::from_config(&Config::default()).unwrap();
        assert!(!provider.is_enabled());

        let here = Coordinate::new(29.2075, 79.5080).unwrap();
        let err = provider.route(here, here).await.unwrap_err();
        assert!(matches!(err, DirectionsError::NotConfigured));
    }

    #[test]
    fn test_api_key_enables_google() {
        let config = Config {
            directions_api_key: Some("test-key".to_string()),
            directions_base_url: "http://localhost:9/".to_string(),
            ..Config::default()
        };
        let provider = DirectionsProvider::from_config(&config).unwrap();
        match provider {
            DirectionsProvider::Google(google) => {
                assert_eq!(google.base_url, "http://localhost:9");
            }
            DirectionsProvider::Disabled => panic!("expected google provider"),
        }
    }

    #[tokio::test]
    async fn test_route_sends_driving_query() {
        let (base_url, received) = serve_directions(StatusCode::OK, OK_BODY).await;
        let (origin, destination) = endpoints();

        let route = google_at(&base_url).route(origin, destination).await.unwrap();
        assert_eq!(route.summary, "Nainital Rd");
        assert_eq!(route.distance_m, 1187);

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        let params = &received[0];
        assert_eq!(params["origin"], "29.2075,79.508");
        assert_eq!(params["destination"], "29.2122,79.5059");
        assert_eq!(params["mode"], "driving");
        assert_eq!(params["key"], API_KEY);
    }

    #[tokio::test]
    async fn test_route_reports_zero_results() {
        let (base_url, _) =
            serve_directions(StatusCode::OK, r#"{"status": "ZERO_RESULTS", "routes": []}"#).await;
        let (origin, destination) = endpoints();

        let err = google_at(&base_url).route(origin, destination).await.unwrap_err();
        assert!(matches!(err, DirectionsError::Status(ref s) if s == "ZERO_RESULTS"));
    }

    #[tokio::test]
    async fn test_server_error_does_not_expose_api_key() {
        let (base_url, _) = serve_directions(StatusCode::INTERNAL_SERVER_ERROR, "{}").await;
        let (origin, destination) = endpoints();

        let err = google_at(&base_url).route(origin, destination).await.unwrap_err();
        assert!(matches!(err, DirectionsError::Transport(_)));
        assert!(!err.to_string().contains(API_KEY), "{err}");
        assert!(!format!("{err:?}").contains(API_KEY), "{err:?}");
    }

    #[tokio::test]
    async fn test_malformed_body_does_not_expose_api_key() {
        let (base_url, _) = serve_directions(StatusCode::OK, "not json").await;
        let (origin, destination) = endpoints();

        let err = google_at(&base_url).route(origin, destination).await.unwrap_err();
        assert!(matches!(err, DirectionsError::Transport(_)));
        assert!(!err.to_string().contains(API_KEY), "{err}");
    }

    #[tokio::test]
    async fn test_unreachable_host_does_not_expose_api_key() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let (origin, destination) = endpoints();

        let err = google_at(&format!("http://{addr}"))
            .route(origin, destination)
            .await
            .unwrap_err();
        assert!(matches!(err, DirectionsError::Transport(_)));
        assert!(!err.to_string().contains(API_KEY), "{err}");
    }
}
