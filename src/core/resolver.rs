//! Endpoint resolution
//!
//! Each endpoint can come from a map pick, a place name or two typed-in numbers.
//! Sources are consulted in a fixed order and the first one that applies wins:
//!
//! 1. a coordinate already set on the session (picked, or resolved earlier)
//! 2. free text, sent to the geocoder
//! 3. manual latitude/longitude fields
//!
//! A geocoding miss is reported for that endpoint; it does not fall through to the
//! manual fields.

use std::future::Future;

use log::{debug, warn};

use crate::core::error::{Endpoint, Error, Result};
use crate::core::geo::GeoPoint;

/// Suffix appended to place names that do not already mention the city
pub const LOCALITY_SUFFIX: &str = ", Calgary, AB";

/// Looks up place names
pub trait Geocoder {
    /// Best match for `query`, or `None` when the provider has no result
    fn geocode(&self, query: &str) -> impl Future<Output = Result<Option<GeoPoint>>> + Send;
}

/// How the user specified an endpoint
#[derive(Debug, Clone, PartialEq)]
pub enum EndpointSpec {
    /// Direct spatial interaction
    Picked(GeoPoint),
    /// Free-text place name
    Named(String),
    /// Raw numeric fields as typed
    Manual { lat: String, lon: String },
}

/// Everything known about one endpoint at the time of a resolution pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndpointInput {
    pub existing: Option<GeoPoint>,
    pub text: Option<String>,
    pub manual_lat: Option<String>,
    pub manual_lon: Option<String>,
}

impl EndpointInput {
    pub fn from_spec(spec: EndpointSpec) -> Self {
        match spec {
            EndpointSpec::Picked(point) => Self {
                existing: Some(point),
                ..Self::default()
            },
            EndpointSpec::Named(text) => Self {
                text: Some(text),
                ..Self::default()
            },
            EndpointSpec::Manual { lat, lon } => Self {
                manual_lat: Some(lat),
                manual_lon: Some(lon),
                ..Self::default()
            },
        }
    }

    /// Same input with the session's coordinate filled in
    pub fn with_existing(mut self, existing: Option<GeoPoint>) -> Self {
        if existing.is_some() {
            self.existing = existing;
        }
        self
    }
}

/// Outcome of the synchronous part of resolution
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Coordinate known without any lookup
    Ready(GeoPoint),
    /// A geocoding lookup for this (already localized) query is needed
    Suspend(String),
    /// No source applies
    Unresolvable,
}

/// Apply the precedence rules without touching the network
pub fn plan(input: &EndpointInput) -> Resolution {
    if let Some(point) = input.existing {
        return Resolution::Ready(point);
    }

    if let Some(text) = input.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        return Resolution::Suspend(with_locality(text));
    }

    match (parse_coordinate(input.manual_lat.as_deref()), parse_coordinate(input.manual_lon.as_deref())) {
        (Some(lat), Some(lon)) => Resolution::Ready(GeoPoint::new(lat, lon)),
        _ => Resolution::Unresolvable,
    }
}

/// Resolve one endpoint, geocoding if the plan calls for it
pub async fn resolve<G: Geocoder>(geocoder: &G, endpoint: Endpoint, input: &EndpointInput) -> Result<GeoPoint> {
    match plan(input) {
        Resolution::Ready(point) => Ok(point),
        Resolution::Unresolvable => Err(Error::Unresolvable { endpoint }),
        Resolution::Suspend(query) => {
            debug!("Geocoding {endpoint} location: {query}");
            match geocoder.geocode(&query).await {
                Ok(Some(point)) => Ok(point),
                Ok(None) => {
                    warn!("No coordinates found for {endpoint} location: {query}");
                    Err(Error::GeocodeFailure { endpoint, query })
                }
                Err(e) => {
                    warn!("Geocoding failed for {endpoint} location '{query}': {e}");
                    Err(Error::GeocodeFailure { endpoint, query })
                }
            }
        }
    }
}

/// Resolve both endpoints, running any geocoding lookups concurrently
///
/// Each side's result is returned independently so a failure on one end never
/// discards the other.
pub async fn resolve_pair<G: Geocoder>(
    geocoder: &G,
    start: &EndpointInput,
    end: &EndpointInput,
) -> (Result<GeoPoint>, Result<GeoPoint>) {
    futures::join!(
        resolve(geocoder, Endpoint::Start, start),
        resolve(geocoder, Endpoint::End, end)
    )
}

/// Append the locality unless the text already names the city
pub fn with_locality(text: &str) -> String {
    if text.to_lowercase().contains("calgary") {
        text.to_string()
    } else {
        format!("{text}{LOCALITY_SUFFIX}")
    }
}

fn parse_coordinate(field: Option<&str>) -> Option<f64> {
    field
        .map(str::trim)
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Geocoder answering from a fixed table and recording queries
    #[derive(Default)]
    struct TableGeocoder {
        places: HashMap<String, GeoPoint>,
        queries: Mutex<Vec<String>>,
    }

    impl TableGeocoder {
        fn with(places: &[(&str, GeoPoint)]) -> Self {
            Self {
                places: places.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
                queries: Mutex::new(Vec::new()),
            }
        }

        fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    impl Geocoder for TableGeocoder {
        async fn geocode(&self, query: &str) -> Result<Option<GeoPoint>> {
            self.queries.lock().unwrap().push(query.to_string());
            Ok(self.places.get(query).copied())
        }
    }

    const TOWER: GeoPoint = GeoPoint::new(51.0443, -114.0631);
    const PICKED: GeoPoint = GeoPoint::new(51.0, -114.1);

    #[test]
    fn test_with_locality() {
        assert_eq!(with_locality("Downtown"), "Downtown, Calgary, AB");
        assert_eq!(with_locality("Calgary Tower"), "Calgary Tower");
        assert_eq!(with_locality("university of CALGARY"), "university of CALGARY");
    }

    #[test]
    fn test_existing_coordinate_wins() {
        let input = EndpointInput {
            existing: Some(PICKED),
            text: Some("Calgary Tower".to_string()),
            manual_lat: Some("51.1".to_string()),
            manual_lon: Some("-114.2".to_string()),
        };
        assert_eq!(plan(&input), Resolution::Ready(PICKED));
    }

    #[test]
    fn test_text_before_manual() {
        let input = EndpointInput {
            text: Some("  Chinook Centre ".to_string()),
            manual_lat: Some("51.1".to_string()),
            manual_lon: Some("-114.2".to_string()),
            ..EndpointInput::default()
        };
        assert_eq!(plan(&input), Resolution::Suspend("Chinook Centre, Calgary, AB".to_string()));
    }

    #[test]
    fn test_manual_fields() {
        let input = EndpointInput::from_spec(EndpointSpec::Manual {
            lat: " 51.05".to_string(),
            lon: "-114.07 ".to_string(),
        });
        assert_eq!(plan(&input), Resolution::Ready(GeoPoint::new(51.05, -114.07)));

        for (lat, lon) in [("abc", "-114"), ("51", ""), ("NaN", "-114"), ("51", "inf")] {
            let input = EndpointInput::from_spec(EndpointSpec::Manual {
                lat: lat.to_string(),
                lon: lon.to_string(),
            });
            assert_eq!(plan(&input), Resolution::Unresolvable, "{lat},{lon}");
        }
    }

    #[test]
    fn test_blank_text_is_ignored() {
        let input = EndpointInput {
            text: Some("   ".to_string()),
            ..EndpointInput::default()
        };
        assert_eq!(plan(&input), Resolution::Unresolvable);
    }

    #[tokio::test]
    async fn test_resolve_existing_skips_geocoder() {
        let geocoder = TableGeocoder::default();
        let input = EndpointInput::from_spec(EndpointSpec::Named("Calgary Tower".to_string())).with_existing(Some(PICKED));
        let point = resolve(&geocoder, Endpoint::Start, &input).await.unwrap();
        assert_eq!(point, PICKED);
        assert!(geocoder.queries().is_empty());
    }

    #[tokio::test]
    async fn test_geocode_miss_is_endpoint_scoped() {
        let geocoder = TableGeocoder::with(&[("Calgary Tower", TOWER)]);
        let start = EndpointInput::from_spec(EndpointSpec::Named("Atlantis".to_string()));
        let end = EndpointInput::from_spec(EndpointSpec::Named("Calgary Tower".to_string()));

        let (start, end) = resolve_pair(&geocoder, &start, &end).await;
        match start {
            Err(Error::GeocodeFailure { endpoint, query }) => {
                assert_eq!(endpoint, Endpoint::Start);
                assert_eq!(query, "Atlantis, Calgary, AB");
            }
            other => panic!("expected GeocodeFailure, got {other:?}"),
        }
        assert_eq!(end.unwrap(), TOWER);
        assert_eq!(geocoder.queries().len(), 2);
    }

    #[tokio::test]
    async fn test_unresolvable() {
        let geocoder = TableGeocoder::default();
        let result = resolve(&geocoder, Endpoint::End, &EndpointInput::default()).await;
        assert!(matches!(result, Err(Error::Unresolvable { endpoint: Endpoint::End })));
    }
}
