//! Route data and the routing service's wire formats
//!
//! The backend has answered `/find_path` in two shapes over its lifetime: a single
//! GeoJSON `FeatureCollection`, or a `{routes: [...]}` wrapper carrying several
//! alternatives. Both are decoded once into [`PathResponse`] and normalized into
//! `Vec<RouteAlternative>` so nothing downstream needs to know which one arrived.

use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::core::aggregate::{self, RouteSummary};
use crate::core::error::{Error, Result};
use crate::core::geo::GeoPoint;

/// Endpoints of a routing call; built once both ends resolve and never mutated
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RouteRequest {
    pub start: GeoPoint,
    pub end: GeoPoint,
}

/// One named road portion of a route
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSegment {
    pub name: Option<String>,
    pub length_meters: f64,
    pub travel_seconds: f64,
}

/// Totals reported by the server, when it reports them
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ServerTotals {
    pub length_meters: Option<f64>,
    pub travel_seconds: Option<f64>,
}

/// One candidate route
#[derive(Debug, Clone, PartialEq)]
pub struct RouteAlternative {
    /// GeoJSON handed to the renderer as-is
    pub geometry: Value,
    pub distance_meters: f64,
    pub travel_seconds: f64,
    pub segments: Vec<RouteSegment>,
    pub server_totals: ServerTotals,
}

impl RouteAlternative {
    /// Build an alternative from a feature collection, deriving the headline
    /// distance and time with the same fallbacks the step summary uses
    pub fn from_collection(collection: FeatureCollection, server_totals: ServerTotals) -> Self {
        let segments: Vec<RouteSegment> = collection.features.iter().map(Feature::segment).collect();
        let distance_meters = aggregate::total_length(&segments, &server_totals);
        let travel_seconds = aggregate::total_travel_seconds(&segments, &server_totals);
        let geometry = serde_json::to_value(&collection).unwrap_or_else(|e| {
            warn!("Route geometry could not be kept, drawing nothing for it: {e}");
            Value::Null
        });

        Self {
            geometry,
            distance_meters,
            travel_seconds,
            segments,
            server_totals,
        }
    }

    /// Deduplicated steps and totals for this alternative
    pub fn summary(&self) -> RouteSummary {
        aggregate::aggregate(&self.segments, &self.server_totals)
    }
}

/// GeoJSON feature collection as produced by the routing backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default = "feature_collection_type")]
    pub kind: String,

    pub features: Vec<Feature>,

    #[serde(default, skip_serializing_if = "CollectionProperties::is_empty")]
    pub properties: CollectionProperties,
}

fn feature_collection_type() -> String {
    "FeatureCollection".to_string()
}

impl FeatureCollection {
    pub fn server_totals(&self) -> ServerTotals {
        ServerTotals {
            length_meters: self.properties.total_length,
            travel_seconds: self.properties.total_travel_time,
        }
    }
}

/// Collection-level totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_length: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_travel_time: Option<f64>,
}

impl CollectionProperties {
    fn is_empty(&self) -> bool {
        self.total_length.is_none() && self.total_travel_time.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default = "feature_type")]
    pub kind: String,

    #[serde(default)]
    pub geometry: Value,

    #[serde(default)]
    pub properties: SegmentProperties,
}

fn feature_type() -> String {
    "Feature".to_string()
}

impl Feature {
    pub fn segment(&self) -> RouteSegment {
        RouteSegment {
            name: self.properties.name.clone(),
            length_meters: self.properties.length.unwrap_or(0.0),
            travel_seconds: self.properties.travel_time.unwrap_or(0.0),
        }
    }
}

/// Per-segment properties; anything beyond name/length/time (osmid, maxspeed...)
/// is kept so the renderer sees the feature unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentProperties {
    #[serde(default, deserialize_with = "road_name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_time: Option<f64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// OSM ways can carry several names; the first one is the road's label
fn road_name<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    let name = match value {
        Some(Value::String(name)) => Some(name),
        Some(Value::Array(names)) => names.into_iter().find_map(|n| match n {
            Value::String(name) => Some(name),
            _ => None,
        }),
        _ => None,
    };
    Ok(name.filter(|name| !name.trim().is_empty()))
}

/// Entry of the multi-route response shape
#[derive(Debug, Clone, Deserialize)]
pub struct WireRoute {
    pub geojson: Value,
    #[serde(default)]
    pub distance_km: Option<f64>,
    #[serde(default)]
    pub time_min: Option<f64>,
}

/// Body of a `/find_path` response
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PathResponse {
    Multi { routes: Vec<WireRoute> },
    Failed { error: String },
    Single(FeatureCollection),
}

impl PathResponse {
    pub fn parse(body: &str) -> Result<Self> {
        serde_json::from_str(body)
            .map_err(|e| Error::InvalidResponse(format!("unrecognized route response: {e}")))
    }

    /// Normalize either shape into alternatives; an empty vector means "no route"
    pub fn into_alternatives(self) -> Result<Vec<RouteAlternative>> {
        match self {
            PathResponse::Failed { error } => Err(Error::ServiceError(error)),
            PathResponse::Single(collection) => {
                if collection.features.is_empty() {
                    return Ok(Vec::new());
                }
                let totals = collection.server_totals();
                Ok(vec![RouteAlternative::from_collection(collection, totals)])
            }
            PathResponse::Multi { routes } => routes
                .into_iter()
                .map(|route| -> Result<RouteAlternative> {
                    let collection: FeatureCollection = serde_json::from_value(route.geojson)?;
                    let totals = ServerTotals {
                        length_meters: route.distance_km.map(|km| km * 1000.0),
                        travel_seconds: route.time_min.map(|min| min * 60.0),
                    };
                    Ok(RouteAlternative::from_collection(collection, totals))
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_shape() {
        let body = json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {"type": "LineString", "coordinates": [[-114.07, 51.04], [-114.06, 51.04]]},
                 "properties": {"name": "4 Ave SW", "length": 2000.0, "travel_time": 120.0, "osmid": 42}},
                {"type": "Feature", "geometry": null,
                 "properties": {"name": "4 Ave SW", "length": 1000.0, "travel_time": 60.0}}
            ],
            "properties": {"total_length": 5000.0, "total_travel_time": 600.0}
        });
        let alts = PathResponse::parse(&body.to_string()).unwrap().into_alternatives().unwrap();
        assert_eq!(alts.len(), 1);
        let alt = &alts[0];
        assert_eq!(alt.distance_meters, 5000.0);
        assert_eq!(alt.travel_seconds, 600.0);
        assert_eq!(alt.segments.len(), 2);
        assert_eq!(alt.geometry["features"][0]["properties"]["osmid"], json!(42));
    }

    #[test]
    fn test_geometry_kept_for_renderer() {
        let collection: FeatureCollection = serde_json::from_value(json!({
            "features": [{"geometry": {"type": "LineString", "coordinates": [[-114.07, 51.04], [-114.06, 51.05]]},
                          "properties": {"name": "10 St NW", "length": 1300.0, "highway": "secondary"}}]
        }))
        .unwrap();
        let alt = RouteAlternative::from_collection(collection, ServerTotals::default());

        assert_eq!(alt.geometry["type"], json!("FeatureCollection"));
        assert_eq!(alt.geometry["features"][0]["type"], json!("Feature"));
        assert_eq!(alt.geometry["features"][0]["geometry"]["coordinates"][1], json!([-114.06, 51.05]));
        assert_eq!(alt.geometry["features"][0]["properties"]["highway"], json!("secondary"));
    }

    #[test]
    fn test_single_shape_without_totals_falls_back_to_segments() {
        let body = json!({
            "features": [
                {"properties": {"name": "Macleod Trail", "length": 800.0, "travel_time": 50.0}},
                {"properties": {"length": 200.0, "travel_time": 25.0}}
            ]
        });
        let alts = PathResponse::parse(&body.to_string()).unwrap().into_alternatives().unwrap();
        assert_eq!(alts[0].distance_meters, 1000.0);
        assert_eq!(alts[0].travel_seconds, 75.0);
        assert_eq!(alts[0].segments[1].name, None);
    }

    #[test]
    fn test_multi_shape() {
        let body = json!({
            "routes": [
                {"route_id": 1, "geojson": {"type": "FeatureCollection", "features": [
                    {"properties": {"name": "Deerfoot Trail", "length": 4200.0, "travel_time": 300.0}}]},
                 "distance_km": 4.2, "time_min": 5.0},
                {"route_id": 2, "geojson": {"type": "FeatureCollection", "features": []},
                 "distance_km": 3.9, "time_min": 7.5}
            ]
        });
        let alts = PathResponse::parse(&body.to_string()).unwrap().into_alternatives().unwrap();
        assert_eq!(alts.len(), 2);
        assert_eq!(alts[0].travel_seconds, 300.0);
        assert_eq!(alts[1].distance_meters, 3900.0);
        assert_eq!(alts[1].travel_seconds, 450.0);
    }

    #[test]
    fn test_empty_shapes() {
        let multi = PathResponse::parse(r#"{"routes": []}"#).unwrap();
        assert!(multi.into_alternatives().unwrap().is_empty());

        let single = PathResponse::parse(r#"{"type": "FeatureCollection", "features": []}"#).unwrap();
        assert!(single.into_alternatives().unwrap().is_empty());
    }

    #[test]
    fn test_error_body() {
        let response = PathResponse::parse(r#"{"error": "End point is outside Calgary bounds"}"#).unwrap();
        match response.into_alternatives() {
            Err(Error::ServiceError(msg)) => assert_eq!(msg, "End point is outside Calgary bounds"),
            other => panic!("expected ServiceError, got {other:?}"),
        }
    }

    #[test]
    fn test_unrecognized_body() {
        assert!(matches!(PathResponse::parse("{}"), Err(Error::InvalidResponse(_))));
        assert!(matches!(PathResponse::parse("not json"), Err(Error::InvalidResponse(_))));
    }

    #[test]
    fn test_road_name_variants() {
        let props: SegmentProperties =
            serde_json::from_value(json!({"name": ["Crowchild Trail", "AB-1A"]})).unwrap();
        assert_eq!(props.name.as_deref(), Some("Crowchild Trail"));

        let props: SegmentProperties = serde_json::from_value(json!({"name": "  "})).unwrap();
        assert_eq!(props.name, None);

        let props: SegmentProperties = serde_json::from_value(json!({"name": null})).unwrap();
        assert_eq!(props.name, None);
    }

    #[test]
    fn test_request_wire_format() {
        let request = RouteRequest {
            start: GeoPoint::new(51.04, -114.07),
            end: GeoPoint::new(51.05, -114.06),
        };
        assert_eq!(
            serde_json::to_value(request).unwrap(),
            json!({"start": [51.04, -114.07], "end": [51.05, -114.06]})
        );
    }
}
