//! # yyc-route
//!
//! Point resolution and route orchestration for a Calgary route finder.
//!
//! Endpoints can come from a map pick, a place name or typed coordinates. The
//! engine resolves them (geocoding names concurrently), checks they fall inside
//! the city, asks the routing backend for a path and turns the answer into
//! deduplicated steps with a total distance and travel time.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use yyc_route::{EndpointInput, EndpointSpec, NoopIndicator, RouteEngine, RouteForm, ServiceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = RouteEngine::connect(ServiceConfig::default(), Arc::new(NoopIndicator)).await?;
//!
//!     let form = RouteForm {
//!         start: EndpointInput::from_spec(EndpointSpec::Named("Downtown".into())),
//!         end: EndpointInput::from_spec(EndpointSpec::Named("Calgary Tower".into())),
//!     };
//!     let update = engine.find_path(&form).await?;
//!     for step in &update.steps {
//!         println!("{} ({:.2} km)", step.name, step.length_meters / 1000.0);
//!     }
//!     Ok(())
//! }
//! ```

mod core;

pub use crate::core::aggregate::{format_travel_time, RouteSummary, RouteTotals, Step, UNNAMED_ROAD};
pub use crate::core::chat::{ChatReply, ChatService, CHAT_FAILURE_REPLY};
pub use crate::core::client::{GeoapifyGeocoder, HttpBackend};
pub use crate::core::coordinator::{BusyIndicator, NoopIndicator, RouteCoordinator, RoutingService};
pub use crate::core::geo::{validate, Bounds, CALGARY_BOUNDS, CALGARY_CENTER};
pub use crate::core::ranker::{rank, RankedRoutes};
pub use crate::core::resolver::{resolve_pair, EndpointInput, EndpointSpec, Geocoder};
pub use crate::core::route::{FeatureCollection, PathResponse, RouteAlternative, RouteRequest, RouteSegment};
pub use crate::core::session::{RenderUpdate, SessionState};
pub use crate::core::{ChatOutcome, Endpoint, Error, GeoPoint, RemoteConfig, Result, RouteEngine, RouteForm, ServiceConfig};
