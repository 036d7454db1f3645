//! Core library modules for yyc-route
//!
//! Endpoint resolution, route requests, ranking and step aggregation. Nothing in
//! here draws anything; renderers consume [`session::RenderUpdate`].

pub mod aggregate;
pub mod chat;
pub mod client;
pub mod config;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod geo;
pub mod ranker;
pub mod resolver;
pub mod route;
pub mod session;

// Re-export main types for internal use
pub use config::{RemoteConfig, ServiceConfig};
pub use engine::{ChatOutcome, RouteEngine, RouteForm};
pub use error::{Endpoint, Error, Result};
pub use geo::GeoPoint;
