//! Error types for yyc-route
//!
//! Every failure is recoverable: each variant maps to a status message that tells the
//! user what to fix, and none of them leave the session in a busy state.

use std::fmt;

use thiserror::Error;

use crate::core::geo::GeoPoint;

/// Which end of the route an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

impl Endpoint {
    /// Capitalized label used at the start of status messages
    pub fn label(self) -> &'static str {
        match self {
            Endpoint::Start => "Start",
            Endpoint::End => "End",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Start => write!(f, "start"),
            Endpoint::End => write!(f, "end"),
        }
    }
}

/// Main error type for yyc-route operations
#[derive(Debug, Error)]
pub enum Error {
    /// Endpoint lies outside the serviceable region
    #[error("{} point {point} is outside the Calgary service area", .endpoint.label())]
    OutOfBounds { endpoint: Endpoint, point: GeoPoint },

    /// No input source produced a coordinate for the endpoint
    #[error("no {endpoint} location given: pick a point, enter a place name or coordinates")]
    Unresolvable { endpoint: Endpoint },

    /// Geocoding provider had no match for the endpoint's text
    #[error("could not find {endpoint} location '{query}'")]
    GeocodeFailure { endpoint: Endpoint, query: String },

    /// Both endpoints failed to resolve
    #[error("{start}; {end}")]
    Endpoints { start: Box<Error>, end: Box<Error> },

    /// Routing backend answered with a non-success status
    #[error("routing service error: {0}")]
    ServiceError(String),

    /// Routing backend answered successfully with zero routes
    #[error("no route found between the selected points")]
    EmptyResult,

    /// Transport-level failure talking to a collaborator
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// A route computation is already running for this session
    #[error("a route request is already in progress")]
    RequestInProgress,

    /// The session moved on (reset or chat route) while this request was pending
    #[error("request superseded by a newer session action")]
    Superseded,

    /// Session configuration could not be loaded from the backend
    #[error("failed to load configuration: {0}")]
    ConfigUnavailable(String),

    /// A collaborator returned a body that does not match its contract
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl Error {
    /// User-facing status line describing what to fix
    pub fn status_message(&self) -> String {
        match self {
            Error::OutOfBounds { endpoint, .. } => {
                format!("{} point is outside Calgary bounds. Choose a location inside the city.", endpoint.label())
            }
            Error::Unresolvable { .. } => {
                "Invalid start or end point. Please provide valid locations or coordinates.".to_string()
            }
            Error::GeocodeFailure { endpoint, .. } => {
                let example = match endpoint {
                    Endpoint::Start => "Downtown Calgary, AB",
                    Endpoint::End => "Calgary Tower, Calgary, AB",
                };
                format!(
                    "Geocoding failed for {endpoint} location. Try a more specific location (e.g., \"{example}\")."
                )
            }
            Error::Endpoints { start, end } => {
                format!("{} {}", start.status_message(), end.status_message())
            }
            // The backend's own message is shown verbatim
            Error::ServiceError(msg) => msg.clone(),
            Error::EmptyResult => "No path found. Try different points.".to_string(),
            Error::NetworkFailure(_) | Error::InvalidResponse(_) => {
                "Pathfinding failed. Check the logs for details.".to_string()
            }
            Error::RequestInProgress => "A route request is already in progress. Please wait.".to_string(),
            Error::Superseded => "Request discarded: the map was reset or replaced.".to_string(),
            Error::ConfigUnavailable(_) => {
                "Failed to load configuration. Please check if the backend server is running.".to_string()
            }
        }
    }

    /// Endpoint this error is scoped to, if any
    pub fn endpoint(&self) -> Option<Endpoint> {
        match self {
            Error::OutOfBounds { endpoint, .. }
            | Error::Unresolvable { endpoint }
            | Error::GeocodeFailure { endpoint, .. } => Some(*endpoint),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Error::InvalidResponse(err.to_string())
        } else {
            Error::NetworkFailure(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidResponse(err.to_string())
    }
}

/// Convenience result type for yyc-route operations
pub type Result<T> = std::result::Result<T, Error>;
