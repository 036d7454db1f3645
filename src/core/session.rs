//! Session state and render snapshots
//!
//! The engine owns exactly one [`SessionState`]. Renderers never see it directly;
//! they receive a [`RenderUpdate`], which always describes the whole map so that
//! applying it replaces whatever was drawn before.

use crate::core::aggregate::{RouteTotals, Step};
use crate::core::error::{Endpoint, Error};
use crate::core::geo::GeoPoint;
use crate::core::ranker::RankedRoutes;
use crate::core::route::RouteAlternative;

pub const RESET_MESSAGE: &str = "Map reset. Click to set new points or enter locations.";
pub const BOTH_SET_MESSAGE: &str = "Both points already set. Click Reset to select new points.";

/// Intent counter; bumped whenever earlier pending work must not land
pub type Generation = u64;

/// Mutable record of one user session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub start: Option<GeoPoint>,
    pub end: Option<GeoPoint>,
    pub active: Option<RankedRoutes>,
    pub request_in_flight: bool,
    pub chat_minimized: bool,
    generation: Generation,
}

/// Result of a map pick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickOutcome {
    StartSet,
    /// End was set; both endpoints are now known
    EndSet,
    /// Both endpoints were already set; the pick was ignored
    Ignored,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Invalidate all pending work
    pub fn advance(&mut self) -> Generation {
        self.generation += 1;
        self.generation
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.generation == generation
    }

    pub fn endpoint(&self, endpoint: Endpoint) -> Option<GeoPoint> {
        match endpoint {
            Endpoint::Start => self.start,
            Endpoint::End => self.end,
        }
    }

    pub fn set_endpoint(&mut self, endpoint: Endpoint, point: Option<GeoPoint>) {
        match endpoint {
            Endpoint::Start => self.start = point,
            Endpoint::End => self.end = point,
        }
    }

    /// Fill the first free endpoint with a picked point
    pub fn pick(&mut self, point: GeoPoint) -> PickOutcome {
        if self.start.is_none() {
            self.start = Some(point);
            PickOutcome::StartSet
        } else if self.end.is_none() {
            self.end = Some(point);
            PickOutcome::EndSet
        } else {
            PickOutcome::Ignored
        }
    }

    /// Return every field to its initial value; pending responses become stale
    pub fn reset(&mut self) {
        let generation = self.generation;
        *self = Self::default();
        self.generation = generation;
        self.advance();
    }

    /// Snapshot of what should be on screen
    pub fn snapshot(&self, status_message: impl Into<String>) -> RenderUpdate {
        let (route_layers, emphasized, steps, totals) = match &self.active {
            Some(ranked) => {
                let summary = ranked.best().summary();
                let totals = summary.totals();
                (ranked.all().to_vec(), Some(ranked.best_index()), summary.steps, Some(totals))
            }
            None => (Vec::new(), None, Vec::new(), None),
        };

        RenderUpdate {
            start_marker: self.start,
            end_marker: self.end,
            route_layers,
            emphasized,
            steps,
            totals,
            status_message: status_message.into(),
            chat_minimized: self.chat_minimized,
        }
    }

    /// Snapshot carrying an error's status message
    pub fn failure(&self, error: &Error) -> RenderUpdate {
        self.snapshot(error.status_message())
    }
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct RenderUpdate {
    pub start_marker: Option<GeoPoint>,
    pub end_marker: Option<GeoPoint>,
    pub route_layers: Vec<RouteAlternative>,
    /// Index into `route_layers` of the layer to draw emphasized
    pub emphasized: Option<usize>,
    pub steps: Vec<Step>,
    pub totals: Option<RouteTotals>,
    pub status_message: String,
    pub chat_minimized: bool,
}

impl RenderUpdate {
    pub fn emphasized_layer(&self) -> Option<&RouteAlternative> {
        self.emphasized.and_then(|idx| self.route_layers.get(idx))
    }
}
