//! Step list and totals for a route
//!
//! Segments arrive in path order and frequently repeat a road name, either because a
//! road is split into several contiguous edges or because the route comes back to it.
//! Steps keep only the first occurrence of each name.
//!
//! Note: the same name on two separate stretches of a route collapses into one step
//! carrying the first stretch's length. Totals are unaffected since they sum every
//! segment.

use std::collections::HashSet;

use log::warn;

use crate::core::route::{RouteSegment, ServerTotals};

/// Label for segments the backend could not name
pub const UNNAMED_ROAD: &str = "Unnamed Road";

/// One displayed instruction
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub name: String,
    pub length_meters: f64,
}

/// Derived view of one alternative
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSummary {
    pub steps: Vec<Step>,
    pub total_length_meters: f64,
    pub total_travel_seconds: f64,
}

impl RouteSummary {
    pub fn totals(&self) -> RouteTotals {
        RouteTotals {
            km: self.total_length_meters / 1000.0,
            formatted_time: format_travel_time(Some(self.total_travel_seconds)),
        }
    }
}

/// Totals as shown to the user
#[derive(Debug, Clone, PartialEq)]
pub struct RouteTotals {
    pub km: f64,
    pub formatted_time: String,
}

impl RouteTotals {
    pub fn distance_label(&self) -> String {
        format!("{:.2} km", self.km)
    }
}

/// Collapse segments into ordered unique steps and compute totals
pub fn aggregate(segments: &[RouteSegment], server_totals: &ServerTotals) -> RouteSummary {
    let mut seen = HashSet::new();
    let steps = segments
        .iter()
        .filter_map(|segment| {
            let name = segment_name(segment);
            seen.insert(name.to_string()).then(|| Step {
                name: name.to_string(),
                length_meters: segment.length_meters,
            })
        })
        .collect();

    RouteSummary {
        steps,
        total_length_meters: total_length(segments, server_totals),
        total_travel_seconds: total_travel_seconds(segments, server_totals),
    }
}

fn segment_name(segment: &RouteSegment) -> &str {
    match segment.name.as_deref() {
        Some(name) if !name.trim().is_empty() => name,
        _ => UNNAMED_ROAD,
    }
}

/// Server total when reported, otherwise the sum over every segment including repeats
pub fn total_length(segments: &[RouteSegment], server_totals: &ServerTotals) -> f64 {
    match server_totals.length_meters {
        Some(length) if length.is_finite() => length,
        _ => segments.iter().map(|s| s.length_meters).sum(),
    }
}

/// Server total when reported and non-zero, otherwise the sum over every segment
pub fn total_travel_seconds(segments: &[RouteSegment], server_totals: &ServerTotals) -> f64 {
    match server_totals.travel_seconds {
        Some(seconds) if seconds.is_finite() && seconds != 0.0 => seconds,
        _ => segments.iter().map(|s| s.travel_seconds).sum(),
    }
}

/// Format a duration as `"{m} min {s} sec"`, or `"{s} sec"` under a minute
///
/// The value is rounded to whole seconds before splitting, so 59.6 becomes
/// `"1 min 0 sec"`. Missing, negative and non-finite input yields `"0 sec"`.
pub fn format_travel_time(seconds: Option<f64>) -> String {
    let seconds = match seconds {
        Some(s) if s.is_finite() && s >= 0.0 => s,
        other => {
            warn!("Invalid travel time: {other:?}");
            return "0 sec".to_string();
        }
    };

    let total = seconds.round() as u64;
    let (minutes, remainder) = (total / 60, total % 60);
    if minutes == 0 {
        format!("{remainder} sec")
    } else {
        format!("{minutes} min {remainder} sec")
    }
}
