//! Choosing the best of several route alternatives

use crate::core::error::{Error, Result};
use crate::core::route::RouteAlternative;

/// All alternatives of a response with the fastest one singled out
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRoutes {
    all: Vec<RouteAlternative>,
    best: usize,
}

impl RankedRoutes {
    pub fn best(&self) -> &RouteAlternative {
        &self.all[self.best]
    }

    pub fn best_index(&self) -> usize {
        self.best
    }

    pub fn all(&self) -> &[RouteAlternative] {
        &self.all
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

/// Pick the alternative with the smallest travel time; the earliest one wins ties
pub fn rank(alternatives: Vec<RouteAlternative>) -> Result<RankedRoutes> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, alt) in alternatives.iter().enumerate() {
        let key = ranking_key(alt.travel_seconds);
        match best {
            Some((_, best_key)) if key >= best_key => {}
            _ => best = Some((idx, key)),
        }
    }

    let (best, _) = best.ok_or(Error::EmptyResult)?;
    Ok(RankedRoutes {
        all: alternatives,
        best,
    })
}

// NaN sorts after every real time
fn ranking_key(seconds: f64) -> f64 {
    if seconds.is_nan() {
        f64::INFINITY
    } else {
        seconds
    }
}
