//! Conversational route requests
//!
//! The chat backend does its own parsing and geocoding; what comes back is a reply
//! text and, when it found one, a complete route that replaces whatever the session
//! was showing.

use std::future::Future;

use serde::Deserialize;

use crate::core::error::Result;
use crate::core::geo::GeoPoint;
use crate::core::route::{FeatureCollection, RouteAlternative};

/// Reply shown when the chat request itself fails
pub const CHAT_FAILURE_REPLY: &str = "Sorry, something went wrong. Please try again.";

/// Status line shown alongside [`CHAT_FAILURE_REPLY`]
pub const CHAT_FAILURE_STATUS: &str = "Chat request failed. Please try again.";

/// Sends a chat message to the backend
pub trait ChatService {
    fn chat(&self, message: &str) -> impl Future<Output = Result<ChatReply>> + Send;
}

/// Body of a `/chat` response
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub response: Option<String>,

    #[serde(default)]
    pub route_geojson: Option<FeatureCollection>,

    #[serde(default)]
    pub start_coords: Option<GeoPoint>,

    #[serde(default)]
    pub end_coords: Option<GeoPoint>,

    #[serde(default)]
    pub error: Option<String>,
}

/// A route delivered through chat, ready to replace the session's route
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRoute {
    pub start: Option<GeoPoint>,
    pub end: Option<GeoPoint>,
    pub alternative: RouteAlternative,
}

impl ChatReply {
    /// Text to show in the conversation
    pub fn text(&self) -> String {
        match (&self.error, &self.response) {
            (Some(error), _) => error.clone(),
            (None, Some(response)) => response.clone(),
            (None, None) => CHAT_FAILURE_REPLY.to_string(),
        }
    }

    /// The route carried by this reply, if any
    ///
    /// An error reply never carries a route, and a collection without features
    /// is treated as no route at all.
    pub fn into_route(self) -> Option<ChatRoute> {
        if self.error.is_some() {
            return None;
        }
        let collection = self.route_geojson.filter(|c| !c.features.is_empty())?;
        let totals = collection.server_totals();
        Some(ChatRoute {
            start: self.start_coords,
            end: self.end_coords,
            alternative: RouteAlternative::from_collection(collection, totals),
        })
    }
}
