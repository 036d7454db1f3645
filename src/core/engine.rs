//! Route orchestration
//!
//! [`RouteEngine`] owns the session and drives every interaction: map picks,
//! find-path requests, chat messages, reset. Each pass records the session
//! generation when it starts and re-checks it after every suspension point; if a
//! reset, a chat route or a newer find-path happened meanwhile, the late result is dropped with
//! [`Error::Superseded`] instead of being written into the session.

use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, error, info, warn};

use crate::core::chat::{ChatService, CHAT_FAILURE_REPLY, CHAT_FAILURE_STATUS};
use crate::core::client::{GeoapifyGeocoder, HttpBackend};
use crate::core::config::{RemoteConfig, ServiceConfig};
use crate::core::coordinator::{BusyIndicator, RouteCoordinator, RoutingService};
use crate::core::error::{Endpoint, Error, Result};
use crate::core::geo::validate;
use crate::core::geo::GeoPoint;
use crate::core::ranker::{rank, RankedRoutes};
use crate::core::resolver::{resolve_pair, EndpointInput, Geocoder};
use crate::core::route::RouteRequest;
use crate::core::session::{PickOutcome, RenderUpdate, SessionState, BOTH_SET_MESSAGE, RESET_MESSAGE};

/// Endpoint fields as entered by the user for one find-path action
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteForm {
    pub start: EndpointInput,
    pub end: EndpointInput,
}

/// What a chat message produced
#[derive(Debug, Clone, PartialEq)]
pub struct ChatOutcome {
    /// Text for the conversation pane
    pub reply: String,
    /// Full screen update; present when the reply carried a route or the request failed
    pub update: Option<RenderUpdate>,
}

pub struct RouteEngine<B, G> {
    coordinator: RouteCoordinator<B>,
    geocoder: G,
    remote: RemoteConfig,
    state: Mutex<SessionState>,
}

impl RouteEngine<HttpBackend, GeoapifyGeocoder> {
    /// Start a session against real services; fails if `/config` cannot be loaded
    pub async fn connect(config: ServiceConfig, indicator: Arc<dyn BusyIndicator>) -> Result<Self> {
        let backend = HttpBackend::new(config.clone());
        let remote = backend.fetch_config().await?;

        let api_key = remote.geoapify_api_key.clone().unwrap_or_else(|| {
            warn!("Backend did not provide a geocoding key; place names will not resolve");
            String::new()
        });
        let geocoder = GeoapifyGeocoder::new(config, api_key);

        info!("Session configured from {}", backend.config().config_url());
        Ok(Self::new(backend, geocoder, indicator).with_remote(remote))
    }
}

impl<B, G> RouteEngine<B, G> {
    pub fn remote_config(&self) -> &RemoteConfig {
        &self.remote
    }

    fn with_remote(mut self, remote: RemoteConfig) -> Self {
        self.remote = remote;
        self
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        // State is only touched in short synchronous sections; a poisoned lock still holds valid data
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Copy of the current session
    pub fn session(&self) -> SessionState {
        self.state().clone()
    }

    /// Current screen contents
    pub fn snapshot(&self, status_message: &str) -> RenderUpdate {
        self.state().snapshot(status_message)
    }

    /// Screen contents after a failed action
    pub fn render_error(&self, error: &Error) -> RenderUpdate {
        self.state().failure(error)
    }

    /// Clear endpoints and route; anything still pending is discarded when it lands
    pub fn reset(&self) -> RenderUpdate {
        let mut state = self.state();
        state.reset();
        debug!("Session reset (generation {})", state.generation());
        state.snapshot(RESET_MESSAGE)
    }

    /// Flip the chat pane between minimized and open; returns the new minimized flag
    pub fn toggle_chat(&self) -> bool {
        let mut state = self.state();
        state.chat_minimized = !state.chat_minimized;
        state.chat_minimized
    }
}

impl<B: RoutingService, G: Geocoder> RouteEngine<B, G> {
    pub fn new(backend: B, geocoder: G, indicator: Arc<dyn BusyIndicator>) -> Self {
        Self {
            coordinator: RouteCoordinator::new(backend, indicator),
            geocoder,
            remote: RemoteConfig::default(),
            state: Mutex::new(SessionState::new()),
        }
    }

    pub fn backend(&self) -> &B {
        self.coordinator.backend()
    }

    /// Handle a direct map pick; the second pick triggers path finding
    pub async fn pick(&self, point: GeoPoint) -> Result<RenderUpdate> {
        let outcome = self.state().pick(point);
        match outcome {
            PickOutcome::StartSet => {
                debug!("Start point set: {point}");
                Ok(self.snapshot("Start point set. Pick the end point."))
            }
            PickOutcome::EndSet => {
                debug!("End point set: {point}");
                self.find_path(&RouteForm::default()).await
            }
            PickOutcome::Ignored => Ok(self.snapshot(BOTH_SET_MESSAGE)),
        }
    }

    /// Resolve both endpoints, request a route and make it the active one
    ///
    /// Each pass takes a fresh generation, so a pass still resolving endpoints is
    /// superseded by a newer one. A pass started while a route request is in flight
    /// is rejected.
    pub async fn find_path(&self, form: &RouteForm) -> Result<RenderUpdate> {
        let (generation, start_input, end_input) = {
            let mut state = self.state();
            if self.coordinator.is_busy() {
                return Err(Error::RequestInProgress);
            }
            (
                state.advance(),
                form.start.clone().with_existing(state.start),
                form.end.clone().with_existing(state.end),
            )
        };

        let (start, end) = resolve_pair(&self.geocoder, &start_input, &end_input).await;
        let start = start.and_then(|p| validate(p, Endpoint::Start));
        let end = end.and_then(|p| validate(p, Endpoint::End));

        {
            let mut state = self.state();
            if !state.is_current(generation) {
                debug!("Discarding endpoint resolution from generation {generation}");
                return Err(Error::Superseded);
            }
            record_endpoint(&mut state, Endpoint::Start, &start);
            record_endpoint(&mut state, Endpoint::End, &end);
        }

        let request = match (start, end) {
            (Ok(start), Ok(end)) => RouteRequest { start, end },
            (Err(e), Ok(_)) | (Ok(_), Err(e)) => return Err(e),
            (Err(start), Err(end)) => {
                return Err(Error::Endpoints {
                    start: Box::new(start),
                    end: Box::new(end),
                })
            }
        };

        self.state().request_in_flight = true;
        let result = self.coordinator.request_route(request).await;

        let mut state = self.state();
        state.request_in_flight = self.coordinator.is_busy();
        if !state.is_current(generation) {
            debug!("Discarding route response from generation {generation}");
            return Err(Error::Superseded);
        }

        let ranked = match result.and_then(rank) {
            Ok(ranked) => ranked,
            Err(Error::RequestInProgress) => return Err(Error::RequestInProgress),
            Err(e) => {
                warn!("Pathfinding failed: {e}");
                state.active = None;
                return Err(e);
            }
        };

        let message = route_message(&ranked);
        info!("{message}");
        state.active = Some(ranked);
        Ok(state.snapshot(message))
    }
}

impl<B: RoutingService + ChatService, G: Geocoder> RouteEngine<B, G> {
    /// Send a chat message; a returned route replaces the session's endpoints and route
    pub async fn chat(&self, message: &str) -> ChatOutcome {
        let message = message.trim();
        if message.is_empty() {
            return ChatOutcome {
                reply: String::new(),
                update: None,
            };
        }

        let reply = match self.coordinator.backend().chat(message).await {
            Ok(reply) => reply,
            // Backend rejected the message and said why
            Err(Error::ServiceError(msg)) => {
                warn!("Chat request rejected: {msg}");
                return ChatOutcome { reply: msg, update: None };
            }
            Err(e) => {
                error!("Chat request failed: {e}");
                return ChatOutcome {
                    reply: CHAT_FAILURE_REPLY.to_string(),
                    update: Some(self.snapshot(CHAT_FAILURE_STATUS)),
                };
            }
        };

        let text = reply.text();
        let Some(route) = reply.into_route() else {
            return ChatOutcome { reply: text, update: None };
        };

        let segments = route.alternative.segments.len();
        let mut state = self.state();
        state.advance();
        state.start = route.start;
        state.end = route.end;
        state.active = rank(vec![route.alternative]).ok();
        debug!("Chat route applied (generation {})", state.generation());

        ChatOutcome {
            reply: text,
            update: Some(state.snapshot(format!("Path found with {segments} segments."))),
        }
    }
}

/// Store a resolved endpoint; an out-of-bounds one is cleared so it can be re-entered
fn record_endpoint(state: &mut SessionState, endpoint: Endpoint, result: &Result<GeoPoint>) {
    match result {
        Ok(point) => state.set_endpoint(endpoint, Some(*point)),
        Err(Error::OutOfBounds { .. }) => state.set_endpoint(endpoint, None),
        Err(_) => {}
    }
}

fn route_message(ranked: &RankedRoutes) -> String {
    if ranked.len() == 1 {
        format!("Path found with {} segments.", ranked.best().segments.len())
    } else {
        let totals = ranked.best().summary().totals();
        format!(
            "Shortest of {} routes: {} ({}).",
            ranked.len(),
            totals.formatted_time,
            totals.distance_label()
        )
    }
}
