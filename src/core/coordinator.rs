//! Route request lifecycle
//!
//! A session has one routing slot. [`RouteCoordinator::request_route`] takes it,
//! shows the busy indicator, calls the backend and releases both on every exit path
//! through [`BusyGuard`]. A call made while the slot is taken is rejected before any
//! network traffic.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, warn};

use crate::core::error::{Error, Result};
use crate::core::route::{PathResponse, RouteAlternative, RouteRequest};

/// Computes routes between two points
pub trait RoutingService {
    fn find_path(&self, request: &RouteRequest) -> impl Future<Output = Result<PathResponse>> + Send;
}

/// Something that can display "working..." to the user
pub trait BusyIndicator: Send + Sync {
    fn show(&self, message: &str);
    fn clear(&self);
}

/// Indicator for callers without a UI
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopIndicator;

impl BusyIndicator for NoopIndicator {
    fn show(&self, _message: &str) {}
    fn clear(&self) {}
}

/// Owns the single in-flight routing slot
pub struct RouteCoordinator<B> {
    backend: B,
    in_flight: AtomicBool,
    indicator: Arc<dyn BusyIndicator>,
}

/// Holds the slot while a request runs; dropping it clears the indicator and frees the slot
struct BusyGuard<'a> {
    in_flight: &'a AtomicBool,
    indicator: &'a dyn BusyIndicator,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.indicator.clear();
        self.in_flight.store(false, Ordering::Release);
    }
}

impl<B: RoutingService> RouteCoordinator<B> {
    pub fn new(backend: B, indicator: Arc<dyn BusyIndicator>) -> Self {
        Self {
            backend,
            in_flight: AtomicBool::new(false),
            indicator,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn acquire(&self) -> Result<BusyGuard<'_>> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::RequestInProgress);
        }
        self.indicator.show("Finding route...");
        Ok(BusyGuard {
            in_flight: &self.in_flight,
            indicator: self.indicator.as_ref(),
        })
    }

    /// Request a route; returns every alternative the backend produced
    ///
    /// Zero alternatives is reported as `EmptyResult` so callers can say "no route"
    /// rather than "error".
    pub async fn request_route(&self, request: RouteRequest) -> Result<Vec<RouteAlternative>> {
        let _guard = self.acquire().map_err(|e| {
            warn!("Route request rejected: {e}");
            e
        })?;

        let alternatives = self.backend.find_path(&request).await?.into_alternatives()?;
        debug!("Routing service returned {} alternative(s)", alternatives.len());

        if alternatives.is_empty() {
            return Err(Error::EmptyResult);
        }
        Ok(alternatives)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::GeoPoint;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    /// Backend that holds its first call open until released
    struct GatedBackend {
        calls: AtomicUsize,
        gated: AtomicBool,
        gate: Notify,
        body: serde_json::Value,
    }

    impl GatedBackend {
        fn new(body: serde_json::Value) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                gated: AtomicBool::new(true),
                gate: Notify::new(),
                body,
            }
        }

        fn release(&self) {
            self.gate.notify_one();
        }
    }

    impl RoutingService for GatedBackend {
        async fn find_path(&self, _request: &RouteRequest) -> Result<PathResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.gated.swap(false, Ordering::SeqCst) {
                self.gate.notified().await;
            }
            PathResponse::parse(&self.body.to_string())
        }
    }

    /// Backend with a fixed outcome
    struct FixedBackend(fn() -> Result<PathResponse>);

    impl RoutingService for FixedBackend {
        async fn find_path(&self, _request: &RouteRequest) -> Result<PathResponse> {
            (self.0)()
        }
    }

    #[derive(Default)]
    struct RecordingIndicator {
        events: Mutex<Vec<&'static str>>,
    }

    impl BusyIndicator for RecordingIndicator {
        fn show(&self, _message: &str) {
            self.events.lock().unwrap().push("show");
        }
        fn clear(&self) {
            self.events.lock().unwrap().push("clear");
        }
    }

    fn request() -> RouteRequest {
        RouteRequest {
            start: GeoPoint::new(51.04, -114.07),
            end: GeoPoint::new(51.05, -114.06),
        }
    }

    fn one_route() -> serde_json::Value {
        json!({"features": [{"properties": {"name": "Memorial Dr", "length": 1500.0, "travel_time": 100.0}}]})
    }

    #[tokio::test]
    async fn test_second_request_rejected_while_busy() {
        let coordinator = RouteCoordinator::new(GatedBackend::new(one_route()), Arc::new(NoopIndicator));

        let first = coordinator.request_route(request());
        let second = async {
            tokio::task::yield_now().await;
            assert!(coordinator.is_busy());
            let result = coordinator.request_route(request()).await;
            coordinator.backend().release();
            result
        };
        let (first, second) = tokio::join!(first, second);

        assert_eq!(first.unwrap().len(), 1);
        assert!(matches!(second, Err(Error::RequestInProgress)));
        assert_eq!(coordinator.backend().calls.load(Ordering::SeqCst), 1);

        // Slot is free again
        assert!(!coordinator.is_busy());
        assert!(coordinator.request_route(request()).await.is_ok());
        assert_eq!(coordinator.backend().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_indicator_cleared_on_every_exit() {
        let outcomes: [fn() -> Result<PathResponse>; 4] = [
            || PathResponse::parse(r#"{"features": [{"properties": {"name": "A"}}]}"#),
            || Err(Error::ServiceError("boom".to_string())),
            || Err(Error::NetworkFailure("reset by peer".to_string())),
            || PathResponse::parse(r#"{"routes": []}"#),
        ];

        for outcome in outcomes {
            let indicator = Arc::new(RecordingIndicator::default());
            let coordinator = RouteCoordinator::new(FixedBackend(outcome), indicator.clone());
            let _ = coordinator.request_route(request()).await;

            assert!(!coordinator.is_busy());
            assert_eq!(*indicator.events.lock().unwrap(), vec!["show", "clear"]);
        }
    }

    #[tokio::test]
    async fn test_empty_routes_is_empty_result() {
        let coordinator = RouteCoordinator::new(
            FixedBackend(|| PathResponse::parse(r#"{"routes": []}"#)),
            Arc::new(NoopIndicator),
        );
        assert!(matches!(coordinator.request_route(request()).await, Err(Error::EmptyResult)));
    }

    #[tokio::test]
    async fn test_error_body_on_success_status_is_service_error() {
        let coordinator = RouteCoordinator::new(
            FixedBackend(|| PathResponse::parse(r#"{"error": "One or both points are outside the Calgary road network"}"#)),
            Arc::new(NoopIndicator),
        );
        match coordinator.request_route(request()).await {
            Err(Error::ServiceError(msg)) => assert!(msg.contains("road network")),
            other => panic!("expected ServiceError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rejected_request_leaves_indicator_alone() {
        let indicator = Arc::new(RecordingIndicator::default());
        let coordinator = RouteCoordinator::new(GatedBackend::new(one_route()), indicator.clone());

        let first = coordinator.request_route(request());
        let second = async {
            tokio::task::yield_now().await;
            let result = coordinator.request_route(request()).await;
            coordinator.backend().release();
            result
        };
        let (_, second) = tokio::join!(first, second);

        assert!(second.is_err());
        assert_eq!(*indicator.events.lock().unwrap(), vec!["show", "clear"]);
    }
}
