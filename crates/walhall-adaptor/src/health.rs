//! Health and readiness reporting for the adaptor.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Health status of the adaptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Adaptor is healthy.
    Healthy,
    /// Adaptor is unhealthy.
    Unhealthy,
}

/// Readiness status of the adaptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessStatus {
    /// Adaptor is ready to handle traffic.
    Ready,
    /// Adaptor is not ready.
    NotReady,
}

/// Health check response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall health status.
    pub status: HealthStatus,
    /// Uptime in seconds.
    pub uptime_seconds: u64,
    /// Version information.
    pub version: String,
}

/// Readiness check response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Overall readiness status.
    pub status: ReadinessStatus,
}

/// Tracks liveness and readiness for the adaptor process.
///
/// The upstream exposes no health path, so readiness is purely "the listener
/// is bound"; upstream failures surface per-request instead.
#[derive(Debug)]
pub struct HealthChecker {
    start_time: Instant,
    ready: AtomicBool,
}

impl HealthChecker {
    /// Create a health checker; not ready until [`set_ready`](Self::set_ready).
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            ready: AtomicBool::new(false),
        }
    }

    /// Mark the adaptor as ready.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Whether the adaptor is ready.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Perform a liveness check.
    pub fn liveness(&self) -> HealthResponse {
        HealthResponse {
            status: HealthStatus::Healthy,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            version: crate::VERSION.to_string(),
        }
    }

    /// Perform a readiness check.
    pub fn readiness(&self) -> ReadinessResponse {
        let status = if self.is_ready() {
            ReadinessStatus::Ready
        } else {
            ReadinessStatus::NotReady
        };
        ReadinessResponse { status }
    }
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_state() {
        let checker = HealthChecker::new();
        assert!(!checker.is_ready());
        assert_eq!(checker.readiness().status, ReadinessStatus::NotReady);

        checker.set_ready(true);
        assert!(checker.is_ready());
        assert_eq!(checker.readiness().status, ReadinessStatus::Ready);
    }

    #[test]
    fn test_liveness_reports_version() {
        let checker = HealthChecker::new();
        let response = checker.liveness();
        assert_eq!(response.status, HealthStatus::Healthy);
        assert_eq!(response.version, crate::VERSION);
    }

    #[test]
    fn test_serialization() {
        let checker = HealthChecker::new();
        let json = serde_json::to_string(&checker.liveness()).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("uptime_seconds"));
    }
}
