//! Body of `GET /health`.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Overall verdict plus one entry per dependency that was probed.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "status": "healthy",
    "version": "0.3.1",
    "timestamp": "2025-03-01T08:30:00Z",
    "checks": {
        "database": {
            "status": "healthy",
            "message": "SELECT 1 answered",
            "response_time_ms": 3
        }
    }
}))]
pub struct HealthResponse {
    /// Worst status among `checks`
    pub status: HealthStatus,
    #[schema(example = "0.3.1")]
    pub version: String,
    #[schema(value_type = String, format = DateTime, example = "2025-03-01T08:30:00Z")]
    pub timestamp: Timestamp,
    /// Keyed by dependency name
    pub checks: BTreeMap<String, ComponentHealth>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    /// Reachable but slow
    Degraded,
    Unhealthy,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealth {
    pub status: HealthStatus,
    /// What the check observed, or why it failed
    #[schema(example = "SELECT 1 answered")]
    pub message: Option<String>,
    /// Wall time of the check
    #[schema(example = 3)]
    pub response_time_ms: Option<u64>,
}

impl ComponentHealth {
    pub fn healthy(message: &str, response_time_ms: u64) -> Self {
        Self {
            status: HealthStatus::Healthy,
            message: Some(message.to_string()),
            response_time_ms: Some(response_time_ms),
        }
    }

    pub fn unhealthy(message: String, response_time_ms: u64) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            message: Some(message),
            response_time_ms: Some(response_time_ms),
        }
    }
}
