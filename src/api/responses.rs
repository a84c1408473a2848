//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::view::{preset_label, ViewResponse};

/// API response structure for intent endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    /// `applied` when the intent changed something, `ignored` otherwise
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Id of a newly added timer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub view: ViewResponse,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: &str, message: String, view: ViewResponse) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            id: None,
            view,
        }
    }

    pub fn applied(message: String, view: ViewResponse) -> Self {
        Self::new("applied", message, view)
    }

    pub fn ignored(message: String, view: ViewResponse) -> Self {
        Self::new("ignored", message, view)
    }

    pub fn with_id(mut self, id: Option<u64>) -> Self {
        self.id = id;
        self
    }
}

/// Full status response with server metadata
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub view: ViewResponse,
    pub ticking: bool,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// One preset button
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetResponse {
    pub index: usize,
    pub seconds: u64,
    pub label: String,
}

impl PresetResponse {
    pub fn new(index: usize, seconds: u64) -> Self {
        Self {
            index,
            seconds,
            label: preset_label(seconds),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
