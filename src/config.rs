//! Configuration types.

use std::time::Duration;

/// Session manager configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Page size requested from the list endpoint (server default when None).
    pub page_size: Option<u32>,
    /// Optional deadline applied to every gateway call.
    pub gateway_timeout: Option<Duration>,
    /// Capacity of the session event broadcast channel.
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            page_size: Some(20),
            gateway_timeout: None,
            event_capacity: 64,
        }
    }
}
