use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::signal::DEFAULT_SIGNAL_LENGTH;

/// Configuration for one controller session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier (e.g., "session-2f1c...")
    pub session_id: String,

    /// Upper bound on a single request, expiry surfaces as a transport error
    /// Default: 10 seconds
    pub request_timeout: Duration,

    /// Samples per signal expected by the classifier
    pub signal_length: usize,

    /// Presentation events queued for the host before new ones are dropped
    pub event_buffer: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("session-{}", uuid::Uuid::new_v4()),
            request_timeout: Duration::from_secs(10),
            signal_length: DEFAULT_SIGNAL_LENGTH,
            event_buffer: 100,
        }
    }
}
