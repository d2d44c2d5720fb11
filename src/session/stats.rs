use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::SessionState;

/// Statistics about a diagnosis/chat session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Session identifier from the session config
    pub session_id: String,

    /// When the controller was created
    pub started_at: DateTime<Utc>,

    /// Current session state
    pub state: SessionState,

    /// Classify requests issued
    pub diagnoses_requested: usize,

    /// Classifications that reached the presentation layer
    pub diagnoses_applied: usize,

    /// Classify requests that resolved with an error
    pub diagnoses_failed: usize,

    /// Classify results dropped because a newer request replaced them
    pub diagnoses_superseded: usize,

    /// Chat messages sent to the service
    pub chat_messages_sent: usize,

    /// Chat messages answered with the apology turn
    pub chat_messages_failed: usize,

    /// Number of transcript turns so far
    pub transcript_len: usize,
}
