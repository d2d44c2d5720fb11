//! Events exchanged with the host: placement input, presentation output.

use serde::{Deserialize, Serialize};

use crate::client::{ClassificationResult, RequestError};
use crate::mapper::AnimationCommand;
use crate::session::ChatTurn;

/// Where the host placed the object (meters, unit quaternion)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: [f32; 3],
    pub rotation: [f32; 4],
}

/// Instructions for the rendering and transcript sinks
#[derive(Debug, Clone, PartialEq)]
pub enum PresentationEvent {
    /// Object placed; show diagnose and chat controls
    RevealAffordances,
    Animate(AnimationCommand),
    DiagnosisAvailable(ClassificationResult),
    Notice(Notice),
    TranscriptAppended(ChatTurn),
    SessionReset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeKind {
    Transport,
    Decode,
}

/// User-visible message for a failed diagnosis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    /// Guard errors have no notice
    pub fn from_error(err: &RequestError) -> Option<Self> {
        let (kind, message) = match err {
            RequestError::EmptyInput => return None,
            RequestError::Transport(detail) => (
                NoticeKind::Transport,
                format!("Couldn't reach the diagnosis service ({}). Please try again.", detail),
            ),
            RequestError::Decode(detail) => (
                NoticeKind::Decode,
                format!("The diagnosis service sent an unexpected answer ({}).", detail),
            ),
        };

        Some(Self { kind, message })
    }
}
