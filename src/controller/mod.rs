//! Intent handling for the placed-object session
//!
//! - Placement, diagnose and chat intents come in from the host
//! - Requests go out through a `RequestClient`
//! - Presentation events and transcript turns come back out on a channel

mod events;
mod orchestration;

pub use events::{Notice, NoticeKind, Pose, PresentationEvent};
pub use orchestration::{ChatOutcome, DiagnosisOutcome, OrchestrationController, PendingRequest};
