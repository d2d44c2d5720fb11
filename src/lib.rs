pub mod client;
pub mod config;
pub mod controller;
pub mod mapper;
pub mod session;
pub mod signal;

pub use client::{
    ClassificationResult, HealthStatus, HttpRequestClient, RequestClient, RequestError,
    RequestKind, RequestPayload, ResponseBody,
};
pub use config::Config;
pub use controller::{
    ChatOutcome, DiagnosisOutcome, Notice, NoticeKind, OrchestrationController, PendingRequest,
    Pose, PresentationEvent,
};
pub use mapper::{AnimationClip, AnimationCommand, ArrhythmiaLabel, ResponseMapper};
pub use session::{ChatTurn, SessionConfig, SessionState, SessionStats, Speaker, Transcript};
pub use signal::{Signal, SignalError, DEFAULT_SIGNAL_LENGTH};
