//! Session bookkeeping
//!
//! This module provides the pieces of per-session state the controller owns:
//! - The placement/diagnosis state machine
//! - The append-only chat transcript
//! - Session statistics and configuration

mod config;
mod state;
mod stats;
mod transcript;

pub use config::SessionConfig;
pub use state::{InvalidTransition, SessionOperation, SessionState};
pub use stats::SessionStats;
pub use transcript::{ChatTurn, Speaker, Transcript};
