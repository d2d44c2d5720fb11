//! Mapping from service responses to presentation actions
//!
//! Pure functions only. The controller decides when to call them and where
//! their output goes.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::client::ClassificationResult;
use crate::session::{ChatTurn, Speaker};

/// Reply shown in the transcript whenever a chat request fails
pub const CHAT_APOLOGY: &str =
    "Sorry, I couldn't reach the assistant right now. Please try again in a moment.";

/// Arrhythmia categories produced by the classifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArrhythmiaLabel {
    Normal,
    SupraventricularEctopic,
    VentricularEctopic,
    Fusion,
    Unknown,
    /// A label outside the known set, kept verbatim
    Unrecognized(String),
}

impl ArrhythmiaLabel {
    /// Parse a wire label, ignoring case, whitespace, `_` and `-`
    pub fn from_wire(label: &str) -> Self {
        let normalized: String = label
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "normal" => Self::Normal,
            "supraventricularectopic" => Self::SupraventricularEctopic,
            "ventricularectopic" => Self::VentricularEctopic,
            "fusion" => Self::Fusion,
            "unknown" => Self::Unknown,
            _ => Self::Unrecognized(label.to_string()),
        }
    }

    /// Label for a model class index
    pub fn from_class_id(class_id: u32) -> Self {
        match class_id {
            0 => Self::Normal,
            1 => Self::SupraventricularEctopic,
            2 => Self::VentricularEctopic,
            3 => Self::Fusion,
            4 => Self::Unknown,
            other => Self::Unrecognized(format!("class {}", other)),
        }
    }
}

impl fmt::Display for ArrhythmiaLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => f.write_str("Normal"),
            Self::SupraventricularEctopic => f.write_str("Supraventricular Ectopic"),
            Self::VentricularEctopic => f.write_str("Ventricular Ectopic"),
            Self::Fusion => f.write_str("Fusion"),
            Self::Unknown => f.write_str("Unknown"),
            Self::Unrecognized(raw) => write!(f, "{} (unrecognized)", raw),
        }
    }
}

/// Animation clips the presentation layer knows how to play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationClip {
    PlayNormal,
    PlayVEctopic,
    PlaySEctopic,
}

/// Instruction for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationCommand {
    pub clip: AnimationClip,

    /// Set when the clip is a fallback for a label the client does not know
    pub warning: Option<String>,
}

impl AnimationCommand {
    fn play(clip: AnimationClip) -> Self {
        Self {
            clip,
            warning: None,
        }
    }
}

/// Stateless mapper from service results to presentation output
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseMapper;

impl ResponseMapper {
    pub fn new() -> Self {
        Self
    }

    /// Pick the animation for a classification
    ///
    /// Fusion and Unknown fall back to the normal clip. An unrecognized label
    /// also plays the normal clip but carries a warning.
    pub fn map_diagnosis(&self, result: &ClassificationResult) -> AnimationCommand {
        match &result.label {
            ArrhythmiaLabel::Normal | ArrhythmiaLabel::Fusion | ArrhythmiaLabel::Unknown => {
                AnimationCommand::play(AnimationClip::PlayNormal)
            }
            ArrhythmiaLabel::VentricularEctopic => {
                AnimationCommand::play(AnimationClip::PlayVEctopic)
            }
            ArrhythmiaLabel::SupraventricularEctopic => {
                AnimationCommand::play(AnimationClip::PlaySEctopic)
            }
            ArrhythmiaLabel::Unrecognized(raw) => {
                warn!("Unrecognized diagnosis label {:?}, playing normal animation", raw);
                AnimationCommand {
                    clip: AnimationClip::PlayNormal,
                    warning: Some(format!("unrecognized diagnosis label {:?}", raw)),
                }
            }
        }
    }

    /// A failed diagnosis has nothing to animate
    pub fn map_diagnosis_failure(&self) -> Option<AnimationCommand> {
        None
    }

    /// Agent turn appended when a chat request fails
    pub fn map_chat_failure(&self) -> ChatTurn {
        ChatTurn {
            speaker: Speaker::Agent,
            text: CHAT_APOLOGY.to_string(),
            timestamp: Utc::now(),
        }
    }
}
