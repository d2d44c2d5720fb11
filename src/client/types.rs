use serde::{Deserialize, Serialize};

use super::error::RequestError;
use super::messages::{DiagnosisResponse, HealthResponse};
use crate::mapper::ArrhythmiaLabel;
use crate::signal::Signal;

/// The two request kinds the service understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestKind {
    Classify,
    Chat,
}

/// What to send
#[derive(Debug, Clone)]
pub enum RequestPayload {
    Classify(Signal),
    Chat(String),
}

impl RequestPayload {
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::Classify(_) => RequestKind::Classify,
            Self::Chat(_) => RequestKind::Chat,
        }
    }
}

/// Decoded answer, one variant per request kind
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Classification(ClassificationResult),
    ChatReply(String),
}

/// A complete classifier verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: ArrhythmiaLabel,

    /// Probability of `label`, within [0, 1]
    pub confidence: f64,

    pub class_index: u32,
}

impl TryFrom<DiagnosisResponse> for ClassificationResult {
    type Error = RequestError;

    fn try_from(response: DiagnosisResponse) -> Result<Self, Self::Error> {
        if !response.confidence.is_finite() || !(0.0..=1.0).contains(&response.confidence) {
            return Err(RequestError::Decode(format!(
                "confidence {} outside [0, 1]",
                response.confidence
            )));
        }

        Ok(Self {
            label: ArrhythmiaLabel::from_wire(&response.arrhythmia_type),
            confidence: response.confidence,
            class_index: response.class_id,
        })
    }
}

/// Service liveness as reported by `GET /`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub model_loaded: bool,
}

impl HealthStatus {
    pub fn is_ready(&self) -> bool {
        self.status == "ok" && self.model_loaded
    }
}

impl From<HealthResponse> for HealthStatus {
    fn from(response: HealthResponse) -> Self {
        Self {
            status: response.status,
            model_loaded: response.model_loaded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(confidence: f64) -> DiagnosisResponse {
        DiagnosisResponse {
            arrhythmia_type: "Ventricular Ectopic".to_string(),
            confidence,
            class_id: 2,
        }
    }

    #[test]
    fn builds_result_from_valid_response() {
        let result = ClassificationResult::try_from(response(0.92)).unwrap();
        assert_eq!(result.label, ArrhythmiaLabel::VentricularEctopic);
        assert_eq!(result.class_index, 2);
    }

    #[test]
    fn rejects_out_of_range_confidence() {
        for confidence in [-0.1, 1.5, f64::NAN] {
            let err = ClassificationResult::try_from(response(confidence)).unwrap_err();
            assert!(err.is_decode(), "{}", confidence);
        }
    }

    #[test]
    fn payload_reports_kind() {
        let signal = Signal::new(vec![0.0; 4]).unwrap();
        assert_eq!(RequestPayload::Classify(signal).kind(), RequestKind::Classify);
        assert_eq!(RequestPayload::Chat("hi".into()).kind(), RequestKind::Chat);
    }
}
