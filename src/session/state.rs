use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Lifecycle of the placed object and its diagnosis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionState {
    /// Nothing placed yet
    #[default]
    Empty,
    /// Object placed, never diagnosed
    Placed,
    /// A classify request is in flight
    DiagnosisPending,
    /// The last classify request resolved (successfully or not)
    Diagnosed,
}

/// Operations that move the session between states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionOperation {
    PlaceObject,
    RequestDiagnosis,
    ResolveDiagnosis,
}

impl fmt::Display for SessionOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlaceObject => f.write_str("place object"),
            Self::RequestDiagnosis => f.write_str("request diagnosis"),
            Self::ResolveDiagnosis => f.write_str("resolve diagnosis"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {operation} while session is {from:?}")]
pub struct InvalidTransition {
    pub from: SessionState,
    pub operation: SessionOperation,
}

impl SessionState {
    /// Empty -> Placed
    pub fn place_object(&mut self) -> Result<(), InvalidTransition> {
        match self {
            Self::Empty => self.advance(Self::Placed),
            _ => Err(self.reject(SessionOperation::PlaceObject)),
        }
    }

    /// Placed | Diagnosed -> DiagnosisPending
    pub fn request_diagnosis(&mut self) -> Result<(), InvalidTransition> {
        match self {
            Self::Placed | Self::Diagnosed => self.advance(Self::DiagnosisPending),
            _ => Err(self.reject(SessionOperation::RequestDiagnosis)),
        }
    }

    /// DiagnosisPending -> Diagnosed, whether the request succeeded or not
    pub fn diagnosis_resolved(&mut self, success: bool) -> Result<(), InvalidTransition> {
        match self {
            Self::DiagnosisPending => {
                debug!("Diagnosis resolved (success={})", success);
                self.advance(Self::Diagnosed)
            }
            _ => Err(self.reject(SessionOperation::ResolveDiagnosis)),
        }
    }

    /// Back to Empty from any state
    pub fn reset(&mut self) {
        debug!("Session state {:?} -> {:?}", self, Self::Empty);
        *self = Self::Empty;
    }

    /// Whether an object is in the scene
    pub fn has_object(&self) -> bool {
        !matches!(self, Self::Empty)
    }

    fn advance(&mut self, next: Self) -> Result<(), InvalidTransition> {
        debug!("Session state {:?} -> {:?}", self, next);
        *self = next;
        Ok(())
    }

    fn reject(&self, operation: SessionOperation) -> InvalidTransition {
        InvalidTransition {
            from: *self,
            operation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_lifecycle_with_rediagnosis() {
        let mut state = SessionState::default();
        assert_eq!(state, SessionState::Empty);

        state.place_object().unwrap();
        state.request_diagnosis().unwrap();
        state.diagnosis_resolved(true).unwrap();
        assert_eq!(state, SessionState::Diagnosed);

        state.request_diagnosis().unwrap();
        assert_eq!(state, SessionState::DiagnosisPending);
        state.diagnosis_resolved(false).unwrap();
        assert_eq!(state, SessionState::Diagnosed);
    }

    #[test]
    fn placement_only_once() {
        let mut state = SessionState::Empty;
        state.place_object().unwrap();

        let err = state.place_object().unwrap_err();
        assert_eq!(err.from, SessionState::Placed);
        assert_eq!(err.operation, SessionOperation::PlaceObject);
        assert_eq!(state, SessionState::Placed);
    }

    #[test]
    fn diagnosis_requires_placement_and_no_pending_request() {
        let mut state = SessionState::Empty;
        assert!(state.request_diagnosis().is_err());
        assert_eq!(state, SessionState::Empty);

        let mut state = SessionState::DiagnosisPending;
        assert!(state.request_diagnosis().is_err());
        assert_eq!(state, SessionState::DiagnosisPending);
    }

    #[test]
    fn resolution_only_while_pending() {
        for start in [
            SessionState::Empty,
            SessionState::Placed,
            SessionState::Diagnosed,
        ] {
            let mut state = start;
            assert!(state.diagnosis_resolved(true).is_err());
            assert_eq!(state, start);
        }
    }

    #[test]
    fn reset_returns_to_empty() {
        let mut state = SessionState::DiagnosisPending;
        state.reset();
        assert!(!state.has_object());
        state.place_object().unwrap();
    }

    #[test]
    fn invalid_transition_message() {
        let err = InvalidTransition {
            from: SessionState::Empty,
            operation: SessionOperation::RequestDiagnosis,
        };
        assert_eq!(
            err.to_string(),
            "cannot request diagnosis while session is Empty"
        );
    }
}
