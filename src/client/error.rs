use thiserror::Error;

/// Failure of a single request to the diagnosis service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Connection failure, timeout or non-2xx status
    #[error("transport error: {0}")]
    Transport(String),

    /// 2xx response whose body is not the expected shape
    #[error("decode error: {0}")]
    Decode(String),

    /// Blank chat message, rejected before any network call
    #[error("message is empty")]
    EmptyInput,
}

impl RequestError {
    /// Map a reqwest failure on `endpoint` into the request taxonomy
    pub(crate) fn from_reqwest(endpoint: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Transport(format!("{} timed out", endpoint));
        }

        if let Some(status) = err.status() {
            return Self::Transport(format!("{} returned {}", endpoint, status));
        }

        if err.is_decode() {
            return Self::Decode(format!("{}: {}", endpoint, err));
        }

        Self::Transport(format!("{}: {}", endpoint, err))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}
