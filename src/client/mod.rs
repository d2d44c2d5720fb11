pub mod client;
pub mod error;
pub mod messages;
pub mod types;

pub use client::{HttpRequestClient, RequestClient};
pub use error::RequestError;
pub use messages::{ChatRequest, ChatResponse, DiagnosisResponse, HealthResponse, PredictRequest};
pub use types::{
    ClassificationResult, HealthStatus, RequestKind, RequestPayload, ResponseBody,
};
