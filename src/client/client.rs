use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

use super::error::RequestError;
use super::messages::{
    ChatRequest, ChatResponse, DiagnosisResponse, HealthResponse, PredictRequest, ServiceErrorBody,
};
use super::types::{ClassificationResult, HealthStatus, RequestPayload, ResponseBody};
use crate::signal::Signal;

/// Transport used by the controller to reach the diagnosis service
///
/// One call per invocation, no retries. Implementations never touch session
/// state.
#[async_trait]
pub trait RequestClient: Send + Sync {
    async fn send(&self, payload: RequestPayload) -> Result<ResponseBody, RequestError>;
}

/// HTTP/JSON client for the `/predict` and `/chat` endpoints
pub struct HttpRequestClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpRequestClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        info!("Diagnosis service at {} (timeout {:?})", base_url, timeout);

        Ok(Self {
            http,
            base_url,
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Change the per-request deadline for subsequent requests
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Classify one heartbeat
    pub async fn classify(&self, signal: &Signal) -> Result<ClassificationResult, RequestError> {
        let body = PredictRequest {
            signal: signal.samples().to_vec(),
        };

        let value: serde_json::Value = self.post_json("/predict", &body).await?;

        // A 200 carrying {"error": ...} means the service could not predict
        if let Ok(service_error) = serde_json::from_value::<ServiceErrorBody>(value.clone()) {
            warn!("Service rejected prediction: {}", service_error.error);
            return Err(RequestError::Decode(format!(
                "/predict: service error: {}",
                service_error.error
            )));
        }

        let response: DiagnosisResponse = serde_json::from_value(value)
            .map_err(|e| decode_failure("/predict", e))?;

        let result = ClassificationResult::try_from(response)?;
        info!(
            "Classified signal as {} (confidence={:.2}, class={})",
            result.label, result.confidence, result.class_index
        );

        Ok(result)
    }

    /// Send a chat message and return the agent's reply
    pub async fn chat(&self, message: &str) -> Result<String, RequestError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(RequestError::EmptyInput);
        }

        let response: ChatResponse = self
            .post_json(
                "/chat",
                &ChatRequest {
                    message: message.to_string(),
                },
            )
            .await?;

        if response.reply.trim().is_empty() {
            warn!("Chat reply was empty");
            return Err(RequestError::Decode("/chat: empty reply".to_string()));
        }

        Ok(response.reply)
    }

    /// Query the service root for liveness and model status
    pub async fn health(&self) -> Result<HealthStatus, RequestError> {
        let url = format!("{}/", self.base_url);

        let response = self
            .http
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| RequestError::from_reqwest("/", e))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RequestError::from_reqwest("/", e))?;

        let health: HealthResponse =
            serde_json::from_slice(&bytes).map_err(|e| decode_failure("/", e))?;

        Ok(health.into())
    }

    async fn post_json<B, T>(&self, endpoint: &str, body: &B) -> Result<T, RequestError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        info!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| RequestError::from_reqwest(endpoint, e))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RequestError::from_reqwest(endpoint, e))?;

        serde_json::from_slice(&bytes).map_err(|e| decode_failure(endpoint, e))
    }
}

#[async_trait]
impl RequestClient for HttpRequestClient {
    async fn send(&self, payload: RequestPayload) -> Result<ResponseBody, RequestError> {
        match payload {
            RequestPayload::Classify(signal) => self
                .classify(&signal)
                .await
                .map(ResponseBody::Classification),
            RequestPayload::Chat(message) => {
                self.chat(&message).await.map(ResponseBody::ChatReply)
            }
        }
    }
}

fn decode_failure(endpoint: &str, err: serde_json::Error) -> RequestError {
    warn!("Failed to decode {} response: {}", endpoint, err);
    RequestError::Decode(format!("{}: {}", endpoint, err))
}
