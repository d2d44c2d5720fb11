use serde::{Deserialize, Serialize};

/// Body of `POST /predict`
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictRequest {
    pub signal: Vec<f32>,
}

/// Successful `POST /predict` answer
#[derive(Debug, Serialize, Deserialize)]
pub struct DiagnosisResponse {
    pub arrhythmia_type: String,
    pub confidence: f64,
    pub class_id: u32,
}

/// Body of `POST /chat`
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Successful `POST /chat` answer
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// `GET /` answer
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
}

/// Error object the service returns with a 200 status (e.g. model not loaded)
#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceErrorBody {
    pub error: String,
}
