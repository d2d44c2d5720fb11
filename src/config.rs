use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

use crate::session::SessionConfig;
use crate::signal::DEFAULT_SIGNAL_LENGTH;

/// Environment variables override the file, e.g. `ECG_ASSISTANT__BACKEND__BASE_URL`
const ENV_PREFIX: &str = "ECG_ASSISTANT";

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub backend: BackendConfig,
    pub signal: SignalConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct SignalConfig {
    pub length: usize,
}

impl Config {
    /// Load `path` (extension optional, file optional) over built-in defaults
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.name", "ecg-assistant")?
            .set_default("backend.base_url", "http://127.0.0.1:8000")?
            .set_default("backend.request_timeout_ms", 10_000_i64)?
            .set_default("signal.length", DEFAULT_SIGNAL_LENGTH as i64)?
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.backend.request_timeout_ms)
    }

    /// Session settings for a new controller
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            request_timeout: self.request_timeout(),
            signal_length: self.signal.length,
            ..SessionConfig::default()
        }
    }
}
