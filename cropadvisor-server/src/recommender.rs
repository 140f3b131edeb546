//! Client for the external crop recommendation model
//!
//! The model runs as a separate HTTP service exposing `POST /predict`,
//! taking soil and climate readings and answering with a recommended crop.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;

/// Source of crop recommendations
pub trait Recommender: Send + Sync {
    /// Forward model inputs and return the service's JSON answer
    fn recommend(&self, input: &Value) -> Result<Value, String>;
}

/// Recommender backed by the model's HTTP endpoint
pub struct HttpRecommender {
    base_url: String,
    timeout: Duration,
}

impl HttpRecommender {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn predict_url(&self) -> String {
        format!("{}/predict", self.base_url)
    }
}

impl Recommender for HttpRecommender {
    // Blocking client: must be called off the async runtime (spawn_blocking)
    fn recommend(&self, input: &Value) -> Result<Value, String> {
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        let response = client
            .post(self.predict_url())
            .json(input)
            .send()
            .map_err(|e| e.to_string())?;

        let status = response.status();
        let body: Value = response.json().map_err(|e| e.to_string())?;

        if !status.is_success() {
            let reason = body
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("recommender answered {}", status));
            return Err(reason);
        }

        tracing::info!(
            recommended_crop = ?body.get("recommended_crop"),
            "Crop recommendation received"
        );
        Ok(body)
    }
}
