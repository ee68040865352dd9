//! Client for the remote span-prediction model server.
//!
//! The server is an opaque HTTP endpoint: it takes a review and answers with
//! three parallel arrays (`segments`, `labels`, `scores`).

use serde::{Deserialize, Serialize};
use std::time::Duration;
use utoipa::ToSchema;

use crate::config::Config;
use crate::error::PredictionError;
use crate::prediction::Prediction;

/// Which model the server should run. Forwarded as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ModelVariant {
    Qa,
    Seq2seq,
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    url: &'a str,
    review_text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_variant: Option<ModelVariant>,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    segments: Vec<String>,
    labels: Vec<String>,
    scores: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct PredictionClient {
    client: reqwest::Client,
    endpoint: String,
    source_url: String,
}

impl PredictionClient {
    pub fn new(
        base_url: &str,
        source_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, PredictionError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(PredictionError::ClientBuild)?;
        Ok(Self {
            client,
            endpoint: format!("{}/predict", base_url.trim_end_matches('/')),
            source_url: source_url.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, PredictionError> {
        Self::new(
            &config.prediction_api_url,
            config.source_url.clone(),
            config.request_timeout,
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn predict(&self, review_text: &str) -> Result<Prediction, PredictionError> {
        self.predict_with_variant(review_text, None).await
    }

    /// Sends one review to the model server. Exactly one request is made; no
    /// retries.
    pub async fn predict_with_variant(
        &self,
        review_text: &str,
        variant: Option<ModelVariant>,
    ) -> Result<Prediction, PredictionError> {
        let payload = PredictRequest {
            url: &self.source_url,
            review_text,
            model_variant: variant,
        };

        tracing::info!(
            endpoint = %self.endpoint,
            chars = review_text.len(),
            ?variant,
            "requesting prediction"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "prediction service connection failed");
                PredictionError::Transport(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "prediction request failed");
            return Err(PredictionError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let data: PredictResponse = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!(error = %e, "prediction response parse error");
            PredictionError::MalformedResponse(e.to_string())
        })?;

        let prediction = Prediction::new(&data.segments, &data.labels, &data.scores)?;
        tracing::info!(
            benefits = prediction.all_benefits().len(),
            drawbacks = prediction.all_drawbacks().len(),
            "prediction received"
        );
        Ok(prediction)
    }
}
