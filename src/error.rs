//! Error types for the prediction pipeline.

use thiserror::Error;

/// Everything that can go wrong between sending a review to the model server
/// and turning its answer into highlights.
#[derive(Debug, Error)]
pub enum PredictionError {
    /// The model server answered with a non-success status.
    #[error("prediction service returned {status}: {body}")]
    Service { status: u16, body: String },

    /// The HTTP client itself could not be set up (TLS backend, settings).
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// The model server could not be reached or the request timed out.
    #[error("prediction service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// Required fields are missing or the parallel arrays disagree in length.
    #[error("malformed prediction response: {0}")]
    MalformedResponse(String),

    /// A label outside `benefit` / `drawback`.
    #[error("unknown label: {0}")]
    InvalidLabel(String),

    /// A predicted segment does not occur verbatim in the review. Recoverable:
    /// the span is dropped from the highlight list.
    #[error("segment not found in review text: '{text}'")]
    SpanNotFound { text: String },
}

impl PredictionError {
    /// Whether the error came from the remote side being unavailable, as
    /// opposed to it answering with something we can't use.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Service { .. } | Self::Transport(_))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}
