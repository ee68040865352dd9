//! Prediction model: typed benefit/drawback spans returned by the model server,
//! plus the ranking view used for display.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::error::PredictionError;

/// Classification of a predicted segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Benefit,
    Drawback,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Benefit => "benefit",
            Label::Drawback => "drawback",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = PredictionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "benefit" => Ok(Label::Benefit),
            "drawback" => Ok(Label::Drawback),
            other => Err(PredictionError::InvalidLabel(other.to_string())),
        }
    }
}

/// One span the model identified in the review.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionItem {
    pub label: Label,
    pub text: String,
    /// Model confidence. Only used for ranking, not guaranteed to be in [0, 1].
    pub score: f64,
}

impl PredictionItem {
    pub fn new(label: Label, text: impl Into<String>, score: f64) -> Self {
        Self {
            label,
            text: text.into(),
            score,
        }
    }
}

impl fmt::Display for PredictionItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: '{}' (score: {:.2})", self.label, self.text, self.score)
    }
}

/// Benefits and drawbacks predicted for a single review.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Prediction {
    benefits: Vec<PredictionItem>,
    drawbacks: Vec<PredictionItem>,
}

impl Prediction {
    /// Builds a prediction from the three parallel arrays the model server
    /// returns. Fails on a length mismatch or an unknown label.
    pub fn new<S, L>(
        segments: &[S],
        labels: &[L],
        scores: &[f64],
    ) -> Result<Self, PredictionError>
    where
        S: AsRef<str>,
        L: AsRef<str>,
    {
        if segments.len() != labels.len() || segments.len() != scores.len() {
            return Err(PredictionError::MalformedResponse(format!(
                "segments, labels and scores differ in length ({}, {}, {})",
                segments.len(),
                labels.len(),
                scores.len()
            )));
        }

        let mut prediction = Prediction::default();
        for ((segment, label), score) in segments.iter().zip(labels).zip(scores) {
            let label: Label = label.as_ref().parse()?;
            let item = PredictionItem::new(label, segment.as_ref(), *score);
            tracing::debug!(%item, "processing prediction item");
            match label {
                Label::Benefit => prediction.benefits.push(item),
                Label::Drawback => prediction.drawbacks.push(item),
            }
        }

        Ok(prediction)
    }

    pub fn all_benefits(&self) -> &[PredictionItem] {
        &self.benefits
    }

    pub fn all_drawbacks(&self) -> &[PredictionItem] {
        &self.drawbacks
    }

    pub fn non_empty_benefits(&self) -> Vec<PredictionItem> {
        filter_items(&self.benefits)
    }

    pub fn non_empty_drawbacks(&self) -> Vec<PredictionItem> {
        filter_items(&self.drawbacks)
    }

    pub fn is_empty(&self) -> bool {
        self.benefits.is_empty() && self.drawbacks.is_empty()
    }
}

/// Drops blank segments, ranks by score (highest first, ties keep input
/// order) and keeps only the first occurrence of each distinct text.
pub fn filter_items(items: &[PredictionItem]) -> Vec<PredictionItem> {
    let mut ranked: Vec<&PredictionItem> = items
        .iter()
        .filter(|item| !item.text.trim().is_empty())
        .collect();

    // `sort_by` is stable.
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut seen = HashSet::new();
    ranked
        .into_iter()
        .filter(|&item| seen.insert(item.text.as_str()))
        .cloned()
        .collect()
}
