//! Highlights benefits and drawbacks in product reviews using a remote
//! span-prediction model.

pub mod api;
pub mod config;
pub mod error;
pub mod flagging;
pub mod highlight;
pub mod ml;
pub mod prediction;

pub use error::PredictionError;
pub use highlight::{render, summary_text, HighlightEntity, HighlightedText};
pub use ml::{ModelVariant, PredictionClient};
pub use prediction::{filter_items, Label, Prediction, PredictionItem};
