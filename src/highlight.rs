//! Turns a `Prediction` into something a UI can show: highlight spans over the
//! original review, and a plain-text summary.

use serde::Serialize;
use utoipa::ToSchema;

use crate::error::PredictionError;
use crate::prediction::{Label, Prediction, PredictionItem};

const BENEFIT_BULLET: &str = "😁";
const DRAWBACK_BULLET: &str = "😐";

/// A region of the review to mark. Offsets are byte offsets into the UTF-8
/// review text, `start..end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct HighlightEntity {
    pub start: usize,
    pub end: usize,
    pub entity: Label,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct HighlightedText {
    pub text: String,
    pub entities: Vec<HighlightEntity>,
}

/// Finds the first occurrence of the item's text in the review.
pub fn locate_span(
    review_text: &str,
    item: &PredictionItem,
) -> Result<HighlightEntity, PredictionError> {
    review_text
        .find(item.text.as_str())
        .map(|start| HighlightEntity {
            start,
            end: start + item.text.len(),
            entity: item.label,
        })
        .ok_or_else(|| PredictionError::SpanNotFound {
            text: item.text.clone(),
        })
}

/// Highlights the filtered benefits, then the filtered drawbacks. Segments
/// that don't occur in the review are skipped; overlapping spans are kept as
/// separate entities.
pub fn render(review_text: &str, prediction: &Prediction) -> HighlightedText {
    let items = prediction
        .non_empty_benefits()
        .into_iter()
        .chain(prediction.non_empty_drawbacks());

    let mut entities = Vec::new();
    for item in items {
        match locate_span(review_text, &item) {
            Ok(entity) => entities.push(entity),
            Err(e) => tracing::warn!(error = %e, label = %item.label, "skipping highlight"),
        }
    }

    HighlightedText {
        text: review_text.to_string(),
        entities,
    }
}

/// Renders one bucket of items as a short bulleted list.
pub fn summarize_items(
    items: &[PredictionItem],
    bullet: &str,
    singular: &str,
    plural: &str,
) -> String {
    if items.is_empty() {
        return format!("No {} found.\n", singular);
    }

    let noun = if items.len() == 1 { singular } else { plural };
    let mut out = format!("The model found following {}:\n", noun);
    for item in items {
        out.push_str(&format!(" {} {} [score: {:.2}]\n", bullet, item.text, item.score));
    }
    out
}

pub fn summary_text(prediction: &Prediction) -> String {
    let mut out = String::from("Here is the result of prediction.\n\n");
    out.push_str(&summarize_items(
        &prediction.non_empty_benefits(),
        BENEFIT_BULLET,
        "benefit",
        "benefits",
    ));
    out.push('\n');
    out.push_str(&summarize_items(
        &prediction.non_empty_drawbacks(),
        DRAWBACK_BULLET,
        "drawback",
        "drawbacks",
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::filter_items;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    fn assert_round_trip(highlighted: &HighlightedText, expected: &[&str]) {
        let spans: Vec<&str> = highlighted
            .entities
            .iter()
            .map(|e| &highlighted.text[e.start..e.end])
            .collect();
        assert_eq!(spans, expected);
    }

    #[test]
    fn test_tied_benefits_both_highlighted() {
        let review = "The sound is great sound and nice sound";
        let prediction = Prediction::new(
            &["great sound", "nice sound"],
            &["benefit", "benefit"],
            &[0.9, 0.9],
        )
        .unwrap();

        let highlighted = render(review, &prediction);

        assert_eq!(
            highlighted.entities,
            vec![
                HighlightEntity { start: 13, end: 24, entity: Label::Benefit },
                HighlightEntity { start: 29, end: 39, entity: Label::Benefit },
            ]
        );
        assert_round_trip(&highlighted, &["great sound", "nice sound"]);
    }

    #[test]
    fn test_missing_segment_skipped() {
        let prediction = Prediction::new(&["missing phrase"], &["drawback"], &[0.5]).unwrap();
        let highlighted = render("totally different text", &prediction);
        assert_eq!(highlighted.text, "totally different text");
        assert!(highlighted.entities.is_empty());
    }

    #[test]
    fn test_missing_segment_does_not_drop_others() {
        let review = "Battery lasts forever but the strap broke";
        let prediction = Prediction::new(
            &["not in review", "Battery lasts forever", "strap broke"],
            &["benefit", "benefit", "drawback"],
            &[0.99, 0.5, 0.7],
        )
        .unwrap();

        let highlighted = render(review, &prediction);
        assert_round_trip(&highlighted, &["Battery lasts forever", "strap broke"]);
        assert_eq!(highlighted.entities[1].entity, Label::Drawback);
    }

    #[test]
    fn test_locate_span_error() {
        let item = PredictionItem::new(Label::Benefit, "absent", 1.0);
        let err = locate_span("present", &item).unwrap_err();
        assert!(matches!(err, PredictionError::SpanNotFound { ref text } if text == "absent"));
    }

    #[test]
    fn test_first_occurrence_used() {
        let item = PredictionItem::new(Label::Drawback, "loud", 0.3);
        let entity = locate_span("loud fan, loud motor", &item).unwrap();
        assert_eq!((entity.start, entity.end), (0, 4));
    }

    #[test]
    fn test_benefits_before_drawbacks() {
        let review = "cheap, sturdy, heavy";
        let prediction = Prediction::new(
            &["heavy", "sturdy", "cheap"],
            &["drawback", "benefit", "benefit"],
            &[0.9, 0.2, 0.1],
        )
        .unwrap();
        let labels: Vec<_> = render(review, &prediction)
            .entities
            .into_iter()
            .map(|e| e.entity)
            .collect();
        assert_eq!(labels, vec![Label::Benefit, Label::Benefit, Label::Drawback]);
    }

    #[test]
    fn test_overlapping_spans_pass_through() {
        let review = "the noise cancelling is superb";
        let prediction = Prediction::new(
            &["noise cancelling is superb", "noise cancelling"],
            &["benefit", "benefit"],
            &[0.8, 0.6],
        )
        .unwrap();
        let highlighted = render(review, &prediction);
        assert_round_trip(&highlighted, &["noise cancelling is superb", "noise cancelling"]);
    }

    #[test]
    fn test_multibyte_offsets_slice_cleanly() {
        let review = "Très bon café, mais le goût amer ☕ reste";
        let prediction = Prediction::new(
            &["bon café", "goût amer ☕"],
            &["benefit", "drawback"],
            &[0.5, 0.5],
        )
        .unwrap();
        let highlighted = render(review, &prediction);
        assert_round_trip(&highlighted, &["bon café", "goût amer ☕"]);
    }

    #[test]
    fn test_render_is_idempotent() {
        let review = "fits well, runs small";
        let prediction = Prediction::new(
            &["fits well", "runs small"],
            &["benefit", "drawback"],
            &[0.4, 0.6],
        )
        .unwrap();
        assert_eq!(render(review, &prediction), render(review, &prediction));
    }

    #[test]
    fn test_summary_for_empty_prediction() {
        let empty: [&str; 0] = [];
        let prediction = Prediction::new(&empty, &empty, &[]).unwrap();
        let text = summary_text(&prediction);
        assert_eq!(
            text,
            "Here is the result of prediction.\n\nNo benefit found.\n\nNo drawback found.\n"
        );
    }

    #[test]
    fn test_summary_singular_and_plural() {
        let prediction = Prediction::new(
            &["bright screen", "long battery", "fragile"],
            &["benefit", "benefit", "drawback"],
            &[0.876, 0.5, 0.25],
        )
        .unwrap();
        let text = summary_text(&prediction);
        assert!(text.contains(
            "The model found following benefits:\n \
             😁 bright screen [score: 0.88]\n \
             😁 long battery [score: 0.50]\n"
        ));
        assert!(
            text.contains("The model found following drawback:\n 😐 fragile [score: 0.25]\n")
        );
    }

    #[test]
    fn test_summarize_items_uses_filtered_order() {
        let items = vec![
            PredictionItem::new(Label::Benefit, "b", 0.2),
            PredictionItem::new(Label::Benefit, "a", 0.7),
        ];
        let text = summarize_items(&filter_items(&items), "*", "benefit", "benefits");
        assert_eq!(
            text,
            "The model found following benefits:\n * a [score: 0.70]\n * b [score: 0.20]\n"
        );
    }

    #[test]
    fn test_render_properties_on_generated_reviews() {
        const WORDS: &[&str] = &[
            "great", "sound", "cheap", "plastic", "strap", "broke", "très", "bon", "café", "☕",
            "battery", "lasts",
        ];
        const ABSENT: &[&str] = &["not in review", "zzz", "great  sound"];

        for seed in 0..300u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let words: Vec<&str> = (0..rng.gen_range(1..15))
                .map(|_| *WORDS.choose(&mut rng).unwrap())
                .collect();
            let review = words.join(" ");

            let mut segments = Vec::new();
            let mut labels = Vec::new();
            let mut scores: Vec<f64> = Vec::new();
            for _ in 0..rng.gen_range(0..10) {
                let segment = if rng.gen_bool(0.8) {
                    let start = rng.gen_range(0..words.len());
                    let end = rng.gen_range(start + 1..=words.len());
                    words[start..end].join(" ")
                } else {
                    ABSENT.choose(&mut rng).unwrap().to_string()
                };
                segments.push(segment);
                labels.push(if rng.gen_bool(0.5) { "benefit" } else { "drawback" });
                scores.push(rng.gen_range(-1.0..2.0));
            }
            let prediction = Prediction::new(&segments, &labels, &scores).unwrap();

            let highlighted = render(&review, &prediction);
            assert_eq!(highlighted.text, review, "seed {seed}");

            let expected: Vec<PredictionItem> = prediction
                .non_empty_benefits()
                .into_iter()
                .chain(prediction.non_empty_drawbacks())
                .filter(|item| review.contains(item.text.as_str()))
                .collect();
            assert_eq!(highlighted.entities.len(), expected.len(), "seed {seed}");
            for (entity, item) in highlighted.entities.iter().zip(&expected) {
                assert_eq!(&review[entity.start..entity.end], item.text, "seed {seed}");
                assert_eq!(entity.entity, item.label, "seed {seed}");
            }

            assert_eq!(render(&review, &prediction), highlighted, "seed {seed}");
        }
    }
}
