use design_match_types::ComponentScores;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_LAYOUT_WEIGHT: f64 = 0.6;
pub const DEFAULT_TEXT_WEIGHT: f64 = 0.4;

#[derive(Debug, Error, PartialEq)]
pub enum ScoreError {
    #[error("score weight '{name}' must be finite and non-negative, got {value}")]
    InvalidWeight { name: &'static str, value: f64 },
}

/// Weights of the layout and text components in the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    #[serde(rename = "layout_weight")]
    pub layout: f64,
    #[serde(rename = "text_weight")]
    pub text: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            layout: DEFAULT_LAYOUT_WEIGHT,
            text: DEFAULT_TEXT_WEIGHT,
        }
    }
}

impl ScoreWeights {
    pub fn new(layout: f64, text: f64) -> Result<Self, ScoreError> {
        Self { layout, text }.validated()
    }

    pub fn validated(self) -> Result<Self, ScoreError> {
        check_weight("layout_weight", self.layout)?;
        check_weight("text_weight", self.text)?;
        Ok(self)
    }
}

fn check_weight(name: &'static str, value: f64) -> Result<(), ScoreError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ScoreError::InvalidWeight { name, value })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreAggregator {
    weights: ScoreWeights,
}

impl ScoreAggregator {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> ScoreWeights {
        self.weights
    }

    /// `layout * 100 * w_layout + text * w_text`, rounded to two decimals
    /// and clamped to `[0, 100]`. Colour does not contribute.
    pub fn overall(&self, scores: &ComponentScores) -> f64 {
        let raw = scores.layout * 100.0 * self.weights.layout + scores.text * self.weights.text;
        let rounded = (raw * 100.0).round() / 100.0;
        if rounded.is_nan() {
            0.0
        } else {
            rounded.clamp(0.0, 100.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_blend_layout_and_text() {
        let aggregator = ScoreAggregator::default();
        let overall = aggregator.overall(&ComponentScores::new(0.95, 80.0, 0.3));
        assert!((overall - 89.0).abs() < 1e-9);
    }

    #[test]
    fn overall_is_clamped() {
        let aggregator = ScoreAggregator::new(ScoreWeights::new(1.0, 1.0).unwrap());
        assert_eq!(aggregator.overall(&ComponentScores::new(1.0, 100.0, 1.0)), 100.0);
    }

    #[test]
    fn rejects_negative_or_non_finite_weights() {
        assert!(ScoreWeights::new(-0.1, 0.4).is_err());
        assert_eq!(
            ScoreWeights::new(0.6, f64::INFINITY),
            Err(ScoreError::InvalidWeight {
                name: "text_weight",
                value: f64::INFINITY
            })
        );
    }

    #[test]
    fn weights_deserialize_with_defaults() {
        let weights: ScoreWeights = serde_json::from_str(r#"{"text_weight": 0.5}"#).unwrap();
        assert_eq!(weights.layout, DEFAULT_LAYOUT_WEIGHT);
        assert_eq!(weights.text, 0.5);
    }
}
