use std::fmt;

use serde::{Serialize, Serializer};

use crate::geometry::Rect;

/// Semantic class attached to a detected UI element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementLabel {
    Image,
    Button,
    Text,
    InputField,
    Decorative,
    Unknown,
    /// Class name assigned by a learned detector.
    Class(String),
}

impl ElementLabel {
    pub fn as_str(&self) -> &str {
        match self {
            ElementLabel::Image => "image",
            ElementLabel::Button => "button",
            ElementLabel::Text => "text",
            ElementLabel::InputField => "input_field",
            ElementLabel::Decorative => "decorative",
            ElementLabel::Unknown => "unknown",
            ElementLabel::Class(name) => name,
        }
    }

    /// Maps a detector class name onto the fixed vocabulary when it matches,
    /// keeping it verbatim otherwise.
    pub fn from_class_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "image" => ElementLabel::Image,
            "button" => ElementLabel::Button,
            "text" => ElementLabel::Text,
            "input_field" | "input" => ElementLabel::InputField,
            "decorative" => ElementLabel::Decorative,
            "unknown" => ElementLabel::Unknown,
            _ => ElementLabel::Class(name.trim().to_string()),
        }
    }
}

impl fmt::Display for ElementLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ElementLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A classified bounding rectangle produced by one detection call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    pub rect: Rect,
    pub label: ElementLabel,
    /// Detector confidence in `[0, 1]`.
    pub confidence: f32,
}

impl Region {
    pub fn new(rect: Rect, label: ElementLabel, confidence: f32) -> Self {
        Self {
            rect,
            label,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Confidence as a percentage rounded to two decimals.
    pub fn confidence_percent(&self) -> f32 {
        (self.confidence * 10_000.0).round() / 100.0
    }
}

/// Text recognized inside a rectangle, tagged with the engine that read it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBlock {
    pub rect: Rect,
    pub text: String,
    pub engine: &'static str,
}

impl TextBlock {
    pub fn new(rect: Rect, text: impl Into<String>, engine: &'static str) -> Self {
        Self {
            rect,
            text: text.into(),
            engine,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_names_fold_into_known_labels() {
        assert_eq!(ElementLabel::from_class_name("Button"), ElementLabel::Button);
        assert_eq!(
            ElementLabel::from_class_name("checkbox"),
            ElementLabel::Class("checkbox".into())
        );
        assert_eq!(ElementLabel::InputField.as_str(), "input_field");
    }

    #[test]
    fn confidence_is_clamped_and_reported_as_percent() {
        let region = Region::new(Rect::new(0, 0, 4, 4), ElementLabel::Image, 0.87654);
        assert_eq!(region.confidence_percent(), 87.65);
        let clamped = Region::new(Rect::new(0, 0, 4, 4), ElementLabel::Image, 3.0);
        assert_eq!(clamped.confidence, 1.0);
    }

    #[test]
    fn labels_serialize_as_plain_strings() {
        let json = serde_json::to_string(&ElementLabel::Class("navbar".into())).unwrap();
        assert_eq!(json, "\"navbar\"");
    }
}
