use std::fmt;

use serde::{Serialize, Serializer};

use crate::geometry::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Critical,
    Moderate,
    LowPriority,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::Moderate => "Moderate",
            Severity::LowPriority => "Low Priority",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueCategory {
    MissingElement,
    ExtraElement,
    TextSimilarity,
    TextAlignment,
    WidthMismatch,
    TextMismatch,
    ColorMismatch,
    LayoutSimilarity,
    /// Whole-image embedding comparison fell below its bar.
    Mismatch,
}

impl IssueCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueCategory::MissingElement => "Missing Element",
            IssueCategory::ExtraElement => "Extra Element",
            IssueCategory::TextSimilarity => "Text Similarity",
            IssueCategory::TextAlignment => "Text Alignment",
            IssueCategory::WidthMismatch => "Width Mismatch",
            IssueCategory::TextMismatch => "Text Mismatch",
            IssueCategory::ColorMismatch => "Color Mismatch",
            IssueCategory::LayoutSimilarity => "Layout Similarity",
            IssueCategory::Mismatch => "Mismatch",
        }
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for IssueCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One finding in a comparison report. `id` is 1-based and follows emission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub id: usize,
    pub severity: Severity,
    pub category: IssueCategory,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rect: Option<Rect>,
}
