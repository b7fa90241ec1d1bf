//! Shared domain models for the design-match workspace.
//!
//! This crate centralizes the lightweight values passed between the OCR,
//! detector, comparator and application crates. Keep it free of engine
//! specific dependencies so every crate can depend on it without pulling
//! model runtimes or HTTP clients.

mod geometry;
mod issue;
mod raster;
mod region;
mod result;

pub use geometry::Rect;
pub use issue::{Issue, IssueCategory, Severity};
pub use raster::{Image, InputError, InputResult};
pub use region::{ElementLabel, Region, TextBlock};
pub use result::{
    ComparisonResult, ComponentScores, DetectedElements, SimilarityMetric, SimilarityMetricParseError,
};
