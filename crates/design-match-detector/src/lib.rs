pub mod element_detection;

mod config;

pub use config::DetectionOptions;
pub use element_detection::contours::{ContourBox, external_contours};
pub use element_detection::suppression::{intersection_over_union, suppress_overlaps};
pub use element_detection::text_areas::TextAreaDetector;
pub use element_detection::{
    ContourDetector, DetectionError, DetectorKind, DetectorKindParseError, ElementDetectionConfig,
    ElementDetector, build_detector, preflight_detection,
};
