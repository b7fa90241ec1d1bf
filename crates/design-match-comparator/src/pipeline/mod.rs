pub mod diff;
pub mod ops;

pub use diff::{DEFAULT_DIFF_MIN_AREA, DEFAULT_DIFF_THRESHOLD, DiffRegion, diff_regions};
pub use ops::normalize_onto;
