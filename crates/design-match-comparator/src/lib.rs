//! Pairwise analysis of a reference design and its implementation: layout
//! and colour similarity, fuzzy text comparison, positional matching, issue
//! synthesis and score aggregation.

#[cfg(feature = "embedding-onnx")]
pub mod embedding;
pub mod factory;
pub mod issues;
pub mod matcher;
pub mod pipeline;
pub mod score;
pub mod similarity;
pub mod text;

#[cfg(feature = "embedding-onnx")]
pub use embedding::{EmbeddingComparator, EmbeddingError};
pub use factory::MetricFactory;
pub use issues::{DiffFinding, IssueEvidence, IssueSynthesizer, IssueThresholds};
pub use matcher::{AreaMatches, LabelDiff, MatchedPair, RegionMatcher, label_difference};
pub use pipeline::{DiffRegion, diff_regions, normalize_onto};
pub use score::{ScoreAggregator, ScoreError, ScoreWeights};
pub use similarity::{ColorHistogram, LayoutMetric, color_correlation};
pub use text::TextComparator;
