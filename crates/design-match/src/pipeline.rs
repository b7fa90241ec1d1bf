use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use design_match_comparator::matcher::DEFAULT_POSITION_TOLERANCE;
use design_match_comparator::pipeline::{DEFAULT_DIFF_MIN_AREA, DEFAULT_DIFF_THRESHOLD};
use design_match_comparator::text::DEFAULT_TEXT_MATCH_THRESHOLD;
use design_match_comparator::{
    DiffFinding, IssueEvidence, IssueSynthesizer, IssueThresholds, LayoutMetric, MetricFactory,
    RegionMatcher, ScoreAggregator, ScoreWeights, TextComparator, color_correlation,
    diff_regions, label_difference, normalize_onto,
};
use design_match_detector::{DetectionOptions, ElementDetector, TextAreaDetector, build_detector};
use design_match_ocr::{DEFAULT_SLICE_HEIGHT, OcrChain, OcrEngine, TextExtractor};
use design_match_types::{
    ComparisonResult, ComponentScores, DetectedElements, Image, IssueCategory, Rect, Region,
    SimilarityMetric,
};
use log::{debug, info, warn};

use crate::error::DesignMatchError;
use crate::output::{AnnotationLayers, annotate};

/// Tunable knobs of one [`DesignMatcher`].
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    pub detection: DetectionOptions,
    pub metric: SimilarityMetric,
    pub text_match_threshold: f64,
    pub position_tolerance: u32,
    pub diff_threshold: u8,
    pub diff_min_area: f64,
    pub thresholds: IssueThresholds,
    pub weights: ScoreWeights,
    pub slice_height: u32,
    pub embedding_model: Option<PathBuf>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            detection: DetectionOptions::default(),
            metric: SimilarityMetric::Ssim,
            text_match_threshold: DEFAULT_TEXT_MATCH_THRESHOLD,
            position_tolerance: DEFAULT_POSITION_TOLERANCE,
            diff_threshold: DEFAULT_DIFF_THRESHOLD,
            diff_min_area: DEFAULT_DIFF_MIN_AREA,
            thresholds: IssueThresholds::default(),
            weights: ScoreWeights::default(),
            slice_height: DEFAULT_SLICE_HEIGHT,
            embedding_model: None,
        }
    }
}

/// Per-image measurements taken before the pair is compared.
struct SideAnalysis {
    regions: Vec<Region>,
    text: String,
    text_areas: Vec<Rect>,
    degraded: bool,
}

/// Long-lived comparison engine. Models and OCR engines are loaded once in
/// [`DesignMatcher::initialize`]; [`DesignMatcher::compare`] takes `&self`
/// and can be shared across threads behind an `Arc`.
pub struct DesignMatcher {
    detector: Box<dyn ElementDetector>,
    text_areas: TextAreaDetector,
    extractor: TextExtractor,
    metric: Arc<dyn LayoutMetric>,
    text: TextComparator,
    matcher: RegionMatcher,
    synthesizer: IssueSynthesizer,
    aggregator: ScoreAggregator,
    diff_threshold: u8,
    diff_min_area: f64,
    #[cfg(feature = "embedding-onnx")]
    embedding: Option<design_match_comparator::EmbeddingComparator>,
}

impl DesignMatcher {
    pub fn initialize(
        config: MatcherConfig,
        ocr_engines: Vec<Arc<dyn OcrEngine>>,
    ) -> Result<Self, DesignMatchError> {
        let started = Instant::now();
        let weights = config.weights.validated()?;
        let chain = OcrChain::warmed(ocr_engines);
        if chain.is_empty() {
            warn!("no OCR engine available; all extracted text will be empty");
        } else {
            info!("ocr engines: {}", chain.engine_names().join(", "));
        }
        let extractor = TextExtractor::new(chain, config.slice_height);
        let detector = build_detector(
            config.detection.detector,
            config
                .detection
                .to_detection_config(Some(extractor.clone())),
        )?;

        #[cfg(feature = "embedding-onnx")]
        let embedding = match config.embedding_model.as_deref() {
            Some(path) => Some(design_match_comparator::EmbeddingComparator::new(path)?),
            None => None,
        };
        #[cfg(not(feature = "embedding-onnx"))]
        if let Some(path) = config.embedding_model.as_deref() {
            warn!(
                "embedding model {} ignored: built without the embedding-onnx feature",
                path.display()
            );
        }

        info!(
            "design matcher ready in {:.2?} (detector '{}', metric '{}')",
            started.elapsed(),
            detector.name(),
            config.metric.as_str()
        );
        Ok(Self {
            detector,
            text_areas: TextAreaDetector::default(),
            extractor,
            metric: MetricFactory::new(config.metric).build(),
            text: TextComparator::new(config.text_match_threshold),
            matcher: RegionMatcher::new(config.position_tolerance),
            synthesizer: IssueSynthesizer::new(config.thresholds),
            aggregator: ScoreAggregator::new(weights),
            diff_threshold: config.diff_threshold,
            diff_min_area: config.diff_min_area,
            #[cfg(feature = "embedding-onnx")]
            embedding,
        })
    }

    pub fn detector_name(&self) -> &'static str {
        self.detector.name()
    }

    /// Compares a reference design against its implementation. Both images
    /// are only read; the annotated canvas is a fresh buffer.
    pub fn compare(
        &self,
        reference: &Image,
        implementation: &Image,
    ) -> Result<ComparisonResult, DesignMatchError> {
        let started = Instant::now();
        let normalized = normalize_onto(reference, implementation);

        let (reference_side, implementation_side) = rayon::join(
            || self.analyze(&normalized),
            || self.analyze(implementation),
        );
        let reference_side = reference_side?;
        let implementation_side = implementation_side?;

        let layout = self
            .metric
            .similarity(&normalized.to_luma(), &implementation.to_luma());
        let color = color_correlation(normalized.as_rgb(), implementation.as_rgb());
        let text_score = self
            .text
            .compare(&reference_side.text, &implementation_side.text);
        let text_matched = self.text.is_match(text_score);

        let labels = label_difference(&reference_side.regions, &implementation_side.regions);
        let text_areas = self
            .matcher
            .match_areas(&reference_side.text_areas, &implementation_side.text_areas);

        let mut degraded = reference_side.degraded || implementation_side.degraded;
        let regions = diff_regions(
            &normalized,
            implementation,
            self.diff_threshold,
            self.diff_min_area,
        );
        let findings: Vec<DiffFinding> = regions
            .into_iter()
            .map(|region| {
                let design = self.extractor.extract_region(&normalized, region.rect);
                let built = self.extractor.extract_region(implementation, region.rect);
                degraded |= design.degraded || built.degraded;
                let score = self.text.compare(&design.text, &built.text);
                DiffFinding {
                    region,
                    text_mismatch: !self.text.is_match(score),
                }
            })
            .collect();

        let scores = ComponentScores::new(layout, text_score, color);
        let embedding_score = self.embedding_score(&normalized, implementation);
        let issues = self.synthesizer.synthesize(&IssueEvidence {
            labels: &labels,
            text_similarity: scores.text,
            text_areas: &text_areas,
            diff_findings: &findings,
            color_correlation: scores.color,
            layout_similarity: scores.layout,
            metric: self.metric.kind(),
            embedding_score,
        });
        let overall_score = self.aggregator.overall(&scores);

        let element_rects: Vec<Rect> = reference_side.regions.iter().map(|r| r.rect).collect();
        let diff_rects: Vec<Rect> = findings.iter().map(|f| f.region.rect).collect();
        let present: Vec<Rect> = implementation_side.text_areas.clone();
        let issue_tags: Vec<(Rect, usize)> = issues
            .iter()
            .filter(|issue| {
                matches!(
                    issue.category,
                    IssueCategory::TextMismatch | IssueCategory::ColorMismatch
                )
            })
            .filter_map(|issue| issue.rect.map(|rect| (rect, issue.id)))
            .collect();
        let annotated_image = annotate(
            &normalized,
            &AnnotationLayers {
                elements: &element_rects,
                diff_regions: &diff_rects,
                present_text: &present,
                missing_text: &text_areas.missing,
                issue_tags: &issue_tags,
            },
        );

        if degraded {
            warn!("text extraction degraded: every OCR engine failed for at least one request");
        }
        debug!(
            "compared {}x{} pair in {:.2?}: layout {:.4}, text {}, color {:.4}, {} issue(s)",
            implementation.width(),
            implementation.height(),
            started.elapsed(),
            scores.layout,
            scores.text,
            scores.color,
            issues.len()
        );

        Ok(ComparisonResult {
            overall_score,
            component_scores: scores,
            metric: self.metric.kind(),
            text_matched,
            issues,
            elements: DetectedElements {
                reference: reference_side.regions,
                implementation: implementation_side.regions,
            },
            extraction_degraded: degraded,
            annotated_image,
        })
    }

    fn analyze(&self, image: &Image) -> Result<SideAnalysis, DesignMatchError> {
        // Whole-image detection keeps elements that cross OCR band seams intact.
        let regions = self.detector.detect(image)?;
        let extraction = self.extractor.extract(image);
        let text_areas = self.text_areas.detect(image);
        Ok(SideAnalysis {
            regions,
            text: extraction.text,
            text_areas,
            degraded: extraction.degraded,
        })
    }

    #[cfg(feature = "embedding-onnx")]
    fn embedding_score(&self, reference: &Image, implementation: &Image) -> Option<f64> {
        self.embedding
            .as_ref()
            .and_then(|model| absorb_embedding(model.similarity(reference, implementation)))
    }

    #[cfg(not(feature = "embedding-onnx"))]
    fn embedding_score(&self, _: &Image, _: &Image) -> Option<f64> {
        None
    }
}

/// An embedding failure drops the score; the comparison still completes.
#[cfg_attr(not(feature = "embedding-onnx"), allow(dead_code))]
fn absorb_embedding<E: std::fmt::Display>(outcome: Result<f64, E>) -> Option<f64> {
    match outcome {
        Ok(score) => Some(score),
        Err(err) => {
            warn!("embedding similarity skipped: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_failures_are_absorbed() {
        assert_eq!(absorb_embedding(Ok::<f64, String>(91.5)), Some(91.5));
        assert_eq!(absorb_embedding(Err("session run failed")), None);
    }
}
