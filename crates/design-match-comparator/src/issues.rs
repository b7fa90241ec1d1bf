use design_match_types::{Issue, IssueCategory, Rect, Severity, SimilarityMetric};
use serde::Serialize;

use crate::matcher::{AreaMatches, LabelDiff};
use crate::pipeline::DiffRegion;

pub const DEFAULT_TEXT_SIMILARITY_THRESHOLD: f64 = 90.0;
pub const DEFAULT_WIDTH_TOLERANCE: u32 = 20;
pub const DEFAULT_LARGE_AREA: f64 = 1000.0;
pub const DEFAULT_MEDIUM_AREA: f64 = 500.0;
pub const DEFAULT_COLOR_THRESHOLD: f64 = 0.9;
pub const DEFAULT_EMBEDDING_THRESHOLD: f64 = 85.0;

/// Cut-offs that turn raw measurements into issues.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IssueThresholds {
    pub text_similarity: f64,
    pub width_tolerance: u32,
    pub large_area: f64,
    pub medium_area: f64,
    pub color: f64,
    pub embedding: f64,
}

impl Default for IssueThresholds {
    fn default() -> Self {
        Self {
            text_similarity: DEFAULT_TEXT_SIMILARITY_THRESHOLD,
            width_tolerance: DEFAULT_WIDTH_TOLERANCE,
            large_area: DEFAULT_LARGE_AREA,
            medium_area: DEFAULT_MEDIUM_AREA,
            color: DEFAULT_COLOR_THRESHOLD,
            embedding: DEFAULT_EMBEDDING_THRESHOLD,
        }
    }
}

/// A diff region plus whether the text read inside it disagrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffFinding {
    pub region: DiffRegion,
    pub text_mismatch: bool,
}

/// Everything measured about one pair, borrowed for synthesis.
#[derive(Debug, Clone, Copy)]
pub struct IssueEvidence<'a> {
    pub labels: &'a LabelDiff,
    pub text_similarity: f64,
    pub text_areas: &'a AreaMatches,
    pub diff_findings: &'a [DiffFinding],
    pub color_correlation: f64,
    pub layout_similarity: f64,
    pub metric: SimilarityMetric,
    /// Cosine similarity x100 from the embedding model, when enabled.
    pub embedding_score: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IssueSynthesizer {
    thresholds: IssueThresholds,
}

struct IssueLog {
    issues: Vec<Issue>,
}

impl IssueLog {
    fn push(
        &mut self,
        severity: Severity,
        category: IssueCategory,
        description: String,
        rect: Option<Rect>,
    ) {
        self.issues.push(Issue {
            id: self.issues.len() + 1,
            severity,
            category,
            description,
            rect,
        });
    }
}

impl IssueSynthesizer {
    pub fn new(thresholds: IssueThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> IssueThresholds {
        self.thresholds
    }

    /// Emits issues in a fixed order: element set, text similarity,
    /// alignment, width, diff regions, embedding, then the layout summary
    /// that is always present.
    pub fn synthesize(&self, evidence: &IssueEvidence<'_>) -> Vec<Issue> {
        let mut log = IssueLog { issues: Vec::new() };

        for label in &evidence.labels.missing {
            log.push(
                Severity::Critical,
                IssueCategory::MissingElement,
                format!("{label} is missing in the UI"),
                None,
            );
        }
        for label in &evidence.labels.extra {
            log.push(
                Severity::Moderate,
                IssueCategory::ExtraElement,
                format!("{label} is extra in the UI"),
                None,
            );
        }

        if evidence.text_similarity < self.thresholds.text_similarity {
            log.push(
                Severity::Moderate,
                IssueCategory::TextSimilarity,
                format!(
                    "Text similarity is {}%, which is below the acceptable threshold.",
                    evidence.text_similarity
                ),
                None,
            );
        }

        for rect in &evidence.text_areas.missing {
            log.push(
                Severity::Critical,
                IssueCategory::TextAlignment,
                format!(
                    "Text region at ({}, {}, {}, {}) is misaligned or missing.",
                    rect.x, rect.y, rect.width, rect.height
                ),
                Some(*rect),
            );
        }

        for pair in &evidence.text_areas.pairs {
            if pair.width_delta > self.thresholds.width_tolerance {
                let rect = pair.implementation;
                log.push(
                    Severity::LowPriority,
                    IssueCategory::WidthMismatch,
                    format!(
                        "Text region at ({}, {}) width is not accurate: {}px in the design, {}px in the UI.",
                        rect.x, rect.y, pair.reference.width, rect.width
                    ),
                    Some(rect),
                );
            }
        }

        for finding in evidence.diff_findings {
            let (severity, category, what) = self.categorize_diff(finding, evidence.color_correlation);
            let rect = finding.region.rect;
            log.push(
                severity,
                category,
                format!(
                    "Element at ({}, {}, {}, {}) {what}",
                    rect.x, rect.y, rect.width, rect.height
                ),
                Some(rect),
            );
        }

        if let Some(score) = evidence.embedding_score {
            if score < self.thresholds.embedding {
                log.push(
                    Severity::Moderate,
                    IssueCategory::Mismatch,
                    format!("UI does not match the design accurately (embedding similarity {score:.2}%)."),
                    None,
                );
            }
        }

        log.push(
            Severity::LowPriority,
            IssueCategory::LayoutSimilarity,
            format!(
                "Layout similarity score ({}): {:.2}",
                evidence.metric.as_str(),
                evidence.layout_similarity
            ),
            None,
        );
        log.issues
    }

    fn categorize_diff(
        &self,
        finding: &DiffFinding,
        color_correlation: f64,
    ) -> (Severity, IssueCategory, &'static str) {
        let area = finding.region.area;
        if area > self.thresholds.large_area || finding.text_mismatch {
            (Severity::Critical, IssueCategory::TextMismatch, "text mismatch")
        } else if area > self.thresholds.medium_area || color_correlation < self.thresholds.color {
            (Severity::Moderate, IssueCategory::ColorMismatch, "color mismatch")
        } else {
            (
                Severity::LowPriority,
                IssueCategory::ColorMismatch,
                "differs slightly",
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::MatchedPair;

    fn evidence<'a>(
        labels: &'a LabelDiff,
        areas: &'a AreaMatches,
        findings: &'a [DiffFinding],
    ) -> IssueEvidence<'a> {
        IssueEvidence {
            labels,
            text_similarity: 100.0,
            text_areas: areas,
            diff_findings: findings,
            color_correlation: 1.0,
            layout_similarity: 1.0,
            metric: SimilarityMetric::Ssim,
            embedding_score: None,
        }
    }

    #[test]
    fn clean_comparison_only_reports_layout_summary() {
        let labels = LabelDiff::default();
        let areas = AreaMatches::default();
        let issues = IssueSynthesizer::default().synthesize(&evidence(&labels, &areas, &[]));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].id, 1);
        assert_eq!(issues[0].category, IssueCategory::LayoutSimilarity);
        assert_eq!(issues[0].severity, Severity::LowPriority);
        assert_eq!(issues[0].description, "Layout similarity score (ssim): 1.00");
    }

    #[test]
    fn issues_follow_emission_order_with_sequential_ids() {
        let labels = LabelDiff {
            missing: vec!["button".into()],
            extra: vec!["decorative".into()],
        };
        let areas = AreaMatches {
            pairs: vec![MatchedPair {
                reference: Rect::new(10, 10, 100, 20),
                implementation: Rect::new(12, 11, 140, 20),
                width_delta: 40,
            }],
            missing: vec![Rect::new(50, 200, 80, 16)],
            present: vec![true],
        };
        let findings = [
            DiffFinding {
                region: DiffRegion {
                    rect: Rect::new(0, 0, 40, 40),
                    area: 1500.0,
                },
                text_mismatch: false,
            },
            DiffFinding {
                region: DiffRegion {
                    rect: Rect::new(60, 60, 30, 30),
                    area: 700.0,
                },
                text_mismatch: false,
            },
        ];
        let mut input = evidence(&labels, &areas, &findings);
        input.text_similarity = 83.0;
        let issues = IssueSynthesizer::default().synthesize(&input);

        let categories: Vec<IssueCategory> = issues.iter().map(|issue| issue.category).collect();
        assert_eq!(
            categories,
            vec![
                IssueCategory::MissingElement,
                IssueCategory::ExtraElement,
                IssueCategory::TextSimilarity,
                IssueCategory::TextAlignment,
                IssueCategory::WidthMismatch,
                IssueCategory::TextMismatch,
                IssueCategory::ColorMismatch,
                IssueCategory::LayoutSimilarity,
            ]
        );
        let ids: Vec<usize> = issues.iter().map(|issue| issue.id).collect();
        assert_eq!(ids, (1..=8).collect::<Vec<_>>());
        assert_eq!(issues[0].severity, Severity::Critical);
        assert_eq!(issues[1].severity, Severity::Moderate);
        assert_eq!(issues[3].severity, Severity::Critical);
        assert_eq!(issues[4].severity, Severity::LowPriority);
        assert_eq!(issues[5].severity, Severity::Critical);
        assert_eq!(issues[6].severity, Severity::Moderate);
        assert_eq!(
            issues[2].description,
            "Text similarity is 83%, which is below the acceptable threshold."
        );
    }

    #[test]
    fn region_text_mismatch_is_critical_regardless_of_area() {
        let labels = LabelDiff::default();
        let areas = AreaMatches::default();
        let findings = [DiffFinding {
            region: DiffRegion {
                rect: Rect::new(5, 5, 25, 25),
                area: 520.0,
            },
            text_mismatch: true,
        }];
        let issues = IssueSynthesizer::default().synthesize(&evidence(&labels, &areas, &findings));
        assert_eq!(issues[0].severity, Severity::Critical);
        assert_eq!(issues[0].rect, Some(Rect::new(5, 5, 25, 25)));
    }

    #[test]
    fn low_embedding_similarity_is_flagged() {
        let labels = LabelDiff::default();
        let areas = AreaMatches::default();
        let mut input = evidence(&labels, &areas, &[]);
        input.embedding_score = Some(72.5);
        let issues = IssueSynthesizer::default().synthesize(&input);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].category, IssueCategory::Mismatch);
    }

    fn small_finding() -> [DiffFinding; 1] {
        [DiffFinding {
            region: DiffRegion {
                rect: Rect::new(8, 8, 20, 20),
                area: 400.0,
            },
            text_mismatch: false,
        }]
    }

    #[test]
    fn small_region_with_weak_colour_correlation_is_a_moderate_colour_mismatch() {
        let labels = LabelDiff::default();
        let areas = AreaMatches::default();
        let findings = small_finding();
        let mut input = evidence(&labels, &areas, &findings);
        input.color_correlation = 0.5;
        let issues = IssueSynthesizer::default().synthesize(&input);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].severity, Severity::Moderate);
        assert_eq!(issues[0].category, IssueCategory::ColorMismatch);
        assert_eq!(issues[0].description, "Element at (8, 8, 20, 20) color mismatch");
    }

    #[test]
    fn small_region_with_matching_colours_differs_slightly() {
        let labels = LabelDiff::default();
        let areas = AreaMatches::default();
        let findings = small_finding();
        let mut input = evidence(&labels, &areas, &findings);
        input.color_correlation = 0.95;
        let issues = IssueSynthesizer::default().synthesize(&input);
        assert_eq!(issues[0].severity, Severity::LowPriority);
        assert_eq!(issues[0].category, IssueCategory::ColorMismatch);
        assert_eq!(issues[0].description, "Element at (8, 8, 20, 20) differs slightly");
    }
}
