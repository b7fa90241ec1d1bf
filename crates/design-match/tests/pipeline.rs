use std::path::PathBuf;
use std::sync::Arc;

use design_match::cli::OcrEngineChoice;
use design_match::output::ReportWriter;
use design_match::settings::{EffectiveSettings, OcrSettings, OutputSettings};
use design_match::{DesignMatchError, DesignMatcher, MatcherConfig, ResultCache, run};
use design_match_detector::{DetectionOptions, DetectorKind};
use design_match_ocr::{OcrEngine, OcrError, OcrRequest, OcrResponse, OcrText};
use design_match_types::{ElementLabel, Image, IssueCategory, Rect, Severity};
use image::{Rgb, RgbImage};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([30, 30, 30]);

/// Answers with a fixed line chosen by the request image's background.
struct ScriptedOcr {
    lines: Vec<(u8, &'static str)>,
}

impl OcrEngine for ScriptedOcr {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn recognize(&self, request: &OcrRequest<'_>) -> Result<OcrResponse, OcrError> {
        let background = request.image().as_rgb().get_pixel(0, 0)[0];
        let line = self
            .lines
            .iter()
            .find(|(value, _)| *value == background)
            .map(|(_, line)| *line)
            .ok_or_else(|| OcrError::backend("unexpected image"))?;
        let region = request.region().unwrap_or(request.image().bounds());
        Ok(OcrResponse::new(vec![OcrText::new(region, line.to_string())]))
    }
}

fn canvas(width: u32, height: u32, background: Rgb<u8>) -> RgbImage {
    RgbImage::from_pixel(width, height, background)
}

fn fill(pixels: &mut RgbImage, rect: Rect, color: Rgb<u8>) {
    for y in rect.y..rect.bottom() {
        for x in rect.x..rect.right() {
            pixels.put_pixel(x, y, color);
        }
    }
}

fn image(pixels: RgbImage) -> Image {
    Image::from_rgb(pixels).unwrap()
}

fn contour_config() -> MatcherConfig {
    MatcherConfig {
        detection: DetectionOptions {
            detector: DetectorKind::Contour,
            ..DetectionOptions::default()
        },
        ..MatcherConfig::default()
    }
}

fn matcher_without_ocr() -> DesignMatcher {
    DesignMatcher::initialize(contour_config(), Vec::new()).unwrap()
}

fn login_screen() -> RgbImage {
    let mut pixels = canvas(320, 240, WHITE);
    fill(&mut pixels, Rect::new(40, 60, 200, 40), INK);
    fill(&mut pixels, Rect::new(40, 140, 80, 80), INK);
    pixels
}

#[test]
fn self_comparison_only_reports_layout_summary() {
    let matcher = matcher_without_ocr();
    let screen = image(login_screen());
    let result = matcher.compare(&screen, &screen).unwrap();

    assert_eq!(result.component_scores.layout, 1.0);
    assert!((result.component_scores.color - 1.0).abs() < 1e-9);
    assert_eq!(result.component_scores.text, 100.0);
    assert_eq!(result.overall_score, 100.0);
    assert!(result.text_matched);
    assert!(!result.extraction_degraded);
    assert_eq!(result.issues.len(), 1);
    let summary = &result.issues[0];
    assert_eq!(summary.id, 1);
    assert_eq!(summary.category, IssueCategory::LayoutSimilarity);
    assert_eq!(summary.severity, Severity::LowPriority);
    assert_eq!(summary.description, "Layout similarity score (ssim): 1.00");
    assert_eq!(result.annotated_image.dimensions(), (320, 240));
}

#[test]
fn removed_button_is_reported_once_as_missing() {
    let matcher = matcher_without_ocr();
    let reference = image(login_screen());
    let mut without_button = canvas(320, 240, WHITE);
    fill(&mut without_button, Rect::new(40, 140, 80, 80), INK);
    let implementation = image(without_button);

    let result = matcher.compare(&reference, &implementation).unwrap();

    let missing: Vec<_> = result
        .issues
        .iter()
        .filter(|issue| issue.category == IssueCategory::MissingElement)
        .collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].severity, Severity::Critical);
    assert_eq!(missing[0].description, "button is missing in the UI");
    assert!(
        result
            .issues
            .iter()
            .any(|issue| issue.category == IssueCategory::TextAlignment)
    );
    assert!(result.component_scores.layout < 1.0);
    let ids: Vec<usize> = result.issues.iter().map(|issue| issue.id).collect();
    assert_eq!(ids, (1..=result.issues.len()).collect::<Vec<_>>());
}

#[test]
fn different_copy_lowers_the_text_score() {
    let ocr: Arc<dyn OcrEngine> = Arc::new(ScriptedOcr {
        lines: vec![(255, "Sign in to continue"), (254, "Create a free account")],
    });
    let matcher = DesignMatcher::initialize(contour_config(), vec![ocr]).unwrap();

    let reference = image(login_screen());
    let mut shifted = login_screen();
    for pixel in shifted.pixels_mut() {
        if *pixel == WHITE {
            *pixel = Rgb([254, 254, 254]);
        }
    }
    let implementation = image(shifted);

    let result = matcher.compare(&reference, &implementation).unwrap();

    assert!(!result.text_matched);
    assert!(result.component_scores.text < 80.0);
    let text_issue = result
        .issues
        .iter()
        .find(|issue| issue.category == IssueCategory::TextSimilarity)
        .unwrap();
    assert_eq!(text_issue.severity, Severity::Moderate);
    assert!(text_issue.description.starts_with("Text similarity is "));
    assert!(
        text_issue
            .description
            .ends_with("which is below the acceptable threshold.")
    );
}

#[test]
fn failing_ocr_degrades_instead_of_failing() {
    let ocr: Arc<dyn OcrEngine> = Arc::new(ScriptedOcr { lines: Vec::new() });
    let matcher = DesignMatcher::initialize(contour_config(), vec![ocr]).unwrap();
    let screen = image(login_screen());

    let result = matcher.compare(&screen, &screen).unwrap();

    assert!(result.extraction_degraded);
    assert_eq!(result.component_scores.text, 100.0);
}

#[test]
fn smaller_reference_is_scaled_onto_the_implementation() {
    let matcher = matcher_without_ocr();
    let mut small = canvas(160, 120, WHITE);
    fill(&mut small, Rect::new(20, 30, 100, 20), INK);
    let result = matcher
        .compare(&image(small), &image(login_screen()))
        .unwrap();
    assert_eq!(result.annotated_image.dimensions(), (320, 240));
}

#[test]
fn repeated_comparisons_are_identical_and_cached() {
    let matcher = matcher_without_ocr();
    let reference = image(login_screen());
    let mut other = login_screen();
    fill(&mut other, Rect::new(260, 20, 40, 40), INK);
    let implementation = image(other);

    let first = matcher.compare(&reference, &implementation).unwrap();
    let second = matcher.compare(&reference, &implementation).unwrap();
    assert_eq!(first, second);

    let cache = ResultCache::new();
    let cached = cache.compare(&matcher, &reference, &implementation).unwrap();
    let again = cache.compare(&matcher, &reference, &implementation).unwrap();
    assert_eq!(cache.len(), 1);
    assert_eq!(cached, again);
    assert_eq!(cached, first);
}

#[test]
fn long_screens_detect_each_element_once() {
    let matcher = matcher_without_ocr();
    let mut tall = canvas(200, 3000, WHITE);
    fill(&mut tall, Rect::new(20, 100, 100, 60), INK);
    fill(&mut tall, Rect::new(20, 1500, 100, 60), INK);
    fill(&mut tall, Rect::new(20, 2600, 100, 60), INK);
    let screen = image(tall);

    let result = matcher.compare(&screen, &screen).unwrap();

    let mut tops: Vec<u32> = result
        .elements
        .reference
        .iter()
        .map(|region| region.rect.y)
        .collect();
    tops.sort_unstable();
    assert_eq!(tops.len(), 3);
    for (top, expected) in tops.iter().zip([100u32, 1500, 2600]) {
        assert!(top.abs_diff(expected) <= 2, "region at y={top}, expected {expected}");
    }
    assert_eq!(result.elements.reference, result.elements.implementation);
}

#[test]
fn element_across_a_band_seam_stays_whole() {
    let matcher = matcher_without_ocr();
    let mut tall = canvas(200, 3000, WHITE);
    fill(&mut tall, Rect::new(20, 1000, 100, 60), INK);
    let screen = image(tall);

    let result = matcher.compare(&screen, &screen).unwrap();

    let regions = &result.elements.reference;
    assert_eq!(regions.len(), 1, "regions: {regions:?}");
    assert_eq!(regions[0].label, ElementLabel::Image);
    assert!(regions[0].rect.y <= 1002);
    assert!(regions[0].rect.bottom() >= 1058);
}

#[test]
fn shift_across_a_band_seam_keeps_the_element_set() {
    let matcher = matcher_without_ocr();
    let mut design = canvas(200, 3000, WHITE);
    fill(&mut design, Rect::new(20, 990, 100, 60), INK);
    let mut built = canvas(200, 3000, WHITE);
    fill(&mut built, Rect::new(20, 1020, 100, 60), INK);

    let result = matcher.compare(&image(design), &image(built)).unwrap();

    assert!(result.issues.iter().all(|issue| !matches!(
        issue.category,
        IssueCategory::MissingElement | IssueCategory::ExtraElement
    )));
}

#[test]
fn invalid_score_weights_are_rejected_at_startup() {
    let mut config = contour_config();
    config.weights.layout = -1.0;
    assert!(matches!(
        DesignMatcher::initialize(config, Vec::new()),
        Err(DesignMatchError::Score(_))
    ));
}

#[test]
fn explicit_onnx_without_model_is_unavailable() {
    let config = MatcherConfig {
        detection: DetectionOptions {
            detector: DetectorKind::Onnx,
            ..DetectionOptions::default()
        },
        ..MatcherConfig::default()
    };
    match DesignMatcher::initialize(config, Vec::new()) {
        Err(err) => assert_eq!(err.exit_code(), 3),
        Ok(_) => panic!("onnx detector built without a model"),
    }
}

#[test]
fn auto_detection_falls_back_to_contours() {
    let matcher = DesignMatcher::initialize(MatcherConfig::default(), Vec::new()).unwrap();
    assert_eq!(matcher.detector_name(), "contour");
}

fn settings_for(dir: &std::path::Path, reference: PathBuf) -> EffectiveSettings {
    EffectiveSettings {
        reference,
        implementation: dir.join("implementation.png"),
        matcher: contour_config(),
        ocr: OcrSettings {
            engines: vec![OcrEngineChoice::Noop],
            ..OcrSettings::default()
        },
        output: OutputSettings {
            html: Some(dir.join("reports").join("report.html")),
            json: Some(dir.join("reports").join("report.json")),
            pretty: true,
        },
        config_dir: None,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn run_writes_html_and_json_reports() {
    let dir = tempfile::tempdir().unwrap();
    login_screen().save(dir.path().join("reference.png")).unwrap();
    let mut implementation = login_screen();
    fill(&mut implementation, Rect::new(40, 60, 200, 40), WHITE);
    implementation
        .save(dir.path().join("implementation.png"))
        .unwrap();

    let settings = settings_for(dir.path(), dir.path().join("reference.png"));
    let result = run(settings).await.unwrap();

    let html = std::fs::read_to_string(dir.path().join("reports/report.html")).unwrap();
    assert!(html.contains("data:image/png;base64,"));
    assert!(html.contains("button is missing in the UI"));

    let json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(dir.path().join("reports/report.json")).unwrap())
            .unwrap();
    assert_eq!(json["overall_score"].as_f64(), Some(result.overall_score));
    assert_eq!(
        json["issues"].as_array().map(Vec::len),
        Some(result.issues.len())
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn run_rejects_missing_images() {
    let dir = tempfile::tempdir().unwrap();
    login_screen()
        .save(dir.path().join("implementation.png"))
        .unwrap();
    let settings = settings_for(dir.path(), dir.path().join("nope.png"));

    let err = run(settings).await.unwrap_err();
    assert!(matches!(err, DesignMatchError::Input(_)));
    assert_eq!(err.exit_code(), 2);
    assert!(!dir.path().join("reports").exists());
}

#[tokio::test]
async fn writer_without_targets_is_a_no_op() {
    let writer = ReportWriter::new(&OutputSettings::default());
    assert!(writer.is_empty());
    let screen = image(login_screen());
    let result = matcher_without_ocr().compare(&screen, &screen).unwrap();
    writer.write(&result).await.unwrap();
}
