pub mod cache;
pub mod cli;
pub mod engines;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod settings;

use std::path::Path;

use design_match_detector::preflight_detection;
use design_match_types::{ComparisonResult, Image};
use log::info;

pub use cache::{ResultCache, pair_fingerprint};
pub use error::DesignMatchError;
pub use pipeline::{DesignMatcher, MatcherConfig};

use output::ReportWriter;
use settings::EffectiveSettings;

/// Checks the detector strategy, loads both images, runs one comparison and
/// writes the configured reports.
///
/// Model loading and the comparison itself are CPU bound and run on the
/// blocking pool; only report writing happens on the async runtime.
pub async fn run(settings: EffectiveSettings) -> Result<ComparisonResult, DesignMatchError> {
    let EffectiveSettings {
        reference,
        implementation,
        matcher,
        ocr,
        output,
        ..
    } = settings;

    preflight_detection(
        matcher.detection.detector,
        matcher.detection.onnx_model_path.as_deref(),
    )?;

    let result = tokio::task::spawn_blocking(move || {
        let engines = engines::build_ocr_engines(&ocr);
        let matcher = DesignMatcher::initialize(matcher, engines)?;
        let reference = load_image(&reference)?;
        let implementation = load_image(&implementation)?;
        matcher.compare(&reference, &implementation)
    })
    .await
    .map_err(|err| DesignMatchError::Task(err.to_string()))??;

    ReportWriter::new(&output).write(&result).await?;
    Ok(result)
}

fn load_image(path: &Path) -> Result<Image, DesignMatchError> {
    let image = Image::open(path)?;
    info!(
        "loaded {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(image)
}
