use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use design_match_ocr::TextExtractor;
use design_match_types::{Image, Region};
use log::{debug, info, warn};
use thiserror::Error;

pub mod classify;
pub mod contour;
pub mod contours;
pub mod suppression;
pub mod text_areas;

pub use contour::ContourDetector;

#[cfg(feature = "detector-onnx")]
pub mod onnx;
#[cfg(feature = "detector-onnx")]
pub use onnx::OnnxElementDetector;

pub const DEFAULT_MIN_REGION_SIZE: u32 = 10;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.25;
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.45;

const AUTO_DETECTOR_PRIORITY: &[DetectorKind] = &[DetectorKind::Onnx, DetectorKind::Contour];

fn backend_for_kind(kind: DetectorKind) -> Option<&'static dyn DetectorBackend> {
    match kind {
        DetectorKind::Auto => None,
        DetectorKind::Onnx => {
            #[cfg(feature = "detector-onnx")]
            {
                Some(&ONNX_BACKEND)
            }
            #[cfg(not(feature = "detector-onnx"))]
            {
                None
            }
        }
        DetectorKind::Contour => Some(&CONTOUR_BACKEND),
    }
}

#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("model file not found: {path}")]
    ModelNotFound { path: PathBuf },
    #[error(
        "no ONNX model path configured; provide --onnx-model or set detection.onnx_model in the configuration file"
    )]
    MissingModelPath,
    #[error("failed to read class labels from {path}: {source}")]
    Labels {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to initialize onnx runtime environment: {0}")]
    Environment(String),
    #[error("failed to create inference session: {0}")]
    Session(String),
    #[error(
        "onnxruntime schema registration conflict detected. Ensure only one ONNX Runtime version is present and that it matches the crate. Original error: {message}"
    )]
    RuntimeSchemaConflict { message: String },
    #[error("failed to prepare model input: {0}")]
    Input(String),
    #[error("model inference failed: {0}")]
    Inference(String),
    #[error("unexpected model output shape {0:?}")]
    InvalidOutputShape(Vec<usize>),
    #[error("{backend} detector is not supported in this build")]
    Unsupported { backend: &'static str },
}

impl DetectionError {
    /// True for errors that mean the learned model cannot be used at all.
    pub fn is_model_unavailable(&self) -> bool {
        matches!(
            self,
            DetectionError::ModelNotFound { .. }
                | DetectionError::MissingModelPath
                | DetectionError::Labels { .. }
                | DetectionError::Environment(_)
                | DetectionError::Session(_)
                | DetectionError::RuntimeSchemaConflict { .. }
                | DetectionError::Unsupported { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorKind {
    /// Learned model when available, contours otherwise.
    Auto,
    Contour,
    Onnx,
}

impl DetectorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DetectorKind::Auto => "auto",
            DetectorKind::Contour => "contour",
            DetectorKind::Onnx => "onnx",
        }
    }
}

#[derive(Debug)]
pub struct DetectorKindParseError(pub String);

impl fmt::Display for DetectorKindParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown detector '{}'", self.0)
    }
}

impl std::error::Error for DetectorKindParseError {}

impl FromStr for DetectorKind {
    type Err = DetectorKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "auto" => Ok(DetectorKind::Auto),
            "contour" | "contours" => Ok(DetectorKind::Contour),
            "onnx" | "yolo" | "model" => Ok(DetectorKind::Onnx),
            _ => Err(DetectorKindParseError(lower)),
        }
    }
}

/// Locates and classifies UI elements in one image.
pub trait ElementDetector: Send + Sync {
    fn name(&self) -> &'static str;

    fn detect(&self, image: &Image) -> Result<Vec<Region>, DetectionError>;
}

/// Everything a detector strategy needs at construction time.
#[derive(Clone)]
pub struct ElementDetectionConfig {
    pub model_path: Option<PathBuf>,
    pub labels_path: Option<PathBuf>,
    pub min_region_size: u32,
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    /// OCR used by the contour strategy to recognize text elements.
    pub text_probe: Option<TextExtractor>,
}

impl Default for ElementDetectionConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            labels_path: None,
            min_region_size: DEFAULT_MIN_REGION_SIZE,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            text_probe: None,
        }
    }
}

impl fmt::Debug for ElementDetectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementDetectionConfig")
            .field("model_path", &self.model_path)
            .field("labels_path", &self.labels_path)
            .field("min_region_size", &self.min_region_size)
            .field("confidence_threshold", &self.confidence_threshold)
            .field("iou_threshold", &self.iou_threshold)
            .field("text_probe", &self.text_probe.is_some())
            .finish()
    }
}

trait DetectorBackend: Sync {
    fn kind(&self) -> DetectorKind;
    fn ensure_available(&self, config: &ElementDetectionConfig) -> Result<(), DetectionError>;
    fn build(
        &self,
        config: ElementDetectionConfig,
    ) -> Result<Box<dyn ElementDetector>, DetectionError>;
}

#[cfg(feature = "detector-onnx")]
struct OnnxBackend;

#[cfg(feature = "detector-onnx")]
impl DetectorBackend for OnnxBackend {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Onnx
    }

    fn ensure_available(&self, config: &ElementDetectionConfig) -> Result<(), DetectionError> {
        OnnxElementDetector::ensure_available(config)
    }

    fn build(
        &self,
        config: ElementDetectionConfig,
    ) -> Result<Box<dyn ElementDetector>, DetectionError> {
        Ok(Box::new(OnnxElementDetector::new(config)?))
    }
}

#[cfg(feature = "detector-onnx")]
static ONNX_BACKEND: OnnxBackend = OnnxBackend;

struct ContourBackend;

impl DetectorBackend for ContourBackend {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Contour
    }

    fn ensure_available(&self, _: &ElementDetectionConfig) -> Result<(), DetectionError> {
        Ok(())
    }

    fn build(
        &self,
        config: ElementDetectionConfig,
    ) -> Result<Box<dyn ElementDetector>, DetectionError> {
        Ok(Box::new(ContourDetector::new(config)))
    }
}

static CONTOUR_BACKEND: ContourBackend = ContourBackend;

/// Builds the detector for `kind`. Only [`DetectorKind::Auto`] falls back to
/// another strategy; an explicit choice that cannot start is an error.
pub fn build_detector(
    kind: DetectorKind,
    config: ElementDetectionConfig,
) -> Result<Box<dyn ElementDetector>, DetectionError> {
    match kind {
        DetectorKind::Auto => build_auto(config),
        _ => {
            let backend = backend_for_kind(kind).ok_or(DetectionError::Unsupported {
                backend: kind.as_str(),
            })?;
            backend.ensure_available(&config)?;
            let detector = backend.build(config)?;
            info!("element detector '{}' ready", backend.kind().as_str());
            Ok(detector)
        }
    }
}

fn build_auto(config: ElementDetectionConfig) -> Result<Box<dyn ElementDetector>, DetectionError> {
    let mut last_err: Option<DetectionError> = None;
    for &candidate in AUTO_DETECTOR_PRIORITY {
        let Some(backend) = backend_for_kind(candidate) else {
            warn!(
                "auto element detector candidate '{}' is not compiled in",
                candidate.as_str()
            );
            last_err = Some(DetectionError::Unsupported {
                backend: candidate.as_str(),
            });
            continue;
        };
        let candidate_config = config.clone();
        match backend
            .ensure_available(&candidate_config)
            .and_then(|()| backend.build(candidate_config))
        {
            Ok(detector) => {
                info!("element detector '{}' ready (auto)", candidate.as_str());
                return Ok(detector);
            }
            Err(err) => {
                if matches!(err, DetectionError::MissingModelPath) {
                    debug!("auto element detector skipping '{}': {err}", candidate.as_str());
                } else {
                    warn!(
                        "auto element detector candidate '{}' unavailable: {err}",
                        candidate.as_str()
                    );
                }
                last_err = Some(err);
            }
        }
    }
    Err(last_err.unwrap_or(DetectionError::Unsupported {
        backend: DetectorKind::Auto.as_str(),
    }))
}

/// Checks that `kind` can start with the given model path without running it.
pub fn preflight_detection(
    kind: DetectorKind,
    model_path: Option<&Path>,
) -> Result<(), DetectionError> {
    let probe = ElementDetectionConfig {
        model_path: model_path.map(Path::to_path_buf),
        ..ElementDetectionConfig::default()
    };
    match kind {
        DetectorKind::Auto => {
            let mut last_err = None;
            for &candidate in AUTO_DETECTOR_PRIORITY {
                match ensure_backend_available(candidate, &probe) {
                    Ok(()) => return Ok(()),
                    Err(err) => last_err = Some(err),
                }
            }
            Err(last_err.unwrap_or(DetectionError::Unsupported {
                backend: DetectorKind::Auto.as_str(),
            }))
        }
        _ => ensure_backend_available(kind, &probe),
    }
}

fn ensure_backend_available(
    kind: DetectorKind,
    config: &ElementDetectionConfig,
) -> Result<(), DetectionError> {
    backend_for_kind(kind)
        .ok_or(DetectionError::Unsupported {
            backend: kind.as_str(),
        })?
        .ensure_available(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_parse_case_insensitively() {
        assert_eq!("Contour".parse::<DetectorKind>().unwrap(), DetectorKind::Contour);
        assert_eq!(" onnx ".parse::<DetectorKind>().unwrap(), DetectorKind::Onnx);
        assert_eq!("AUTO".parse::<DetectorKind>().unwrap(), DetectorKind::Auto);
        assert!("sift".parse::<DetectorKind>().is_err());
    }

    #[test]
    fn explicit_model_strategy_without_model_refuses_to_start() {
        let err = build_detector(DetectorKind::Onnx, ElementDetectionConfig::default())
            .err()
            .expect("onnx without a model must fail");
        assert!(err.is_model_unavailable());
    }

    #[test]
    fn explicit_model_strategy_with_missing_file_reports_path() {
        let config = ElementDetectionConfig {
            model_path: Some(PathBuf::from("/nonexistent/ui-elements.onnx")),
            ..ElementDetectionConfig::default()
        };
        let err = build_detector(DetectorKind::Onnx, config).err().unwrap();
        assert!(err.is_model_unavailable());
        if cfg!(feature = "detector-onnx") {
            assert!(matches!(err, DetectionError::ModelNotFound { .. }));
        }
    }

    #[test]
    fn auto_falls_back_to_contours() {
        let detector = build_detector(DetectorKind::Auto, ElementDetectionConfig::default()).unwrap();
        assert_eq!(detector.name(), "contour");
    }

    #[test]
    fn preflight_reports_missing_model() {
        assert!(preflight_detection(DetectorKind::Contour, None).is_ok());
        assert!(preflight_detection(DetectorKind::Auto, None).is_ok());
        assert!(preflight_detection(DetectorKind::Onnx, None).is_err());
    }
}
