use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use clap::ValueEnum;
use design_match_comparator::ScoreWeights;
use design_match_detector::DetectorKind;
use design_match_types::SimilarityMetric;
use directories::{BaseDirs, ProjectDirs};
use serde::Deserialize;

use crate::cli::{CliArgs, CliSources, OcrEngineChoice};
use crate::pipeline::MatcherConfig;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    detection: Option<DetectionFileConfig>,
    ocr: Option<OcrFileConfig>,
    matching: Option<MatchingFileConfig>,
    score: Option<ScoreWeights>,
    output: Option<OutputFileConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DetectionFileConfig {
    strategy: Option<String>,
    onnx_model: Option<String>,
    labels: Option<String>,
    min_region_size: Option<u32>,
    confidence_threshold: Option<f32>,
    iou_threshold: Option<f32>,
    classify_with_ocr: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OcrFileConfig {
    engines: Option<Vec<String>>,
    tesseract_path: Option<String>,
    languages: Option<String>,
    psm: Option<u32>,
    cloud_timeout_secs: Option<u64>,
    google_api_key: Option<String>,
    slice_height: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MatchingFileConfig {
    metric: Option<String>,
    text_match_threshold: Option<f64>,
    text_similarity_threshold: Option<f64>,
    position_tolerance: Option<u32>,
    width_tolerance: Option<u32>,
    diff_threshold: Option<u8>,
    diff_min_area: Option<f64>,
    large_area: Option<f64>,
    medium_area: Option<f64>,
    color_threshold: Option<f64>,
    embedding_model: Option<String>,
    embedding_threshold: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OutputFileConfig {
    html: Option<String>,
    json: Option<String>,
    pretty: Option<bool>,
}

#[derive(Debug)]
pub struct EffectiveSettings {
    pub reference: PathBuf,
    pub implementation: PathBuf,
    pub matcher: MatcherConfig,
    pub ocr: OcrSettings,
    pub output: OutputSettings,
    pub config_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct OcrSettings {
    pub engines: Vec<OcrEngineChoice>,
    pub tesseract_path: PathBuf,
    pub languages: String,
    pub psm: u32,
    pub cloud_timeout: Duration,
    pub google_api_key: Option<String>,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            engines: DEFAULT_OCR_ENGINES.to_vec(),
            tesseract_path: PathBuf::from(DEFAULT_TESSERACT_BINARY),
            languages: DEFAULT_OCR_LANGUAGES.to_string(),
            psm: DEFAULT_PSM,
            cloud_timeout: Duration::from_secs(DEFAULT_CLOUD_TIMEOUT_SECS),
            google_api_key: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OutputSettings {
    pub html: Option<PathBuf>,
    pub json: Option<PathBuf>,
    pub pretty: bool,
}

const DEFAULT_OCR_ENGINES: &[OcrEngineChoice] = &[OcrEngineChoice::Tesseract];
const DEFAULT_TESSERACT_BINARY: &str = "tesseract";
const DEFAULT_OCR_LANGUAGES: &str = "eng";
const DEFAULT_PSM: u32 = 3;
const MAX_PSM: u32 = 13;
const DEFAULT_CLOUD_TIMEOUT_SECS: u64 = 10;
const PROJECT_CONFIG_FILE: &str = "design-match.toml";

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    InvalidValue {
        path: Option<PathBuf>,
        field: &'static str,
        value: String,
    },
    NotFound {
        path: PathBuf,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(
                    f,
                    "failed to read config file {}: {}",
                    path.display(),
                    source
                )
            }
            ConfigError::Parse { path, source } => {
                write!(
                    f,
                    "failed to parse config file {}: {}",
                    path.display(),
                    source
                )
            }
            ConfigError::InvalidValue { path, field, value } => {
                if let Some(path) = path {
                    write!(
                        f,
                        "invalid value '{}' for '{}' in {}",
                        value,
                        field,
                        path.display()
                    )
                } else {
                    write!(f, "invalid value '{}' for '{}'", value, field)
                }
            }
            ConfigError::NotFound { path } => {
                write!(f, "config file {} does not exist", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::InvalidValue { .. } => None,
            ConfigError::NotFound { .. } => None,
        }
    }
}

pub fn resolve_settings(
    cli: &CliArgs,
    sources: &CliSources,
) -> Result<EffectiveSettings, ConfigError> {
    let (file, config_path) = load_config(cli.config.as_deref())?;
    merge(cli, sources, file, config_path)
}

fn load_config(path_override: Option<&Path>) -> Result<(FileConfig, Option<PathBuf>), ConfigError> {
    if let Some(path) = path_override {
        let path = expand_pathbuf(path.to_path_buf());
        if !path.exists() {
            return Err(ConfigError::NotFound { path });
        }
        return read_config(path);
    }

    let candidates = [project_config_path(), default_config_path()];
    for path in candidates.into_iter().flatten() {
        if path.exists() {
            return read_config(path);
        }
    }
    Ok((FileConfig::default(), None))
}

fn read_config(path: PathBuf) -> Result<(FileConfig, Option<PathBuf>), ConfigError> {
    let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;
    Ok((config, Some(path)))
}

fn merge(
    cli: &CliArgs,
    sources: &CliSources,
    file: FileConfig,
    config_path: Option<PathBuf>,
) -> Result<EffectiveSettings, ConfigError> {
    let config_dir = config_path
        .as_ref()
        .and_then(|path| path.parent().map(|dir| dir.to_path_buf()));
    let base = config_dir.as_deref();

    let FileConfig {
        detection: file_detection,
        ocr: file_ocr,
        matching: file_matching,
        score: file_score,
        output: file_output,
    } = file;
    let file_detection = file_detection.unwrap_or_default();
    let file_ocr = file_ocr.unwrap_or_default();
    let file_matching = file_matching.unwrap_or_default();
    let file_output = file_output.unwrap_or_default();

    let mut matcher = MatcherConfig::default();

    // detection
    matcher.detection.detector = cli.detector.into();
    if !sources.detector_from_cli {
        if let Some(value) = normalize_string(file_detection.strategy) {
            matcher.detection.detector = parse_detector(&value, config_path.as_ref())?;
        }
    }
    matcher.detection.onnx_model_path = cli
        .onnx_model
        .clone()
        .map(expand_pathbuf)
        .or_else(|| {
            normalize_string(file_detection.onnx_model)
                .and_then(|value| resolve_path_from_config(value, base))
        });
    matcher.detection.labels_path = cli.labels.clone().map(expand_pathbuf).or_else(|| {
        normalize_string(file_detection.labels)
            .and_then(|value| resolve_path_from_config(value, base))
    });
    if let Some(value) = cli.min_region_size.or(file_detection.min_region_size) {
        matcher.detection.min_region_size = value;
    }
    if let Some(value) = file_detection.confidence_threshold {
        matcher.detection.confidence_threshold =
            unit_interval(value, "confidence_threshold", config_path.as_ref())?;
    }
    if let Some(value) = file_detection.iou_threshold {
        matcher.detection.iou_threshold =
            unit_interval(value, "iou_threshold", config_path.as_ref())?;
    }
    if let Some(value) = file_detection.classify_with_ocr {
        matcher.detection.classify_with_ocr = value;
    }

    // matching
    matcher.metric = cli.metric.into();
    if !sources.metric_from_cli {
        if let Some(value) = normalize_string(file_matching.metric) {
            matcher.metric = SimilarityMetric::from_str(&value).map_err(|_| {
                ConfigError::InvalidValue {
                    path: config_path.clone(),
                    field: "metric",
                    value: value.clone(),
                }
            })?;
        }
    }
    if let Some(value) = cli.text_threshold {
        matcher.text_match_threshold = percentage(value, "text_match_threshold", None)?;
    } else if let Some(value) = file_matching.text_match_threshold {
        matcher.text_match_threshold =
            percentage(value, "text_match_threshold", config_path.as_ref())?;
    }
    if let Some(value) = file_matching.text_similarity_threshold {
        matcher.thresholds.text_similarity =
            percentage(value, "text_similarity_threshold", config_path.as_ref())?;
    }
    if let Some(value) = cli.position_tolerance.or(file_matching.position_tolerance) {
        matcher.position_tolerance = value;
    }
    if let Some(value) = file_matching.width_tolerance {
        matcher.thresholds.width_tolerance = value;
    }
    if let Some(value) = file_matching.diff_threshold {
        matcher.diff_threshold = value;
    }
    if let Some(value) = file_matching.diff_min_area {
        matcher.diff_min_area = non_negative(value, "diff_min_area", config_path.as_ref())?;
    }
    if let Some(value) = file_matching.large_area {
        matcher.thresholds.large_area = non_negative(value, "large_area", config_path.as_ref())?;
    }
    if let Some(value) = file_matching.medium_area {
        matcher.thresholds.medium_area =
            non_negative(value, "medium_area", config_path.as_ref())?;
    }
    if let Some(value) = file_matching.color_threshold {
        if !(-1.0..=1.0).contains(&value) {
            return Err(ConfigError::InvalidValue {
                path: config_path,
                field: "color_threshold",
                value: value.to_string(),
            });
        }
        matcher.thresholds.color = value;
    }
    if let Some(value) = file_matching.embedding_threshold {
        matcher.thresholds.embedding =
            percentage(value, "embedding_threshold", config_path.as_ref())?;
    }
    matcher.embedding_model = cli.embedding_model.clone().map(expand_pathbuf).or_else(|| {
        normalize_string(file_matching.embedding_model)
            .and_then(|value| resolve_path_from_config(value, base))
    });

    if let Some(weights) = file_score {
        matcher.weights = weights;
    }

    // ocr
    let mut ocr = OcrSettings::default();
    if sources.ocr_engines_from_cli {
        ocr.engines = dedup_engines(cli.ocr_engines.clone());
    } else if let Some(names) = file_ocr.engines {
        let mut engines = Vec::with_capacity(names.len());
        for name in names {
            let Some(name) = normalize_string(Some(name)) else {
                continue;
            };
            engines.push(parse_ocr_engine(&name, config_path.as_ref())?);
        }
        ocr.engines = dedup_engines(engines);
    }
    if let Some(path) = normalize_string(file_ocr.tesseract_path) {
        ocr.tesseract_path = if path.contains(['/', '\\']) || path.starts_with('~') {
            resolve_path_from_config(path.clone(), base).unwrap_or_else(|| PathBuf::from(path))
        } else {
            PathBuf::from(path)
        };
    }
    if let Some(languages) = normalize_string(file_ocr.languages) {
        ocr.languages = languages;
    }
    if let Some(psm) = file_ocr.psm {
        if psm > MAX_PSM {
            return Err(ConfigError::InvalidValue {
                path: config_path,
                field: "psm",
                value: psm.to_string(),
            });
        }
        ocr.psm = psm;
    }
    if let Some(secs) = file_ocr.cloud_timeout_secs {
        if secs == 0 {
            return Err(ConfigError::InvalidValue {
                path: config_path,
                field: "cloud_timeout_secs",
                value: secs.to_string(),
            });
        }
        ocr.cloud_timeout = Duration::from_secs(secs);
    }
    ocr.google_api_key = normalize_string(file_ocr.google_api_key);

    if let Some(value) = cli.slice_height {
        matcher.slice_height = value;
    } else if let Some(value) = file_ocr.slice_height {
        if value == 0 {
            return Err(ConfigError::InvalidValue {
                path: config_path,
                field: "slice_height",
                value: value.to_string(),
            });
        }
        matcher.slice_height = value;
    }

    // output
    let output = OutputSettings {
        html: cli.html.clone().map(expand_pathbuf).or_else(|| {
            normalize_string(file_output.html)
                .and_then(|value| resolve_path_from_config(value, base))
        }),
        json: cli.json.clone().map(expand_pathbuf).or_else(|| {
            normalize_string(file_output.json)
                .and_then(|value| resolve_path_from_config(value, base))
        }),
        pretty: file_output.pretty.unwrap_or(true),
    };

    Ok(EffectiveSettings {
        reference: expand_pathbuf(cli.reference.clone()),
        implementation: expand_pathbuf(cli.implementation.clone()),
        matcher,
        ocr,
        output,
        config_dir,
    })
}

fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("rs", "design-match", "design-match")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

fn project_config_path() -> Option<PathBuf> {
    env::current_dir()
        .ok()
        .map(|dir| dir.join(PROJECT_CONFIG_FILE))
}

fn normalize_string(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn expand_pathbuf(path: PathBuf) -> PathBuf {
    match path.to_str() {
        Some(s) => expand_home_path(s),
        None => path,
    }
}

fn resolve_path_from_config(value: String, base: Option<&Path>) -> Option<PathBuf> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let expanded = expand_home_path(trimmed);
    match base {
        Some(base) if !expanded.is_absolute() => Some(base.join(expanded)),
        _ => Some(expanded),
    }
}

fn expand_home_path(value: &str) -> PathBuf {
    if value == "~" {
        if let Some(base) = BaseDirs::new() {
            return base.home_dir().to_path_buf();
        }
    } else if let Some(stripped) = value.strip_prefix("~/") {
        if let Some(base) = BaseDirs::new() {
            return base.home_dir().join(stripped);
        }
    }
    PathBuf::from(value)
}

fn dedup_engines(engines: Vec<OcrEngineChoice>) -> Vec<OcrEngineChoice> {
    let mut unique = Vec::with_capacity(engines.len());
    for engine in engines {
        if !unique.contains(&engine) {
            unique.push(engine);
        }
    }
    unique
}

fn parse_detector(value: &str, path: Option<&PathBuf>) -> Result<DetectorKind, ConfigError> {
    DetectorKind::from_str(value).map_err(|_| ConfigError::InvalidValue {
        path: path.cloned(),
        field: "strategy",
        value: value.to_string(),
    })
}

fn parse_ocr_engine(value: &str, path: Option<&PathBuf>) -> Result<OcrEngineChoice, ConfigError> {
    OcrEngineChoice::from_str(value, true).map_err(|_| ConfigError::InvalidValue {
        path: path.cloned(),
        field: "engines",
        value: value.to_string(),
    })
}

fn percentage(value: f64, field: &'static str, path: Option<&PathBuf>) -> Result<f64, ConfigError> {
    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::InvalidValue {
            path: path.cloned(),
            field,
            value: value.to_string(),
        })
    }
}

fn unit_interval(value: f32, field: &'static str, path: Option<&PathBuf>) -> Result<f32, ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::InvalidValue {
            path: path.cloned(),
            field,
            value: value.to_string(),
        })
    }
}

fn non_negative(value: f64, field: &'static str, path: Option<&PathBuf>) -> Result<f64, ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidValue {
            path: path.cloned(),
            field,
            value: value.to_string(),
        })
    }
}
