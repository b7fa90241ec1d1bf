use std::ffi::OsString;
use std::path::PathBuf;

use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, ValueEnum};
use design_match_detector::DetectorKind;
use design_match_types::SimilarityMetric;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum DetectorChoice {
    Auto,
    Contour,
    Onnx,
}

impl From<DetectorChoice> for DetectorKind {
    fn from(value: DetectorChoice) -> Self {
        match value {
            DetectorChoice::Auto => DetectorKind::Auto,
            DetectorChoice::Contour => DetectorKind::Contour,
            DetectorChoice::Onnx => DetectorKind::Onnx,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OcrEngineChoice {
    Tesseract,
    GoogleVision,
    Noop,
}

impl OcrEngineChoice {
    pub fn as_str(self) -> &'static str {
        match self {
            OcrEngineChoice::Tesseract => "tesseract",
            OcrEngineChoice::GoogleVision => "google-vision",
            OcrEngineChoice::Noop => "noop",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum MetricChoice {
    Ssim,
    MeanAbs,
}

impl From<MetricChoice> for SimilarityMetric {
    fn from(value: MetricChoice) -> Self {
        match value {
            MetricChoice::Ssim => SimilarityMetric::Ssim,
            MetricChoice::MeanAbs => SimilarityMetric::MeanAbs,
        }
    }
}

#[derive(Debug, Default)]
pub struct CliSources {
    pub detector_from_cli: bool,
    pub metric_from_cli: bool,
    pub ocr_engines_from_cli: bool,
}

impl CliSources {
    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            detector_from_cli: value_from_cli(matches, "detector"),
            metric_from_cli: value_from_cli(matches, "metric"),
            ocr_engines_from_cli: value_from_cli(matches, "ocr_engines"),
        }
    }
}

fn value_from_cli(matches: &ArgMatches, id: &str) -> bool {
    matches
        .value_source(id)
        .is_some_and(|source| matches!(source, ValueSource::CommandLine))
}

pub fn parse_cli() -> (CliArgs, CliSources) {
    match parse_cli_from(std::env::args_os()) {
        Ok(parsed) => parsed,
        Err(err) => err.exit(),
    }
}

pub fn parse_cli_from<I, T>(args: I) -> Result<(CliArgs, CliSources), clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = CliArgs::command().try_get_matches_from(args)?;
    let args = CliArgs::from_arg_matches(&matches)?;
    let sources = CliSources::from_matches(&matches);
    Ok((args, sources))
}

#[derive(Debug, Parser)]
#[command(
    name = "design-match",
    about = "Check a UI screenshot against its reference design",
    disable_help_subcommand = true
)]
pub struct CliArgs {
    /// Reference design image (e.g. a Figma export)
    #[arg(short = 'r', long = "reference", value_name = "IMAGE")]
    pub reference: PathBuf,

    /// Screenshot of the implemented UI
    #[arg(short = 'i', long = "implementation", value_name = "IMAGE")]
    pub implementation: PathBuf,

    /// Write a self-contained HTML report
    #[arg(long = "html", value_name = "FILE")]
    pub html: Option<PathBuf>,

    /// Write the report as JSON
    #[arg(long = "json", value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Override the configuration file path
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Element detection strategy
    #[arg(long = "detector", value_enum, default_value_t = DetectorChoice::Auto)]
    pub detector: DetectorChoice,

    /// ONNX model used by the learned detector
    #[arg(long = "onnx-model", value_name = "FILE")]
    pub onnx_model: Option<PathBuf>,

    /// Class names for the learned detector, one per line
    #[arg(long = "labels", value_name = "FILE")]
    pub labels: Option<PathBuf>,

    /// OCR engine to try, in order (repeatable)
    #[arg(long = "ocr-engine", id = "ocr_engines", value_enum, value_name = "ENGINE")]
    pub ocr_engines: Vec<OcrEngineChoice>,

    /// Structural similarity metric for the layout score
    #[arg(long = "metric", value_enum, default_value_t = MetricChoice::Ssim)]
    pub metric: MetricChoice,

    /// Fuzzy text score (0-100) at or above which texts count as matched
    #[arg(long = "text-threshold", value_name = "SCORE")]
    pub text_threshold: Option<f64>,

    /// Maximum offset in pixels for two text areas to count as aligned
    #[arg(long = "position-tolerance", value_name = "PX")]
    pub position_tolerance: Option<u32>,

    /// Band height for long screenshots
    #[arg(
        long = "slice-height",
        value_name = "PX",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub slice_height: Option<u32>,

    /// Smallest element width and height kept by the contour detector
    #[arg(long = "min-region-size", value_name = "PX")]
    pub min_region_size: Option<u32>,

    /// ONNX image encoder for the optional embedding similarity check
    #[arg(long = "embedding-model", value_name = "FILE")]
    pub embedding_model: Option<PathBuf>,
}
