use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use design_match_types::{ElementLabel, Image, Rect, Region};
use image::imageops::{self, FilterType};
use log::{debug, info};
use ndarray::{Array4, CowArray, IxDyn};
use ort::environment::Environment;
use ort::error::OrtError;
use ort::session::{Session, SessionBuilder};
use ort::value::Value;

use super::suppression::non_max_suppression;
use super::{DetectionError, ElementDetectionConfig, ElementDetector};

const MODEL_INPUT_WIDTH: usize = 640;
const MODEL_INPUT_HEIGHT: usize = 640;
const BOX_COORDS: usize = 4;

/// YOLO-family UI element detector loaded from an ONNX export.
///
/// The session is created once in [`OnnxElementDetector::new`] and reused
/// for every call; inference on CPU is deterministic.
pub struct OnnxElementDetector {
    _environment: Arc<Environment>,
    session: Session,
    labels: Vec<String>,
    confidence_threshold: f32,
    iou_threshold: f32,
    min_region_size: u32,
}

impl OnnxElementDetector {
    pub fn new(config: ElementDetectionConfig) -> Result<Self, DetectionError> {
        let model_path = require_model_path(config.model_path.as_deref())?;
        let labels = match config.labels_path.as_deref() {
            Some(path) => read_labels(path)?,
            None => Vec::new(),
        };

        let environment = Environment::builder()
            .with_name("design-match-detector")
            .build()
            .map_err(map_environment_error)?;
        let environment = Arc::new(environment);
        let session = SessionBuilder::new(&environment)
            .map_err(map_session_error)?
            .with_model_from_file(&model_path)
            .map_err(map_session_error)?;
        info!(
            "loaded element model {} ({} class names)",
            model_path.display(),
            labels.len()
        );

        Ok(Self {
            _environment: environment,
            session,
            labels,
            confidence_threshold: config.confidence_threshold,
            iou_threshold: config.iou_threshold,
            min_region_size: config.min_region_size,
        })
    }

    pub fn ensure_available(config: &ElementDetectionConfig) -> Result<(), DetectionError> {
        require_model_path(config.model_path.as_deref())?;
        if let Some(path) = config.labels_path.as_deref() {
            read_labels(path)?;
        }
        Ok(())
    }

    fn label_for(&self, class: usize) -> ElementLabel {
        match self.labels.get(class) {
            Some(name) if !name.is_empty() => ElementLabel::from_class_name(name),
            _ => ElementLabel::Class(format!("class_{class}")),
        }
    }

    fn run_model(&self, input: &Array4<f32>) -> Result<(Vec<f32>, Vec<usize>), DetectionError> {
        let allocator = self.session.allocator();
        let input_dyn: CowArray<'_, f32, IxDyn> = CowArray::from(input.view().into_dyn());
        let value = Value::from_array(allocator, &input_dyn)
            .map_err(|err| DetectionError::Input(err.to_string()))?;
        let outputs = self
            .session
            .run(vec![value])
            .map_err(|err| DetectionError::Inference(err.to_string()))?;
        let tensor = outputs
            .into_iter()
            .next()
            .ok_or_else(|| DetectionError::InvalidOutputShape(Vec::new()))?
            .try_extract::<f32>()
            .map_err(|err| DetectionError::Inference(err.to_string()))?;
        let view = tensor.view();
        let shape = view.shape().to_vec();
        let data = view.iter().copied().collect::<Vec<f32>>();
        Ok((data, shape))
    }
}

impl ElementDetector for OnnxElementDetector {
    fn name(&self) -> &'static str {
        "onnx"
    }

    fn detect(&self, image: &Image) -> Result<Vec<Region>, DetectionError> {
        let input = prepare_input_tensor(image)?;
        let (output, shape) = self.run_model(&input)?;
        let candidates = decode_predictions(
            &output,
            &shape,
            image.width(),
            image.height(),
            self.confidence_threshold,
        )?;
        let kept = non_max_suppression(candidates, self.iou_threshold);
        let regions: Vec<Region> = kept
            .into_iter()
            .filter(|(rect, _, _)| {
                rect.width >= self.min_region_size && rect.height >= self.min_region_size
            })
            .map(|(rect, class, score)| Region::new(rect, self.label_for(class), score))
            .collect();
        debug!("onnx detector kept {} regions", regions.len());
        Ok(regions)
    }
}

fn require_model_path(path: Option<&Path>) -> Result<PathBuf, DetectionError> {
    let path = path.ok_or(DetectionError::MissingModelPath)?;
    if !path.exists() {
        return Err(DetectionError::ModelNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(path.to_path_buf())
}

fn read_labels(path: &Path) -> Result<Vec<String>, DetectionError> {
    let contents = fs::read_to_string(path).map_err(|source| DetectionError::Labels {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_labels(&contents))
}

fn parse_labels(contents: &str) -> Vec<String> {
    let mut labels: Vec<String> = contents.lines().map(|line| line.trim().to_string()).collect();
    while labels.last().is_some_and(|label| label.is_empty()) {
        labels.pop();
    }
    labels
}

fn map_environment_error(err: OrtError) -> DetectionError {
    map_schema_conflict(err, DetectionError::Environment)
}

fn map_session_error(err: OrtError) -> DetectionError {
    map_schema_conflict(err, DetectionError::Session)
}

fn map_schema_conflict<F>(err: OrtError, default: F) -> DetectionError
where
    F: FnOnce(String) -> DetectionError,
{
    let message = err.to_string();
    if message.contains("Trying to register schema with name") {
        DetectionError::RuntimeSchemaConflict { message }
    } else {
        default(message)
    }
}

/// Stretches the image to the model input and lays it out as normalized
/// NCHW RGB.
fn prepare_input_tensor(image: &Image) -> Result<Array4<f32>, DetectionError> {
    let resized = imageops::resize(
        image.as_rgb(),
        MODEL_INPUT_WIDTH as u32,
        MODEL_INPUT_HEIGHT as u32,
        FilterType::Triangle,
    );
    let area = MODEL_INPUT_WIDTH * MODEL_INPUT_HEIGHT;
    let mut data = vec![0f32; area * 3];
    for (i, pixel) in resized.pixels().enumerate() {
        data[i] = pixel[0] as f32 / 255.0;
        data[i + area] = pixel[1] as f32 / 255.0;
        data[i + 2 * area] = pixel[2] as f32 / 255.0;
    }
    Array4::from_shape_vec((1, 3, MODEL_INPUT_HEIGHT, MODEL_INPUT_WIDTH), data)
        .map_err(|err| DetectionError::Input(err.to_string()))
}

/// Decodes a `[1, 4 + classes, anchors]` output into boxes in image
/// coordinates, keeping each anchor's best class above `threshold`.
fn decode_predictions(
    data: &[f32],
    shape: &[usize],
    image_width: u32,
    image_height: u32,
    threshold: f32,
) -> Result<Vec<(Rect, usize, f32)>, DetectionError> {
    let (rows, anchors) = match shape {
        [1, rows, anchors] if *rows > BOX_COORDS => (*rows, *anchors),
        _ => return Err(DetectionError::InvalidOutputShape(shape.to_vec())),
    };
    if data.len() < rows * anchors {
        return Err(DetectionError::InvalidOutputShape(shape.to_vec()));
    }
    let at = |row: usize, anchor: usize| data[row * anchors + anchor];
    let scale_x = image_width as f32 / MODEL_INPUT_WIDTH as f32;
    let scale_y = image_height as f32 / MODEL_INPUT_HEIGHT as f32;

    let mut candidates = Vec::new();
    for anchor in 0..anchors {
        let mut best_class = 0usize;
        let mut best_score = f32::MIN;
        for class in 0..rows - BOX_COORDS {
            let score = at(BOX_COORDS + class, anchor);
            if score > best_score {
                best_score = score;
                best_class = class;
            }
        }
        if !best_score.is_finite() || best_score < threshold {
            continue;
        }

        let cx = at(0, anchor) * scale_x;
        let cy = at(1, anchor) * scale_y;
        let w = at(2, anchor) * scale_x;
        let h = at(3, anchor) * scale_y;
        let left = (cx - w / 2.0).max(0.0);
        let top = (cy - h / 2.0).max(0.0);
        let right = (cx + w / 2.0).min(image_width as f32);
        let bottom = (cy + h / 2.0).min(image_height as f32);
        if right <= left || bottom <= top {
            continue;
        }
        let rect = Rect::new(
            left.round() as u32,
            top.round() as u32,
            (right - left).round().max(1.0) as u32,
            (bottom - top).round().max(1.0) as u32,
        );
        if let Some(rect) = rect.clamp_to(image_width, image_height) {
            candidates.push((rect, best_class, best_score));
        }
    }
    Ok(candidates)
}
