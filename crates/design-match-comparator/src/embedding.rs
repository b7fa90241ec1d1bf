use std::path::{Path, PathBuf};
use std::sync::Arc;

use design_match_types::Image;
use image::imageops::{self, FilterType};
use log::info;
use ndarray::{Array4, CowArray, IxDyn};
use ort::environment::Environment;
use ort::session::{Session, SessionBuilder};
use ort::value::Value;
use thiserror::Error;

const INPUT_SIZE: usize = 224;
const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const STD: [f32; 3] = [0.229, 0.224, 0.225];

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding model not found: {path}")]
    ModelNotFound { path: PathBuf },
    #[error("failed to load embedding model: {0}")]
    Session(String),
    #[error("embedding inference failed: {0}")]
    Inference(String),
}

/// Whole-image encoder whose output vectors are compared by cosine.
pub struct EmbeddingComparator {
    _environment: Arc<Environment>,
    session: Session,
}

impl EmbeddingComparator {
    pub fn new(model_path: &Path) -> Result<Self, EmbeddingError> {
        if !model_path.exists() {
            return Err(EmbeddingError::ModelNotFound {
                path: model_path.to_path_buf(),
            });
        }
        let environment = Environment::builder()
            .with_name("design-match-embedding")
            .build()
            .map_err(|err| EmbeddingError::Session(err.to_string()))?;
        let environment = Arc::new(environment);
        let session = SessionBuilder::new(&environment)
            .map_err(|err| EmbeddingError::Session(err.to_string()))?
            .with_model_from_file(model_path)
            .map_err(|err| EmbeddingError::Session(err.to_string()))?;
        info!("loaded embedding model {}", model_path.display());
        Ok(Self {
            _environment: environment,
            session,
        })
    }

    /// Cosine similarity of the two embeddings, x100, two decimals.
    pub fn similarity(&self, reference: &Image, implementation: &Image) -> Result<f64, EmbeddingError> {
        let a = self.embed(reference)?;
        let b = self.embed(implementation)?;
        Ok((cosine_similarity(&a, &b) * 10_000.0).round() / 100.0)
    }

    fn embed(&self, image: &Image) -> Result<Vec<f32>, EmbeddingError> {
        let input = prepare_input(image)?;
        let allocator = self.session.allocator();
        let input_dyn: CowArray<'_, f32, IxDyn> = CowArray::from(input.view().into_dyn());
        let value = Value::from_array(allocator, &input_dyn)
            .map_err(|err| EmbeddingError::Inference(err.to_string()))?;
        let outputs = self
            .session
            .run(vec![value])
            .map_err(|err| EmbeddingError::Inference(err.to_string()))?;
        let tensor = outputs
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::Inference("model produced no outputs".to_string()))?
            .try_extract::<f32>()
            .map_err(|err| EmbeddingError::Inference(err.to_string()))?;
        let view = tensor.view();
        Ok(view.iter().copied().collect())
    }
}

fn prepare_input(image: &Image) -> Result<Array4<f32>, EmbeddingError> {
    let resized = imageops::resize(
        image.as_rgb(),
        INPUT_SIZE as u32,
        INPUT_SIZE as u32,
        FilterType::Triangle,
    );
    let area = INPUT_SIZE * INPUT_SIZE;
    let mut data = vec![0f32; area * 3];
    for (i, pixel) in resized.pixels().enumerate() {
        for channel in 0..3 {
            let value = pixel[channel] as f32 / 255.0;
            data[i + channel * area] = (value - MEAN[channel]) / STD[channel];
        }
    }
    Array4::from_shape_vec((1, 3, INPUT_SIZE, INPUT_SIZE), data)
        .map_err(|err| EmbeddingError::Inference(err.to_string()))
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let len = a.len().min(b.len());
    let mut dot = 0f64;
    let mut norm_a = 0f64;
    let mut norm_b = 0f64;
    for idx in 0..len {
        dot += a[idx] as f64 * b[idx] as f64;
        norm_a += (a[idx] as f64).powi(2);
        norm_b += (b[idx] as f64).powi(2);
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom <= f64::EPSILON {
        0.0
    } else {
        (dot / denom).clamp(-1.0, 1.0)
    }
}
