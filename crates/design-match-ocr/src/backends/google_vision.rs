use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use design_match_types::Rect;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;

use crate::{OcrEngine, OcrError, OcrRequest, OcrResponse, OcrText};

const ENGINE: &str = "google-vision";
pub const DEFAULT_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";
pub const API_KEY_ENV: &str = "GOOGLE_VISION_API_KEY";

#[derive(Debug, Clone)]
pub struct GoogleVisionConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for GoogleVisionConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Cloud OCR through the Google Cloud Vision `TEXT_DETECTION` feature.
#[derive(Debug, Clone)]
pub struct GoogleVisionOcrEngine {
    client: Client,
    endpoint: String,
    api_key: String,
    timeout: Duration,
}

impl GoogleVisionOcrEngine {
    /// Builds the engine. The API key falls back to `GOOGLE_VISION_API_KEY`.
    pub fn new(config: GoogleVisionConfig) -> Result<Self, OcrError> {
        let api_key = config
            .api_key
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                OcrError::unavailable(ENGINE, format!("no API key configured (set {API_KEY_ENV})"))
            })?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| OcrError::unavailable(ENGINE, err.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.endpoint,
            api_key,
            timeout: config.timeout,
        })
    }

    fn map_transport_error(&self, err: reqwest::Error) -> OcrError {
        if err.is_timeout() {
            OcrError::Timeout {
                engine: ENGINE,
                timeout: self.timeout,
            }
        } else {
            OcrError::backend(format!("google vision request failed: {err}"))
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    #[serde(default)]
    text_annotations: Vec<EntityAnnotation>,
    error: Option<Status>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityAnnotation {
    #[serde(default)]
    description: String,
    bounding_poly: Option<BoundingPoly>,
}

#[derive(Debug, Deserialize)]
struct BoundingPoly {
    #[serde(default)]
    vertices: Vec<Vertex>,
}

#[derive(Debug, Default, Deserialize)]
struct Vertex {
    #[serde(default)]
    x: i64,
    #[serde(default)]
    y: i64,
}

#[derive(Debug, Deserialize)]
struct Status {
    #[serde(default)]
    message: String,
}

impl BoundingPoly {
    fn to_rect(&self) -> Option<Rect> {
        let xs = self.vertices.iter().map(|v| v.x.max(0) as u32);
        let ys = self.vertices.iter().map(|v| v.y.max(0) as u32);
        let (left, right) = (xs.clone().min()?, xs.max()?);
        let (top, bottom) = (ys.clone().min()?, ys.max()?);
        Some(Rect::new(left, top, (right - left).max(1), (bottom - top).max(1)))
    }
}

/// Converts the first (full-text) annotation into a single OCR entry.
fn parse_annotations(
    body: AnnotateResponse,
    fallback_rect: Rect,
) -> Result<OcrResponse, OcrError> {
    let Some(first) = body.responses.into_iter().next() else {
        return Ok(OcrResponse::empty());
    };
    if let Some(status) = first.error.filter(|status| !status.message.is_empty()) {
        return Err(OcrError::backend(status.message));
    }
    let Some(full) = first.text_annotations.into_iter().next() else {
        return Ok(OcrResponse::empty());
    };
    let text = full.description.trim().to_string();
    if text.is_empty() {
        return Ok(OcrResponse::empty());
    }
    let rect = full
        .bounding_poly
        .as_ref()
        .and_then(BoundingPoly::to_rect)
        .unwrap_or(fallback_rect);
    Ok(OcrResponse::new(vec![OcrText::new(rect, text)]))
}

impl OcrEngine for GoogleVisionOcrEngine {
    fn name(&self) -> &'static str {
        ENGINE
    }

    fn recognize(&self, request: &OcrRequest<'_>) -> Result<OcrResponse, OcrError> {
        let Some((target, offset_x, offset_y)) = request.target() else {
            return Ok(OcrResponse::empty());
        };
        let png = target.to_png_bytes().map_err(|err| OcrError::Encode {
            engine: ENGINE,
            message: err.to_string(),
        })?;
        let payload = json!({
            "requests": [{
                "image": { "content": BASE64.encode(&png) },
                "features": [{ "type": "TEXT_DETECTION" }],
            }]
        });
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .map_err(|err| self.map_transport_error(err))?;
        let status = response.status();
        if !status.is_success() {
            return Err(OcrError::backend(format!(
                "google vision returned HTTP {status}"
            )));
        }
        let body: AnnotateResponse = response
            .json()
            .map_err(|err| self.map_transport_error(err))?;

        let local = Rect::new(0, 0, target.width(), target.height());
        let mut parsed = parse_annotations(body, local)?;
        for entry in &mut parsed.texts {
            entry.rect = entry.rect.translated(offset_x, offset_y);
        }
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<OcrResponse, OcrError> {
        let body: AnnotateResponse = serde_json::from_str(json).unwrap();
        parse_annotations(body, Rect::new(0, 0, 50, 50))
    }

    #[test]
    fn full_text_annotation_wins() {
        let response = parse(
            r#"{"responses":[{"textAnnotations":[
                {"description":"Sign in\nSubmit\n","boundingPoly":{"vertices":[{"x":4,"y":6},{"x":40,"y":6},{"x":40,"y":30},{"x":4,"y":30}]}},
                {"description":"Sign"}
            ]}]}"#,
        )
        .unwrap();
        assert_eq!(response.texts.len(), 1);
        assert_eq!(response.text(), "Sign in\nSubmit");
        assert_eq!(response.texts[0].rect, Rect::new(4, 6, 36, 24));
    }

    #[test]
    fn service_errors_are_reported() {
        let err = parse(r#"{"responses":[{"error":{"code":7,"message":"denied"}}]}"#).unwrap_err();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn missing_annotations_are_empty() {
        assert!(parse(r#"{"responses":[{}]}"#).unwrap().is_blank());
    }

    #[test]
    fn missing_api_key_is_unavailable() {
        if std::env::var(API_KEY_ENV).is_ok() {
            return;
        }
        let err = GoogleVisionOcrEngine::new(GoogleVisionConfig::default()).unwrap_err();
        assert!(matches!(err, OcrError::Unavailable { .. }));
    }
}
