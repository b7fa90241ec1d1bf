use design_match_types::Rect;

/// OCR result for a single line or block.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrText {
    pub rect: Rect,
    pub text: String,
    pub confidence: Option<f32>,
}

impl OcrText {
    pub fn new(rect: Rect, text: String) -> Self {
        Self {
            rect,
            text,
            confidence: None,
        }
    }

    pub fn with_confidence(mut self, value: f32) -> Self {
        self.confidence = Some(value);
        self
    }
}

/// Collection of OCR results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OcrResponse {
    pub texts: Vec<OcrText>,
}

impl OcrResponse {
    pub fn new(texts: Vec<OcrText>) -> Self {
        Self { texts }
    }

    pub fn empty() -> Self {
        Self { texts: Vec::new() }
    }

    /// Recognized lines joined with newlines, ends trimmed.
    pub fn text(&self) -> String {
        let lines: Vec<&str> = self
            .texts
            .iter()
            .map(|entry| entry.text.trim())
            .filter(|line| !line.is_empty())
            .collect();
        lines.join("\n")
    }

    pub fn is_blank(&self) -> bool {
        self.texts.iter().all(|entry| entry.text.trim().is_empty())
    }
}
