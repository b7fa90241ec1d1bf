use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use design_match_types::Rect;

use crate::{OcrEngine, OcrError, OcrRequest, OcrResponse, OcrText};

const ENGINE: &str = "tesseract";

#[derive(Debug, Clone)]
pub struct TesseractConfig {
    pub binary: PathBuf,
    pub languages: String,
    pub page_segmentation_mode: u32,
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            languages: "eng".to_string(),
            page_segmentation_mode: 3,
        }
    }
}

/// Local OCR through the `tesseract` command-line tool, TSV output.
#[derive(Debug, Clone)]
pub struct TesseractOcrEngine {
    config: TesseractConfig,
}

impl TesseractOcrEngine {
    pub fn new(config: TesseractConfig) -> Self {
        Self { config }
    }

    fn run(&self, png: &[u8]) -> Result<String, OcrError> {
        let mut file = tempfile::Builder::new()
            .prefix("design-match-ocr-")
            .suffix(".png")
            .tempfile()
            .map_err(|err| OcrError::Encode {
                engine: ENGINE,
                message: err.to_string(),
            })?;
        file.write_all(png)
            .and_then(|_| file.flush())
            .map_err(|err| OcrError::Encode {
                engine: ENGINE,
                message: err.to_string(),
            })?;

        let output = Command::new(&self.config.binary)
            .arg(file.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.config.languages)
            .arg("--psm")
            .arg(self.config.page_segmentation_mode.to_string())
            .arg("tsv")
            .output()
            .map_err(|err| {
                OcrError::unavailable(
                    ENGINE,
                    format!("failed to run {}: {err}", self.config.binary.display()),
                )
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::backend(format!(
                "tesseract failed: {}",
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl OcrEngine for TesseractOcrEngine {
    fn name(&self) -> &'static str {
        ENGINE
    }

    fn warm_up(&self) -> Result<(), OcrError> {
        let status = Command::new(&self.config.binary)
            .arg("--version")
            .output()
            .map_err(|err| {
                OcrError::unavailable(
                    ENGINE,
                    format!("failed to run {}: {err}", self.config.binary.display()),
                )
            })?;
        if status.status.success() {
            Ok(())
        } else {
            Err(OcrError::unavailable(ENGINE, "`tesseract --version` failed"))
        }
    }

    fn recognize(&self, request: &OcrRequest<'_>) -> Result<OcrResponse, OcrError> {
        let Some((target, offset_x, offset_y)) = request.target() else {
            return Ok(OcrResponse::empty());
        };
        let png = target.to_png_bytes().map_err(|err| OcrError::Encode {
            engine: ENGINE,
            message: err.to_string(),
        })?;
        let tsv = self.run(&png)?;
        let texts = parse_tsv_lines(&tsv)
            .into_iter()
            .map(|mut line| {
                line.rect = line.rect.translated(offset_x, offset_y);
                line
            })
            .collect();
        Ok(OcrResponse::new(texts))
    }
}

struct LineAccumulator {
    key: (u32, u32, u32, u32),
    words: Vec<String>,
    left: u32,
    top: u32,
    right: u32,
    bottom: u32,
    confidence_sum: f32,
    confidence_count: u32,
}

impl LineAccumulator {
    fn finish(self) -> OcrText {
        let rect = Rect::new(
            self.left,
            self.top,
            self.right.saturating_sub(self.left).max(1),
            self.bottom.saturating_sub(self.top).max(1),
        );
        let text = OcrText::new(rect, self.words.join(" "));
        if self.confidence_count == 0 {
            text
        } else {
            text.with_confidence(self.confidence_sum / self.confidence_count as f32 / 100.0)
        }
    }
}

/// Groups word rows (level 5) of tesseract's TSV output into lines.
pub(crate) fn parse_tsv_lines(tsv: &str) -> Vec<OcrText> {
    let mut lines = Vec::new();
    let mut current: Option<LineAccumulator> = None;

    for row in tsv.lines().skip(1) {
        let cols: Vec<&str> = row.split('\t').collect();
        if cols.len() < 12 || cols[0] != "5" {
            continue;
        }
        let text = cols[11..].join("\t");
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        let parse = |idx: usize| cols[idx].trim().parse::<u32>().unwrap_or(0);
        let key = (parse(1), parse(2), parse(3), parse(4));
        let (left, top, width, height) = (parse(6), parse(7), parse(8), parse(9));
        let confidence = cols[10].trim().parse::<f32>().ok().filter(|c| *c >= 0.0);

        let same_line = current.as_ref().is_some_and(|line| line.key == key);
        if !same_line {
            if let Some(done) = current.take() {
                lines.push(done.finish());
            }
            current = Some(LineAccumulator {
                key,
                words: Vec::new(),
                left,
                top,
                right: left + width,
                bottom: top + height,
                confidence_sum: 0.0,
                confidence_count: 0,
            });
        }
        if let Some(line) = current.as_mut() {
            line.words.push(text.to_string());
            line.left = line.left.min(left);
            line.top = line.top.min(top);
            line.right = line.right.max(left + width);
            line.bottom = line.bottom.max(top + height);
            if let Some(conf) = confidence {
                line.confidence_sum += conf;
                line.confidence_count += 1;
            }
        }
    }
    if let Some(done) = current {
        lines.push(done.finish());
    }
    lines
}
