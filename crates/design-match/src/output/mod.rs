mod annotate;
mod document;
mod error;
mod html;
mod json;

use std::path::{Path, PathBuf};

use design_match_types::ComparisonResult;
use log::info;
use tokio::fs;

pub use annotate::{
    AnnotationLayers, DIFF_COLOR, ELEMENT_COLOR, MISSING_COLOR, PRESENT_COLOR, annotate,
};
pub use document::ReportDocument;
pub use error::ReportError;
pub use html::render_html;
pub use json::encode_json;

use crate::settings::OutputSettings;

/// Writes the configured report artifacts for one comparison.
pub struct ReportWriter {
    html: Option<PathBuf>,
    json: Option<PathBuf>,
    pretty: bool,
}

impl ReportWriter {
    pub fn new(settings: &OutputSettings) -> Self {
        Self {
            html: settings.html.clone(),
            json: settings.json.clone(),
            pretty: settings.pretty,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.html.is_none() && self.json.is_none()
    }

    pub async fn write(&self, result: &ComparisonResult) -> Result<(), ReportError> {
        if self.is_empty() {
            return Ok(());
        }
        let document = ReportDocument::from_result(result)?;
        if let Some(path) = &self.html {
            write_file(path, render_html(&document).into_bytes()).await?;
            info!("wrote HTML report to {}", path.display());
        }
        if let Some(path) = &self.json {
            write_file(path, encode_json(&document, self.pretty)?).await?;
            info!("wrote JSON report to {}", path.display());
        }
        Ok(())
    }
}

async fn write_file(path: &Path, contents: Vec<u8>) -> Result<(), ReportError> {
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| ReportError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    fs::write(path, contents)
        .await
        .map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })
}
