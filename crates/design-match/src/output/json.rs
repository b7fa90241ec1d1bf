use super::document::ReportDocument;
use super::error::ReportError;

pub fn encode_json(document: &ReportDocument, pretty: bool) -> Result<Vec<u8>, ReportError> {
    let encoded = if pretty {
        serde_json::to_vec_pretty(document)?
    } else {
        serde_json::to_vec(document)?
    };
    Ok(encoded)
}
