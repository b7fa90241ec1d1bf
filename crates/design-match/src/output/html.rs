use std::fmt::Write;

use super::annotate::{DIFF_COLOR, ELEMENT_COLOR, MISSING_COLOR, PRESENT_COLOR};
use super::document::ReportDocument;
use image::Rgb;

/// Renders a self-contained HTML page for the report.
pub fn render_html(document: &ReportDocument) -> String {
    let mut html = String::with_capacity(document.annotated_image_png.len() + 4096);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Design match report</title>\n<style>\n");
    html.push_str(
        "body{font-family:sans-serif;margin:2rem;color:#1f2937}\
         table{border-collapse:collapse;width:100%;margin-top:1rem}\
         th,td{border:1px solid #d1d5db;padding:.4rem .6rem;text-align:left}\
         th{background:#f3f4f6}.legend span{display:inline-block;margin-right:1rem}\
         .swatch{display:inline-block;width:.8rem;height:.8rem;margin-right:.3rem}\
         img{max-width:100%;border:1px solid #d1d5db;margin-top:1rem}\n",
    );
    html.push_str("</style>\n</head>\n<body>\n<h1>Design match report</h1>\n");

    let _ = writeln!(
        html,
        "<p><strong>Overall score:</strong> {:.2}</p>",
        document.overall_score
    );
    let scores = &document.component_scores;
    let _ = writeln!(
        html,
        "<ul>\n<li>Layout similarity ({}): {:.4}</li>\n<li>Text similarity: {:.0}% ({})</li>\n<li>Color correlation: {:.4}</li>\n</ul>",
        escape(document.metric),
        scores.layout,
        scores.text,
        if document.text_matched {
            "matched"
        } else {
            "not matched"
        },
        scores.color
    );
    if document.extraction_degraded {
        html.push_str(
            "<p><em>Text extraction was degraded: every OCR engine failed at least once.</em></p>\n",
        );
    }

    html.push_str("<h2>Issues</h2>\n<table>\n<tr><th>#</th><th>Severity</th><th>Type</th><th>Description</th></tr>\n");
    for issue in &document.issues {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            issue.id,
            issue.severity.as_str(),
            issue.category.as_str(),
            escape(&issue.description)
        );
    }
    html.push_str("</table>\n");

    html.push_str("<h2>Annotated design</h2>\n<p class=\"legend\">");
    for (color, label) in [
        (MISSING_COLOR, "missing or misplaced text"),
        (PRESENT_COLOR, "implementation text"),
        (DIFF_COLOR, "visual difference"),
        (ELEMENT_COLOR, "design element"),
    ] {
        let _ = write!(
            html,
            "<span><i class=\"swatch\" style=\"background:{}\"></i>{label}</span>",
            css_color(color)
        );
    }
    html.push_str("</p>\n");
    let _ = writeln!(
        html,
        "<img alt=\"annotated design\" src=\"{}\">",
        document.image_data_uri()
    );
    html.push_str("</body>\n</html>\n");
    html
}

fn css_color(color: Rgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", color[0], color[1], color[2])
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("<b>\"x\" & 'y'</b>"), "&lt;b&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/b&gt;");
    }

    #[test]
    fn css_colours_are_hex() {
        assert_eq!(css_color(Rgb([255, 0, 16])), "#ff0010");
    }
}
