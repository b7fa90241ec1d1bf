use design_match_types::ElementLabel;

/// Assigns a label from box geometry and any text read inside the box.
/// Rules are checked in a fixed priority order; the first hit wins.
pub fn classify_region(width: u32, height: u32, text: &str) -> ElementLabel {
    if !text.trim().is_empty() {
        ElementLabel::Text
    } else if width > 150 && height < 60 {
        ElementLabel::Button
    } else if width > 50 && height > 50 {
        ElementLabel::Image
    } else if width > 50 && width < 150 && height > 10 && height < 50 {
        ElementLabel::InputField
    } else if width < 30 && height < 30 {
        ElementLabel::Decorative
    } else {
        ElementLabel::Unknown
    }
}
