use design_match_types::{Image, Rect};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect as DrawRect;

pub const MISSING_COLOR: Rgb<u8> = Rgb([220, 38, 38]);
pub const PRESENT_COLOR: Rgb<u8> = Rgb([22, 163, 74]);
pub const DIFF_COLOR: Rgb<u8> = Rgb([249, 115, 22]);
pub const ELEMENT_COLOR: Rgb<u8> = Rgb([37, 99, 235]);

const STROKE: u32 = 2;
const TAG_TEXT: Rgb<u8> = Rgb([255, 255, 255]);
const TAG_PAD: i32 = 2;
const DIGIT_WIDTH: i32 = 6;
const DIGIT_HEIGHT: i32 = 11;
const DIGIT_ADVANCE: i32 = DIGIT_WIDTH + 2;
const SEGMENT: i32 = 2;

// Seven-segment masks, bit 0 = top, then clockwise, bit 6 = middle.
const DIGIT_SEGMENTS: [u8; 10] = [0x3f, 0x06, 0x5b, 0x4f, 0x66, 0x6d, 0x7d, 0x07, 0x7f, 0x6f];

/// Rectangles to outline on the annotated canvas, grouped by legend colour.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotationLayers<'a> {
    /// Reference elements (blue).
    pub elements: &'a [Rect],
    /// Differing areas (orange).
    pub diff_regions: &'a [Rect],
    /// Implementation text areas (green).
    pub present_text: &'a [Rect],
    /// Reference text areas with no match (red).
    pub missing_text: &'a [Rect],
    /// Issue ids stamped beside their diff region.
    pub issue_tags: &'a [(Rect, usize)],
}

/// Draws the layers onto a copy of `canvas`, later layers on top.
pub fn annotate(canvas: &Image, layers: &AnnotationLayers<'_>) -> Image {
    let mut pixels = canvas.to_rgb();
    let (width, height) = (pixels.width(), pixels.height());
    let groups = [
        (layers.elements, ELEMENT_COLOR),
        (layers.diff_regions, DIFF_COLOR),
        (layers.present_text, PRESENT_COLOR),
        (layers.missing_text, MISSING_COLOR),
    ];
    for (rects, color) in groups {
        for rect in rects {
            let Some(rect) = rect.clamp_to(width, height) else {
                continue;
            };
            for inset in 0..STROKE {
                if rect.width <= inset * 2 || rect.height <= inset * 2 {
                    break;
                }
                let outline = DrawRect::at((rect.x + inset) as i32, (rect.y + inset) as i32)
                    .of_size(rect.width - inset * 2, rect.height - inset * 2);
                draw_hollow_rect_mut(&mut pixels, outline, color);
            }
        }
    }
    for &(rect, id) in layers.issue_tags {
        if rect.clamp_to(width, height).is_some() {
            stamp_id(&mut pixels, rect, id);
        }
    }
    Image::from_rgb(pixels).unwrap_or_else(|_| canvas.clone())
}

/// Draws `id` on a filled tag just above `rect`, or inside its top edge
/// when there is no room above.
fn stamp_id(pixels: &mut RgbImage, rect: Rect, id: usize) {
    let digits: Vec<usize> = id
        .to_string()
        .bytes()
        .map(|digit| usize::from(digit - b'0'))
        .collect();
    let tag_width = digits.len() as i32 * DIGIT_ADVANCE - (DIGIT_ADVANCE - DIGIT_WIDTH) + TAG_PAD * 2;
    let tag_height = DIGIT_HEIGHT + TAG_PAD * 2;
    let left = rect.x as i32;
    let top = if rect.y as i32 >= tag_height {
        rect.y as i32 - tag_height
    } else {
        rect.y as i32
    };
    draw_filled_rect_mut(
        pixels,
        DrawRect::at(left, top).of_size(tag_width as u32, tag_height as u32),
        DIFF_COLOR,
    );
    for (index, digit) in digits.into_iter().enumerate() {
        let origin = (left + TAG_PAD + index as i32 * DIGIT_ADVANCE, top + TAG_PAD);
        draw_digit(pixels, origin, digit);
    }
}

fn draw_digit(pixels: &mut RgbImage, (x, y): (i32, i32), digit: usize) {
    let half = (DIGIT_HEIGHT + 1) / 2;
    let middle = (DIGIT_HEIGHT - SEGMENT) / 2;
    let right = DIGIT_WIDTH - SEGMENT;
    let segments = [
        (0, 0, DIGIT_WIDTH, SEGMENT),
        (right, 0, SEGMENT, half),
        (right, half - 1, SEGMENT, half),
        (0, DIGIT_HEIGHT - SEGMENT, DIGIT_WIDTH, SEGMENT),
        (0, half - 1, SEGMENT, half),
        (0, 0, SEGMENT, half),
        (0, middle, DIGIT_WIDTH, SEGMENT),
    ];
    let mask = DIGIT_SEGMENTS[digit % 10];
    for (bit, (dx, dy, w, h)) in segments.into_iter().enumerate() {
        if mask & (1 << bit) != 0 {
            draw_filled_rect_mut(
                pixels,
                DrawRect::at(x + dx, y + dy).of_size(w as u32, h as u32),
                TAG_TEXT,
            );
        }
    }
}
