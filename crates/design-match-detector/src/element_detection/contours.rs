use design_match_types::Rect;
use image::GrayImage;
use imageproc::contours::{BorderType, Contour, find_contours};
use imageproc::point::Point;

/// Outermost border of one connected foreground blob.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourBox {
    /// Inclusive bounding rectangle of the border pixels.
    pub rect: Rect,
    /// Polygon area enclosed by the border (shoelace), in square pixels.
    pub area: f64,
}

/// Finds outer borders that are not nested inside another blob, in the
/// order the border follower discovers them (top-to-bottom raster scan).
///
/// Every non-zero pixel of `mask` counts as foreground.
pub fn external_contours(mask: &GrayImage) -> Vec<ContourBox> {
    let contours: Vec<Contour<u32>> = find_contours(mask);
    contours
        .iter()
        .filter(|contour| contour.border_type == BorderType::Outer && contour.parent.is_none())
        .filter_map(|contour| {
            let rect = bounding_rect(&contour.points)?;
            Some(ContourBox {
                rect,
                area: polygon_area(&contour.points),
            })
        })
        .collect()
}

fn bounding_rect(points: &[Point<u32>]) -> Option<Rect> {
    let first = points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for point in &points[1..] {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }
    Some(Rect::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

fn polygon_area(points: &[Point<u32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0f64;
    for (i, current) in points.iter().enumerate() {
        let next = &points[(i + 1) % points.len()];
        twice_area += current.x as f64 * next.y as f64 - next.x as f64 * current.y as f64;
    }
    twice_area.abs() / 2.0
}
