use design_match_types::Rect;

/// Keeps each rectangle only if it shares no pixel with one already kept.
/// Order decides: the first rectangle of an overlapping group survives.
pub fn suppress_overlaps(candidates: Vec<Rect>) -> Vec<Rect> {
    let mut accepted: Vec<Rect> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if accepted.iter().all(|kept| !kept.intersects(&candidate)) {
            accepted.push(candidate);
        }
    }
    accepted
}

pub fn intersection_over_union(a: &Rect, b: &Rect) -> f32 {
    let left = a.x.max(b.x);
    let top = a.y.max(b.y);
    let right = a.right().min(b.right());
    let bottom = a.bottom().min(b.bottom());
    if right <= left || bottom <= top {
        return 0.0;
    }
    let overlap = (right - left) as f64 * (bottom - top) as f64;
    let union = a.area() as f64 + b.area() as f64 - overlap;
    if union <= 0.0 {
        0.0
    } else {
        (overlap / union) as f32
    }
}

/// Greedy non-maximum suppression over `(rect, class, score)` triples.
/// Boxes only suppress boxes of the same class.
pub fn non_max_suppression(
    mut candidates: Vec<(Rect, usize, f32)>,
    iou_threshold: f32,
) -> Vec<(Rect, usize, f32)> {
    candidates.sort_by(|a, b| {
        b.2.total_cmp(&a.2)
            .then(a.0.y.cmp(&b.0.y))
            .then(a.0.x.cmp(&b.0.x))
    });
    let mut kept: Vec<(Rect, usize, f32)> = Vec::new();
    for candidate in candidates {
        let suppressed = kept.iter().any(|existing| {
            existing.1 == candidate.1
                && intersection_over_union(&existing.0, &candidate.0) > iou_threshold
        });
        if !suppressed {
            kept.push(candidate);
        }
    }
    kept
}
