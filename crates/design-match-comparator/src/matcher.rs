use std::collections::BTreeSet;

use design_match_types::{Rect, Region};

pub const DEFAULT_POSITION_TOLERANCE: u32 = 20;

/// A reference rectangle and the implementation rectangle found near it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchedPair {
    pub reference: Rect,
    pub implementation: Rect,
    /// `|reference.width - implementation.width|`.
    pub width_delta: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AreaMatches {
    pub pairs: Vec<MatchedPair>,
    /// Reference rectangles with no implementation rectangle nearby.
    pub missing: Vec<Rect>,
    /// One flag per implementation rectangle, set when it matched.
    pub present: Vec<bool>,
}

/// Label-set difference between two detections, sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelDiff {
    pub missing: Vec<String>,
    pub extra: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct RegionMatcher {
    tolerance: u32,
}

impl Default for RegionMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_POSITION_TOLERANCE)
    }
}

impl RegionMatcher {
    pub fn new(tolerance: u32) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> u32 {
        self.tolerance
    }

    /// Top-left corners closer than the tolerance on both axes.
    pub fn is_near(&self, a: &Rect, b: &Rect) -> bool {
        a.x.abs_diff(b.x) < self.tolerance && a.y.abs_diff(b.y) < self.tolerance
    }

    /// Greedy pass: each reference rectangle takes the first implementation
    /// rectangle near it. Implementation rectangles may be claimed more than
    /// once.
    pub fn match_areas(&self, reference: &[Rect], implementation: &[Rect]) -> AreaMatches {
        let mut matches = AreaMatches {
            present: vec![false; implementation.len()],
            ..AreaMatches::default()
        };
        for reference_rect in reference {
            let found = implementation
                .iter()
                .position(|candidate| self.is_near(reference_rect, candidate));
            match found {
                Some(index) => {
                    let candidate = implementation[index];
                    matches.present[index] = true;
                    matches.pairs.push(MatchedPair {
                        reference: *reference_rect,
                        implementation: candidate,
                        width_delta: reference_rect.width.abs_diff(candidate.width),
                    });
                }
                None => matches.missing.push(*reference_rect),
            }
        }
        matches
    }
}

pub fn label_difference(reference: &[Region], implementation: &[Region]) -> LabelDiff {
    let reference: BTreeSet<&str> = reference.iter().map(|region| region.label.as_str()).collect();
    let implementation: BTreeSet<&str> = implementation
        .iter()
        .map(|region| region.label.as_str())
        .collect();
    LabelDiff {
        missing: reference
            .difference(&implementation)
            .map(|label| label.to_string())
            .collect(),
        extra: implementation
            .difference(&reference)
            .map(|label| label.to_string())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use design_match_types::ElementLabel;

    #[test]
    fn tolerance_is_strict_on_both_axes() {
        let matcher = RegionMatcher::default();
        let reference = Rect::new(100, 100, 50, 20);
        assert!(matcher.is_near(&reference, &Rect::new(110, 108, 50, 20)));
        assert!(!matcher.is_near(&reference, &Rect::new(125, 100, 50, 20)));
        assert!(!matcher.is_near(&reference, &Rect::new(120, 100, 50, 20)));
    }

    #[test]
    fn unmatched_reference_areas_are_missing() {
        let matcher = RegionMatcher::default();
        let outcome = matcher.match_areas(
            &[Rect::new(100, 100, 50, 20), Rect::new(10, 300, 80, 20)],
            &[Rect::new(500, 500, 10, 10), Rect::new(105, 95, 80, 20)],
        );
        assert_eq!(outcome.pairs.len(), 1);
        assert_eq!(outcome.pairs[0].width_delta, 30);
        assert_eq!(outcome.missing, vec![Rect::new(10, 300, 80, 20)]);
        assert_eq!(outcome.present, vec![false, true]);
    }

    #[test]
    fn label_sets_are_diffed_in_order() {
        let region = |label| Region::new(Rect::new(0, 0, 10, 10), label, 1.0);
        let diff = label_difference(
            &[
                region(ElementLabel::Text),
                region(ElementLabel::Button),
                region(ElementLabel::Image),
                region(ElementLabel::Button),
            ],
            &[
                region(ElementLabel::Image),
                region(ElementLabel::Text),
                region(ElementLabel::Decorative),
            ],
        );
        assert_eq!(diff.missing, vec!["button"]);
        assert_eq!(diff.extra, vec!["decorative"]);
    }
}
