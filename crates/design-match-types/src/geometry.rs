use serde::Serialize;

/// Axis-aligned pixel rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True when the two rectangles share at least one pixel.
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn translated(&self, dx: u32, dy: u32) -> Rect {
        Rect {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            ..*self
        }
    }

    /// Clips the rectangle to a `width` x `height` canvas, returning `None`
    /// when nothing with a positive area remains.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Rect> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let right = self.right().min(width);
        let bottom = self.bottom().min(height);
        let clipped = Rect {
            x: self.x,
            y: self.y,
            width: right - self.x,
            height: bottom - self.y,
        };
        (!clipped.is_empty()).then_some(clipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_requires_shared_pixels() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(a.intersects(&Rect::new(9, 9, 5, 5)));
        assert!(!a.intersects(&Rect::new(10, 0, 5, 5)));
        assert!(!a.intersects(&Rect::new(0, 10, 5, 5)));
    }

    #[test]
    fn clamp_drops_rectangles_outside_canvas() {
        assert_eq!(Rect::new(5, 5, 10, 10).clamp_to(8, 20), Some(Rect::new(5, 5, 3, 10)));
        assert_eq!(Rect::new(8, 0, 4, 4).clamp_to(8, 8), None);
        assert_eq!(Rect::new(0, 0, 0, 4).clamp_to(8, 8), None);
    }
}
