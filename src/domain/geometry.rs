//! Screen geometry primitives in CSS pixels.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in viewport coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Returns `true` when the rectangle has no measurable area.
    ///
    /// A detached element reports an all-zero rect; anything without positive
    /// width and height cannot anchor an overlay.
    #[must_use]
    pub fn is_unmeasurable(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
            || !self.left.is_finite()
            || !self.top.is_finite()
    }
}

/// Visible viewport size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges() {
        let r = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert!((r.right() - 110.0).abs() < f64::EPSILON);
        assert!((r.bottom() - 70.0).abs() < f64::EPSILON);
        assert!(!r.is_unmeasurable());
    }

    #[test]
    fn zero_rect_is_unmeasurable() {
        assert!(Rect::default().is_unmeasurable());
        assert!(Rect::new(5.0, 5.0, 0.0, 40.0).is_unmeasurable());
        assert!(Rect::new(f64::NAN, 5.0, 10.0, 40.0).is_unmeasurable());
    }
}
