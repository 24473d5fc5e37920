//! Coordinate mapping between natural and display space.
//!
//! Detections arrive in the source image's natural pixel resolution, while
//! rendering and pointer handling happen at whatever size the image occupies
//! on screen. The types here are the only bridge between the two spaces,
//! kept free of UI dependencies so they can be tested directly.

use serde::{Deserialize, Serialize};

/// An axis-aligned box given by its edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub xmin: f32,
    pub ymin: f32,
    pub xmax: f32,
    pub ymax: f32,
}

impl BoundingBox {
    pub fn new(xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    pub fn width(&self) -> f32 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f32 {
        self.ymax - self.ymin
    }

    /// Check whether a point lies inside the box (edges inclusive).
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.xmin && x <= self.xmax && y >= self.ymin && y <= self.ymax
    }

    /// Constrain the box to `[0, width] × [0, height]`, swapping edges if
    /// they arrived inverted. Always yields a well-formed box; a box fully
    /// outside the bounds collapses to zero area on the nearest edge.
    pub fn clamp(&self, width: f32, height: f32) -> Self {
        let x0 = self.xmin.min(self.xmax).max(0.0).min(width);
        let x1 = self.xmin.max(self.xmax).max(0.0).min(width);
        let y0 = self.ymin.min(self.ymax).max(0.0).min(height);
        let y1 = self.ymin.max(self.ymax).max(0.0).min(height);
        Self::new(x0, y0, x1, y1)
    }
}

/// Scale factors tying a natural resolution to a display resolution.
///
/// Construction fails when either natural dimension is not strictly
/// positive, so downstream code never divides by zero: callers skip mapping
/// entirely until real dimensions are known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mapping {
    pub natural_w: f32,
    pub natural_h: f32,
    pub display_w: f32,
    pub display_h: f32,
}

impl Mapping {
    pub fn between(
        natural_w: f32,
        natural_h: f32,
        display_w: f32,
        display_h: f32,
    ) -> Option<Self> {
        if natural_w <= 0.0 || natural_h <= 0.0 || display_w <= 0.0 || display_h <= 0.0 {
            return None;
        }
        Some(Self {
            natural_w,
            natural_h,
            display_w,
            display_h,
        })
    }

    fn sx(&self) -> f32 {
        self.display_w / self.natural_w
    }

    fn sy(&self) -> f32 {
        self.display_h / self.natural_h
    }

    /// Map a natural-space box into display space. The box is clamped to
    /// the natural bounds first, so the result always lies within
    /// `[0, display_w] × [0, display_h]`.
    pub fn to_display(&self, b: BoundingBox) -> BoundingBox {
        let b = b.clamp(self.natural_w, self.natural_h);
        BoundingBox::new(
            b.xmin * self.sx(),
            b.ymin * self.sy(),
            b.xmax * self.sx(),
            b.ymax * self.sy(),
        )
    }

    /// Map a display-space box back into natural space. Same linear
    /// transform as [`Mapping::to_display`] with reciprocal factors.
    pub fn to_natural(&self, b: BoundingBox) -> BoundingBox {
        BoundingBox::new(
            b.xmin / self.sx(),
            b.ymin / self.sy(),
            b.xmax / self.sx(),
            b.ymax / self.sy(),
        )
    }
}

/// Fit a natural size into a maximum box, preserving aspect ratio.
///
/// Returns the display size the image should occupy. Degenerate inputs
/// (zero or negative on any side) yield a zero size, which callers treat
/// as "nothing to show yet".
pub fn fit_within(natural_w: f32, natural_h: f32, max_w: f32, max_h: f32) -> (f32, f32) {
    if natural_w <= 0.0 || natural_h <= 0.0 || max_w <= 0.0 || max_h <= 0.0 {
        return (0.0, 0.0);
    }
    let s = (max_w / natural_w).min(max_h / natural_h);
    (natural_w * s, natural_h * s)
}
