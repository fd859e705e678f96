use std::ops::{Add, Mul, Sub};

use crate::constants::{MAX_SCALE, MIN_SCALE};

/// Point or offset in viewport-local pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Vec2) -> f32 {
        let d = other - self;
        (d.x * d.x + d.y * d.y).sqrt()
    }

    pub fn midpoint(self, other: Vec2) -> Vec2 {
        Vec2::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Scale and translation applied to the displayed media, about the centre
/// of the viewport: `screen = translation + scale * local`, both measured
/// from that centre. Fitted media is centred, so the pan bounds are
/// symmetric.
///
/// Every constructor and transition keeps `translation == 0` at
/// `scale == 1`, and `scale` within `[MIN_SCALE, MAX_SCALE]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    scale: f32,
    translation: Vec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform { scale: MIN_SCALE, translation: Vec2::ZERO };

    /// Normalising constructor: clamps the scale, and a transform at the
    /// minimum scale is always the identity.
    pub fn new(scale: f32, translation: Vec2) -> Self {
        let scale = if scale.is_finite() { scale.clamp(MIN_SCALE, MAX_SCALE) } else { MIN_SCALE };
        if scale <= MIN_SCALE {
            return Self::IDENTITY;
        }
        let translation = if translation.x.is_finite() && translation.y.is_finite() {
            translation
        } else {
            Vec2::ZERO
        };
        Self { scale, translation }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn translation(&self) -> Vec2 {
        self.translation
    }

    pub fn is_zoomed(&self) -> bool {
        self.scale > MIN_SCALE
    }

    /// Multiply the scale by `ratio` while keeping `anchor` where it is on
    /// screen: `t' = anchor - (anchor - t) * (s' / s)`.
    ///
    /// A zero, negative or non-finite ratio leaves the transform unchanged.
    pub fn zoom_about(self, ratio: f32, anchor: Vec2) -> Self {
        if !ratio.is_finite() || ratio <= 0.0 {
            return self;
        }
        let new_scale = (self.scale * ratio).clamp(MIN_SCALE, MAX_SCALE);
        let factor = new_scale / self.scale;
        let translation = anchor - (anchor - self.translation) * factor;
        Self::new(new_scale, translation)
    }

    /// Set the scale directly, keeping the translation.
    pub fn with_scale(self, scale: f32) -> Self {
        Self::new(scale, self.translation)
    }

    /// Move to `translation`, clamped so the content edge never passes the
    /// viewport edge.
    pub fn panned_to(self, translation: Vec2, content: Vec2, viewport: Vec2) -> Self {
        let clamped = Vec2::new(
            clamp_axis(translation.x, content.x, viewport.x, self.scale),
            clamp_axis(translation.y, content.y, viewport.y, self.scale),
        );
        Self::new(self.scale, clamped)
    }
}

/// `max = (content * scale - viewport) / 2`; an axis whose content does not
/// overflow the viewport is pinned to 0.
pub fn clamp_axis(offset: f32, content: f32, viewport: f32, scale: f32) -> f32 {
    let max = (content * scale - viewport) / 2.0;
    if max.is_nan() || max <= 0.0 || !offset.is_finite() {
        return 0.0;
    }
    offset.clamp(-max, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_not_zoomed() {
        let t = ViewTransform::IDENTITY;
        assert_eq!(t.scale(), 1.0);
        assert_eq!(t.translation(), Vec2::ZERO);
        assert!(!t.is_zoomed());
    }

    #[test]
    fn minimum_scale_drops_translation() {
        let t = ViewTransform::new(0.5, Vec2::new(30.0, -10.0));
        assert_eq!(t, ViewTransform::IDENTITY);
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let anchor = Vec2::new(50.0, 50.0);
        let t = ViewTransform::IDENTITY.zoom_about(2.0, anchor);
        assert_eq!(t.scale(), 2.0);
        assert_eq!(t.translation(), Vec2::new(-50.0, -50.0));

        let t = t.zoom_about(1.5, Vec2::new(10.0, 20.0));
        assert_eq!(t.scale(), 3.0);
        // 10 - (10 - -50) * 1.5 = -80, 20 - (20 - -50) * 1.5 = -85
        assert_eq!(t.translation(), Vec2::new(-80.0, -85.0));
    }

    #[test]
    fn zoom_clamps_scale() {
        let t = ViewTransform::IDENTITY.zoom_about(100.0, Vec2::ZERO);
        assert_eq!(t.scale(), 4.0);
        let t = t.zoom_about(0.0001, Vec2::new(7.0, 7.0));
        assert_eq!(t, ViewTransform::IDENTITY);
    }

    #[test]
    fn bad_ratio_is_a_no_op() {
        let t = ViewTransform::new(2.0, Vec2::new(5.0, 5.0));
        assert_eq!(t.zoom_about(f32::NAN, Vec2::ZERO), t);
        assert_eq!(t.zoom_about(f32::INFINITY, Vec2::ZERO), t);
        assert_eq!(t.zoom_about(0.0, Vec2::ZERO), t);
    }

    #[test]
    fn pan_is_clamped_per_axis() {
        let t = ViewTransform::new(2.0, Vec2::ZERO);
        // content 400x100 in a 400x300 viewport: x may move +-200, y pinned
        let panned = t.panned_to(Vec2::new(1000.0, 80.0), Vec2::new(400.0, 100.0), Vec2::new(400.0, 300.0));
        assert_eq!(panned.translation(), Vec2::new(200.0, 0.0));

        let panned = t.panned_to(Vec2::new(-1000.0, 0.0), Vec2::new(400.0, 100.0), Vec2::new(400.0, 300.0));
        assert_eq!(panned.translation().x, -200.0);
    }
}
