//! Zoom and pan over a single displayed media item.
//!
//! [`Viewport`] turns raw touch, mouse, wheel and key input (in
//! viewport-local coordinates, top-left origin) into a [`ViewTransform`]
//! about the viewport centre. It knows nothing about rendering; the host
//! reads the transform back every frame.

pub mod gesture;
pub mod transform;

use std::time::Duration;

use tracing::debug;

use crate::constants::{DOUBLE_TAP_SCALE, MAX_SCALE, MIN_SCALE, WHEEL_ZOOM_IN, WHEEL_ZOOM_OUT, ZOOM_STEP};
pub use gesture::{GestureSession, TapDetector};
pub use transform::{Vec2, ViewTransform};

#[derive(Debug, Clone, Default)]
pub struct Viewport {
    transform: ViewTransform,
    session: GestureSession,
    taps: TapDetector,
    content_size: Vec2,  // Displayed media size at scale 1
    viewport_size: Vec2,
}

impl Viewport {
    pub fn new(content_size: Vec2, viewport_size: Vec2) -> Self {
        Self { content_size, viewport_size, ..Self::default() }
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn session(&self) -> GestureSession {
        self.session
    }

    pub fn is_zoomed(&self) -> bool {
        self.transform.is_zoomed()
    }

    pub fn set_geometry(&mut self, content_size: Vec2, viewport_size: Vec2) {
        self.content_size = content_size;
        self.viewport_size = viewport_size;
    }

    /// Back to identity, dropping any gesture in flight.
    pub fn reset(&mut self) {
        self.transform = ViewTransform::IDENTITY;
        self.session = GestureSession::Idle;
        self.taps.clear();
    }

    pub fn touch_start(&mut self, touches: &[Vec2], at: Duration) {
        match touches {
            [a, b, ..] => {
                self.session = GestureSession::pinch(*a, *b);
            }
            [p] => {
                if self.taps.press(at, *p) {
                    self.toggle_zoom();
                    return;
                }
                if self.transform.is_zoomed() {
                    self.begin_drag(*p);
                }
            }
            [] => {}
        }
    }

    pub fn touch_move(&mut self, touches: &[Vec2]) {
        match touches {
            [a, b, ..] => self.pinch_to(*a, *b),
            [p] => self.drag_to(*p),
            [] => {}
        }
    }

    /// Any finger lifted ends the gesture, whatever it was.
    pub fn touch_end(&mut self) {
        self.session = GestureSession::Idle;
    }

    /// Mouse button pressed. Returns true when it completed a double click.
    pub fn pointer_down(&mut self, pos: Vec2, at: Duration) -> bool {
        if self.taps.press(at, pos) {
            self.toggle_zoom();
            return true;
        }
        if self.transform.is_zoomed() {
            self.begin_drag(pos);
        }
        false
    }

    pub fn pointer_move(&mut self, pos: Vec2) {
        self.drag_to(pos);
    }

    pub fn pointer_up(&mut self) {
        self.session = GestureSession::Idle;
    }

    /// Viewport-local point relative to the viewport centre.
    fn from_centre(&self, pos: Vec2) -> Vec2 {
        pos - self.viewport_size * 0.5
    }

    fn begin_drag(&mut self, pos: Vec2) {
        self.session = GestureSession::Drag { anchor: pos - self.transform.translation() };
    }

    fn drag_to(&mut self, pos: Vec2) {
        let GestureSession::Drag { anchor } = self.session else {
            return;
        };
        if !self.transform.is_zoomed() {
            return;
        }
        self.transform = self
            .transform
            .panned_to(pos - anchor, self.content_size, self.viewport_size);
    }

    fn pinch_to(&mut self, a: Vec2, b: Vec2) {
        let distance = a.distance(b);
        let center = a.midpoint(b);
        if let GestureSession::Pinch { last_distance, .. } = self.session {
            // Coincident fingers give no usable ratio: no scale change
            let ratio = if last_distance > 0.0 { distance / last_distance } else { 1.0 };
            self.transform = self.transform.zoom_about(ratio, self.from_centre(center));
        }
        self.session = GestureSession::Pinch { last_distance: distance, last_center: center };
    }

    /// Double tap / double click: 1x goes to 2x, anything else resets.
    pub fn toggle_zoom(&mut self) {
        if self.transform.is_zoomed() {
            debug!("Double tap: reset zoom");
            self.reset();
        } else {
            debug!("Double tap: zoom in");
            self.transform = self.transform.with_scale(DOUBLE_TAP_SCALE);
            self.session = GestureSession::Idle;
        }
    }

    /// Wheel zoom anchored at `cursor`, only while the zoom modifier is held.
    /// Positive `delta_y` (wheel down) zooms out.
    pub fn wheel(&mut self, delta_y: f32, cursor: Vec2, modifier_held: bool) -> bool {
        if !modifier_held || delta_y == 0.0 || !delta_y.is_finite() {
            return false;
        }
        let factor = if delta_y > 0.0 { WHEEL_ZOOM_OUT } else { WHEEL_ZOOM_IN };
        self.transform = self.transform.zoom_about(factor, self.from_centre(cursor));
        true
    }

    pub fn zoom_in(&mut self) {
        let scale = (self.transform.scale() + ZOOM_STEP).min(MAX_SCALE);
        self.transform = self.transform.with_scale(scale);
    }

    /// One step out; landing on the minimum scale is a full reset.
    pub fn zoom_out(&mut self) {
        let scale = (self.transform.scale() - ZOOM_STEP).max(MIN_SCALE);
        if scale <= MIN_SCALE {
            self.reset();
        } else {
            self.transform = self.transform.with_scale(scale);
        }
    }

    /// Escape key. Returns true when it consumed the key (view was zoomed).
    pub fn escape(&mut self) -> bool {
        if self.transform.is_zoomed() {
            self.reset();
            true
        } else {
            false
        }
    }
}
