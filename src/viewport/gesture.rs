use std::time::Duration;

use crate::constants::{DOUBLE_TAP_SLOP, DOUBLE_TAP_WINDOW};
use crate::viewport::transform::Vec2;

/// Transient state between a gesture's start and end events.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureSession {
    #[default]
    Idle,
    Pinch {
        last_distance: f32,
        last_center: Vec2,
    },
    /// Pointer position minus translation at pointer-down.
    Drag { anchor: Vec2 },
}

impl GestureSession {
    pub fn pinch(a: Vec2, b: Vec2) -> Self {
        GestureSession::Pinch {
            last_distance: a.distance(b),
            last_center: a.midpoint(b),
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, GestureSession::Idle)
    }
}

/// Pairs up presses into double taps from raw timestamps and positions.
#[derive(Debug, Clone, Copy, Default)]
pub struct TapDetector {
    last_press: Option<(Duration, Vec2)>,
}

impl TapDetector {
    /// Record a press at `at` (monotonic time) and `pos`. Returns true when
    /// it completes a double tap; the pair is consumed so a third press
    /// starts over.
    pub fn press(&mut self, at: Duration, pos: Vec2) -> bool {
        if let Some((prev_at, prev_pos)) = self.last_press {
            let close_in_time = at >= prev_at && at - prev_at <= DOUBLE_TAP_WINDOW;
            if close_in_time && prev_pos.distance(pos) <= DOUBLE_TAP_SLOP {
                self.last_press = None;
                return true;
            }
        }
        self.last_press = Some((at, pos));
        false
    }

    pub fn clear(&mut self) {
        self.last_press = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn two_quick_presses_make_a_double_tap() {
        let mut taps = TapDetector::default();
        assert!(!taps.press(ms(1000), Vec2::new(10.0, 10.0)));
        assert!(taps.press(ms(1200), Vec2::new(14.0, 12.0)));
        // Third press begins a new pair
        assert!(!taps.press(ms(1300), Vec2::new(14.0, 12.0)));
    }

    #[test]
    fn slow_or_distant_presses_do_not_pair() {
        let mut taps = TapDetector::default();
        taps.press(ms(0), Vec2::ZERO);
        assert!(!taps.press(ms(301), Vec2::ZERO));
        assert!(!taps.press(ms(400), Vec2::new(100.0, 0.0)));
    }

    #[test]
    fn pinch_session_records_geometry() {
        let s = GestureSession::pinch(Vec2::new(0.0, 0.0), Vec2::new(6.0, 8.0));
        assert_eq!(
            s,
            GestureSession::Pinch { last_distance: 10.0, last_center: Vec2::new(3.0, 4.0) }
        );
        assert!(s.is_active());
    }
}
