use std::time::Duration;

pub const WINDOW_WIDTH: i32 = 1280;           // Default window width
pub const WINDOW_HEIGHT: i32 = 720;           // Default window height
pub const FPS: u32 = 60;                      // Frames per second

pub const AUTO_ADVANCE_INTERVAL: Duration = Duration::from_millis(5000);

pub const MIN_SCALE: f32 = 1.0;               // Viewport never zooms out past fit
pub const MAX_SCALE: f32 = 4.0;
pub const DOUBLE_TAP_SCALE: f32 = 2.0;        // Scale reached by double tap / double click
pub const ZOOM_STEP: f32 = 0.5;               // Zoom button increment
pub const WHEEL_ZOOM_IN: f32 = 1.1;
pub const WHEEL_ZOOM_OUT: f32 = 0.9;

pub const DOUBLE_TAP_WINDOW: Duration = Duration::from_millis(300);
pub const DOUBLE_TAP_SLOP: f32 = 24.0;        // Max distance between the two presses (px)

pub const TOPIC_PREVIEW_COUNT: usize = 3;     // Topics shown on a module card
