use raylib::prelude::*;

/// A window-driven screen: set up once, then asked to update and draw a
/// frame at a time.
pub trait Engine {
    fn initialize(&mut self, rl: &mut RaylibHandle, thread: &RaylibThread) -> anyhow::Result<()>;
    /// Returns false once the engine wants the window closed.
    fn render_frame(&mut self, dt: f32, rl: &mut RaylibHandle, thread: &RaylibThread) -> bool;
}
