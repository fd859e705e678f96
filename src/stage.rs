use std::time::Duration;

use tracing::debug;

use crate::carousel::{CarouselController, CarouselError, VideoHandle};
use crate::media::{MediaItem, MediaSequence};
use crate::viewport::{Vec2, Viewport};

/// A carousel whose active slide is wrapped in a zoomable viewport.
///
/// Whenever the active slide changes the viewport is reset, including any
/// gesture that was in flight.
pub struct MediaStage<V> {
    carousel: CarouselController<V>,
    viewport: Viewport,
    hovered: bool,
}

impl<V: VideoHandle> MediaStage<V> {
    pub fn new(sequence: MediaSequence) -> Self {
        Self {
            carousel: CarouselController::new(sequence),
            viewport: Viewport::default(),
            hovered: false,
        }
    }

    pub fn start(&mut self, interval: Duration, auto_play: bool) -> Result<(), CarouselError> {
        self.carousel.start(interval, auto_play)
    }

    pub fn carousel(&self) -> &CarouselController<V> {
        &self.carousel
    }

    pub fn carousel_mut(&mut self) -> &mut CarouselController<V> {
        &mut self.carousel
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn active_item(&self) -> &MediaItem {
        self.carousel.active_item()
    }

    fn after_navigation(&mut self, changed: bool) -> bool {
        if changed {
            debug!(index = self.carousel.active_index(), "Resetting viewport for new slide");
            self.viewport.reset();
        }
        changed
    }

    pub fn tick(&mut self, dt: Duration) -> bool {
        let changed = self.carousel.tick(dt);
        self.carousel.refresh_playback();
        self.after_navigation(changed)
    }

    pub fn next(&mut self) -> bool {
        let changed = self.carousel.next();
        self.after_navigation(changed)
    }

    pub fn previous(&mut self) -> bool {
        let changed = self.carousel.previous();
        self.after_navigation(changed)
    }

    pub fn go_to(&mut self, index: usize) -> bool {
        let changed = self.carousel.go_to(index);
        self.after_navigation(changed)
    }

    /// Pointer hover over the stage pauses rotation.
    pub fn set_hovered(&mut self, hovered: bool) {
        if hovered == self.hovered {
            return;
        }
        self.hovered = hovered;
        if hovered {
            self.carousel.pause();
        } else {
            self.carousel.resume();
        }
    }

    pub fn set_geometry(&mut self, content_size: Vec2, viewport_size: Vec2) {
        self.viewport.set_geometry(content_size, viewport_size);
    }
}
