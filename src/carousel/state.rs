#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CarouselState {
    pub active_index: usize,
    pub is_paused: bool,  // Pointer is over the viewport
    pub is_playing: bool, // Active item is a video that is actually playing
}
