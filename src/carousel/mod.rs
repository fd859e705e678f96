pub mod controller;
pub mod state;
pub mod video;

pub use controller::{CarouselController, CarouselError};
pub use state::CarouselState;
pub use video::{VideoBank, VideoError, VideoHandle};
