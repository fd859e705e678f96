//! Bilingual LED display training: module content, slide decks, media
//! carousels and a zoomable media viewport.

pub mod carousel;
pub mod config;
pub mod constants;
pub mod content;
pub mod ffmpeg;
pub mod i18n;
pub mod logging;
pub mod media;
pub mod presentation;
pub mod stage;
pub mod texture_loader;
pub mod viewport;

#[cfg(any(feature = "desktop", test))]
pub mod slide;
#[cfg(any(feature = "desktop", test))]
pub mod state;

#[cfg(feature = "desktop")]
pub mod engine;
#[cfg(feature = "desktop")]
pub mod presenter;
