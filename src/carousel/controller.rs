use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::carousel::state::CarouselState;
use crate::carousel::video::{VideoBank, VideoHandle};
use crate::media::{MediaItem, MediaSequence};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CarouselError {
    #[error("Auto-advance interval must be greater than zero")]
    ZeroInterval,
}

/// Repeating auto-advance timer, driven by frame time.
#[derive(Debug, Clone, Copy)]
struct AutoAdvance {
    interval: Duration,
    elapsed: Duration,
}

/// Owns the rotation state of one media sequence.
///
/// Time only moves through [`CarouselController::tick`], so the controller
/// never fires once it is dropped or stopped.
pub struct CarouselController<V> {
    sequence: MediaSequence,
    state: CarouselState,
    auto_play: bool,
    interval: Duration,
    timer: Option<AutoAdvance>,
    videos: VideoBank<V>,
}

impl<V: VideoHandle> CarouselController<V> {
    pub fn new(sequence: MediaSequence) -> Self {
        Self {
            sequence,
            state: CarouselState::default(),
            auto_play: false,
            interval: Duration::ZERO,
            timer: None,
            videos: VideoBank::new(),
        }
    }

    /// Arm auto-advance. With `auto_play == false` nothing is armed.
    pub fn start(&mut self, interval: Duration, auto_play: bool) -> Result<(), CarouselError> {
        if interval.is_zero() {
            return Err(CarouselError::ZeroInterval);
        }
        self.interval = interval;
        self.auto_play = auto_play;
        self.rearm();
        Ok(())
    }

    /// Cancel auto-advance for good.
    pub fn stop(&mut self) {
        self.auto_play = false;
        self.timer = None;
    }

    pub fn set_auto_play(&mut self, auto_play: bool) {
        if self.auto_play != auto_play && !self.interval.is_zero() {
            self.auto_play = auto_play;
            self.rearm();
        }
    }

    // Any change to auto_play, is_paused or len cancels the running timer
    // and starts a fresh one when rotation is still allowed.
    fn rearm(&mut self) {
        let allowed = self.auto_play && !self.state.is_paused && self.sequence.len() > 1;
        self.timer = allowed.then_some(AutoAdvance {
            interval: self.interval,
            elapsed: Duration::ZERO,
        });
    }

    pub fn is_timer_armed(&self) -> bool {
        self.timer.is_some()
    }

    /// Advance frame time. Returns true when the active item changed.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let Some(timer) = self.timer.as_mut() else {
            return false;
        };
        timer.elapsed += dt;
        if timer.elapsed < timer.interval {
            return false;
        }
        timer.elapsed = Duration::ZERO;
        let next = (self.state.active_index + 1) % self.sequence.len();
        self.activate(next)
    }

    pub fn pause(&mut self) {
        if !self.state.is_paused {
            self.state.is_paused = true;
            self.rearm();
        }
    }

    pub fn resume(&mut self) {
        if self.state.is_paused {
            self.state.is_paused = false;
            self.rearm();
        }
    }

    /// Jump to `index`. Out-of-range indices are ignored.
    pub fn go_to(&mut self, index: usize) -> bool {
        if index >= self.sequence.len() {
            debug!(index, len = self.sequence.len(), "Ignoring out-of-range carousel jump");
            return false;
        }
        self.activate(index)
    }

    pub fn next(&mut self) -> bool {
        let next = (self.state.active_index + 1) % self.sequence.len();
        self.activate(next)
    }

    pub fn previous(&mut self) -> bool {
        let len = self.sequence.len();
        let prev = if self.state.active_index == 0 { len - 1 } else { self.state.active_index - 1 };
        self.activate(prev)
    }

    fn activate(&mut self, index: usize) -> bool {
        if index == self.state.active_index {
            return false;
        }
        self.state.active_index = index;
        self.on_active_change();
        true
    }

    fn on_active_change(&mut self) {
        let active = self.active_item().clone();
        debug!(index = self.state.active_index, path = active.path(), "Carousel slide changed");
        let video_path = active.is_video().then_some(active.path());
        self.state.is_playing = self.videos.arbitrate(video_path);
    }

    /// Register the video element for `path`, created when the item is
    /// first displayed. It is brought in line with the current slide.
    pub fn attach_video(&mut self, path: impl Into<String>, handle: V) {
        self.videos.insert(path, handle);
        self.on_active_change();
    }

    /// Pause and rewind every video, e.g. when the carousel goes off screen.
    pub fn silence(&mut self) {
        self.videos.arbitrate(None);
        self.state.is_playing = false;
    }

    /// Undo [`silence`](Self::silence): the active video plays again.
    pub fn wake(&mut self) {
        self.on_active_change();
    }

    pub fn release_video(&mut self, path: &str) -> Option<V> {
        self.videos.remove(path)
    }

    pub fn has_video(&self, path: &str) -> bool {
        self.videos.contains(path)
    }

    pub fn video(&self, path: &str) -> Option<&V> {
        self.videos.get(path)
    }

    pub fn video_mut(&mut self, path: &str) -> Option<&mut V> {
        self.videos.get_mut(path)
    }

    /// Play/pause button of the active video.
    pub fn toggle_play_pause(&mut self) {
        let active = self.active_item().clone();
        if !active.is_video() {
            return;
        }
        let Some(handle) = self.videos.get_mut(active.path()) else {
            return;
        };
        if handle.is_playing() {
            handle.pause();
        } else if let Err(e) = handle.play() {
            debug!(path = active.path(), error = %e, "Play request refused");
        }
        self.state.is_playing = handle.is_playing();
    }

    /// Pick up play state changes made by the video itself.
    pub fn refresh_playback(&mut self) {
        let active = self.active_item();
        let playing = active.is_video()
            && self.videos.get(active.path()).is_some_and(|v| v.is_playing());
        self.state.is_playing = playing;
    }

    pub fn state(&self) -> CarouselState {
        self.state
    }

    pub fn active_index(&self) -> usize {
        self.state.active_index
    }

    pub fn active_item(&self) -> &MediaItem {
        // active_index is kept in [0, len) and sequences are never empty
        &self.sequence.items()[self.state.active_index]
    }

    pub fn sequence(&self) -> &MediaSequence {
        &self.sequence
    }

    /// Arrows, dots and the counter only exist for real carousels.
    pub fn has_controls(&self) -> bool {
        self.sequence.len() > 1
    }

    pub fn position_label(&self) -> String {
        format!("{} / {}", self.state.active_index + 1, self.sequence.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carousel::video::fake::{Call, RecordingVideo};

    const FIVE_SECONDS: Duration = Duration::from_millis(5000);

    fn controller(paths: &[&str]) -> CarouselController<RecordingVideo> {
        CarouselController::new(MediaSequence::from_paths(paths.iter().copied()).unwrap())
    }

    #[test]
    fn next_wraps_around_after_len_steps() {
        for len in 2..6 {
            let paths: Vec<String> = (0..len).map(|i| format!("/{i}.jpg")).collect();
            let mut c = CarouselController::<RecordingVideo>::new(
                MediaSequence::from_paths(paths).unwrap(),
            );
            c.go_to(1);
            for _ in 0..len {
                c.next();
            }
            assert_eq!(c.active_index(), 1);
        }
    }

    #[test]
    fn previous_then_next_is_identity() {
        let mut c = controller(&["/a.jpg", "/b.jpg", "/c.jpg"]);
        for start in 0..3 {
            c.go_to(start);
            c.previous();
            c.next();
            assert_eq!(c.active_index(), start);
            c.next();
            c.previous();
            assert_eq!(c.active_index(), start);
        }
    }

    #[test]
    fn previous_at_zero_goes_to_last() {
        let mut c = controller(&["/a.jpg", "/b.jpg", "/c.jpg"]);
        assert!(c.previous());
        assert_eq!(c.active_index(), 2);
    }

    #[test]
    fn out_of_range_jump_is_ignored() {
        let mut c = controller(&["/a.jpg", "/b.jpg", "/c.jpg"]);
        c.go_to(1);
        assert!(!c.go_to(5));
        assert_eq!(c.active_index(), 1);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut c = controller(&["/a.jpg", "/b.jpg"]);
        assert_eq!(c.start(Duration::ZERO, true), Err(CarouselError::ZeroInterval));
        assert!(!c.is_timer_armed());
    }

    #[test]
    fn auto_play_cycles_and_plays_the_active_video() {
        let mut c = controller(&["/A.jpg", "/B.mp4", "/C.jpg"]);
        c.attach_video("/B.mp4", RecordingVideo::default());
        c.start(FIVE_SECONDS, true).unwrap();

        // Not yet rotated at the first display
        assert!(!c.video("/B.mp4").unwrap().playing);

        assert!(c.tick(FIVE_SECONDS));
        assert_eq!(c.active_index(), 1);
        let b = c.video("/B.mp4").unwrap();
        assert!(b.playing && b.muted);
        assert!(c.state().is_playing);

        assert!(c.tick(FIVE_SECONDS));
        assert_eq!(c.active_index(), 2);
        let b = c.video("/B.mp4").unwrap();
        assert!(!b.playing);
        assert_eq!(b.position, 0);
        assert!(b.muted);
        assert!(!c.state().is_playing);

        assert!(c.tick(FIVE_SECONDS));
        assert_eq!(c.active_index(), 0);
    }

    #[test]
    fn other_videos_are_paused_and_rewound() {
        let mut c = controller(&["/a.mp4", "/b.mp4"]);
        c.attach_video("/a.mp4", RecordingVideo::default());
        c.attach_video("/b.mp4", RecordingVideo::default());
        assert!(c.video("/a.mp4").unwrap().playing);

        c.next();
        let a = c.video("/a.mp4").unwrap();
        assert!(!a.playing);
        assert_eq!(a.position, 0);
        assert!(a.calls.ends_with(&[Call::Pause, Call::Rewind, Call::Mute(true)]));
    }

    #[test]
    fn blocked_autoplay_reports_not_playing() {
        let mut c = controller(&["/a.jpg", "/b.mp4"]);
        c.attach_video("/b.mp4", RecordingVideo::refusing());
        c.next();
        assert!(!c.state().is_playing);
    }

    #[test]
    fn partial_ticks_accumulate() {
        let mut c = controller(&["/a.jpg", "/b.jpg"]);
        c.start(FIVE_SECONDS, true).unwrap();
        assert!(!c.tick(Duration::from_millis(2500)));
        assert!(!c.tick(Duration::from_millis(2499)));
        assert!(c.tick(Duration::from_millis(1)));
        assert_eq!(c.active_index(), 1);
    }

    #[test]
    fn hover_holds_the_slide_and_restarts_the_interval() {
        let mut c = controller(&["/a.jpg", "/b.jpg", "/c.jpg"]);
        c.start(FIVE_SECONDS, true).unwrap();
        c.tick(FIVE_SECONDS);
        assert_eq!(c.active_index(), 1);

        c.tick(Duration::from_millis(4000));
        c.pause();
        for _ in 0..10 {
            assert!(!c.tick(FIVE_SECONDS));
        }
        assert_eq!(c.active_index(), 1);

        c.resume();
        assert!(!c.tick(Duration::from_millis(4000)));
        assert!(c.tick(Duration::from_millis(1000)));
        assert_eq!(c.active_index(), 2);
    }

    #[test]
    fn manual_navigation_works_while_paused() {
        let mut c = controller(&["/a.jpg", "/b.jpg", "/c.jpg"]);
        c.start(FIVE_SECONDS, true).unwrap();
        c.pause();
        c.next();
        assert_eq!(c.active_index(), 1);
        assert!(c.state().is_paused);
    }

    #[test]
    fn disabled_auto_play_never_advances() {
        let mut c = controller(&["/a.jpg", "/b.jpg"]);
        c.start(FIVE_SECONDS, false).unwrap();
        assert!(!c.tick(FIVE_SECONDS * 3));
        assert_eq!(c.active_index(), 0);
    }

    #[test]
    fn single_item_is_static() {
        let mut c = controller(&["/a.jpg"]);
        c.start(FIVE_SECONDS, true).unwrap();
        assert!(!c.is_timer_armed());
        assert!(!c.has_controls());
        assert!(!c.tick(FIVE_SECONDS));
        assert!(!c.next());
        assert_eq!(c.active_index(), 0);
    }

    #[test]
    fn stop_cancels_pending_tick() {
        let mut c = controller(&["/a.jpg", "/b.jpg"]);
        c.start(FIVE_SECONDS, true).unwrap();
        c.tick(Duration::from_millis(4999));
        c.stop();
        assert!(!c.tick(FIVE_SECONDS));
        assert_eq!(c.active_index(), 0);
    }

    #[test]
    fn toggle_play_pause_follows_the_handle() {
        let mut c = controller(&["/a.mp4", "/b.jpg"]);
        c.attach_video("/a.mp4", RecordingVideo::default());
        assert!(c.state().is_playing);
        c.toggle_play_pause();
        assert!(!c.state().is_playing);
        c.toggle_play_pause();
        assert!(c.state().is_playing);
    }

    #[test]
    fn position_label_is_one_based() {
        let mut c = controller(&["/a.jpg", "/b.jpg", "/c.jpg"]);
        c.previous();
        assert_eq!(c.position_label(), "3 / 3");
    }

    #[test]
    fn silence_then_wake_restarts_the_active_video() {
        let mut c = controller(&["/a.mp4", "/b.jpg"]);
        c.attach_video("/a.mp4", RecordingVideo::default());
        assert!(c.state().is_playing);

        c.silence();
        assert!(!c.state().is_playing);
        let video = c.video("/a.mp4").unwrap();
        assert!(!video.playing);
        assert_eq!(video.position, 0);

        c.wake();
        assert!(c.state().is_playing);
    }
}
