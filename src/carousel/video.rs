use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum VideoError {
    #[error("Failed to start decoder for {path}: {source}")]
    Spawn {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not probe video size for {0}")]
    Probe(String),

    #[error("Playback of {0} was refused")]
    Refused(String),
}

/// Playback controls of one video element.
pub trait VideoHandle {
    fn set_muted(&mut self, muted: bool);
    /// Request playback. Failing is normal (missing decoder, broken file)
    /// and callers are expected to swallow the error.
    fn play(&mut self) -> Result<(), VideoError>;
    fn pause(&mut self);
    /// Seek back to the first frame.
    fn rewind(&mut self);
    fn is_playing(&self) -> bool;
}

/// Video handles keyed by media path, owned by one carousel.
pub struct VideoBank<V> {
    handles: HashMap<String, V>,
}

impl<V: VideoHandle> VideoBank<V> {
    pub fn new() -> Self {
        Self { handles: HashMap::new() }
    }

    pub fn insert(&mut self, path: impl Into<String>, handle: V) {
        self.handles.insert(path.into(), handle);
    }

    pub fn remove(&mut self, path: &str) -> Option<V> {
        self.handles.remove(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.handles.contains_key(path)
    }

    pub fn get(&self, path: &str) -> Option<&V> {
        self.handles.get(path)
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut V> {
        self.handles.get_mut(path)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Make `active` the only video that may play. Returns whether it is
    /// actually playing afterwards.
    pub fn arbitrate(&mut self, active: Option<&str>) -> bool {
        let mut playing = false;
        for (path, handle) in self.handles.iter_mut() {
            if Some(path.as_str()) == active {
                handle.set_muted(true);
                if let Err(e) = handle.play() {
                    debug!(%path, error = %e, "Autoplay refused");
                }
                playing = handle.is_playing();
            } else {
                handle.pause();
                handle.rewind();
                handle.set_muted(true);
            }
        }
        playing
    }
}

impl<V: VideoHandle> Default for VideoBank<V> {
    fn default() -> Self {
        Self::new()
    }
}
