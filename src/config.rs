//! Settings file and the persisted language preference.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::constants::{AUTO_ADVANCE_INTERVAL, FPS, WINDOW_HEIGHT, WINDOW_WIDTH};
use crate::i18n::Language;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("No configuration directory available on this platform")]
    NoConfigDir,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub width: i32,
    pub height: i32,
    pub fps: u32,
    /// TTF/OTF font with CJK glyphs; the built-in raylib font only has Latin.
    pub font: Option<PathBuf>,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self { width: WINDOW_WIDTH, height: WINDOW_HEIGHT, fps: FPS, font: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselSettings {
    pub interval_ms: u64,
    pub auto_play: bool,
}

impl Default for CarouselSettings {
    fn default() -> Self {
        Self {
            interval_ms: AUTO_ADVANCE_INTERVAL.as_millis() as u64,
            auto_play: true,
        }
    }
}

impl CarouselSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentSettings {
    /// Replaces the built-in module content.
    pub modules: Option<PathBuf>,
    /// Replaces the built-in media inventory and groups.
    pub catalog: Option<PathBuf>,
    /// Directory that catalog paths such as `/SMD.jpeg` resolve against.
    pub media_root: PathBuf,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self { modules: None, catalog: None, media_root: PathBuf::from("public") }
    }
}

impl ContentSettings {
    /// Filesystem path of a catalog media path.
    pub fn resolve_media(&self, media_path: &str) -> PathBuf {
        self.media_root.join(media_path.trim_start_matches('/'))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub window: WindowSettings,
    pub carousel: CarouselSettings,
    pub content: ContentSettings,
}

impl Settings {
    /// Load from an explicit file, or defaults when none is given.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let Some(path) = path else {
            debug!("No config file given, using defaults");
            return Ok(Self::default());
        };
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub language: Language,
}

/// The one value that survives between runs: the selected language.
///
/// Read once at startup, written on every change.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `preferences.toml` in the platform config directory.
    pub fn default_location() -> ConfigResult<Self> {
        let dirs = ProjectDirs::from("", "", "led-training").ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::new(dirs.config_dir().join("preferences.toml")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable preferences fall back to the defaults.
    pub fn load(&self) -> Preferences {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Preferences::default(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Could not read preferences");
                return Preferences::default();
            }
        };
        match toml::from_str(&content) {
            Ok(prefs) => prefs,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring invalid preferences");
                Preferences::default()
            }
        }
    }

    pub fn save(&self, prefs: &Preferences) -> ConfigResult<()> {
        let content = toml::to_string_pretty(prefs)?;
        self.atomic_write(&content)?;
        debug!(path = %self.path.display(), language = ?prefs.language, "Saved preferences");
        Ok(())
    }

    // Write to a sibling temp file, then rename over the target.
    fn atomic_write(&self, content: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("toml.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)
    }
}
