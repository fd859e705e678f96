use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

const BUILTIN_CATALOG: &str = include_str!("../assets/catalog.toml");

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read media catalog: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse media catalog: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Kind from a file extension, `None` when the extension is not a
    /// displayable media type.
    pub fn from_extension(ext: &str) -> Option<MediaKind> {
        match ext.to_lowercase().as_str() {
            "jpeg" | "jpg" | "png" | "gif" | "webp" => Some(MediaKind::Image),
            "mp4" | "webm" => Some(MediaKind::Video),
            _ => None,
        }
    }
}

/// A reference to an image or video resource. Paths are kept exactly as
/// listed in the catalog (site-style, e.g. `/Indoor screen-3.jpeg`) and
/// resolved against the media root only when loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaItem {
    path: String,
    kind: MediaKind,
}

impl MediaItem {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        // Unknown extensions are shown as images, the loader degrades them
        // to a placeholder if they cannot be decoded.
        let kind = Path::new(&path)
            .extension()
            .and_then(|s| s.to_str())
            .and_then(MediaKind::from_extension)
            .unwrap_or(MediaKind::Image);
        Self { path, kind }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }
}

/// Ordered, non-empty list of media items. Insertion order is display order.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaSequence {
    items: Vec<MediaItem>,
}

impl MediaSequence {
    /// Returns `None` for an empty list: there is nothing to display.
    pub fn new(items: Vec<MediaItem>) -> Option<Self> {
        if items.is_empty() {
            None
        } else {
            Some(Self { items })
        }
    }

    pub fn from_paths<I, S>(paths: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(paths.into_iter().map(MediaItem::new).collect())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn get(&self, index: usize) -> Option<&MediaItem> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    /// A single item is a static display, no rotation.
    pub fn is_static(&self) -> bool {
        self.items.len() == 1
    }
}

/// Strip a known media extension, leaving the base name.
fn strip_media_extension(path: &str) -> &str {
    match path.rsplit_once('.') {
        Some((stem, ext)) if MediaKind::from_extension(ext).is_some() => stem,
        _ => path,
    }
}

/// Numeric `-N` suffix of `stem` relative to `base`. The base itself is 0.
fn variant_number(stem: &str, base: &str) -> Option<u32> {
    if stem == base {
        return Some(0);
    }
    let suffix = stem.strip_prefix(base)?.strip_prefix('-')?;
    suffix.parse().ok()
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    inventory: Vec<String>,
    #[serde(default, rename = "group")]
    groups: Vec<GroupDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
struct GroupDefinition {
    base: String,
    items: Vec<String>,
}

/// Static asset inventory plus explicit carousel groups.
#[derive(Debug, Clone, Default)]
pub struct MediaCatalog {
    inventory: Vec<String>,
    groups: HashMap<String, Vec<String>>,
}

impl MediaCatalog {
    /// The inventory shipped with the application.
    pub fn builtin() -> Result<Self, CatalogError> {
        Ok(Self::from_toml(BUILTIN_CATALOG)?)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let catalog = Self::from_toml(&fs::read_to_string(path)?)?;
        info!(path = %path.display(), entries = catalog.inventory.len(), "Loaded media catalog");
        Ok(catalog)
    }

    pub fn from_toml(source: &str) -> Result<Self, toml::de::Error> {
        let file: CatalogFile = toml::from_str(source)?;
        let groups = file
            .groups
            .into_iter()
            .map(|g| (strip_media_extension(&g.base).to_string(), g.items))
            .collect();
        Ok(Self { inventory: file.inventory, groups })
    }

    pub fn inventory(&self) -> &[String] {
        &self.inventory
    }

    /// All media that belong to the topic of `base`, in display order.
    ///
    /// An explicit group wins over filename matching. Matching keeps the
    /// inventory entries whose stem is `base` or `base-N` and orders them
    /// base first, then by `N`. With no match at all the base itself is the
    /// only candidate.
    pub fn list_candidates(&self, base: &str) -> Vec<MediaItem> {
        let stem = strip_media_extension(base);

        if let Some(items) = self.groups.get(stem) {
            debug!(base, count = items.len(), "Using explicit media group");
            return items.iter().cloned().map(MediaItem::new).collect();
        }

        let mut matches: Vec<(u32, &String)> = self
            .inventory
            .iter()
            .filter_map(|path| {
                variant_number(strip_media_extension(path), stem).map(|n| (n, path))
            })
            .collect();
        // Stable sort keeps inventory order among equal numbers
        matches.sort_by_key(|(n, _)| *n);

        if matches.is_empty() {
            return vec![MediaItem::new(base)];
        }
        matches.into_iter().map(|(_, p)| MediaItem::new(p.clone())).collect()
    }

    /// Candidate list as a sequence. Never empty.
    pub fn sequence_for(&self, base: &str) -> MediaSequence {
        let items = self.list_candidates(base);
        MediaSequence::new(items).unwrap_or_else(|| MediaSequence {
            items: vec![MediaItem::new(base)],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
inventory = [
    "/Indoor screen-3.jpeg",
    "/Indoor screen.mp4",
    "/Indoor screen-1.mp4",
    "/Indoor screen-10.jpeg",
    "/Indoor screen-2.mp4",
    "/Indoor screens overview.jpeg",
    "/custamize led.jpeg",
]

[[group]]
base = "/custamize led.jpeg"
items = ["/custamize led-7.mp4", "/custamize led.jpeg"]
"#;

    #[test]
    fn kind_is_inferred_from_extension() {
        assert_eq!(MediaItem::new("/a/B.MP4").kind(), MediaKind::Video);
        assert_eq!(MediaItem::new("/a/b.webm").kind(), MediaKind::Video);
        assert_eq!(MediaItem::new("/a/b.webp").kind(), MediaKind::Image);
        assert_eq!(MediaItem::new("/a/b.JPEG").kind(), MediaKind::Image);
    }

    #[test]
    fn empty_sequence_is_rejected() {
        assert!(MediaSequence::new(Vec::new()).is_none());
        let single = MediaSequence::from_paths(["/a.jpg"]).unwrap();
        assert!(single.is_static());
    }

    #[test]
    fn candidates_are_ordered_base_first_then_by_suffix() {
        let catalog = MediaCatalog::from_toml(CATALOG).unwrap();
        let paths: Vec<String> = catalog
            .list_candidates("/Indoor screen.mp4")
            .into_iter()
            .map(|m| m.path().to_string())
            .collect();
        assert_eq!(
            paths,
            vec![
                "/Indoor screen.mp4",
                "/Indoor screen-1.mp4",
                "/Indoor screen-2.mp4",
                "/Indoor screen-3.jpeg",
                "/Indoor screen-10.jpeg",
            ]
        );
    }

    #[test]
    fn similar_names_without_numeric_suffix_do_not_match() {
        let catalog = MediaCatalog::from_toml(CATALOG).unwrap();
        let found = catalog.list_candidates("/Indoor screen.jpeg");
        assert!(found.iter().all(|m| m.path() != "/Indoor screens overview.jpeg"));
    }

    #[test]
    fn explicit_group_overrides_matching() {
        let catalog = MediaCatalog::from_toml(CATALOG).unwrap();
        let found = catalog.list_candidates("/custamize led.jpeg");
        assert_eq!(found.len(), 2);
        assert!(found[0].is_video());
    }

    #[test]
    fn unknown_base_yields_itself() {
        let catalog = MediaCatalog::from_toml(CATALOG).unwrap();
        let seq = catalog.sequence_for("/SMD.jpeg");
        assert_eq!(seq.len(), 1);
        assert_eq!(seq.get(0).unwrap().path(), "/SMD.jpeg");
    }

    #[test]
    fn items_can_be_collected_into_a_set() {
        let catalog = MediaCatalog::builtin().unwrap();
        let items = catalog.sequence_for("/custamize led.jpeg").items().to_vec();
        let unique: std::collections::HashSet<MediaItem> = items.iter().cloned().collect();
        assert_eq!(unique.len(), items.len());
        assert!(unique.contains(&MediaItem::new("/custamize led.jpeg")));
        assert!(unique.iter().any(MediaItem::is_video));
    }

    #[test]
    fn builtin_catalog_groups_by_topic() {
        let catalog = MediaCatalog::builtin().unwrap();
        let custom = catalog.sequence_for("/custamize led.jpeg");
        assert_eq!(custom.len(), 8);
        assert!(custom.items()[7].is_video());
        assert_eq!(catalog.sequence_for("/Indoor and outdoor video walls-1.jpeg").len(), 1);
    }

    #[test]
    fn missing_catalog_file_is_a_read_error() {
        let err = MediaCatalog::load(Path::new("/nonexistent/catalog.toml")).unwrap_err();
        assert!(matches!(err, CatalogError::Read(_)));
    }
}
