use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::constants::TOPIC_PREVIEW_COUNT;

const BUILTIN_MODULES: &str = include_str!("../assets/content.toml");

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Failed to read content file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse content: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid content: {0}")]
    Invalid(String),

    #[error("No training module with id '{0}'")]
    UnknownModule(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LedType {
    pub name: String,
    pub description: String,
    pub media: Option<String>,
    pub caption: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub applications: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PixelPitchRow {
    pub pitch: String,
    pub applications: String,
    pub viewing_distance: String,
    pub description: String,
}

impl PixelPitchRow {
    pub fn summary(&self, applications_label: &str, distance_label: &str) -> String {
        format!(
            "{}\n\n{}: {}\n{}: {}",
            self.description, applications_label, self.applications, distance_label, self.viewing_distance
        )
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Component {
    pub name: String,
    pub description: String,
    pub function: String,
}

impl Component {
    pub fn summary(&self, function_label: &str) -> String {
        format!("{}\n\n{}: {}", self.description, function_label, self.function)
    }
}

/// One block of a module's detail view.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DetailSection {
    OverviewOnly {
        title: String,
        #[serde(default)]
        description: String,
        media: Option<String>,
    },
    WithLedTypes {
        title: String,
        types: Vec<LedType>,
    },
    WithPixelPitchTable {
        title: String,
        #[serde(default)]
        description: String,
        media: Option<String>,
        rows: Vec<PixelPitchRow>,
    },
    WithComponentTable {
        title: String,
        #[serde(default)]
        description: String,
        media: Option<String>,
        components: Vec<Component>,
    },
}

impl DetailSection {
    pub fn title(&self) -> &str {
        match self {
            DetailSection::OverviewOnly { title, .. }
            | DetailSection::WithLedTypes { title, .. }
            | DetailSection::WithPixelPitchTable { title, .. }
            | DetailSection::WithComponentTable { title, .. } => title,
        }
    }

    pub fn media(&self) -> Option<&str> {
        match self {
            DetailSection::OverviewOnly { media, .. }
            | DetailSection::WithPixelPitchTable { media, .. }
            | DetailSection::WithComponentTable { media, .. } => media.as_deref(),
            DetailSection::WithLedTypes { .. } => None,
        }
    }

    /// Every string the section can put on screen.
    pub fn strings(&self) -> Vec<&str> {
        let mut out = vec![self.title()];
        match self {
            DetailSection::OverviewOnly { description, .. } => out.push(description),
            DetailSection::WithLedTypes { types, .. } => {
                for led in types {
                    out.extend([led.name.as_str(), led.description.as_str()]);
                    out.extend(led.caption.as_deref());
                    out.extend(led.features.iter().chain(&led.applications).map(String::as_str));
                }
            }
            DetailSection::WithPixelPitchTable { description, rows, .. } => {
                out.push(description);
                for row in rows {
                    out.extend([&row.pitch, &row.applications, &row.viewing_distance, &row.description].map(String::as_str));
                }
            }
            DetailSection::WithComponentTable { description, components, .. } => {
                out.push(description);
                for c in components {
                    out.extend([&c.name, &c.description, &c.function].map(String::as_str));
                }
            }
        }
        out
    }

    /// Carries a table of rows or components.
    pub fn has_table(&self) -> bool {
        matches!(
            self,
            DetailSection::WithPixelPitchTable { .. } | DetailSection::WithComponentTable { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModuleDetail {
    pub overview: String,
    pub visual_overview: Option<String>,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub sections: Vec<DetailSection>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrainingModule {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub topics: Vec<String>,
    detail: Option<ModuleDetail>,
}

impl TrainingModule {
    /// Detail view content. Modules without explicit detail are presented
    /// from their description and topics.
    pub fn detail(&self) -> ModuleDetail {
        self.detail.clone().unwrap_or_else(|| ModuleDetail {
            overview: self.description.clone(),
            visual_overview: None,
            key_points: self.topics.clone(),
            sections: Vec::new(),
        })
    }

    pub fn has_detail(&self) -> bool {
        self.detail.is_some()
    }

    /// All text the module shows on its card and in its deck, newline
    /// separated.
    pub fn display_text(&self) -> String {
        let detail = self.detail();
        let mut parts = vec![self.title.as_str(), self.description.as_str(), detail.overview.as_str()];
        parts.extend(self.topics.iter().chain(&detail.key_points).map(String::as_str));
        for section in &detail.sections {
            parts.extend(section.strings());
        }
        parts.join("\n")
    }

    /// Topics shown on the module card and how many were left out.
    pub fn preview_topics(&self) -> (&[String], usize) {
        let shown = self.topics.len().min(TOPIC_PREVIEW_COUNT);
        (&self.topics[..shown], self.topics.len() - shown)
    }
}

#[derive(Debug, Deserialize)]
struct ContentFile {
    #[serde(rename = "module")]
    modules: Vec<TrainingModule>,
}

/// The ordered list of training modules.
#[derive(Debug, Clone)]
pub struct Curriculum {
    modules: Vec<TrainingModule>,
}

impl Curriculum {
    pub fn builtin() -> Result<Self, ContentError> {
        Self::from_toml(BUILTIN_MODULES)
    }

    pub fn load(path: &Path) -> Result<Self, ContentError> {
        let source = fs::read_to_string(path)?;
        let curriculum = Self::from_toml(&source)?;
        info!(path = %path.display(), modules = curriculum.modules.len(), "Loaded training content");
        Ok(curriculum)
    }

    pub fn from_toml(source: &str) -> Result<Self, ContentError> {
        let file: ContentFile = toml::from_str(source)?;
        let curriculum = Self { modules: file.modules };
        curriculum.validate()?;
        debug!(modules = curriculum.modules.len(), "Parsed training content");
        Ok(curriculum)
    }

    fn validate(&self) -> Result<(), ContentError> {
        let mut seen = HashSet::new();
        for module in &self.modules {
            if module.id.trim().is_empty() {
                return Err(ContentError::Invalid(format!("module '{}' has an empty id", module.title)));
            }
            if module.title.trim().is_empty() {
                return Err(ContentError::Invalid(format!("module '{}' has an empty title", module.id)));
            }
            if !seen.insert(module.id.as_str()) {
                return Err(ContentError::Invalid(format!("duplicate module id '{}'", module.id)));
            }
        }
        Ok(())
    }

    pub fn modules(&self) -> &[TrainingModule] {
        &self.modules
    }

    pub fn find(&self, id: &str) -> Result<&TrainingModule, ContentError> {
        self.modules
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| ContentError::UnknownModule(id.to_string()))
    }
}
