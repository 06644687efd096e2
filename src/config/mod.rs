// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for picasa2shotwell

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct MigrationConfig {
    /// Shotwell database settings
    #[serde(default)]
    pub target: TargetConfig,

    /// Picasa source settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Folder-to-event naming
    #[serde(default)]
    pub events: EventConfig,

    /// Keyword-to-rating mapping
    #[serde(default)]
    pub ratings: RatingConfig,

    /// Embedded metadata writing
    #[serde(default)]
    pub embedded: EmbeddedConfig,

    /// Which files count as photos and videos
    #[serde(default)]
    pub media: MediaConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TargetConfig {
    #[serde(default = "default_shotwell_db")]
    pub database: PathBuf,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SourceConfig {
    /// JSON export of the Picasa database (tags and captions)
    #[serde(default)]
    pub snapshot: Option<PathBuf>,
    #[serde(default = "default_ini_name")]
    pub ini_name: String,
    /// Home directory that `C:\Users\<name>` maps onto
    #[serde(default)]
    pub home: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EventConfig {
    /// Extra whole-word expansions, merged over the built-in table
    #[serde(default)]
    pub abbreviations: BTreeMap<String, String>,
    /// Folder names that belong to their parent's event
    #[serde(default = "default_transparent_folders")]
    pub transparent_folders: Vec<String>,
    /// Prefix titles with a `YYYY` or `YYYY-MM` parent folder
    #[serde(default = "default_true")]
    pub year_context: bool,
    /// Grouping folders whose children name a period, e.g. `Life/Fall 2010/Party`
    #[serde(default = "default_context_parents")]
    pub context_parents: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RatingConfig {
    /// Picasa keywords that encode a star rating
    #[serde(default = "default_rating_keywords")]
    pub keywords: BTreeMap<String, u8>,
    /// Keywords that carry no meaning for the target
    #[serde(default = "default_ignored_keywords")]
    pub ignored_keywords: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EmbeddedConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Also burn database tags into the file
    #[serde(default = "default_true")]
    pub write_tags: bool,
    /// Also burn the winning caption into the file title
    #[serde(default = "default_true")]
    pub write_titles: bool,
    /// Send INI video tags to embedded metadata instead of the report
    #[serde(default = "default_true")]
    pub video_tags: bool,
    #[serde(default = "default_exiftool")]
    pub exiftool: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MediaConfig {
    #[serde(default = "default_photo_extensions")]
    pub photo_extensions: Vec<String>,
    #[serde(default = "default_video_extensions")]
    pub video_extensions: Vec<String>,
}

// Default value functions
fn default_true() -> bool { true }
fn default_ini_name() -> String { ".picasa.ini".to_string() }
fn default_exiftool() -> String { "exiftool".to_string() }
fn default_transparent_folders() -> Vec<String> { vec!["Originals".to_string()] }
fn default_context_parents() -> Vec<String> { vec!["Life".to_string()] }
fn default_ignored_keywords() -> Vec<String> { vec!["pythontagged".to_string()] }

fn default_shotwell_db() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".local/share/shotwell/data/photo.db")
}

fn default_rating_keywords() -> BTreeMap<String, u8> {
    [("excellent", 5), ("good", 4), ("good_2", 4), ("OK", 3), ("bad", 2)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn default_photo_extensions() -> Vec<String> {
    vec![
        "jpg", "jpeg", "png", "gif", "bmp", "tif", "tiff", "webp", "heic",
        "cr2", "nef", "orf", "dng", "raw",
    ].into_iter().map(String::from).collect()
}

fn default_video_extensions() -> Vec<String> {
    vec!["mp4", "mov", "avi", "mpg", "mpeg", "m4v", "3gp", "mkv", "wmv"]
        .into_iter().map(String::from).collect()
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            database: default_shotwell_db(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            snapshot: None,
            ini_name: default_ini_name(),
            home: None,
        }
    }
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            abbreviations: BTreeMap::new(),
            transparent_folders: default_transparent_folders(),
            year_context: true,
            context_parents: default_context_parents(),
        }
    }
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            keywords: default_rating_keywords(),
            ignored_keywords: default_ignored_keywords(),
        }
    }
}

impl Default for EmbeddedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            write_tags: true,
            write_titles: true,
            video_tags: true,
            exiftool: default_exiftool(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            photo_extensions: default_photo_extensions(),
            video_extensions: default_video_extensions(),
        }
    }
}

/// What kind of media a file is, judged by its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaConfig {
    /// Classify a path, or `None` when it is not migratable media
    pub fn kind_of(&self, path: &Path) -> Option<MediaKind> {
        let ext = path.extension()?.to_str()?;
        if self.video_extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
            Some(MediaKind::Video)
        } else if self.photo_extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
            Some(MediaKind::Photo)
        } else {
            None
        }
    }
}

impl SourceConfig {
    /// Home directory used for legacy path mapping
    pub fn home_dir(&self) -> PathBuf {
        self.home
            .clone()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("/"))
    }
}

impl MigrationConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| crate::MigrationError::Config(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the migration cannot honour
    pub fn validate(&self) -> crate::Result<()> {
        if let Some((keyword, stars)) = self.ratings.keywords.iter().find(|(_, v)| **v > 5) {
            return Err(crate::MigrationError::Config(format!(
                "rating keyword '{}' maps to {} stars, maximum is 5",
                keyword, stars
            )));
        }
        if self.source.ini_name.trim().is_empty() {
            return Err(crate::MigrationError::Config("source.ini_name is empty".to_string()));
        }
        Ok(())
    }
}
