// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Unified source records
//!
//! Both Picasa representations are turned into [`PhotoRecord`]s as soon as
//! they are read, so classification and reconciliation only ever see one
//! closed set of shapes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{MediaKind, RatingConfig};
use crate::sources::IniEntry;

/// Where a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Source {
    /// The binary Picasa database
    BinaryDb,
    /// A `.picasa.ini` sidecar
    IniFile,
}

impl Source {
    /// Precedence when sources disagree; higher wins
    pub fn rank(self) -> u8 {
        match self {
            Source::BinaryDb => 2,
            Source::IniFile => 1,
        }
    }
}

/// Payload of a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum RecordContent {
    Tag(String),
    Caption(String),
    Rating(i64),
    /// Picasa's star flag
    Star,
    /// A field that was read but has no known meaning
    Other { key: String, value: String },
}

/// Kind half of a [`TagOrigin`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Tag,
    Caption,
    Rating,
    Star,
    Other,
}

/// Source × kind, the key of the routing table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagOrigin {
    pub source: Source,
    pub kind: RecordKind,
}

/// One raw piece of metadata about one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub photo: PathBuf,
    pub media: MediaKind,
    pub source: Source,
    pub content: RecordContent,
}

impl RecordContent {
    pub fn kind(&self) -> RecordKind {
        match self {
            RecordContent::Tag(_) => RecordKind::Tag,
            RecordContent::Caption(_) => RecordKind::Caption,
            RecordContent::Rating(_) => RecordKind::Rating,
            RecordContent::Star => RecordKind::Star,
            RecordContent::Other { .. } => RecordKind::Other,
        }
    }
}

impl fmt::Display for RecordContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordContent::Tag(t) => write!(f, "tag {:?}", t),
            RecordContent::Caption(c) => write!(f, "caption {:?}", c),
            RecordContent::Rating(r) => write!(f, "rating {}", r),
            RecordContent::Star => write!(f, "star"),
            RecordContent::Other { key, value } => write!(f, "{}={:?}", key, value),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::BinaryDb => write!(f, "picasa-db"),
            Source::IniFile => write!(f, "picasa-ini"),
        }
    }
}

impl PhotoRecord {
    pub fn new(photo: &Path, media: MediaKind, source: Source, content: RecordContent) -> Self {
        Self {
            photo: photo.to_path_buf(),
            media,
            source,
            content,
        }
    }

    pub fn origin(&self) -> TagOrigin {
        TagOrigin {
            source: self.source,
            kind: self.content.kind(),
        }
    }
}

/// Records for one file from the binary database.
///
/// Picasa stores an empty caption for every uncaptioned file; blank strings
/// are dropped here.
pub fn from_binary_db(
    photo: &Path,
    media: MediaKind,
    tags: Vec<String>,
    captions: Vec<String>,
) -> Vec<PhotoRecord> {
    let present = |s: &String| !s.trim().is_empty();
    let tags = tags.into_iter().filter(present).map(RecordContent::Tag);
    let captions = captions.into_iter().filter(present).map(RecordContent::Caption);
    tags.chain(captions)
        .map(|content| PhotoRecord::new(photo, media, Source::BinaryDb, content))
        .collect()
}

/// Records for one file from its INI entry.
///
/// Keywords listed as rating keywords become ratings; ignored keywords are
/// returned separately so the caller can count them.
pub fn from_ini_entry(
    photo: &Path,
    media: MediaKind,
    entry: &IniEntry,
    ratings: &RatingConfig,
) -> (Vec<PhotoRecord>, Vec<String>) {
    let mut records = Vec::new();
    let mut ignored = Vec::new();
    let mut push = |content| records.push(PhotoRecord::new(photo, media, Source::IniFile, content));

    if let Some(raw) = &entry.rating {
        match raw.trim().parse::<i64>() {
            Ok(value) => push(RecordContent::Rating(value)),
            Err(_) => push(RecordContent::Other {
                key: "rating".to_string(),
                value: raw.clone(),
            }),
        }
    }

    for keyword in &entry.tags {
        if let Some(stars) = ratings.keywords.get(keyword) {
            push(RecordContent::Rating(i64::from(*stars)));
        } else if ratings.ignored_keywords.iter().any(|k| k == keyword) {
            ignored.push(keyword.clone());
        } else {
            push(RecordContent::Tag(keyword.clone()));
        }
    }

    if let Some(caption) = &entry.caption {
        push(RecordContent::Caption(caption.clone()));
    }
    if entry.starred {
        push(RecordContent::Star);
    }

    (records, ignored)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_db_records() {
        let records = from_binary_db(
            Path::new("/p/a.jpg"),
            MediaKind::Photo,
            vec!["sunset".to_string()],
            vec!["Beach Day".to_string(), "  ".to_string()],
        );
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].origin(), TagOrigin { source: Source::BinaryDb, kind: RecordKind::Tag });
        assert_eq!(records[1].content, RecordContent::Caption("Beach Day".to_string()));
    }

    #[test]
    fn test_ini_keywords_become_ratings() {
        let entry = IniEntry {
            rating: None,
            tags: vec!["good".to_string(), "pythontagged".to_string(), "beach".to_string()],
            caption: None,
            starred: true,
        };
        let (records, ignored) =
            from_ini_entry(Path::new("/p/a.jpg"), MediaKind::Photo, &entry, &RatingConfig::default());

        let contents: Vec<_> = records.iter().map(|r| r.content.clone()).collect();
        assert_eq!(
            contents,
            vec![
                RecordContent::Rating(4),
                RecordContent::Tag("beach".to_string()),
                RecordContent::Star,
            ]
        );
        assert_eq!(ignored, vec!["pythontagged".to_string()]);
    }

    #[test]
    fn test_unparsable_rating_is_kept_raw() {
        let entry = IniEntry {
            rating: Some("four".to_string()),
            ..IniEntry::default()
        };
        let (records, _) =
            from_ini_entry(Path::new("/p/a.jpg"), MediaKind::Photo, &entry, &RatingConfig::default());
        assert_eq!(
            records[0].content,
            RecordContent::Other { key: "rating".to_string(), value: "four".to_string() }
        );
    }

    #[test]
    fn test_source_rank() {
        assert!(Source::BinaryDb.rank() > Source::IniFile.rank());
    }
}
