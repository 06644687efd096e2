// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! JSON export of the binary Picasa database
//!
//! The binary `db3` files are decoded elsewhere; this module consumes the
//! export, which lists tags and captions per legacy (Windows) path:
//!
//! ```json
//! {"photos": [{"path": "C:\\Users\\Steve\\Pictures\\ping.jpg",
//!              "tags": ["sunset"], "captions": ["Beach Day"]}]}
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::SourceDb;
use crate::{MigrationError, Result};

#[derive(Debug, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    photos: Vec<SnapshotEntry>,
}

#[derive(Debug, Deserialize)]
struct SnapshotEntry {
    path: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    captions: Vec<String>,
}

#[derive(Debug, Clone, Default)]
struct PhotoMetadata {
    tags: Vec<String>,
    captions: Vec<String>,
}

/// An export entry whose path could not be placed on this machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedEntry {
    pub path: String,
    pub reason: String,
}

/// Binary database contents keyed by local path
#[derive(Debug, Clone, Default)]
pub struct SnapshotDb {
    photos: HashMap<PathBuf, PhotoMetadata>,
    rejected: Vec<RejectedEntry>,
}

impl SnapshotDb {
    /// Load an export, mapping `C:\Users\<name>` onto `home`
    pub fn load(path: &Path, home: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let db = Self::from_json(&content, home)?;
        info!(
            "Loaded snapshot {:?}: {} files, {} unmapped",
            path,
            db.photos.len(),
            db.rejected.len()
        );
        Ok(db)
    }

    pub fn from_json(content: &str, home: &Path) -> Result<Self> {
        let file: SnapshotFile = serde_json::from_str(content)?;
        let mut db = Self::default();

        for entry in file.photos {
            let local = if entry.path.starts_with('/') {
                Ok(PathBuf::from(&entry.path))
            } else {
                windows_to_local(&entry.path, home)
            };

            match local {
                Ok(local) => {
                    let slot = db.photos.entry(local).or_default();
                    slot.tags.extend(entry.tags);
                    slot.captions.extend(entry.captions);
                }
                Err(e) => {
                    warn!("Skipping snapshot entry {}: {}", entry.path, e);
                    db.rejected.push(RejectedEntry {
                        path: entry.path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(db)
    }

    /// Entries that could not be mapped to a local path
    pub fn rejected(&self) -> &[RejectedEntry] {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }
}

impl SourceDb for SnapshotDb {
    fn list_photo_tags(&self, photo: &Path) -> Result<Vec<String>> {
        Ok(self.photos.get(photo).map(|m| m.tags.clone()).unwrap_or_default())
    }

    fn list_photo_captions(&self, photo: &Path) -> Result<Vec<String>> {
        Ok(self.photos.get(photo).map(|m| m.captions.clone()).unwrap_or_default())
    }
}

/// Map an absolute `C:\Users\<name>\...` path onto `home`.
///
/// Only paths inside a user profile can be placed; anything else, including
/// a path with `.` or `..` components, is an error.
pub fn windows_to_local(path: &str, home: &Path) -> Result<PathBuf> {
    let bytes = path.as_bytes();
    let absolute = bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/');
    if !absolute {
        return Err(MigrationError::PathMapping(format!("{} is not an absolute Windows path", path)));
    }

    let parts: Vec<&str> = path[3..]
        .split(['\\', '/'])
        .filter(|p| !p.is_empty())
        .collect();
    if parts.iter().any(|p| *p == "." || *p == "..") {
        return Err(MigrationError::PathMapping(format!("{} has relative components", path)));
    }

    match parts.as_slice() {
        [users, _user, rest @ ..] if users.eq_ignore_ascii_case("Users") => {
            let mut local = home.to_path_buf();
            local.extend(rest);
            Ok(local)
        }
        _ => Err(MigrationError::PathMapping(format!("{} is outside C:\\Users\\<name>", path))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_path_inside_home() {
        let home = Path::new("/home/steve");
        assert_eq!(windows_to_local(r"C:\Users\Steve", home).unwrap(), PathBuf::from("/home/steve"));
        assert_eq!(
            windows_to_local(r"C:\Users\Steve\Pictures\ping.jpg", home).unwrap(),
            PathBuf::from("/home/steve/Pictures/ping.jpg")
        );
    }

    #[test]
    fn test_windows_path_rejections() {
        let home = Path::new("/home/steve");
        for bad in [
            r"\Users\Steve",
            r"C:\Program Files\Pictures\ping.jpg",
            r"C:\Users",
            r"C:\Users\Steve\..\..\..\etc\passwd",
            r"C:\Users\Steve\Pictures\..\..\Other\a.jpg",
            r"C:\Users\..\Steve\a.jpg",
            r"C:\Users\Steve\.\a.jpg",
        ] {
            assert!(
                matches!(windows_to_local(bad, home), Err(MigrationError::PathMapping(_))),
                "expected rejection for {}",
                bad
            );
        }
    }

    #[test]
    fn test_snapshot_lookup_and_rejects() {
        let json = r#"{"photos": [
            {"path": "C:\\Users\\Steve\\Pictures\\a.jpg", "tags": ["sunset"], "captions": ["Beach Day"]},
            {"path": "C:\\Users\\Steve\\Pictures\\a.jpg", "tags": ["sea"]},
            {"path": "/srv/photos/b.jpg", "captions": ["Local"]},
            {"path": "D:\\Archive\\c.jpg", "tags": ["lost"]}
        ]}"#;
        let db = SnapshotDb::from_json(json, Path::new("/home/steve")).unwrap();

        let a = Path::new("/home/steve/Pictures/a.jpg");
        assert_eq!(db.list_photo_tags(a).unwrap(), vec!["sunset", "sea"]);
        assert_eq!(db.list_photo_captions(a).unwrap(), vec!["Beach Day"]);
        assert_eq!(db.list_photo_captions(Path::new("/srv/photos/b.jpg")).unwrap(), vec!["Local"]);
        assert!(db.list_photo_tags(Path::new("/nowhere.jpg")).unwrap().is_empty());

        assert_eq!(db.len(), 2);
        assert_eq!(db.rejected().len(), 1);
        assert_eq!(db.rejected()[0].path, "D:\\Archive\\c.jpg");
    }

    #[test]
    fn test_malformed_snapshot_is_an_error() {
        assert!(SnapshotDb::from_json("{not json", Path::new("/home/steve")).is_err());
    }
}
