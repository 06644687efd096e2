// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Readers for the two Picasa metadata representations

pub mod picasa_ini;
pub mod snapshot;

pub use picasa_ini::PicasaIni;
pub use snapshot::{windows_to_local, SnapshotDb};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::Result;

/// Tags and captions held by the binary Picasa database
pub trait SourceDb {
    /// Tags attached to a file, in stored order
    fn list_photo_tags(&self, photo: &Path) -> Result<Vec<String>>;

    /// Captions attached to a file, in stored order
    fn list_photo_captions(&self, photo: &Path) -> Result<Vec<String>>;
}

/// Per-folder sidecar files
pub trait IniSource {
    /// Entries for every file named in the folder's sidecar.
    ///
    /// A folder without a sidecar yields an empty map.
    fn read_ini_for_folder(&self, folder: &Path) -> Result<IniFolder>;
}

/// Sidecar contents keyed by file name
pub type IniFolder = BTreeMap<String, IniEntry>;

/// What a sidecar says about one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IniEntry {
    /// Raw `rating=` value
    pub rating: Option<String>,
    /// `keywords=` split on commas
    pub tags: Vec<String>,
    pub caption: Option<String>,
    /// `star=yes`
    pub starred: bool,
}

impl IniEntry {
    pub fn is_empty(&self) -> bool {
        self.rating.is_none() && self.tags.is_empty() && self.caption.is_none() && !self.starred
    }

    /// Fold a repeated section into this one
    pub fn merge(&mut self, other: IniEntry) {
        if other.rating.is_some() {
            self.rating = other.rating;
        }
        self.tags.extend(other.tags);
        if other.caption.is_some() {
            self.caption = other.caption;
        }
        self.starred |= other.starred;
    }
}
