// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! `.picasa.ini` sidecar reader

use ini::{Ini, ParseOption};
use std::path::Path;
use tracing::debug;

use super::{IniEntry, IniFolder, IniSource};
use crate::{MigrationError, Result};

/// Sections that describe the folder rather than a file
const META_SECTIONS: &[&str] = &["Picasa", "Contacts", "Contacts2", "encoding"];

/// Reads Picasa sidecars with a fixed file name
#[derive(Debug, Clone)]
pub struct PicasaIni {
    file_name: String,
}

impl PicasaIni {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    /// Parse sidecar text. `origin` is only used in error messages.
    pub fn parse(text: &str, origin: &Path) -> Result<IniFolder> {
        // Picasa writes Windows paths and raw quotes into values
        let opt = ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_str_opt(text, opt).map_err(|e| MigrationError::Ini {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut folder = IniFolder::new();
        for (section, props) in ini.iter() {
            let Some(name) = section else { continue };
            if is_meta_section(name) {
                continue;
            }

            let entry = IniEntry {
                rating: props.get("rating").map(|r| r.trim().to_string()),
                tags: props.get("keywords").map(split_keywords).unwrap_or_default(),
                caption: props
                    .get("caption")
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty()),
                starred: props
                    .get("star")
                    .map(|s| s.trim().eq_ignore_ascii_case("yes"))
                    .unwrap_or(false),
            };
            if entry.is_empty() {
                continue;
            }

            folder.entry(name.to_string()).or_default().merge(entry);
        }

        Ok(folder)
    }
}

impl IniSource for PicasaIni {
    fn read_ini_for_folder(&self, folder: &Path) -> Result<IniFolder> {
        let path = folder.join(&self.file_name);
        if !path.is_file() {
            return Ok(IniFolder::new());
        }
        debug!("Reading sidecar {:?}", path);
        let text = std::fs::read_to_string(&path).map_err(|e| MigrationError::Ini {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Self::parse(&text, &path)
    }
}

fn is_meta_section(name: &str) -> bool {
    name.starts_with('.') || META_SECTIONS.iter().any(|m| m.eq_ignore_ascii_case(name))
}

/// Split a comma list; blank items are dropped
fn split_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}
