// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Embedded metadata writer backed by the `exiftool` command

use std::ffi::OsString;
use std::path::Path;
use std::process::Command;
use tracing::debug;

use super::MetadataWriter;
use crate::{MigrationError, Result};

const TAG_FIELD: &str = "XMP-dc:Subject";
const TITLE_FIELD: &str = "XMP-dc:Title";

/// Shells out to exiftool once per write
#[derive(Debug, Clone)]
pub struct ExiftoolWriter {
    program: String,
}

impl ExiftoolWriter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Check if exiftool can be run
    pub fn available(&self) -> bool {
        Command::new(&self.program)
            .arg("-ver")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// Arguments that add `tags` without duplicating ones already present
    pub fn tag_args(tags: &[String]) -> Vec<String> {
        tags.iter()
            .flat_map(|tag| {
                [
                    format!("-{}-={}", TAG_FIELD, tag),
                    format!("-{}+={}", TAG_FIELD, tag),
                ]
            })
            .collect()
    }

    pub fn title_args(title: &str) -> Vec<String> {
        vec![format!("-{}={}", TITLE_FIELD, title)]
    }

    fn run(&self, field_args: Vec<String>, path: &Path) -> Result<()> {
        let mut args: Vec<OsString> = vec!["-overwrite_original".into(), "-m".into(), "-q".into()];
        args.extend(field_args.into_iter().map(OsString::from));
        args.push(path.as_os_str().to_os_string());

        debug!("{} {:?}", self.program, args);
        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| MigrationError::Exiftool(format!("failed to run {}: {}", self.program, e)))?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(MigrationError::Exiftool(format!(
                "{} on {:?}: {}",
                output.status,
                path,
                stderr.trim()
            )))
        }
    }
}

impl Default for ExiftoolWriter {
    fn default() -> Self {
        Self::new("exiftool")
    }
}

impl MetadataWriter for ExiftoolWriter {
    fn write_tags(&mut self, path: &Path, tags: &[String]) -> Result<()> {
        if tags.is_empty() {
            return Ok(());
        }
        self.run(Self::tag_args(tags), path)
    }

    fn write_title(&mut self, path: &Path, title: &str) -> Result<()> {
        self.run(Self::title_args(title), path)
    }

    fn supports_video(&self) -> bool {
        // XMP is writable in MP4/MOV containers
        true
    }
}
