// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Metadata embedded in the image and video files themselves

pub mod exiftool;

pub use exiftool::ExiftoolWriter;

use std::path::Path;
use tracing::info;

use crate::Result;

/// Writes tag and title fields into a file
pub trait MetadataWriter {
    /// Add tags to the file's keyword list, keeping existing ones
    fn write_tags(&mut self, path: &Path, tags: &[String]) -> Result<()>;

    fn write_title(&mut self, path: &Path, title: &str) -> Result<()>;

    /// Whether video containers can be tagged
    fn supports_video(&self) -> bool;
}

/// Logs the writes it would make and touches nothing
#[derive(Debug, Clone, Copy)]
pub struct DryRunWriter {
    supports_video: bool,
}

impl DryRunWriter {
    pub fn new(supports_video: bool) -> Self {
        Self { supports_video }
    }
}

impl MetadataWriter for DryRunWriter {
    fn write_tags(&mut self, path: &Path, tags: &[String]) -> Result<()> {
        info!("DRY RUN: would embed tags {:?} in {:?}", tags, path);
        Ok(())
    }

    fn write_title(&mut self, path: &Path, title: &str) -> Result<()> {
        info!("DRY RUN: would embed title {:?} in {:?}", title, path);
        Ok(())
    }

    fn supports_video(&self) -> bool {
        self.supports_video
    }
}
