// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Run report: what was migrated and what needs a human

use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::reconcile::{Conflict, ManualItem, UnroutableItem};
use crate::records::RecordContent;
use crate::Result;

/// Counters for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportCounts {
    pub photos_processed: usize,
    pub videos_processed: usize,
    pub events: usize,
    pub event_assignments: usize,
    pub db_tags_written: usize,
    pub embedded_tags_written: usize,
    /// Captions now held by the target, whether written this run or already there
    pub captions_applied: usize,
    pub titles_embedded: usize,
    pub ratings_written: usize,
    pub ignored_keywords: usize,
}

/// A conflict and the file it concerns
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictEntry {
    pub photo: PathBuf,
    #[serde(flatten)]
    pub conflict: Conflict,
}

/// A per-item error that was recovered from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub path: PathBuf,
    /// The write that failed, when the file itself was readable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSummary {
    pub title: String,
    pub photos: usize,
}

/// Everything a run did, accumulated in processing order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub counts: ReportCounts,
    pub events: Vec<EventSummary>,
    pub conflicts: Vec<ConflictEntry>,
    pub unroutable: Vec<UnroutableItem>,
    pub manual: Vec<ManualItem>,
    pub failures: Vec<Failure>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_failure(&mut self, path: &Path, error: impl fmt::Display) {
        self.failures.push(Failure {
            path: path.to_path_buf(),
            item: None,
            error: error.to_string(),
        });
    }

    /// A single metadata item that could not be written, kept with its payload
    pub fn record_item_failure(&mut self, path: &Path, item: impl fmt::Display, error: impl fmt::Display) {
        self.failures.push(Failure {
            path: path.to_path_buf(),
            item: Some(item.to_string()),
            error: error.to_string(),
        });
    }

    pub fn record_conflict(&mut self, photo: &Path, conflict: Conflict) {
        self.conflicts.push(ConflictEntry {
            photo: photo.to_path_buf(),
            conflict,
        });
    }

    pub fn record_unroutable(&mut self, item: UnroutableItem) {
        self.unroutable.push(item);
    }

    pub fn record_manual(&mut self, item: ManualItem) {
        self.manual.push(item);
    }

    /// Items that were not migrated as-is
    pub fn needs_review(&self) -> bool {
        !(self.conflicts.is_empty()
            && self.unroutable.is_empty()
            && self.manual.is_empty()
            && self.failures.is_empty())
    }

    /// Write the report as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        Ok(())
    }
}

fn describe_conflict(conflict: &Conflict) -> String {
    match conflict {
        Conflict::Caption { kept, discarded, duplicate } => format!(
            "caption kept {:?} ({}), discarded {:?} ({}){}",
            kept.text,
            kept.source,
            discarded.text,
            discarded.source,
            if *duplicate { " [duplicate]" } else { "" }
        ),
        Conflict::Rating { kept, discarded } => {
            format!("rating kept {}, discarded {:?}", kept, discarded)
        }
        Conflict::ExistingTitle { kept, discarded } => {
            format!("existing title {:?} kept, caption {:?} not applied", kept, discarded)
        }
    }
}

fn describe_payload(content: &RecordContent) -> String {
    content.to_string()
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.counts;
        writeln!(f, "Migration report")?;
        writeln!(f, "================")?;
        writeln!(f, "  Photos processed: {}", c.photos_processed)?;
        writeln!(f, "  Videos processed: {}", c.videos_processed)?;
        writeln!(f, "  Events: {} ({} assignments)", c.events, c.event_assignments)?;
        writeln!(f, "  Tags: {} to database, {} embedded", c.db_tags_written, c.embedded_tags_written)?;
        writeln!(f, "  Captions: {} applied, {} embedded", c.captions_applied, c.titles_embedded)?;
        writeln!(f, "  Ratings written: {}", c.ratings_written)?;
        writeln!(f, "  Ignored keywords: {}", c.ignored_keywords)?;

        if !self.unroutable.is_empty() {
            writeln!(f, "\nUnroutable ({}):", self.unroutable.len())?;
            for item in &self.unroutable {
                writeln!(
                    f,
                    "  {}\t{}\t{}\t{}",
                    item.source,
                    item.photo.display(),
                    describe_payload(&item.content),
                    item.reason
                )?;
            }
        }

        if !self.conflicts.is_empty() {
            writeln!(f, "\nConflicts ({}):", self.conflicts.len())?;
            for entry in &self.conflicts {
                writeln!(f, "  {}\t{}", entry.photo.display(), describe_conflict(&entry.conflict))?;
            }
        }

        if !self.manual.is_empty() {
            writeln!(f, "\nManual ({}):", self.manual.len())?;
            for item in &self.manual {
                writeln!(f, "  {}\t{}\t{}", item.source, item.photo.display(), item.content)?;
            }
        }

        if !self.failures.is_empty() {
            writeln!(f, "\nFailures ({}):", self.failures.len())?;
            for failure in &self.failures {
                match &failure.item {
                    Some(item) => writeln!(f, "  {}\t{}\t{}", failure.path.display(), item, failure.error)?,
                    None => writeln!(f, "  {}\t{}", failure.path.display(), failure.error)?,
                }
            }
        }

        Ok(())
    }
}
