// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Target photo database

pub mod shotwell;

pub use shotwell::ShotwellDb;

use std::path::Path;

use crate::events::EventId;
use crate::Result;

/// Outcome of a caption write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleUpdate {
    Written,
    /// The target already had this exact title
    Unchanged,
    /// The target had a different title, which was kept
    KeptExisting(String),
}

/// Writes into the target database. Every call is safe to repeat.
pub trait TargetDb {
    fn upsert_tag(&mut self, photo: &Path, tag: &str) -> Result<()>;

    fn upsert_caption(&mut self, photo: &Path, text: &str) -> Result<TitleUpdate>;

    fn upsert_rating(&mut self, photo: &Path, value: u8) -> Result<()>;

    /// Id of the event named `title`, creating it if needed
    fn ensure_event(&mut self, title: &str) -> Result<EventId>;

    fn assign_photo_to_event(&mut self, photo: &Path, event: EventId) -> Result<()>;
}
